//! Document model types for replicated block trees.
//!
//! This module defines the in-memory representation that bridges snapshot
//! decoding and content extraction. A [`Document`] is a flat arena of
//! [`Block`]s; tree structure lives in each block's ordered child list.

mod block;
mod document;
mod props;
mod table;
mod workspace;

pub use block::{Block, Flavour};
pub use document::Document;
pub use props::{DocReference, PropValue, Properties, TextDelta};
pub use table::{cell_texts, TableGrid};
pub use workspace::{PageMeta, WorkspaceInfo, WorkspaceMeta, WorkspaceRoot};
