//! Workspace root types.

use super::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decoded regions of a snapshot.
///
/// A workspace root carries a `meta` region, a page document carries a
/// `blocks` region. Which regions are present, not their content, decides
/// how a snapshot is interpreted.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceRoot {
    /// Metadata region, if present
    pub meta: Option<WorkspaceMeta>,

    /// Block region, if present
    pub blocks: Option<Document>,
}

impl WorkspaceRoot {
    /// Check whether the snapshot has a metadata region.
    pub fn has_meta_region(&self) -> bool {
        self.meta.is_some()
    }

    /// Check whether the snapshot has a block region.
    pub fn has_blocks_region(&self) -> bool {
        self.blocks.is_some()
    }
}

/// Workspace metadata stored in the root snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMeta {
    /// Workspace display name
    #[serde(default)]
    pub name: Option<String>,

    /// Blob key of the workspace avatar
    #[serde(default)]
    pub avatar: Option<String>,

    /// Documents listed in the workspace
    #[serde(default)]
    pub pages: Vec<PageMeta>,
}

impl WorkspaceMeta {
    /// Identifiers of listed documents, in stored order.
    pub fn doc_ids(&self, include_trash: bool) -> Vec<String> {
        self.pages
            .iter()
            .filter(|p| include_trash || !p.trash)
            .map(|p| p.id.clone())
            .collect()
    }
}

/// Metadata of one document listed in the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Document identifier
    pub id: String,

    /// Document title
    #[serde(default)]
    pub title: Option<String>,

    /// Creation time (milliseconds since epoch in the snapshot)
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub create_date: Option<DateTime<Utc>>,

    /// Whether the document is in the trash
    #[serde(default)]
    pub trash: bool,

    /// Tag identifiers
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Name and avatar of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    /// Workspace display name
    pub name: String,

    /// Blob key of the workspace avatar
    pub avatar: String,
}

impl From<&WorkspaceMeta> for WorkspaceInfo {
    fn from(meta: &WorkspaceMeta) -> Self {
        Self {
            name: meta.name.clone().unwrap_or_default(),
            avatar: meta.avatar.clone().unwrap_or_default(),
        }
    }
}
