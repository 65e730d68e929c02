//! Block-level types.

use super::{PropValue, Properties};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// The kind of a block, identified by its flavour string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Flavour {
    /// Document root
    Page,
    /// Content container on the page
    Note,
    /// Canvas surface holding freeform elements
    Surface,
    /// Text paragraph, heading or quote
    Paragraph,
    /// List item (bulleted, numbered, todo, toggle)
    List,
    /// Code block
    Code,
    /// Embedded image
    Image,
    /// File attachment
    Attachment,
    /// Audio transcription container
    Transcription,
    /// Callout container
    Callout,
    /// Simple table with cell text properties
    Table,
    /// Database view whose rows are child blocks
    Database,
    /// Horizontal divider
    Divider,
    /// Web bookmark card
    Bookmark,
    /// Card linking another document
    EmbedLinkedDoc,
    /// Document embedded inline
    EmbedSyncedDoc,
    /// Math block
    Latex,
    /// Canvas frame
    Frame,
    /// Any flavour this crate does not know
    Unknown(String),
}

impl Flavour {
    /// Parse a flavour string such as `affine:paragraph`.
    pub fn parse(s: &str) -> Self {
        match s {
            "affine:page" => Flavour::Page,
            "affine:note" => Flavour::Note,
            "affine:surface" => Flavour::Surface,
            "affine:paragraph" => Flavour::Paragraph,
            "affine:list" => Flavour::List,
            "affine:code" => Flavour::Code,
            "affine:image" => Flavour::Image,
            "affine:attachment" => Flavour::Attachment,
            "affine:transcription" => Flavour::Transcription,
            "affine:callout" => Flavour::Callout,
            "affine:table" => Flavour::Table,
            "affine:database" => Flavour::Database,
            "affine:divider" => Flavour::Divider,
            "affine:bookmark" => Flavour::Bookmark,
            "affine:embed-linked-doc" => Flavour::EmbedLinkedDoc,
            "affine:embed-synced-doc" => Flavour::EmbedSyncedDoc,
            "affine:latex" => Flavour::Latex,
            "affine:frame" => Flavour::Frame,
            other => Flavour::Unknown(other.to_string()),
        }
    }

    /// Get the flavour string.
    pub fn as_str(&self) -> &str {
        match self {
            Flavour::Page => "affine:page",
            Flavour::Note => "affine:note",
            Flavour::Surface => "affine:surface",
            Flavour::Paragraph => "affine:paragraph",
            Flavour::List => "affine:list",
            Flavour::Code => "affine:code",
            Flavour::Image => "affine:image",
            Flavour::Attachment => "affine:attachment",
            Flavour::Transcription => "affine:transcription",
            Flavour::Callout => "affine:callout",
            Flavour::Table => "affine:table",
            Flavour::Database => "affine:database",
            Flavour::Divider => "affine:divider",
            Flavour::Bookmark => "affine:bookmark",
            Flavour::EmbedLinkedDoc => "affine:embed-linked-doc",
            Flavour::EmbedSyncedDoc => "affine:embed-synced-doc",
            Flavour::Latex => "affine:latex",
            Flavour::Frame => "affine:frame",
            Flavour::Unknown(s) => s,
        }
    }

    /// Check whether this flavour is recognized.
    pub fn is_known(&self) -> bool {
        !matches!(self, Flavour::Unknown(_))
    }

    /// Blocks of these flavours carry their main text in the `text` property.
    pub fn is_text_block(&self) -> bool {
        matches!(self, Flavour::Paragraph | Flavour::List | Flavour::Code)
    }

    /// Blocks referring to another document through `pageId`.
    pub fn is_doc_embed(&self) -> bool {
        matches!(self, Flavour::EmbedLinkedDoc | Flavour::EmbedSyncedDoc)
    }
}

impl From<String> for Flavour {
    fn from(s: String) -> Self {
        Flavour::parse(&s)
    }
}

impl From<&str> for Flavour {
    fn from(s: &str) -> Self {
        Flavour::parse(s)
    }
}

impl From<Flavour> for String {
    fn from(flavour: Flavour) -> Self {
        match flavour {
            Flavour::Unknown(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the block tree.
///
/// Children are block identifiers in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block identifier
    pub id: String,

    /// Block kind
    pub flavour: Flavour,

    /// Child identifiers in reading order
    #[serde(default)]
    pub children: Vec<String>,

    /// Property bag (keys without the `prop:` prefix)
    #[serde(default)]
    pub props: Properties,
}

impl Block {
    /// Create a block without children or properties.
    pub fn new(id: impl Into<String>, flavour: impl Into<Flavour>) -> Self {
        Self {
            id: id.into(),
            flavour: flavour.into(),
            children: Vec::new(),
            props: Properties::new(),
        }
    }

    /// Create a paragraph with plain text.
    pub fn paragraph(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, Flavour::Paragraph).with_prop("text", text.into())
    }

    /// Create a page block with a title.
    pub fn page(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(id, Flavour::Page).with_prop("title", title.into())
    }

    /// Set children and return self.
    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    /// Set a property and return self.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// Get a property.
    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    /// Get a property as a plain string slice.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(PropValue::as_str)
    }

    /// Main text of the block (`text` property).
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.props.text("text")
    }

    /// Title of the block (`title` property).
    pub fn title(&self) -> Option<Cow<'_, str>> {
        self.props.text("title")
    }

    /// Check if the block has children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
