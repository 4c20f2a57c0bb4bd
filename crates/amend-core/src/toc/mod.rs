//! Table-of-content view of a document: a semantic item tree mirroring the
//! structural elements, editable independently of the raw XML and
//! convertible back into tree structure.

pub mod build;
pub mod rebuild;

pub use build::build_toc;
pub use rebuild::rebuild_tree;

use serde::{Deserialize, Serialize};

/// How much of the document the ToC view carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TocMode {
    /// Structure only; inline content is omitted.
    Simplified,
    /// Structure plus raw inline content of leaf items, for full editable
    /// export.
    Full,
}

/// One table-of-content item, mirroring one structural element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocItem {
    /// Element tag (`article`, `recital`, `chapter`, ...).
    pub tag: String,

    /// Id of the mirrored element. `None` for items created in the editor
    /// that have no element yet; a fresh id is minted on rebuild.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Text of the element's `num` child.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    /// Text of the element's `heading` child.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocItem>,

    /// Raw inline XML of a leaf item (`TocMode::Full` only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl TocItem {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            number: None,
            heading: None,
            children: Vec::new(),
            content: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_heading(mut self, heading: &str) -> Self {
        self.heading = Some(heading.to_string());
        self
    }

    pub fn with_content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn with_children(mut self, children: Vec<TocItem>) -> Self {
        self.children = children;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_serialize_without_empty_fields() {
        let item = TocItem::new("article").with_id("art_1");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"tag":"article","id":"art_1"}"#);
    }

    #[test]
    fn items_deserialize_with_missing_fields() {
        let item: TocItem = serde_json::from_str(r#"{"tag":"chapter"}"#).unwrap();
        assert_eq!(item.tag, "chapter");
        assert!(item.id.is_none());
        assert!(item.children.is_empty());
    }
}
