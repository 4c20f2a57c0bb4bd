//! Element lookup over a parsed tree: by tag + id, by id alone, ancestor
//! chains for cross-reference labels, and annotation harvesting by marker.

use crate::akn;
use crate::error::{AmendError, Result};
use crate::xml::XmlDocument;
use indextree::NodeId;

/// Find the element with the given local tag name and id.
pub fn find_by_tag_and_id(doc: &XmlDocument, tag: &str, id: &str) -> Option<NodeId> {
    let root = doc.root()?;
    doc.descendants(root).find(|&node| {
        doc.local_name(node) == Some(tag) && doc.attribute(node, akn::ID) == Some(id)
    })
}

/// Find the element with the given id, whatever its tag.
pub fn find_by_id(doc: &XmlDocument, id: &str) -> Option<NodeId> {
    let root = doc.root()?;
    doc.descendants(root)
        .find(|&node| doc.attribute(node, akn::ID) == Some(id))
}

/// Ids of the ancestors of the element with the given id, root-to-parent
/// order. Ancestors without an id attribute are skipped. Fails with
/// `ElementNotFound` when the id is absent from the tree.
pub fn ancestor_ids(doc: &XmlDocument, id: &str) -> Result<Vec<String>> {
    let node = find_by_id(doc, id).ok_or_else(|| AmendError::ElementNotFound {
        tag: String::new(),
        id: id.to_string(),
    })?;

    let mut ids: Vec<String> = doc
        .ancestors(node)
        .skip(1) // the element itself
        .filter_map(|a| doc.attribute(a, akn::ID).map(str::to_string))
        .collect();
    ids.reverse();
    Ok(ids)
}

/// All elements whose `refersTo` attribute equals the given marker value.
/// The attribute name is matched case-insensitively: both `refersTo` and
/// `refersto` occur in stored documents.
pub fn all_by_refers_to(doc: &XmlDocument, marker: &str) -> Vec<NodeId> {
    let Some(root) = doc.root() else {
        return Vec::new();
    };
    doc.descendants(root)
        .filter(|&node| {
            doc.get(node)
                .and_then(|data| data.attribute_ci(akn::REFERS_TO))
                .is_some_and(|v| v == marker)
        })
        .collect()
}

/// Id of the nearest ancestor element carrying an id attribute. This is the
/// anchor of an annotation that lives inside a content element.
pub fn enclosing_id(doc: &XmlDocument, node: NodeId) -> Option<String> {
    doc.ancestors(node)
        .skip(1)
        .find_map(|a| doc.attribute(a, akn::ID).map(str::to_string))
}
