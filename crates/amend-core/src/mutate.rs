//! Primitive structural operations. Each is a single transactional tree
//! edit: the input tree is never touched, a new tree is returned, and a
//! failed operation returns nothing rather than a partially edited tree.
//!
//! These operations know nothing about legal-document semantics; numbering
//! is recomputed separately after a structural change.

use crate::error::{AmendError, Result};
use crate::locate;
use crate::xml::parser::parse_fragment;
use crate::xml::XmlDocument;
use indextree::NodeId;

/// Where a grafted subtree lands relative to an existing node.
#[derive(Clone, Copy)]
pub(crate) enum Attach {
    Before(NodeId),
    After(NodeId),
    FirstChild(NodeId),
    LastChild(NodeId),
}

/// Copy a subtree from one document into another. Returns the id of the
/// copied root in `dst`, or `None` if `src_node` is not present in `src`.
pub(crate) fn graft(
    dst: &mut XmlDocument,
    src: &XmlDocument,
    src_node: NodeId,
    attach: Attach,
) -> Option<NodeId> {
    let data = src.get(src_node)?.clone();
    let new_id = match attach {
        Attach::Before(sibling) => dst.add_before(sibling, data),
        Attach::After(sibling) => dst.add_after(sibling, data),
        Attach::FirstChild(parent) => dst.add_first_child(parent, data),
        Attach::LastChild(parent) => dst.add_child(parent, data),
    };

    // Only the graft root honors the attach mode; descendants append in
    // source order under their copied parent.
    for child in src.children(src_node) {
        graft(dst, src, child, Attach::LastChild(new_id));
    }

    Some(new_id)
}

fn parse_single_fragment(xml: &str) -> Result<(XmlDocument, NodeId)> {
    let fragment = parse_fragment(xml)?;
    let root = fragment
        .root()
        .ok_or_else(|| AmendError::FragmentParse("empty fragment".to_string()))?;
    Ok((fragment, root))
}

/// Insert a parsed fragment immediately before or after the element with
/// the given anchor id, among its siblings.
pub fn insert_sibling(
    doc: &XmlDocument,
    anchor_id: &str,
    fragment_xml: &str,
    before: bool,
) -> Result<XmlDocument> {
    let anchor = locate::find_by_id(doc, anchor_id)
        .ok_or_else(|| AmendError::AnchorNotFound(anchor_id.to_string()))?;
    let (fragment, frag_root) = parse_single_fragment(fragment_xml)?;

    let mut out = doc.clone();
    let attach = if before {
        Attach::Before(anchor)
    } else {
        Attach::After(anchor)
    };
    graft(&mut out, &fragment, frag_root, attach);
    Ok(out)
}

/// Replace the subtree of the element with the given tag and id, keeping
/// its position among its siblings. `None` content deletes the element.
pub fn replace_by_id(
    doc: &XmlDocument,
    tag: &str,
    id: &str,
    new_content_xml: Option<&str>,
) -> Result<XmlDocument> {
    let target =
        locate::find_by_tag_and_id(doc, tag, id).ok_or_else(|| AmendError::ElementNotFound {
            tag: tag.to_string(),
            id: id.to_string(),
        })?;

    let mut out = doc.clone();
    match new_content_xml {
        Some(xml) => {
            let (fragment, frag_root) = parse_single_fragment(xml)?;
            graft(&mut out, &fragment, frag_root, Attach::Before(target));
            out.remove_subtree(target);
        }
        None => out.remove_subtree(target),
    }
    Ok(out)
}

/// Remove the element with the given tag and id and its whole subtree.
/// A missing id is not an error: retry-safe callers re-issue deletes, so
/// the tree is returned unchanged.
pub fn delete_by_id(doc: &XmlDocument, tag: &str, id: &str) -> XmlDocument {
    let mut out = doc.clone();
    if let Some(target) = locate::find_by_tag_and_id(doc, tag, id) {
        out.remove_subtree(target);
    }
    out
}

/// Append a fragment under the first element with the given tag. Used to
/// inject a metadata block when none exists yet.
pub fn append_child(doc: &XmlDocument, parent_tag: &str, child_xml: &str) -> Result<XmlDocument> {
    let parent =
        doc.first_element_named(parent_tag)
            .ok_or_else(|| AmendError::ElementNotFound {
                tag: parent_tag.to_string(),
                id: String::new(),
            })?;
    let (fragment, frag_root) = parse_single_fragment(child_xml)?;

    let mut out = doc.clone();
    graft(&mut out, &fragment, frag_root, Attach::LastChild(parent));
    Ok(out)
}

/// Insert an annotation fragment as first or last child of its anchor
/// element. Annotations live inside the element they annotate, unlike
/// structural inserts which are siblings.
pub fn insert_annotation(
    doc: &XmlDocument,
    anchor_element_id: &str,
    annotation_xml: &str,
    at_start: bool,
) -> Result<XmlDocument> {
    let anchor = locate::find_by_id(doc, anchor_element_id)
        .ok_or_else(|| AmendError::AnchorNotFound(anchor_element_id.to_string()))?;
    let (fragment, frag_root) = parse_single_fragment(annotation_xml)?;

    let mut out = doc.clone();
    let attach = if at_start {
        Attach::FirstChild(anchor)
    } else {
        Attach::LastChild(anchor)
    };
    graft(&mut out, &fragment, frag_root, attach);
    Ok(out)
}
