//! ToC item list → tree. Reconciles the edited outline against the current
//! tree: untouched items leave their elements alone (diffing stability for
//! version comparison), moved or re-headed items update elements in place,
//! id-less items get a fresh element with a minted id, and elements absent
//! from the list are deleted. Numbering is recomputed before returning.

use super::TocItem;
use crate::akn;
use crate::error::{AmendError, Result};
use crate::ident::IdAllocator;
use crate::mutate::{graft, Attach};
use crate::number;
use crate::xml::parser::parse_fragment;
use crate::xml::{XAttribute, XmlDocument, XmlNodeData, XName};
use indextree::NodeId;
use std::collections::{HashMap, HashSet};

pub fn rebuild_tree(doc: &XmlDocument, items: &[TocItem]) -> Result<XmlDocument> {
    let mut out = doc.clone();
    let root = out.root().ok_or_else(|| AmendError::MalformedDocument {
        message: "document has no root element".to_string(),
        location: "input".to_string(),
    })?;

    let mut state = Rebuild {
        alloc: IdAllocator::for_document(doc),
        index: index_structural_elements(&out, root),
        referenced: HashSet::new(),
    };

    // Top-level items are the document skeleton; existing ones keep their
    // parents, new ones attach under the root content element.
    let attach_parent = out
        .children(root)
        .find(|&c| out.get(c).is_some_and(|d| d.is_element()))
        .unwrap_or(root);

    for item in items {
        let node = state.resolve_or_create(&mut out, item, attach_parent)?;
        state.apply_children(&mut out, node, &item.children)?;
    }

    state.delete_unreferenced(&mut out, root);

    Ok(number::renumber_all(&out))
}

struct Rebuild {
    alloc: IdAllocator,
    index: HashMap<String, NodeId>,
    referenced: HashSet<String>,
}

impl Rebuild {
    /// Reconcile one element's structural children against an item list.
    fn apply_children(
        &mut self,
        out: &mut XmlDocument,
        parent: NodeId,
        items: &[TocItem],
    ) -> Result<()> {
        let mut ordered = Vec::with_capacity(items.len());
        for item in items {
            let node = self.resolve_or_create(out, item, parent)?;
            ordered.push(node);
            self.apply_children(out, node, &item.children)?;
        }

        // Leave an untouched level exactly as it was, wrappers included;
        // only a changed level is normalized to direct children.
        if structural_children(out, parent) != ordered {
            for node in ordered {
                out.detach(node);
                out.attach_child(parent, node);
            }
        }
        Ok(())
    }

    fn resolve_or_create(
        &mut self,
        out: &mut XmlDocument,
        item: &TocItem,
        parent: NodeId,
    ) -> Result<NodeId> {
        if let Some(id) = &item.id {
            if let Some(&node) = self.index.get(id) {
                self.referenced.insert(id.clone());
                set_child_text(out, node, akn::NUM, item.number.as_deref());
                set_child_text(out, node, akn::HEADING, item.heading.as_deref());
                return Ok(node);
            }
        }

        let id = match &item.id {
            Some(id) => id.clone(),
            None => self.alloc.mint(akn::id_prefix(&item.tag))?,
        };
        self.referenced.insert(id.clone());

        let node = out.add_child(
            parent,
            XmlNodeData::element_with_attrs(
                XName::local(&item.tag),
                vec![XAttribute::local(akn::ID, &id)],
            ),
        );
        set_child_text(out, node, akn::NUM, item.number.as_deref());
        set_child_text(out, node, akn::HEADING, item.heading.as_deref());

        if let Some(content) = &item.content {
            let wrapper = parse_fragment(&format!("<{0}>{1}</{0}>", item.tag, content))?;
            if let Some(wrapper_root) = wrapper.root() {
                let children: Vec<NodeId> = wrapper.children(wrapper_root).collect();
                for child in children {
                    graft(out, &wrapper, child, Attach::LastChild(node));
                }
            }
        }
        Ok(node)
    }

    /// Remove every structural element of the original tree whose id the
    /// item list no longer references.
    fn delete_unreferenced(&self, out: &mut XmlDocument, root: NodeId) {
        for (id, &node) in &self.index {
            if self.referenced.contains(id) {
                continue;
            }
            // Skip nodes already gone with a removed ancestor.
            let still_attached =
                out.get(node).is_some() && out.ancestors(node).any(|a| a == root);
            if still_attached {
                out.remove_subtree(node);
            }
        }
    }
}

/// Structural elements of the tree, by id.
fn index_structural_elements(doc: &XmlDocument, root: NodeId) -> HashMap<String, NodeId> {
    let mut index = HashMap::new();
    for node in doc.descendants(root) {
        if doc.local_name(node).is_some_and(akn::is_toc_tag) {
            if let Some(id) = doc.attribute(node, akn::ID) {
                index.insert(id.to_string(), node);
            }
        }
    }
    index
}

/// The structural children of an element in document order, descending
/// transparently through non-structural wrappers. Same walk as the ToC
/// builder.
fn structural_children(doc: &XmlDocument, node: NodeId) -> Vec<NodeId> {
    let mut found = Vec::new();
    for child in doc.children(node) {
        let Some(data) = doc.get(child) else {
            continue;
        };
        if !data.is_element() {
            continue;
        }
        if data.local_name().is_some_and(akn::is_toc_tag) {
            found.push(child);
        } else {
            found.extend(structural_children(doc, child));
        }
    }
    found
}

/// Rewrite, create or remove a `num`/`heading` child to carry the given
/// text. `num` is kept first, `heading` right after it.
fn set_child_text(doc: &mut XmlDocument, element: NodeId, tag: &str, value: Option<&str>) {
    let existing = doc.child_elements_named(element, tag).next();
    match (existing, value) {
        (Some(child), Some(text)) => {
            if doc.collect_text(child) == text {
                return;
            }
            let old: Vec<NodeId> = doc.children(child).collect();
            for c in old {
                doc.remove_subtree(c);
            }
            doc.add_child(child, XmlNodeData::text(text));
        }
        (Some(child), None) => doc.remove_subtree(child),
        (None, Some(text)) => {
            let num = doc.child_elements_named(element, akn::NUM).next();
            let child = match (tag == akn::HEADING, num) {
                (true, Some(num)) => doc.add_after(num, XmlNodeData::element(XName::local(tag))),
                _ => doc.add_first_child(element, XmlNodeData::element(XName::local(tag))),
            };
            doc.add_child(child, XmlNodeData::text(text));
        }
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::{build_toc, TocMode};
    use crate::xml::builder::serialize;
    use crate::xml::parser::parse_str;
    use pretty_assertions::assert_eq;

    const DOC: &str = concat!(
        r#"<bill><body id="body_1">"#,
        r#"<article id="art_1"><num>Article 1</num><paragraph id="par_1">One</paragraph></article>"#,
        r#"<article id="art_2"><num>Article 2</num><paragraph id="par_2">Two</paragraph></article>"#,
        r#"</body></bill>"#
    );

    #[test]
    fn unchanged_list_keeps_the_tree_structurally_identical() {
        let doc = parse_str(DOC).unwrap();
        let toc = build_toc(&doc, TocMode::Full);
        let rebuilt = rebuild_tree(&doc, &toc).unwrap();
        assert_eq!(serialize(&rebuilt).unwrap(), serialize(&doc).unwrap());
    }

    #[test]
    fn reordered_items_move_their_elements() {
        let doc = parse_str(DOC).unwrap();
        let mut toc = build_toc(&doc, TocMode::Full);
        toc[0].children.swap(0, 1);

        let rebuilt = rebuild_tree(&doc, &toc).unwrap();
        let xml = serialize(&rebuilt).unwrap();

        let pos_art_2 = xml.find(r#"<article id="art_2">"#).unwrap();
        let pos_art_1 = xml.find(r#"<article id="art_1">"#).unwrap();
        assert!(pos_art_2 < pos_art_1);
        // Renumbering follows the new order.
        assert!(xml.contains(r#"<article id="art_2"><num>Article 1</num>"#));
    }

    #[test]
    fn item_without_id_gets_a_fresh_element() {
        let doc = parse_str(DOC).unwrap();
        let mut toc = build_toc(&doc, TocMode::Full);
        toc[0]
            .children
            .push(TocItem::new("article").with_content(r#"<paragraph id="p_new">Three</paragraph>"#));

        let rebuilt = rebuild_tree(&doc, &toc).unwrap();
        let xml = serialize(&rebuilt).unwrap();

        let articles = xml.matches("<article id=\"art_").count();
        assert_eq!(articles, 3);
        assert!(xml.contains(r#"<num>Article 3</num><paragraph id="p_new">Three</paragraph>"#));
    }

    #[test]
    fn element_absent_from_the_list_is_deleted() {
        let doc = parse_str(DOC).unwrap();
        let mut toc = build_toc(&doc, TocMode::Full);
        toc[0].children.remove(0);

        let rebuilt = rebuild_tree(&doc, &toc).unwrap();
        let xml = serialize(&rebuilt).unwrap();
        assert!(!xml.contains("art_1"));
        assert!(xml.contains(r#"<article id="art_2"><num>Article 1</num>"#));
    }

    #[test]
    fn heading_changes_update_in_place() {
        let doc = parse_str(DOC).unwrap();
        let mut toc = build_toc(&doc, TocMode::Full);
        toc[0].children[0].heading = Some("Subject matter".to_string());

        let rebuilt = rebuild_tree(&doc, &toc).unwrap();
        let xml = serialize(&rebuilt).unwrap();
        assert!(xml.contains(
            r#"<article id="art_1"><num>Article 1</num><heading>Subject matter</heading>"#
        ));
    }
}
