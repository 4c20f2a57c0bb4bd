//! Tree → ToC item list. Elements in the ToC vocabulary become items;
//! other elements are descended through transparently so wrappers around
//! structure (an inline `content` block holding a nested list) do not hide
//! it from the outline.

use super::{TocItem, TocMode};
use crate::akn;
use crate::xml::builder::serialize_subtree;
use crate::xml::XmlDocument;
use indextree::NodeId;

/// Build the ordered table of content of a document. The returned list is
/// fully materialized; an empty document yields an empty list.
pub fn build_toc(doc: &XmlDocument, mode: TocMode) -> Vec<TocItem> {
    let Some(root) = doc.root() else {
        return Vec::new();
    };

    if doc.local_name(root).is_some_and(akn::is_toc_tag) {
        return vec![build_item(doc, root, mode)];
    }
    collect_items(doc, root, mode)
}

fn collect_items(doc: &XmlDocument, node: NodeId, mode: TocMode) -> Vec<TocItem> {
    let mut items = Vec::new();
    for child in doc.children(node) {
        let Some(data) = doc.get(child) else {
            continue;
        };
        if !data.is_element() {
            continue;
        }
        if data.local_name().is_some_and(akn::is_toc_tag) {
            items.push(build_item(doc, child, mode));
        } else {
            items.extend(collect_items(doc, child, mode));
        }
    }
    items
}

fn build_item(doc: &XmlDocument, node: NodeId, mode: TocMode) -> TocItem {
    let tag = doc.local_name(node).unwrap_or_default().to_string();
    let number = child_text(doc, node, akn::NUM);
    let heading = child_text(doc, node, akn::HEADING);
    let children = collect_items(doc, node, mode);

    let content = match (mode, children.is_empty()) {
        (TocMode::Full, true) => inline_content(doc, node),
        _ => None,
    };

    TocItem {
        tag,
        id: doc.attribute(node, akn::ID).map(str::to_string),
        number,
        heading,
        children,
        content,
    }
}

fn child_text(doc: &XmlDocument, node: NodeId, tag: &str) -> Option<String> {
    doc.child_elements_named(node, tag)
        .next()
        .map(|n| doc.collect_text(n))
}

/// Inline XML of a leaf item: everything under the element except its
/// `num` and `heading` children.
fn inline_content(doc: &XmlDocument, node: NodeId) -> Option<String> {
    let mut out = String::new();
    for child in doc.children(node) {
        if matches!(doc.local_name(child), Some(akn::NUM) | Some(akn::HEADING)) {
            continue;
        }
        out.push_str(&serialize_subtree(doc, child).unwrap_or_default());
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse_str;

    const DOC: &str = concat!(
        r#"<bill><body id="body_1">"#,
        r#"<chapter id="chap_1"><num>Chapter 1</num><heading>Scope</heading>"#,
        r#"<article id="art_1"><num>Article 1</num>"#,
        r#"<paragraph id="par_1">Some <i>styled</i> text</paragraph>"#,
        r#"</article></chapter></body></bill>"#
    );

    #[test]
    fn structure_becomes_nested_items() {
        let doc = parse_str(DOC).unwrap();
        let toc = build_toc(&doc, TocMode::Simplified);

        assert_eq!(toc.len(), 1);
        let body = &toc[0];
        assert_eq!(body.tag, "body");
        let chapter = &body.children[0];
        assert_eq!(chapter.tag, "chapter");
        assert_eq!(chapter.number.as_deref(), Some("Chapter 1"));
        assert_eq!(chapter.heading.as_deref(), Some("Scope"));
        let article = &chapter.children[0];
        assert_eq!(article.id.as_deref(), Some("art_1"));
        assert_eq!(article.children[0].tag, "paragraph");
    }

    #[test]
    fn simplified_mode_omits_inline_content() {
        let doc = parse_str(DOC).unwrap();
        let toc = build_toc(&doc, TocMode::Simplified);
        let paragraph = &toc[0].children[0].children[0].children[0];
        assert!(paragraph.content.is_none());
    }

    #[test]
    fn full_mode_keeps_leaf_content() {
        let doc = parse_str(DOC).unwrap();
        let toc = build_toc(&doc, TocMode::Full);
        let paragraph = &toc[0].children[0].children[0].children[0];
        assert_eq!(
            paragraph.content.as_deref(),
            Some("Some <i>styled</i> text")
        );
    }

    #[test]
    fn wrapped_structure_is_not_hidden() {
        let doc = parse_str(concat!(
            r#"<bill><body id="b"><article id="a">"#,
            r#"<wrap><list id="l"><point id="p"/></list></wrap>"#,
            r#"</article></body></bill>"#
        ))
        .unwrap();
        let toc = build_toc(&doc, TocMode::Simplified);
        let article = &toc[0].children[0];
        assert_eq!(article.children[0].tag, "list");
        assert_eq!(article.children[0].children[0].tag, "point");
    }
}
