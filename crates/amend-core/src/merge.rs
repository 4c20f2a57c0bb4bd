//! Annotation reconciliation between two variants of the same document.
//!
//! The addendum's comments and suggestions are folded into the base:
//! unchanged entries are left alone, changed entries are replaced at the
//! addendum's anchor, new entries are inserted at their anchor. Annotations
//! present only in the base are left untouched. Deletions are NOT
//! propagated by this merge; a removal in the addendum is indistinguishable
//! here from an annotation added to the base after the fork.

use crate::akn;
use crate::error::Result;
use crate::locate;
use crate::mutate;
use crate::settings::EditSettings;
use crate::xml::builder::{serialize_bytes, serialize_subtree};
use crate::xml::parser::parse_bytes;
use crate::xml::XmlDocument;

/// One harvested annotation, keyed by its id.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Harvested {
    id: String,
    anchor_id: String,
    xml: String,
}

/// Merge the addendum's annotations into the base document. Both buffers
/// must be variants of the same logical document. Processing order is by
/// sorted annotation id, so repeated merges of the same inputs produce the
/// same bytes.
pub fn merge_annotations(
    base: &[u8],
    addendum: &[u8],
    settings: Option<&EditSettings>,
) -> Result<Vec<u8>> {
    let default_settings = EditSettings::default();
    let settings = settings.unwrap_or(&default_settings);

    let base_doc = parse_bytes(base)?;
    let addendum_doc = parse_bytes(addendum)?;

    let base_list = harvest(&base_doc, settings)?;
    let addendum_list = harvest(&addendum_doc, settings)?;

    let mut merged = base_doc;
    for entry in &addendum_list {
        match base_list.binary_search_by(|probe| probe.id.as_str().cmp(&entry.id)) {
            Ok(found) => {
                let existing = &base_list[found];
                if existing.anchor_id == entry.anchor_id && existing.xml == entry.xml {
                    continue;
                }
                merged = mutate::delete_by_id(&merged, akn::POPUP, &entry.id);
                merged = mutate::insert_annotation(&merged, &entry.anchor_id, &entry.xml, true)?;
            }
            Err(_) => {
                merged = mutate::insert_annotation(&merged, &entry.anchor_id, &entry.xml, true)?;
            }
        }
    }

    serialize_bytes(&merged)
}

/// All annotations of a document, sorted by id. Annotations without an id
/// or without an identified anchor ancestor are unaddressable and skipped.
fn harvest(doc: &XmlDocument, settings: &EditSettings) -> Result<Vec<Harvested>> {
    let mut entries = Vec::new();
    for marker in [&settings.comment_marker, &settings.suggestion_marker] {
        for node in locate::all_by_refers_to(doc, marker) {
            let Some(id) = doc.attribute(node, akn::ID).map(str::to_string) else {
                continue;
            };
            let Some(anchor_id) = locate::enclosing_id(doc, node) else {
                continue;
            };
            let xml = serialize_subtree(doc, node)?;
            entries.push(Harvested { id, anchor_id, xml });
        }
    }
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(comments: &[(&str, &str, &str)]) -> Vec<u8> {
        // (anchor_article_id, comment_id, text)
        let mut articles = String::new();
        for anchor in ["art_1", "art_2"] {
            let mut inner = String::new();
            for &(a, id, text) in comments {
                if a == anchor {
                    inner.push_str(&format!(
                        r#"<popup id="{}" refersTo="~leosComment">{}</popup>"#,
                        id, text
                    ));
                }
            }
            articles.push_str(&format!(
                r#"<article id="{}"><num>Article</num>{}</article>"#,
                anchor, inner
            ));
        }
        format!("<bill><body>{}</body></bill>", articles).into_bytes()
    }

    fn comment_texts(bytes: &[u8]) -> Vec<(String, String)> {
        let parsed = parse_bytes(bytes).unwrap();
        locate::all_by_refers_to(&parsed, "~leosComment")
            .into_iter()
            .map(|n| {
                (
                    parsed.attribute(n, "id").unwrap_or_default().to_string(),
                    parsed.collect_text(n),
                )
            })
            .collect()
    }

    #[test]
    fn identical_annotations_are_left_alone() {
        let base = doc(&[("art_1", "c1", "same")]);
        let addendum = doc(&[("art_1", "c1", "same")]);
        let merged = merge_annotations(&base, &addendum, None).unwrap();
        assert_eq!(comment_texts(&merged), vec![("c1".into(), "same".into())]);
    }

    #[test]
    fn changed_annotation_is_replaced_with_addendum_version() {
        let base = doc(&[("art_1", "c1", "A")]);
        let addendum = doc(&[("art_1", "c1", "B")]);
        let merged = merge_annotations(&base, &addendum, None).unwrap();
        assert_eq!(comment_texts(&merged), vec![("c1".into(), "B".into())]);
    }

    #[test]
    fn new_annotation_is_inserted_at_its_anchor() {
        let base = doc(&[]);
        let addendum = doc(&[("art_2", "c9", "fresh")]);
        let merged = merge_annotations(&base, &addendum, None).unwrap();

        let parsed = parse_bytes(&merged).unwrap();
        let popup = locate::find_by_id(&parsed, "c9").unwrap();
        assert_eq!(locate::enclosing_id(&parsed, popup).as_deref(), Some("art_2"));
    }

    #[test]
    fn base_only_annotations_survive() {
        let base = doc(&[("art_1", "c1", "kept")]);
        let addendum = doc(&[]);
        let merged = merge_annotations(&base, &addendum, None).unwrap();
        assert_eq!(comment_texts(&merged), vec![("c1".into(), "kept".into())]);
    }

    #[test]
    fn merge_is_idempotent() {
        let base = doc(&[("art_1", "c1", "A"), ("art_2", "c2", "B")]);
        let addendum = doc(&[("art_1", "c1", "A2"), ("art_2", "c3", "C")]);
        let once = merge_annotations(&base, &addendum, None).unwrap();
        let twice = merge_annotations(&once, &addendum, None).unwrap();
        assert_eq!(once, twice);
    }
}
