//! Byte-level operation facade. External collaborators hand in a document
//! buffer and a structural instruction and get back a new buffer plus a
//! change-summary string for the checkin comment. Every operation reads
//! the buffer once, applies exactly one edit, renumbers and serializes;
//! nothing here retains state across calls.

use crate::akn;
use crate::annotate::{self, Author};
use crate::error::{AmendError, Result};
use crate::ident::IdAllocator;
use crate::merge;
use crate::mutate;
use crate::number;
use crate::settings::EditSettings;
use crate::toc::{self, TocItem, TocMode};
use crate::xml::builder::serialize_bytes;
use crate::xml::parser::{parse_bytes, parse_fragment};
use crate::xml::XmlDocument;
use chrono::{DateTime, Utc};

/// A parsed document handle for callers that run several read-only
/// queries over one buffer.
pub struct AknDocument {
    doc: XmlDocument,
}

impl AknDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: parse_bytes(bytes)?,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize_bytes(&self.doc)
    }

    pub fn xml(&self) -> &XmlDocument {
        &self.doc
    }
}

/// Result of one edit operation: the new buffer and a human-readable
/// summary for the persistence collaborator's checkin comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub content: Vec<u8>,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

fn finish(doc: &XmlDocument, settings: &EditSettings, summary: String) -> Result<EditOutcome> {
    let renumbered;
    let doc = if settings.renumber_after_edit {
        renumbered = number::renumber_all(doc);
        &renumbered
    } else {
        doc
    };
    Ok(EditOutcome {
        content: serialize_bytes(doc)?,
        summary,
    })
}

/// Insert a fragment as a sibling of the anchor element.
pub fn insert_element(
    bytes: &[u8],
    anchor_id: &str,
    fragment_xml: &str,
    position: Position,
    settings: Option<&EditSettings>,
) -> Result<EditOutcome> {
    let default_settings = EditSettings::default();
    let settings = settings.unwrap_or(&default_settings);

    let doc = parse_bytes(bytes)?;
    let fragment = parse_fragment(fragment_xml)?;
    let tag = fragment
        .root()
        .and_then(|r| fragment.local_name(r))
        .unwrap_or("element")
        .to_string();

    let out = mutate::insert_sibling(&doc, anchor_id, fragment_xml, position == Position::Before)?;
    finish(&out, settings, format!("operation.{}.inserted", tag))
}

/// Replace an element's subtree; `None` deletes it.
pub fn replace_element(
    bytes: &[u8],
    tag: &str,
    id: &str,
    new_content_xml: Option<&str>,
    settings: Option<&EditSettings>,
) -> Result<EditOutcome> {
    let default_settings = EditSettings::default();
    let settings = settings.unwrap_or(&default_settings);

    let doc = parse_bytes(bytes)?;
    let out = mutate::replace_by_id(&doc, tag, id, new_content_xml)?;
    let verb = if new_content_xml.is_some() {
        "updated"
    } else {
        "deleted"
    };
    finish(&out, settings, format!("operation.{}.{}", tag, verb))
}

/// Append a fragment under the first element with the given tag, e.g. to
/// inject a metadata block into a document that has none yet.
pub fn append_element(
    bytes: &[u8],
    parent_tag: &str,
    fragment_xml: &str,
    settings: Option<&EditSettings>,
) -> Result<EditOutcome> {
    let default_settings = EditSettings::default();
    let settings = settings.unwrap_or(&default_settings);

    let doc = parse_bytes(bytes)?;
    let out = mutate::append_child(&doc, parent_tag, fragment_xml)?;
    finish(&out, settings, format!("operation.{}.appended", parent_tag))
}

/// Delete an element. Missing ids are a no-op, so retried deletes return
/// the same buffer again.
pub fn delete_element(
    bytes: &[u8],
    tag: &str,
    id: &str,
    settings: Option<&EditSettings>,
) -> Result<EditOutcome> {
    let default_settings = EditSettings::default();
    let settings = settings.unwrap_or(&default_settings);

    let doc = parse_bytes(bytes)?;
    let out = mutate::delete_by_id(&doc, tag, id);
    finish(&out, settings, format!("operation.{}.deleted", tag))
}

/// Recompute every numbering family.
pub fn renumber_document(bytes: &[u8]) -> Result<EditOutcome> {
    let doc = parse_bytes(bytes)?;
    let out = number::renumber_all(&doc);
    Ok(EditOutcome {
        content: serialize_bytes(&out)?,
        summary: "operation.document.renumbered".to_string(),
    })
}

/// Attach a comment to the element with the given id. The popup id is
/// minted against the target buffer; author identity is used verbatim.
pub fn insert_comment(
    bytes: &[u8],
    anchor_id: &str,
    author: &Author,
    text: &str,
    timestamp: DateTime<Utc>,
    settings: Option<&EditSettings>,
) -> Result<EditOutcome> {
    let default_settings = EditSettings::default();
    let settings = settings.unwrap_or(&default_settings);

    let doc = parse_bytes(bytes)?;
    let popup_id = IdAllocator::for_document(&doc)
        .mint_with_length(akn::id_prefix(akn::POPUP), settings.id_length)?;
    let fragment = annotate::comment_fragment(&popup_id, author, text, timestamp)?;
    let out = mutate::insert_annotation(&doc, anchor_id, &fragment, false)?;
    Ok(EditOutcome {
        content: serialize_bytes(&out)?,
        summary: "operation.comment.inserted".to_string(),
    })
}

/// Attach a suggestion to the element with the given id.
pub fn insert_suggestion(
    bytes: &[u8],
    anchor_id: &str,
    author: &Author,
    text: &str,
    timestamp: DateTime<Utc>,
    settings: Option<&EditSettings>,
) -> Result<EditOutcome> {
    let default_settings = EditSettings::default();
    let settings = settings.unwrap_or(&default_settings);

    let doc = parse_bytes(bytes)?;
    let popup_id = IdAllocator::for_document(&doc)
        .mint_with_length(akn::id_prefix(akn::POPUP), settings.id_length)?;
    let fragment = annotate::suggestion_fragment(&popup_id, author, text, timestamp)?;
    let out = mutate::insert_annotation(&doc, anchor_id, &fragment, false)?;
    Ok(EditOutcome {
        content: serialize_bytes(&out)?,
        summary: "operation.suggestion.inserted".to_string(),
    })
}

/// Delete a comment or suggestion by its popup id.
pub fn delete_annotation(bytes: &[u8], annotation_id: &str) -> Result<EditOutcome> {
    let doc = parse_bytes(bytes)?;
    let out = mutate::delete_by_id(&doc, akn::POPUP, annotation_id);
    Ok(EditOutcome {
        content: serialize_bytes(&out)?,
        summary: "operation.annotation.deleted".to_string(),
    })
}

/// Build the table-of-content view of a buffer.
pub fn build_toc(bytes: &[u8], mode: TocMode) -> Result<Vec<TocItem>> {
    let doc = parse_bytes(bytes)?;
    Ok(toc::build_toc(&doc, mode))
}

/// Regenerate tree structure from an edited ToC item list.
pub fn rebuild_from_toc(bytes: &[u8], items: &[TocItem]) -> Result<EditOutcome> {
    let doc = parse_bytes(bytes)?;
    let out = toc::rebuild_tree(&doc, items)?;
    Ok(EditOutcome {
        content: serialize_bytes(&out)?,
        summary: "operation.toc.updated".to_string(),
    })
}

/// Merge the addendum's annotations into the base buffer.
pub fn merge_annotation_documents(
    base: &[u8],
    addendum: &[u8],
    settings: Option<&EditSettings>,
) -> Result<EditOutcome> {
    Ok(EditOutcome {
        content: merge::merge_annotations(base, addendum, settings)?,
        summary: "operation.annotations.merged".to_string(),
    })
}

/// Ancestor ids of an element, root-to-parent, for cross-reference labels.
pub fn ancestor_ids(bytes: &[u8], id: &str) -> Result<Vec<String>> {
    let doc = parse_bytes(bytes)?;
    crate::locate::ancestor_ids(&doc, id)
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::Before => write!(f, "before"),
            Position::After => write!(f, "after"),
        }
    }
}

impl std::str::FromStr for Position {
    type Err = AmendError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "before" => Ok(Position::Before),
            "after" => Ok(Position::After),
            other => Err(AmendError::FragmentParse(format!(
                "unknown position '{}'",
                other
            ))),
        }
    }
}
