//! Construction of annotation (`popup`) fragments. Author identity is
//! supplied by the caller and used verbatim; this module never looks
//! identities up itself.

use crate::akn;
use crate::error::Result;
use crate::xml::builder::serialize_subtree;
use crate::xml::{XAttribute, XmlDocument, XmlNodeData, XName};
use chrono::{DateTime, Utc};

/// Author identity attached to new annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Login of the author.
    pub login: String,
    /// Display name.
    pub name: String,
    /// Organizational unit.
    pub dg: String,
}

impl Author {
    pub fn new(login: &str, name: &str, dg: &str) -> Self {
        Self {
            login: login.to_string(),
            name: name.to_string(),
            dg: dg.to_string(),
        }
    }
}

/// Build a comment fragment ready for `insert_annotation`.
pub fn comment_fragment(
    id: &str,
    author: &Author,
    text: &str,
    timestamp: DateTime<Utc>,
) -> Result<String> {
    popup_fragment(akn::COMMENT_MARKER, id, author, text, timestamp)
}

/// Build a suggestion fragment ready for `insert_annotation`.
pub fn suggestion_fragment(
    id: &str,
    author: &Author,
    text: &str,
    timestamp: DateTime<Utc>,
) -> Result<String> {
    popup_fragment(akn::SUGGESTION_MARKER, id, author, text, timestamp)
}

fn popup_fragment(
    marker: &str,
    id: &str,
    author: &Author,
    text: &str,
    timestamp: DateTime<Utc>,
) -> Result<String> {
    // Built as a tree and serialized so user-supplied text and identity
    // strings are escaped on the way out.
    let mut doc = XmlDocument::new();
    let attrs = vec![
        XAttribute::local(akn::ID, id),
        XAttribute::local(akn::REFERS_TO, marker),
        XAttribute::local("author", &author.login),
        XAttribute::local("authorName", &author.name),
        XAttribute::local("dg", &author.dg),
        XAttribute::local("dateTime", &format_timestamp(timestamp)),
    ];
    let popup = doc.add_root(XmlNodeData::element_with_attrs(
        XName::local(akn::POPUP),
        attrs,
    ));
    if !text.is_empty() {
        doc.add_child(popup, XmlNodeData::text(text));
    }

    serialize_subtree(&doc, popup)
}

/// ISO 8601 UTC, second precision. Stateless call, safe from any thread.
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn comment_fragment_carries_identity_and_marker() {
        let author = Author::new("jdoe", "Jane Doe", "DG JUST");
        let xml = comment_fragment("c1", &author, "needs a citation", fixed_time()).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<popup id="c1" refersTo="~leosComment" author="jdoe" "#,
                r#"authorName="Jane Doe" dg="DG JUST" dateTime="2026-03-14T09:26:53Z">"#,
                r#"needs a citation</popup>"#
            )
        );
    }

    #[test]
    fn fragment_text_is_escaped() {
        let author = Author::new("jdoe", "Jane Doe", "DG JUST");
        let xml = comment_fragment("c1", &author, "a < b & c", fixed_time()).unwrap();
        assert!(xml.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn suggestion_fragment_uses_its_own_marker() {
        let author = Author::new("jdoe", "Jane Doe", "DG JUST");
        let xml = suggestion_fragment("s1", &author, "replace with", fixed_time()).unwrap();
        assert!(xml.contains(r#"refersTo="~leosSuggestion""#));
    }
}
