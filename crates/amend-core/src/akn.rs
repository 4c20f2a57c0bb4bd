//! Tag and attribute vocabulary of the drafted documents. Elements are
//! matched by local name; documents with or without the Akoma Ntoso
//! namespace behave the same.

/// Akoma Ntoso namespace, used when constructing namespaced output.
pub const AKN_NS: &str = "http://docs.oasis-open.org/legaldocml/ns/akn/3.0";

/// Editor-extension namespace carried by drafted documents.
pub const LEOS_NS: &str = "urn:eu:europa:ec:leos";

// Structural tags
pub const ARTICLE: &str = "article";
pub const RECITAL: &str = "recital";
pub const RECITALS: &str = "recitals";
pub const CITATION: &str = "citation";
pub const CITATIONS: &str = "citations";
pub const POINT: &str = "point";
pub const LEVEL: &str = "level";
pub const LIST: &str = "list";
pub const ANNEX: &str = "annex";
pub const BODY: &str = "body";
pub const META: &str = "meta";

// Sub-elements of numbered/headed elements
pub const NUM: &str = "num";
pub const HEADING: &str = "heading";

// Annotations
pub const POPUP: &str = "popup";
pub const REFERS_TO: &str = "refersTo";
pub const COMMENT_MARKER: &str = "~leosComment";
pub const SUGGESTION_MARKER: &str = "~leosSuggestion";

// Addressing
pub const ID: &str = "id";

/// Elements with `status="deleted"` stay in the tree but are skipped by
/// numbering.
pub const STATUS: &str = "status";
pub const STATUS_DELETED: &str = "deleted";

/// Tags that appear in the table-of-content view, in no particular order.
/// Elements with other tags (num, heading, inline text) are content, not
/// structure.
pub const TOC_TAGS: &[&str] = &[
    "preface",
    "preamble",
    CITATIONS,
    CITATION,
    RECITALS,
    RECITAL,
    BODY,
    "part",
    "title",
    "chapter",
    "section",
    ARTICLE,
    "paragraph",
    "subparagraph",
    LIST,
    POINT,
    ANNEX,
    LEVEL,
    "conclusions",
];

const ID_PREFIXES: &[(&str, &str)] = &[
    (ARTICLE, "art_"),
    (RECITAL, "rec_"),
    (RECITALS, "recs_"),
    (CITATION, "cit_"),
    (CITATIONS, "cits_"),
    (POINT, "point_"),
    (LEVEL, "level_"),
    (LIST, "list_"),
    (ANNEX, "annex_"),
    (BODY, "body_"),
    ("paragraph", "par_"),
    ("subparagraph", "subpar_"),
    ("part", "part_"),
    ("title", "title_"),
    ("chapter", "chap_"),
    ("section", "sect_"),
    (POPUP, "popup_"),
];

/// Id prefix minted for new elements of a given tag. Tags without a
/// dedicated prefix share a generic one.
pub fn id_prefix(tag: &str) -> &'static str {
    for &(t, prefix) in ID_PREFIXES {
        if t == tag {
            return prefix;
        }
    }
    "elem_"
}

pub fn is_toc_tag(tag: &str) -> bool {
    TOC_TAGS.contains(&tag)
}
