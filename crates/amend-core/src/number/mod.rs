//! Numbering recomputation for ordered element families. After any
//! structural mutation the affected families are walked in document order
//! within their scope and their `num` children rewritten. Renumbering is
//! idempotent: it depends only on sibling order and soft-delete markers,
//! never on the numbers currently in the document.

pub mod style;

pub use style::NumberStyle;

use crate::akn;
use crate::xml::{XmlDocument, XmlNodeData, XName};
use indextree::NodeId;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Where a family's sequence restarts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// One sequence across the whole document.
    Document,
    /// One sequence per container element with this tag.
    Container(&'static str),
    /// One sequence per immediate parent; nested lists number independently.
    Parent,
}

/// One ordered element family. Families are configured independently;
/// adding one is a table edit.
#[derive(Clone, Copy, Debug)]
pub struct NumberingFamily {
    pub tag: &'static str,
    pub scope: Scope,
    pub style: NumberStyle,
    pub prefix: &'static str,
    pub suffix: &'static str,
}

impl NumberingFamily {
    fn format(&self, ordinal: usize) -> String {
        format!("{}{}{}", self.prefix, self.style.render(ordinal), self.suffix)
    }
}

pub const FAMILIES: &[NumberingFamily] = &[
    NumberingFamily {
        tag: akn::ARTICLE,
        scope: Scope::Document,
        style: NumberStyle::Arabic,
        prefix: "Article ",
        suffix: "",
    },
    NumberingFamily {
        tag: akn::RECITAL,
        scope: Scope::Container(akn::RECITALS),
        style: NumberStyle::Arabic,
        prefix: "(",
        suffix: ")",
    },
    NumberingFamily {
        tag: akn::CITATION,
        scope: Scope::Container(akn::CITATIONS),
        style: NumberStyle::Arabic,
        prefix: "(",
        suffix: ")",
    },
    NumberingFamily {
        tag: akn::POINT,
        scope: Scope::Parent,
        style: NumberStyle::AlphaLower,
        prefix: "(",
        suffix: ")",
    },
    NumberingFamily {
        tag: akn::LEVEL,
        scope: Scope::Parent,
        style: NumberStyle::Arabic,
        prefix: "",
        suffix: ".",
    },
];

/// Tag → family dispatch table, built once.
static FAMILY_BY_TAG: Lazy<HashMap<&'static str, &'static NumberingFamily>> =
    Lazy::new(|| FAMILIES.iter().map(|f| (f.tag, f)).collect());

pub fn family_for_tag(tag: &str) -> Option<&'static NumberingFamily> {
    FAMILY_BY_TAG.get(tag).copied()
}

/// Recompute one family. Absent containers mean the family is simply not
/// present; that is not an error.
pub fn renumber(doc: &XmlDocument, family: &NumberingFamily) -> XmlDocument {
    let mut out = doc.clone();
    for group in scope_groups(&out, family) {
        renumber_group(&mut out, family, &group);
    }
    out
}

/// Recompute every configured family.
pub fn renumber_all(doc: &XmlDocument) -> XmlDocument {
    let mut out = doc.clone();
    for family in FAMILIES {
        for group in scope_groups(&out, family) {
            renumber_group(&mut out, family, &group);
        }
    }
    out
}

fn scope_groups(doc: &XmlDocument, family: &NumberingFamily) -> Vec<Vec<NodeId>> {
    let Some(root) = doc.root() else {
        return Vec::new();
    };

    match family.scope {
        Scope::Document => {
            let members: Vec<NodeId> = doc
                .descendants(root)
                .filter(|&n| doc.local_name(n) == Some(family.tag))
                .collect();
            if members.is_empty() {
                Vec::new()
            } else {
                vec![members]
            }
        }
        Scope::Container(container_tag) => {
            let containers: Vec<NodeId> = doc
                .descendants(root)
                .filter(|&n| doc.local_name(n) == Some(container_tag))
                .collect();
            containers
                .into_iter()
                .map(|c| {
                    doc.descendants(c)
                        .filter(|&n| doc.local_name(n) == Some(family.tag))
                        .collect()
                })
                .collect()
        }
        Scope::Parent => {
            // Group members by immediate parent, keeping document order
            // within each group.
            let mut groups: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
            for node in doc.descendants(root) {
                if doc.local_name(node) != Some(family.tag) {
                    continue;
                }
                let Some(parent) = doc.parent(node) else {
                    continue;
                };
                match groups.iter_mut().find(|(p, _)| *p == parent) {
                    Some((_, members)) => members.push(node),
                    None => groups.push((parent, vec![node])),
                }
            }
            groups.into_iter().map(|(_, members)| members).collect()
        }
    }
}

fn renumber_group(doc: &mut XmlDocument, family: &NumberingFamily, members: &[NodeId]) {
    let mut ordinal = 0;
    for &member in members {
        if is_soft_deleted(doc, member) {
            // Numbering stays dense over numbered siblings; the deleted
            // element carries no number at all.
            remove_num(doc, member);
            continue;
        }
        ordinal += 1;
        set_num(doc, member, &family.format(ordinal));
    }
}

fn is_soft_deleted(doc: &XmlDocument, node: NodeId) -> bool {
    doc.attribute(node, akn::STATUS) == Some(akn::STATUS_DELETED)
}

fn set_num(doc: &mut XmlDocument, element: NodeId, value: &str) {
    let existing = doc.child_elements_named(element, akn::NUM).next();
    match existing {
        Some(num) => {
            let old_content: Vec<NodeId> = doc.children(num).collect();
            for child in old_content {
                doc.remove_subtree(child);
            }
            doc.add_child(num, XmlNodeData::text(value));
        }
        None => {
            let num = doc.add_first_child(element, XmlNodeData::element(XName::local(akn::NUM)));
            doc.add_child(num, XmlNodeData::text(value));
        }
    }
}

fn remove_num(doc: &mut XmlDocument, element: NodeId) {
    let existing = doc.child_elements_named(element, akn::NUM).next();
    if let Some(num) = existing {
        doc.remove_subtree(num);
    }
}
