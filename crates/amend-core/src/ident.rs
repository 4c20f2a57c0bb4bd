//! Id minting for inserted elements. Ids are opaque tokens, a caller
//! prefix followed by random alphanumeric characters, checked against the
//! ids already present in the target tree. Uniqueness within one document
//! is an absolute invariant; determinism is not.

use crate::akn;
use crate::error::{AmendError, Result};
use crate::xml::XmlDocument;
use std::collections::HashSet;
use uuid::Uuid;

/// Token length used when callers do not specify one.
pub const DEFAULT_ID_LENGTH: usize = 7;

/// Collision retry bound. A collision at production lengths is already
/// vanishingly unlikely; the bound keeps the uniqueness contract absolute
/// rather than probabilistic.
const MAX_ATTEMPTS: u32 = 8;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Mint a fresh id for the given document.
pub fn new_id(doc: &XmlDocument, prefix: &str, length: usize) -> Result<String> {
    IdAllocator::for_document(doc).mint_with_length(prefix, length)
}

/// Id allocator scoped to a single document buffer. Caches the existing id
/// set so operations that mint many ids (a ToC rebuild) scan the tree once;
/// minted ids join the set, so one allocator never repeats itself either.
pub struct IdAllocator {
    existing: HashSet<String>,
}

impl IdAllocator {
    pub fn for_document(doc: &XmlDocument) -> Self {
        let mut existing = HashSet::new();
        if let Some(root) = doc.root() {
            for node in doc.descendants(root) {
                if let Some(id) = doc.attribute(node, akn::ID) {
                    existing.insert(id.to_string());
                }
            }
        }
        Self { existing }
    }

    pub fn mint(&mut self, prefix: &str) -> Result<String> {
        self.mint_with_length(prefix, DEFAULT_ID_LENGTH)
    }

    pub fn mint_with_length(&mut self, prefix: &str, length: usize) -> Result<String> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = format!("{}{}", prefix, random_token(length));
            if !self.existing.contains(&candidate) {
                self.existing.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(AmendError::IdCollisionExhausted {
            prefix: prefix.to_string(),
            attempts: MAX_ATTEMPTS,
        })
    }
}

fn random_token(length: usize) -> String {
    let mut out = String::with_capacity(length);
    while out.len() < length {
        for byte in Uuid::new_v4().as_bytes() {
            if out.len() == length {
                break;
            }
            out.push(ALPHABET[*byte as usize % ALPHABET.len()] as char);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser::parse_str;

    #[test]
    fn minted_ids_have_prefix_and_length() {
        let doc = parse_str("<bill/>").unwrap();
        let id = new_id(&doc, "art_", DEFAULT_ID_LENGTH).unwrap();
        assert!(id.starts_with("art_"));
        assert_eq!(id.len(), "art_".len() + DEFAULT_ID_LENGTH);
        assert!(id["art_".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn allocator_never_repeats_within_one_document() {
        let doc = parse_str(r#"<bill id="bill_1"/>"#).unwrap();
        let mut alloc = IdAllocator::for_document(&doc);
        let mut seen = HashSet::new();
        for _ in 0..500 {
            assert!(seen.insert(alloc.mint("art_").unwrap()));
        }
    }

    #[test]
    fn existing_ids_are_collected_from_the_tree() {
        let doc = parse_str(r#"<bill id="a"><article id="b"/></bill>"#).unwrap();
        let alloc = IdAllocator::for_document(&doc);
        assert!(alloc.existing.contains("a"));
        assert!(alloc.existing.contains("b"));
    }
}
