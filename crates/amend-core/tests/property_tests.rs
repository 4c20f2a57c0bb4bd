//! Contract properties over generated documents: parse/serialize
//! round-trip, renumbering idempotence and id uniqueness.

use amend_core::ident::IdAllocator;
use amend_core::number;
use amend_core::xml::builder::serialize;
use amend_core::xml::parser::parse_str;
use proptest::prelude::*;
use std::collections::HashSet;

const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Canonical bill with one article per flag; `true` marks the article
/// soft-deleted.
fn bill(flags: &[bool]) -> String {
    if flags.is_empty() {
        return format!("{}<bill><body/></bill>", DECL);
    }
    let mut articles = String::new();
    for (i, &deleted) in flags.iter().enumerate() {
        if deleted {
            articles.push_str(&format!(r#"<article id="art_{}" status="deleted"/>"#, i));
        } else {
            articles.push_str(&format!(r#"<article id="art_{}"/>"#, i));
        }
    }
    format!("{}<bill><body>{}</body></bill>", DECL, articles)
}

proptest! {
    #[test]
    fn round_trip_is_byte_stable(flags in proptest::collection::vec(any::<bool>(), 0..12)) {
        let src = bill(&flags);
        let doc = parse_str(&src).unwrap();
        prop_assert_eq!(serialize(&doc).unwrap(), src);
    }

    #[test]
    fn renumbering_twice_equals_renumbering_once(
        flags in proptest::collection::vec(any::<bool>(), 0..12)
    ) {
        let doc = parse_str(&bill(&flags)).unwrap();
        let once = number::renumber_all(&doc);
        let twice = number::renumber_all(&once);
        prop_assert_eq!(serialize(&once).unwrap(), serialize(&twice).unwrap());
    }

    #[test]
    fn renumbering_is_dense_over_live_articles(
        flags in proptest::collection::vec(any::<bool>(), 0..12)
    ) {
        let doc = parse_str(&bill(&flags)).unwrap();
        let out = number::renumber_all(&doc);
        let xml = serialize(&out).unwrap();

        let live = flags.iter().filter(|&&d| !d).count();
        for ordinal in 1..=live {
            prop_assert!(xml.contains(&format!("<num>Article {}</num>", ordinal)), "missing live article {}", ordinal);
        }
        prop_assert!(!xml.contains(&format!("<num>Article {}</num>", live + 1)), "unexpected article {}", live + 1);
    }

    #[test]
    fn minted_ids_stay_unique(count in 1usize..200, len in 4usize..10) {
        let doc = parse_str(&bill(&[false, true])).unwrap();
        let mut alloc = IdAllocator::for_document(&doc);
        let mut seen = HashSet::new();
        for _ in 0..count {
            let id = alloc.mint_with_length("art_", len).unwrap();
            prop_assert!(seen.insert(id));
        }
    }
}
