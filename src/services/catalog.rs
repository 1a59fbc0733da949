//! Source/target language derivation over the supported pair list.
//!
//! Sources are deduplicated by code, targets by full value. The two rules
//! differ: a catalog where one code appears under two names yields one
//! source entry but may yield two target entries.

use std::collections::HashSet;
use tracing::warn;

use crate::core::types::{Language, LanguagePair};

/// Build language pairs from the remote API's hyphen-joined codes,
/// skipping codes that cannot be split.
pub fn pairs_from_codes<S: AsRef<str>>(codes: &[S]) -> Vec<LanguagePair> {
    codes
        .iter()
        .filter_map(|code| {
            let code = code.as_ref();
            let pair = LanguagePair::from_pair_code(code);
            if pair.is_none() {
                warn!("Skipping malformed language pair code {:?}", code);
            }
            pair
        })
        .collect()
}

/// Distinct source languages in first-occurrence order, keyed by code
pub fn list_source_languages(pairs: &[LanguagePair]) -> Vec<Language> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut sources = Vec::new();
    for pair in pairs {
        if seen.insert(pair.from.code.as_str()) {
            sources.push(pair.from.clone());
        }
    }
    sources
}

/// Distinct targets reachable from `source_code`, in first-occurrence order.
///
/// Empty when `source_code` is not a source in `pairs`.
pub fn list_target_languages(pairs: &[LanguagePair], source_code: &str) -> Vec<Language> {
    let mut seen: HashSet<&Language> = HashSet::new();
    let mut targets = Vec::new();
    for pair in pairs.iter().filter(|pair| pair.from.code == source_code) {
        if seen.insert(&pair.to) {
            targets.push(pair.to.clone());
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[&str]) -> Vec<LanguagePair> {
        pairs_from_codes(list)
    }

    fn lang(code: &str, full_name: &str) -> Language {
        Language {
            code: code.to_string(),
            full_name: full_name.to_string(),
        }
    }

    #[test]
    fn test_catalog_example() {
        let pairs = codes(&["en-es", "en-fr", "fr-es"]);

        let sources = list_source_languages(&pairs);
        let source_codes: Vec<_> = sources.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(source_codes, vec!["en", "fr"]);

        let targets = list_target_languages(&pairs, "en");
        assert_eq!(targets, vec![lang("es", "Spanish"), lang("fr", "French")]);
    }

    #[test]
    fn test_sources_unique_and_ordered() {
        let pairs = codes(&["ru-en", "de-en", "ru-de", "en-ru", "de-ru", "ru-uk"]);
        let sources = list_source_languages(&pairs);
        let source_codes: Vec<_> = sources.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(source_codes, vec!["ru", "de", "en"]);
    }

    #[test]
    fn test_unknown_source_yields_no_targets() {
        let pairs = codes(&["en-es", "fr-es"]);
        assert!(list_target_languages(&pairs, "ja").is_empty());
        assert!(list_target_languages(&[], "en").is_empty());
        assert!(list_source_languages(&[]).is_empty());
    }

    #[test]
    fn test_targets_come_from_matching_pairs() {
        let pairs = codes(&["en-es", "fr-de", "en-it", "en-es", "es-en"]);
        let targets = list_target_languages(&pairs, "en");
        assert_eq!(targets, vec![lang("es", "Spanish"), lang("it", "Italian")]);
        for target in &targets {
            assert!(pairs
                .iter()
                .any(|p| p.from.code == "en" && &p.to == target));
        }
    }

    #[test]
    fn test_source_dedup_by_code_target_dedup_by_value() {
        let pairs = vec![
            LanguagePair {
                from: lang("en", "English"),
                to: lang("xx", "xx"),
            },
            LanguagePair {
                from: lang("en", "Anglais"),
                to: lang("xx", "Unknown"),
            },
        ];

        let sources = list_source_languages(&pairs);
        assert_eq!(sources, vec![lang("en", "English")]);

        let targets = list_target_languages(&pairs, "en");
        assert_eq!(targets, vec![lang("xx", "xx"), lang("xx", "Unknown")]);
    }

    #[test]
    fn test_malformed_codes_are_skipped() {
        let pairs = codes(&["en-es", "garbage", "", "fr-es"]);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].code(), "fr-es");
    }
}
