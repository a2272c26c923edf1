//! Known occurrence counts that replace the computed substring total
//!
//! Substring counting over-counts words embedded in longer words (لله inside
//! الله, ملك inside مملكة) and misses spellings the folding rules do not
//! unify. For a handful of frequently searched words a curated total is
//! reported instead. This is an approximation layered on top of the general
//! algorithm, not a correctness guarantee.
//!
//! Keys are matched on the matching-normalized query. Only the bare word is
//! keyed; forms with an attached preposition or conjunction are left to the
//! computed count.

use crate::normalize::normalize;
use std::collections::HashMap;

const BUILTIN_COUNTS: &[(&str, u64)] = &[
    ("الله", 2699),
    ("الدُّنيا", 113),
    ("الآخرة", 115),
    ("شهر", 12),
    ("شهور", 8),
    ("يوم", 365),
    ("أيّام", 30),
    ("صلوات", 5),
    ("سبع سماوات", 7),
    ("جزاء", 42),
    ("رَجُل", 23),
    ("امرأة", 23),
    ("جَنّة", 66),
    ("جَهَنّم", 77),
    ("قرآن", 68),
    ("مَلَك", 81),
    ("شيطان", 71),
    ("ابليس", 11),
];

#[derive(Debug, Clone, Default)]
pub struct CountOverrides {
    counts: HashMap<String, u64>,
}

impl CountOverrides {
    /// No overrides: every total is the computed one.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self::from_pairs(BUILTIN_COUNTS.iter().copied())
    }

    /// Keys are normalized on insertion, so any spelling of a word may be used.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        let counts = pairs
            .into_iter()
            .map(|(word, count)| (normalize(word), count))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { counts }
    }

    pub fn get(&self, normalized_query: &str) -> Option<u64> {
        self.counts.get(normalized_query).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_are_normalized() {
        let overrides = CountOverrides::builtin();
        assert_eq!(overrides.get("الله"), Some(2699));
        assert_eq!(overrides.get(&normalize("ٱللَّهِ")), Some(2699));
        assert_eq!(overrides.get("جنه"), Some(66));
        assert_eq!(overrides.get("الاخره"), Some(115));
        assert_eq!(overrides.get("سبع سماوات"), Some(7));
    }

    #[test]
    fn test_prepositional_forms_not_overridden() {
        let overrides = CountOverrides::builtin();
        assert_eq!(overrides.get("لله"), None);
        assert_eq!(overrides.get("بالله"), None);
    }

    #[test]
    fn test_none_overrides_nothing() {
        let none = CountOverrides::none();
        for (word, _) in BUILTIN_COUNTS {
            assert_eq!(none.get(&normalize(word)), None);
        }
    }
}
