//! Abjad letter values, letter frequencies and modular reductions
//!
//! Values follow the Maghribi ordering (ص=60, ض=90, س=300, ظ=800, غ=900,
//! ش=1000). All inputs are expected to be letter-count normalized, so folded
//! variants (ة, ى, أ ...) never reach the table.

use crate::normalize::{normalize_for_letter_count, DAGGER_ALIF};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The 28 base letters in abjad order followed by the dagger alif.
pub const ARABIC_LETTERS: [(char, u64); 29] = [
    ('ا', 1),
    ('ب', 2),
    ('ج', 3),
    ('د', 4),
    ('ه', 5),
    ('و', 6),
    ('ز', 7),
    ('ح', 8),
    ('ط', 9),
    ('ي', 10),
    ('ك', 20),
    ('ل', 30),
    ('م', 40),
    ('ن', 50),
    ('ص', 60),
    ('ع', 70),
    ('ف', 80),
    ('ض', 90),
    ('ق', 100),
    ('ر', 200),
    ('س', 300),
    ('ت', 400),
    ('ث', 500),
    ('خ', 600),
    ('ذ', 700),
    ('ظ', 800),
    ('غ', 900),
    ('ش', 1000),
    (DAGGER_ALIF, 1),
];

pub const MODULI: [u64; 3] = [98, 66, 92];

/// Value of a single normalized letter; 0 for anything outside the inventory.
pub fn letter_value(c: char) -> u64 {
    ARABIC_LETTERS
        .iter()
        .find(|(letter, _)| *letter == c)
        .map_or(0, |(_, value)| *value)
}

/// Abjad sum of `text` after letter-count normalization, ignoring whitespace.
pub fn word_value(text: &str) -> u64 {
    normalize_for_letter_count(text)
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(letter_value)
        .sum()
}

/// Per-letter frequencies over the full 29-letter inventory.
///
/// Every inventory letter is present in the map, zero counts included, so
/// callers always see the same key set.
pub fn letter_counts(text: &str) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = ARABIC_LETTERS
        .iter()
        .map(|(letter, _)| (letter.to_string(), 0))
        .collect();

    for c in normalize_for_letter_count(text).chars() {
        if letter_value(c) == 0 {
            continue;
        }
        if let Some(count) = counts.get_mut(&c.to_string()) {
            *count += 1;
        }
    }

    counts
}

pub fn unique_letter_count(counts: &BTreeMap<String, u64>) -> usize {
    counts.values().filter(|count| **count > 0).count()
}

/// Floor-division reduction: `quotient * modulus + remainder == value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reduction {
    pub modulus: u64,
    pub quotient: u64,
    pub remainder: u64,
}

impl Reduction {
    pub fn of(value: u64, modulus: u64) -> Self {
        let quotient = value / modulus;
        Self {
            modulus,
            quotient,
            remainder: value - quotient * modulus,
        }
    }
}

/// Reductions of `value` by each of [`MODULI`], in order.
pub fn reductions(value: u64) -> [Reduction; 3] {
    MODULI.map(|modulus| Reduction::of(value, modulus))
}
