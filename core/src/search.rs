//! Occurrence search over the normalized corpus

use crate::abjad::{letter_counts, reductions, unique_letter_count, word_value};
use crate::corpus::CorpusIndex;
use crate::error::{QuranSearchError, Result};
use crate::normalize::{is_silent, normalize, normalize_with_offsets};
use crate::overrides::CountOverrides;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

pub const DEFAULT_RESULT_CAP: usize = 100;
pub const MAX_QUERY_CHARS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Any non-overlapping occurrence inside the normalized verse.
    #[default]
    Substring,
    /// Occurrences bounded by spaces or the verse edges.
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub chapter_id: u32,
    pub chapter_name: String,
    pub verse_id: u32,
    pub text: String,
    pub occurrences: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub normalized_query: String,
    pub mode: SearchMode,
    pub results: Vec<SearchResult>,
    pub total_occurrences: u64,
    pub total_results: usize,
    pub word_value: u64,
    pub total_calculation: u64,
    pub modulo98_result: u64,
    pub modulo66_result: u64,
    pub modulo92_result: u64,
    pub letter_counts: BTreeMap<String, u64>,
    pub unique_letter_count: usize,
    pub count_overridden: bool,
}

/// Highlight range in `char` indices of a verse's display text, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseMatches {
    pub chapter_id: u32,
    pub chapter_name: String,
    pub verse_id: u32,
    pub text: String,
    pub spans: Vec<MatchSpan>,
}

/// Trim `query` and reject it when empty or oversized.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(QuranSearchError::MissingQuery);
    }
    if trimmed.chars().count() > MAX_QUERY_CHARS {
        return Err(QuranSearchError::InvalidQuery(format!(
            "query longer than {} characters",
            MAX_QUERY_CHARS
        )));
    }
    Ok(trimmed)
}

/// Byte ranges of non-overlapping matches of `needle` in `haystack`.
///
/// Both sides are expected to be matching-normalized, so the only whitespace
/// is a single `' '` between words.
pub fn match_ranges(haystack: &str, needle: &str, mode: SearchMode) -> Vec<Range<usize>> {
    if needle.is_empty() {
        return Vec::new();
    }

    match mode {
        SearchMode::Substring => haystack
            .match_indices(needle)
            .map(|(start, m)| start..start + m.len())
            .collect(),
        SearchMode::Word => {
            let mut ranges = Vec::new();
            let mut from = 0;
            while let Some(pos) = haystack[from..].find(needle) {
                let start = from + pos;
                let end = start + needle.len();
                let starts_word = start == 0 || haystack[..start].ends_with(' ');
                let ends_word = end == haystack.len() || haystack[end..].starts_with(' ');
                if starts_word && ends_word {
                    ranges.push(start..end);
                    from = end;
                } else {
                    from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
                }
            }
            ranges
        }
    }
}

pub fn count_occurrences(haystack: &str, needle: &str, mode: SearchMode) -> u64 {
    match_ranges(haystack, needle, mode).len() as u64
}

pub struct SearchEngine {
    corpus: Arc<CorpusIndex>,
    overrides: CountOverrides,
    result_cap: usize,
}

impl SearchEngine {
    /// Engine over `corpus` with the built-in count overrides and the default cap.
    pub fn new(corpus: Arc<CorpusIndex>) -> Self {
        Self {
            corpus,
            overrides: CountOverrides::builtin(),
            result_cap: DEFAULT_RESULT_CAP,
        }
    }

    pub fn with_overrides(mut self, overrides: CountOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_result_cap(mut self, result_cap: usize) -> Self {
        self.result_cap = result_cap;
        self
    }

    pub fn corpus(&self) -> &CorpusIndex {
        &self.corpus
    }

    pub fn result_cap(&self) -> usize {
        self.result_cap
    }

    pub fn search(&self, query: &str) -> Result<SearchResponse> {
        self.search_with_mode(query, SearchMode::Substring)
    }

    pub fn search_with_mode(&self, query: &str, mode: SearchMode) -> Result<SearchResponse> {
        let started = Instant::now();
        let query = validate_query(query)?;
        let normalized_query = normalize(query);

        let mut results = Vec::new();
        let mut computed_occurrences = 0u64;

        for chapter in self.corpus.chapters() {
            for verse in &chapter.verses {
                let occurrences = count_occurrences(verse.norm_text(), &normalized_query, mode);
                if occurrences == 0 {
                    continue;
                }
                computed_occurrences += occurrences;
                results.push(SearchResult {
                    chapter_id: chapter.id,
                    chapter_name: chapter.name.clone(),
                    verse_id: verse.id(),
                    text: verse.text().to_string(),
                    occurrences,
                });
            }
        }

        let total_results = results.len();
        let (total_occurrences, count_overridden) = match self.overrides.get(&normalized_query) {
            Some(known) => {
                if known != computed_occurrences {
                    tracing::debug!(
                        query = %normalized_query,
                        computed = computed_occurrences,
                        known,
                        "occurrence count replaced by known total"
                    );
                }
                (known, true)
            }
            None => (computed_occurrences, false),
        };

        let word_value = word_value(query);
        let total_calculation = word_value * total_occurrences;
        let [r98, r66, r92] = reductions(total_calculation);
        let letter_counts = letter_counts(query);
        let unique_letter_count = unique_letter_count(&letter_counts);

        results.truncate(self.result_cap);

        tracing::debug!(
            query = %normalized_query,
            ?mode,
            total_results,
            total_occurrences,
            elapsed_us = started.elapsed().as_micros() as u64,
            "search complete"
        );

        Ok(SearchResponse {
            query: query.to_string(),
            normalized_query,
            mode,
            results,
            total_occurrences,
            total_results,
            word_value,
            total_calculation,
            modulo98_result: r98.remainder,
            modulo66_result: r66.remainder,
            modulo92_result: r92.remainder,
            letter_counts,
            unique_letter_count,
            count_overridden,
        })
    }

    /// Highlight spans of `query` inside an arbitrary display `text`.
    ///
    /// Each span starts at the first matched letter and runs past any marks
    /// attached to the last one.
    pub fn match_spans(text: &str, query: &str, mode: SearchMode) -> Result<Vec<MatchSpan>> {
        let needle = normalize(validate_query(query)?);
        let normalized = normalize_with_offsets(text);
        let source: Vec<char> = text.chars().collect();

        let spans = match_ranges(&normalized.text, &needle, mode)
            .into_iter()
            .filter_map(|range| {
                let last_len = normalized.text[range.clone()].chars().next_back()?.len_utf8();
                let start = normalized.source_index_at_byte(range.start)?;
                let mut end = normalized.source_index_at_byte(range.end - last_len)? + 1;
                while end < source.len() && is_silent(source[end]) {
                    end += 1;
                }
                Some(MatchSpan { start, end })
            })
            .collect();

        Ok(spans)
    }

    /// A corpus verse with highlight spans for `query`; no spans without one.
    pub fn verse_matches(
        &self,
        chapter_id: u32,
        verse_id: u32,
        query: Option<&str>,
        mode: SearchMode,
    ) -> Result<VerseMatches> {
        let (chapter, verse) = self.corpus.verse(chapter_id, verse_id).ok_or_else(|| {
            QuranSearchError::NotFound(format!("verse {}:{}", chapter_id, verse_id))
        })?;

        Ok(VerseMatches {
            chapter_id: chapter.id,
            chapter_name: chapter.name.clone(),
            verse_id: verse.id(),
            text: verse.text().to_string(),
            spans: match query {
                Some(query) => Self::match_spans(verse.text(), query, mode)?,
                None => Vec::new(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{RawChapter, RawVerse};
    use rstest::rstest;

    fn engine(verses: &[&str]) -> SearchEngine {
        let raw = RawChapter {
            id: 9,
            name: "test".to_string(),
            transliteration: None,
            revelation_type: None,
            verses: verses
                .iter()
                .enumerate()
                .map(|(i, text)| RawVerse { id: i as u32 + 1, text: text.to_string() })
                .collect(),
        };
        let corpus = CorpusIndex::from_raw(vec![raw]).unwrap();
        SearchEngine::new(Arc::new(corpus)).with_overrides(CountOverrides::none())
    }

    #[rstest]
    #[case("aaaa", "aa", 2)]
    #[case("aaa", "aa", 1)]
    #[case("abab", "ab", 2)]
    #[case("abc", "", 0)]
    #[case("", "a", 0)]
    fn test_substring_count_is_non_overlapping(
        #[case] haystack: &str,
        #[case] needle: &str,
        #[case] expected: u64,
    ) {
        assert_eq!(count_occurrences(haystack, needle, SearchMode::Substring), expected);
    }

    #[rstest]
    #[case("الذين والذين الذين", "الذين", 2)]
    #[case("والذين", "الذين", 0)]
    #[case("قل هو الله احد", "هو الله", 1)]
    #[case("الله الله", "الله", 2)]
    fn test_word_count_respects_boundaries(
        #[case] haystack: &str,
        #[case] needle: &str,
        #[case] expected: u64,
    ) {
        assert_eq!(count_occurrences(haystack, needle, SearchMode::Word), expected);
    }

    #[test]
    fn test_blank_query_rejected() {
        let engine = engine(&["قُلۡ هُوَ ٱللَّهُ أَحَدٌ"]);
        assert!(matches!(engine.search(""), Err(QuranSearchError::MissingQuery)));
        assert!(matches!(engine.search(" \t\n"), Err(QuranSearchError::MissingQuery)));
    }

    #[test]
    fn test_oversized_query_rejected() {
        let engine = engine(&["قُلۡ هُوَ ٱللَّهُ أَحَدٌ"]);
        let query = "ب".repeat(MAX_QUERY_CHARS + 1);
        assert!(matches!(engine.search(&query), Err(QuranSearchError::InvalidQuery(_))));
        assert!(engine.search(&"ب".repeat(MAX_QUERY_CHARS)).is_ok());
    }

    #[test]
    fn test_mark_only_query_matches_nothing() {
        let engine = engine(&["قُلۡ هُوَ ٱللَّهُ أَحَدٌ"]);
        let response = engine.search("\u{064E}").unwrap();
        assert_eq!(response.normalized_query, "");
        assert_eq!(response.total_results, 0);
        assert_eq!(response.total_occurrences, 0);
    }

    #[test]
    fn test_aggregates_and_statistics() {
        let engine = engine(&["قُلۡ هُوَ ٱللَّهُ أَحَدٌ", "ٱللَّهُ ٱلصَّمَدُ", "لَمۡ يَلِدۡ"]);
        let response = engine.search("الله").unwrap();
        assert_eq!(response.total_results, 2);
        assert_eq!(response.total_occurrences, 2);
        assert_eq!(response.word_value, 66);
        assert_eq!(response.total_calculation, 132);
        assert_eq!(response.modulo98_result, 34);
        assert_eq!(response.modulo66_result, 0);
        assert_eq!(response.modulo92_result, 40);
        assert_eq!(response.unique_letter_count, 3);
        assert!(!response.count_overridden);
        let verse_ids: Vec<u32> = response.results.iter().map(|r| r.verse_id).collect();
        assert_eq!(verse_ids, vec![1, 2]);
    }

    #[test]
    fn test_cap_truncates_results_but_not_aggregates() {
        let verses = vec!["ٱللَّهُ ٱللَّهُ"; 5];
        let engine = engine(&verses).with_result_cap(3);
        let response = engine.search("الله").unwrap();
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.total_results, 5);
        assert_eq!(response.total_occurrences, 10);
    }

    #[test]
    fn test_override_replaces_total_only() {
        let engine = engine(&["قُلۡ هُوَ ٱللَّهُ أَحَدٌ"])
            .with_overrides(CountOverrides::from_pairs([("ٱللَّه", 7)]));
        let response = engine.search("الله").unwrap();
        assert!(response.count_overridden);
        assert_eq!(response.total_occurrences, 7);
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].occurrences, 1);
        assert_eq!(response.total_calculation, 66 * 7);
    }

    #[test]
    fn test_match_spans_cover_marks() {
        let text = "قُلۡ هُوَ ٱللَّهُ أَحَدٌ";
        let spans = SearchEngine::match_spans(text, "الله", SearchMode::Substring).unwrap();
        assert_eq!(spans.len(), 1);
        let highlighted: String = text
            .chars()
            .skip(spans[0].start)
            .take(spans[0].end - spans[0].start)
            .collect();
        assert_eq!(highlighted, "ٱللَّهُ");
    }

    #[test]
    fn test_match_spans_word_mode_skips_compounds() {
        let text = "ٱلَّذِينَ وَٱلَّذِينَ";
        let substring = SearchEngine::match_spans(text, "الذين", SearchMode::Substring).unwrap();
        let word = SearchEngine::match_spans(text, "الذين", SearchMode::Word).unwrap();
        assert_eq!(substring.len(), 2);
        assert_eq!(word, vec![MatchSpan { start: 0, end: 9 }]);
    }

    #[test]
    fn test_verse_matches_not_found() {
        let engine = engine(&["لَمۡ يَلِدۡ"]);
        assert!(matches!(
            engine.verse_matches(9, 4, Some("لم"), SearchMode::Substring),
            Err(QuranSearchError::NotFound(_))
        ));
        let found = engine.verse_matches(9, 1, Some("لم"), SearchMode::Substring).unwrap();
        assert_eq!(found.spans, vec![MatchSpan { start: 0, end: 4 }]);
        let plain = engine.verse_matches(9, 1, None, SearchMode::Substring).unwrap();
        assert!(plain.spans.is_empty());
        assert_eq!(plain.text, "لَمۡ يَلِدۡ");
    }
}
