//! Quran Search - normalized Arabic occurrence search
//!
//! Library providing text normalization, corpus preparation, occurrence
//! counting and abjad statistics.

pub mod normalize;
pub mod abjad;
pub mod corpus;
pub mod overrides;
pub mod search;
pub mod cache;
pub mod dataset;
pub mod error;
pub mod state;

pub use error::QuranSearchError;
pub use state::{AppState, StateConfig};
pub use search::{
    SearchEngine, SearchMode, SearchResult, SearchResponse, MatchSpan, VerseMatches,
    DEFAULT_RESULT_CAP, MAX_QUERY_CHARS,
};
pub use corpus::{Chapter, ChapterSummary, CorpusIndex, Verse, BISMILLAH};
pub use cache::SearchCache;
pub use overrides::CountOverrides;
pub use normalize::{normalize, normalize_for_letter_count};
pub use dataset::{default_dataset_path, verify_file_hash};
