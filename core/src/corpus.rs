//! Corpus loading: chapters and verses with precomputed normalized text

use crate::error::{QuranSearchError, Result};
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opening invocation prefixed to verse 1 of every chapter but one.
pub const BISMILLAH: &str = "بِسۡمِ ٱللَّهِ ٱلرَّحۡمَٰنِ ٱلرَّحِيمِ";

/// Chapter whose first verse never receives the Bismillah.
pub const BISMILLAH_EXCEPTION_CHAPTER: u32 = 9;

#[derive(Debug, Clone, Deserialize)]
pub struct RawVerse {
    pub id: u32,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawChapter {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub transliteration: Option<String>,
    #[serde(default, rename = "type")]
    pub revelation_type: Option<String>,
    pub verses: Vec<RawVerse>,
}

/// A prepared verse. Built only through `Verse::new`, so the normalized form
/// always tracks `text`.
#[derive(Debug, Clone)]
pub struct Verse {
    id: u32,
    text: String,
    norm_text: String,
}

impl Verse {
    pub fn new(id: u32, text: String) -> Self {
        let norm_text = normalize(&text);
        Self { id, text, norm_text }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn norm_text(&self) -> &str {
        &self.norm_text
    }
}

#[derive(Debug, Clone)]
pub struct Chapter {
    pub id: u32,
    pub name: String,
    pub transliteration: Option<String>,
    pub revelation_type: Option<String>,
    pub verses: Vec<Verse>,
}

/// Chapter listing entry without verse bodies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    pub id: u32,
    pub name: String,
    pub transliteration: Option<String>,
    pub verse_count: usize,
}

/// Immutable, fully prepared corpus.
#[derive(Debug, Clone)]
pub struct CorpusIndex {
    chapters: Vec<Chapter>,
    verse_count: usize,
}

impl CorpusIndex {
    /// Load and prepare the dataset at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            QuranSearchError::CorpusLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        let index = Self::from_json_slice(&bytes)?;
        tracing::info!(
            path = %path.display(),
            chapters = index.chapters.len(),
            verses = index.verse_count,
            "corpus loaded, Bismillah applied and normalized"
        );
        Ok(index)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let raw: Vec<RawChapter> = serde_json::from_slice(bytes)
            .map_err(|e| QuranSearchError::CorpusLoad(format!("malformed dataset: {}", e)))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: Vec<RawChapter>) -> Result<Self> {
        if raw.is_empty() {
            return Err(QuranSearchError::CorpusLoad("dataset has no chapters".to_string()));
        }

        let mut chapters = Vec::with_capacity(raw.len());
        for chapter in raw {
            if chapter.verses.is_empty() {
                return Err(QuranSearchError::CorpusLoad(format!(
                    "chapter {} has no verses",
                    chapter.id
                )));
            }
            chapters.push(prepare_chapter(chapter));
        }

        let verse_count = chapters.iter().map(|c| c.verses.len()).sum();
        Ok(Self { chapters, verse_count })
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, id: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn verse(&self, chapter_id: u32, verse_id: u32) -> Option<(&Chapter, &Verse)> {
        let chapter = self.chapter(chapter_id)?;
        let verse = chapter.verses.iter().find(|v| v.id == verse_id)?;
        Some((chapter, verse))
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn verse_count(&self) -> usize {
        self.verse_count
    }

    pub fn summaries(&self) -> Vec<ChapterSummary> {
        self.chapters
            .iter()
            .map(|c| ChapterSummary {
                id: c.id,
                name: c.name.clone(),
                transliteration: c.transliteration.clone(),
                verse_count: c.verses.len(),
            })
            .collect()
    }
}

fn prepare_chapter(raw: RawChapter) -> Chapter {
    let chapter_id = raw.id;
    let verses = raw
        .verses
        .into_iter()
        .enumerate()
        .map(|(index, verse)| {
            let text = if index == 0 {
                with_bismillah(chapter_id, verse.text)
            } else {
                verse.text
            };
            Verse::new(verse.id, text)
        })
        .collect();

    Chapter {
        id: raw.id,
        name: raw.name,
        transliteration: raw.transliteration,
        revelation_type: raw.revelation_type,
        verses,
    }
}

/// Prefix the opening invocation unless the chapter is exempt or the text
/// already carries it.
pub fn with_bismillah(chapter_id: u32, text: String) -> String {
    if chapter_id == BISMILLAH_EXCEPTION_CHAPTER || text.contains(BISMILLAH) {
        text
    } else {
        format!("{} {}", BISMILLAH, text)
    }
}
