//! Arabic text normalization
//!
//! Two folding modes share one per-character pipeline:
//! - matching (`normalize`): diacritics, Quranic annotation marks, tatweel and
//!   standalone hamza are dropped, letter-shape variants fold to a base letter
//! - letter counting (`normalize_for_letter_count`): identical, except the
//!   dagger alif survives as its own letter and standalone hamza counts as alif
//!
//! Every source character is canonically decomposed first, so a precomposed
//! `أ` arrives as `ا` followed by a combining hamza, which is then stripped.
//! Letters with no canonical decomposition (alif wasla, alif maksura,
//! ta marbuta) are folded as composed code points afterwards.

use unicode_normalization::char::decompose_canonical;

pub const ALIF: char = '\u{0627}';
pub const HAMZA: char = '\u{0621}';
pub const TATWEEL: char = '\u{0640}';
pub const DAGGER_ALIF: char = '\u{0670}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FoldMode {
    Match,
    LetterCount,
}

fn is_stripped_mark(c: char) -> bool {
    matches!(c,
        '\u{0610}'..='\u{061A}'     // small high honorific signs
        | '\u{064B}'..='\u{065F}'   // harakat, shadda, sukun, combining madda/hamza
        | '\u{06D6}'..='\u{06ED}'   // Quranic pause and annotation marks
        | '\u{08D3}'..='\u{08E1}'   // extended Quranic annotation marks
        | '\u{08E3}'..='\u{08FF}'   // extended harakat, open tanween
        | TATWEEL
    )
}

fn fold_letter(c: char) -> char {
    match c {
        'آ' | 'أ' | 'إ' | 'ٱ' => ALIF,
        'ؤ' => 'و',
        'ئ' | 'ى' => 'ي',
        'ة' => 'ه',
        _ => c,
    }
}

fn map_char(c: char, mode: FoldMode) -> Option<char> {
    match c {
        DAGGER_ALIF => (mode == FoldMode::LetterCount).then_some(DAGGER_ALIF),
        HAMZA => (mode == FoldMode::LetterCount).then_some(ALIF),
        c if is_stripped_mark(c) => None,
        c => Some(fold_letter(c)),
    }
}

/// Runs the pipeline over `text`, handing each output character to `emit`
/// together with the index of the source `char` it came from.
///
/// Whitespace runs collapse to one `' '` attributed to the first whitespace
/// character of the run; leading and trailing whitespace is never emitted.
fn fold_into(text: &str, mode: FoldMode, mut emit: impl FnMut(char, usize)) {
    let mut pending_space: Option<usize> = None;
    let mut started = false;

    for (idx, source) in text.chars().enumerate() {
        decompose_canonical(source, |c| {
            if c.is_whitespace() {
                pending_space.get_or_insert(idx);
                return;
            }
            let Some(folded) = map_char(c, mode) else { return };
            if let Some(space_idx) = pending_space.take() {
                if started {
                    emit(' ', space_idx);
                }
            }
            started = true;
            emit(folded, idx);
        });
    }
}

/// Matching normalization. Two strings are the same word or phrase for
/// search purposes exactly when their normalized forms are equal.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    fold_into(text, FoldMode::Match, |c, _| out.push(c));
    out
}

/// Letter-counting normalization used for abjad values and letter frequencies.
pub fn normalize_for_letter_count(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    fold_into(text, FoldMode::LetterCount, |c, _| out.push(c));
    out
}

/// Matching-normalized text that remembers where each character came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    /// Source `char` index for each `char` of `text`.
    pub offsets: Vec<usize>,
}

impl NormalizedText {
    /// Source `char` index of the `char` starting at `byte_idx` in `text`.
    pub fn source_index_at_byte(&self, byte_idx: usize) -> Option<usize> {
        let char_idx = self.text[..byte_idx].chars().count();
        self.offsets.get(char_idx).copied()
    }
}

/// Same output as [`normalize`], plus a source offset per output character.
pub fn normalize_with_offsets(text: &str) -> NormalizedText {
    let mut out = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len());
    fold_into(text, FoldMode::Match, |c, idx| {
        out.push(c);
        offsets.push(idx);
    });
    NormalizedText { text: out, offsets }
}

/// True when `c` contributes nothing to matching-normalized output and is not
/// whitespace, i.e. it is a mark riding on a neighbouring letter.
pub fn is_silent(c: char) -> bool {
    let mut silent = true;
    decompose_canonical(c, |part| {
        if part.is_whitespace() || map_char(part, FoldMode::Match).is_some() {
            silent = false;
        }
    });
    silent
}
