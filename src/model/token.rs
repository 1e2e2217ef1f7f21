//! Records flowing through the pipeline: placed probes, extracted spans,
//! and recovered entries.

/// Default probe delimiter.
pub const DEFAULT_DELIMITER: char = '|';

/// Left curly quote. Used both as a kept trailing mark and as the
/// normalized form of a leading straight quote.
pub const OPENING_QUOTE: char = '\u{201C}';

/// Punctuation kept outside the right delimiter when a replaced word ends
/// with it.
pub const TRAILING_MARKS: [char; 7] = ['.', ',', ':', ';', '!', '?', OPENING_QUOTE];

/// Punctuation re-attached around a probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeMarkers {
    pub leading: Option<char>,
    pub trailing: Option<char>,
}

impl ProbeMarkers {
    /// Derive the markers from the word a probe replaces.
    pub fn from_replaced(word: &str) -> Self {
        let leading = word.starts_with('"').then_some(OPENING_QUOTE);
        let trailing = word.chars().last().filter(|c| TRAILING_MARKS.contains(c));
        Self { leading, trailing }
    }
}

/// Where a probe was placed in the editable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocPosition {
    pub chapter: u32,
    /// Index of the paragraph holding the probe.
    pub paragraph: usize,
    /// Index into the chapter's flattened body words.
    pub word: usize,
}

/// A canonical word placed in the document behind delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeToken {
    pub word: String,
    pub position: DocPosition,
    pub markers: ProbeMarkers,
}

impl ProbeToken {
    /// The text written into the document, e.g. `“|Alpha|.`
    pub fn render(&self, delimiter: char) -> String {
        let mut out = String::with_capacity(self.word.len() + 6);
        if let Some(c) = self.markers.leading {
            out.push(c);
        }
        out.push(delimiter);
        out.push_str(&self.word);
        out.push(delimiter);
        if let Some(c) = self.markers.trailing {
            out.push(c);
        }
        out
    }
}

/// A delimited span found in extracted page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedToken {
    /// Span contents with all whitespace removed.
    pub text: String,
    /// Physical page number after monotonic correction.
    pub page: u32,
    pub chapter: u32,
    /// 1-based rank of the page within its chapter.
    pub ordinal: usize,
}

/// One row of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct RecoveredEntry {
    pub word: String,
    pub page: u32,
    pub chapter: u32,
}

impl RecoveredEntry {
    pub fn new(word: impl Into<String>, page: u32, chapter: u32) -> Self {
        Self {
            word: word.into(),
            page,
            chapter,
        }
    }
}

/// Sort entries by word, then chapter, then page.
pub fn sort_entries(entries: &mut [RecoveredEntry]) {
    entries.sort_by(|a, b| {
        a.word
            .cmp(&b.word)
            .then(a.chapter.cmp(&b.chapter))
            .then(a.page.cmp(&b.page))
    });
}

/// Sort, then drop exact duplicates.
pub fn dedup_entries(entries: &mut Vec<RecoveredEntry>) {
    sort_entries(entries);
    entries.dedup();
}
