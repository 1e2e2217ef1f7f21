//! Editable document as an ordered list of styled paragraphs.

use std::ops::Range;

/// A paragraph of running text and the name of its paragraph style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Paragraph {
    pub text: String,
    pub style: String,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: style.into(),
        }
    }

    /// Number of whitespace-delimited words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// The body paragraphs of one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterBody {
    /// 1-based chapter number in document order.
    pub chapter: u32,
    /// Index of the chapter-title paragraph.
    pub title: usize,
    /// Paragraphs strictly after the title, up to the next title.
    pub body: Range<usize>,
}

/// Format-agnostic editable document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paragraphs(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Append a paragraph.
    pub fn push(&mut self, text: impl Into<String>, style: impl Into<String>) {
        self.paragraphs.push(Paragraph::new(text, style));
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Locate chapter bodies by exact style-name match on title paragraphs.
    ///
    /// Paragraphs before the first title belong to no chapter.
    pub fn chapter_bodies(&self, title_style: &str) -> Vec<ChapterBody> {
        let titles: Vec<usize> = self
            .paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.style == title_style)
            .map(|(i, _)| i)
            .collect();

        titles
            .iter()
            .enumerate()
            .map(|(n, &title)| {
                let end = titles.get(n + 1).copied().unwrap_or(self.paragraphs.len());
                ChapterBody {
                    chapter: n as u32 + 1,
                    title,
                    body: title + 1..end,
                }
            })
            .collect()
    }

    /// Flatten a paragraph range into its whitespace-delimited words.
    pub fn words_in(&self, range: Range<usize>) -> Vec<&str> {
        self.paragraphs[range]
            .iter()
            .flat_map(|p| p.text.split_whitespace())
            .collect()
    }
}
