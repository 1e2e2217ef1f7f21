//! Probe placement.
//!
//! Each chapter body gets one probe per canonical word. A probe replaces an
//! existing body word at a randomly sampled position and keeps that word's
//! boundary punctuation outside the delimiters, so the rendered page still
//! reads naturally.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{
    ChapterBody, DEFAULT_DELIMITER, DocPosition, Document, ProbeMarkers, ProbeToken,
};

/// Paragraph style that marks a chapter title in the source manuscripts.
pub const DEFAULT_TITLE_STYLE: &str = "CSP - Chapter Title";

/// Places delimited probe tokens into chapter bodies.
#[derive(Debug, Clone)]
pub struct TokenSeeder {
    title_style: String,
    delimiter: char,
}

impl Default for TokenSeeder {
    fn default() -> Self {
        Self {
            title_style: DEFAULT_TITLE_STYLE.to_string(),
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl TokenSeeder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title_style(mut self, style: impl Into<String>) -> Self {
        self.title_style = style.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn title_style(&self) -> &str {
        &self.title_style
    }

    /// Replace one body word per canonical word in every chapter.
    ///
    /// All chapters are checked for enough body words before anything is
    /// modified, so on error the document is untouched.
    pub fn seed<R, S>(
        &self,
        document: &mut Document,
        words: &[S],
        rng: &mut R,
    ) -> Result<Vec<ProbeToken>>
    where
        R: Rng + ?Sized,
        S: AsRef<str>,
    {
        let bodies = document.chapter_bodies(&self.title_style);

        for body in &bodies {
            let available = document.words_in(body.body.clone()).len();
            if available < words.len() {
                return Err(Error::InsufficientPositions {
                    chapter: body.chapter,
                    available,
                    required: words.len(),
                });
            }
        }

        let mut probes = Vec::with_capacity(bodies.len() * words.len());
        for body in &bodies {
            self.seed_chapter(document, body, words, rng, &mut probes);
        }

        debug!(
            chapters = bodies.len(),
            probes = probes.len(),
            "seeded probe tokens"
        );
        Ok(probes)
    }

    fn seed_chapter<R, S>(
        &self,
        document: &mut Document,
        body: &ChapterBody,
        words: &[S],
        rng: &mut R,
        probes: &mut Vec<ProbeToken>,
    ) where
        R: Rng + ?Sized,
        S: AsRef<str>,
    {
        let range = body.body.clone();
        let mut flat: Vec<String> = document
            .words_in(range.clone())
            .into_iter()
            .map(str::to_owned)
            .collect();

        // Paragraph owning each flattened word
        let owners: Vec<usize> = document.paragraphs[range.clone()]
            .iter()
            .enumerate()
            .flat_map(|(i, p)| std::iter::repeat_n(range.start + i, p.word_count()))
            .collect();

        let mut order: Vec<&str> = words.iter().map(AsRef::as_ref).collect();
        order.shuffle(rng);

        let positions = rand::seq::index::sample(rng, flat.len(), order.len());
        let mut touched = vec![false; range.len()];
        for (word, index) in order.into_iter().zip(positions.iter()) {
            touched[owners[index] - range.start] = true;
            let probe = ProbeToken {
                word: word.to_string(),
                position: DocPosition {
                    chapter: body.chapter,
                    paragraph: owners[index],
                    word: index,
                },
                markers: ProbeMarkers::from_replaced(&flat[index]),
            };
            flat[index] = probe.render(self.delimiter);
            probes.push(probe);
        }

        // Only paragraphs holding a probe are re-joined
        let mut rebuilt = flat.into_iter();
        for (paragraph, touched) in document.paragraphs[range].iter_mut().zip(touched) {
            let count = paragraph.word_count();
            let words: Vec<String> = rebuilt.by_ref().take(count).collect();
            if touched {
                paragraph.text = words.join(" ");
            }
        }
    }
}

/// Copy of `document` with every delimiter character removed.
pub fn strip_probes(document: &Document, delimiter: char) -> Document {
    let mut clean = document.clone();
    for paragraph in &mut clean.paragraphs {
        if paragraph.text.contains(delimiter) {
            paragraph.text = paragraph.text.replace(delimiter, "");
        }
    }
    clean
}
