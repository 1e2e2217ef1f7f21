//! Recovery of canonical words and final pages from extracted spans.
//!
//! Extraction noise (hyphen breaks, ligature misreads, merged whitespace)
//! must not suppress a true match, while garbage spans must not be promoted
//! to a canonical word. A span is accepted only when its best score is
//! strictly above the threshold.

mod matcher;

pub use matcher::{Matcher, RatioMatcher};

use tracing::{debug, trace, warn};

use crate::model::{ChapterMap, ExtractedToken, RecoveredEntry};
use crate::reproject::PositionReprojector;

/// Default acceptance threshold (exclusive).
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Resolves extracted spans to canonical words and reprojects their pages.
#[derive(Debug, Clone)]
pub struct FuzzyRecoverer<M = RatioMatcher> {
    matcher: M,
    threshold: u8,
}

impl Default for FuzzyRecoverer<RatioMatcher> {
    fn default() -> Self {
        Self::new(RatioMatcher)
    }
}

impl<M: Matcher> FuzzyRecoverer<M> {
    pub fn new(matcher: M) -> Self {
        Self {
            matcher,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Match every token and emit `(word, final page, chapter)` rows.
    ///
    /// Tokens are reprojected from `old` (the map the tokens were extracted
    /// against) onto `new`. Tokens with no alphanumeric content, scores at
    /// or below the threshold, or a chapter missing from either map are
    /// dropped. Duplicates are kept.
    pub fn recover(
        &self,
        tokens: &[ExtractedToken],
        words: &[String],
        old: &ChapterMap,
        new: &ChapterMap,
    ) -> Vec<RecoveredEntry> {
        let reprojector = PositionReprojector::new(old, new);
        let mut entries = Vec::with_capacity(tokens.len());

        for token in tokens {
            if !token.text.chars().any(char::is_alphanumeric) {
                trace!(text = %token.text, "discarding punctuation-only span");
                continue;
            }

            let Some((word, score)) = self.matcher.best_match(&token.text, words) else {
                continue;
            };
            if score <= self.threshold {
                trace!(text = %token.text, best = word, score, "below match threshold");
                continue;
            }

            match reprojector.reproject(token.ordinal, token.chapter) {
                Some(page) => entries.push(RecoveredEntry::new(word, page, token.chapter)),
                None => warn!(
                    word,
                    chapter = token.chapter,
                    "chapter missing from clean rendering; dropping match"
                ),
            }
        }

        debug!(
            tokens = tokens.len(),
            entries = entries.len(),
            "recovered canonical words"
        );
        entries
    }
}
