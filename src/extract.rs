//! Token extraction from rendered page texts.
//!
//! Every page is placed in the chapter map before its delimited spans are
//! read. Page and chapter numbers are forced to move forward through the
//! document; the state carrying the last accepted values is an explicit
//! [`PageCursor`] threaded through the scan.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::{debug, trace};

use crate::index::PageHeader;
use crate::model::{ChapterMap, DEFAULT_DELIMITER, ExtractedToken};
use crate::util::remove_whitespace;

/// Matches `|word|`, tolerating whitespace and line breaks inside the span.
static PIPE_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| span_pattern(DEFAULT_DELIMITER));

fn span_pattern(delimiter: char) -> Regex {
    let d = regex_lite::escape(&delimiter.to_string());
    Regex::new(&format!(r"{d}\s*([^{d}]+?)\s*{d}")).expect("escaped delimiter pattern is valid")
}

/// Last accepted page and chapter during a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCursor {
    pub last_page: u32,
    pub last_chapter: u32,
}

/// Where a page was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub page: u32,
    pub chapter: u32,
    pub ordinal: usize,
}

impl PageCursor {
    /// Place the next page and return the advanced cursor.
    ///
    /// The page number is the header numeral when it moves forward, else
    /// `last_page + 1`. The chapter is the map's chapter for that page when
    /// it moves forward, else the previous chapter; before any chapter has
    /// been seen, the first chapter of the map. The ordinal is clamped onto
    /// the chosen chapter's page list, so a page forced past its chapter's
    /// listed pages still resolves to a real coordinate.
    ///
    /// Returns `None` only for an empty map.
    pub fn advance(self, header_page: Option<u32>, map: &ChapterMap) -> Option<(Self, Placement)> {
        let next = self.last_page.saturating_add(1);
        let page = match header_page {
            Some(page) if page > self.last_page => page,
            _ => next,
        };

        let chapter = match map.chapter_of(page) {
            Some(chapter) if chapter > self.last_chapter => chapter,
            _ if self.last_chapter > 0 => self.last_chapter,
            _ => map.first_chapter()?,
        };

        let ordinal = map.clamped_ordinal(chapter, page)?;
        let cursor = PageCursor {
            last_page: page,
            last_chapter: chapter,
        };
        Some((
            cursor,
            Placement {
                page,
                chapter,
                ordinal,
            },
        ))
    }
}

/// Scans page texts for delimited probe spans.
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    pattern: Regex,
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self {
            pattern: PIPE_SPAN_RE.clone(),
        }
    }
}

impl TokenExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor for probes wrapped in a different delimiter.
    pub fn with_delimiter(delimiter: char) -> Self {
        if delimiter == DEFAULT_DELIMITER {
            return Self::default();
        }
        Self {
            pattern: span_pattern(delimiter),
        }
    }

    /// Span contents on one page, whitespace removed, in reading order.
    pub fn spans(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| remove_whitespace(m.as_str()))
            .collect()
    }

    /// Extract every span with its page, chapter, and ordinal.
    ///
    /// Blank pages and `Chapter <n>` title pages are skipped without moving
    /// the cursor. A page with text but no header (figures, captions, a
    /// smudged header) still takes the next page number once the first
    /// numbered page has been seen; before that it is front matter.
    pub fn extract<S: AsRef<str>>(&self, pages: &[S], map: &ChapterMap) -> Vec<ExtractedToken> {
        let mut cursor = PageCursor::default();
        let mut tokens = Vec::new();

        for (index, text) in pages.iter().enumerate() {
            let text = text.as_ref();
            let header = PageHeader::classify(text);
            let spans = self.spans(text);
            match header {
                PageHeader::Blank | PageHeader::TitleMarker => continue,
                PageHeader::Unmarked if spans.is_empty() && cursor.last_page == 0 => continue,
                _ => {}
            }
            let header_page = header.page_number();

            let Some((next, placement)) = cursor.advance(header_page, map) else {
                debug!(index, spans = spans.len(), "no chapter map; dropping spans");
                continue;
            };
            cursor = next;

            trace!(
                index,
                page = placement.page,
                chapter = placement.chapter,
                ordinal = placement.ordinal,
                spans = spans.len(),
                "placed page"
            );

            tokens.extend(spans.into_iter().map(|text| ExtractedToken {
                text,
                page: placement.page,
                chapter: placement.chapter,
                ordinal: placement.ordinal,
            }));
        }

        debug!(tokens = tokens.len(), "extracted probe spans");
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn map(entries: &[(u32, &[u32])]) -> ChapterMap {
        let raw: BTreeMap<u32, Vec<u32>> = entries.iter().map(|(c, p)| (*c, p.to_vec())).collect();
        ChapterMap::new(raw).unwrap()
    }

    #[test]
    fn test_spans_collapse_whitespace() {
        let extractor = TokenExtractor::new();
        let spans = extractor.spans("a | Al-\n pha |, b |Beta|. c");
        assert_eq!(spans, vec!["Al-pha", "Beta"]);
    }

    #[test]
    fn test_custom_delimiter_spans() {
        let extractor = TokenExtractor::with_delimiter('#');
        assert_eq!(extractor.spans("x #New York# y"), vec!["NewYork"]);
    }

    #[test]
    fn test_extract_scenario() {
        let pages = [
            "Chapter 1",
            "1 The body text |Alpha| continues.",
            "2 |Beta| more text.",
            "Chapter 2",
            "3 |Gamma| final.",
        ];
        let tokens = TokenExtractor::new().extract(&pages, &map(&[(1, &[1, 2]), (2, &[3])]));
        let got: Vec<_> = tokens
            .iter()
            .map(|t| (t.text.as_str(), t.page, t.chapter, t.ordinal))
            .collect();
        assert_eq!(
            got,
            vec![("Alpha", 1, 1, 1), ("Beta", 2, 1, 2), ("Gamma", 3, 2, 1)]
        );
    }

    #[test]
    fn test_regressing_header_is_forced_forward() {
        let pages = ["10 |a|", "Chapter 1 9 |b|", "Chapter 1 12 |c|"];
        let tokens = TokenExtractor::new().extract(&pages, &map(&[(1, &[10, 11, 12])]));
        let pages: Vec<u32> = tokens.iter().map(|t| t.page).collect();
        assert_eq!(pages, vec![10, 11, 12]);
        let ordinals: Vec<usize> = tokens.iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }

    #[test]
    fn test_chapter_never_regresses() {
        // Page 3 is listed under chapter 1, but chapter 2 was already reached
        let cursor = PageCursor {
            last_page: 2,
            last_chapter: 2,
        };
        let (next, placement) = cursor
            .advance(Some(3), &map(&[(1, &[1, 3]), (2, &[5, 6])]))
            .unwrap();
        assert_eq!(next.last_chapter, 2);
        assert_eq!(placement.chapter, 2);
        assert_eq!(placement.ordinal, 1);
    }

    #[test]
    fn test_forced_page_beyond_chapter_clamps_ordinal() {
        // Header missing on the last page: forced to 4, which no chapter lists
        let pages = ["1 a", "Chapter 1 2 |x|", "Chapter 1 3 b", "|y| footer only"];
        let tokens = TokenExtractor::new().extract(&pages, &map(&[(1, &[1, 2, 3])]));
        assert_eq!(tokens.len(), 2);
        assert_eq!((tokens[1].page, tokens[1].chapter, tokens[1].ordinal), (4, 1, 3));
    }

    #[test]
    fn test_front_matter_and_title_pages_do_not_advance() {
        let pages = ["Contents", "Chapter 1", "1 |a|", "Chapter 2", "2 |b|"];
        let tokens = TokenExtractor::new().extract(&pages, &map(&[(1, &[1]), (2, &[2])]));
        let got: Vec<(u32, u32)> = tokens.iter().map(|t| (t.page, t.chapter)).collect();
        assert_eq!(got, vec![(1, 1), (2, 2)]);
    }

    #[test]
    fn test_headerless_text_page_takes_a_page_number() {
        let pages = [
            "1 opening",
            "Figure 1: a caption under the drawing",
            "|Alpha| text continues",
            "Chapter 1 4 closing",
        ];
        let tokens = TokenExtractor::new().extract(&pages, &map(&[(1, &[1, 2, 3, 4])]));
        assert_eq!(
            tokens,
            vec![ExtractedToken {
                text: "Alpha".to_string(),
                page: 3,
                chapter: 1,
                ordinal: 3,
            }]
        );
    }

    #[test]
    fn test_smudged_header_page_still_counts() {
        let pages = ["1 a", "Chapter 1 x2 smudged", "|b| more", "Chapter 1 4 |c|"];
        let tokens = TokenExtractor::new().extract(&pages, &map(&[(1, &[1, 2, 3, 4])]));
        let pages: Vec<u32> = tokens.iter().map(|t| t.page).collect();
        assert_eq!(pages, vec![3, 4]);
    }

    #[test]
    fn test_empty_map_yields_no_tokens() {
        let pages = ["1 |a|", "2 |b|"];
        assert!(TokenExtractor::new().extract(&pages, &ChapterMap::empty()).is_empty());
    }
}
