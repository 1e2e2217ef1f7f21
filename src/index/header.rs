//! Page header classification from the leading tokens of extracted text.

use crate::util::parse_numeral;

/// What the top of a page says about its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageHeader {
    /// No text at all.
    Blank,
    /// Running header `Chapter <n> <page>`: a continuation page.
    Running(u32),
    /// A page reading exactly `Chapter <n>`: a chapter title page carrying
    /// no page number.
    TitleMarker,
    /// Leading bare page numeral.
    Numbered(u32),
    /// Text without a recognizable header.
    Unmarked,
}

impl PageHeader {
    /// Classify a page by its first whitespace-delimited tokens.
    pub fn classify(text: &str) -> Self {
        let mut tokens = text.split_whitespace();
        let Some(first) = tokens.next() else {
            return PageHeader::Blank;
        };

        if first.eq_ignore_ascii_case("chapter") {
            let chapter = tokens.next();
            return match tokens.next() {
                Some(token) => match parse_numeral(token) {
                    Some(page) => PageHeader::Running(page),
                    None => PageHeader::Unmarked,
                },
                None if chapter.and_then(parse_numeral).is_some() => PageHeader::TitleMarker,
                None => PageHeader::Unmarked,
            };
        }

        match parse_numeral(first) {
            Some(page) => PageHeader::Numbered(page),
            None => PageHeader::Unmarked,
        }
    }

    /// The physical page number printed in the header, if any.
    pub fn page_number(self) -> Option<u32> {
        match self {
            PageHeader::Running(page) | PageHeader::Numbered(page) => Some(page),
            _ => None,
        }
    }
}
