//! Chapter indexing: page texts → [`ChapterMap`].
//!
//! Two header conventions are recognized and may be mixed:
//!
//! - **Running headers.** A page opening with a bare numeral starts a new
//!   chapter; `Chapter <n> <page>` pages continue the current one.
//! - **Title markers.** A page reading exactly `Chapter <n>` marks a chapter
//!   boundary. The next numbered page opens the chapter and further
//!   numbered pages continue it until the next marker, unless a running
//!   header shows up first: continuation pages then carry running headers,
//!   so bare numerals go back to opening chapters.
//!
//! Any other page starting with `Chapter` but lacking a page numeral is a
//! misread running header and is left unassigned.
//!
//! The raw scan is then passed through [`ChapterMap::repair`].

mod header;

pub use header::PageHeader;

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::ChapterMap;

/// How the chapter currently being filled was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opened {
    ByNumeral,
    ByTitleMarker,
}

/// Builds chapter → page coordinate systems from extracted page texts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChapterIndexer;

impl ChapterIndexer {
    /// Scan pages and repair the result into a valid map.
    ///
    /// A document with no page signals yields an empty map.
    pub fn build<S: AsRef<str>>(pages: &[S]) -> ChapterMap {
        let map = ChapterMap::repair(Self::scan(pages));
        debug!(chapters = map.len(), pages = pages.len(), "built chapter map");
        map
    }

    /// First pass: assign header-bearing pages to chapters without repair.
    pub fn scan<S: AsRef<str>>(pages: &[S]) -> BTreeMap<u32, Vec<u32>> {
        let mut chapters: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        let mut current = 0u32;
        let mut opened: Option<Opened> = None;
        let mut pending_title = false;

        for (index, text) in pages.iter().enumerate() {
            match PageHeader::classify(text.as_ref()) {
                PageHeader::Running(page) => {
                    if current == 0 {
                        current = 1;
                    }
                    opened = Some(Opened::ByNumeral);
                    chapters.entry(current).or_default().push(page);
                }
                PageHeader::TitleMarker => pending_title = true,
                PageHeader::Numbered(page) => {
                    if !pending_title && opened == Some(Opened::ByTitleMarker) {
                        chapters.entry(current).or_default().push(page);
                        continue;
                    }
                    current += 1;
                    opened = Some(if pending_title {
                        Opened::ByTitleMarker
                    } else {
                        Opened::ByNumeral
                    });
                    pending_title = false;
                    chapters.insert(current, vec![page]);
                }
                PageHeader::Unmarked => {
                    debug!(index, "page has no header signal");
                }
                PageHeader::Blank => {}
            }
        }

        chapters
    }
}
