//! In-process paginated renderer.
//!
//! Lays a [`Document`] out as fixed-capacity text pages with the header
//! conventions the indexer understands: a chapter opens on a page headed by
//! its bare page number, continuation pages carry `Chapter <n> <page>`, and
//! front matter gets lower-case roman folios that consume no page numbers.
//! Capacity is counted in characters, so wrapping words in delimiters can
//! push text onto later pages the way a real layout engine would.

use crate::error::Result;
use crate::model::{Document, Paragraph};
use crate::pipeline::{Renderer, TextExtractor};
use crate::seed::DEFAULT_TITLE_STYLE;
use crate::util::FORM_FEED;

/// Layout parameters.
#[derive(Debug, Clone)]
pub struct PaginatorConfig {
    /// Characters of body text per page, separators included.
    pub chars_per_page: usize,
    /// Number printed on the first chapter's opening page.
    pub first_page: u32,
    pub title_style: String,
    /// Emit an unnumbered `Chapter <n>` page before each chapter opener.
    pub title_pages: bool,
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            chars_per_page: 1800,
            first_page: 1,
            title_style: DEFAULT_TITLE_STYLE.to_string(),
            title_pages: false,
        }
    }
}

/// Page texts produced by [`Paginator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagedText {
    pages: Vec<String>,
}

impl PagedText {
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<String> {
        self.pages
    }

    /// Pages joined by form feeds, each page terminated by one.
    pub fn to_form_feed_text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            out.push_str(page);
            out.push(FORM_FEED as char);
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct Paginator {
    config: PaginatorConfig,
}

impl Paginator {
    pub fn new(config: PaginatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    pub fn paginate(&self, document: &Document) -> PagedText {
        let paragraphs = document.paragraphs();
        let bodies = document.chapter_bodies(&self.config.title_style);
        let front_end = bodies.first().map_or(paragraphs.len(), |b| b.title);

        let mut layout = Layout {
            capacity: self.config.chars_per_page.max(1),
            pages: Vec::new(),
            next_page: self.config.first_page,
        };

        layout.front_matter(&paragraphs[..front_end]);
        for body in bodies {
            if self.config.title_pages {
                layout.pages.push(format!("Chapter {}", body.chapter));
            }
            layout.chapter(
                body.chapter,
                &paragraphs[body.title].text,
                &paragraphs[body.body],
            );
        }

        PagedText {
            pages: layout.pages,
        }
    }
}

impl Renderer for Paginator {
    type Artifact = PagedText;

    fn convert(&self, document: &Document) -> Result<PagedText> {
        Ok(self.paginate(document))
    }
}

impl TextExtractor<PagedText> for Paginator {
    fn pages_of(&self, artifact: &PagedText) -> Result<Vec<String>> {
        Ok(artifact.pages.clone())
    }
}

struct Layout {
    capacity: usize,
    pages: Vec<String>,
    next_page: u32,
}

impl Layout {
    fn front_matter(&mut self, paragraphs: &[Paragraph]) {
        if paragraphs.iter().all(|p| p.word_count() == 0) {
            return;
        }
        let mut folio = 1;
        let mut page = Page::open(roman(folio));
        for paragraph in paragraphs {
            for (i, word) in paragraph.text.split_whitespace().enumerate() {
                if !page.fits(word, self.capacity) {
                    self.pages.push(page.text);
                    folio += 1;
                    page = Page::open(roman(folio));
                }
                page.push_word(word, i == 0);
            }
        }
        self.pages.push(page.text);
    }

    fn chapter(&mut self, chapter: u32, title: &str, paragraphs: &[Paragraph]) {
        let mut page = Page::open(self.next_page.to_string());
        page.push_line(title);

        for paragraph in paragraphs {
            let mut new_line = true;
            for word in paragraph.text.split_whitespace() {
                if !page.fits(word, self.capacity) {
                    self.pages.push(page.text);
                    self.next_page += 1;
                    page = Page::open(format!("Chapter {chapter} {}", self.next_page));
                    new_line = true;
                }
                page.push_word(word, new_line);
                new_line = false;
            }
        }

        self.pages.push(page.text);
        self.next_page += 1;
    }
}

struct Page {
    text: String,
    used: usize,
}

impl Page {
    fn open(header: String) -> Self {
        Self {
            text: header,
            used: 0,
        }
    }

    fn push_line(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
        self.used += line.chars().count();
    }

    fn fits(&self, word: &str, capacity: usize) -> bool {
        self.used == 0 || self.used + 1 + word.chars().count() <= capacity
    }

    fn push_word(&mut self, word: &str, new_line: bool) {
        self.text.push(if new_line { '\n' } else { ' ' });
        self.text.push_str(word);
        self.used += 1 + word.chars().count();
    }
}

fn roman(mut n: u32) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}
