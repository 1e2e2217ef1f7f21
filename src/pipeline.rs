//! End-to-end orchestration.
//!
//! ```text
//! seed ─► render(probes) ─► index + extract ──┐
//!   │                                          ├─► recover + reproject ─► table
//!   └─► strip ─► render(clean) ─► index ───────┘
//! ```
//!
//! Rendering and text extraction are external collaborators behind the
//! [`Renderer`] and [`TextExtractor`] traits. Each rendered artifact lives
//! only for the duration of its extraction and is dropped on every exit
//! path, including errors.

use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::extract::TokenExtractor;
use crate::index::ChapterIndexer;
use crate::model::{
    ChapterMap, DEFAULT_DELIMITER, Document, ExtractedToken, ProbeToken, RecoveredEntry,
};
use crate::recover::{DEFAULT_THRESHOLD, FuzzyRecoverer, Matcher, RatioMatcher};
use crate::seed::{DEFAULT_TITLE_STYLE, TokenSeeder, strip_probes};

/// Turns an editable document into a paginated artifact.
pub trait Renderer {
    type Artifact;

    /// Render `document`. Failures abort the run.
    fn convert(&self, document: &Document) -> Result<Self::Artifact>;
}

/// Reads the text of each physical page from a rendered artifact.
pub trait TextExtractor<A> {
    /// One entry per physical page, in order. Entries may be empty.
    fn pages_of(&self, artifact: &A) -> Result<Vec<String>>;
}

/// Render `document` and extract its pages, releasing the artifact before
/// returning.
pub fn render_pages<R, X>(renderer: &R, extractor: &X, document: &Document) -> Result<Vec<String>>
where
    R: Renderer,
    X: TextExtractor<R::Artifact>,
{
    let artifact = renderer.convert(document)?;
    extractor.pages_of(&artifact)
}

/// Configuration shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Paragraph style naming chapter titles.
    pub title_style: String,
    /// Character wrapped around each probe.
    pub delimiter: char,
    /// Match scores must exceed this to be accepted.
    pub threshold: u8,
    /// Expand both chapter maps to contiguous page ranges before use.
    pub fill_page_gaps: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            title_style: DEFAULT_TITLE_STYLE.to_string(),
            delimiter: DEFAULT_DELIMITER,
            threshold: DEFAULT_THRESHOLD,
            fill_page_gaps: true,
        }
    }
}

impl PipelineConfig {
    pub fn with_title_style(mut self, style: impl Into<String>) -> Self {
        self.title_style = style.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_fill_page_gaps(mut self, fill: bool) -> Self {
        self.fill_page_gaps = fill;
        self
    }

    pub fn seeder(&self) -> TokenSeeder {
        TokenSeeder::new()
            .with_title_style(self.title_style.clone())
            .with_delimiter(self.delimiter)
    }

    /// Index `pages`, filling page gaps when configured.
    pub fn chapter_map<S: AsRef<str>>(&self, pages: &[S]) -> ChapterMap {
        let map = ChapterIndexer::build(pages);
        if self.fill_page_gaps {
            map.filled()
        } else {
            map
        }
    }
}

/// Fewer spans extracted than probes placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undercount {
    pub expected: usize,
    pub actual: usize,
}

/// Result of mapping two renderings against each other.
#[derive(Debug, Clone)]
pub struct Mapping {
    /// Coordinate system of the probe-bearing rendering.
    pub probe_map: ChapterMap,
    /// Coordinate system of the clean rendering.
    pub clean_map: ChapterMap,
    pub extracted: Vec<ExtractedToken>,
    pub entries: Vec<RecoveredEntry>,
    /// `chapters × words`: one span per probe if nothing was lost.
    pub expected: usize,
}

impl Mapping {
    pub fn undercount(&self) -> Option<Undercount> {
        (self.extracted.len() < self.expected).then_some(Undercount {
            expected: self.expected,
            actual: self.extracted.len(),
        })
    }
}

/// Maps probe positions from extracted page texts of both renderings.
#[derive(Debug, Clone)]
pub struct ProbeMapper<M = RatioMatcher> {
    config: PipelineConfig,
    recoverer: FuzzyRecoverer<M>,
}

impl Default for ProbeMapper<RatioMatcher> {
    fn default() -> Self {
        Self::with_config(PipelineConfig::default())
    }
}

impl ProbeMapper<RatioMatcher> {
    pub fn with_config(config: PipelineConfig) -> Self {
        Self::with_matcher(config, RatioMatcher)
    }
}

impl<M: Matcher> ProbeMapper<M> {
    pub fn with_matcher(config: PipelineConfig, matcher: M) -> Self {
        let recoverer = FuzzyRecoverer::new(matcher).with_threshold(config.threshold);
        Self { config, recoverer }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Locate every probe of `probe_pages` and reproject it onto
    /// `clean_pages`.
    pub fn map_pages<S: AsRef<str>>(
        &self,
        probe_pages: &[S],
        clean_pages: &[S],
        words: &[String],
    ) -> Mapping {
        let probe_map = self.config.chapter_map(probe_pages);
        let clean_map = self.config.chapter_map(clean_pages);

        let extracted =
            TokenExtractor::with_delimiter(self.config.delimiter).extract(probe_pages, &probe_map);
        let entries = self
            .recoverer
            .recover(&extracted, words, &probe_map, &clean_map);

        let mapping = Mapping {
            expected: probe_map.len() * words.len(),
            probe_map,
            clean_map,
            extracted,
            entries,
        };

        if let Some(Undercount { expected, actual }) = mapping.undercount() {
            warn!(
                expected,
                actual,
                "extracted fewer probes than placed; a headerless final page can cause this"
            );
        }
        if mapping.probe_map.len() != mapping.clean_map.len() {
            warn!(
                probe_chapters = mapping.probe_map.len(),
                clean_chapters = mapping.clean_map.len(),
                "renderings disagree on chapter count"
            );
        }

        mapping
    }
}

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub probes: Vec<ProbeToken>,
    /// Document with probes in place.
    pub seeded: Document,
    /// Seeded document with delimiters removed.
    pub clean: Document,
    pub mapping: Mapping,
}

impl Report {
    pub fn entries(&self) -> &[RecoveredEntry] {
        &self.mapping.entries
    }
}

/// Seeds, renders twice, and maps probes between the renderings.
pub struct Pipeline<R, X, M = RatioMatcher> {
    renderer: R,
    extractor: X,
    mapper: ProbeMapper<M>,
}

impl<R, X> Pipeline<R, X, RatioMatcher>
where
    R: Renderer,
    X: TextExtractor<R::Artifact>,
{
    pub fn new(renderer: R, extractor: X) -> Self {
        Self::with_config(renderer, extractor, PipelineConfig::default())
    }

    pub fn with_config(renderer: R, extractor: X, config: PipelineConfig) -> Self {
        Self {
            renderer,
            extractor,
            mapper: ProbeMapper::with_config(config),
        }
    }
}

impl<R, X, M> Pipeline<R, X, M>
where
    R: Renderer,
    X: TextExtractor<R::Artifact>,
    M: Matcher,
{
    pub fn with_mapper(renderer: R, extractor: X, mapper: ProbeMapper<M>) -> Self {
        Self {
            renderer,
            extractor,
            mapper,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        self.mapper.config()
    }

    /// Run every stage over `document`. The input document is not modified.
    pub fn run<G: Rng + ?Sized>(
        &self,
        document: &Document,
        words: &[String],
        rng: &mut G,
    ) -> Result<Report> {
        let config = self.config();

        let mut seeded = document.clone();
        let probes = config.seeder().seed(&mut seeded, words, rng)?;
        let clean = strip_probes(&seeded, config.delimiter);
        info!(probes = probes.len(), "seeded document");

        let probe_pages = render_pages(&self.renderer, &self.extractor, &seeded)?;
        debug!(pages = probe_pages.len(), "rendered probe document");
        let clean_pages = render_pages(&self.renderer, &self.extractor, &clean)?;
        debug!(pages = clean_pages.len(), "rendered clean document");

        let mapping = self.mapper.map_pages(&probe_pages, &clean_pages, words);
        info!(
            extracted = mapping.extracted.len(),
            recovered = mapping.entries.len(),
            "mapped probes"
        );

        Ok(Report {
            probes,
            seeded,
            clean,
            mapping,
        })
    }
}
