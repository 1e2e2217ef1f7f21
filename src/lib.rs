//! # pageprobe
//!
//! Find the printed page of every occurrence of a word list in a typeset
//! document, without a layout engine of its own.
//!
//! Each canonical word is planted once per chapter as a delimited probe
//! (`|word|`). The probe-bearing document is rendered and its page texts are
//! scanned for probes; the chapter and page-within-chapter of each find are
//! then carried over to a rendering of the clean document, whose pagination
//! may differ slightly.
//!
//! ## Quick Start
//!
//! ```
//! use pageprobe::{Document, Paginator, Pipeline, DEFAULT_TITLE_STYLE};
//! use rand::SeedableRng;
//!
//! let mut doc = Document::new();
//! doc.push("The Beginning", DEFAULT_TITLE_STYLE);
//! doc.push("It was a bright cold day in April and the clocks were striking.", "Normal");
//!
//! let words = vec!["Winston".to_string()];
//! let pipeline = Pipeline::new(Paginator::default(), Paginator::default());
//! let report = pipeline
//!     .run(&doc, &words, &mut rand::rngs::StdRng::seed_from_u64(7))
//!     .unwrap();
//!
//! assert_eq!(report.entries()[0].word, "Winston");
//! assert_eq!(report.entries()[0].page, 1);
//! ```
//!
//! ## Components
//!
//! - [`TokenSeeder`] places probes in chapter bodies.
//! - [`ChapterIndexer`] derives a [`ChapterMap`] from page headers.
//! - [`TokenExtractor`] reads probes and their page coordinates.
//! - [`PositionReprojector`] carries coordinates between two chapter maps.
//! - [`FuzzyRecoverer`] resolves noisy spans to canonical words.
//!
//! Rendering is pluggable through [`Renderer`] and [`TextExtractor`]:
//! [`Paginator`] lays text out in-process, while [`SofficeRenderer`] and
//! [`PdftotextExtractor`] drive LibreOffice and poppler.

pub mod docx;
pub mod error;
pub mod external;
pub mod extract;
pub mod index;
pub mod io;
pub mod model;
pub mod paginate;
pub mod pipeline;
pub mod recover;
pub mod reproject;
pub mod seed;
pub mod util;

pub use docx::DocxPackage;
pub use error::{Error, Result};
pub use external::{PdftotextExtractor, RenderedPdf, SofficeRenderer};
pub use extract::{PageCursor, Placement, TokenExtractor};
pub use index::{ChapterIndexer, PageHeader};
pub use model::{
    ChapterBody, ChapterMap, DEFAULT_DELIMITER, DocPosition, Document, ExtractedToken, Paragraph,
    ProbeMarkers, ProbeToken, RecoveredEntry, dedup_entries, sort_entries,
};
pub use paginate::{PagedText, Paginator, PaginatorConfig};
pub use pipeline::{
    Mapping, Pipeline, PipelineConfig, ProbeMapper, Renderer, Report, TextExtractor, Undercount,
    render_pages,
};
pub use recover::{DEFAULT_THRESHOLD, FuzzyRecoverer, Matcher, RatioMatcher};
pub use reproject::{PositionReprojector, reproject};
pub use seed::{DEFAULT_TITLE_STYLE, TokenSeeder, strip_probes};
