//! Error types for pageprobe operations.

use thiserror::Error;

/// Errors that can occur while seeding, rendering, or recovering probes.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid DOCX: {0}")]
    InvalidDocx(String),

    /// A chapter body has fewer words than there are probes to place.
    #[error(
        "chapter {chapter} has {available} body words, but {required} probes must be placed"
    )]
    InsufficientPositions {
        chapter: u32,
        available: usize,
        required: usize,
    },

    /// A chapter map violates its ordering invariants.
    #[error("invalid chapter map: {0}")]
    InvalidChapterMap(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("text extraction failed: {0}")]
    Extract(String),
}

pub type Result<T> = std::result::Result<T, Error>;
