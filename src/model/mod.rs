//! Core data model for probe tracking.
//!
//! This module contains:
//! - The chapter → page coordinate system built per rendering
//! - The editable document (styled paragraphs)
//! - Probe, extracted-span, and output records

mod chapter_map;
mod document;
mod token;

pub use chapter_map::ChapterMap;

pub use document::{ChapterBody, Document, Paragraph};

pub use token::{
    DEFAULT_DELIMITER, DocPosition, ExtractedToken, OPENING_QUOTE, ProbeMarkers, ProbeToken,
    RecoveredEntry, TRAILING_MARKS, dedup_entries, sort_entries,
};
