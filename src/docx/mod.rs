//! DOCX package adapter.
//!
//! A [`DocxPackage`] keeps every zip entry of the source file and exposes
//! its body as a [`Document`]. Saving writes the same entries back, with
//! `word/document.xml` rewritten for paragraphs whose text changed.

mod reader;
mod writer;

pub use reader::{FALLBACK_STYLE, ParagraphSpan, StyleNames, parse_paragraphs, parse_styles};
pub use writer::rewrite_paragraphs;

use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::model::Document;

/// Main document part.
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Style definitions part.
pub const STYLES_PART: &str = "word/styles.xml";

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// An opened `.docx` file.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<Part>,
    document_xml: String,
    spans: Vec<ParagraphSpan>,
    document: Document,
}

impl DocxPackage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
            });
        }

        let document_xml = match parts.iter().find(|p| p.name == DOCUMENT_PART) {
            Some(part) => String::from_utf8(part.data.clone())?,
            None => return Err(Error::InvalidDocx(format!("missing {DOCUMENT_PART}"))),
        };
        let styles = match parts.iter().find(|p| p.name == STYLES_PART) {
            Some(part) => parse_styles(&String::from_utf8_lossy(&part.data))?,
            None => StyleNames::default(),
        };

        let (paragraphs, spans): (Vec<_>, Vec<_>) =
            parse_paragraphs(&document_xml, &styles)?.into_iter().unzip();
        debug!(
            parts = parts.len(),
            paragraphs = paragraphs.len(),
            "opened docx package"
        );

        Ok(Self {
            parts,
            document_xml,
            spans,
            document: Document::from_paragraphs(paragraphs),
        })
    }

    /// The body as read from the package.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Serialize the package with the paragraph texts of `document`.
    ///
    /// `document` must have the same paragraph count as the package. Style
    /// changes are not written back.
    pub fn to_bytes(&self, document: &Document) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.write_to(document, &mut buf)?;
        Ok(buf.into_inner())
    }

    pub fn save(&self, document: &Document, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(document, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write + Seek>(&self, document: &Document, writer: W) -> Result<()> {
        let expected = self.spans.len();
        let found = document.paragraphs.len();
        if found != expected {
            return Err(Error::InvalidDocx(format!(
                "document has {found} paragraphs, package has {expected}"
            )));
        }

        let xml = rewrite_paragraphs(
            &self.document_xml,
            &self.spans,
            &self.document.paragraphs,
            &document.paragraphs,
        );

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(writer);
        for part in &self.parts {
            zip.start_file(part.name.as_str(), options)?;
            if part.name == DOCUMENT_PART {
                zip.write_all(xml.as_bytes())?;
            } else {
                zip.write_all(&part.data)?;
            }
        }
        zip.finish()?;
        Ok(())
    }
}
