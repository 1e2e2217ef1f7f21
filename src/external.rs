//! Renderer and text extractor backed by external programs.
//!
//! [`SofficeRenderer`] writes the document into a copy of a template DOCX
//! and converts it to PDF with a headless LibreOffice. [`PdftotextExtractor`]
//! reads the pages back with poppler's `pdftotext`. Every intermediate file
//! lives in a temporary directory owned by the [`RenderedPdf`] artifact and
//! is removed when the artifact is dropped.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use tracing::debug;

use crate::docx::DocxPackage;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::pipeline::{Renderer, TextExtractor};
use crate::util::split_pages;

const DOCX_NAME: &str = "document.docx";
const PDF_NAME: &str = "document.pdf";

/// A PDF inside its own temporary directory.
#[derive(Debug)]
pub struct RenderedPdf {
    dir: TempDir,
    path: PathBuf,
}

impl RenderedPdf {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Converts documents to PDF with `soffice --headless`.
#[derive(Debug, Clone)]
pub struct SofficeRenderer {
    template: DocxPackage,
    program: OsString,
}

impl SofficeRenderer {
    /// Render into copies of `template`.
    pub fn new(template: DocxPackage) -> Self {
        Self {
            template,
            program: "soffice".into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }
}

impl Renderer for SofficeRenderer {
    type Artifact = RenderedPdf;

    fn convert(&self, document: &Document) -> Result<RenderedPdf> {
        let dir = tempfile::tempdir()?;
        let docx = dir.path().join(DOCX_NAME);
        self.template.save(document, &docx)?;

        let mut command = Command::new(&self.program);
        command
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(dir.path())
            .arg(&docx);
        run(&mut command).map_err(Error::Render)?;

        let path = dir.path().join(PDF_NAME);
        if !path.is_file() {
            return Err(Error::Render(format!(
                "{} produced no PDF",
                self.program.to_string_lossy()
            )));
        }
        debug!(pdf = %path.display(), "rendered document");
        Ok(RenderedPdf { dir, path })
    }
}

/// Reads page texts with `pdftotext`, one page per form feed.
#[derive(Debug, Clone)]
pub struct PdftotextExtractor {
    program: OsString,
    layout: bool,
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self {
            program: "pdftotext".into(),
            layout: true,
        }
    }
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Keep the physical layout of each page (`-layout`). On by default.
    pub fn with_layout(mut self, layout: bool) -> Self {
        self.layout = layout;
        self
    }

    /// Page texts of the PDF at `path`.
    pub fn pages_of_path(&self, path: &Path) -> Result<Vec<String>> {
        let mut command = Command::new(&self.program);
        if self.layout {
            command.arg("-layout");
        }
        command.arg(path).arg("-");

        let output = run(&mut command).map_err(Error::Extract)?;
        let pages = split_pages(&output.stdout);
        debug!(pages = pages.len(), pdf = %path.display(), "extracted page texts");
        Ok(pages)
    }
}

impl TextExtractor<RenderedPdf> for PdftotextExtractor {
    fn pages_of(&self, artifact: &RenderedPdf) -> Result<Vec<String>> {
        self.pages_of_path(artifact.path())
    }
}

/// Run to completion; a launch failure or non-zero exit becomes a message.
fn run(command: &mut Command) -> std::result::Result<Output, String> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .map_err(|e| format!("failed to launch {program}: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{program} exited with {}: {}", output.status, stderr.trim()));
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_reported() {
        let mut command = Command::new("pageprobe-no-such-program");
        let err = run(&mut command).unwrap_err();
        assert!(err.starts_with("failed to launch pageprobe-no-such-program"));
    }

    #[test]
    fn test_missing_extractor_maps_to_extract_error() {
        let extractor = PdftotextExtractor::new().with_program("pageprobe-no-such-program");
        let result = extractor.pages_of_path(Path::new("missing.pdf"));
        assert!(matches!(result, Err(Error::Extract(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_reported() {
        let mut command = Command::new("false");
        let err = run(&mut command).unwrap_err();
        assert!(err.starts_with("false exited with"));
    }
}
