//! File formats at the edges of the pipeline: word lists, page-text dumps,
//! and the output table.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::model::RecoveredEntry;
use crate::util::{FORM_FEED, decode_text, split_pages};

/// Column headers of the output table.
pub const TABLE_HEADER: [&str; 3] = ["Word", "Page Number", "Chapter"];

/// Read a canonical word list.
///
/// One word per line; when a line has several tab- or comma-separated
/// columns, the first one is used. Blank lines and repeats are skipped.
pub fn read_word_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    Ok(parse_word_list(&decode_text(&bytes, None)))
}

pub fn parse_word_list(text: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for line in text.lines() {
        let first = line.split(['\t', ',']).next().unwrap_or_default();
        let word = first.trim().trim_start_matches('\u{FEFF}').trim();
        if word.is_empty() {
            continue;
        }
        if words.iter().any(|w| w == word) {
            debug!(word, "skipping repeated word");
            continue;
        }
        words.push(word.to_string());
    }
    words
}

/// Read a dump of page texts separated by form feeds, as `pdftotext`
/// writes them.
pub fn read_pages(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let bytes = std::fs::read(path)?;
    Ok(split_pages(&bytes))
}

/// Write page texts, each terminated by a form feed.
pub fn write_pages<S: AsRef<str>, W: Write>(pages: &[S], mut writer: W) -> Result<()> {
    for page in pages {
        writer.write_all(page.as_ref().as_bytes())?;
        writer.write_all(&[FORM_FEED])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write entries as a tab-separated table with a header row.
pub fn write_table<W: Write>(entries: &[RecoveredEntry], mut writer: W) -> Result<()> {
    writeln!(writer, "{}", TABLE_HEADER.join("\t"))?;
    for entry in entries {
        writeln!(writer, "{}\t{}\t{}", entry.word, entry.page, entry.chapter)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write entries as a pretty-printed JSON array.
#[cfg(feature = "cli")]
pub fn write_json<W: Write>(entries: &[RecoveredEntry], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, entries).map_err(std::io::Error::from)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_word_list() {
        let text = "\u{FEFF}Alpha\r\nBeta,noun,3\n\n  Gamma\t1\nAlpha\n";
        assert_eq!(parse_word_list(text), vec!["Alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_write_table() {
        let entries = [
            RecoveredEntry::new("Alpha", 1, 1),
            RecoveredEntry::new("Gamma", 3, 2),
        ];
        let mut out = Vec::new();
        write_table(&entries, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Word\tPage Number\tChapter\nAlpha\t1\t1\nGamma\t3\t2\n"
        );
    }

    #[test]
    fn test_pages_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.txt");
        let pages = ["1 first", "", "Chapter 1 2 second"];
        write_pages(&pages, std::fs::File::create(&path).unwrap()).unwrap();
        assert_eq!(read_pages(&path).unwrap(), pages);
    }

    #[test]
    fn test_read_word_list_legacy_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        // "Café" in Windows-1252
        std::fs::write(&path, b"Caf\xe9\nNa\xefve\n").unwrap();
        assert_eq!(read_word_list(&path).unwrap(), vec!["Café", "Naïve"]);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&[RecoveredEntry::new("Alpha", 4, 2)], &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["word"], "Alpha");
        assert_eq!(value[0]["page"], 4);
    }
}
