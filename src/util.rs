//! Small text and platform helpers shared across the pipeline.

use std::borrow::Cow;

/// Form feed, the page separator emitted by `pdftotext`.
pub const FORM_FEED: u8 = 0x0C;

/// Get a time-based seed value for pseudo-random number generation.
pub fn time_seed_nanos() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(12345)
}

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding
/// 3. Falls back to Windows-1252 (common in word lists exported from spreadsheets)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Split extracted text into physical pages on form feed bytes.
///
/// `pdftotext` terminates every page (including the last) with a form feed,
/// so a single trailing empty segment is dropped. Interior empty pages are
/// kept: they are real blank pages.
pub fn split_pages(bytes: &[u8]) -> Vec<String> {
    let mut pages = Vec::new();
    let mut start = 0;

    for end in memchr::memchr_iter(FORM_FEED, bytes) {
        pages.push(decode_text(&bytes[start..end], None).into_owned());
        start = end + 1;
    }

    if start < bytes.len() {
        pages.push(decode_text(&bytes[start..], None).into_owned());
    }

    pages
}

/// Remove every whitespace character, joining fragments broken across lines.
pub fn remove_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Parse a page-number token. Only plain ASCII digits qualify.
pub fn parse_numeral(token: &str) -> Option<u32> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

// ============================================================================
// Tests
// ============================================================================
