//! WordprocessingML parsing: paragraph styles and body paragraphs.
//!
//! Element names are matched with the conventional `w:` prefix that Word
//! and LibreOffice both write.

use std::collections::HashMap;
use std::ops::Range;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Result;
use crate::model::Paragraph;

/// Name given to paragraphs when `styles.xml` declares no default.
pub const FALLBACK_STYLE: &str = "Normal";

/// Paragraph style ids mapped to their display names.
#[derive(Debug, Clone, Default)]
pub struct StyleNames {
    names: HashMap<String, String>,
    default_name: Option<String>,
}

impl StyleNames {
    /// Display name for a style id, falling back to the id itself.
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map_or(id, String::as_str)
    }

    pub fn default_name(&self) -> &str {
        self.default_name.as_deref().unwrap_or(FALLBACK_STYLE)
    }
}

/// Byte ranges of one top-level paragraph within `document.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphSpan {
    /// The whole `<w:p>` element.
    pub element: Range<usize>,
    /// The opening tag, or the whole element when self-closing.
    pub start_tag: Range<usize>,
    /// The paragraph's own `<w:pPr>`.
    pub properties: Option<Range<usize>>,
    /// `<w:rPr>` of the first direct run.
    pub first_run_properties: Option<Range<usize>>,
}

impl ParagraphSpan {
    pub fn is_self_closing(&self) -> bool {
        self.element == self.start_tag
    }
}

/// Parse `styles.xml` into a paragraph style table.
pub fn parse_styles(xml: &str) -> Result<StyleNames> {
    let mut reader = Reader::from_str(xml);
    let mut styles = StyleNames::default();

    // (id, is_default) of the paragraph style being read
    let mut current: Option<(String, bool)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:style" => {
                current = paragraph_style_header(&e)?;
            }
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"w:name" => {
                if let (Some((id, is_default)), Some(name)) = (&current, attr(&e, b"w:val")?) {
                    if *is_default && styles.default_name.is_none() {
                        styles.default_name = Some(name.clone());
                    }
                    styles.names.insert(id.clone(), name);
                }
            }
            Event::End(e) if e.name().as_ref() == b"w:style" => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(styles)
}

fn paragraph_style_header(e: &BytesStart<'_>) -> Result<Option<(String, bool)>> {
    if attr(e, b"w:type")?.as_deref() != Some("paragraph") {
        return Ok(None);
    }
    let Some(id) = attr(e, b"w:styleId")? else {
        return Ok(None);
    };
    let is_default = matches!(attr(e, b"w:default")?.as_deref(), Some("1" | "true" | "on"));
    Ok(Some((id, is_default)))
}

/// Parse the body paragraphs of `document.xml`.
///
/// Only direct children of `<w:body>` are paragraphs; paragraphs nested in
/// tables or text boxes are part of the enclosing element. Paragraph text
/// concatenates every `<w:t>` outside nested paragraphs, with `<w:tab/>`
/// as a tab and `<w:br/>` or `<w:cr/>` as a line break.
pub fn parse_paragraphs(xml: &str, styles: &StyleNames) -> Result<Vec<(Paragraph, ParagraphSpan)>> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut open: Option<OpenParagraph> = None;

    loop {
        let before = offset(&reader);
        let event = reader.read_event()?;
        let after = offset(&reader);

        match event {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                let parent = stack.last().map(Vec::as_slice);
                match open.as_mut() {
                    None if name == b"w:p" && parent == Some(&b"w:body"[..]) => {
                        open = Some(OpenParagraph::new(before, after, stack.len() + 1));
                    }
                    Some(p) => p.start(&name, &e, parent, before, stack.len() + 1)?,
                    None => {}
                }
                stack.push(name);
            }
            Event::Empty(e) => {
                let qname = e.name();
                let name = qname.as_ref();
                let parent = stack.last().map(Vec::as_slice);
                match open.as_mut() {
                    None if name == b"w:p" && parent == Some(&b"w:body"[..]) => {
                        let paragraph = Paragraph::new("", styles.default_name());
                        let span = ParagraphSpan {
                            element: before..after,
                            start_tag: before..after,
                            properties: None,
                            first_run_properties: None,
                        };
                        paragraphs.push((paragraph, span));
                    }
                    Some(p) => p.empty(name, &e, parent, before..after, stack.len())?,
                    None => {}
                }
            }
            Event::End(e) => {
                let depth = stack.len();
                stack.pop();
                let closed = open
                    .as_mut()
                    .is_some_and(|p| p.end(e.name().as_ref(), depth, after));
                if closed && let Some(p) = open.take() {
                    paragraphs.push(p.finish(after, styles));
                }
            }
            Event::Text(e) => {
                if let Some(p) = open.as_mut().filter(|p| p.in_text()) {
                    p.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(p) = open.as_mut().filter(|p| p.in_text()) {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        p.text.push_str(&resolved);
                    }
                }
            }
            Event::CData(e) => {
                if let Some(p) = open.as_mut().filter(|p| p.in_text()) {
                    p.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn offset(reader: &Reader<&[u8]>) -> usize {
    reader.buffer_position() as usize
}

/// State of the top-level paragraph being read.
struct OpenParagraph {
    start: usize,
    start_tag: Range<usize>,
    /// Stack depth of the `<w:p>` element itself.
    depth: usize,
    text: String,
    style_id: Option<String>,
    properties: Option<Range<usize>>,
    properties_start: Option<usize>,
    run_properties: Option<Range<usize>>,
    run_properties_start: Option<usize>,
    /// Depth of the first direct run while it is open.
    first_run: Option<usize>,
    seen_run: bool,
    nested: usize,
    text_depth: Option<usize>,
}

impl OpenParagraph {
    fn new(start: usize, tag_end: usize, depth: usize) -> Self {
        Self {
            start,
            start_tag: start..tag_end,
            depth,
            text: String::new(),
            style_id: None,
            properties: None,
            properties_start: None,
            run_properties: None,
            run_properties_start: None,
            first_run: None,
            seen_run: false,
            nested: 0,
            text_depth: None,
        }
    }

    fn in_text(&self) -> bool {
        self.nested == 0 && self.text_depth.is_some()
    }

    /// A child element opened at `depth`.
    fn start(
        &mut self,
        name: &[u8],
        e: &BytesStart<'_>,
        parent: Option<&[u8]>,
        before: usize,
        depth: usize,
    ) -> Result<()> {
        if name == b"w:p" {
            self.nested += 1;
            return Ok(());
        }
        if self.nested > 0 {
            return Ok(());
        }
        match name {
            b"w:pPr" if depth == self.depth + 1 => self.properties_start = Some(before),
            b"w:r" if depth == self.depth + 1 && !self.seen_run => self.first_run = Some(depth),
            b"w:rPr" if self.first_run == Some(depth - 1) => {
                self.run_properties_start = Some(before);
            }
            b"w:t" => self.text_depth = Some(depth),
            _ => self.leaf(name, e, parent)?,
        }
        Ok(())
    }

    /// A self-closing child element whose parent sits at `parent_depth`.
    fn empty(
        &mut self,
        name: &[u8],
        e: &BytesStart<'_>,
        parent: Option<&[u8]>,
        range: Range<usize>,
        parent_depth: usize,
    ) -> Result<()> {
        if self.nested > 0 {
            return Ok(());
        }
        match name {
            b"w:pPr" if parent_depth == self.depth => self.properties = Some(range),
            b"w:rPr" if self.first_run == Some(parent_depth) => self.run_properties = Some(range),
            b"w:r" if parent_depth == self.depth => self.seen_run = true,
            _ => self.leaf(name, e, parent)?,
        }
        Ok(())
    }

    fn leaf(&mut self, name: &[u8], e: &BytesStart<'_>, parent: Option<&[u8]>) -> Result<()> {
        match (name, parent) {
            (b"w:pStyle", Some(b"w:pPr")) if self.style_id.is_none() => {
                self.style_id = attr(e, b"w:val")?;
            }
            (b"w:tab", Some(b"w:r")) => self.text.push('\t'),
            (b"w:br" | b"w:cr", Some(b"w:r")) => self.text.push('\n'),
            _ => {}
        }
        Ok(())
    }

    /// An element closed at `depth`. Returns true when the paragraph itself
    /// closed.
    fn end(&mut self, name: &[u8], depth: usize, after: usize) -> bool {
        if name == b"w:p" {
            if self.nested > 0 {
                self.nested -= 1;
                return false;
            }
            return depth == self.depth;
        }
        if self.nested > 0 {
            return false;
        }
        match name {
            b"w:t" if self.text_depth == Some(depth) => self.text_depth = None,
            b"w:pPr" if depth == self.depth + 1 => {
                if let Some(start) = self.properties_start.take() {
                    self.properties = Some(start..after);
                }
            }
            b"w:rPr" if self.first_run == Some(depth - 1) => {
                if let Some(start) = self.run_properties_start.take() {
                    self.run_properties = Some(start..after);
                }
            }
            b"w:r" if self.first_run == Some(depth) => {
                self.first_run = None;
                self.seen_run = true;
            }
            _ => {}
        }
        false
    }

    fn finish(self, end: usize, styles: &StyleNames) -> (Paragraph, ParagraphSpan) {
        let style = match &self.style_id {
            Some(id) => styles.name_of(id),
            None => styles.default_name(),
        };
        let paragraph = Paragraph::new(self.text, style);
        let span = ParagraphSpan {
            element: self.start..end,
            start_tag: self.start_tag,
            properties: self.properties,
            first_run_properties: self.run_properties,
        };
        (paragraph, span)
    }
}

/// Unescaped value of the attribute named `key`.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            let raw = String::from_utf8(attr.value.to_vec())?;
            let value = quick_xml::escape::unescape(&raw)
                .map_err(quick_xml::Error::from)?
                .into_owned();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn resolve_entity(entity: &str) -> Option<String> {
    let c = match entity {
        "apos" => '\'',
        "quot" => '"',
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        _ => {
            let code = match entity.strip_prefix("#x") {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => entity.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(c.to_string())
}
