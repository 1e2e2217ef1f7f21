//! Rewrites changed paragraphs of `document.xml` in place.
//!
//! Unchanged paragraphs are copied byte for byte. A changed paragraph keeps
//! its opening tag and `<w:pPr>`, and its runs are replaced by a single run
//! carrying the first run's `<w:rPr>`.

use quick_xml::escape::partial_escape;

use super::reader::ParagraphSpan;
use crate::model::Paragraph;

/// Splice `updated` paragraph texts into `xml`.
///
/// `spans`, `original` and `updated` are parallel, in document order.
pub fn rewrite_paragraphs(
    xml: &str,
    spans: &[ParagraphSpan],
    original: &[Paragraph],
    updated: &[Paragraph],
) -> String {
    let mut out = String::with_capacity(xml.len() + xml.len() / 8);
    let mut cursor = 0;

    for ((span, before), after) in spans.iter().zip(original).zip(updated) {
        if before.text == after.text {
            continue;
        }
        out.push_str(&xml[cursor..span.element.start]);
        write_paragraph(&mut out, xml, span, &after.text);
        cursor = span.element.end;
    }

    out.push_str(&xml[cursor..]);
    out
}

fn write_paragraph(out: &mut String, xml: &str, span: &ParagraphSpan, text: &str) {
    let tag = &xml[span.start_tag.clone()];
    if span.is_self_closing() {
        out.push_str(tag.trim_end_matches("/>").trim_end());
        out.push('>');
    } else {
        out.push_str(tag);
    }

    if let Some(properties) = &span.properties {
        out.push_str(&xml[properties.clone()]);
    }

    if !text.is_empty() {
        out.push_str("<w:r>");
        if let Some(properties) = &span.first_run_properties {
            out.push_str(&xml[properties.clone()]);
        }
        write_run_content(out, text);
        out.push_str("</w:r>");
    }

    out.push_str("</w:p>");
}

/// Text as `<w:t>` segments separated by tab and break elements.
fn write_run_content(out: &mut String, text: &str) {
    let mut segment = String::new();
    let flush = |out: &mut String, segment: &mut String| {
        if !segment.is_empty() {
            out.push_str(r#"<w:t xml:space="preserve">"#);
            out.push_str(&partial_escape(segment.as_str()));
            out.push_str("</w:t>");
            segment.clear();
        }
    };

    for c in text.chars() {
        match c {
            '\t' => {
                flush(out, &mut segment);
                out.push_str("<w:tab/>");
            }
            '\n' => {
                flush(out, &mut segment);
                out.push_str("<w:br/>");
            }
            _ => segment.push(c),
        }
    }
    flush(out, &mut segment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::reader::{StyleNames, parse_paragraphs};

    fn doc(body: &str) -> String {
        format!(r#"<w:document><w:body>{body}</w:body></w:document>"#)
    }

    fn rewrite(xml: &str, texts: &[&str]) -> String {
        let parsed = parse_paragraphs(xml, &StyleNames::default()).unwrap();
        let (original, spans): (Vec<_>, Vec<_>) = parsed.into_iter().unzip();
        let updated: Vec<Paragraph> = original
            .iter()
            .zip(texts)
            .map(|(p, t)| Paragraph::new(*t, p.style.clone()))
            .collect();
        rewrite_paragraphs(xml, &spans, &original, &updated)
    }

    #[test]
    fn test_unchanged_is_byte_identical() {
        let xml = doc(r#"<w:p><w:r><w:t>a</w:t></w:r></w:p><w:p/>"#);
        assert_eq!(rewrite(&xml, &["a", ""]), xml);
    }

    #[test]
    fn test_changed_paragraph_keeps_properties() {
        let xml = doc(concat!(
            r#"<w:p w:rsidR="01"><w:pPr><w:jc w:val="both"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:i/></w:rPr><w:t>one </w:t></w:r><w:r><w:t>two</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t>keep</w:t></w:r></w:p>"#,
        ));
        let out = rewrite(&xml, &["one |two| & more", "keep"]);
        assert_eq!(
            out,
            doc(concat!(
                r#"<w:p w:rsidR="01"><w:pPr><w:jc w:val="both"/></w:pPr>"#,
                r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">one |two| &amp; more</w:t></w:r></w:p>"#,
                r#"<w:p><w:r><w:t>keep</w:t></w:r></w:p>"#,
            ))
        );
    }

    #[test]
    fn test_self_closing_paragraph_is_opened() {
        let xml = doc(r#"<w:p w14:paraId="7A"/>"#);
        assert_eq!(
            rewrite(&xml, &["x"]),
            doc(r#"<w:p w14:paraId="7A"><w:r><w:t xml:space="preserve">x</w:t></w:r></w:p>"#)
        );
    }

    #[test]
    fn test_tabs_and_breaks() {
        let mut out = String::new();
        write_run_content(&mut out, "a\tb\n");
        assert_eq!(
            out,
            r#"<w:t xml:space="preserve">a</w:t><w:tab/><w:t xml:space="preserve">b</w:t><w:br/>"#
        );
    }
}
