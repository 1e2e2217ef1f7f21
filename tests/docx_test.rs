use std::io::{Cursor, Read, Write};

use pageprobe::{
    DEFAULT_TITLE_STYLE, DocxPackage, Error, Paginator, Pipeline, TokenSeeder, strip_probes,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:customStyle="1" w:styleId="CSP-ChapterTitle"><w:name w:val="CSP - Chapter Title"/></w:style>
</w:styles>"#;

fn title(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="CSP-ChapterTitle"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>"#
    )
}

fn body(text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:jc w:val="both"/></w:pPr><w:r><w:rPr><w:sz w:val="24"/></w:rPr><w:t xml:space="preserve">{text}</w:t></w:r></w:p>"#
    )
}

fn sample_docx() -> Vec<u8> {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );
    xml.push_str(&body("Copyright &amp; credits"));
    xml.push_str(&title("The First"));
    xml.push_str(&body("It was a bright cold day in April, and the clocks were striking thirteen."));
    xml.push_str(&body("Winston Smith slipped quickly through the glass doors of Victory Mansions."));
    xml.push_str(&title("The Second"));
    xml.push_str(&body("&#8220;Who controls the past controls the future,&#8221; ran the slogan."));
    xml.push_str(r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#);
    xml.push_str(&body("Who controls the present controls the past."));
    xml.push_str(r#"<w:sectPr/></w:body></w:document>"#);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(b"<Types/>").unwrap();
    zip.start_file("word/styles.xml", options).unwrap();
    zip.write_all(STYLES.as_bytes()).unwrap();
    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

fn document_xml(bytes: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[test]
fn test_read_paragraphs_and_styles() {
    let docx = DocxPackage::from_bytes(&sample_docx()).unwrap();
    let doc = docx.document();

    assert_eq!(doc.paragraphs.len(), 7);
    assert_eq!(doc.paragraphs[0].text, "Copyright & credits");
    assert_eq!(doc.paragraphs[1].style, DEFAULT_TITLE_STYLE);
    assert_eq!(doc.paragraphs[2].style, "Normal");
    assert!(doc.paragraphs[5].text.starts_with('\u{201C}'));

    let chapters = doc.chapter_bodies(DEFAULT_TITLE_STYLE);
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[1].body, 5..7);
}

#[test]
fn test_seed_write_reread() {
    let docx = DocxPackage::from_bytes(&sample_docx()).unwrap();
    let mut seeded = docx.document().clone();
    let probes = TokenSeeder::new()
        .seed(&mut seeded, &["Alpha", "Beta"], &mut ChaCha8Rng::seed_from_u64(5))
        .unwrap();
    assert_eq!(probes.len(), 4);

    let bytes = docx.to_bytes(&seeded).unwrap();
    let reread = DocxPackage::from_bytes(&bytes).unwrap();
    assert_eq!(reread.document(), &seeded);

    // Paragraph and run formatting survive the rewrite
    let xml = document_xml(&bytes);
    assert_eq!(xml.matches(r#"<w:jc w:val="both"/>"#).count(), 5);
    assert_eq!(xml.matches(r#"<w:sz w:val="24"/>"#).count(), 5);
    assert!(xml.contains("<w:t>cell</w:t>"));
    assert_eq!(xml.matches("|Alpha|").count(), 2);
}

#[test]
fn test_clean_document_has_no_delimiters() {
    let docx = DocxPackage::from_bytes(&sample_docx()).unwrap();
    let mut seeded = docx.document().clone();
    TokenSeeder::new()
        .seed(&mut seeded, &["Alpha"], &mut ChaCha8Rng::seed_from_u64(9))
        .unwrap();
    let clean = strip_probes(&seeded, '|');

    let file = NamedTempFile::new().unwrap();
    docx.save(&clean, file.path()).unwrap();
    let reread = DocxPackage::open(file.path()).unwrap();

    assert!(reread.document().paragraphs.iter().all(|p| !p.text.contains('|')));
    assert_eq!(reread.document(), &clean);
}

#[test]
fn test_unchanged_document_is_preserved() {
    let original = sample_docx();
    let docx = DocxPackage::from_bytes(&original).unwrap();
    let bytes = docx.to_bytes(docx.document()).unwrap();
    assert_eq!(document_xml(&bytes), document_xml(&original));
}

#[test]
fn test_pipeline_over_docx_body() {
    let docx = DocxPackage::from_bytes(&sample_docx()).unwrap();
    let words = vec!["Alpha".to_string()];
    let report = Pipeline::new(Paginator::default(), Paginator::default())
        .run(docx.document(), &words, &mut ChaCha8Rng::seed_from_u64(2))
        .unwrap();

    let chapters: Vec<u32> = report.entries().iter().map(|e| e.chapter).collect();
    assert_eq!(chapters, vec![1, 2]);
    assert!(docx.to_bytes(&report.seeded).is_ok());
}

#[test]
fn test_too_many_words_is_reported() {
    let docx = DocxPackage::from_bytes(&sample_docx()).unwrap();
    let words: Vec<String> = (0..40).map(|i| format!("w{i}")).collect();
    let mut doc = docx.document().clone();
    let err = TokenSeeder::new()
        .seed(&mut doc, &words, &mut ChaCha8Rng::seed_from_u64(1))
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientPositions { chapter: 1, .. }));
}
