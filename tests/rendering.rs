use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};
use lego_report::builder::{PdfBuildError, PdfBuilder};
use lego_report::fonts;
use lego_report::model::{
    Block, HorizontalAlignment, ImageBlock, ImageSource, RichParagraph, Section, TableBlock,
};
use sha2::{Digest, Sha256};

fn striped_png() -> Vec<u8> {
    let buffer = ImageBuffer::from_fn(120, 60, |x, _| {
        if (x / 10) % 2 == 0 {
            Rgb([0x29, 0x4c, 0x60])
        } else {
            Rgb([0xff, 0xc4, 0x9b])
        }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("encode png");
    bytes
}

fn sample_builder() -> PdfBuilder {
    let summary = Section::new("Top 2 Most Common Parent Themes")
        .with_block(Block::Paragraph(
            RichParagraph::from_markup("Licensed sets account for **26%** of all LEGO sets.")
                .expect("valid markup"),
        ))
        .with_block(Block::table(TableBlock::new(
            vec!["Parent theme".into(), "Sets".into()],
            vec![
                vec!["Town".into(), "6".into()],
                vec!["Technic".into(), "4".into()],
            ],
        )))
        .with_block(Block::Image(
            ImageBlock::new(ImageSource::from_bytes(striped_png()))
                .with_width_mm(120.0)
                .with_alignment(HorizontalAlignment::Left)
                .with_caption(
                    RichParagraph::from_markup("*Striped test image*")
                        .expect("valid markup")
                        .with_alignment(HorizontalAlignment::Right),
                ),
        ));

    PdfBuilder::new()
        .with_title("LEGO Sets Analysis Report")
        .with_running_title("LEGO Sets Analysis Report")
        .add_section(summary)
}

fn render_sample_pdf() -> Option<Vec<u8>> {
    if !fonts::default_fonts_available() {
        return None;
    }

    match sample_builder().render() {
        Ok(pdf) => Some(pdf.bytes),
        Err(PdfBuildError::FontLoad(err)) if fonts::fonts_missing(&err) => {
            eprintln!("Skipping rendering assertions: {}", err);
            None
        }
        Err(other) => panic!("render sample pdf: {other}"),
    }
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            if let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            {
                let start_index = offset + start_pos + start.len();
                if let Some(end_pos) = data[start_index..]
                    .windows(end.len())
                    .position(|window| window == end)
                {
                    for byte in &mut data[start_index..start_index + end_pos] {
                        if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                            *byte = b'0';
                        }
                    }
                    offset = start_index + end_pos + end.len();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(
        &mut normalized,
        b"<xmp:MetadataDate>",
        b"</xmp:MetadataDate>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:DocumentID>",
        b"</xmpMM:DocumentID>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:InstanceID>",
        b"</xmpMM:InstanceID>",
    );
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn renders_non_empty_output() {
    let Some(bytes) = render_sample_pdf() else {
        eprintln!(
            "Skipping renders_non_empty_output: no fonts found. Set LEGO_REPORT_FONTS_DIR or install DejaVu Sans."
        );
        return;
    };
    assert!(bytes.starts_with(b"%PDF"), "output should carry a PDF header");
}

#[test]
fn rendering_is_deterministic_after_scrubbing_metadata() {
    let (Some(first), Some(second)) = (render_sample_pdf(), render_sample_pdf()) else {
        eprintln!("Skipping determinism check: no fonts found.");
        return;
    };
    assert_eq!(normalized_hash(&first), normalized_hash(&second));
}

#[test]
fn ragged_tables_fail_the_render() {
    if !fonts::default_fonts_available() {
        return;
    }
    let section = Section::new("Broken").with_block(Block::table(TableBlock::new(
        vec!["Parent theme".into(), "Sets".into()],
        vec![vec!["Town".into()]],
    )));
    let err = PdfBuilder::new().add_section(section).render().err();
    assert!(matches!(
        err,
        Some(PdfBuildError::Table {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn undecodable_images_name_their_source() {
    if !fonts::default_fonts_available() {
        return;
    }
    let section = Section::new("Charts").with_block(Block::image(ImageSource::from_path(
        "does-not-exist/sets_over_time.png",
    )));
    match PdfBuilder::new().add_section(section).render() {
        Err(PdfBuildError::Image { image, .. }) => {
            assert!(image.ends_with("sets_over_time.png"))
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("missing image should fail"),
    }
}
