//! Logical content of the report document.
//!
//! Sections are made of plain data blocks: paragraphs, tables and images.
//! They carry no `genpdf` types, so the assembler can build and test them
//! without fonts; [`crate::builder`] turns them into elements.

use std::path::PathBuf;

use crate::richtext::{parse_markup, MarkupError, Span};

/// Horizontal placement of paragraphs and images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A paragraph of styled spans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
    alignment: HorizontalAlignment,
}

impl RichParagraph {
    /// Left-aligned paragraph of the given spans.
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
            ..Self::default()
        }
    }

    /// Builds the paragraph from report markup, see [`parse_markup`].
    pub fn from_markup(markup: &str) -> Result<Self, MarkupError> {
        Ok(Self::new(parse_markup(markup)?))
    }

    /// Styled runs in reading order.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Concatenated text of all spans, without styling.
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(Span::text).collect()
    }

    /// How the paragraph is placed on the line.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Replaces the alignment.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// A bordered table with a bold header row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableBlock {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    column_weights: Option<Vec<usize>>,
}

impl TableBlock {
    /// Table with a header row and equal column widths.
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            header,
            rows,
            column_weights: None,
        }
    }

    /// Header cells, printed bold.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Body rows below the header.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Relative column widths; equal widths unless set.
    pub fn column_weights(&self) -> Vec<usize> {
        self.column_weights
            .clone()
            .unwrap_or_else(|| vec![1; self.header.len()])
    }

    /// Sets relative column widths; `None` restores equal widths.
    pub fn with_column_weights(mut self, weights: impl Into<Option<Vec<usize>>>) -> Self {
        self.column_weights = weights.into();
        self
    }
}

/// Where an image's encoded bytes come from.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

impl ImageSource {
    /// Image decoded from encoded bytes in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Image read from a file when the document is built.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

/// An image with an optional caption, scaled to `width_mm` when set.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    source: ImageSource,
    caption: Option<RichParagraph>,
    alignment: HorizontalAlignment,
    width_mm: Option<f64>,
}

impl ImageBlock {
    /// Uncaptioned, centred image at its natural size.
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            caption: None,
            alignment: HorizontalAlignment::Center,
            width_mm: None,
        }
    }

    /// Where the image data comes from.
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    /// Caption printed below the image, if any.
    pub fn caption(&self) -> Option<&RichParagraph> {
        self.caption.as_ref()
    }

    /// How the image is placed on the page.
    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Printed width in millimetres, natural width when `None`.
    pub fn width_mm(&self) -> Option<f64> {
        self.width_mm
    }

    /// Sets or clears the caption.
    pub fn with_caption(mut self, caption: impl Into<Option<RichParagraph>>) -> Self {
        self.caption = caption.into();
        self
    }

    /// Replaces the alignment.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets or clears the printed width.
    pub fn with_width_mm(mut self, width_mm: impl Into<Option<f64>>) -> Self {
        self.width_mm = width_mm.into();
        self
    }
}

/// One printable piece of a section.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    Paragraph(RichParagraph),
    Table(TableBlock),
    Image(ImageBlock),
}

impl Block {
    /// Left-aligned paragraph block of the given spans.
    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }

    /// Table block.
    pub fn table(table: TableBlock) -> Self {
        Self::Table(table)
    }

    /// Centred image block.
    pub fn image(source: ImageSource) -> Self {
        Self::Image(ImageBlock::new(source))
    }
}

/// A titled run of blocks; one per report question.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    title: String,
    blocks: Vec<Block>,
}

impl Section {
    /// Empty section under `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Heading printed above the blocks.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Content blocks in print order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Appends one block.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Appends blocks in iteration order.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }

    /// Image paths referenced by this section, in block order.
    pub fn image_paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Image(image) => match image.source() {
                ImageSource::Path(path) => Some(path),
                ImageSource::Bytes(_) => None,
            },
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_defaults_to_equal_weights() {
        let table = TableBlock::new(
            vec!["parent_theme".into(), "set_count".into()],
            vec![vec!["Town".into(), "6".into()]],
        );
        assert_eq!(table.column_weights(), vec![1, 1]);
        assert_eq!(table.with_column_weights(vec![3, 2]).column_weights(), vec![3, 2]);
    }

    #[test]
    fn markup_paragraph_keeps_text() {
        let paragraph = RichParagraph::from_markup("Peak year: **1999**.").unwrap();
        assert_eq!(paragraph.plain_text(), "Peak year: 1999.");
        assert!(paragraph.spans()[1].is_bold());
    }

    #[test]
    fn section_lists_image_paths() {
        let section = Section::new("Charts")
            .with_block(Block::paragraph(vec![Span::new("intro")]))
            .with_block(Block::image(ImageSource::from_path("images/a.png")))
            .with_block(Block::image(ImageSource::from_bytes(vec![0u8])));
        let paths: Vec<_> = section.image_paths().collect();
        assert_eq!(paths, vec![&PathBuf::from("images/a.png")]);
    }
}
