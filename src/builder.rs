//! Turns [`Section`]s into a rendered PDF document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, Paragraph, TableLayout};
use genpdf::error::{Error, ErrorKind};
use genpdf::style::{self, Style, StyledString};
use genpdf::{Alignment, Element, Margins, Mm, PageDecorator, PaperSize, Position, Size};
use log::{debug, info};

use crate::elements::{
    decode_image_from_bytes, decode_image_from_path, fit_to_print_width, mm_from_f64, CaptionedImage,
};
use crate::fonts;
use crate::model::{Block, HorizontalAlignment, ImageBlock, ImageSource, RichParagraph, Section, TableBlock};

const BODY_FONT_SIZE: u8 = 11;
const TABLE_FONT_SIZE: u8 = 10;
const SECTION_TITLE_FONT_SIZE: u8 = 13;
const HEADER_FONT_SIZE: u8 = 14;
const FOOTER_HEIGHT_MM: f64 = 10.0;

/// Errors raised while laying out or writing the PDF.
#[derive(Debug, thiserror::Error)]
pub enum PdfBuildError {
    #[error("failed to load the report fonts")]
    FontLoad(#[source] Error),
    #[error("failed to load image {image}")]
    Image {
        image: String,
        #[source]
        source: Error,
    },
    #[error("table in section '{section}' has a row with {found} cells, expected {expected}")]
    Table {
        section: String,
        expected: usize,
        found: usize,
    },
    #[error("failed to render the PDF document")]
    Render(#[source] Error),
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The encoded PDF.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
}

type DecorationFactory = dyn Fn(usize) -> Box<dyn Element>;

/// Collects sections and page decoration, then renders them with `genpdf`.
pub struct PdfBuilder {
    title: Option<String>,
    paper_size: Size,
    margins: Margins,
    fonts_dir: Option<PathBuf>,
    header: Option<Box<DecorationFactory>>,
    footer: Option<FooterSpec>,
    sections: Vec<Section>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self {
            title: None,
            paper_size: PaperSize::A4.into(),
            margins: Margins::trbl(10, 15, 10, 15),
            fonts_dir: None,
            header: None,
            footer: None,
            sections: Vec::new(),
        }
    }
}

impl PdfBuilder {
    /// A4 builder with default margins and no sections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Directory searched for fonts before the default locations.
    pub fn with_fonts_dir(mut self, fonts_dir: impl Into<Option<PathBuf>>) -> Self {
        self.fonts_dir = fonts_dir.into();
        self
    }

    /// Header element built for every page from the 1-based page number.
    pub fn with_header<F, E>(mut self, header: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.header = Some(Box::new(move |page| Box::new(header(page)) as Box<dyn Element>));
        self
    }

    /// Footer element with a reserved height at the bottom of every page.
    pub fn with_footer<F, E>(mut self, height: impl Into<Mm>, footer: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        self.footer = Some(FooterSpec::new(height, footer));
        self
    }

    /// Centred bold running title plus a "Page N" footer.
    pub fn with_running_title(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.with_header(move |_| {
            LinearLayout::vertical()
                .element(
                    Paragraph::new(StyledString::new(
                        text.clone(),
                        Style::new().bold().with_font_size(HEADER_FONT_SIZE),
                    ))
                    .aligned(Alignment::Center),
                )
                .element(Break::new(1.5))
        })
        .with_footer(mm_from_f64(FOOTER_HEIGHT_MM), |page| {
            Paragraph::new(format!("Page {}", page))
                .aligned(Alignment::Center)
                .styled(Style::new().with_font_size(9))
        })
    }

    /// Appends a section after the ones already added.
    pub fn add_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    fn build_document(self) -> Result<genpdf::Document, PdfBuildError> {
        let family = fonts::font_family(self.fonts_dir.as_deref()).map_err(PdfBuildError::FontLoad)?;
        let mut document = genpdf::Document::new(family);
        document.set_paper_size(self.paper_size);
        document.set_font_size(BODY_FONT_SIZE);
        document.set_line_spacing(1.2);
        if let Some(title) = &self.title {
            document.set_title(title.clone());
        }
        document.set_page_decorator(ConfiguredPageDecorator::new(
            self.margins,
            self.header,
            self.footer,
        ));

        for section in &self.sections {
            push_section(&mut document, section)?;
        }
        debug!("laid out {} sections", self.sections.len());

        Ok(document)
    }

    /// Renders the document into memory.
    pub fn render(self) -> Result<RenderedPdf, PdfBuildError> {
        let document = self.build_document()?;
        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;
        Ok(RenderedPdf { bytes })
    }

    /// Renders the document and writes it to `path`, creating parent directories.
    pub fn render_to_file(self, path: &Path) -> Result<RenderedPdf, PdfBuildError> {
        let pdf = self.render()?;
        let write = |path: &Path| -> io::Result<()> {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &pdf.bytes)
        };
        write(path).map_err(|source| PdfBuildError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("wrote {} ({} bytes)", path.display(), pdf.bytes.len());
        Ok(pdf)
    }
}

fn push_section(document: &mut genpdf::Document, section: &Section) -> Result<(), PdfBuildError> {
    document.push(Paragraph::new(StyledString::new(
        section.title().to_string(),
        Style::new().bold().with_font_size(SECTION_TITLE_FONT_SIZE),
    )));
    document.push(Break::new(0.5));

    for block in section.blocks() {
        match block {
            Block::Paragraph(paragraph) => {
                document.push(paragraph_element(paragraph));
                document.push(Break::new(0.8));
            }
            Block::Table(table) => {
                document.push(table_element(section.title(), table)?);
                document.push(Break::new(1));
            }
            Block::Image(image) => {
                document.push(image_element(image)?);
                document.push(Break::new(1));
            }
        }
    }

    document.push(Break::new(1));
    Ok(())
}

fn alignment(alignment: HorizontalAlignment) -> Alignment {
    match alignment {
        HorizontalAlignment::Left => Alignment::Left,
        HorizontalAlignment::Center => Alignment::Center,
        HorizontalAlignment::Right => Alignment::Right,
    }
}

fn paragraph_element(paragraph: &RichParagraph) -> Paragraph {
    let mut element = Paragraph::default();
    for span in paragraph.spans() {
        element.push(span.to_styled_string(Style::new()));
    }
    element.aligned(alignment(paragraph.alignment()))
}

fn table_element(section: &str, table: &TableBlock) -> Result<TableLayout, PdfBuildError> {
    let expected = table.header().len();
    if let Some(row) = table.rows().iter().find(|row| row.len() != expected) {
        return Err(PdfBuildError::Table {
            section: section.to_string(),
            expected,
            found: row.len(),
        });
    }

    let mut layout = TableLayout::new(table.column_weights());
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let cell = |text: &str, style: Style| {
        Paragraph::new(StyledString::new(text.to_string(), style)).padded(1)
    };
    let header_style = Style::new().bold().with_font_size(TABLE_FONT_SIZE);
    let body_style = Style::new().with_font_size(TABLE_FONT_SIZE);

    let rows = std::iter::once((table.header(), header_style))
        .chain(table.rows().iter().map(|row| (row.as_slice(), body_style)));
    for (cells, style) in rows {
        let mut row = layout.row();
        for text in cells {
            row.push_element(cell(text.as_str(), style));
        }
        row.push().map_err(|_| PdfBuildError::Table {
            section: section.to_string(),
            expected,
            found: cells.len(),
        })?;
    }

    Ok(layout)
}

fn image_element(block: &ImageBlock) -> Result<CaptionedImage, PdfBuildError> {
    let (decoded, label) = match block.source() {
        ImageSource::Path(path) => (decode_image_from_path(path), path.display().to_string()),
        ImageSource::Bytes(bytes) => (
            decode_image_from_bytes(bytes),
            format!("<{} bytes in memory>", bytes.len()),
        ),
    };
    let image = decoded
        .and_then(|image| {
            let image = match block.width_mm() {
                Some(width_mm) => fit_to_print_width(image, width_mm),
                None => image,
            };
            CaptionedImage::from_dynamic_image(image)
        })
        .map_err(|source| PdfBuildError::Image {
            image: label,
            source,
        })?;

    Ok(image
        .with_caption(block.caption().map(paragraph_element))
        .with_alignment(alignment(block.alignment()))
        .with_width(block.width_mm().map(mm_from_f64)))
}

/// Footer element factory with the height it reserves.
pub struct FooterSpec {
    height: Mm,
    factory: Box<DecorationFactory>,
}

impl FooterSpec {
    /// Wraps `factory`, which builds the footer for a 1-based page number.
    pub fn new<F, E>(height: impl Into<Mm>, factory: F) -> Self
    where
        F: Fn(usize) -> E + 'static,
        E: Element + 'static,
    {
        Self {
            height: height.into(),
            factory: Box::new(move |page| Box::new(factory(page)) as Box<dyn Element>),
        }
    }
}

struct ConfiguredPageDecorator {
    page: usize,
    margins: Margins,
    header: Option<Box<DecorationFactory>>,
    footer: Option<FooterSpec>,
}

impl ConfiguredPageDecorator {
    fn new(
        margins: Margins,
        header: Option<Box<DecorationFactory>>,
        footer: Option<FooterSpec>,
    ) -> Self {
        Self {
            page: 0,
            margins,
            header,
            footer,
        }
    }
}

impl PageDecorator for ConfiguredPageDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &genpdf::Context,
        mut area: genpdf::render::Area<'a>,
        style: style::Style,
    ) -> Result<genpdf::render::Area<'a>, Error> {
        self.page += 1;
        area.add_margins(self.margins);

        if let Some(header) = &self.header {
            let mut element = header(self.page);
            let result = element.render(context, area.clone(), style)?;
            area.add_offset(Position::new(0, result.size.height));
        }

        if let Some(footer) = &self.footer {
            let available = area.size().height;
            if footer.height > available {
                return Err(Error::new(
                    "Footer height exceeds available space",
                    ErrorKind::InvalidData,
                ));
            }

            let mut footer_area = area.clone();
            footer_area.add_offset(Position::new(0, available - footer.height));
            let mut element = (footer.factory)(self.page);
            let result = element.render(context, footer_area, style)?;
            if result.has_more {
                return Err(Error::new(
                    "Footer does not fit into the reserved space",
                    ErrorKind::PageSizeExceeded,
                ));
            }

            area.set_height(available - footer.height);
        }

        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_tables_are_rejected_before_layout() {
        let table = TableBlock::new(
            vec!["theme".into(), "sets".into()],
            vec![vec!["Town".into()]],
        );
        match table_element("Top themes", &table) {
            Err(PdfBuildError::Table {
                section,
                expected,
                found,
            }) => {
                assert_eq!(section, "Top themes");
                assert_eq!((expected, found), (2, 1));
            }
            _ => panic!("expected a table error"),
        }
    }

    #[test]
    fn missing_image_names_the_file() {
        let block = ImageBlock::new(ImageSource::from_path("/nonexistent/chart.png"));
        let err = image_element(&block).err().unwrap();
        assert!(err.to_string().contains("/nonexistent/chart.png"));
    }
}
