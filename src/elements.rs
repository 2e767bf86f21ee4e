//! Custom `genpdf` elements used by the report builder.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use genpdf::elements::{Image, Paragraph};
use genpdf::error::{Context as _, Error};
use genpdf::style::Style;
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
/// Resolution images are resampled to before embedding; `genpdf` stores raw pixels.
const EMBED_DPI: f64 = 150.0;
const MM_PER_INCH: f64 = 25.4;
const CAPTION_SPACING_MM: f64 = 2.0;

pub(crate) fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

fn natural_size(image: &DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    Size::new(
        mm_from_f64(MM_PER_INCH * f64::from(px_width) / dpi),
        mm_from_f64(MM_PER_INCH * f64::from(px_height) / dpi),
    )
}

/// Decodes an encoded image held in memory.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

/// Decodes the image file at `path`, guessing the format from its contents.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Shrinks `image` to the pixels needed to print it `width_mm` wide at [`EMBED_DPI`].
///
/// Images already small enough are returned untouched; the aspect ratio is kept.
pub fn fit_to_print_width(image: DynamicImage, width_mm: f64) -> DynamicImage {
    let target = (width_mm / MM_PER_INCH * EMBED_DPI).round();
    let (px_width, px_height) = image.dimensions();
    if !target.is_finite() || target < 1.0 || f64::from(px_width) <= target {
        return image;
    }
    let height = (f64::from(px_height) * target / f64::from(px_width)).round().max(1.0);
    image.resize_exact(target as u32, height as u32, FilterType::Triangle)
}

/// `genpdf` rejects alpha channels, so transparent images are composited onto white.
fn flatten_alpha(image: DynamicImage) -> DynamicImage {
    if !image.color().has_alpha() {
        return image;
    }
    let rgba = image.to_rgba8();
    let mut rgb = image::RgbImage::new(rgba.width(), rgba.height());
    for (source, target) in rgba.pixels().zip(rgb.pixels_mut()) {
        let [r, g, b, a] = source.0;
        let alpha = f64::from(a) / 255.0;
        let over_white = |channel: u8| (f64::from(channel) * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        *target = image::Rgb([over_white(r), over_white(g), over_white(b)]);
    }
    DynamicImage::ImageRgb8(rgb)
}

/// An image with an optional caption underneath, sharing one alignment.
///
/// The image keeps its aspect ratio when constrained to a width.
pub struct CaptionedImage {
    image: Image,
    caption: Option<Paragraph>,
    alignment: Alignment,
    natural_size: Size,
    requested_width: Option<Mm>,
    spacing: Mm,
}

impl CaptionedImage {
    /// Wraps a decoded image, flattening any transparency.
    pub fn from_dynamic_image(image: DynamicImage) -> Result<Self, Error> {
        let image = flatten_alpha(image);
        let natural_size = natural_size(&image, DEFAULT_IMAGE_DPI);
        let mut element = Self {
            image: Image::from_dynamic_image(image)?,
            caption: None,
            alignment: Alignment::Left,
            natural_size,
            requested_width: None,
            spacing: mm_from_f64(CAPTION_SPACING_MM),
        };
        element.apply_alignment();
        Ok(element)
    }

    /// Size of the image at the default resolution, before any width constraint.
    pub fn natural_size(&self) -> Size {
        self.natural_size
    }

    /// Sets or clears the caption printed below the image.
    pub fn with_caption(mut self, caption: impl Into<Option<Paragraph>>) -> Self {
        self.caption = caption.into();
        self.apply_alignment();
        self
    }

    /// Aligns the image and its caption.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self.apply_alignment();
        self
    }

    /// Printed width; the image keeps its aspect ratio and never exceeds the page.
    pub fn with_width(mut self, width: impl Into<Option<Mm>>) -> Self {
        self.requested_width = width.into();
        self
    }

    fn apply_alignment(&mut self) {
        self.image.set_alignment(self.alignment);
        if let Some(caption) = &mut self.caption {
            caption.set_alignment(self.alignment);
        }
    }

    /// Scale for the requested width, capped so the image never overflows `available`.
    fn scale_for(&self, available: Mm) -> f64 {
        let natural = mm_to_f64(self.natural_size.width);
        if natural <= f64::EPSILON {
            return 1.0;
        }
        let desired = self
            .requested_width
            .map_or(natural, mm_to_f64)
            .min(mm_to_f64(available));
        desired / natural
    }
}

impl Element for CaptionedImage {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let scale = self.scale_for(area.size().width);
        self.image.set_scale(Scale::new(scale, scale));

        let mut result = RenderResult::default();
        let image_result = self.image.render(context, area.clone(), style)?;
        result.size = result.size.stack_vertical(image_result.size);
        result.has_more |= image_result.has_more;
        if image_result.has_more {
            return Ok(result);
        }

        if let Some(caption) = &mut self.caption {
            area.add_offset(Position::new(0, image_result.size.height + self.spacing));
            result.size = result.size.stack_vertical(Size::new(0, self.spacing));
            let caption_result = caption.render(context, area, style)?;
            result.size = result.size.stack_vertical(caption_result.size);
            result.has_more |= caption_result.has_more;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparent_pixels_become_white() {
        let mut rgba = image::RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
        let flat = flatten_alpha(DynamicImage::ImageRgba8(rgba)).to_rgb8();
        assert_eq!(flat.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(flat.get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn width_is_capped_by_the_page() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(1200, 600));
        let element = CaptionedImage::from_dynamic_image(image)
            .unwrap()
            .with_width(mm_from_f64(500.0));
        let natural = mm_to_f64(element.natural_size().width);
        let scale = element.scale_for(mm_from_f64(170.0));
        assert!((natural * scale - 170.0).abs() < 1e-6);
    }

    #[test]
    fn wide_images_are_resampled_for_print() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(1200, 600));
        let fitted = fit_to_print_width(image, 50.0);
        assert_eq!(fitted.dimensions(), (295, 148));

        let small = DynamicImage::ImageRgb8(image::RgbImage::new(200, 100));
        assert_eq!(fit_to_print_width(small, 50.0).dimensions(), (200, 100));
    }

    #[test]
    fn resampling_keeps_the_printed_width() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(1600, 800));
        let element = CaptionedImage::from_dynamic_image(fit_to_print_width(image, 180.0))
            .unwrap()
            .with_width(mm_from_f64(180.0));
        let natural = mm_to_f64(element.natural_size().width);
        let scale = element.scale_for(mm_from_f64(190.0));
        assert!((natural * scale - 180.0).abs() < 1e-6);
    }

    #[test]
    fn undecodable_bytes_are_reported() {
        assert!(decode_image_from_bytes(b"not an image").is_err());
    }
}
