//! PDF output of laid-out pages

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Rect, Rgb,
};
use streamstats_common::{Result, StatsError};
use streamstats_config::ReportConfig;
use tracing::{debug, instrument};

use crate::layout::{DrawOp, PageLayout, Tint};

const LAYER_NAME: &str = "Content";
const MM_PER_INCH: f32 = 25.4;

fn pdf_error(context: &str, err: impl std::fmt::Display) -> StatsError {
    StatsError::report(format!("{context}: {err}"))
}

fn color(tint: Tint) -> Color {
    let channel = |c: u8| f32::from(c) / 255.0;
    Color::Rgb(Rgb::new(channel(tint.0), channel(tint.1), channel(tint.2), None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Serialize pages to PDF bytes
#[instrument(skip(pages, config), fields(pages = pages.len()))]
#[allow(clippy::cast_possible_truncation)]
pub fn write_pdf(title: &str, pages: &[PageLayout], config: &ReportConfig) -> Result<Vec<u8>> {
    let width = Mm(config.page_width_mm as f32);
    let height = Mm(config.page_height_mm as f32);

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, LAYER_NAME);
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| pdf_error("Failed to load font", e))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| pdf_error("Failed to load font", e))?,
    };

    for (i, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for op in &page.ops {
            draw(&layer, op, &fonts);
        }
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| pdf_error("Failed to serialize PDF", e))?;
    debug!(bytes = bytes.len(), "Wrote PDF");
    Ok(bytes)
}

#[allow(clippy::cast_precision_loss)]
fn draw(layer: &PdfLayerReference, op: &DrawOp, fonts: &Fonts) {
    match op {
        DrawOp::Text {
            text,
            x,
            y,
            size,
            bold,
            color: tint,
        } => {
            layer.set_fill_color(color(*tint));
            let font = if *bold { &fonts.bold } else { &fonts.regular };
            layer.use_text(text.as_str(), *size, Mm(*x), Mm(*y), font);
        }
        DrawOp::Fill {
            x,
            y,
            width,
            height,
            color: tint,
        } => {
            layer.set_fill_color(color(*tint));
            layer.add_rect(
                Rect::new(Mm(*x), Mm(*y), Mm(x + width), Mm(y + height)).with_mode(PaintMode::Fill),
            );
        }
        DrawOp::Rule {
            x1,
            x2,
            y,
            color: tint,
        } => {
            layer.set_outline_color(color(*tint));
            layer.set_outline_thickness(0.5);
            layer.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(*y)), false),
                    (Point::new(Mm(*x2), Mm(*y)), false),
                ],
                is_closed: false,
            });
        }
        DrawOp::Image { image, x, y, width } => {
            let dpi = image.width() as f32 * MM_PER_INCH / width;
            Image::from_dynamic_image(image).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(*x)),
                    translate_y: Some(Mm(*y)),
                    dpi: Some(dpi),
                    ..ImageTransform::default()
                },
            );
        }
    }
}
