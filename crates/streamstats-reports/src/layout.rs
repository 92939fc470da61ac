//! Pagination of a [`ReportDocument`] into positioned drawing operations.
//!
//! Coordinates are millimetres from the bottom-left page corner, matching
//! PDF user space. Text `y` is the baseline.

use image::{DynamicImage, GenericImageView};
use streamstats_common::{truncate_string, StatsError};
use streamstats_config::ReportConfig;
use tracing::{debug, warn};

use crate::document::{ReportDocument, Section, Table};

const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph width relative to the font size
const GLYPH_WIDTH: f32 = 0.5;
/// Height reserved above the content area for the page header
const HEADER_BAND: f32 = 15.0;
/// Height reserved below the content area for the page footer
const FOOTER_BAND: f32 = 10.0;
const HEADER_FONT_PT: f32 = 16.0;
const FOOTER_FONT_PT: f32 = 8.0;
const TITLE_FONT_PT: f32 = 14.0;
const TABLE_FONT_PT: f32 = 9.0;
/// Largest share of the content height a chart may take
const CHART_MAX_SHARE: f32 = 0.6;

/// RGB color of a drawing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tint(pub u8, pub u8, pub u8);

impl Tint {
    /// Body text
    pub const BLACK: Self = Self(0, 0, 0);
    /// Text on the accent color
    pub const WHITE: Self = Self(255, 255, 255);
    /// Page header, section titles and table header fill
    pub const ACCENT: Self = Self(145, 71, 255);
    /// Title band fill
    pub const BAND: Self = Self(230, 230, 250);
    /// Title band text
    pub const HEADING: Self = Self(50, 50, 50);
    /// Shaded table rows
    pub const STRIPE: Self = Self(240, 240, 240);
    /// Footer text
    pub const MUTED: Self = Self(128, 128, 128);
}

/// One positioned drawing operation
#[derive(Debug, Clone)]
pub enum DrawOp {
    /// A single line of text
    Text {
        /// Content
        text: String,
        /// Left edge
        x: f32,
        /// Baseline
        y: f32,
        /// Font size in points
        size: f32,
        /// Bold face
        bold: bool,
        /// Fill color
        color: Tint,
    },
    /// Filled rectangle, `y` is the bottom edge
    Fill {
        /// Left edge
        x: f32,
        /// Bottom edge
        y: f32,
        /// Width
        width: f32,
        /// Height
        height: f32,
        /// Fill color
        color: Tint,
    },
    /// Horizontal rule
    Rule {
        /// Start
        x1: f32,
        /// End
        x2: f32,
        /// Height on the page
        y: f32,
        /// Stroke color
        color: Tint,
    },
    /// Decoded raster image, `y` is the bottom edge
    Image {
        /// Pixels
        image: DynamicImage,
        /// Left edge
        x: f32,
        /// Bottom edge
        y: f32,
        /// Printed width; height follows the aspect ratio
        width: f32,
    },
}

/// Drawing operations of one page
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// 1-based page number
    pub number: usize,
    /// Operations in painting order
    pub ops: Vec<DrawOp>,
}

impl PageLayout {
    /// Text of every text operation on the page
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of images on the page
    pub fn image_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }
}

#[allow(clippy::cast_precision_loss)]
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * PT_TO_MM * GLYPH_WIDTH
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn chars_fitting(width: f32, size: f32) -> usize {
    (width / (size * PT_TO_MM * GLYPH_WIDTH)).floor().max(1.0) as usize
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * 1.6
}

/// Greedy word wrap to at most `max_chars` per line
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lays sections out top to bottom, breaking pages as needed
#[derive(Debug)]
pub struct LayoutEngine<'a> {
    config: &'a ReportConfig,
    width: f32,
    height: f32,
    margin: f32,
    body_size: f32,
    pages: Vec<PageLayout>,
    cursor: f32,
}

impl<'a> LayoutEngine<'a> {
    /// Engine for the page geometry of `config`
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(config: &'a ReportConfig) -> Self {
        let mut engine = Self {
            config,
            width: config.page_width_mm as f32,
            height: config.page_height_mm as f32,
            margin: config.margin_mm as f32,
            body_size: config.body_font_size as f32,
            pages: Vec::new(),
            cursor: 0.0,
        };
        engine.new_page();
        engine
    }

    fn top(&self) -> f32 {
        self.height - self.margin - HEADER_BAND
    }

    fn bottom(&self) -> f32 {
        self.margin + FOOTER_BAND
    }

    #[allow(clippy::cast_possible_truncation)]
    fn content_width(&self) -> f32 {
        self.config.content_width_mm() as f32
    }

    fn new_page(&mut self) {
        let number = self.pages.len() + 1;
        self.pages.push(PageLayout {
            number,
            ops: Vec::new(),
        });
        self.cursor = self.top();
    }

    /// Start a new page unless `needed` millimetres fit above the footer.
    /// Returns whether a page was started.
    fn ensure_space(&mut self, needed: f32) -> bool {
        let page_is_fresh = (self.cursor - self.top()).abs() < f32::EPSILON;
        if self.cursor - needed < self.bottom() && !page_is_fresh {
            self.new_page();
            true
        } else {
            false
        }
    }

    fn push(&mut self, op: DrawOp) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    /// Write one line of text inside a row of height `row` starting at the cursor
    fn text_in_row(&mut self, text: String, x: f32, row: f32, size: f32, bold: bool, color: Tint) {
        let baseline = self.cursor - row * 0.7;
        self.push(DrawOp::Text {
            text,
            x,
            y: baseline,
            size,
            bold,
            color,
        });
    }

    /// Lay out the whole document
    pub fn layout(mut self, document: &ReportDocument) -> Vec<PageLayout> {
        self.title(&document.title);
        for section in &document.sections {
            match section {
                Section::Heading(text) => self.heading(text),
                Section::KeyValues(pairs) => self.key_values(pairs),
                Section::Chart { image, description } => self.chart(image, description),
                Section::Notice(text) => self.paragraph(text),
                Section::Table(table) => self.table(table),
                Section::Spacer(gap) => self.cursor -= gap,
            }
        }
        self.finish()
    }

    fn title(&mut self, title: &str) {
        let row = line_height(TITLE_FONT_PT);
        let width = self.content_width();
        let text = truncate_string(title, chars_fitting(width - 4.0, TITLE_FONT_PT));

        self.push(DrawOp::Fill {
            x: self.margin,
            y: self.cursor - row,
            width,
            height: row,
            color: Tint::BAND,
        });
        self.text_in_row(text, self.margin + 2.0, row, TITLE_FONT_PT, true, Tint::HEADING);
        self.cursor -= row + 4.0;
    }

    fn heading(&mut self, text: &str) {
        let size = self.body_size + 2.0;
        let row = line_height(size);
        // Keep a heading together with at least one line of what follows
        self.ensure_space(row + line_height(self.body_size));
        let text = truncate_string(text, chars_fitting(self.content_width(), size));
        self.text_in_row(text, self.margin, row, size, true, Tint::ACCENT);
        self.cursor -= row + 2.0;
    }

    fn key_values(&mut self, pairs: &[(String, String)]) {
        let row = line_height(self.body_size);
        let label_width = (self.content_width() * 0.45).min(80.0);
        let value_width = self.content_width() - label_width;

        for (key, value) in pairs {
            self.ensure_space(row);
            let label = truncate_string(&format!("{key}:"), chars_fitting(label_width, self.body_size));
            let value = truncate_string(value, chars_fitting(value_width, self.body_size));
            self.text_in_row(label, self.margin, row, self.body_size, true, Tint::BLACK);
            self.text_in_row(value, self.margin + label_width, row, self.body_size, false, Tint::BLACK);
            self.cursor -= row;
        }
        self.cursor -= 2.0;
    }

    fn paragraph(&mut self, text: &str) {
        let row = line_height(self.body_size);
        let max_chars = chars_fitting(self.content_width(), self.body_size);
        for line in wrap(text, max_chars) {
            self.ensure_space(row);
            self.text_in_row(line, self.margin, row, self.body_size, false, Tint::BLACK);
            self.cursor -= row;
        }
        self.cursor -= 2.0;
    }

    fn chart(&mut self, bytes: &[u8], description: &str) {
        match decode_chart(bytes) {
            Ok(image) => self.image(image),
            Err(e) => {
                warn!(error = %e, "Chart left out of report");
                let reason = match &e {
                    StatsError::RenderingDegraded { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                self.paragraph(&format!("Error embedding {description}: {reason}"));
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn image(&mut self, image: DynamicImage) {
        let (pixels_wide, pixels_high) = image.dimensions();
        let aspect = pixels_high as f32 / pixels_wide as f32;

        let max_height = (self.top() - self.bottom()) * CHART_MAX_SHARE;
        let mut width = self.content_width();
        if width * aspect > max_height {
            width = max_height / aspect;
        }
        let height = width * aspect;

        self.ensure_space(height);
        self.push(DrawOp::Image {
            image,
            x: self.margin,
            y: self.cursor - height,
            width,
        });
        self.cursor -= height + 4.0;
    }

    fn table_header(&mut self, table: &Table, row: f32) {
        let width = self.content_width();
        self.push(DrawOp::Fill {
            x: self.margin,
            y: self.cursor - row,
            width,
            height: row,
            color: Tint::ACCENT,
        });

        let mut x = self.margin;
        for column in &table.columns {
            let cell_width = width * column.width;
            let text = truncate_string(&column.header, chars_fitting(cell_width - 2.0, TABLE_FONT_PT));
            self.text_in_row(text, x + 1.0, row, TABLE_FONT_PT, true, Tint::WHITE);
            x += cell_width;
        }
        self.cursor -= row;
    }

    fn table(&mut self, table: &Table) {
        let row = line_height(TABLE_FONT_PT) + 1.0;
        let width = self.content_width();

        self.ensure_space(row * 2.0);
        self.table_header(table, row);

        for (i, cells) in table.rows.iter().enumerate() {
            if self.ensure_space(row) {
                self.table_header(table, row);
            }
            if i % 2 == 0 {
                self.push(DrawOp::Fill {
                    x: self.margin,
                    y: self.cursor - row,
                    width,
                    height: row,
                    color: Tint::STRIPE,
                });
            }

            let mut x = self.margin;
            for (column, cell) in table.columns.iter().zip(cells) {
                let cell_width = width * column.width;
                let text = truncate_string(cell, chars_fitting(cell_width - 2.0, TABLE_FONT_PT));
                self.text_in_row(text, x + 1.0, row, TABLE_FONT_PT, false, Tint::BLACK);
                x += cell_width;
            }
            self.cursor -= row;
        }

        self.push(DrawOp::Rule {
            x1: self.margin,
            x2: self.margin + width,
            y: self.cursor,
            color: Tint::MUTED,
        });
        self.cursor -= 4.0;
    }

    /// Add the page header and `Page N` footer to every page
    fn finish(mut self) -> Vec<PageLayout> {
        let header = self.config.header_text.clone();
        let header_y = self.height - self.margin - HEADER_FONT_PT * PT_TO_MM;
        let rule_y = self.height - self.margin - HEADER_BAND + 3.0;
        let center = self.width / 2.0;
        let (margin, right) = (self.margin, self.width - self.margin);

        for page in &mut self.pages {
            let footer = format!("Page {}", page.number);
            page.ops.push(DrawOp::Text {
                x: center - text_width(&header, HEADER_FONT_PT) / 2.0,
                text: header.clone(),
                y: header_y,
                size: HEADER_FONT_PT,
                bold: true,
                color: Tint::ACCENT,
            });
            page.ops.push(DrawOp::Rule {
                x1: margin,
                x2: right,
                y: rule_y,
                color: Tint::ACCENT,
            });
            page.ops.push(DrawOp::Text {
                x: center - text_width(&footer, FOOTER_FONT_PT) / 2.0,
                text: footer,
                y: margin,
                size: FOOTER_FONT_PT,
                bold: false,
                color: Tint::MUTED,
            });
        }

        debug!(pages = self.pages.len(), "Laid out report");
        self.pages
    }
}

/// Decode chart bytes for embedding
pub fn decode_chart(bytes: &[u8]) -> Result<DynamicImage, StatsError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| StatsError::rendering_with_source(e.to_string(), e))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(StatsError::rendering("image has no pixels"));
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Column;

    fn long_table(rows: usize) -> Table {
        let mut table = Table::new(vec![Column::new("Hour", 0.5), Column::new("Viewers", 0.5)]);
        for i in 0..rows {
            table.push_row(vec![format!("h{i}"), i.to_string()]);
        }
        table
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("", 10), Vec::<String>::new());
        assert_eq!(wrap("unbreakableword", 4), vec!["unbreakableword"]);
    }

    #[test]
    fn test_every_page_has_header_and_footer() {
        let config = ReportConfig::default();
        let mut doc = ReportDocument::new("Title");
        doc.push(Section::Table(long_table(200)));

        let pages = LayoutEngine::new(&config).layout(&doc);
        assert!(pages.len() > 1);
        for page in &pages {
            let texts = page.texts();
            assert!(texts.contains(&config.header_text.as_str()));
            assert!(texts.contains(&format!("Page {}", page.number).as_str()));
        }
    }

    #[test]
    fn test_table_header_repeats_after_page_break() {
        let config = ReportConfig::default();
        let mut doc = ReportDocument::new("Title");
        doc.push(Section::Table(long_table(200)));

        let pages = LayoutEngine::new(&config).layout(&doc);
        for page in &pages {
            assert!(page.texts().contains(&"Viewers"), "page {}", page.number);
        }
        let rows: usize = pages
            .iter()
            .map(|p| p.texts().iter().filter(|t| t.starts_with('h')).count())
            .sum();
        assert_eq!(rows, 200);
    }

    #[test]
    fn test_undecodable_chart_becomes_notice() {
        let config = ReportConfig::default();
        let mut doc = ReportDocument::new("Title");
        doc.push(Section::Chart {
            image: b"not an image".to_vec(),
            description: "chart".to_string(),
        });

        let pages = LayoutEngine::new(&config).layout(&doc);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].image_count(), 0);
        assert!(pages[0]
            .texts()
            .iter()
            .any(|t| t.starts_with("Error embedding chart:")));
    }

    #[test]
    fn test_decode_chart_rejects_garbage() {
        assert!(matches!(
            decode_chart(&[0, 1, 2, 3]),
            Err(StatsError::RenderingDegraded { .. })
        ));
    }
}
