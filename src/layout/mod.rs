//! # Page Composer
//!
//! This is the heart of the renderer.
//!
//! The page is the fundamental unit of layout: every block is measured
//! against the remaining vertical space *before* it is drawn, and a block
//! that does not fit opens a new page (redrawing the per-page chrome) rather
//! than being sliced after the fact. The cursor is owned by one composer for
//! the duration of one build; never shared, never global.
//!
//! Geometry is A4 portrait in millimeters: 210 × 297, 14 mm margins. The
//! PDF serializer converts to points at write time.

use tiny_skia::Pixmap;
use tracing::warn;

use crate::evidence::{self, NormalizedImage};
use crate::font::FontContext;
use crate::model::{Choice, Conclusion, EvidenceFile, SignatureSlotRef};
use crate::signature::SignatureRegistry;
use crate::text::TextLayout;

pub const PAGE_W: f64 = 210.0;
pub const PAGE_H: f64 = 297.0;
pub const MARGIN: f64 = 14.0;
pub const CONTENT_W: f64 = PAGE_W - MARGIN * 2.0;

/// Report theme, shared by every template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    pub const PRIMARY: Color = Color::rgb8(0x0A, 0x5F, 0xFF);
    pub const ACCENT: Color = Color::rgb8(0xEE, 0xF3, 0xFF);
    pub const TEXT: Color = Color::rgb8(0x11, 0x18, 0x27);
    pub const SUBTLE: Color = Color::rgb8(0x6B, 0x72, 0x80);
    pub const LINE: Color = Color::rgb8(0xE5, 0xE7, 0xEB);
    pub const WHITE: Color = Color::rgb8(0xFF, 0xFF, 0xFF);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// A bitmap ready for PDF embedding.
#[derive(Debug, Clone)]
pub enum EmbeddedImage {
    /// Raw JPEG bytes; embedded as-is with DCTDecode.
    Jpeg(NormalizedImage),
    /// Decoded RGB pixels (signature bitmaps composited onto white).
    Rgb {
        data: Vec<u8>,
        width: u32,
        height: u32,
    },
}

impl EmbeddedImage {
    /// Flatten a premultiplied RGBA pixmap onto a white background.
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let mut rgb = Vec::with_capacity((pixmap.width() * pixmap.height() * 3) as usize);
        for px in pixmap.pixels() {
            let a = px.alpha();
            // Premultiplied: color + (255 - alpha) composites over white.
            rgb.push(px.red().saturating_add(255 - a));
            rgb.push(px.green().saturating_add(255 - a));
            rgb.push(px.blue().saturating_add(255 - a));
        }
        EmbeddedImage::Rgb {
            data: rgb,
            width: pixmap.width(),
            height: pixmap.height(),
        }
    }
}

/// One drawing operation, in millimeters from the page's top-left corner.
/// Text coordinates are the baseline start (or anchor, per `align`).
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
        stroke_width: f64,
        corner_radius: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: f64,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
        size: f64,
        weight: u32,
        italic: bool,
        color: Color,
        align: TextAlign,
    },
    Image {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        image: EmbeddedImage,
    },
}

/// A fully composed page ready for PDF serialization.
#[derive(Debug, Clone, Default)]
pub struct LayoutPage {
    pub commands: Vec<DrawCommand>,
}

/// Current position during composition: page index + vertical offset (mm).
#[derive(Debug, Clone, Copy)]
pub struct LayoutCursor {
    pub page_index: usize,
    pub y: f64,
}

/// Composes a document page by page. Owns the cursor for one build.
pub struct PageComposer<'a> {
    fonts: &'a FontContext,
    text: TextLayout,
    pages: Vec<LayoutPage>,
    current: LayoutPage,
    cursor: LayoutCursor,
    logo: Option<NormalizedImage>,
    /// Bound + quality applied when normalizing grid images.
    pub max_image_width: u32,
    pub jpeg_quality: f32,
}

/// Font sizes are in points (matching the mm line-advance constants the
/// templates were designed around).
const KV_LABEL_COL: f64 = 40.0;
const KV_LINE_ADVANCE: f64 = 5.5;
const OPTION_COL_W: f64 = 28.0;
const OPTION_LINE_H: f64 = 5.2;
const CELL_PAD: f64 = 3.0;
const GRID_COLS: usize = 3;
const GRID_GAP: f64 = 3.0;
const GRID_ROW_GAP: f64 = 8.0;
const GRID_MAX_IMAGE_H: f64 = 60.0;
const GRID_BOTTOM_GAP: f64 = 30.0;
const SIGNATURE_W: f64 = 45.0;
const SIGNATURE_H: f64 = 20.0;

/// Points-per-mm conversion for measuring text that advances in mm. The
/// templates treat font sizes as interchangeable with mm-scale advances
/// (size 11 text wraps against mm column widths), mirroring the jsPDF
/// mm-unit document the layout was designed in.
const PT_PER_MM: f64 = 72.0 / 25.4;

impl<'a> PageComposer<'a> {
    pub fn new(fonts: &'a FontContext, logo: Option<NormalizedImage>) -> Self {
        Self {
            fonts,
            text: TextLayout::new(),
            pages: Vec::new(),
            current: LayoutPage::default(),
            cursor: LayoutCursor { page_index: 0, y: MARGIN },
            logo,
            max_image_width: evidence::DEFAULT_MAX_WIDTH,
            jpeg_quality: evidence::DEFAULT_QUALITY,
        }
    }

    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    /// Committed pages plus the one in progress.
    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    /// Wrap `content` to a column `width` mm wide at `size`.
    fn wrap(&self, content: &str, width: f64, size: f64, weight: u32) -> Vec<String> {
        // Measure in points against the column width converted to points.
        self.text.break_into_lines(
            self.fonts,
            content,
            width * PT_PER_MM,
            size,
            weight,
            false,
        )
    }

    fn push(&mut self, cmd: DrawCommand) {
        self.current.commands.push(cmd);
    }

    fn text_cmd(
        &mut self,
        x: f64,
        y: f64,
        content: &str,
        size: f64,
        weight: u32,
        italic: bool,
        color: Color,
        align: TextAlign,
    ) {
        self.push(DrawCommand::Text {
            x,
            y,
            content: content.to_string(),
            size,
            weight,
            italic,
            color,
            align,
        });
    }

    /// Break to a new page if `height_needed` does not fit. Break only on
    /// strict overflow: content that lands exactly on the bottom margin
    /// stays on the current page. After a break the mini header chrome is
    /// redrawn and the cursor rests below it.
    pub fn ensure_space(&mut self, height_needed: f64) {
        if self.cursor.y + height_needed > PAGE_H - MARGIN {
            let finished = std::mem::take(&mut self.current);
            self.pages.push(finished);
            self.cursor.page_index += 1;
            self.cursor.y = MARGIN;
            self.draw_mini_header();
        }
    }

    /// Small top band repeated on every page after the first.
    fn draw_mini_header(&mut self) {
        let band_h = 10.0;
        self.push(DrawCommand::Rect {
            x: 0.0,
            y: 0.0,
            w: PAGE_W,
            h: band_h,
            fill: Some(Color::PRIMARY),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 0.0,
        });
        if let Some(logo) = self.logo.clone() {
            self.push(DrawCommand::Image {
                x: MARGIN,
                y: 2.0,
                w: 12.0,
                h: 6.0,
                image: EmbeddedImage::Jpeg(logo),
            });
        }
        self.push(DrawCommand::Line {
            x1: MARGIN,
            y1: band_h + 2.0,
            x2: PAGE_W - MARGIN,
            y2: band_h + 2.0,
            color: Color::LINE,
            width: 0.2,
        });
        self.cursor.y = self.cursor.y.max(band_h + 6.0 + MARGIN / 2.0);
    }

    /// Full-width brand band + accent title chip. First page only.
    pub fn draw_cover(&mut self, title: &str) {
        let band_h = 18.0;
        self.push(DrawCommand::Rect {
            x: 0.0,
            y: 0.0,
            w: PAGE_W,
            h: band_h,
            fill: Some(Color::PRIMARY),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 0.0,
        });

        let logo_w = 20.0;
        if let Some(logo) = self.logo.clone() {
            self.push(DrawCommand::Image {
                x: MARGIN,
                y: 3.0,
                w: logo_w,
                h: band_h - 6.0,
                image: EmbeddedImage::Jpeg(logo),
            });
        }

        self.text_cmd(
            MARGIN + logo_w + 4.0,
            9.5,
            crate::template::COMPANY_NAME,
            12.0,
            700,
            false,
            Color::WHITE,
            TextAlign::Left,
        );
        self.text_cmd(
            MARGIN + logo_w + 4.0,
            14.5,
            crate::template::COMPANY_BAND_LINE,
            9.0,
            400,
            false,
            Color::WHITE,
            TextAlign::Left,
        );

        self.cursor.y = band_h + MARGIN;
        self.push(DrawCommand::Rect {
            x: MARGIN,
            y: self.cursor.y,
            w: CONTENT_W,
            h: 12.0,
            fill: Some(Color::ACCENT),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 2.0,
        });
        self.text_cmd(
            MARGIN + 4.0,
            self.cursor.y + 8.0,
            title,
            14.0,
            700,
            false,
            Color::PRIMARY,
            TextAlign::Left,
        );

        self.cursor.y += 16.0;
        self.push(DrawCommand::Line {
            x1: MARGIN,
            y1: self.cursor.y,
            x2: PAGE_W - MARGIN,
            y2: self.cursor.y,
            color: Color::LINE,
            width: 0.2,
        });
        self.cursor.y += 6.0;
    }

    /// Styled section banner.
    pub fn draw_header(&mut self, title: &str) {
        self.ensure_space(16.0);
        self.push(DrawCommand::Rect {
            x: MARGIN,
            y: self.cursor.y,
            w: CONTENT_W,
            h: 9.0,
            fill: Some(Color::ACCENT),
            stroke: None,
            stroke_width: 0.0,
            corner_radius: 2.0,
        });
        self.text_cmd(
            MARGIN + 3.5,
            self.cursor.y + 6.5,
            title,
            12.0,
            700,
            false,
            Color::PRIMARY,
            TextAlign::Left,
        );
        self.cursor.y += 13.0;
        self.push(DrawCommand::Line {
            x1: MARGIN,
            y1: self.cursor.y,
            x2: PAGE_W - MARGIN,
            y2: self.cursor.y,
            color: Color::LINE,
            width: 0.2,
        });
        self.cursor.y += 4.0;
    }

    /// Bold inline label ("Requisito 3", "Evidencias:").
    pub fn draw_label(&mut self, text: &str) {
        self.ensure_space(12.0);
        self.text_cmd(
            MARGIN,
            self.cursor.y,
            text,
            11.0,
            700,
            false,
            Color::TEXT,
            TextAlign::Left,
        );
        self.cursor.y += 4.0;
    }

    /// Label column + wrapped value. Advances by at least one row even for
    /// an empty value.
    pub fn draw_key_value(&mut self, label: &str, value: &str) {
        let lines = self.wrap(value, CONTENT_W - KV_LABEL_COL, 11.0, 400);
        let height = (lines.len() as f64 * KV_LINE_ADVANCE).max(7.0);
        self.ensure_space(height);

        self.text_cmd(
            MARGIN,
            self.cursor.y,
            label,
            11.0,
            700,
            false,
            Color::SUBTLE,
            TextAlign::Left,
        );
        for (i, line) in lines.iter().enumerate() {
            self.text_cmd(
                MARGIN + KV_LABEL_COL,
                self.cursor.y + i as f64 * KV_LINE_ADVANCE,
                line,
                11.0,
                400,
                false,
                Color::TEXT,
                TextAlign::Left,
            );
        }
        self.cursor.y += height;
    }

    /// The three-state requirement table: one wide description column plus
    /// CUMPLE / NO CUMPLE / NO APLICA. Exactly the selected cell renders a
    /// filled checkbox; `None` renders all three outlined and empty. The
    /// table is atomic; `ensure_space` runs on the full measured height so
    /// a requirement row never splits across pages.
    pub fn draw_option_table(&mut self, description: &str, choice: Option<Choice>) {
        let headers = ["CUMPLE", "NO CUMPLE", "NO APLICA"];
        self.draw_choice_table(description, &headers, OPTION_COL_W, choice.map(|c| c.column_index()));
    }

    /// Two-state conclusion table of the summary dictamen.
    pub fn draw_conclusion_table(&mut self, description: &str, conclusion: Option<Conclusion>) {
        let headers = ["SATISFACTORIO", "NO SATISFACTORIO"];
        let selected = conclusion.map(|c| match c {
            Conclusion::Satisfactory => 0,
            Conclusion::NotSatisfactory => 1,
        });
        self.draw_choice_table(description, &headers, 40.0, selected);
    }

    fn draw_choice_table(
        &mut self,
        description: &str,
        headers: &[&str],
        col_w: f64,
        selected: Option<usize>,
    ) {
        let ncols = headers.len();
        let w_desc = (CONTENT_W - col_w * ncols as f64).max(40.0);
        let header_h = 8.0;

        let desc_lines = self.wrap(description, w_desc - CELL_PAD * 2.0, 11.0, 400);
        let body_h = (desc_lines.len() as f64 * OPTION_LINE_H + CELL_PAD * 2.0).max(14.0);
        let total_h = header_h + body_h;
        self.ensure_space(total_h);

        let x = MARGIN;
        let y = self.cursor.y;

        // Header cells.
        self.push(DrawCommand::Rect {
            x,
            y,
            w: w_desc,
            h: header_h,
            fill: Some(Color::ACCENT),
            stroke: Some(Color::LINE),
            stroke_width: 0.2,
            corner_radius: 0.0,
        });
        for i in 0..ncols {
            self.push(DrawCommand::Rect {
                x: x + w_desc + i as f64 * col_w,
                y,
                w: col_w,
                h: header_h,
                fill: Some(Color::ACCENT),
                stroke: Some(Color::LINE),
                stroke_width: 0.2,
                corner_radius: 0.0,
            });
        }
        self.text_cmd(
            x + CELL_PAD,
            y + header_h - 3.2,
            "Requisito",
            10.0,
            700,
            false,
            Color::PRIMARY,
            TextAlign::Left,
        );
        for (i, header) in headers.iter().enumerate() {
            let cx = x + w_desc + i as f64 * col_w + col_w / 2.0;
            self.text_cmd(
                cx,
                y + header_h - 3.2,
                header,
                10.0,
                700,
                false,
                Color::PRIMARY,
                TextAlign::Center,
            );
        }

        // Body row.
        let body_y = y + header_h;
        self.push(DrawCommand::Rect {
            x,
            y: body_y,
            w: w_desc,
            h: body_h,
            fill: None,
            stroke: Some(Color::LINE),
            stroke_width: 0.2,
            corner_radius: 0.0,
        });
        for (i, line) in desc_lines.iter().enumerate() {
            self.text_cmd(
                x + CELL_PAD,
                body_y + CELL_PAD + 4.0 + i as f64 * OPTION_LINE_H,
                line,
                11.0,
                400,
                false,
                Color::TEXT,
                TextAlign::Left,
            );
        }

        let box_size = 7.0;
        for i in 0..ncols {
            let cell_x = x + w_desc + i as f64 * col_w;
            self.push(DrawCommand::Rect {
                x: cell_x,
                y: body_y,
                w: col_w,
                h: body_h,
                fill: None,
                stroke: Some(Color::LINE),
                stroke_width: 0.2,
                corner_radius: 0.0,
            });

            let bx = cell_x + (col_w - box_size) / 2.0;
            let by = body_y + (body_h - box_size) / 2.0;
            if Some(i) == selected {
                self.push(DrawCommand::Rect {
                    x: bx,
                    y: by,
                    w: box_size,
                    h: box_size,
                    fill: Some(Color::PRIMARY),
                    stroke: None,
                    stroke_width: 0.0,
                    corner_radius: 0.0,
                });
                self.text_cmd(
                    bx + box_size / 2.0,
                    by + box_size - 1.5,
                    "X",
                    11.0,
                    700,
                    false,
                    Color::WHITE,
                    TextAlign::Center,
                );
            } else {
                self.push(DrawCommand::Rect {
                    x: bx,
                    y: by,
                    w: box_size,
                    h: box_size,
                    fill: None,
                    stroke: Some(Color::LINE),
                    stroke_width: 0.2,
                    corner_radius: 0.0,
                });
                self.text_cmd(
                    bx + box_size / 2.0,
                    by + box_size - 2.0,
                    "—",
                    9.0,
                    400,
                    false,
                    Color::SUBTLE,
                    TextAlign::Center,
                );
            }
        }

        self.cursor.y = body_y + body_h + 6.0;
    }

    /// Fixed-column evidence grid. Each image is normalized first; a file
    /// that fails normalization is skipped (with a warning) and the rest of
    /// the grid still renders. Returns the number of skipped files.
    pub fn draw_image_grid(&mut self, images: &[EvidenceFile]) -> usize {
        let mut skipped = 0usize;
        let mut normalized: Vec<NormalizedImage> = Vec::new();
        for file in images {
            match evidence::normalize(file, self.max_image_width, self.jpeg_quality) {
                Ok(img) => normalized.push(img),
                Err(err) => {
                    warn!(file = file.name(), %err, "skipping evidence image");
                    skipped += 1;
                }
            }
        }
        if normalized.is_empty() {
            return skipped;
        }

        let cell_w = (CONTENT_W - GRID_GAP * (GRID_COLS as f64 - 1.0)) / GRID_COLS as f64;
        let mut row: Vec<(NormalizedImage, f64, f64)> = Vec::new();

        let mut flush = |composer: &mut Self, row: &mut Vec<(NormalizedImage, f64, f64)>| {
            if row.is_empty() {
                return;
            }
            let row_h = row.iter().map(|(_, _, h)| *h).fold(0.0, f64::max);
            composer.ensure_space(row_h + GRID_ROW_GAP + 2.0);
            for (i, (img, w, h)) in row.iter().enumerate() {
                let x = MARGIN + i as f64 * (cell_w + GRID_GAP);
                // Centered vertically within the row.
                let y = composer.cursor.y + (row_h - h) / 2.0;
                composer.push(DrawCommand::Image {
                    x,
                    y,
                    w: *w,
                    h: *h,
                    image: EmbeddedImage::Jpeg(img.clone()),
                });
            }
            composer.cursor.y += row_h + GRID_ROW_GAP;
            row.clear();
        };

        for img in normalized {
            let ratio = img.width as f64 / img.height as f64;
            let w = cell_w;
            let h = (w / ratio).min(GRID_MAX_IMAGE_H);
            row.push((img, w, h));
            if row.len() == GRID_COLS {
                flush(self, &mut row);
            }
        }
        flush(self, &mut row);

        self.ensure_space(GRID_BOTTOM_GAP);
        self.cursor.y += GRID_BOTTOM_GAP;
        skipped
    }

    /// Signature bitmaps with printed names and captions, two per row.
    /// Slots resolve by id against the registry; an unknown id or an empty
    /// pad renders its caption lines over a blank space.
    pub fn draw_signature_row(&mut self, slots: &[SignatureSlotRef], registry: &SignatureRegistry) {
        self.ensure_space(50.0);
        for (i, slot) in slots.iter().enumerate() {
            if i % 2 == 0 && i > 0 {
                self.cursor.y += 35.0;
                self.ensure_space(40.0);
            }
            let x = if i % 2 == 0 { MARGIN } else { PAGE_W / 2.0 + 5.0 };

            let bitmap = registry
                .get(&slot.slot_id)
                .and_then(|pad| pad.snapshot());
            if let Some(pixmap) = bitmap {
                self.push(DrawCommand::Image {
                    x,
                    y: self.cursor.y,
                    w: SIGNATURE_W,
                    h: SIGNATURE_H,
                    image: EmbeddedImage::from_pixmap(&pixmap),
                });
            }

            self.text_cmd(
                x,
                self.cursor.y + 25.0,
                &slot.name,
                7.0,
                400,
                false,
                Color::TEXT,
                TextAlign::Left,
            );
            self.text_cmd(
                x,
                self.cursor.y + 29.0,
                &slot.caption,
                7.0,
                400,
                false,
                Color::TEXT,
                TextAlign::Left,
            );
        }
        self.cursor.y += 45.0;
    }

    /// Wrapped free text under an optional bold heading.
    pub fn draw_free_text(&mut self, label: &str, text: &str) {
        let lines = self.wrap(text, CONTENT_W, 8.0, 400);
        let label_h = if label.is_empty() { 0.0 } else { 6.0 };
        let height = label_h + lines.len() as f64 * 4.0 + 6.0;
        self.ensure_space(height);

        if !label.is_empty() {
            self.text_cmd(
                MARGIN,
                self.cursor.y,
                label,
                9.0,
                700,
                false,
                Color::TEXT,
                TextAlign::Left,
            );
            self.cursor.y += 6.0;
        }
        for (i, line) in lines.iter().enumerate() {
            self.text_cmd(
                MARGIN,
                self.cursor.y + i as f64 * 4.0,
                line,
                8.0,
                400,
                false,
                Color::TEXT,
                TextAlign::Left,
            );
        }
        self.cursor.y += lines.len() as f64 * 4.0 + 6.0;
    }

    /// Italic closing line, centered.
    pub fn draw_note(&mut self, text: &str) {
        self.ensure_space(12.0);
        self.text_cmd(
            PAGE_W / 2.0,
            self.cursor.y + 6.0,
            text,
            9.0,
            400,
            true,
            Color::SUBTLE,
            TextAlign::Center,
        );
        self.cursor.y += 12.0;
    }

    /// Commit the in-progress page and stamp "Página i de N" on every page.
    /// Runs last; N is only known once all content pages exist.
    pub fn finish(mut self) -> Vec<LayoutPage> {
        self.pages.push(std::mem::take(&mut self.current));
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.commands.push(DrawCommand::Text {
                x: PAGE_W - MARGIN,
                y: PAGE_H - 6.0,
                content: format!("Página {} de {}", i + 1, total),
                size: 9.0,
                weight: 400,
                italic: false,
                color: Color::SUBTLE,
                align: TextAlign::Right,
            });
        }
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;

    fn composer(fonts: &FontContext) -> PageComposer<'_> {
        PageComposer::new(fonts, None)
    }

    fn filled_cells(page: &LayoutPage) -> usize {
        page.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Rect { fill: Some(f), w, .. }
                if *f == Color::PRIMARY && *w == 7.0))
            .count()
    }

    #[test]
    fn test_cursor_stays_inside_content_area() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        for step in [5.0, 80.0, 200.0, 260.0, 12.0, 268.9, 1.0] {
            c.ensure_space(step);
            let y = c.cursor().y;
            assert!(y >= MARGIN - 1e-9 && y <= PAGE_H - MARGIN + 1e-9, "y out of bounds: {y}");
        }
    }

    #[test]
    fn test_exact_fit_does_not_break() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        let remaining = PAGE_H - MARGIN - c.cursor().y;
        c.ensure_space(remaining);
        assert_eq!(c.cursor().page_index, 0, "exact fit must not trigger a break");
        c.ensure_space(remaining + 0.001);
        assert_eq!(c.cursor().page_index, 1, "strict overflow must break");
    }

    #[test]
    fn test_page_break_redraws_mini_header() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        c.ensure_space(500.0);
        assert_eq!(c.cursor().page_index, 1);
        // Mini header clearance: band (10) + 6 + margin/2.
        assert!((c.cursor().y - 23.0).abs() < 1e-9);
        let band = c.current.commands.iter().any(|cmd| {
            matches!(cmd, DrawCommand::Rect { fill: Some(f), h, y, .. }
                if *f == Color::PRIMARY && *h == 10.0 && *y == 0.0)
        });
        assert!(band, "new page must start with the mini header band");
    }

    #[test]
    fn test_option_table_marks_exactly_selected_cell() {
        let fonts = FontContext::new();
        for (choice, expected) in [
            (Some(Choice::Complies), 1),
            (Some(Choice::NotComplies), 1),
            (Some(Choice::NotApplicable), 1),
            (None, 0),
        ] {
            let mut c = composer(&fonts);
            c.draw_option_table("Requisito de prueba", choice);
            assert_eq!(filled_cells(&c.current), expected);
        }
    }

    #[test]
    fn test_option_table_unset_still_renders_grid() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        c.draw_option_table("Requisito de prueba", None);
        let outlined_boxes = c
            .current
            .commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Rect { fill: None, w, h, .. }
                if *w == 7.0 && *h == 7.0))
            .count();
        assert_eq!(outlined_boxes, 3);
    }

    #[test]
    fn test_option_table_never_splits_across_pages() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        // Push the cursor near the bottom, then draw a tall table.
        c.ensure_space(1.0);
        c.cursor.y = PAGE_H - MARGIN - 10.0;
        let long_desc = "texto de requisito ".repeat(30);
        c.draw_option_table(&long_desc, Some(Choice::Complies));
        // The whole table must live on page 1 (commands of page 0 contain no
        // table cells drawn after the break).
        assert_eq!(c.cursor().page_index, 1);
        assert_eq!(filled_cells(&c.pages[0]), 0);
        assert_eq!(filled_cells(&c.current), 1);
    }

    #[test]
    fn test_key_value_advances_at_least_one_row() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        let y0 = c.cursor().y;
        c.draw_key_value("Giro:", "");
        assert!((c.cursor().y - y0 - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_value_wraps_and_advances() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        let y0 = c.cursor().y;
        let value = "Avenida de los Insurgentes Sur número mil doscientos treinta y cuatro, \
                     Colonia del Valle Centro, Benito Juárez, Ciudad de México";
        c.draw_key_value("Domicilio:", value);
        assert!(c.cursor().y - y0 > 7.0, "wrapped value must advance more than one row");
    }

    #[test]
    fn test_page_numbers_stamped_on_every_page() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        c.ensure_space(500.0);
        c.ensure_space(500.0);
        let pages = c.finish();
        assert_eq!(pages.len(), 3);
        for (i, page) in pages.iter().enumerate() {
            let stamp = format!("Página {} de 3", i + 1);
            assert!(page.commands.iter().any(|cmd| {
                matches!(cmd, DrawCommand::Text { content, .. } if *content == stamp)
            }));
        }
    }

    #[test]
    fn test_empty_image_grid_draws_nothing() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        let y0 = c.cursor().y;
        let skipped = c.draw_image_grid(&[]);
        assert_eq!(skipped, 0);
        assert_eq!(c.cursor().y, y0);
        assert!(c.current.commands.is_empty());
    }

    #[test]
    fn test_image_grid_skips_stub_and_continues() {
        let fonts = FontContext::new();
        let mut c = composer(&fonts);
        let stub = EvidenceFile::Stub {
            name: "foto.jpg".into(),
            size: 999,
            mime: "image/jpeg".into(),
        };
        let skipped = c.draw_image_grid(&[stub]);
        assert_eq!(skipped, 1);
    }
}
