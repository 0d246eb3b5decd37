//! # Visual-Tree Snapshot Path
//!
//! The certificate template mixes rotated sidebar labels, anchored footers
//! and centered display blocks, which is impractical to redrive through the
//! block primitives of the layout engine. This path renders the template's
//! *visual tree* straight to page bitmaps instead:
//!
//! 1. Project the tree: editable fields become static text nodes (value or
//!    placeholder) and action buttons are stripped, so no interactive
//!    chrome reaches the output.
//! 2. Copy live signature bitmaps into the projected tree's canvases,
//!    matching by stable id and falling back to position only when no id
//!    matches; a clone with fewer canvases than the source must never end
//!    up with a misattributed signature.
//! 3. Split the tree into page segments at explicit [`VisualNode::Divider`]
//!    markers and force each segment to the exact A4 box
//!    (`height = width × √2`), with a [`VisualNode::Pusher`] spacer
//!    absorbing slack so trailing content anchors to the bottom.
//! 4. Rasterize each segment off-screen with tiny-skia at a controlled
//!    fractional scale (below native resolution, bounding file size) and
//!    encode it as a full-page JPEG. Segments with no effective text
//!    content are discarded.
//!
//! Strictly heavier than the block layout engine; reserved for templates
//! that genuinely need arbitrary visual layout. Pages are rendered
//! sequentially; one page pixmap in flight at a time.

use tiny_skia::{IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, Transform};
use ttf_parser::OutlineBuilder;

use crate::error::RenderError;
use crate::evidence::{self, NormalizedImage};
use crate::signature::SignatureRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Column,
    Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Start,
    Center,
}

#[derive(Debug, Clone)]
pub struct BlockStyle {
    pub direction: Direction,
    /// Vertical (column) or horizontal (row) gap between children, px.
    pub gap: f32,
    pub pad: f32,
    pub align: Align,
    /// Fixed width; `None` fills the available width.
    pub width: Option<f32>,
    /// Draw child text rotated -90°, distributed along the column height.
    pub rotated: bool,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self {
            direction: Direction::Column,
            gap: 0.0,
            pad: 0.0,
            align: Align::Start,
            width: None,
            rotated: false,
            margin_top: 0.0,
            margin_bottom: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f32,
    pub weight: u32,
    pub italic: bool,
    pub align: Align,
}

/// A headless layout tree rebuilt per export. The editable variants
/// ([`VisualNode::Field`], [`VisualNode::Button`]) exist only pre-projection.
#[derive(Debug, Clone)]
pub enum VisualNode {
    Block {
        style: BlockStyle,
        children: Vec<VisualNode>,
    },
    Text {
        content: String,
        style: TextStyle,
    },
    /// An editable input. Projection replaces it with a static [`VisualNode::Text`]
    /// carrying the rendered value, sized like its sibling label typography.
    Field {
        id: String,
        value: String,
        placeholder: String,
        style: TextStyle,
    },
    /// A signature canvas slot. `bitmap` is populated by the copy step.
    Canvas {
        signature_id: Option<String>,
        width: f32,
        height: f32,
        bitmap: Option<Pixmap>,
    },
    /// A decoded raster asset (logo).
    Image {
        jpeg: NormalizedImage,
        width: f32,
        height: f32,
    },
    /// An action control; stripped during projection.
    Button { label: String },
    /// Horizontal separator line (signature baseline).
    Rule { width_frac: f32, thickness: f32 },
    /// Explicit page split marker.
    Divider,
    /// Flex spacer that absorbs leftover page height, pushing trailing
    /// content to the bottom of the page box.
    Pusher,
}

/// Rasterization parameters for one export.
pub struct SnapshotConfig {
    /// Logical page width in CSS pixels. Page height is `width × √2`.
    pub page_width_px: f32,
    /// Raster scale over logical pixels. A fractional value below native
    /// resolution is deliberate; it bounds output file size.
    pub scale: f32,
    /// JPEG quality for the page bitmaps.
    pub jpeg_quality: f32,
    /// TrueType/OpenType face used for all text.
    pub font_data: Vec<u8>,
}

impl SnapshotConfig {
    pub fn new(font_data: Vec<u8>) -> Self {
        Self {
            page_width_px: 794.0,
            scale: 1.25,
            jpeg_quality: 0.68,
            font_data,
        }
    }
}

// ── Step 1: projection ──────────────────────────────────────────────

/// Project the editable tree to its display form: fields become static
/// text, buttons disappear (along with containers emptied by the removal).
pub fn project(node: &VisualNode) -> Option<VisualNode> {
    match node {
        VisualNode::Button { .. } => None,
        VisualNode::Field {
            value,
            placeholder,
            style,
            ..
        } => {
            let content = if value.trim().is_empty() {
                placeholder.clone()
            } else {
                value.clone()
            };
            Some(VisualNode::Text {
                content,
                style: *style,
            })
        }
        VisualNode::Block { style, children } => {
            let projected: Vec<VisualNode> =
                children.iter().filter_map(project).collect();
            if projected.is_empty() && !children.is_empty() {
                return None;
            }
            Some(VisualNode::Block {
                style: style.clone(),
                children: projected,
            })
        }
        other => Some(other.clone()),
    }
}

// ── Step 2: signature copy ──────────────────────────────────────────

/// Copy live signature bitmaps into the tree's canvases. Id match wins;
/// positional index is only the fallback for canvases without any id match.
pub fn copy_signature_bitmaps(node: &mut VisualNode, registry: &SignatureRegistry) {
    let mut ordinal = 0usize;
    copy_bitmaps_walk(node, registry, &mut ordinal);
}

fn copy_bitmaps_walk(node: &mut VisualNode, registry: &SignatureRegistry, ordinal: &mut usize) {
    match node {
        VisualNode::Canvas {
            signature_id,
            bitmap,
            ..
        } => {
            let by_id = signature_id
                .as_deref()
                .and_then(|id| registry.get(id));
            let pad = by_id.or_else(|| registry.get_index(*ordinal));
            *bitmap = pad.and_then(|p| p.snapshot());
            *ordinal += 1;
        }
        VisualNode::Block { children, .. } => {
            for child in children {
                copy_bitmaps_walk(child, registry, ordinal);
            }
        }
        _ => {}
    }
}

// ── Step 3: page segmentation ───────────────────────────────────────

/// Split the tree into page segments at `Divider` markers. The dividers
/// live in one content column; every page keeps a full clone of the rest
/// of the tree (sidebar chrome included).
pub fn split_pages(root: &VisualNode) -> Vec<VisualNode> {
    let count = count_dividers(root);
    if count == 0 {
        return vec![root.clone()];
    }
    (0..=count)
        .filter_map(|segment| extract_segment(root, segment))
        .collect()
}

fn count_dividers(node: &VisualNode) -> usize {
    match node {
        VisualNode::Divider => 1,
        VisualNode::Block { children, .. } => children.iter().map(count_dividers).sum(),
        _ => 0,
    }
}

/// Clone the tree keeping, inside the divider-bearing block, only the
/// children of the requested segment.
fn extract_segment(node: &VisualNode, segment: usize) -> Option<VisualNode> {
    match node {
        VisualNode::Block { style, children } => {
            if children.iter().any(|c| matches!(c, VisualNode::Divider)) {
                let mut current = 0usize;
                let mut kept = Vec::new();
                for child in children {
                    if matches!(child, VisualNode::Divider) {
                        current += 1;
                        continue;
                    }
                    if current == segment {
                        kept.push(child.clone());
                    }
                }
                if kept.is_empty() {
                    return None;
                }
                Some(VisualNode::Block {
                    style: style.clone(),
                    children: kept,
                })
            } else {
                // An empty segment inside a descendant invalidates the whole
                // page, chrome included.
                let mut kept = Vec::with_capacity(children.len());
                for child in children {
                    kept.push(extract_segment(child, segment)?);
                }
                Some(VisualNode::Block {
                    style: style.clone(),
                    children: kept,
                })
            }
        }
        other => Some(other.clone()),
    }
}

/// Does this (projected) segment carry any effective text content?
/// A page with none is not emitted.
pub fn page_has_text(node: &VisualNode) -> bool {
    match node {
        VisualNode::Text { content, .. } => !content.trim().is_empty(),
        VisualNode::Block { children, .. } => children.iter().any(page_has_text),
        _ => false,
    }
}

// ── Step 4: layout + rasterization ──────────────────────────────────

struct Rasterizer<'a> {
    face: ttf_parser::Face<'a>,
    shaper: rustybuzz::Face<'a>,
    pixmap: Pixmap,
    scale: f32,
}

struct GlyphPath {
    builder: PathBuilder,
}

impl OutlineBuilder for GlyphPath {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }
    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }
    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }
    fn close(&mut self) {
        self.builder.close();
    }
}

impl<'a> Rasterizer<'a> {
    fn new(font_data: &'a [u8], width_px: u32, height_px: u32, scale: f32) -> Result<Self, RenderError> {
        let face = ttf_parser::Face::parse(font_data, 0)
            .map_err(|e| RenderError::MissingFont(e.to_string()))?;
        let shaper = rustybuzz::Face::from_slice(font_data, 0)
            .ok_or_else(|| RenderError::MissingFont("rustybuzz rejected the face".into()))?;
        let device_w = ((width_px as f32) * scale).round().max(1.0) as u32;
        let device_h = ((height_px as f32) * scale).round().max(1.0) as u32;
        let mut pixmap = Pixmap::new(device_w, device_h)
            .ok_or_else(|| RenderError::Raster("could not allocate page pixmap".into()))?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self {
            face,
            shaper,
            pixmap,
            scale,
        })
    }

    fn units_per_em(&self) -> f32 {
        self.face.units_per_em() as f32
    }

    fn line_height(&self, size: f32) -> f32 {
        size * 1.25
    }

    /// Shaped advance width of `text` at `size`, in logical px.
    fn measure(&self, text: &str, size: f32) -> f32 {
        let buffer = UnicodeBufferExt::shape(&self.shaper, text);
        let px_per_unit = size / self.units_per_em();
        buffer
            .glyph_positions()
            .iter()
            .map(|pos| pos.x_advance as f32 * px_per_unit)
            .sum()
    }

    /// Greedy word wrap; a single over-wide word stays whole.
    fn wrap(&self, text: &str, max_width: f32, size: f32) -> Vec<String> {
        let space_w = self.measure(" ", size);
        let mut lines: Vec<String> = Vec::new();
        let mut line = String::new();
        let mut line_w = 0.0f32;
        for word in text.split_whitespace() {
            let word_w = self.measure(word, size);
            if !line.is_empty() && line_w + space_w + word_w > max_width {
                lines.push(std::mem::take(&mut line));
                line_w = 0.0;
            }
            if line.is_empty() {
                line = word.to_string();
                line_w = word_w;
            } else {
                line.push(' ');
                line.push_str(word);
                line_w += space_w + word_w;
            }
        }
        if !line.is_empty() || lines.is_empty() {
            lines.push(line);
        }
        lines
    }

    /// Draw one shaped line with the baseline at `(x, baseline_y)` logical
    /// px, optionally rotated -90° around the baseline origin.
    fn draw_line(&mut self, text: &str, x: f32, baseline_y: f32, size: f32, rotated: bool) {
        let shaped = UnicodeBufferExt::shape(&self.shaper, text);
        let px_per_unit = size / self.units_per_em();

        let mut paint = Paint::default();
        paint.set_color_rgba8(0x11, 0x18, 0x27, 0xFF);
        paint.anti_alias = true;

        let mut pen = 0.0f32;
        let infos = shaped.glyph_infos();
        let positions = shaped.glyph_positions();
        for (info, pos) in infos.iter().zip(positions.iter()) {
            let glyph_id = ttf_parser::GlyphId(info.glyph_id as u16);
            let mut outline = GlyphPath {
                builder: PathBuilder::new(),
            };
            if self.face.outline_glyph(glyph_id, &mut outline).is_some() {
                if let Some(path) = outline.builder.finish() {
                    let gx = pen + pos.x_offset as f32 * px_per_unit;
                    let gy = pos.y_offset as f32 * px_per_unit;
                    // Font units are y-up; flip into the canvas space.
                    let mut t = Transform::from_row(
                        px_per_unit,
                        0.0,
                        0.0,
                        -px_per_unit,
                        gx,
                        -gy,
                    );
                    if rotated {
                        t = t.post_concat(Transform::from_rotate(-90.0));
                    }
                    t = t
                        .post_translate(x, baseline_y)
                        .post_scale(self.scale, self.scale);
                    self.pixmap
                        .fill_path(&path, &paint, tiny_skia::FillRule::Winding, t, None);
                }
            }
            pen += pos.x_advance as f32 * px_per_unit;
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(0x22, 0x22, 0x22, 0xFF);
        if let Some(rect) = tiny_skia::Rect::from_xywh(x, y, w, h) {
            self.pixmap.fill_rect(
                rect,
                &paint,
                Transform::from_scale(self.scale, self.scale),
                None,
            );
        }
    }

    fn blit(&mut self, pixmap: &Pixmap, x: f32, y: f32, w: f32, h: f32) {
        if pixmap.width() == 0 || pixmap.height() == 0 {
            return;
        }
        let sx = w / pixmap.width() as f32 * self.scale;
        let sy = h / pixmap.height() as f32 * self.scale;
        let t = Transform::from_row(sx, 0.0, 0.0, sy, x * self.scale, y * self.scale);
        self.pixmap
            .draw_pixmap(0, 0, pixmap.as_ref(), &PixmapPaint::default(), t, None);
    }

    fn blit_jpeg(&mut self, jpeg: &NormalizedImage, x: f32, y: f32, w: f32, h: f32) {
        let decoded = match image::load_from_memory(&jpeg.data) {
            Ok(img) => img.to_rgba8(),
            Err(_) => return,
        };
        let size = IntSize::from_wh(decoded.width(), decoded.height());
        let pixmap = size.and_then(|s| Pixmap::from_vec(decoded.into_raw(), s));
        if let Some(pixmap) = pixmap {
            self.blit(&pixmap, x, y, w, h);
        }
    }
}

/// Thin helper so shaping reads as one call.
struct UnicodeBufferExt;

impl UnicodeBufferExt {
    fn shape(face: &rustybuzz::Face<'_>, text: &str) -> rustybuzz::GlyphBuffer {
        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        rustybuzz::shape(face, &[], buffer)
    }
}

// ── Measurement + placement ─────────────────────────────────────────

fn measure_height(r: &Rasterizer<'_>, node: &VisualNode, avail_w: f32) -> f32 {
    match node {
        VisualNode::Text { content, style } => {
            let lines = r.wrap(content, avail_w, style.size);
            lines.len() as f32 * r.line_height(style.size)
        }
        VisualNode::Canvas { height, .. } => *height,
        VisualNode::Image { height, .. } => *height,
        VisualNode::Rule { thickness, .. } => thickness + 8.0,
        VisualNode::Block { style, children } => {
            let inner_w = style.width.unwrap_or(avail_w) - style.pad * 2.0;
            let content_h = match style.direction {
                Direction::Column => {
                    let mut h = 0.0f32;
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            h += style.gap;
                        }
                        h += measure_height(r, child, inner_w);
                    }
                    h
                }
                Direction::Row => {
                    let mut fixed: f32 = children
                        .iter()
                        .filter_map(|c| block_width(c))
                        .sum();
                    fixed = fixed.min(inner_w);
                    let flex_w = (inner_w - fixed).max(1.0);
                    children
                        .iter()
                        .map(|c| {
                            let w = block_width(c).unwrap_or(flex_w);
                            measure_height(r, c, w)
                        })
                        .fold(0.0, f32::max)
                }
            };
            content_h + style.pad * 2.0 + style.margin_top + style.margin_bottom
        }
        // Pushers are sized by leftover space at placement time.
        VisualNode::Pusher => 0.0,
        VisualNode::Field { .. } | VisualNode::Button { .. } | VisualNode::Divider => 0.0,
    }
}

fn block_width(node: &VisualNode) -> Option<f32> {
    match node {
        VisualNode::Block { style, .. } => style.width,
        _ => None,
    }
}

fn place(
    r: &mut Rasterizer<'_>,
    node: &VisualNode,
    x: f32,
    y: f32,
    avail_w: f32,
    assigned_h: Option<f32>,
) {
    match node {
        VisualNode::Text { content, style } => {
            let lines = r.wrap(content, avail_w, style.size);
            let lh = r.line_height(style.size);
            for (i, line) in lines.iter().enumerate() {
                let line_w = r.measure(line, style.size);
                let lx = match style.align {
                    Align::Start => x,
                    Align::Center => x + (avail_w - line_w) / 2.0,
                };
                // Baseline sits at ~80% of the line box.
                r.draw_line(line, lx, y + i as f32 * lh + lh * 0.8, style.size, false);
            }
        }

        VisualNode::Canvas {
            width,
            height,
            bitmap,
            ..
        } => {
            let cx = x + (avail_w - width) / 2.0;
            if let Some(pixmap) = bitmap {
                let pixmap = pixmap.clone();
                r.blit(&pixmap, cx, y, *width, *height);
            }
        }

        VisualNode::Image { jpeg, width, height } => {
            let cx = x + (avail_w - width) / 2.0;
            r.blit_jpeg(jpeg, cx, y, *width, *height);
        }

        VisualNode::Rule {
            width_frac,
            thickness,
        } => {
            let w = avail_w * width_frac;
            r.fill_rect(x + (avail_w - w) / 2.0, y + 4.0, w, *thickness);
        }

        VisualNode::Block { style, children } => {
            let block_w = style.width.unwrap_or(avail_w);
            let inner_x = x + style.pad;
            let inner_w = block_w - style.pad * 2.0;
            let top = y + style.margin_top + style.pad;

            if style.rotated {
                place_rotated_column(r, children, inner_x, top, inner_w, assigned_h);
                return;
            }

            match style.direction {
                Direction::Column => {
                    let natural: f32 = {
                        let mut h = 0.0;
                        for (i, child) in children.iter().enumerate() {
                            if i > 0 {
                                h += style.gap;
                            }
                            h += measure_height(r, child, inner_w);
                        }
                        h
                    };
                    let leftover = assigned_h
                        .map(|h| (h - style.pad * 2.0 - natural).max(0.0))
                        .unwrap_or(0.0);

                    // Without a pusher, overflow past the page box is
                    // clipped by the pixmap bounds.
                    let mut cy = top;
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            cy += style.gap;
                        }
                        if matches!(child, VisualNode::Pusher) {
                            cy += leftover;
                            continue;
                        }
                        let child_h = measure_height(r, child, inner_w);
                        place(r, child, inner_x, cy, inner_w, None);
                        cy += child_h;
                    }
                }
                Direction::Row => {
                    let fixed: f32 = children.iter().filter_map(block_width).sum();
                    let flex_count = children
                        .iter()
                        .filter(|c| block_width(c).is_none())
                        .count()
                        .max(1);
                    let flex_w = ((inner_w - fixed) / flex_count as f32).max(1.0);
                    let mut cx = inner_x;
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            cx += style.gap;
                        }
                        let w = block_width(child).unwrap_or(flex_w);
                        place(r, child, cx, top, w, assigned_h);
                        cx += w;
                    }
                }
            }
        }

        VisualNode::Pusher
        | VisualNode::Divider
        | VisualNode::Field { .. }
        | VisualNode::Button { .. } => {}
    }
}

/// Sidebar column: children distributed evenly along the assigned height,
/// each drawn rotated -90° and centered in its slice.
fn place_rotated_column(
    r: &mut Rasterizer<'_>,
    children: &[VisualNode],
    x: f32,
    y: f32,
    w: f32,
    assigned_h: Option<f32>,
) {
    let total_h = assigned_h.unwrap_or(600.0);
    let n = children.len().max(1);
    let slice_h = total_h / n as f32;
    for (i, child) in children.iter().enumerate() {
        if let VisualNode::Text { content, style } = child {
            let text_w = r.measure(content, style.size);
            // Rotated -90°: the advance direction runs bottom-to-top, so
            // center the run within the slice and the baseline within the
            // column width.
            let baseline_x = x + w / 2.0 + style.size * 0.35;
            let start_y = y + i as f32 * slice_h + (slice_h + text_w) / 2.0;
            r.draw_line(content, baseline_x, start_y, style.size, true);
        }
    }
}

// ── Entry point ─────────────────────────────────────────────────────

/// Render a visual tree into full-page JPEGs, one per divider-delimited
/// segment with effective text content.
pub fn render_pages(
    tree: &VisualNode,
    signatures: &SignatureRegistry,
    config: &SnapshotConfig,
) -> Result<Vec<NormalizedImage>, RenderError> {
    let projected = project(tree).ok_or(RenderError::EmptyDocument)?;

    let page_w = config.page_width_px;
    let page_h = (page_w * std::f32::consts::SQRT_2).round();

    let mut pages = Vec::new();
    for mut segment in split_pages(&projected) {
        copy_signature_bitmaps(&mut segment, signatures);
        if !page_has_text(&segment) {
            continue;
        }

        let mut rasterizer = Rasterizer::new(
            &config.font_data,
            page_w as u32,
            page_h as u32,
            config.scale,
        )?;
        place(
            &mut rasterizer,
            &segment,
            0.0,
            0.0,
            page_w,
            Some(page_h),
        );

        pages.push(encode_page(&rasterizer.pixmap, config.jpeg_quality)?);
    }

    if pages.is_empty() {
        return Err(RenderError::EmptyDocument);
    }
    Ok(pages)
}

fn encode_page(pixmap: &Pixmap, quality: f32) -> Result<NormalizedImage, RenderError> {
    let mut rgba = Vec::with_capacity((pixmap.width() * pixmap.height() * 4) as usize);
    for px in pixmap.pixels() {
        let a = px.alpha();
        rgba.push(px.red().saturating_add(255 - a));
        rgba.push(px.green().saturating_add(255 - a));
        rgba.push(px.blue().saturating_add(255 - a));
        rgba.push(255);
    }
    let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| RenderError::Raster("page buffer size mismatch".into()))?;
    evidence::normalize_decoded(
        image::DynamicImage::ImageRgba8(img),
        u32::MAX,
        quality,
    )
    .map_err(|e| RenderError::Raster(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{Point, SignaturePad, SignatureRegistry};

    fn text_node(content: &str) -> VisualNode {
        VisualNode::Text {
            content: content.into(),
            style: TextStyle {
                size: 16.0,
                weight: 400,
                italic: false,
                align: Align::Start,
            },
        }
    }

    fn block(children: Vec<VisualNode>) -> VisualNode {
        VisualNode::Block {
            style: BlockStyle::default(),
            children,
        }
    }

    #[test]
    fn test_projection_replaces_field_with_value() {
        let tree = block(vec![VisualNode::Field {
            id: "prestador".into(),
            value: "Inmobiliaria Sol".into(),
            placeholder: "Nombre de la empresa".into(),
            style: TextStyle {
                size: 26.0,
                weight: 600,
                italic: false,
                align: Align::Start,
            },
        }]);
        let projected = project(&tree).unwrap();
        match projected {
            VisualNode::Block { children, .. } => match &children[0] {
                VisualNode::Text { content, .. } => assert_eq!(content, "Inmobiliaria Sol"),
                other => panic!("expected Text, got {other:?}"),
            },
            _ => panic!("expected Block"),
        }
    }

    #[test]
    fn test_projection_uses_placeholder_when_empty() {
        let tree = VisualNode::Field {
            id: "folio".into(),
            value: "   ".into(),
            placeholder: "Ingrese folio".into(),
            style: TextStyle {
                size: 26.0,
                weight: 600,
                italic: false,
                align: Align::Start,
            },
        };
        match project(&tree).unwrap() {
            VisualNode::Text { content, .. } => assert_eq!(content, "Ingrese folio"),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[test]
    fn test_projection_strips_buttons_and_empty_parents() {
        let tree = block(vec![
            text_node("contenido"),
            block(vec![VisualNode::Button { label: "Limpiar".into() }]),
        ]);
        let projected = project(&tree).unwrap();
        match projected {
            VisualNode::Block { children, .. } => {
                assert_eq!(children.len(), 1, "button wrapper must be removed entirely");
                assert!(matches!(children[0], VisualNode::Text { .. }));
            }
            _ => panic!("expected Block"),
        }
    }

    #[test]
    fn test_split_produces_one_segment_per_divider_gap() {
        let tree = block(vec![block(vec![
            text_node("página uno"),
            VisualNode::Divider,
            text_node("página dos"),
        ])]);
        let pages = split_pages(&tree);
        assert_eq!(pages.len(), 2);
        assert!(page_has_text(&pages[0]));
        assert!(page_has_text(&pages[1]));
    }

    #[test]
    fn test_empty_segment_has_no_text() {
        let tree = block(vec![block(vec![
            text_node("página uno"),
            VisualNode::Divider,
        ])]);
        let pages = split_pages(&tree);
        // The trailing empty segment is dropped by extract_segment.
        assert_eq!(pages.len(), 1);
    }

    fn drawn_pad(id: &str, to: (f32, f32)) -> SignaturePad {
        let mut pad = SignaturePad::new(id, 400, 140, 1.0);
        pad.begin(Point::new(5.0, 5.0));
        pad.extend(Point::new(to.0, to.1));
        pad.end();
        pad
    }

    #[test]
    fn test_signature_copy_matches_by_id_not_order() {
        let mut registry = SignatureRegistry::new();
        registry.register(drawn_pad("A", (390.0, 10.0)));
        registry.register(drawn_pad("B", (10.0, 130.0)));

        // The clone contains only canvas B; it sits at position 0, which
        // would alias pad A under positional matching.
        let mut clone = block(vec![VisualNode::Canvas {
            signature_id: Some("B".into()),
            width: 400.0,
            height: 140.0,
            bitmap: None,
        }]);
        copy_signature_bitmaps(&mut clone, &registry);

        let expected = registry.get("B").unwrap().snapshot().unwrap();
        match clone {
            VisualNode::Block { children, .. } => match &children[0] {
                VisualNode::Canvas { bitmap: Some(b), .. } => {
                    assert_eq!(b.data(), expected.data(), "canvas B must hold B's strokes");
                }
                other => panic!("expected populated Canvas, got {other:?}"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_signature_copy_falls_back_to_position() {
        let mut registry = SignatureRegistry::new();
        registry.register(drawn_pad("A", (390.0, 10.0)));

        let mut clone = block(vec![VisualNode::Canvas {
            signature_id: None,
            width: 400.0,
            height: 140.0,
            bitmap: None,
        }]);
        copy_signature_bitmaps(&mut clone, &registry);
        match clone {
            VisualNode::Block { children, .. } => {
                assert!(matches!(&children[0], VisualNode::Canvas { bitmap: Some(_), .. }));
            }
            _ => unreachable!(),
        }
    }
}
