//! # Signature Capture
//!
//! Freehand signature slots backed by a raster bitmap. A pad receives a
//! stream of 2D points between pointer-down and pointer-up (single pointer;
//! only the first touch point is tracked upstream) and strokes them into an
//! owned pixmap.
//!
//! Device-pixel-ratio scaling is applied exactly once, at slot creation:
//! the backing store is allocated at `size × dpr` and the scale is recorded
//! as a transform. All stroke drawing afterwards happens in logical units -
//! re-applying the scale per draw call causes line-width drift.

use tiny_skia::{
    LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform,
};

/// A 2D point in logical (CSS-pixel) units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StrokeState {
    Idle,
    Drawing { last: Point },
}

/// One signature slot: stable id, backing bitmap, stroke state machine.
pub struct SignaturePad {
    id: String,
    width: f32,
    height: f32,
    /// Recorded once at creation; never re-applied per stroke.
    scale: Transform,
    pixmap: Pixmap,
    state: StrokeState,
    has_content: bool,
    line_width: f32,
}

impl SignaturePad {
    /// Allocate a pad of `width × height` logical units with the backing
    /// store scaled by `device_pixel_ratio` for crisp strokes.
    pub fn new(id: &str, width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        let dpr = if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
        let pw = ((width as f32) * dpr).floor().max(1.0) as u32;
        let ph = ((height as f32) * dpr).floor().max(1.0) as u32;
        let pixmap = Pixmap::new(pw, ph).expect("signature pad dimensions must be non-zero");
        Self {
            id: id.to_string(),
            width: width as f32,
            height: height as f32,
            scale: Transform::from_scale(dpr, dpr),
            pixmap,
            state: StrokeState::Idle,
            has_content: false,
            line_width: 2.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Logical size of the pad.
    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Pointer down: open a stroke at `p`.
    pub fn begin(&mut self, p: Point) {
        self.state = StrokeState::Drawing { last: p };
    }

    /// Pointer move: extend the active stroke to `p`. A no-op while idle -
    /// there is no transition on `extend` outside a stroke.
    pub fn extend(&mut self, p: Point) {
        let last = match self.state {
            StrokeState::Drawing { last } => last,
            StrokeState::Idle => return,
        };
        self.stroke_segment(last, p);
        self.state = StrokeState::Drawing { last: p };
        self.has_content = true;
    }

    /// Pointer up: close the stroke.
    pub fn end(&mut self) {
        self.state = StrokeState::Idle;
    }

    /// Reset the bitmap to fully transparent and drop the content flag.
    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.has_content = false;
    }

    /// Whether anything has been drawn since creation / the last clear.
    /// Exposed so required-field checks never need bitmap inspection.
    pub fn has_content(&self) -> bool {
        self.has_content
    }

    /// A copy of the bitmap, or `None` when the pad is empty.
    pub fn snapshot(&self) -> Option<Pixmap> {
        if self.has_content {
            Some(self.pixmap.clone())
        } else {
            None
        }
    }

    fn stroke_segment(&mut self, from: Point, to: Point) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        // A stationary tap still leaves a dot thanks to the round cap.
        if from == to {
            pb.line_to(to.x + 0.01, to.y);
        } else {
            pb.line_to(to.x, to.y);
        }
        let path = match pb.finish() {
            Some(p) => p,
            None => return,
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(0x22, 0x22, 0x22, 0xFF);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: self.line_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        self.pixmap.stroke_path(&path, &paint, &stroke, self.scale, None);
    }
}

/// The signature slots of one form, in mount order. Lookups go by stable
/// id; positional access exists only as the copy fallback when a clone
/// carries a canvas with no id match.
#[derive(Default)]
pub struct SignatureRegistry {
    pads: Vec<SignaturePad>,
}

impl SignatureRegistry {
    pub fn new() -> Self {
        Self { pads: Vec::new() }
    }

    pub fn register(&mut self, pad: SignaturePad) {
        self.pads.push(pad);
    }

    pub fn get(&self, id: &str) -> Option<&SignaturePad> {
        self.pads.iter().find(|p| p.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SignaturePad> {
        self.pads.iter_mut().find(|p| p.id() == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&SignaturePad> {
        self.pads.get(index)
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignaturePad> {
        self.pads.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawn_pad(id: &str) -> SignaturePad {
        let mut pad = SignaturePad::new(id, 360, 140, 1.0);
        pad.begin(Point::new(10.0, 10.0));
        pad.extend(Point::new(120.0, 60.0));
        pad.end();
        pad
    }

    #[test]
    fn test_new_pad_is_empty() {
        let pad = SignaturePad::new("firma", 360, 140, 2.0);
        assert!(!pad.has_content());
        assert!(pad.snapshot().is_none());
    }

    #[test]
    fn test_extend_while_idle_is_noop() {
        let mut pad = SignaturePad::new("firma", 360, 140, 1.0);
        pad.extend(Point::new(50.0, 50.0));
        assert!(!pad.has_content(), "extend without begin must not draw");
    }

    #[test]
    fn test_begin_extend_marks_content() {
        let pad = drawn_pad("firma");
        assert!(pad.has_content());
        let snap = pad.snapshot().unwrap();
        assert!(snap.data().iter().any(|&b| b != 0), "stroke should leave pixels");
    }

    #[test]
    fn test_begin_alone_leaves_no_content() {
        let mut pad = SignaturePad::new("firma", 360, 140, 1.0);
        pad.begin(Point::new(10.0, 10.0));
        pad.end();
        assert!(!pad.has_content());
    }

    #[test]
    fn test_clear_resets_bitmap_and_flag() {
        let mut pad = drawn_pad("firma");
        pad.clear();
        assert!(!pad.has_content());
        assert!(pad.snapshot().is_none());
    }

    #[test]
    fn test_dpr_scales_backing_store() {
        let pad = SignaturePad::new("firma", 360, 140, 2.0);
        let snap_dims = (pad.pixmap.width(), pad.pixmap.height());
        assert_eq!(snap_dims, (720, 280));
        assert_eq!(pad.size(), (360.0, 140.0));
    }

    #[test]
    fn test_stroke_after_end_does_not_extend() {
        let mut pad = drawn_pad("firma");
        let before = pad.snapshot().unwrap();
        pad.extend(Point::new(300.0, 130.0));
        let after = pad.snapshot().unwrap();
        assert_eq!(before.data(), after.data());
    }

    #[test]
    fn test_registry_lookup_by_id_not_order() {
        let mut reg = SignatureRegistry::new();
        reg.register(drawn_pad("firma-gerencia-1"));
        reg.register(drawn_pad("firma-inspector"));
        assert_eq!(reg.get("firma-inspector").unwrap().id(), "firma-inspector");
        assert_eq!(reg.get_index(0).unwrap().id(), "firma-gerencia-1");
        assert!(reg.get("firma-gerencia-2").is_none());
    }
}
