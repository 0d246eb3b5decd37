//! # PDF Serializer
//!
//! Takes composed pages from the layout engine and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer: raw bytes, no external PDF
//! library. The subset the report templates need (standard fonts,
//! rectangles, lines, WinAnsi text and image XObjects) is small enough to
//! keep the crate self-contained.
//!
//! ## Structure
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, pages, fonts, streams, images)
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout coordinates arrive in millimeters from the top-left corner and
//! are converted to PDF points (bottom-left origin) here, nowhere else.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::FontContext;
use crate::layout::{Color, DrawCommand, EmbeddedImage, LayoutPage, TextAlign, PAGE_H, PAGE_W};

/// Points per millimeter.
const K: f64 = 72.0 / 25.4;

/// Document metadata embedded in the Info dictionary.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

pub struct PdfWriter;

struct PdfObject {
    data: Vec<u8>,
}

struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// (weight >= 600, italic) -> font resource index (/F{i}).
    font_indices: HashMap<(bool, bool), usize>,
    /// (resource index, object id) pairs in registration order.
    font_objects: Vec<(usize, usize)>,
    /// XObject obj ids in /Im{i} order.
    image_objects: Vec<usize>,
    /// (page_index, image_command_ordinal) -> image index.
    image_index_map: HashMap<(usize, usize), usize>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize composed pages to PDF bytes.
    pub fn write(
        &self,
        pages: &[LayoutPage],
        metadata: &Metadata,
        fonts: &FontContext,
    ) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_indices: HashMap::new(),
            font_objects: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        // 0 = placeholder (objects are 1-indexed), 1 = Catalog, 2 = Pages.
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        self.register_fonts(&mut builder, pages, fonts);
        self.register_images(&mut builder, pages);

        let mut page_obj_ids = Vec::new();
        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder, fonts);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let font_resources = self.font_resource_dict(&builder);
            let xobject_resources = self.xobject_resource_dict(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!(
                    "/Font << {} >> /XObject << {} >>",
                    font_resources, xobject_resources
                )
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                PAGE_W * K,
                PAGE_H * K,
                content_obj_id,
                resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = if metadata.title.is_some() || metadata.author.is_some() {
            let id = builder.objects.len();
            let mut info = String::from("<< ");
            if let Some(ref title) = metadata.title {
                let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
            }
            if let Some(ref author) = metadata.author {
                let _ = write!(info, "/Author ({}) ", escape_pdf_string(author));
            }
            if let Some(ref subject) = metadata.subject {
                let _ = write!(info, "/Subject ({}) ", escape_pdf_string(subject));
            }
            let _ = write!(info, "/Producer (informe 0.1) /Creator (informe) >>");
            builder.objects.push(PdfObject {
                data: info.into_bytes(),
            });
            Some(id)
        } else {
            None
        };

        self.serialize(&builder, info_obj_id)
    }

    /// Register the standard-font variants actually used across all pages.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage], fonts: &FontContext) {
        let mut used: Vec<(bool, bool)> = Vec::new();
        for page in pages {
            for cmd in &page.commands {
                if let DrawCommand::Text { weight, italic, .. } = cmd {
                    let key = (*weight >= 600, *italic);
                    if !used.contains(&key) {
                        used.push(key);
                    }
                }
            }
        }
        if used.is_empty() {
            used.push((false, false));
        }

        for (idx, key) in used.into_iter().enumerate() {
            let (bold, italic) = key;
            let base = fonts
                .resolve(if bold { 700 } else { 400 }, italic)
                .pdf_name();
            let obj_id = builder.objects.len();
            let dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                base
            );
            builder.objects.push(PdfObject {
                data: dict.into_bytes(),
            });
            builder.font_indices.insert(key, idx);
            builder.font_objects.push((idx, obj_id));
        }
    }

    /// Register every image command as an XObject.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            let mut ordinal = 0usize;
            for cmd in &page.commands {
                if let DrawCommand::Image { image, .. } = cmd {
                    let obj_id = builder.objects.len();
                    let data = match image {
                        EmbeddedImage::Jpeg(jpeg) => {
                            let mut out: Vec<u8> = Vec::new();
                            let _ = write!(
                                out,
                                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                                 /ColorSpace /DeviceRGB /BitsPerComponent 8 \
                                 /Filter /DCTDecode /Length {} >>\nstream\n",
                                jpeg.width,
                                jpeg.height,
                                jpeg.data.len()
                            );
                            out.extend_from_slice(&jpeg.data);
                            out.extend_from_slice(b"\nendstream");
                            out
                        }
                        EmbeddedImage::Rgb { data, width, height } => {
                            let compressed = compress_to_vec_zlib(data, 6);
                            let mut out: Vec<u8> = Vec::new();
                            let _ = write!(
                                out,
                                "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
                                 /ColorSpace /DeviceRGB /BitsPerComponent 8 \
                                 /Filter /FlateDecode /Length {} >>\nstream\n",
                                width,
                                height,
                                compressed.len()
                            );
                            out.extend_from_slice(&compressed);
                            out.extend_from_slice(b"\nendstream");
                            out
                        }
                    };
                    builder.objects.push(PdfObject { data });

                    let img_idx = builder.image_objects.len();
                    builder.image_objects.push(obj_id);
                    builder.image_index_map.insert((page_idx, ordinal), img_idx);
                    ordinal += 1;
                }
            }
        }
    }

    fn font_resource_dict(&self, builder: &PdfBuilder) -> String {
        builder
            .font_objects
            .iter()
            .map(|(idx, obj_id)| format!("/F{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn xobject_resource_dict(&self, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((p, _), _)| *p == page_idx)
            .map(|((_, _), &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        entries.sort_unstable();
        entries.dedup();
        entries
            .iter()
            .map(|(img_idx, obj_id)| format!("/Im{} {} 0 R", img_idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Emit the PDF operators for one page.
    fn build_content_stream(
        &self,
        page: &LayoutPage,
        page_idx: usize,
        builder: &PdfBuilder,
        fonts: &FontContext,
    ) -> String {
        let mut stream = String::new();
        let mut image_ordinal = 0usize;

        for cmd in &page.commands {
            match cmd {
                DrawCommand::Rect {
                    x,
                    y,
                    w,
                    h,
                    fill,
                    stroke,
                    stroke_width,
                    corner_radius,
                } => {
                    let px = x * K;
                    let py = (PAGE_H - y - h) * K;
                    let pw = w * K;
                    let ph = h * K;

                    if let Some(c) = fill {
                        let _ = write!(stream, "q\n{:.3} {:.3} {:.3} rg\n", c.r, c.g, c.b);
                        if *corner_radius > 0.0 {
                            write_rounded_rect(&mut stream, px, py, pw, ph, corner_radius * K);
                        } else {
                            let _ = write!(stream, "{:.2} {:.2} {:.2} {:.2} re\n", px, py, pw, ph);
                        }
                        let _ = write!(stream, "f\nQ\n");
                    }
                    if let Some(c) = stroke {
                        let _ = write!(
                            stream,
                            "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n",
                            c.r,
                            c.g,
                            c.b,
                            stroke_width * K
                        );
                        if *corner_radius > 0.0 {
                            write_rounded_rect(&mut stream, px, py, pw, ph, corner_radius * K);
                        } else {
                            let _ = write!(stream, "{:.2} {:.2} {:.2} {:.2} re\n", px, py, pw, ph);
                        }
                        let _ = write!(stream, "S\nQ\n");
                    }
                }

                DrawCommand::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    color,
                    width,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        color.r,
                        color.g,
                        color.b,
                        width * K,
                        x1 * K,
                        (PAGE_H - y1) * K,
                        x2 * K,
                        (PAGE_H - y2) * K,
                    );
                }

                DrawCommand::Text {
                    x,
                    y,
                    content,
                    size,
                    weight,
                    italic,
                    color,
                    align,
                } => {
                    let key = (*weight >= 600, *italic);
                    let font_idx = builder.font_indices.get(&key).copied().unwrap_or(0);

                    let measured = fonts.measure_string(content, *weight, *italic, *size);
                    let mut px = x * K;
                    match align {
                        TextAlign::Left => {}
                        TextAlign::Center => px -= measured / 2.0,
                        TextAlign::Right => px -= measured,
                    }
                    let py = (PAGE_H - y) * K;

                    let _ = write!(
                        stream,
                        "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                        color.r,
                        color.g,
                        color.b,
                        font_idx,
                        size,
                        px,
                        py,
                        encode_winansi(content),
                    );
                }

                DrawCommand::Image { x, y, w, h, .. } => {
                    let ordinal = image_ordinal;
                    image_ordinal += 1;
                    let px = x * K;
                    let py = (PAGE_H - y - h) * K;
                    if let Some(&img_idx) = builder.image_index_map.get(&(page_idx, ordinal)) {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            w * K,
                            h * K,
                            px,
                            py,
                            img_idx
                        );
                    } else {
                        // Grey placeholder if the image index went missing.
                        let _ = write!(
                            stream,
                            "q\n0.9 0.9 0.9 rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                            px,
                            py,
                            w * K,
                            h * K
                        );
                    }
                }
            }
        }

        stream
    }

    /// Assemble objects, xref table and trailer into the final byte vector.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = vec![0usize; builder.objects.len()];
        for (id, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[id] = out.len();
            let _ = write!(out, "{} 0 obj\n", id);
            out.extend_from_slice(&obj.data);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n", builder.objects.len());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(out, "{:010} 00000 n \n", offset);
        }

        let info = info_obj_id
            .map(|id| format!(" /Info {} 0 R", id))
            .unwrap_or_default();
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R{} >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info,
            xref_offset
        );

        out
    }
}

/// Escape `(`, `)` and `\` for a PDF literal string.
fn escape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
    out
}

/// Encode a string as a WinAnsi PDF literal, octal-escaping bytes outside
/// printable ASCII. Latin-1 covers the Spanish range; the few WinAnsi
/// specials the templates use are mapped explicitly. Unmappable characters
/// degrade to '?'.
fn encode_winansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let byte = unicode_to_winansi(ch).unwrap_or(b'?');
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

fn unicode_to_winansi(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E => Some(code as u8),
        // Latin-1 supplement maps 1:1 in WinAnsi.
        0xA0..=0xFF => Some(code as u8),
        _ => match ch {
            '\u{2022}' => Some(0x95), // bullet
            '\u{2013}' => Some(0x96), // en dash
            '\u{2014}' => Some(0x97), // em dash
            '\u{2018}' => Some(0x91),
            '\u{2019}' => Some(0x92),
            '\u{201C}' => Some(0x93),
            '\u{201D}' => Some(0x94),
            '\u{20AC}' => Some(0x80), // euro
            _ => None,
        },
    }
}

/// Approximate a rounded rectangle with Bézier corner arcs.
fn write_rounded_rect(stream: &mut String, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    let c = r * 0.5523;
    let _ = write!(stream, "{:.2} {:.2} m\n", x + r, y);
    let _ = write!(stream, "{:.2} {:.2} l\n", x + w - r, y);
    let _ = write!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x + w - r + c, y, x + w, y + r - c, x + w, y + r
    );
    let _ = write!(stream, "{:.2} {:.2} l\n", x + w, y + h - r);
    let _ = write!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x + w, y + h - r + c, x + w - r + c, y + h, x + w - r, y + h
    );
    let _ = write!(stream, "{:.2} {:.2} l\n", x + r, y + h);
    let _ = write!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x + r - c, y + h, x, y + h - r + c, x, y + h - r
    );
    let _ = write!(stream, "{:.2} {:.2} l\n", x, y + r);
    let _ = write!(
        stream,
        "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c\n",
        x, y + r - c, x + r - c, y, x + r, y
    );
    let _ = write!(stream, "h\n");
}
