//! # Evidence Normalization
//!
//! Turns arbitrary uploaded images into bounded-dimension JPEGs ready for
//! embedding. Decoding sniffs the format from magic bytes first and falls
//! back to an extension-driven decode before surfacing `DecodeError`.
//! Restored-draft placeholder records (`{name, size, mime}` with no binary
//! content) are rejected up front with `InvalidInput`; they must never
//! reach the decoder.
//!
//! Normalization is idempotent for identical input + config and runs per
//! render; outputs are not cached by content hash.

use image::imageops::FilterType;
use image::ImageFormat;

use crate::error::ImageError;
use crate::model::EvidenceFile;

/// Default bound on normalized width, in pixels.
pub const DEFAULT_MAX_WIDTH: u32 = 1400;
/// Default JPEG quality, in [0.5, 0.85].
pub const DEFAULT_QUALITY: f32 = 0.65;

/// A normalized, embed-ready JPEG.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    /// Raw JPEG bytes (DCTDecode-embeddable as-is).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Normalize one evidence file: decode, downscale to `max_width` keeping
/// the aspect ratio (never upscale), re-encode as JPEG at `quality`.
pub fn normalize(
    file: &EvidenceFile,
    max_width: u32,
    quality: f32,
) -> Result<NormalizedImage, ImageError> {
    let (name, data) = match file {
        EvidenceFile::Bytes { name, data, .. } => (name.as_str(), data.as_slice()),
        EvidenceFile::Stub { name, .. } => {
            return Err(ImageError::InvalidInput(format!(
                "'{name}' is a restored draft stub with no binary content"
            )));
        }
    };

    let decoded = decode_with_fallback(name, data)?;
    normalize_decoded(decoded, max_width, quality)
}

/// Normalize an already-decoded bitmap (signature snapshots take this path).
pub fn normalize_decoded(
    img: image::DynamicImage,
    max_width: u32,
    quality: f32,
) -> Result<NormalizedImage, ImageError> {
    let (w, h) = (img.width(), img.height());
    let img = if w > max_width {
        let scaled_h = ((h as f64) * (max_width as f64) / (w as f64)).round().max(1.0) as u32;
        img.resize_exact(max_width, scaled_h, FilterType::Triangle)
    } else {
        img
    };

    let rgb = img.to_rgb8();
    let (out_w, out_h) = (rgb.width(), rgb.height());

    let q = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, q);
    image::ImageEncoder::write_image(encoder, rgb.as_raw(), out_w, out_h, image::ColorType::Rgb8)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    Ok(NormalizedImage {
        data: buf,
        width: out_w,
        height: out_h,
    })
}

/// Primary decode sniffs magic bytes; the secondary attempt trusts the file
/// extension instead (the native analogue of the element-based load the
/// browser falls back to).
fn decode_with_fallback(name: &str, data: &[u8]) -> Result<image::DynamicImage, ImageError> {
    if data.is_empty() {
        return Err(ImageError::InvalidInput(format!("'{name}' is empty")));
    }

    let primary = image::load_from_memory(data);
    match primary {
        Ok(img) => Ok(img),
        Err(primary_err) => {
            if let Some(format) = format_from_extension(name) {
                if let Ok(img) = image::load_from_memory_with_format(data, format) {
                    return Ok(img);
                }
            }
            Err(ImageError::Decode(format!("'{name}': {primary_err}")))
        }
    }
}

fn format_from_extension(name: &str) -> Option<ImageFormat> {
    let ext = name.rsplit('.').next()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "gif" => Some(ImageFormat::Gif),
        "webp" => Some(ImageFormat::WebP),
        "bmp" => Some(ImageFormat::Bmp),
        _ => None,
    }
}

// ── Evidence intake ─────────────────────────────────────────────────

const IMAGE_EXTENSIONS: [&str; 7] = [".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp", ".svg"];

/// Accepted files plus the count of rejected ones. Rejections are counted
/// and reported, never silently dropped.
#[derive(Debug, Default)]
pub struct Intake {
    pub accepted: Vec<EvidenceFile>,
    pub rejected: usize,
}

/// Is this upload an image, by mime prefix or extension allow-list?
pub fn is_image_file(file: &EvidenceFile) -> bool {
    if file.mime().starts_with("image/") {
        return true;
    }
    let name = file.name().to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Filter an upload batch down to images.
pub fn collect_evidence(files: Vec<EvidenceFile>) -> Intake {
    let mut intake = Intake::default();
    for file in files {
        if is_image_file(&file) {
            intake.accepted.push(file);
        } else {
            intake.rejected += 1;
        }
    }
    intake
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, _| {
            image::Rgba([(x % 256) as u8, 40, 90, 255])
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            width,
            height,
            image::ColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    fn evidence(name: &str, mime: &str, data: Vec<u8>) -> EvidenceFile {
        EvidenceFile::Bytes {
            name: name.into(),
            mime: mime.into(),
            data,
        }
    }

    #[test]
    fn test_stub_rejected_before_decode() {
        let stub = EvidenceFile::Stub {
            name: "foto.jpg".into(),
            size: 52133,
            mime: "image/jpeg".into(),
        };
        match normalize(&stub, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY) {
            Err(ImageError::InvalidInput(_)) => {}
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_bytes_are_decode_error() {
        let bad = evidence("nota.png", "image/png", vec![0, 1, 2, 3, 4, 5]);
        match normalize(&bad, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY) {
            Err(ImageError::Decode(_)) => {}
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[test]
    fn test_downscale_preserves_aspect_ratio() {
        let file = evidence("ancha.png", "image/png", png_bytes(800, 200));
        let out = normalize(&file, 400, 0.65).unwrap();
        assert_eq!(out.width, 400);
        assert_eq!(out.height, 100);
        assert!(out.data.starts_with(&[0xFF, 0xD8]), "output must be JPEG");
    }

    #[test]
    fn test_never_upscales() {
        let file = evidence("chica.png", "image/png", png_bytes(120, 80));
        let out = normalize(&file, 1400, 0.65).unwrap();
        assert_eq!((out.width, out.height), (120, 80));
    }

    #[test]
    fn test_normalize_is_idempotent_given_same_input() {
        let file = evidence("foto.png", "image/png", png_bytes(640, 480));
        let a = normalize(&file, 600, 0.65).unwrap();
        let b = normalize(&file, 600, 0.65).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_intake_counts_rejections() {
        let files = vec![
            evidence("a.png", "image/png", png_bytes(4, 4)),
            evidence("b.jpg", "", vec![1]),
            evidence("notas.txt", "text/plain", vec![1, 2]),
        ];
        let intake = collect_evidence(files);
        assert_eq!(intake.accepted.len(), 2);
        assert_eq!(intake.rejected, 1);
    }

    #[test]
    fn test_intake_accepts_stub_by_extension() {
        let stub = EvidenceFile::Stub {
            name: "FOTO.JPEG".into(),
            size: 10,
            mime: String::new(),
        };
        assert!(is_image_file(&stub));
    }
}
