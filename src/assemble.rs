//! # Document Assembler
//!
//! Orchestrates one report build: validate the snapshot, instantiate the
//! template, feed its sections through the page composer (or the snapshot
//! path for the certificate), and serialize the result to PDF bytes.
//!
//! Failure policy: validation failures surface before any rendering; one
//! bad evidence image is skipped with a warning and the document still
//! builds; a whole-build failure produces no partial artifact. Builds are
//! serialized by a build-in-progress guard; the off-screen rendering
//! state must never be shared across concurrent builds.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::error::{RenderError, ReportError};
use crate::evidence::NormalizedImage;
use crate::font::FontContext;
use crate::layout::{DrawCommand, EmbeddedImage, LayoutPage, PageComposer, PAGE_H, PAGE_W};
use crate::model::{
    CertificateData, EvidenceReport, InspectionSummary, ReportKind, ReportTemplate, Section,
};
use crate::pdf::{Metadata, PdfWriter};
use crate::signature::SignatureRegistry;
use crate::snapshot::{self, SnapshotConfig};
use crate::template;

/// A finished artifact plus its delivery metadata.
#[derive(Debug, Clone)]
pub struct BuiltReport {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub pages: usize,
    /// Evidence images dropped because normalization failed.
    pub skipped_images: usize,
}

/// Builds reports. One builder owns the fonts, the optional logo asset and
/// the guard that keeps builds sequential.
pub struct ReportBuilder {
    fonts: FontContext,
    logo: Option<NormalizedImage>,
    building: AtomicBool,
}

/// Releases the build guard even when a build fails mid-way.
struct BuildPermit<'a>(&'a AtomicBool);

impl Drop for BuildPermit<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            fonts: FontContext::new(),
            logo: None,
            building: AtomicBool::new(false),
        }
    }

    /// Use `logo` in cover bands and page chrome. Absent logo means the
    /// bands render without it, never an error.
    pub fn with_logo(mut self, logo: Option<NormalizedImage>) -> Self {
        self.logo = logo;
        self
    }

    fn acquire(&self) -> Result<BuildPermit<'_>, ReportError> {
        if self
            .building
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(RenderError::BuildInProgress.into());
        }
        Ok(BuildPermit(&self.building))
    }

    /// Build the checklist + evidence report.
    pub fn build_evidence(&self, data: &EvidenceReport) -> Result<BuiltReport, ReportError> {
        data.validate()?;
        let _permit = self.acquire()?;

        let template = template::evidence_template(data);
        let registry = SignatureRegistry::new();
        let (pages, skipped) = self.compose(&template, &registry);

        let subject = {
            let owner = data.owner.full();
            if owner.is_empty() { data.case_number.clone() } else { owner }
        };
        Ok(self.serialize(ReportKind::Evidence, &template, pages, skipped, &subject))
    }

    /// Build the 25-row summary dictamen.
    pub fn build_inspection(
        &self,
        data: &InspectionSummary,
        signatures: &SignatureRegistry,
    ) -> Result<BuiltReport, ReportError> {
        data.validate(signatures)?;
        let _permit = self.acquire()?;

        let template = template::inspection_template(data);
        let (pages, skipped) = self.compose(&template, signatures);
        Ok(self.serialize(ReportKind::Inspection, &template, pages, skipped, &data.owner_name))
    }

    /// Build the certificate through the visual-tree snapshot path.
    pub fn build_certificate(
        &self,
        data: &CertificateData,
        signatures: &SignatureRegistry,
        config: &SnapshotConfig,
    ) -> Result<BuiltReport, ReportError> {
        data.validate()?;
        let _permit = self.acquire()?;

        let tree = template::certificate_tree(data, self.logo.as_ref());
        let page_bitmaps = snapshot::render_pages(&tree, signatures, config)?;

        // Each page bitmap fills its page edge to edge.
        let pages: Vec<LayoutPage> = page_bitmaps
            .into_iter()
            .map(|jpeg| LayoutPage {
                commands: vec![DrawCommand::Image {
                    x: 0.0,
                    y: 0.0,
                    w: PAGE_W,
                    h: PAGE_H,
                    image: EmbeddedImage::Jpeg(jpeg),
                }],
            })
            .collect();

        let metadata = Metadata {
            title: Some("Dictamen de Cumplimiento".into()),
            author: Some(template::COMPANY_NAME.into()),
            subject: Some(data.provider_name.clone()),
        };
        let bytes = PdfWriter::new().write(&pages, &metadata, &self.fonts);
        Ok(BuiltReport {
            file_name: file_name(ReportKind::Certificate, &data.provider_name),
            pages: pages.len(),
            bytes,
            skipped_images: 0,
        })
    }

    /// Walk the template's sections through a fresh composer. Returns the
    /// composed pages and the count of evidence images skipped.
    fn compose(
        &self,
        template: &ReportTemplate,
        signatures: &SignatureRegistry,
    ) -> (Vec<LayoutPage>, usize) {
        let mut composer = PageComposer::new(&self.fonts, self.logo.clone());
        let mut skipped = 0usize;

        for section in &template.sections {
            match section {
                Section::Cover { title } => composer.draw_cover(title),
                Section::Header { title } => composer.draw_header(title),
                Section::Label { text } => composer.draw_label(text),
                Section::KeyValue { label, value } => composer.draw_key_value(label, value),
                Section::OptionTable { description, choice } => {
                    composer.draw_option_table(description, *choice)
                }
                Section::ConclusionTable { description, conclusion } => {
                    composer.draw_conclusion_table(description, *conclusion)
                }
                Section::ImageGrid { images } => {
                    let dropped = composer.draw_image_grid(images);
                    if dropped > 0 {
                        warn!(dropped, "evidence images skipped during composition");
                        skipped += dropped;
                    }
                }
                Section::SignatureRow { slots } => {
                    composer.draw_signature_row(slots, signatures)
                }
                Section::FreeText { label, text } => composer.draw_free_text(label, text),
                Section::Note { text } => composer.draw_note(text),
            }
        }

        (composer.finish(), skipped)
    }

    fn serialize(
        &self,
        kind: ReportKind,
        template: &ReportTemplate,
        pages: Vec<LayoutPage>,
        skipped_images: usize,
        subject: &str,
    ) -> BuiltReport {
        let metadata = Metadata {
            title: Some(template.title.clone()),
            author: Some(template::COMPANY_NAME.into()),
            subject: Some(subject.to_string()),
        };
        let bytes = PdfWriter::new().write(&pages, &metadata, &self.fonts);
        BuiltReport {
            file_name: file_name(kind, subject),
            pages: pages.len(),
            bytes,
            skipped_images,
        }
    }
}

// ── Filename derivation ─────────────────────────────────────────────

const MAX_SUBJECT_LEN: usize = 80;

/// Sanitize a subject name for use in a filename: strip accents, remove
/// path-illegal characters, collapse whitespace runs, bound the length.
/// Idempotent: `sanitize(sanitize(s)) == sanitize(s)`.
pub fn sanitize_subject_name(raw: &str) -> String {
    let folded: String = raw.chars().map(strip_accent).collect();
    let cleaned: String = folded
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_SUBJECT_LEN).collect::<String>().trim().to_string()
}

fn strip_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        other => other,
    }
}

/// Report-type prefix + sanitized subject. An empty subject falls back to
/// the bare prefix.
pub fn file_name(kind: ReportKind, subject: &str) -> String {
    let sanitized = sanitize_subject_name(subject);
    if sanitized.is_empty() {
        format!("{}.pdf", kind.file_prefix())
    } else {
        format!("{} {}.pdf", kind.file_prefix(), sanitized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_illegal_characters() {
        let s = sanitize_subject_name(r#"In\mo/bi:lia*ria? "Sol" <Norte>|"#);
        for bad in ['\\', '/', ':', '*', '?', '"', '<', '>', '|'] {
            assert!(!s.contains(bad), "{bad} survived: {s}");
        }
        assert_eq!(s, "Inmobiliaria Sol Norte");
    }

    #[test]
    fn test_sanitize_strips_accents_and_collapses_whitespace() {
        assert_eq!(sanitize_subject_name("  José   Núñez \t Pérez "), "Jose Nunez Perez");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in [
            "Ana Gómez",
            r#"a\b/c:d"#,
            "  espacios   múltiples  ",
            "ñandú ÑANDÚ",
            &"x".repeat(200),
        ] {
            let once = sanitize_subject_name(raw);
            assert_eq!(sanitize_subject_name(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_sanitize_bounds_length() {
        let long = "a".repeat(300);
        assert!(sanitize_subject_name(&long).chars().count() <= MAX_SUBJECT_LEN);
    }

    #[test]
    fn test_file_name_prefixes() {
        assert_eq!(file_name(ReportKind::Evidence, "Ana Gómez"), "Evidencias Ana Gomez.pdf");
        assert_eq!(file_name(ReportKind::Certificate, ""), "Cumplimiento.pdf");
    }
}
