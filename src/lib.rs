//! # Informe
//!
//! A page-native renderer for compliance-inspection reports.
//!
//! A validated form snapshot goes in; a paginated A4 PDF comes out. Layout
//! decisions are made with the page boundary as a hard constraint; blocks
//! are measured before they are drawn, page breaks happen *before* an
//! overflowing block, and per-page chrome is re-established after every
//! break. Content flows into pages; nothing is sliced after the fact.
//!
//! ## Architecture
//!
//! ```text
//! Snapshot (JSON/API)
//!       ↓
//!   [model]     - typed snapshot + validation
//!       ↓
//!   [template]  - fixed report templates → ordered sections
//!       ↓
//!   [assemble]  - orchestration, filename, build guard
//!      ↓   ↓
//! [layout]  [snapshot]  - block composer | visual-tree raster path
//!       ↓
//!   [pdf]       - serialize to PDF bytes
//! ```
//!
//! Photographic evidence passes through [`evidence`] (bounded downscale +
//! JPEG re-encode), signatures through [`signature`] (pointer strokes into
//! a raster pad), and the finished artifact through [`store`] (local save,
//! optional soft-failing upload).

pub mod assemble;
pub mod error;
pub mod evidence;
pub mod font;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod signature;
pub mod snapshot;
pub mod store;
pub mod template;
pub mod text;

pub use assemble::{BuiltReport, ReportBuilder};
pub use error::ReportError;

use model::{CertificateData, EvidenceReport};
use signature::SignatureRegistry;
use snapshot::SnapshotConfig;

/// Render a checklist + evidence report described as JSON.
///
/// This is the primary entry point for snapshot-driven callers. The JSON
/// shape is the persisted draft format (camelCase fields; evidence entries
/// are either base64 bytes or restored metadata stubs).
pub fn render_evidence_json(json: &str) -> Result<BuiltReport, ReportError> {
    let data: EvidenceReport = serde_json::from_str(json)?;
    ReportBuilder::new().build_evidence(&data)
}

/// Render the certificate described as JSON through the snapshot path.
/// Signature pads are interactive state; callers with live pads should use
/// [`ReportBuilder::build_certificate`] directly; this entry renders the
/// certificate with its signature spaces blank.
pub fn render_certificate_json(
    json: &str,
    config: &SnapshotConfig,
) -> Result<BuiltReport, ReportError> {
    let data: CertificateData = serde_json::from_str(json)?;
    ReportBuilder::new().build_certificate(&data, &SignatureRegistry::new(), config)
}
