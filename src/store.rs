//! # Artifact Hand-off
//!
//! The finished PDF is always delivered locally; upload to an external
//! object store is optional and soft-failing. The backend dependency is an
//! explicit `Option<&dyn ObjectStore>` injected by the caller; the
//! rendering pipeline itself never depends on backend availability.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::assemble::BuiltReport;
use crate::error::UploadError;

/// Accepts a binary blob under a generated path and keeps it durably.
pub trait ObjectStore {
    fn put(&self, object_path: &str, bytes: &[u8]) -> Result<(), UploadError>;
}

/// Filesystem-backed store used by the CLI (`--upload-dir`).
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ObjectStore for DirectoryStore {
    fn put(&self, object_path: &str, bytes: &[u8]) -> Result<(), UploadError> {
        let target = self.root.join(object_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| UploadError(e.to_string()))?;
        }
        fs::write(&target, bytes).map_err(|e| UploadError(e.to_string()))
    }
}

/// Storage path for an uploaded artifact: section prefix, the sanitized
/// file stem, and a timestamp suffix.
pub fn object_path(section: &str, file_name: &str, timestamp_secs: u64) -> String {
    let stem = file_name.strip_suffix(".pdf").unwrap_or(file_name);
    format!("{section}/{stem}-{timestamp_secs}.pdf")
}

/// Delivers built reports: local save always, then the optional upload.
pub struct ArtifactSink<'a> {
    store: Option<&'a dyn ObjectStore>,
}

impl<'a> ArtifactSink<'a> {
    pub fn new(store: Option<&'a dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Write the artifact into `dir` and, when a store is configured,
    /// upload it under `section`. An upload failure is logged as a warning
    /// and never blocks the local save that already succeeded.
    pub fn deliver(
        &self,
        dir: &Path,
        section: &str,
        report: &BuiltReport,
    ) -> io::Result<PathBuf> {
        let local = dir.join(&report.file_name);
        fs::write(&local, &report.bytes)?;
        info!(path = %local.display(), pages = report.pages, "report saved");

        if let Some(store) = self.store {
            let ts = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            let remote = object_path(section, &report.file_name, ts);
            if let Err(err) = store.put(&remote, &report.bytes) {
                warn!(%err, object = %remote, "upload failed; local artifact kept");
            }
        }

        Ok(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;
    impl ObjectStore for FailingStore {
        fn put(&self, _: &str, _: &[u8]) -> Result<(), UploadError> {
            Err(UploadError("object store unreachable".into()))
        }
    }

    fn report() -> BuiltReport {
        BuiltReport {
            file_name: "Evidencias Ana Gómez.pdf".into(),
            bytes: b"%PDF-1.7 test".to_vec(),
            pages: 1,
            skipped_images: 0,
        }
    }

    #[test]
    fn test_object_path_shape() {
        let path = object_path("evidencias", "Evidencias Ana Gómez.pdf", 1750000000);
        assert_eq!(path, "evidencias/Evidencias Ana Gómez-1750000000.pdf");
    }

    #[test]
    fn test_upload_failure_keeps_local_save() {
        let dir = std::env::temp_dir().join("informe-sink-test");
        fs::create_dir_all(&dir).unwrap();
        let sink = ArtifactSink::new(Some(&FailingStore));
        let saved = sink.deliver(&dir, "evidencias", &report()).unwrap();
        assert!(saved.exists(), "local save must survive the upload failure");
        fs::remove_file(saved).ok();
    }

    #[test]
    fn test_directory_store_roundtrip() {
        let root = std::env::temp_dir().join("informe-store-test");
        let store = DirectoryStore::new(&root);
        store.put("evidencias/demo-1.pdf", b"bytes").unwrap();
        assert_eq!(fs::read(root.join("evidencias/demo-1.pdf")).unwrap(), b"bytes");
        fs::remove_dir_all(&root).ok();
    }
}
