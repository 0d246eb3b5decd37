//! # Informe CLI
//!
//! Usage:
//!   informe evidence report.json
//!   echo '{ ... }' | informe evidence
//!   informe certificate cert.json --font DejaVuSans.ttf
//!   informe --example > report.json
//!
//! The artifact lands in `--out-dir` (default `.`) under its derived name:
//! report prefix + sanitized subject. Optional flags:
//!   --logo logo.png       brand asset for cover bands / certificate
//!   --upload-dir DIR      mirror the artifact into a directory store

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use informe::evidence;
use informe::model::EvidenceFile;
use informe::signature::SignatureRegistry;
use informe::snapshot::SnapshotConfig;
use informe::store::{ArtifactSink, DirectoryStore, ObjectStore};
use informe::ReportBuilder;

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_snapshot_json());
        return;
    }

    let kind = match args.get(1).map(String::as_str) {
        Some("evidence") => "evidence",
        Some("certificate") => "certificate",
        _ => {
            eprintln!("usage: informe <evidence|certificate> [input.json] [--out-dir dir] [--font f.ttf] [--logo l.png] [--upload-dir dir]");
            std::process::exit(2);
        }
    };

    let input = if args.len() > 2 && !args[2].starts_with('-') {
        fs::read_to_string(&args[2]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).expect("Failed to read stdin");
        buf
    };

    let flag = |name: &str| {
        args.windows(2)
            .find(|w| w[0] == name)
            .map(|w| w[1].clone())
    };
    let out_dir = flag("--out-dir").unwrap_or_else(|| ".".to_string());

    let logo = flag("--logo").and_then(|path| {
        let bytes = fs::read(&path).ok()?;
        let file = EvidenceFile::Bytes {
            name: path.clone(),
            mime: String::new(),
            data: bytes,
        };
        // Logo assets are normalized small and sharp.
        match evidence::normalize(&file, 600, 0.85) {
            Ok(img) => Some(img),
            Err(e) => {
                eprintln!("⚠ Ignoring logo '{}': {}", path, e);
                None
            }
        }
    });

    let builder = ReportBuilder::new().with_logo(logo);

    let result = match kind {
        "evidence" => serde_json::from_str(&input)
            .map_err(informe::ReportError::from)
            .and_then(|data| builder.build_evidence(&data)),
        _ => {
            let font_path = flag("--font").unwrap_or_else(|| {
                eprintln!("✗ The certificate renderer needs --font <file.ttf>");
                std::process::exit(2);
            });
            let font_data = fs::read(&font_path).expect("Failed to read font file");
            let config = SnapshotConfig::new(font_data);
            serde_json::from_str(&input)
                .map_err(informe::ReportError::from)
                .and_then(|data| {
                    builder.build_certificate(&data, &SignatureRegistry::new(), &config)
                })
        }
    };

    match result {
        Ok(report) => {
            let upload_store = flag("--upload-dir").map(DirectoryStore::new);
            let store_ref: Option<&dyn ObjectStore> =
                upload_store.as_ref().map(|s| s as &dyn ObjectStore);
            let sink = ArtifactSink::new(store_ref);

            match sink.deliver(Path::new(&out_dir), kind, &report) {
                Ok(saved) => {
                    if report.skipped_images > 0 {
                        eprintln!("⚠ {} evidence image(s) skipped", report.skipped_images);
                    }
                    eprintln!(
                        "✓ Written {} bytes ({} pages) to {}",
                        report.bytes.len(),
                        report.pages,
                        saved.display()
                    );
                }
                Err(e) => {
                    // Primary save failed; fall back to an alternate
                    // location instead of losing the finished artifact.
                    let fallback = std::env::temp_dir().join(&report.file_name);
                    match fs::write(&fallback, &report.bytes) {
                        Ok(()) => eprintln!(
                            "✗ Could not write to {} ({}); saved to {} instead",
                            out_dir,
                            e,
                            fallback.display()
                        ),
                        Err(e2) => {
                            eprintln!("✗ Failed to write PDF: {} / fallback: {}", e, e2);
                            std::process::exit(1);
                        }
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_snapshot_json() -> &'static str {
    r##"{
  "caseNumber": "MT-IC-0042",
  "date": "2025-06-12",
  "startTime": { "hh": "9", "mm": "30", "meridiem": "AM" },
  "endTime": { "hh": "11", "mm": "15", "meridiem": "AM" },
  "owner": { "firstNames": "Ana María", "lastNames": "Gómez Herrera" },
  "address": {
    "street": "Av. Central 111",
    "neighborhood": "Rústicos Calpulli",
    "municipality": "Aguascalientes",
    "state": "Aguascalientes",
    "postalCode": "20296"
  },
  "businessLine": "Comercialización de bienes inmuebles",
  "rfc": "GOHA890123AB1",
  "inspectionType": "Inicial",
  "channels": [
    { "status": "CUMPLE", "observation": "Teléfono y correo verificados.", "evidence": [] },
    { "status": "CUMPLE", "observation": "Formato físico disponible en sucursal.", "evidence": [] },
    { "status": "NO_APLICA", "observation": "", "evidence": [] }
  ],
  "depositItems": [
    { "status": "CUMPLE", "observation": "Comprobantes en formato digital.", "evidence": [] },
    { "status": "CUMPLE", "observation": "", "evidence": [] },
    { "status": "NO_CUMPLE", "observation": "Sin política de devolución por escrito.", "evidence": [] },
    { "status": "CUMPLE", "observation": "", "evidence": [] },
    { "status": "NO_APLICA", "observation": "Sin modificaciones al proyecto.", "evidence": [] }
  ],
  "portal": {
    "hasPortal": "NO",
    "evaluation": { "status": null, "observation": "", "evidence": [] }
  },
  "portalItems": [],
  "office": {
    "hasOffice": "NO",
    "general": { "status": null, "observation": "", "evidence": [] }
  },
  "officeItems": []
}
"##
}
