//! Integration tests for the report rendering pipeline.
//!
//! These exercise the full path from a validated snapshot to PDF output:
//! - validation gating (failures never reach the layout engine)
//! - section ordering and conditional gates
//! - page breaks with redrawn chrome
//! - evidence intake and per-image failure containment
//! - filename sanitization
//! - signature copy-by-id in the snapshot path

use informe::assemble::{file_name, sanitize_subject_name};
use informe::error::ReportError;
use informe::evidence::{collect_evidence, normalize};
use informe::font::FontContext;
use informe::layout::{DrawCommand, PageComposer, MARGIN, PAGE_H};
use informe::model::*;
use informe::signature::{Point, SignaturePad, SignatureRegistry};
use informe::snapshot;
use informe::ReportBuilder;

// ─── Helpers ────────────────────────────────────────────────────

fn checklist_item(choice: Option<Choice>) -> ChecklistItem {
    ChecklistItem {
        status: choice,
        observation: String::new(),
        evidence: vec![],
    }
}

fn time(hh: &str, mm: &str) -> TimeOfDay {
    TimeOfDay {
        hh: hh.into(),
        mm: mm.into(),
        meridiem: Meridiem::Am,
    }
}

fn base_report() -> EvidenceReport {
    EvidenceReport {
        case_number: "MT-IC-0042".into(),
        date: "2025-06-12".into(),
        start_time: time("9", "30"),
        end_time: time("11", "15"),
        owner: OwnerName {
            first_names: "Ana María".into(),
            last_names: "Gómez Herrera".into(),
        },
        address: Address {
            street: "Av. Central 111".into(),
            neighborhood: "Rústicos Calpulli".into(),
            municipality: "Aguascalientes".into(),
            state: "Aguascalientes".into(),
            postal_code: "20296".into(),
        },
        business_line: "Comercialización de bienes inmuebles".into(),
        rfc: "GOHA890123AB1".into(),
        inspection_type: "Inicial".into(),
        channels: vec![checklist_item(Some(Choice::Complies)); 3],
        deposit_items: vec![checklist_item(Some(Choice::Complies)); 5],
        portal: PortalSection {
            has_portal: Some(Gate::No),
            evaluation: checklist_item(None),
        },
        portal_items: vec![checklist_item(None); 6],
        office: OfficeSection {
            has_office: Some(Gate::No),
            general: checklist_item(None),
        },
        office_items: vec![checklist_item(None); 6],
    }
}

fn png_evidence(name: &str, width: u32, height: u32) -> EvidenceFile {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 128, 255])
    });
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), width, height, image::ColorType::Rgba8)
        .unwrap();
    EvidenceFile::Bytes {
        name: name.into(),
        mime: "image/png".into(),
        data: buf,
    }
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "Missing %%EOF marker");
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

// ─── Scenario 1: all-COMPLIES report, zero images ───────────────

#[test]
fn test_all_complies_report_builds_without_error() {
    let report = base_report();
    let built = ReportBuilder::new().build_evidence(&report).unwrap();
    assert_valid_pdf(&built.bytes);
    assert_eq!(built.skipped_images, 0);
    assert!(built.pages >= 1);
    assert_eq!(built.file_name, "Evidencias Ana Maria Gomez Herrera.pdf");
}

#[test]
fn test_all_complies_marks_first_column_everywhere() {
    let report = base_report();
    let template = informe::template::evidence_template(&report);
    for section in &template.sections {
        if let Section::OptionTable { choice, .. } = section {
            assert_eq!(choice.unwrap().column_index(), 0);
        }
    }
    // Image grids exist but are empty; they must not draw or error.
    let grids = template
        .sections
        .iter()
        .filter(|s| matches!(s, Section::ImageGrid { images } if images.is_empty()))
        .count();
    assert_eq!(grids, 8);
}

// ─── Scenario 2: evidence intake rejection count ────────────────

#[test]
fn test_intake_two_valid_one_rejected() {
    let files = vec![
        png_evidence("fachada.png", 16, 16),
        png_evidence("recibo.png", 16, 16),
        EvidenceFile::Bytes {
            name: "acta.docx".into(),
            mime: "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
            data: vec![1, 2, 3],
        },
    ];
    let intake = collect_evidence(files);
    assert_eq!(intake.accepted.len(), 2);
    assert_eq!(intake.rejected, 1);
}

// ─── Scenario 3: overflow triggers exactly one break + chrome ───

#[test]
fn test_cumulative_content_breaks_exactly_once_at_overflow() {
    let fonts = FontContext::new();
    let mut composer = PageComposer::new(&fonts, None);

    let mut breaks = 0usize;
    let mut last_page = composer.cursor().page_index;
    for i in 0..60 {
        if i % 2 == 0 {
            composer.draw_key_value("Observación:", "Texto de observación de prueba");
        } else {
            composer.draw_option_table("Requisito corto de prueba", Some(Choice::Complies));
        }
        let page = composer.cursor().page_index;
        if page != last_page {
            breaks += page - last_page;
            last_page = page;
            if breaks == 1 {
                // The fresh page starts below the redrawn mini-header chrome.
                assert!(composer.cursor().y >= 23.0 - 1e-9);
            }
        }
        if breaks >= 1 && page == 1 {
            break;
        }
    }
    assert_eq!(breaks, 1, "first overflow must trigger exactly one break");

    let pages = composer.finish();
    assert_eq!(pages.len(), 2);
    // Page 2 opens with the mini header band at the very top.
    let band = pages[1].commands.iter().any(|cmd| {
        matches!(cmd, DrawCommand::Rect { y, h, fill: Some(_), .. } if *y == 0.0 && *h == 10.0)
    });
    assert!(band, "page 2 must begin with the mini header band");
}

#[test]
fn test_cursor_bounds_across_arbitrary_sequences() {
    let fonts = FontContext::new();
    let mut composer = PageComposer::new(&fonts, None);
    for step in [3.0, 7.5, 40.0, 120.0, 260.0, 5.0, 268.5, 90.0, 14.0] {
        composer.ensure_space(step);
        let y = composer.cursor().y;
        assert!(
            (MARGIN..=PAGE_H - MARGIN).contains(&y),
            "cursor escaped the content area: {y}"
        );
    }
}

// ─── Scenario 4: negative gate ──────────────────────────────────

#[test]
fn test_negative_gate_renders_gate_row_only_and_validates() {
    let report = base_report();
    // Gates are NO and every gated sub-item is unset; no validation error.
    assert!(report.validate().is_ok());

    let template = informe::template::evidence_template(&report);
    let has_portal_requirement = template.sections.iter().any(|s| {
        matches!(s, Section::OptionTable { description, .. }
            if description.contains("portal de Internet"))
    });
    assert!(!has_portal_requirement, "gated sub-block must be absent");
    assert!(template.sections.iter().any(|s| matches!(
        s,
        Section::KeyValue { label, value } if label == "¿Tiene portal?" && value == "NO"
    )));
}

#[test]
fn test_affirmative_gate_requires_sub_items() {
    let mut report = base_report();
    report.portal.has_portal = Some(Gate::Si);
    let err = report.validate().unwrap_err();
    assert!(err.fields.iter().any(|f| f == "portal.evaluation.status"));
    assert!(err.fields.iter().any(|f| f.starts_with("portalItems.")));
}

// ─── Validation gating ──────────────────────────────────────────

#[test]
fn test_validation_failure_prevents_build() {
    let mut report = base_report();
    report.channels[1].status = None;
    report.rfc = "not-an-rfc".into();
    match ReportBuilder::new().build_evidence(&report) {
        Err(ReportError::Validation(e)) => {
            assert!(e.fields.iter().any(|f| f == "channels.1.status"));
            assert!(e.fields.iter().any(|f| f == "rfc"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ─── Per-image failure containment ──────────────────────────────

#[test]
fn test_bad_evidence_image_is_skipped_not_fatal() {
    let mut report = base_report();
    report.channels[0].evidence = vec![
        png_evidence("buena.png", 24, 24),
        EvidenceFile::Stub {
            name: "restaurada.jpg".into(),
            size: 12345,
            mime: "image/jpeg".into(),
        },
        EvidenceFile::Bytes {
            name: "corrupta.png".into(),
            mime: "image/png".into(),
            data: vec![0xDE, 0xAD, 0xBE, 0xEF],
        },
    ];
    let built = ReportBuilder::new().build_evidence(&report).unwrap();
    assert_valid_pdf(&built.bytes);
    assert_eq!(built.skipped_images, 2);
}

#[test]
fn test_normalization_bounds_and_ratio() {
    let file = png_evidence("panoramica.png", 1600, 400);
    let out = normalize(&file, 1400, 0.65).unwrap();
    assert_eq!(out.width, 1400);
    assert_eq!(out.height, 350);
    let small = normalize(&png_evidence("icono.png", 64, 64), 1400, 0.65).unwrap();
    assert_eq!((small.width, small.height), (64, 64));
}

// ─── Filename sanitization ──────────────────────────────────────

#[test]
fn test_sanitize_is_idempotent_and_strips() {
    let raw = r#"  Gómez/Née:  "Construcciones*del?Sur"  "#;
    let once = sanitize_subject_name(raw);
    assert_eq!(sanitize_subject_name(&once), once);
    for bad in ['\\', '/', ':', '*', '?', '"', '<', '>', '|'] {
        assert!(!once.contains(bad));
    }
    assert!(!once.contains("  "), "whitespace runs must collapse: {once:?}");
}

#[test]
fn test_file_name_uses_case_number_when_owner_empty() {
    let mut report = base_report();
    report.owner.first_names = String::new();
    report.owner.last_names = String::new();
    // Owner is required, so bypass the build and test derivation directly.
    assert_eq!(
        file_name(ReportKind::Evidence, &report.case_number),
        "Evidencias MT-IC-0042.pdf"
    );
}

// ─── Summary dictamen with signatures ───────────────────────────

fn drawn_pad(id: &str) -> SignaturePad {
    let mut pad = SignaturePad::new(id, 360, 140, 1.0);
    pad.begin(Point::new(20.0, 100.0));
    pad.extend(Point::new(180.0, 40.0));
    pad.extend(Point::new(320.0, 110.0));
    pad.end();
    pad
}

fn summary() -> (InspectionSummary, SignatureRegistry) {
    let slot_ids = ["firma-inspector", "firma-cliente", "firma-auxiliar", "firma-supervisor"];
    let mut registry = SignatureRegistry::new();
    for id in slot_ids {
        registry.register(drawn_pad(id));
    }
    let summary = InspectionSummary {
        date: "2025-06-12".into(),
        case_number: "MT-IC-0042".into(),
        start_time: time("9", "00"),
        end_time: time("1", "45"),
        owner_name: "Ana María Gómez".into(),
        street: "Av. Central 111".into(),
        postal_code: "20296".into(),
        neighborhood: "Rústicos Calpulli".into(),
        municipality: "Aguascalientes".into(),
        rfc: "GOHA890123AB1".into(),
        business_line: "Inmobiliaria".into(),
        utm_coordinates: "13Q 778123 2417890".into(),
        inspector: "J. Pérez".into(),
        row_choices: vec![Some(Choice::Complies); 25],
        conclusion: Some(Conclusion::Satisfactory),
        observations: "Sin observaciones adicionales.".into(),
        signatures: slot_ids
            .iter()
            .map(|id| SignatureField {
                slot_id: (*id).into(),
                name: "Nombre Apellido".into(),
            })
            .collect(),
    };
    (summary, registry)
}

#[test]
fn test_summary_dictamen_builds_multipage_pdf() {
    let (data, registry) = summary();
    let built = ReportBuilder::new().build_inspection(&data, &registry).unwrap();
    assert_valid_pdf(&built.bytes);
    // 25 requirement tables plus disclaimers and signatures never fit one page.
    assert!(built.pages >= 2, "expected a multi-page dictamen, got {}", built.pages);
    assert_eq!(built.file_name, "FCumplimiento Ana Maria Gomez.pdf");
}

#[test]
fn test_summary_requires_drawn_signatures() {
    let (mut data, mut registry) = summary();
    registry.get_mut("firma-cliente").unwrap().clear();
    data.row_choices[7] = None;
    match ReportBuilder::new().build_inspection(&data, &registry) {
        Err(ReportError::Validation(e)) => {
            assert!(e.fields.iter().any(|f| f == "signatures.1.drawing"));
            assert!(e.fields.iter().any(|f| f == "rowChoices.7"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ─── Snapshot path: copy-by-id + segmentation ───────────────────

#[test]
fn test_certificate_signature_copy_by_id_over_position() {
    use informe::snapshot::VisualNode;

    // Two pads with visibly different strokes.
    let mut pad_a = SignaturePad::new("A", 360, 140, 1.0);
    pad_a.begin(Point::new(10.0, 10.0));
    pad_a.extend(Point::new(350.0, 10.0));
    pad_a.end();
    let mut pad_b = SignaturePad::new("B", 360, 140, 1.0);
    pad_b.begin(Point::new(10.0, 130.0));
    pad_b.extend(Point::new(350.0, 130.0));
    pad_b.end();

    let mut registry = SignatureRegistry::new();
    registry.register(pad_a);
    registry.register(pad_b);

    let mut clone = VisualNode::Block {
        style: informe::snapshot::BlockStyle::default(),
        children: vec![VisualNode::Canvas {
            signature_id: Some("B".into()),
            width: 360.0,
            height: 140.0,
            bitmap: None,
        }],
    };
    snapshot::copy_signature_bitmaps(&mut clone, &registry);

    let expected = registry.get("B").unwrap().snapshot().unwrap();
    let not_expected = registry.get("A").unwrap().snapshot().unwrap();
    match clone {
        VisualNode::Block { children, .. } => match &children[0] {
            VisualNode::Canvas { bitmap: Some(b), .. } => {
                assert_eq!(b.data(), expected.data());
                assert_ne!(b.data(), not_expected.data());
            }
            other => panic!("expected populated canvas, got {other:?}"),
        },
        _ => unreachable!(),
    }
}

#[test]
fn test_certificate_tree_projection_has_no_interactive_chrome() {
    use informe::snapshot::VisualNode;

    let data = CertificateData {
        provider_name: "Inmobiliaria Sol".into(),
        provider_address: "Av. Norte 5, Aguascalientes".into(),
        folio: "F-77".into(),
        issue_date: "2025-06-12".into(),
        issue_place: "Aguascalientes, Ags.".into(),
        inspector: "J. Pérez".into(),
    };
    let tree = informe::template::certificate_tree(&data, None);
    let projected = snapshot::project(&tree).unwrap();

    fn assert_display_only(node: &VisualNode) {
        match node {
            VisualNode::Field { .. } => panic!("field survived projection"),
            VisualNode::Button { .. } => panic!("button survived projection"),
            VisualNode::Block { children, .. } => children.iter().for_each(assert_display_only),
            _ => {}
        }
    }
    assert_display_only(&projected);

    let pages = snapshot::split_pages(&projected);
    assert_eq!(pages.len(), 2, "the certificate is a two-page template");
    assert!(pages.iter().all(snapshot::page_has_text));
}

// ─── JSON entry point ───────────────────────────────────────────

#[test]
fn test_render_evidence_from_draft_json() {
    let json = r##"{
      "caseNumber": "MT-IC-0007",
      "date": "2025-07-01",
      "startTime": { "hh": "10", "mm": "00", "meridiem": "AM" },
      "endTime": { "hh": "12", "mm": "30", "meridiem": "PM" },
      "owner": { "firstNames": "José", "lastNames": "Núñez" },
      "address": {
        "street": "Calle 5 de Mayo 10",
        "neighborhood": "Centro",
        "municipality": "Aguascalientes",
        "state": "Aguascalientes",
        "postalCode": "20000"
      },
      "businessLine": "Inmobiliaria",
      "rfc": "NUJX850101XX1",
      "inspectionType": "Seguimiento",
      "channels": [
        { "status": "CUMPLE", "observation": "", "evidence": [] },
        { "status": "NO_CUMPLE", "observation": "Sin formato físico.", "evidence": [] },
        { "status": "CUMPLE", "observation": "", "evidence": [
          { "name": "foto.jpg", "size": 52133, "mime": "image/jpeg" }
        ] }
      ],
      "depositItems": [
        { "status": "CUMPLE", "observation": "", "evidence": [] },
        { "status": "CUMPLE", "observation": "", "evidence": [] },
        { "status": "CUMPLE", "observation": "", "evidence": [] },
        { "status": "CUMPLE", "observation": "", "evidence": [] },
        { "status": "CUMPLE", "observation": "", "evidence": [] }
      ],
      "portal": { "hasPortal": "NO", "evaluation": { "status": null, "observation": "", "evidence": [] } },
      "portalItems": [],
      "office": { "hasOffice": "NO", "general": { "status": null, "observation": "", "evidence": [] } },
      "officeItems": []
    }"##;

    let built = informe::render_evidence_json(json).unwrap();
    assert_valid_pdf(&built.bytes);
    // The restored draft stub is rejected by the normalizer and skipped.
    assert_eq!(built.skipped_images, 1);
    assert_eq!(built.file_name, "Evidencias Jose Nunez.pdf");
}

#[test]
fn test_malformed_json_is_parse_error() {
    match informe::render_evidence_json("{ not json") {
        Err(ReportError::Parse(_)) => {}
        other => panic!("expected parse error, got {other:?}"),
    }
}
