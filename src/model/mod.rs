//! # Snapshot Model
//!
//! The input representation for the renderer: the validated form snapshot a
//! Form Session hands over, plus the render-ready `Section` list a template
//! instantiates from it. Designed to deserialize directly from persisted
//! draft JSON, including drafts whose file fields were replaced by
//! `{name, size, mime}` metadata stubs on restore.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::signature::SignatureRegistry;

/// The three report kinds the renderer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportKind {
    /// Checklist + evidence report (block layout path).
    Evidence,
    /// 25-row summary dictamen with conclusion and four signatures.
    Inspection,
    /// Certificate with rotated sidebar (visual-tree snapshot path).
    Certificate,
}

/// One of exactly three checklist states. `None` (unset) is a validation
/// failure for required sections, never a render failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    #[serde(rename = "CUMPLE")]
    Complies,
    #[serde(rename = "NO_CUMPLE")]
    NotComplies,
    #[serde(rename = "NO_APLICA")]
    NotApplicable,
}

impl Choice {
    /// Column index inside an option table (0 = CUMPLE).
    pub fn column_index(&self) -> usize {
        match self {
            Choice::Complies => 0,
            Choice::NotComplies => 1,
            Choice::NotApplicable => 2,
        }
    }
}

/// Yes/no gate for conditional sections. `Si` is the affirmative sentinel
/// that opens the nested sub-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gate {
    #[serde(rename = "SI")]
    Si,
    #[serde(rename = "NO")]
    No,
}

impl Gate {
    pub fn label(&self) -> &'static str {
        match self {
            Gate::Si => "SI",
            Gate::No => "NO",
        }
    }
}

/// Twelve-hour wall-clock time as captured by the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOfDay {
    pub hh: String,
    pub mm: String,
    pub meridiem: Meridiem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl TimeOfDay {
    pub fn display(&self) -> String {
        let m = match self.meridiem {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        };
        format!("{}:{} {}", self.hh, self.mm, m)
    }

    fn is_valid(&self) -> bool {
        let hh: Option<u32> = self.hh.parse().ok();
        let mm: Option<u32> = self.mm.parse().ok();
        matches!(hh, Some(1..=12)) && matches!(mm, Some(0..=59))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerName {
    pub first_names: String,
    pub last_names: String,
}

impl OwnerName {
    pub fn full(&self) -> String {
        format!("{} {}", self.first_names.trim(), self.last_names.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub neighborhood: String,
    pub municipality: String,
    pub state: String,
    pub postal_code: String,
}

impl Address {
    pub fn display(&self) -> String {
        format!(
            "{}, {}, {}, {}, CP {}",
            self.street, self.neighborhood, self.municipality, self.state, self.postal_code
        )
    }
}

/// A user-supplied evidence file. Drafts restored from storage replace the
/// binary content with a metadata stub, which the normalizer must reject
/// instead of attempting to decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EvidenceFile {
    Bytes {
        name: String,
        #[serde(default)]
        mime: String,
        /// Base64-encoded file content in JSON snapshots.
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
    Stub {
        name: String,
        size: u64,
        #[serde(default)]
        mime: String,
    },
}

impl EvidenceFile {
    pub fn name(&self) -> &str {
        match self {
            EvidenceFile::Bytes { name, .. } | EvidenceFile::Stub { name, .. } => name,
        }
    }

    pub fn mime(&self) -> &str {
        match self {
            EvidenceFile::Bytes { mime, .. } | EvidenceFile::Stub { mime, .. } => mime,
        }
    }
}

mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        base64::engine::general_purpose::STANDARD
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// One evaluated checklist requirement: a three-state choice, a free-text
/// observation and attached photographic evidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(default)]
    pub status: Option<Choice>,
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub evidence: Vec<EvidenceFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalSection {
    #[serde(default)]
    pub has_portal: Option<Gate>,
    #[serde(default)]
    pub evaluation: ChecklistItem,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeSection {
    #[serde(default)]
    pub has_office: Option<Gate>,
    #[serde(default)]
    pub general: ChecklistItem,
}

/// The checklist + evidence report snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceReport {
    pub case_number: String,
    pub date: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub owner: OwnerName,
    pub address: Address,
    pub business_line: String,
    pub rfc: String,
    pub inspection_type: String,

    /// Always-required sections.
    pub channels: Vec<ChecklistItem>,
    pub deposit_items: Vec<ChecklistItem>,

    /// Conditional sections; sub-items may exist with unset status while
    /// the gate is negative.
    #[serde(default)]
    pub portal: PortalSection,
    #[serde(default)]
    pub portal_items: Vec<ChecklistItem>,
    #[serde(default)]
    pub office: OfficeSection,
    #[serde(default)]
    pub office_items: Vec<ChecklistItem>,
}

/// One signature line of the summary dictamen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureField {
    /// Stable slot id matching a pad in the [`SignatureRegistry`].
    pub slot_id: String,
    /// Printed name under the signature bitmap.
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conclusion {
    #[serde(rename = "SATISFACTORIO")]
    Satisfactory,
    #[serde(rename = "NO_SATISFACTORIO")]
    NotSatisfactory,
}

/// The 25-row summary dictamen snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionSummary {
    pub date: String,
    pub case_number: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,

    pub owner_name: String,
    pub street: String,
    pub postal_code: String,
    pub neighborhood: String,
    pub municipality: String,
    pub rfc: String,
    pub business_line: String,
    pub utm_coordinates: String,
    pub inspector: String,

    /// One choice per catalog row, in catalog order.
    pub row_choices: Vec<Option<Choice>>,
    #[serde(default)]
    pub conclusion: Option<Conclusion>,
    pub observations: String,
    /// Inspector, client, auxiliary staff, supervisor.
    pub signatures: Vec<SignatureField>,
}

/// The certificate snapshot (snapshot-path template). Field values appear
/// on both certificate pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateData {
    pub provider_name: String,
    pub provider_address: String,
    pub folio: String,
    pub issue_date: String,
    pub issue_place: String,
    pub inspector: String,
}

// ── Render-ready sections ───────────────────────────────────────────

/// A template-defined content block, carrying everything needed to render
/// it independent of layout state.
#[derive(Debug, Clone)]
pub enum Section {
    /// Full-width brand band + title chip, first page only.
    Cover { title: String },
    /// Styled section banner.
    Header { title: String },
    /// Bold inline label (e.g. "Requisito 3").
    Label { text: String },
    /// Label column + wrapped value.
    KeyValue { label: String, value: String },
    /// Three-state requirement table.
    OptionTable {
        description: String,
        choice: Option<Choice>,
    },
    /// Fixed-column photographic evidence grid.
    ImageGrid { images: Vec<EvidenceFile> },
    /// Two-state conclusion table (satisfactorio / no satisfactorio).
    ConclusionTable {
        description: String,
        conclusion: Option<Conclusion>,
    },
    /// Wrapped free text under a bold heading.
    FreeText { label: String, text: String },
    /// Signature bitmaps with printed names and captions, two per row.
    SignatureRow {
        slots: Vec<SignatureSlotRef>,
    },
    /// Italic closing line, centered.
    Note { text: String },
}

/// Reference to a signature pad plus its printed caption.
#[derive(Debug, Clone)]
pub struct SignatureSlotRef {
    pub slot_id: String,
    pub name: String,
    pub caption: String,
}

/// Ordered list of sections for one report, instantiated by `template`.
#[derive(Debug, Clone)]
pub struct ReportTemplate {
    pub title: String,
    pub sections: Vec<Section>,
}

// ── Validation ──────────────────────────────────────────────────────

/// Hand-rolled RFC check: 3-4 letters (incl. Ñ, &), 6 digits, 3 alphanumerics.
fn is_valid_rfc(rfc: &str) -> bool {
    let chars: Vec<char> = rfc.trim().to_uppercase().chars().collect();
    let n = chars.len();
    if !(12..=13).contains(&n) {
        return false;
    }
    let letters = n - 9;
    let is_rfc_letter = |c: &char| c.is_ascii_alphabetic() || *c == 'Ñ' || *c == '&';
    chars[..letters].iter().all(is_rfc_letter)
        && chars[letters..letters + 6].iter().all(|c| c.is_ascii_digit())
        && chars[letters + 6..].iter().all(|c| c.is_ascii_alphanumeric())
}

fn require(cond: bool, field: &str, missing: &mut Vec<String>) {
    if !cond {
        missing.push(field.to_string());
    }
}

impl EvidenceReport {
    /// Check every required field and choice. Conditional sub-items are
    /// only required when their gate is affirmative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();

        require(self.case_number.starts_with("MT-IC-") && self.case_number.len() > 6,
            "caseNumber", &mut missing);
        require(!self.date.trim().is_empty(), "date", &mut missing);
        require(self.start_time.is_valid(), "startTime", &mut missing);
        require(self.end_time.is_valid(), "endTime", &mut missing);
        require(!self.owner.first_names.trim().is_empty(), "owner.firstNames", &mut missing);
        require(!self.owner.last_names.trim().is_empty(), "owner.lastNames", &mut missing);
        require(!self.address.street.trim().is_empty(), "address.street", &mut missing);
        require(!self.address.neighborhood.trim().is_empty(), "address.neighborhood", &mut missing);
        require(!self.address.municipality.trim().is_empty(), "address.municipality", &mut missing);
        require(!self.address.state.trim().is_empty(), "address.state", &mut missing);
        require(!self.address.postal_code.trim().is_empty(), "address.postalCode", &mut missing);
        require(!self.business_line.trim().is_empty(), "businessLine", &mut missing);
        require(is_valid_rfc(&self.rfc), "rfc", &mut missing);
        require(!self.inspection_type.trim().is_empty(), "inspectionType", &mut missing);

        for (i, item) in self.channels.iter().enumerate() {
            require(item.status.is_some(), &format!("channels.{i}.status"), &mut missing);
        }
        for (i, item) in self.deposit_items.iter().enumerate() {
            require(item.status.is_some(), &format!("depositItems.{i}.status"), &mut missing);
        }

        require(self.portal.has_portal.is_some(), "portal.hasPortal", &mut missing);
        if self.portal.has_portal == Some(Gate::Si) {
            require(self.portal.evaluation.status.is_some(), "portal.evaluation.status", &mut missing);
            for (i, item) in self.portal_items.iter().enumerate() {
                require(item.status.is_some(), &format!("portalItems.{i}.status"), &mut missing);
            }
        }

        require(self.office.has_office.is_some(), "office.hasOffice", &mut missing);
        if self.office.has_office == Some(Gate::Si) {
            require(self.office.general.status.is_some(), "office.general.status", &mut missing);
            for (i, item) in self.office_items.iter().enumerate() {
                require(item.status.is_some(), &format!("officeItems.{i}.status"), &mut missing);
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(missing))
        }
    }
}

impl InspectionSummary {
    /// Every row must carry a choice, the conclusion must be picked, and
    /// each signature line needs both a drawn bitmap and a printed name.
    pub fn validate(&self, signatures: &SignatureRegistry) -> Result<(), ValidationError> {
        let mut missing = Vec::new();

        require(!self.date.trim().is_empty(), "date", &mut missing);
        require(self.case_number.starts_with("MT-IC-") && self.case_number.len() > 6,
            "caseNumber", &mut missing);
        require(self.start_time.is_valid(), "startTime", &mut missing);
        require(self.end_time.is_valid(), "endTime", &mut missing);

        for (field, value) in [
            ("ownerName", &self.owner_name),
            ("street", &self.street),
            ("postalCode", &self.postal_code),
            ("neighborhood", &self.neighborhood),
            ("municipality", &self.municipality),
            ("businessLine", &self.business_line),
            ("utmCoordinates", &self.utm_coordinates),
            ("inspector", &self.inspector),
        ] {
            require(!value.trim().is_empty(), field, &mut missing);
        }
        require(is_valid_rfc(&self.rfc), "rfc", &mut missing);

        for (i, choice) in self.row_choices.iter().enumerate() {
            require(choice.is_some(), &format!("rowChoices.{i}"), &mut missing);
        }
        require(self.conclusion.is_some(), "conclusion", &mut missing);
        require(!self.observations.trim().is_empty(), "observations", &mut missing);

        for (i, sig) in self.signatures.iter().enumerate() {
            require(!sig.name.trim().is_empty(), &format!("signatures.{i}.name"), &mut missing);
            let drawn = signatures
                .get(&sig.slot_id)
                .map(|pad| pad.has_content())
                .unwrap_or(false);
            require(drawn, &format!("signatures.{i}.drawing"), &mut missing);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(missing))
        }
    }
}

impl CertificateData {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("providerName", &self.provider_name),
            ("providerAddress", &self.provider_address),
            ("folio", &self.folio),
            ("issueDate", &self.issue_date),
            ("issuePlace", &self.issue_place),
            ("inspector", &self.inspector),
        ] {
            require(!value.trim().is_empty(), field, &mut missing);
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(missing))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc_accepts_standard_forms() {
        assert!(is_valid_rfc("ABC123456XY9"));
        assert!(is_valid_rfc("ABCD123456XY9"));
        assert!(is_valid_rfc("ÑAB123456AB1"));
    }

    #[test]
    fn test_rfc_rejects_malformed() {
        assert!(!is_valid_rfc(""));
        assert!(!is_valid_rfc("AB123456XY9"));
        assert!(!is_valid_rfc("ABCD12345XYZ9"));
        assert!(!is_valid_rfc("ABCDE123456XY9"));
    }

    #[test]
    fn test_choice_column_index() {
        assert_eq!(Choice::Complies.column_index(), 0);
        assert_eq!(Choice::NotComplies.column_index(), 1);
        assert_eq!(Choice::NotApplicable.column_index(), 2);
    }

    #[test]
    fn test_evidence_file_stub_roundtrip() {
        let json = r#"{"name":"foto.jpg","size":52133,"mime":"image/jpeg"}"#;
        let file: EvidenceFile = serde_json::from_str(json).unwrap();
        assert!(matches!(file, EvidenceFile::Stub { .. }));
        assert_eq!(file.name(), "foto.jpg");
    }

    #[test]
    fn test_evidence_file_bytes_roundtrip() {
        let file = EvidenceFile::Bytes {
            name: "foto.png".into(),
            mime: "image/png".into(),
            data: vec![1, 2, 3, 4],
        };
        let json = serde_json::to_string(&file).unwrap();
        let back: EvidenceFile = serde_json::from_str(&json).unwrap();
        match back {
            EvidenceFile::Bytes { data, .. } => assert_eq!(data, vec![1, 2, 3, 4]),
            _ => panic!("expected Bytes variant"),
        }
    }

    #[test]
    fn test_time_of_day_validity() {
        let ok = TimeOfDay { hh: "11".into(), mm: "05".into(), meridiem: Meridiem::Am };
        assert!(ok.is_valid());
        let bad = TimeOfDay { hh: "13".into(), mm: "05".into(), meridiem: Meridiem::Am };
        assert!(!bad.is_valid());
    }
}
