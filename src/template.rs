//! # Report Templates
//!
//! The three fixed templates and their requirement catalogs. A template is
//! an ordered section list instantiated from a validated snapshot; the
//! sections carry concrete data, so rendering never reaches back into the
//! form state. The catalogs are the official NOM-247 requirement texts and
//! are never mutated at runtime.

use crate::evidence::NormalizedImage;
use crate::model::*;
use crate::snapshot::{Align, BlockStyle, Direction, TextStyle, VisualNode};

pub const COMPANY_NAME: &str = "MET-TIME, S.A. DE C.V.";
pub const COMPANY_BAND_LINE: &str =
    "Organismo de inspección acreditado por EMA • Acreditación UIBI-004 • 2024/08/26";
pub const COMPANY_ADDRESS: &str =
    "Av. Central, No. Ext. 111, Rústicos Calpulli, C.P. 20296, Aguascalientes, Aguascalientes.";
pub const CLOSING_NOTE: &str = "*Documento electrónico con validez oficial";

/// Requirement shown for the physical-office gate itself.
pub static OFFICE_GENERAL_REQUIREMENT: &str =
    "La información prevista en este numeral debe estar a la vista o indicarse que la misma está \
     disponible y ser de fácil acceso para el consumidor.";

/// Captions under the four summary-dictamen signature slots, in form order.
pub static SIGNATURE_CAPTIONS: [&str; 4] = [
    "NOMBRE Y FIRMA DEL INSPECTOR",
    "FIRMA DE CONFORME DEL CLIENTE",
    "NOMBRE Y FIRMA DEL PERSONAL AUXILIAR",
    "NOMBRE Y FIRMA DEL SUPERVISOR",
];

/// One row of the 25-row summary catalog.
pub struct SummaryRow {
    pub title: &'static str,
    pub description: &'static str,
}

impl ReportKind {
    /// Filename prefix for the saved artifact.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ReportKind::Evidence => "Evidencias",
            ReportKind::Inspection => "FCumplimiento",
            ReportKind::Certificate => "Cumplimiento",
        }
    }
}

/// Push the per-item triple every checklist entry renders: option table,
/// observation, evidence heading + grid.
fn push_checklist_item(
    sections: &mut Vec<Section>,
    description: &str,
    item: &ChecklistItem,
    numbered: Option<usize>,
) {
    if let Some(n) = numbered {
        sections.push(Section::Label {
            text: format!("Requisito {n}"),
        });
    }
    sections.push(Section::OptionTable {
        description: description.to_string(),
        choice: item.status,
    });
    sections.push(Section::KeyValue {
        label: "Observación:".into(),
        value: item.observation.clone(),
    });
    sections.push(Section::Label {
        text: "Evidencias:".into(),
    });
    sections.push(Section::ImageGrid {
        images: item.evidence.clone(),
    });
}

/// Instantiate the checklist + evidence report template.
///
/// Conditional sections always render their gate key-value; the nested
/// sub-blocks appear only when the gate is the affirmative sentinel.
pub fn evidence_template(data: &EvidenceReport) -> ReportTemplate {
    let mut sections = Vec::new();

    sections.push(Section::Cover {
        title: "DICTAMEN DE INSPECCIÓN".into(),
    });

    sections.push(Section::Header { title: "Datos del dictamen".into() });
    for (label, value) in [
        ("Expediente:", data.case_number.clone()),
        ("Fecha:", data.date.clone()),
        ("Hora inicio:", data.start_time.display()),
        ("Hora término:", data.end_time.display()),
        ("Propietario:", data.owner.full()),
        ("Domicilio:", data.address.display()),
        ("Giro:", data.business_line.clone()),
        ("RFC:", data.rfc.clone()),
        ("Tipo inspección:", data.inspection_type.clone()),
    ] {
        sections.push(Section::KeyValue { label: label.into(), value });
    }

    sections.push(Section::Header { title: "P2: Canales y evidencias".into() });
    for (i, item) in data.channels.iter().enumerate() {
        let desc = CHANNEL_REQUIREMENTS.get(i).copied().unwrap_or("");
        push_checklist_item(&mut sections, desc, item, Some(i + 1));
    }

    sections.push(Section::Header { title: "P3: Información y portal".into() });
    sections.push(Section::KeyValue {
        label: "¿Tiene portal?".into(),
        value: data.portal.has_portal.map(|g| g.label()).unwrap_or("").into(),
    });
    if data.portal.has_portal == Some(Gate::Si) {
        push_checklist_item(&mut sections, PORTAL_REQUIREMENT, &data.portal.evaluation, None);
        for (i, item) in data.portal_items.iter().enumerate() {
            let desc = PORTAL_ITEM_REQUIREMENTS.get(i).copied().unwrap_or("");
            push_checklist_item(&mut sections, desc, item, Some(i + 1));
        }
    }

    sections.push(Section::Header { title: "P4: Oficina física".into() });
    sections.push(Section::KeyValue {
        label: "¿Tiene oficina física?".into(),
        value: data.office.has_office.map(|g| g.label()).unwrap_or("").into(),
    });
    if data.office.has_office == Some(Gate::Si) {
        push_checklist_item(&mut sections, OFFICE_GENERAL_REQUIREMENT, &data.office.general, None);
        for (i, item) in data.office_items.iter().enumerate() {
            let desc = OFFICE_ITEM_REQUIREMENTS.get(i).copied().unwrap_or("");
            push_checklist_item(&mut sections, desc, item, Some(i + 1));
        }
    }

    sections.push(Section::Header { title: "P5: Anticipo".into() });
    for (i, item) in data.deposit_items.iter().enumerate() {
        let desc = DEPOSIT_REQUIREMENTS.get(i).copied().unwrap_or("");
        push_checklist_item(&mut sections, desc, item, Some(i + 1));
    }

    sections.push(Section::Note { text: CLOSING_NOTE.into() });

    ReportTemplate {
        title: "DICTAMEN DE INSPECCIÓN".into(),
        sections,
    }
}

/// Instantiate the 25-row summary dictamen template.
pub fn inspection_template(data: &InspectionSummary) -> ReportTemplate {
    let mut sections = Vec::new();

    sections.push(Section::Cover {
        title: "DICTAMEN DE INSPECCIÓN".into(),
    });

    sections.push(Section::Header { title: "Datos del dictamen".into() });
    for (label, value) in [
        ("Fecha:", data.date.clone()),
        ("Expediente:", data.case_number.clone()),
        ("Hora inicio:", data.start_time.display()),
        ("Hora final:", data.end_time.display()),
    ] {
        sections.push(Section::KeyValue { label: label.into(), value });
    }

    sections.push(Section::Header { title: "INFORMACIÓN DEL CLIENTE".into() });
    for (label, value) in [
        ("Nombre del Propietario:", data.owner_name.clone()),
        ("Domicilio:", data.street.clone()),
        ("C.P.:", data.postal_code.clone()),
        ("Colonia:", data.neighborhood.clone()),
        ("Delegación/Municipio:", data.municipality.clone()),
        ("R.F.C.:", data.rfc.clone()),
        ("Giro:", data.business_line.clone()),
        ("Coordenadas UTM:", data.utm_coordinates.clone()),
        ("Inspector:", data.inspector.clone()),
    ] {
        sections.push(Section::KeyValue { label: label.into(), value });
    }

    sections.push(Section::Header { title: "REQUISITOS A EVALUAR".into() });
    for (i, row) in SUMMARY_ROWS.iter().enumerate() {
        sections.push(Section::Label { text: row.title.into() });
        sections.push(Section::OptionTable {
            description: row.description.to_string(),
            choice: data.row_choices.get(i).copied().flatten(),
        });
    }

    sections.push(Section::ConclusionTable {
        description: "La inspección se realizó de acuerdo con los estándares establecidos.".into(),
        conclusion: data.conclusion,
    });

    for line in DISCLAIMERS {
        sections.push(Section::FreeText { label: String::new(), text: line.to_string() });
    }

    sections.push(Section::Header { title: "FIRMAS".into() });
    let slots = data
        .signatures
        .iter()
        .enumerate()
        .map(|(i, sig)| SignatureSlotRef {
            slot_id: sig.slot_id.clone(),
            name: sig.name.clone(),
            caption: SIGNATURE_CAPTIONS.get(i).copied().unwrap_or("").to_string(),
        })
        .collect();
    sections.push(Section::SignatureRow { slots });

    sections.push(Section::FreeText {
        label: "OBSERVACIONES:".into(),
        text: data.observations.clone(),
    });

    sections.push(Section::Note { text: CLOSING_NOTE.into() });

    ReportTemplate {
        title: "DICTAMEN DE INSPECCIÓN".into(),
        sections,
    }
}

// ── Certificate visual tree ─────────────────────────────────────────

fn text(content: &str, size: f32, weight: u32) -> VisualNode {
    VisualNode::Text {
        content: content.to_string(),
        style: TextStyle { size, weight, italic: false, align: Align::Center },
    }
}

fn field(id: &str, value: &str, placeholder: &str, size: f32) -> VisualNode {
    VisualNode::Field {
        id: id.to_string(),
        value: value.to_string(),
        placeholder: placeholder.to_string(),
        style: TextStyle { size, weight: 600, italic: false, align: Align::Start },
    }
}

fn labeled_row(label: &str, node: VisualNode) -> VisualNode {
    VisualNode::Block {
        style: BlockStyle {
            direction: Direction::Row,
            gap: 8.0,
            align: Align::Start,
            ..BlockStyle::default()
        },
        children: vec![text(label, 30.0, 600), node],
    }
}

/// One "Espacio para firma" block: heading, canvas, clear button (stripped
/// during projection), baseline rule, caption.
fn signature_block(signature_id: &str, caption: &str) -> VisualNode {
    VisualNode::Block {
        style: BlockStyle {
            align: Align::Center,
            gap: 8.0,
            margin_top: 40.0,
            margin_bottom: 70.0,
            ..BlockStyle::default()
        },
        children: vec![
            text("Espacio para firma", 22.0, 700),
            VisualNode::Canvas {
                signature_id: Some(signature_id.to_string()),
                width: 400.0,
                height: 140.0,
                bitmap: None,
            },
            VisualNode::Button { label: "Limpiar".into() },
            VisualNode::Rule { width_frac: 0.5, thickness: 2.0 },
            text(caption, 22.0, 700),
        ],
    }
}

fn issue_fields(data: &CertificateData) -> Vec<VisualNode> {
    vec![
        labeled_row("Folio:", field("folio", &data.folio, "Ingrese folio", 30.0)),
        labeled_row(
            "Fecha de emisión:",
            field("fechaEmision", &data.issue_date, "DD-MM-AAAA", 30.0),
        ),
        labeled_row(
            "Lugar de emisión:",
            field("lugarEmision", &data.issue_place, "Ciudad, Estado", 30.0),
        ),
        labeled_row(
            "Inspector responsable:",
            field("inspector", &data.inspector, "Nombre del inspector", 30.0),
        ),
        text("F-IC-PAD-011", 30.0, 600),
    ]
}

const MISUSE_NOTE: &str =
    "El uso indebido del presente dictamen dará como resultado la cancelación del mismo \
     comprometiéndose el titular a acatar los dispuestos en el contrato de servicios aprobado \
     por el titular y la unidad de inspección. Para asegurarse de la validez de este dictamen \
     consulta nuestra página web: https://grupomet-time.godaddysites.com/";

/// The certificate template as a visual tree: a fixed sidebar of rotated
/// accreditation labels plus a two-page main column split by a divider.
/// Rendered through the snapshot path, not the block layout engine.
pub fn certificate_tree(data: &CertificateData, logo: Option<&NormalizedImage>) -> VisualNode {
    let sidebar = VisualNode::Block {
        style: BlockStyle {
            width: Some(150.0),
            rotated: true,
            align: Align::Center,
            gap: 40.0,
            ..BlockStyle::default()
        },
        children: vec![
            text("Entidad Mexicana de Acreditación — Acreditación No. UIBI-004", 24.0, 400),
            text("UNIDAD DE INSPECCIÓN UIBI-004", 24.0, 400),
            text(
                "SECRETARÍA DE ECONOMÍA — Aprobación No. UIBI-004 — Oficio No. DGN.191.06.2025.2273",
                24.0,
                400,
            ),
        ],
    };

    let mut main_children: Vec<VisualNode> = Vec::new();

    // Page 1: the certificate proper.
    if let Some(logo) = logo {
        main_children.push(VisualNode::Image {
            jpeg: logo.clone(),
            width: 180.0,
            height: 90.0,
        });
    }
    main_children.push(text("D I C T A M E N", 40.0, 700));
    main_children.push(text(COMPANY_NAME, 30.0, 800));
    main_children.push(text(COMPANY_ADDRESS, 22.0, 400));
    main_children.push(text("Otorga el presente:", 22.0, 400));
    main_children.push(text("Dictamen de Cumplimiento", 50.0, 700));
    main_children.push(text("Al prestador del servicio:", 22.0, 400));
    main_children.push(field("prestador", &data.provider_name, "Nombre de la empresa", 26.0));
    main_children.push(field("direccion", &data.provider_address, "Dirección de la empresa", 26.0));
    main_children.push(text(
        "Por el cumplimiento de las prácticas comerciales de bienes inmuebles establecidos en la \
         Norma Oficial Mexicana",
        30.0,
        400,
    ));
    main_children.push(text("NOM-247-SE-2021", 50.0, 700));
    main_children.push(text("Alcance de la inspección", 22.0, 400));
    main_children.push(text(
        "Requisitos de la información comercial y la publicidad de bienes inmuebles destinados a \
         casa habitación y elementos mínimos que deben contener los contratos relacionados.",
        30.0,
        400,
    ));
    main_children.push(signature_block(
        "firma-gerencia-1",
        "Austria Nastassja Farías Carrillo — GERENCIA TÉCNICA",
    ));
    main_children.extend(issue_fields(data));
    main_children.push(VisualNode::Pusher);
    main_children.push(text(MISUSE_NOTE, 16.0, 800));

    main_children.push(VisualNode::Divider);

    // Page 2: participating inspector.
    if let Some(logo) = logo {
        main_children.push(VisualNode::Image {
            jpeg: logo.clone(),
            width: 180.0,
            height: 90.0,
        });
    }
    main_children.push(text(
        "Para la emisión de este Dictamen participó el siguiente Inspector:",
        30.0,
        400,
    ));
    main_children.push(signature_block("firma-inspector", "NOMBRE DEL INSPECTOR"));
    main_children.push(signature_block(
        "firma-gerencia-2",
        "Austria Nastassja Farías Carrillo — GERENCIA TÉCNICA",
    ));
    main_children.extend(issue_fields(data));
    main_children.push(VisualNode::Pusher);
    main_children.push(text(MISUSE_NOTE, 16.0, 800));
    main_children.push(VisualNode::Button { label: "Generar PDF".into() });

    let main = VisualNode::Block {
        style: BlockStyle {
            gap: 14.0,
            pad: 24.0,
            align: Align::Center,
            ..BlockStyle::default()
        },
        children: main_children,
    };

    VisualNode::Block {
        style: BlockStyle {
            direction: Direction::Row,
            ..BlockStyle::default()
        },
        children: vec![sidebar, main],
    }
}

// ── Requirement catalogs ────────────────────────────────────────────



/// Always-required: channels for complaints and requests.
pub static CHANNEL_REQUIREMENTS: [&str; 3] = [
    "El proveedor demostrará que cuenta con canales y mecanismos de atención al consumidor, gratuitos y accesibles a través de cualquiera de los siguientes medios: Teléfonos, correo electrónico, formularios en sitios web o cualquier medio de contacto digital, debiendo manifestar que los mismos están habilitados por lo menos en días y horas hábiles.",
    "El proveedor enseñará su formato o medio, en forma digital o física para recibir quejas, solicitudes o sugerencias por parte de los consumidores, en cualquiera de los puntos de venta o atención a clientes, domicilio de la casa matriz del proveedor o de sus sucursales.",
    "El proveedor manifestará el medio digital o físico por el cual señaló un domicilio para oír y recibir notificaciones de los consumidores.",
];

/// Conditional on the internet-portal gate.
pub static PORTAL_ITEM_REQUIREMENTS: [&str; 6] = [
    "El Aviso de Privacidad",
    "Formas y planes de pago de los inmuebles",
    "En caso de que el inmueble esté financiado por el proveedor, éste debe informar sobre el porcentaje de la tasa de interés, el costo anual total, el monto de las comisiones, así como los seguros adheridos al financiamiento y sus coberturas que existieren",
    "Modelo de contrato de adhesión registrado ante la PROFECO",
    "Leyenda que indique que en las operaciones de crédito el precio total se determinará en función de los montos variables de conceptos de crédito y gastos notariales que deben ser consultados con los promotores, conforme al apartado 5.6.7 de la NOM-247-SE-2024",
    "Dirección física y electrónica en la que se podrá presentar una queja o reclamación, y horarios de atención",
];

/// Conditional on the physical-office gate.
pub static OFFICE_ITEM_REQUIREMENTS: [&str; 6] = [
    "En caso de que el inmueble esté financiado por el proveedor, éste debe informar sobre el porcentaje de la tasa de interés, el costo anual total, el monto de las comisiones, así como los seguros adheridos al financiamiento y sus coberturas que existieren",
    "Modelo de contrato de adhesión registrado ante la PROFECO",
    "Formas y planes de pago de los inmuebles",
    "Dirección física y electrónica en la que se podrá presentar una queja o reclamación, y horarios de atención",
    "Precios totales en operaciones de contado y las características de los diferentes tipos de inmueble que comercializa a través de un vínculo",
    "Leyenda que indique que en las operaciones de crédito el precio total se determinará en función de los montos variables de conceptos de crédito y notariales que deben ser consultados con los promotores, conforme al apartado 5.6.7 de la NOM-247-SE-2024 que indica: El proveedor es responsable de indicar las opciones de pago que acepta del consumidor, asimismo deberá señalarle si acepta o no créditos y en su caso, de qué instituciones, la presente obligación es por cada unidad privativa que pretenda comercializar.",
];

/// Always-required: deposits (anticipos).
pub static DEPOSIT_REQUIREMENTS: [&str; 5] = [
    "El proveedor debe demostrar a la Unidad de Inspección que ha otorgado comprobante, en formato libre digital o impreso, por los anticipos recibidos",
    "Debe demostrar evidencia documental donde se haga constar que informo al consumidor de las condiciones a las que está sujeto dicho anticipo, así como las políticas para su aplicación, devolución o reembolso conforme a lo previsto por la NOM-247-SE-2021 en su inciso 4.4",
    "En el caso que el consumidor haya decidido no continuar con la compra del inmueble, el proveedor debe demostrar a la Unidad de Inspección que el trámite de la devolución del anticipo es realizado conforme a lo dispuesto en el segundo párrafo de 4.4 de la NOM-247-SE-2021",
    "Se demuestra si el consumidor decidió, continuar con la compra del inmueble con copia de la comunicación escrita de su aceptación, virtual o impresa, según sea el caso.",
    "En el caso que el proyecto ejecutivo del inmueble por el cual se realizó el anticipo necesite modificarse durante la obra, el proveedor debe demostrar mediante la copia de la comunicación física o electrónica que contenga la fecha de dicha notificación, que avisó al consumidor sobre las modificaciones realizadas, de acuerdo a lo establecido en el cuarto párrafo de 4.4:",
];

/// Portal evaluation requirement shown when the gate is SI.
pub static PORTAL_REQUIREMENT: &str = "En caso de que se cuente con portal de Internet por parte del proveedor, se revisa que incluya: Precios totales en operaciones de contado y características de los tipos de inmueble que comercializa a través de un vínculo.";


/// The 25 requirement rows of the summary dictamen, in form order.
pub static SUMMARY_ROWS: [SummaryRow; 25] = [
    SummaryRow {
        title: "Canales de atención de quejas y solicitudes.",
        description: "El proveedor demostrará que cuenta con canales y mecanismos de atención al consumidor, gratuitos y accesibles a través de cualquiera de los siguientes medios:Teléfonos, correo electrónico, formularios en sitios web o cualquier medio de contacto digital, debiendo manifestar que los mismos están habilitados por lo menos en días y horas hábiles. El proveedor enseñará su formato o medio, en forma digital o física para recibir quejas, solicitudes o sugerencias por parte de los consumidores, en cualquiera de los puntos de venta o atención a clientes, domicilio de la casa matriz del proveedor o de sus sucursales. El proveedor manifestará el medio digital o físico por el cual señaló un domicilio para oír y recibir notificaciones de los consumidores.",
    },
    SummaryRow {
        title: "Información en Portal en Internet",
        description: "En caso de que se cuente con portal de Internet por parte del proveedor, se revisa que el mismo cuenta con la siguiente información: I.Precios totales en operaciones de contado y las características de los diferentes tipos de inmueble que comercializa a través de un vínculo; II.Leyenda que indique que en las operaciones de crédito el precio total se determinará en función de los montos variables de conceptos de crédito y gastos notariales que deben ser consultados con los promotores, conforme al apartado 5.6.7 de la NOM-247-SE-2024; III.Dirección física y electrónica en la que se podrá presentar una queja o reclamación, y horarios de atención; IV.Modelo de contrato de adhesión registrado ante la PROFECO; V.Formas y planes de pago de los inmuebles; VI.En caso de que el inmueble esté financiado por el proveedor, éste debe informar sobre el porcentaje de la tasa de interés, el costo anual total, el monto de las comisiones, así como los seguros adheridos al financiamiento y sus coberturas que existieren; y VII.El Aviso de Privacidad",
    },
    SummaryRow {
        title: "Información en oficina de atención física",
        description: "En caso de que el proveedor no cuente con un portal electrónico, pero cuente con una oficina de atención física, la información prevista en este numeral debe estar a la vista o indicarse que la misma está disponible y ser de fácil acceso para el consumidor. I. Precios totales en operaciones de contado y las características de los diferentes tipos de inmueble que comercializa a través de un vínculo; II. Leyenda que indique que en las operaciones de crédito el precio total se determinará en función a de los montos variables de conceptos de crédito y notariales que deben ser consultados con los promotores, conforme al apartado 5.6.7 de la NOM-247-SE-2024; III. Dirección física y electrónica en la que se podrá presentar una queja o reclamación, y horarios de atención; IV. Modelo de contrato de adhesión registrado ante la PROFECO; V. Formas y planes de pago de los inmuebles, y VI. En caso de que el inmueble esté financiado por el proveedor, éste debe informar sobre el porcentaje de la tasa de interés, el costo anual total, el monto de las comisiones, así como los seguros adheridos al financiamiento y sus coberturas que existieren.",
    },
    SummaryRow {
        title: "Anticipo",
        description: "El proveedor debe demostrar a la Unidad de Inspección que ha otorgado comprobante, en formato libre digital o impreso, por los anticipos recibidos. Asimismo, debe demostrar evidencia documental donde se haga constar que informó al consumidor de las condiciones a las que está sujeto dicho anticipo, así como las políticas para su aplicación, devolución o reembolso conforme a lo previsto por la NOM-247-SE-2024 en su inciso 4.4. En el caso que el proyecto ejecutivo del inmueble por el cual se realizó el anticipo necesite modificarse durante la obra, el proveedor debe demostrar mediante la copia de la comunicación física o electrónica que contenga la fecha de dicha notificación, que avisó al consumidor sobre las modificaciones realizadas, de acuerdo a lo establecido en el cuarto párrafo de 4.4. Asimismo, se demuestra si el consumidor decidió, continuar con la compra del inmueble con copia de la comunicación escrita de su aceptación, virtual o impresa, según sea el caso. En el caso que el consumidor haya decidido no continuar con la compra del inmueble, el proveedor debe demostrar a la Unidad de Inspección que el trámite de la devolución del anticipo es realizado conforme a lo dispuesto en el segundo párrafo de 4.4 de la NOM- 247-SE-2021",
    },
    SummaryRow {
        title: "Enganches",
        description: "La UI debe verificar el cumplimiento de las obligaciones establecidas en el apartado 4.5. de la NOM relacionadas con enganches, su aplicación en caso de compraventas en abonos y de rescisión del contrato. En el caso que el proyecto ejecutivo del inmueble por el cual se realizó el enganche necesite modificarse durante la obra, el Proveedor debe demostrar mediante la copia de la comunicación física o electrónica realizada que avisó al consumidor sobre las modificaciones realizadas. Asimismo, se demuestra si el consumidor decidió, continuar con la compra del inmueble con copia de la comunicación escrita de su aceptación, virtual o impresa, según sea el caso.",
    },
    SummaryRow {
        title: "Preventas",
        description: "El proveedor debe presentar evidencia que demuestre que, durante la preventa, exhibió a los consumidores de manera notoria y visible por medios digitales o físicos, el precio de venta y las características de las viviendas.",
    },
    SummaryRow {
        title: "No discriminación",
        description: "El proveedor debe demostrar que cuenta con una política de no discriminación de conformidad con el artículo 58 de la LFPC y que la misma ha sido notificada a los consumidores de forma digital o impresa o los medios en los cuales los mismos pueden consultarla.",
    },
    SummaryRow {
        title: "Carta de derechos",
        description: "El proveedor debe demostrar que entrega a los consumidores la carta de derechos, por medios impresos, físicos o digitales, en los términos establecidos en el 4.8 de la NOM-247-SE-2024.",
    },
    SummaryRow {
        title: "Información y publicidad/idioma",
        description: "La información y publicidad del proveedor debe estar en español, por medios digitales o físicos en términos comprensibles y legibles. Sin perjuicio de que pueda estar en forma adicional en otros idiomas.",
    },
    SummaryRow {
        title: "Información y publicidad/requisitos generales",
        description: "El proveedor debe demostrar documentalmente que pone a disposición del consumidor la información prevista en el artículo 73 BIS de la LFPC, por medios digitales o físicos, incluyendo lo siguiente: I. Nombre comercial y razón social del proveedor; II. Datos de contacto que incluyan domicilio, teléfono y/o dirección electrónica; III. Acreditación de la propiedad del inmueble, o en su caso, derecho o facultad para comercializarla o enajenarla, y los gravámenes con los que cuenta, excepto aquellos derivados del crédito utilizado por el proveedor para la construcción de la vivienda; IV. Precio del inmueble en operaciones de contado; en operaciones de crédito, indicar que el precio total se determinará en función de los montos variables de conceptos de crédito y notariales; V. Métodos de pago disponibles por unidad privativa a comercializar, pudiendo ser, de manera enunciativa mas no limitativa, con crédito INFONAVIT, FOVISSSTE, bancarios, del mismo proveedor, de organismos públicos, privados o sindicatos; VI. Licencias, permisos o autorizaciones del inmueble otorgados por las autoridades competentes; VII. Especificaciones generales del inmueble que contenga, como mínimo: ubicación, colindancias, datos de medidas, instalaciones de servicios, acabados y sistema constructivo; VIII. Datos de los medios disponibles del proveedor para que el consumidor pueda presentar una queja o una reclamación, y los horarios de atención de estos medios; y IX. Número de registro ante PROFECO del contrato con el que comercializan los inmuebles.",
    },
    SummaryRow {
        title: "Información y publicidad/avales",
        description: "Si se incluye en la publicidad o información leyendas o información que indiquen que han sido avalados, aprobados, recomendados o certificados por sociedades o asociaciones profesionales distintas al proveedor, se debe demostrar con documentos provenientes de dichas sociedades o asociaciones profesionales que evidencien que las mismas dan su aval o recomendación, gracias a que cuentan con evidencia científica, objetiva y fehaciente, que les permite avalar, aprobar recomendar o certificar las cualidades o propiedades del producto o servicio, o cualquier otro requisito señalado en las leyes aplicables para acreditar las mismas.",
    },
    SummaryRow {
        title: "Información y publicidad/precio",
        description: "El proveedor debe demostrar que se comunicó a los consumidores, por medios impresos, físicos o digitales, el Precio del inmueble en operaciones de contado. El precio de venta del inmueble debe ofertarse en moneda nacional, sin perjuicio de que pueda ser expresado también en moneda extranjera; de ser el caso, se estará al tipo de cambio que rija en el lugar y fecha en el momento en el que se realice el pago, de conformidad con la legislación aplicable. En operaciones de crédito, el proveedor debe demostrar que se comunicó a los consumidores, por medios impresos, físicos o digitales que el precio total se determinará en función de los montos variables de conceptos de crédito y notariales que deben ser consultados with los promotores.",
    },
    SummaryRow {
        title: "Información y publicidad/ofertas y promociones",
        description: "En caso de contar con ofertas y promociones, el proveedor debe demostrar que en las mismas se informó por medios impresos, físicos o digitales a los consumidores: la vigencia o, en su caso, el volumen de inmuebles ofrecidos.",
    },
    SummaryRow {
        title: "Información y publicidad/Requisitos de proyecto Ejecutivo, maqueta",
        description: "El proveedor debe acreditar que cuenta con representación física o virtual (es decir, por medios ópticos, digitales o electrónicos), a disposición de los consumidores, que tiene por objeto mostrar las características generales, distribución y dimensiones de la vivienda objeto de la compraventa y, en su caso, el desarrollo habitacional en donde se encuentre éste, en términos del artículo 34 del RLFPC.",
    },
    SummaryRow {
        title: "Información y publicidad/Informaión del inmueble",
        description: "El proveedor debe demostrar que puso a disposición del consumidor los planos estructurales, arquitectónicos y de instalaciones, o, en su defecto, un dictamen de las condiciones estructurales del inmueble, avalados por perito responsable o corresponsables, ya sea físicamente o por cualquier medio óptico o electrónico o en su caso, señalar expresamente las causas por las que no cuenta con ellos, así como el plazo en el que tendrá dicha documentación.",
    },
    SummaryRow {
        title: "Información y publicidad/Protección civil",
        description: "El proveedor debe demostrar a la Unidad de inspección que cuenta con un Programa de Protección Civil del inmueble y que el mismo fue puesto a disposición de los consumidores, ya sea por medios impresos, físicos o digitales.",
    },
    SummaryRow {
        title: "Información y publicidad/Acabados",
        description: "El proveedor debe demostrar a la unidad de inspección, conforme a lo previsto por el numeral 5.6.6 la forma en la que se informa a los consumidores sobre los acabados con los que contará el inmueble, ya sea que se encuentren en la información y publicidad sobre las viviendas que comercializa, especificados como tales en el inmueble muestra o, en su caso, con los pactados con el consumidor, los cuales deben estar descritos en el contrato respectivo.",
    },
    SummaryRow {
        title: "Información y publicidad/Promotores",
        description: "El proveedor debe demostrar a la Unidad de Inspección que sus promotores están obligados a utilizar la credencial expedida por el proveedor, o bien, por el concesionario de ventas que contenga de manera visible su nombre completo, logo del concesionario en su caso, logo del proveedor, cargo, vigencia de la identificación y un número de atención de quejas.",
    },
    SummaryRow {
        title: "Contrato de adhesión",
        description: "Para demostrar que el modelo de contrato de adhesión cumple con lo previsto en el capítulo 6 de la NOM-247-SE-2021, el proveedor debe proporcionar a la Unidad de Inspección que el mismo ha sido registrado ante la PROFECO.",
    },
    SummaryRow {
        title: "Garantías",
        description: "El proveedor debe presentar a la Unidad de Inspección la garantía ofrecida a los consumidores de acuerdo a lo previsto por el capítulo 7 de la NOM-247-SE-2021, acompañando evidencia que demuestre que es informada a los consumidores de manera impresa, física o digital",
    },
    SummaryRow {
        title: "Servicios adicionales",
        description: "El proveedor debe presentar a la Unidad de Inspección evidencia que demuestre que notificó a los consumidores de manera impresa, física o digital sobre los servicios adicionales, cuando los hubiera en los términos previstos por el capítulo 8 de la NOM-247-SE-2024.",
    },
    SummaryRow {
        title: "Escrituración y notarios",
        description: "Documentos válidos para acreditar la propiedad del inmueble. El proveedor debe acreditar la propiedad del inmueble mediante los siguientes documentos: I. Escritura pública otorgada por un notario público debidamente inscrita en el Registro Público de la Propiedad; tratándose de bienes inmuebles sujetos al régimen de propiedad en condominio, escritura pública donde conste la constitución de este régimen; o II. En los casos que proceda, mediante contrato privado, una vez que las firmas hayan sido ratificadas ante un fedatario o autoridad administrativa y esté debidamente inscrito en el Registro Público de la Propiedad. Una vez que se autorice el crédito a favor del consumidor o que se acuerde la firma en operaciones de contado, el proveedor debe demostrar de forma física o digital o electrónica, que proporcionó al Notario los documentos e información necesarios para llevar a cabo la escrituración de la enajenación del inmueble en favor del consumidor o, en su caso, las razones por las cuales aún no se ha llevado a cabo.",
    },
    SummaryRow {
        title: "Bonificación",
        description: "El proveedor debe demostrar a través de evidencia documental que en los casos previstos por el capítulo 8 de la NOM-247-SE-2024, ha llevado a cabo la bonificación en los porcentajes y términos previstos para cada caso en dicho capítulo, cuando hubiese casos en los que haya procedido dicha bonificación.",
    },
    SummaryRow {
        title: "Viviendas de interés social",
        description: "El proveedor cuando utilice las imágenes y marcas de las ONAVIS, para la comercialización de sus viviendas, debe demostrar que cuenta con autorización expresa de dichas instituciones, o que cumple con las reglas generales que en su caso se expidan, de conformidad con lo dispuesto por dichas Reglas Generales. No se considera incumplimiento cuando la alusión autorizada a las ONAVIS se haga, especificando que se puede acceder al financiamiento o esquema crediticio de los mismos. Para los créditos expedidos por el INFONAVIT, FOVISSSTE o algún otro organismo público, es importante que el proveedor demuestre que exhibe y/o proporciona a los consumidores, por medios físicos o digitales información respecto de que el trabajador podrá tramitar su crédito directamente en dichas instituciones a través de los medios que estén disponibles para ello, o bien, que informó al consumidor si el mismo podrá solicitar al proveedor dicho trámite de manera gratuita. En virtud de lo anterior, el proveedor debe demostrar que proporcionó al consumidor, por medios físicos o digitales, los datos de las oficinas y direcciones electrónicas de las páginas web institucionales o a través de asesores certificados por las instituciones.",
    },
    SummaryRow {
        title: "Privacidad",
        description: "El proveedor debe presentar el aviso de privacidad, legible y visible para los consumidores en su establecimiento físico y, en su caso, a través de cualquier otro medio físico, impreso o digital, incluyendo de forma enunciativa y no limitativa a través de: la página de Internet o comunicaciones electrónicas, a través de su texto completo o liga que lleve al mismo, medios ópticos o auditivos o por cualquier otra tecnología.",
    },
];


/// Closing disclaimer block of the summary dictamen.
pub static DISCLAIMERS: [&str; 6] = [
    "* MET-TIME S.A DE C.V. verifica los requisitos de la información comercial y la publicidad de bienes inmuebles destinados a casa habitación y elementos mínimos que debe contener los contratos relacionados.",
    "* El presente dictamen de inspección avala que las pruebas realizadas a los objetos descritos, se efectuaron de acuerdo a las especificaciones establecidas en la Norma Oficial Mexicana NOM-247-SE-2021, Prácticas Comerciales- requisitos de la información comercial y la publicidad de bienes inmuebles destinados a casa habitación y elementos mínimos que deben contener los contratos relacionados, publicada en el Diario Oficial de la Federación el día 22 de marzo del 2022 y al procedimiento de inspección código MT-IC-PTO-001 de este Organismo de Inspección.",
    "*Toda la información derivada de la presente inspección, es manejada en todo momento de manera confidencial por personal de ésta empresa.",
    "*Queda prohibida la reproducción total o parcial del presente dictamen sin la autorización de este Organismo de Inspección.",
    "*Este organismo de inspección no se hace responsable si los instrumentos verificados en dicho dictamen son alterados.",
    "*La presente solicitud de inspección tiene una vigencia de 25 días naturales a partir de la fecha que fue emitida por la unidad de inspección",
];


#[cfg(test)]
mod tests {
    use super::*;

    fn item(choice: Option<Choice>) -> ChecklistItem {
        ChecklistItem { status: choice, observation: String::new(), evidence: vec![] }
    }

    fn minimal_report(portal: Option<Gate>, office: Option<Gate>) -> EvidenceReport {
        EvidenceReport {
            case_number: "MT-IC-001".into(),
            date: "2025-06-12".into(),
            start_time: TimeOfDay { hh: "9".into(), mm: "30".into(), meridiem: Meridiem::Am },
            end_time: TimeOfDay { hh: "11".into(), mm: "00".into(), meridiem: Meridiem::Am },
            owner: OwnerName { first_names: "Ana".into(), last_names: "Gómez".into() },
            address: Address {
                street: "Av. Central 111".into(),
                neighborhood: "Centro".into(),
                municipality: "Aguascalientes".into(),
                state: "Aguascalientes".into(),
                postal_code: "20296".into(),
            },
            business_line: "Inmobiliaria".into(),
            rfc: "GOA890123AB1".into(),
            inspection_type: "Inicial".into(),
            channels: vec![item(Some(Choice::Complies)); 3],
            deposit_items: vec![item(Some(Choice::Complies)); 5],
            portal: PortalSection { has_portal: portal, evaluation: item(None) },
            portal_items: vec![item(None); 6],
            office: OfficeSection { has_office: office, general: item(None) },
            office_items: vec![item(None); 6],
        }
    }

    #[test]
    fn test_sections_follow_snapshot_order() {
        let template = evidence_template(&minimal_report(Some(Gate::No), Some(Gate::No)));
        let headers: Vec<&str> = template
            .sections
            .iter()
            .filter_map(|s| match s {
                Section::Header { title } => Some(title.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headers,
            vec![
                "Datos del dictamen",
                "P2: Canales y evidencias",
                "P3: Información y portal",
                "P4: Oficina física",
                "P5: Anticipo",
            ]
        );
    }

    #[test]
    fn test_negative_gate_renders_gate_row_only() {
        let template = evidence_template(&minimal_report(Some(Gate::No), Some(Gate::No)));
        let tables = template
            .sections
            .iter()
            .filter(|s| matches!(s, Section::OptionTable { .. }))
            .count();
        // 3 channel + 5 deposit requirements; nothing from the gated blocks.
        assert_eq!(tables, 8);
        assert!(template.sections.iter().any(|s| matches!(
            s,
            Section::KeyValue { label, value } if label == "¿Tiene portal?" && value == "NO"
        )));
    }

    #[test]
    fn test_affirmative_gate_expands_sub_items() {
        let template = evidence_template(&minimal_report(Some(Gate::Si), Some(Gate::No)));
        let tables = template
            .sections
            .iter()
            .filter(|s| matches!(s, Section::OptionTable { .. }))
            .count();
        // 8 + portal evaluation + 6 portal items.
        assert_eq!(tables, 15);
    }

    #[test]
    fn test_summary_catalog_is_complete() {
        assert_eq!(SUMMARY_ROWS.len(), 25);
        for row in &SUMMARY_ROWS {
            assert!(!row.title.is_empty());
            assert!(!row.description.is_empty());
        }
    }

    #[test]
    fn test_certificate_tree_splits_into_two_pages() {
        let data = CertificateData {
            provider_name: "Inmobiliaria Sol".into(),
            provider_address: "Av. Norte 5".into(),
            folio: "F-77".into(),
            issue_date: "2025-06-12".into(),
            issue_place: "Aguascalientes, Ags.".into(),
            inspector: "J. Pérez".into(),
        };
        let tree = certificate_tree(&data, None);
        fn count_dividers(node: &VisualNode) -> usize {
            match node {
                VisualNode::Divider => 1,
                VisualNode::Block { children, .. } => children.iter().map(count_dividers).sum(),
                _ => 0,
            }
        }
        assert_eq!(count_dividers(&tree), 1);
    }
}
