//! Pipeline tests over plain-text editais.
//!
//! Fixtures in `test_fixtures/` are small but realistic notices:
//!
//! - `pregao_registro_precos.txt`: price registration, ME/EPP preference,
//!   PNCP deadlines that satisfy the minimums
//! - `concorrencia_sem_registro.txt`: explicit negations, confidential
//!   budget, PNCP deadline below the minimum
//!
//! Assertions target the boundaries: the outline, the field map, and the
//! rule outcomes. Individual pattern behavior is covered by unit tests.

use edital_core::observer::{ExtractionObserver, PipelineEvent};
use edital_core::structure::compare_dotted_path;
use edital_core::*;
use serde_json::Value;
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ============================================================================
// Fixture helpers
// ============================================================================

const SRP_FIXTURE: &str = "pregao_registro_precos.txt";
const NEGATED_FIXTURE: &str = "concorrencia_sem_registro.txt";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures")
}

fn load_edital(fixture_name: &str) -> String {
    let path = fixtures_dir().join(fixture_name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Missing fixture: {}", path.display()))
}

fn processor() -> ChecklistProcessor {
    ChecklistProcessor::default().with_observer(Arc::new(NoopObserver))
}

fn run(fixture_name: &str) -> ChecklistReport {
    processor().process(&load_edital(fixture_name), None)
}

fn outcome<'a>(report: &'a ChecklistReport, id: &str) -> Option<&'a RuleOutcome> {
    report.outcomes.iter().find(|o| o.id == id)
}

/// Collects suppression reasons per field.
#[derive(Default)]
struct SuppressionRecorder {
    suppressed: Mutex<Vec<(Field, String)>>,
}

impl ExtractionObserver for SuppressionRecorder {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        if let PipelineEvent::FindingSuppressed { field, reason, .. } = event {
            self.suppressed
                .lock()
                .unwrap()
                .push((*field, reason.to_string()));
        }
    }
}

// ============================================================================
// Structure: outline recovered from the text
// ============================================================================

mod outline {
    use super::*;

    #[test]
    fn sections_sorted_by_dotted_path() {
        let sections = index(&load_edital(SRP_FIXTURE));
        assert!(!sections.is_empty());
        for pair in sections.windows(2) {
            assert_ne!(
                compare_dotted_path(&pair[0].number, &pair[1].number),
                Ordering::Greater,
                "{} sorted after {}",
                pair[0].number,
                pair[1].number
            );
        }
    }

    #[test]
    fn table_of_contents_lines_are_not_headings() {
        let sections = index(&load_edital(SRP_FIXTURE));
        let top_level: Vec<&str> = sections
            .iter()
            .filter(|s| s.level == 1)
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(
            top_level,
            vec![
                "DO OBJETO",
                "DO REGISTRO DE PREÇOS",
                "DA PARTICIPAÇÃO NA LICITAÇÃO",
                "DA ETAPA DE LANCES",
                "DOS RECURSOS",
                "DAS DISPOSIÇÕES GERAIS",
            ]
        );
    }

    #[test]
    fn parent_content_holds_children() {
        let sections = index(&load_edital(SRP_FIXTURE));
        let publication = sections.iter().find(|s| s.number == "2").unwrap();
        assert!(publication.content.contains("intenção de registro de preços"));
        assert!(!publication.content.contains("DA PARTICIPAÇÃO NA LICITAÇÃO"));
    }

    #[test]
    fn supplied_outline_used_as_is() {
        let supplied = vec![Section::new("1", "CAPA", "Pregão eletrônico")];
        let report = processor().process(&load_edital(SRP_FIXTURE), Some(supplied.clone()));
        assert_eq!(report.sections, supplied);
    }
}

// ============================================================================
// Extraction: price registration edital
// ============================================================================

mod price_registration_edital {
    use super::*;

    #[test]
    fn core_fields() {
        let report = run(SRP_FIXTURE);
        let fields = &report.fields;

        assert_eq!(fields.get(Field::RegistroPreco), Some("sim"));
        assert_eq!(fields.get(Field::CriterioJulgamento), Some("menor-preco"));
        assert_eq!(fields.get(Field::FormaObjeto), Some("por-item"));
        assert_eq!(fields.get(Field::ModoDisputa), Some("aberto"));
        assert_eq!(fields.get(Field::IntervaloMinimo), Some("R$ 0.50"));
        assert_eq!(fields.get(Field::ValorLicitacao), Some("48750.00"));
    }

    #[test]
    fn pncp_fields() {
        let fields = run(SRP_FIXTURE).fields;

        assert_eq!(fields.get(Field::PncpPublicacao), Some("sim"));
        assert_eq!(fields.get(Field::PncpPrazo), Some("8"));
        assert_eq!(fields.get(Field::PncpIntencao), Some("sim"));
        assert_eq!(fields.get(Field::PncpPrazoIntencao), Some("8"));
        assert_eq!(fields.get(Field::PrazoRecursal), Some("3"));
    }

    #[test]
    fn small_business_and_participation() {
        let fields = run(SRP_FIXTURE).fields;

        assert_eq!(fields.get(Field::PreferenciaMe), Some("sim"));
        assert_eq!(fields.get(Field::ExclusivaMe), Some("sim"));
        assert_eq!(fields.get(Field::CriterioDesempateMe), Some("sim"));
        assert!(!fields.contains(Field::Cota25Me));
        assert_eq!(fields.get(Field::Cooperativas), Some("permitido"));
        assert_eq!(fields.get(Field::Consorcio), Some("vedado"));
    }

    #[test]
    fn outcomes() {
        let report = run(SRP_FIXTURE);

        let registration = outcome(&report, "rule-4").unwrap();
        assert_eq!(registration.status, RuleStatus::Ok);
        assert_eq!(registration.message, "Licitação para registro de preços");

        assert_eq!(outcome(&report, "rule-5").unwrap().status, RuleStatus::Ok);
        assert_eq!(outcome(&report, "rule-26").unwrap().status, RuleStatus::Ok);
        assert_eq!(outcome(&report, "rule-27").unwrap().status, RuleStatus::Ok);
    }

    #[test]
    fn pncp_outcome_points_at_section() {
        let report = run(SRP_FIXTURE);
        let deadline = outcome(&report, "rule-26").unwrap();
        let section = deadline.source.as_ref().expect("deadline attributed");
        assert!(section.number.starts_with('6'), "got {}", section.number);

        let source = report
            .sources
            .iter()
            .find(|s| s.field == Field::PncpPrazo)
            .unwrap();
        assert!(source.snippet.contains("8 (oito) dias úteis"));
        assert!(source.context.len() >= source.snippet.len());
    }
}

// ============================================================================
// Extraction: explicit negations and secrecy
// ============================================================================

mod negated_edital {
    use super::*;

    #[test]
    fn negation_beats_later_positive_phrase() {
        let report = run(NEGATED_FIXTURE);
        assert_eq!(report.fields.get(Field::RegistroPreco), Some("nao"));

        let registration = outcome(&report, "rule-4").unwrap();
        assert_eq!(registration.message, "Licitação NÃO é para registro de preços");
        assert!(outcome(&report, "rule-5").is_none());
        assert!(outcome(&report, "rule-6").is_none());
    }

    #[test]
    fn negated_preference_clears_every_benefit() {
        let fields = run(NEGATED_FIXTURE).fields;
        for field in [
            Field::PreferenciaMe,
            Field::ExclusivaMe,
            Field::Cota25Me,
            Field::CriterioDesempateMe,
        ] {
            assert_eq!(fields.get(field), Some("nao"), "{field}");
        }
    }

    #[test]
    fn judgment_fields() {
        let fields = run(NEGATED_FIXTURE).fields;
        assert_eq!(fields.get(Field::CriterioJulgamento), Some("maior-desconto"));
        assert_eq!(fields.get(Field::ModoDisputa), Some("aberto-fechado"));
        assert_eq!(fields.get(Field::ClassePrazo), Some("sce"));
        assert!(!fields.contains(Field::FormaObjeto));
    }

    #[test]
    fn confidential_value_withheld() {
        let fields = run(NEGATED_FIXTURE).fields;
        assert_eq!(fields.get(Field::OrcamentoSigiloso), Some("sim"));
        assert_eq!(fields.get(Field::OrcamentoPublico), Some("nao"));
        assert!(!fields.contains(Field::ValorLicitacao));
    }

    #[test]
    fn guarantee_and_optional_visit() {
        let report = run(NEGATED_FIXTURE);
        assert_eq!(report.fields.get(Field::GarantiaContratual), Some("5"));
        assert_eq!(report.fields.get(Field::Visita), Some("sim"));
        assert_eq!(report.fields.get(Field::VisitaObrigatoria), Some("nao"));

        let visit = outcome(&report, "rule-20").unwrap();
        assert_eq!(visit.title, "Vistoria Prévia Facultativa");
    }

    #[test]
    fn short_pncp_deadline_warns() {
        let report = run(NEGATED_FIXTURE);
        assert_eq!(report.fields.get(Field::PncpPrazo), Some("5"));

        let deadline = outcome(&report, "rule-26").unwrap();
        assert_eq!(deadline.status, RuleStatus::Warning);
        assert_eq!(
            deadline.message,
            "Prazo de 5 dias inferior ao mínimo de 8 dias úteis"
        );
    }
}

// ============================================================================
// Table-of-contents suppression
// ============================================================================

mod table_of_contents {
    use super::*;

    const SUMMARY_ONLY: &str = "SUMÁRIO\n\
        1. DO OBJETO 3\n\
        2. DA ATA DE REGISTRO DE PREÇOS 4\n\
        3. DA HABILITAÇÃO 6\n\
        \n\
        1. DO OBJETO\n\
        1.1. Aquisição de cadeiras giratórias para o auditório da sede administrativa.\n";

    #[test]
    fn summary_mention_is_not_evidence() {
        let recorder = Arc::new(SuppressionRecorder::default());
        let report = ChecklistProcessor::default()
            .with_observer(recorder.clone())
            .process(SUMMARY_ONLY, None);

        assert_eq!(report.fields.get(Field::RegistroPreco), Some("nao"));
        let suppressed = recorder.suppressed.lock().unwrap();
        assert!(suppressed
            .iter()
            .any(|(field, reason)| *field == Field::RegistroPreco
                && reason.starts_with("table of contents")));
    }

    #[test]
    fn same_phrase_in_body_counts() {
        let body = "1. DO OBJETO\n\
            1.1. Aquisição de cadeiras giratórias para o auditório da sede administrativa.\n\
            1.2. A ata de registro de preços terá validade de um ano.\n";
        let fields = extract(body, &[]).fields;
        assert_eq!(fields.get(Field::RegistroPreco), Some("sim"));
    }
}

// ============================================================================
// End to end: text in, checklist out
// ============================================================================

mod end_to_end {
    use super::*;

    const EDITAL: &str = "1. DO OBJETO\n\
        1.1. Aquisição de materiais por meio de SISTEMA DE REGISTRO DE PREÇOS para contratações futuras.\n\
        2. DO JULGAMENTO\n\
        2.1. CRITÉRIO DE JULGAMENTO: menor preço.\n\
        3. DA PUBLICIDADE\n\
        3.1. A publicação no PNCP observará o prazo mínimo de 8 (oito) dias úteis.\n";

    #[test]
    fn minimal_srp_edital() {
        let report = processor().process(EDITAL, None);

        assert_eq!(report.fields.get(Field::RegistroPreco), Some("sim"));
        assert_eq!(report.fields.get(Field::CriterioJulgamento), Some("menor-preco"));
        assert_eq!(report.fields.get(Field::PncpPublicacao), Some("sim"));
        assert_eq!(report.fields.get(Field::PncpPrazo), Some("8"));

        let deadline = outcome(&report, "rule-26").unwrap();
        assert_eq!(deadline.status, RuleStatus::Ok);
        assert_eq!(deadline.message, "Prazo de 8 dias adequado");
        assert_eq!(outcome(&report, "rule-4").unwrap().status, RuleStatus::Ok);
    }

    #[test]
    fn empty_text_yields_empty_fields() {
        let report = processor().process("   \n", None);
        assert!(report.sections.is_empty());
        assert!(report.fields.is_empty());
        assert!(report.sources.is_empty());
        assert_eq!(report.outcomes, evaluate(&FieldMap::new()));
    }

    #[test]
    fn processing_is_idempotent() {
        let text = load_edital(SRP_FIXTURE);
        let first = processor().process(&text, None);
        let second = processor().process(&text, None);

        assert_eq!(first.sections, second.sections);
        assert_eq!(first.fields, second.fields);
        assert_eq!(first.sources, second.sources);
        assert_eq!(first.outcomes, second.outcomes);
        assert_eq!(first.document_fingerprint, second.document_fingerprint);
    }

    #[test]
    fn disabled_rule_leaves_field_undetermined() {
        let yaml = "pipeline:\n  rules:\n    - name: PriceRegistration\n      enabled: false\n    - name: JudgmentCriterion\n";
        let config: ExtractionConfig = serde_yaml::from_str(yaml).unwrap();
        let report = ChecklistProcessor::new(config)
            .with_observer(Arc::new(NoopObserver))
            .process(EDITAL, None);

        assert!(!report.fields.contains(Field::RegistroPreco));
        assert_eq!(report.fields.get(Field::CriterioJulgamento), Some("menor-preco"));
        assert!(outcome(&report, "rule-4").is_none());
    }
}

// ============================================================================
// Serialization: export, import, report rendering
// ============================================================================

mod serialization {
    use super::*;

    #[test]
    fn exported_fields_reimport_to_same_outcomes() {
        let report = run(SRP_FIXTURE);
        let json = to_json(&report.fields).unwrap();
        let imported = from_json(&json).unwrap();

        assert_eq!(imported, report.fields);
        assert_eq!(
            processor().evaluate_fields(&imported),
            evaluate(&report.fields)
        );
    }

    #[test]
    fn report_json_shape() {
        let report = run(NEGATED_FIXTURE);
        let value: Value = serde_json::from_str(&report.render("report").unwrap()).unwrap();

        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["extraction_method"], "pattern");
        assert!(value["generated_at"].is_string());
        assert_eq!(value["document_fingerprint"].as_str().unwrap().len(), 64);
        assert_eq!(value["fields"]["registroPreco"], "nao");
        assert!(value["sections"].is_array());
        assert!(value.get("warning").is_none());
        assert_eq!(
            value["summary"]["warnings"].as_u64().unwrap() as usize,
            report.outcomes.iter().filter(|o| o.is_warning()).count()
        );
    }

    #[test]
    fn checklist_and_fields_formats() {
        let report = run(SRP_FIXTURE);

        let checklist: Value = serde_json::from_str(&report.render("checklist").unwrap()).unwrap();
        let outcomes = checklist.as_array().unwrap();
        assert_eq!(outcomes.len(), report.outcomes.len());
        assert!(outcomes.iter().all(|o| o["id"].is_string() && o["status"].is_string()));

        let fields: Value = serde_json::from_str(&report.render("fields").unwrap()).unwrap();
        assert_eq!(fields["pncpPrazo"], "8");
        assert_eq!(fields.as_object().unwrap().len(), report.fields.len());
    }

    #[test]
    fn unknown_format_falls_back_to_report() {
        let report = run(SRP_FIXTURE);
        assert_eq!(
            report.render("xml").unwrap(),
            report.render("report").unwrap()
        );
    }
}
