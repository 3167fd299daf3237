use crate::extraction::context::{has_negation, ExtractionContext};
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;
use std::sync::LazyLock;

static VISIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:visita|vistoria).*?(?:técnica|prévia|local)").unwrap()
});

static VISIT_DENIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)não\s+(?:haverá|será\s+exigida|será\s+necessária|se\s+aplica)").unwrap()
});

static MANDATORY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)obrigatóri[oa]|imprescindível").unwrap());

static OPTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)facultativ[oa]|opcional|não\s+(?:é\s+)?obrigatóri[oa]").unwrap());

// Declaration of full knowledge of the site, accepted in lieu of a visit
static SELF_DECLARATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)declaração[^.]{0,150}?conhecimento").unwrap());

static DEMONSTRATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:demonstração|prova\s+de\s+conceito)[^.]{0,150}?(?:obrigatóri[oa]|exigid[oa])",
    )
    .unwrap()
});

static SAMPLES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bamostras?\b").unwrap());

/// Technical site visit and whether it is mandatory.
pub struct SiteVisit;

impl FieldRule for SiteVisit {
    fn name(&self) -> &str {
        "SiteVisit"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let Some(m) = VISIT.find(ctx.text) else {
            return Vec::new();
        };
        let evidence = Some(m.as_str());
        let window = ctx.around(&m, ctx.windows.visit_window);

        if VISIT_DENIED.is_match(window) {
            return vec![Finding::assign(Field::Visita, "nao", evidence)];
        }

        let mut findings = vec![Finding::assign(Field::Visita, "sim", evidence)];
        let optional = OPTIONAL.is_match(window);
        let mandatory = if MANDATORY.is_match(window) && !optional && !has_negation(window) {
            Some("sim")
        } else if optional || SELF_DECLARATION.is_match(window) {
            Some("nao")
        } else {
            None
        };
        if let Some(value) = mandatory {
            findings.push(Finding::assign(Field::VisitaObrigatoria, value, evidence));
        }
        findings
    }
}

/// Proof of concept or product demonstration.
pub struct Demonstration;

impl FieldRule for Demonstration {
    fn name(&self) -> &str {
        "Demonstration"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for m in DEMONSTRATION.find_iter(ctx.text) {
            if ctx.negated_near(&m) {
                findings.push(Finding::suppressed(
                    Field::Demonstracao,
                    format!("negated: {}", m.as_str()),
                ));
                continue;
            }
            findings.push(Finding::assign(Field::Demonstracao, "sim", Some(m.as_str())));
            break;
        }
        findings
    }
}

pub struct Samples;

impl FieldRule for Samples {
    fn name(&self) -> &str {
        "Samples"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        SAMPLES
            .find(ctx.text)
            .map(|m| {
                let value = if ctx.negated_near(&m) { "nao" } else { "sim" };
                vec![Finding::assign(Field::Amostras, value, Some(m.as_str()))]
            })
            .unwrap_or_default()
    }
}
