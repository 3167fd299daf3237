use super::{categorize, Category};
use crate::extraction::context::ExtractionContext;
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;
use std::sync::LazyLock;

static DEADLINE_CLASSES: LazyLock<Vec<Category>> = LazyLock::new(|| {
    vec![
        Category::new("sce", r"(?i:serviços\s+comuns\s+de\s+engenharia)|\bSCE\b"),
        Category::new(
            "bens",
            r"(?i)fornecimento\s+de\s+bens|aquisição\s+de\s+bens|compra\s+de\b",
        ),
        Category::new("servicos", r"(?i)(?:prestação|contratação)\s+de\s+serviços"),
    ]
});

static PNCP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bPNCP\b|Portal\s+Nacional\s+de\s+Contratações\s+Públicas").unwrap()
});

// "<n> (extenso) dias úteis" tail shared by the deadline patterns
const BUSINESS_DAYS: &str = r"(\d+)\s*(?:\([^)]*\)\s*)?dias?\s*úteis?";

static PNCP_DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:divulgação|publicação)\s+no\s+(?:Portal\s+Nacional\s+de\s+Contratações\s+Públicas\s*\()?PNCP.*?{BUSINESS_DAYS}"
    ))
    .unwrap()
});

static INTENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)inteiro\s+teor\s+no\s+PNCP|publicação\s+integral|intenção\s+de\s+registro\s+de\s+preços?[^.]{0,150}?PNCP|PNCP[^.]{0,150}?intenção\s+de\s+registro\s+de\s+preços?",
    )
    .unwrap()
});

static INTENTION_DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)intenção\s+de\s+registro\s+de\s+preços?.*?{BUSINESS_DAYS}"
    ))
    .unwrap()
});

// One char of the same sentence: a period only continues it inside a number
// ("14.133") or before a digit or lowercase word ("art. 165", "nº. do")
const SAME_SENTENCE: &str = r"(?:[^.\n]|\.\S|\.[ \t]+(?-i:[\d\p{Ll}]))";

static APPEAL_DEADLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)recurs\w*{SAME_SENTENCE}{{0,120}}?(\d+)\s*(?:\([^)]*\)\s*)?dias?\s+úteis|(\d+)\s*(?:\([^)]*\)\s*)?dias?\s+úteis{SAME_SENTENCE}{{0,120}}?recurs"
    ))
    .unwrap()
});

/// Object class that determines the minimum proposal deadlines.
pub struct DeadlineClass;

impl FieldRule for DeadlineClass {
    fn name(&self) -> &str {
        "DeadlineClass"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        categorize(ctx, Field::ClassePrazo, &DEADLINE_CLASSES)
    }
}

pub struct PncpPublication;

impl FieldRule for PncpPublication {
    fn name(&self) -> &str {
        "PncpPublication"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        PNCP.find(ctx.text)
            .map(|m| vec![Finding::assign(Field::PncpPublicacao, "sim", Some(m.as_str()))])
            .unwrap_or_default()
    }
}

pub struct PncpDeadline;

impl FieldRule for PncpDeadline {
    fn name(&self) -> &str {
        "PncpDeadline"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        PNCP_DEADLINE
            .captures(ctx.text)
            .map(|caps| vec![Finding::assign(Field::PncpPrazo, &caps[1], Some(&caps[0]))])
            .unwrap_or_default()
    }
}

/// Publication of the price-registration intention and its deadline.
pub struct PncpIntention;

impl FieldRule for PncpIntention {
    fn name(&self) -> &str {
        "PncpIntention"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let Some(statement) = INTENTION.find(ctx.text) else {
            return Vec::new();
        };

        let mut findings = vec![Finding::assign(
            Field::PncpIntencao,
            "sim",
            Some(statement.as_str()),
        )];
        if let Some(caps) = INTENTION_DEADLINE.captures(&ctx.text[statement.start()..]) {
            findings.push(Finding::assign(
                Field::PncpPrazoIntencao,
                &caps[1],
                Some(&caps[0]),
            ));
        }
        findings
    }
}

pub struct AppealDeadline;

impl FieldRule for AppealDeadline {
    fn name(&self) -> &str {
        "AppealDeadline"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let Some(caps) = APPEAL_DEADLINE.captures(ctx.text) else {
            return Vec::new();
        };
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|days| {
                vec![Finding::assign(
                    Field::PrazoRecursal,
                    days.as_str(),
                    Some(&caps[0]),
                )]
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::rules::test_support::{run, value_of};
    use crate::types::FieldMap;

    fn value(rule: &dyn FieldRule, text: &str, field: Field) -> Option<String> {
        value_of(&run(rule, text, &FieldMap::new()), field)
    }

    #[test]
    fn test_deadline_class() {
        assert_eq!(
            value(&DeadlineClass, "Contratação de serviços comuns de engenharia", Field::ClassePrazo)
                .as_deref(),
            Some("sce")
        );
        assert_eq!(
            value(&DeadlineClass, "Aquisição de bens de consumo", Field::ClassePrazo).as_deref(),
            Some("bens")
        );
        assert_eq!(
            value(&DeadlineClass, "Prestação de serviços de vigilância", Field::ClassePrazo)
                .as_deref(),
            Some("servicos")
        );
        // "sce" inside a word is not the acronym
        assert!(value(&DeadlineClass, "ascendente", Field::ClassePrazo).is_none());
    }

    #[test]
    fn test_pncp_deadline_with_written_number() {
        let text = "A divulgação no Portal Nacional de Contratações Públicas (PNCP) ocorrerá com antecedência mínima de 8 (oito) dias úteis.";
        assert_eq!(value(&PncpPublication, text, Field::PncpPublicacao).as_deref(), Some("sim"));
        assert_eq!(value(&PncpDeadline, text, Field::PncpPrazo).as_deref(), Some("8"));
    }

    #[test]
    fn test_pncp_absent() {
        let text = "Publicação no Diário Oficial com 10 dias úteis.";
        assert!(value(&PncpPublication, text, Field::PncpPublicacao).is_none());
        assert!(value(&PncpDeadline, text, Field::PncpPrazo).is_none());
    }

    #[test]
    fn test_intention_and_its_deadline() {
        let text = "A intenção de registro de preços foi divulgada no PNCP, pelo prazo de 8 (oito) dias úteis.";
        let findings = run(&PncpIntention, text, &FieldMap::new());
        assert_eq!(value_of(&findings, Field::PncpIntencao).as_deref(), Some("sim"));
        assert_eq!(value_of(&findings, Field::PncpPrazoIntencao).as_deref(), Some("8"));
    }

    #[test]
    fn test_appeal_deadline_either_order() {
        let text = "O prazo para interposição de recurso é de 3 (três) dias úteis.";
        assert_eq!(value(&AppealDeadline, text, Field::PrazoRecursal).as_deref(), Some("3"));

        let text = "No prazo de 3 dias úteis, o licitante poderá apresentar recurso.";
        assert_eq!(value(&AppealDeadline, text, Field::PrazoRecursal).as_deref(), Some("3"));
    }

    #[test]
    fn test_appeal_deadline_across_legal_citation() {
        let text = "5.1. O prazo para interposição de recurso, nos termos do art. 165 da Lei nº 14.133, será de 3 (três) dias úteis.\n";
        assert_eq!(value(&AppealDeadline, text, Field::PrazoRecursal).as_deref(), Some("3"));
    }

    #[test]
    fn test_appeal_deadline_stays_in_sentence() {
        let text = "Caberá recurso da decisão. A proposta terá validade de 60 dias úteis.";
        assert!(value(&AppealDeadline, text, Field::PrazoRecursal).is_none());

        let text = "Caberá recurso da decisão\n6.1. A entrega ocorrerá em 5 dias úteis.";
        assert!(value(&AppealDeadline, text, Field::PrazoRecursal).is_none());
    }
}
