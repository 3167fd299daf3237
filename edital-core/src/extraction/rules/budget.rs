use super::{first_category, Category};
use crate::extraction::context::{normalize_amount, ExtractionContext};
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;
use std::sync::LazyLock;

static ESTIMATED_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)valor\s+(?:total|estimado|da\s+contratação|da\s+licitação)[^\n]*?R\$\s*(\d[\d.,]*)",
    )
    .unwrap()
});

static CONFIDENTIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sigilos[oa]|confidencial|não\s+divulgad[oa]").unwrap());

static DISCLOSURE: LazyLock<Vec<Category>> = LazyLock::new(|| {
    vec![
        Category::new(
            "sigiloso",
            r"(?i)orçamento\s+(?:estimado\s+)?(?:será\s+)?sigiloso|caráter\s+sigiloso",
        ),
        Category::new(
            "publico",
            r"(?i)orçamento\s+(?:estimado\s+)?(?:será\s+)?público|divulgação\s+do\s+orçamento",
        ),
    ]
});

/// Estimated procurement value, unless the text around it marks it secret.
pub struct EstimatedValue;

impl FieldRule for EstimatedValue {
    fn name(&self) -> &str {
        "EstimatedValue"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for caps in ESTIMATED_VALUE.captures_iter(ctx.text) {
            let (Some(whole), Some(amount)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if CONFIDENTIAL.is_match(ctx.around(&whole, ctx.windows.confidentiality_window)) {
                findings.push(Finding::suppressed(
                    Field::ValorLicitacao,
                    format!("confidential amount: {}", whole.as_str()),
                ));
                continue;
            }
            findings.push(Finding::assign(
                Field::ValorLicitacao,
                normalize_amount(amount.as_str()),
                Some(whole.as_str()),
            ));
            break;
        }
        findings
    }
}

pub struct BudgetConfidentiality;

impl FieldRule for BudgetConfidentiality {
    fn name(&self) -> &str {
        "BudgetConfidentiality"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let Some((category, evidence)) = first_category(ctx, &DISCLOSURE) else {
            return Vec::new();
        };
        let secret = category.value == "sigiloso";
        let yes_no = |flag: bool| if flag { "sim" } else { "nao" };
        vec![
            Finding::assign(Field::OrcamentoSigiloso, yes_no(secret), Some(&evidence)),
            Finding::assign(Field::OrcamentoPublico, yes_no(!secret), Some(&evidence)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::rules::test_support::{run, value_of};
    use crate::types::FieldMap;

    #[test]
    fn test_estimated_value_normalized() {
        let text = "VALOR TOTAL DA CONTRATAÇÃO: R$ 1.234.567,89 (um milhão...)";
        let findings = run(&EstimatedValue, text, &FieldMap::new());
        assert_eq!(
            value_of(&findings, Field::ValorLicitacao).as_deref(),
            Some("1234567.89")
        );
    }

    #[test]
    fn test_estimated_value_far_along_the_line() {
        let text = "O valor estimado para a aquisição dos itens, considerados os quantitativos do Termo de Referência e a pesquisa de preços realizada, é de R$ 48.750,00.";
        let findings = run(&EstimatedValue, text, &FieldMap::new());
        assert_eq!(value_of(&findings, Field::ValorLicitacao).as_deref(), Some("48750.00"));
    }

    #[test]
    fn test_estimated_value_does_not_cross_lines() {
        let text = "Valor estimado: ver anexo\nGarantia de R$ 5.000,00";
        let findings = run(&EstimatedValue, text, &FieldMap::new());
        assert!(value_of(&findings, Field::ValorLicitacao).is_none());
    }

    #[test]
    fn test_confidential_value_suppressed() {
        let text = "O valor estimado da contratação é de R$ 50.000,00, mantido em caráter sigiloso até o julgamento.";
        let findings = run(&EstimatedValue, text, &FieldMap::new());
        assert!(value_of(&findings, Field::ValorLicitacao).is_none());
        assert!(matches!(findings[0], Finding::Suppressed { .. }));
    }

    #[test]
    fn test_later_public_value_after_suppressed_one() {
        let filler = "x".repeat(300);
        let text = format!(
            "Valor estimado: R$ 10,00, sigiloso.\n{filler}\nValor total: R$ 20,00."
        );
        let findings = run(&EstimatedValue, &text, &FieldMap::new());
        assert_eq!(value_of(&findings, Field::ValorLicitacao).as_deref(), Some("20.00"));
    }

    #[test]
    fn test_budget_confidentiality_sets_both_fields() {
        let findings = run(
            &BudgetConfidentiality,
            "O orçamento estimado será sigiloso.",
            &FieldMap::new(),
        );
        assert_eq!(value_of(&findings, Field::OrcamentoSigiloso).as_deref(), Some("sim"));
        assert_eq!(value_of(&findings, Field::OrcamentoPublico).as_deref(), Some("nao"));

        let findings = run(
            &BudgetConfidentiality,
            "Haverá divulgação do orçamento no sistema.",
            &FieldMap::new(),
        );
        assert_eq!(value_of(&findings, Field::OrcamentoPublico).as_deref(), Some("sim"));
        assert_eq!(value_of(&findings, Field::OrcamentoSigiloso).as_deref(), Some("nao"));
    }
}
