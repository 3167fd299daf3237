use super::{categorize, first_category, Category};
use crate::extraction::context::{normalize_amount, ExtractionContext};
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;
use std::sync::LazyLock;

static OBJECT_FORMS: LazyLock<Vec<Category>> = LazyLock::new(|| {
    vec![
        Category::new("por-item", r"(?i)\bpor\s+item\b"),
        Category::new("por-grupo", r"(?i)\bpor\s+(?:grupo|lote)\b"),
        Category::new("global", r"(?i)adjudicação\s+global|\bglobal\b"),
    ]
});

static CRITERIA: LazyLock<Vec<Category>> = LazyLock::new(|| {
    vec![
        Category::new("menor-preco", r"(?i)menor\s+preço"),
        Category::new(
            "maior-desconto",
            r"(?i)maior\s+desconto|desconto\s+sobre|preço[-\s]base",
        ),
        Category::new("melhor-tecnica", r"(?i)melhor\s+técnica"),
        Category::new("tecnica-preco", r"(?i)técnica\s+e\s+preço"),
    ]
});

static BASE_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:preço[-\s]base|valor\s+de\s+referência)[^\n]{0,100}?R\$\s*(\d[\d.,]*)")
        .unwrap()
});

static SCOPES: LazyLock<Vec<Category>> = LazyLock::new(|| {
    vec![
        Category::new("item", r"(?i)(?:julgamento|escopo)\s+(?:será\s+)?por\s+item"),
        Category::new(
            "grupo",
            r"(?i)julgamento\s+(?:será\s+)?por\s+(?:grupo|lote)|escopo\s+por\s+grupo",
        ),
        Category::new("global", r"(?i)(?:julgamento|escopo)\s+(?:será\s+)?global"),
    ]
});

// Composite modes come first: "modo aberto e fechado" also reads as "modo aberto"
static DISPUTE_MODES: LazyLock<Vec<Category>> = LazyLock::new(|| {
    vec![
        Category::new("aberto-fechado", r"(?i)aberto\s+e\s+fechado|aberto\s*[-–]\s*fechado"),
        Category::new("fechado-aberto", r"(?i)fechado\s+e\s+aberto|fechado\s*[-–]\s*aberto"),
        Category::new(
            "aberto",
            r"(?i)modo\s+(?:de\s+disputa\s+)?(?:será\s+)?(?:o\s+)?aberto|disputa\s+aberta",
        ),
        Category::new(
            "fechado",
            r"(?i)modo\s+(?:de\s+disputa\s+)?(?:será\s+)?(?:o\s+)?fechado|disputa\s+fechada",
        ),
    ]
});

static BID_INTERVAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)intervalo\s+mínimo\s+(?:de\s+diferença\s+de\s+valores|entre\s+(?:os\s+)?lances)[^.]{0,200}?(?:(R\$\s*[\d.,]*\d)|(\d+(?:,\d+)?)\s*%)",
    )
    .unwrap()
});

pub struct ObjectForm;

impl FieldRule for ObjectForm {
    fn name(&self) -> &str {
        "ObjectForm"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        categorize(ctx, Field::FormaObjeto, &OBJECT_FORMS)
    }
}

/// Judgment criterion; the discount branch also picks up the base price.
pub struct JudgmentCriterion;

impl FieldRule for JudgmentCriterion {
    fn name(&self) -> &str {
        "JudgmentCriterion"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let Some((category, evidence)) = first_category(ctx, &CRITERIA) else {
            return Vec::new();
        };

        let mut findings = vec![Finding::assign(
            Field::CriterioJulgamento,
            category.value,
            Some(&evidence),
        )];
        if category.value == "maior-desconto" {
            if let Some(caps) = BASE_PRICE.captures(ctx.text) {
                findings.push(Finding::assign(
                    Field::PrecoBase,
                    normalize_amount(&caps[1]),
                    Some(&caps[0]),
                ));
            }
        }
        findings
    }
}

pub struct JudgmentScope;

impl FieldRule for JudgmentScope {
    fn name(&self) -> &str {
        "JudgmentScope"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        categorize(ctx, Field::EscopoJulgamento, &SCOPES)
    }
}

pub struct DisputeMode;

impl FieldRule for DisputeMode {
    fn name(&self) -> &str {
        "DisputeMode"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        categorize(ctx, Field::ModoDisputa, &DISPUTE_MODES)
    }
}

/// Minimum difference between bids, either in reais or as a percentage.
pub struct MinimumBidInterval;

impl FieldRule for MinimumBidInterval {
    fn name(&self) -> &str {
        "MinimumBidInterval"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let Some(caps) = BID_INTERVAL.captures(ctx.text) else {
            return Vec::new();
        };

        let value = match (caps.get(1), caps.get(2)) {
            (Some(amount), _) => {
                let digits = amount.as_str().trim_start_matches("R$").trim();
                format!("R$ {}", normalize_amount(digits))
            }
            (None, Some(percent)) => format!("{}%", normalize_amount(percent.as_str())),
            (None, None) => return Vec::new(),
        };
        vec![Finding::assign(Field::IntervaloMinimo, value, Some(&caps[0]))]
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
    fn test_object_form_first_match() {
        let text = "A adjudicação será por item. O valor global estimado consta do anexo.";
        assert_eq!(value(&ObjectForm, text, Field::FormaObjeto).as_deref(), Some("por-item"));
        assert_eq!(
            value(&ObjectForm, "Licitação dividida por lote.", Field::FormaObjeto).as_deref(),
            Some("por-grupo")
        );
    }

    #[test]
    fn test_menor_preco() {
        let text = "CRITÉRIO DE JULGAMENTO: MENOR PREÇO por item";
        let findings = run(&JudgmentCriterion, text, &FieldMap::new());
        assert_eq!(
            value_of(&findings, Field::CriterioJulgamento).as_deref(),
            Some("menor-preco")
        );
        assert!(value_of(&findings, Field::PrecoBase).is_none());
    }

    #[test]
    fn test_maior_desconto_with_base_price() {
        let text = "Critério de julgamento: maior desconto sobre o preço-base de R$ 12.500,00 fixado no anexo.";
        let findings = run(&JudgmentCriterion, text, &FieldMap::new());
        assert_eq!(
            value_of(&findings, Field::CriterioJulgamento).as_deref(),
            Some("maior-desconto")
        );
        assert_eq!(value_of(&findings, Field::PrecoBase).as_deref(), Some("12500.00"));
    }

    #[test]
    fn test_technique_criteria() {
        assert_eq!(
            value(&JudgmentCriterion, "julgamento por melhor técnica", Field::CriterioJulgamento)
                .as_deref(),
            Some("melhor-tecnica")
        );
        assert_eq!(
            value(&JudgmentCriterion, "julgamento por técnica e preço", Field::CriterioJulgamento)
                .as_deref(),
            Some("tecnica-preco")
        );
    }

    #[test]
    fn test_judgment_scope() {
        assert_eq!(
            value(&JudgmentScope, "O julgamento será por lote.", Field::EscopoJulgamento).as_deref(),
            Some("grupo")
        );
        assert_eq!(
            value(&JudgmentScope, "Julgamento global.", Field::EscopoJulgamento).as_deref(),
            Some("global")
        );
    }

    #[test]
    fn test_composite_dispute_mode_wins() {
        let text = "Será adotado o modo de disputa aberto e fechado.";
        assert_eq!(
            value(&DisputeMode, text, Field::ModoDisputa).as_deref(),
            Some("aberto-fechado")
        );
        assert_eq!(
            value(&DisputeMode, "modo de disputa fechado-aberto", Field::ModoDisputa).as_deref(),
            Some("fechado-aberto")
        );
        assert_eq!(
            value(&DisputeMode, "O modo de disputa será o aberto.", Field::ModoDisputa).as_deref(),
            Some("aberto")
        );
    }

    #[test]
    fn test_bid_interval_amount_and_percent() {
        let text = "O intervalo mínimo de diferença de valores entre os lances será de R$ 1.000,00 (mil reais).";
        assert_eq!(
            value(&MinimumBidInterval, text, Field::IntervaloMinimo).as_deref(),
            Some("R$ 1000.00")
        );

        let text = "O intervalo mínimo entre lances corresponde a 0,5% do melhor lance.";
        assert_eq!(
            value(&MinimumBidInterval, text, Field::IntervaloMinimo).as_deref(),
            Some("0.5%")
        );
    }
}
