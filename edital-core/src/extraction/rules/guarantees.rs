use crate::extraction::context::{normalize_amount, ExtractionContext};
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;
use std::sync::LazyLock;

static NO_CONTRACT_GUARANTEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)não\s+haverá\s+exigência.*?garantia.*?contratual|não\s+será\s+exigida\s+garantia\s+(?:da\s+)?contratua",
    )
    .unwrap()
});

static CONTRACT_GUARANTEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)garantia\s+(?:(?:da|de)\s+)?(?:execução\s+)?contratual.*?(\d+(?:,\d+)?)\s*%")
        .unwrap()
});

static BID_GUARANTEE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)garantia.*?(?:participação|proposta).*?(\d+(?:,\d+)?)\s*%").unwrap()
});

/// Contract performance guarantee, as a percentage of the contract value.
pub struct ContractGuarantee;

impl FieldRule for ContractGuarantee {
    fn name(&self) -> &str {
        "ContractGuarantee"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        if let Some(m) = NO_CONTRACT_GUARANTEE.find(ctx.text) {
            return vec![Finding::assign(Field::GarantiaContratual, "0", Some(m.as_str()))];
        }
        first_percentage(ctx, &CONTRACT_GUARANTEE, Field::GarantiaContratual)
    }
}

/// Bid guarantee, as a percentage of the estimated value.
pub struct BidGuarantee;

impl FieldRule for BidGuarantee {
    fn name(&self) -> &str {
        "BidGuarantee"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        first_percentage(ctx, &BID_GUARANTEE, Field::GarantiaParticipacao)
    }
}

fn first_percentage(ctx: &ExtractionContext<'_>, pattern: &Regex, field: Field) -> Vec<Finding> {
    let mut findings = Vec::new();
    for caps in pattern.captures_iter(ctx.text) {
        let (Some(whole), Some(percent)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if ctx.negated_near(&whole) {
            findings.push(Finding::suppressed(field, format!("negated: {}", whole.as_str())));
            continue;
        }
        findings.push(Finding::assign(
            field,
            normalize_amount(percent.as_str()),
            Some(whole.as_str()),
        ));
        break;
    }
    findings
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
    fn test_contract_guarantee_percentage() {
        let text = "Será exigida garantia de execução contratual de 5% do valor do contrato.";
        assert_eq!(
            value(&ContractGuarantee, text, Field::GarantiaContratual).as_deref(),
            Some("5")
        );
    }

    #[test]
    fn test_contract_guarantee_waived() {
        let text = "Não haverá exigência de garantia contratual da execução.";
        assert_eq!(
            value(&ContractGuarantee, text, Field::GarantiaContratual).as_deref(),
            Some("0")
        );
    }

    #[test]
    fn test_bid_guarantee_decimal() {
        let text = "A garantia de participação será de 0,5% do valor estimado.";
        assert_eq!(
            value(&BidGuarantee, text, Field::GarantiaParticipacao).as_deref(),
            Some("0.5")
        );
    }

    #[test]
    fn test_negated_bid_guarantee_is_suppressed() {
        let text = "Não será exigida garantia de proposta de 1% nesta licitação.";
        let findings = run(&BidGuarantee, text, &FieldMap::new());
        assert!(value_of(&findings, Field::GarantiaParticipacao).is_none());
        assert_eq!(findings.len(), 1);
    }
}
