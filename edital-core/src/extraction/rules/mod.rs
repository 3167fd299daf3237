// Field rules, one module per checklist area:
// - object.rs: object description
// - registration.rs: price registration (staged)
// - judgment.rs: object form, judgment criterion and scope, dispute mode, bid interval
// - budget.rs: estimated value and budget confidentiality
// - publication.rs: deadline class, PNCP publication/intention, appeal deadline
// - me_epp.rs: ME/EPP preference (staged) and subcontracting
// - guarantees.rs: contract and bid guarantees
// - requirements.rs: site visit, demonstration, samples
// - participation.rs: cooperatives and consortia

pub mod budget;
pub mod guarantees;
pub mod judgment;
pub mod me_epp;
pub mod object;
pub mod participation;
pub mod publication;
pub mod registration;
pub mod requirements;

use super::context::ExtractionContext;
use super::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;

/// One row of a first-match-wins table: the first row whose pattern occurs
/// anywhere in the document decides the field. The match doubles as evidence.
pub struct Category {
    pub value: &'static str,
    pub pattern: Regex,
}

impl Category {
    pub fn new(value: &'static str, pattern: &str) -> Self {
        Self {
            value,
            pattern: Regex::new(pattern).unwrap(),
        }
    }
}

/// Evaluate a category table in order, stopping at the first hit.
pub fn first_category<'t>(
    ctx: &ExtractionContext<'_>,
    table: &'t [Category],
) -> Option<(&'t Category, String)> {
    table.iter().find_map(|category| {
        category
            .pattern
            .find(ctx.text)
            .map(|m| (category, m.as_str().to_string()))
    })
}

/// Single-field table lookup.
pub fn categorize(ctx: &ExtractionContext<'_>, field: Field, table: &[Category]) -> Vec<Finding> {
    first_category(ctx, table)
        .map(|(category, evidence)| vec![Finding::assign(field, category.value, Some(&evidence))])
        .unwrap_or_default()
}

/// All built-in rules. Pipeline order comes from the config, not from here.
pub fn default_catalog() -> Vec<Box<dyn FieldRule>> {
    vec![
        Box::new(object::ObjectDescription),
        Box::new(registration::PriceRegistration),
        Box::new(judgment::ObjectForm),
        Box::new(judgment::JudgmentCriterion),
        Box::new(judgment::JudgmentScope),
        Box::new(judgment::DisputeMode),
        Box::new(judgment::MinimumBidInterval),
        Box::new(budget::EstimatedValue),
        Box::new(budget::BudgetConfidentiality),
        Box::new(publication::DeadlineClass),
        Box::new(publication::PncpPublication),
        Box::new(publication::PncpDeadline),
        Box::new(publication::PncpIntention),
        Box::new(publication::AppealDeadline),
        Box::new(me_epp::SmallBusinessPreference),
        Box::new(me_epp::Subcontracting),
        Box::new(guarantees::ContractGuarantee),
        Box::new(guarantees::BidGuarantee),
        Box::new(requirements::SiteVisit),
        Box::new(requirements::Demonstration),
        Box::new(requirements::Samples),
        Box::new(participation::Cooperatives),
        Box::new(participation::Consortium),
    ]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::ContextConfig;
    use crate::types::FieldMap;

    /// Run one rule over `text` with `fields` already extracted.
    pub fn run(rule: &dyn FieldRule, text: &str, fields: &FieldMap) -> Vec<Finding> {
        let lower = text.to_lowercase();
        let windows = ContextConfig::default();
        let ctx = ExtractionContext::new(text, &lower, fields, &windows);
        rule.apply(&ctx)
    }

    /// Assigned value for `field`, ignoring suppressions.
    pub fn value_of(findings: &[Finding], field: Field) -> Option<String> {
        findings.iter().find_map(|finding| match finding {
            Finding::Assign { field: f, value, .. } | Finding::Refine { field: f, value, .. }
                if *f == field =>
            {
                Some(value.clone())
            }
            _ => None,
        })
    }

    pub fn evidence_of(findings: &[Finding], field: Field) -> Option<String> {
        findings.iter().find_map(|finding| match finding {
            Finding::Assign {
                field: f, evidence, ..
            }
            | Finding::Refine {
                field: f, evidence, ..
            } if *f == field => evidence.clone(),
            _ => None,
        })
    }
}
