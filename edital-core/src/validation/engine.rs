use super::{closing, criteria, proceedings};
use crate::types::{FieldMap, RuleOutcome};

/// Procurement lifecycle phase an evaluator belongs to, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    InitialCriteria,
    PriceRegistration,
    Participation,
    Proposal,
    Bidding,
    Judgment,
    Habilitation,
    Publication,
    Budget,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::InitialCriteria => "Dados iniciais e critérios fundamentais",
            Phase::PriceRegistration => "Registro de preços",
            Phase::Participation => "Participação e tratamento favorecido",
            Phase::Proposal => "Preenchimento da proposta",
            Phase::Bidding => "Etapa de lances",
            Phase::Judgment => "Julgamento da proposta",
            Phase::Habilitation => "Habilitação e formalização",
            Phase::Publication => "Publicação e prazos",
            Phase::Budget => "Orçamento e valor",
        }
    }
}

/// One entry of the rulebook. `eval` sees only the field map and returns at
/// most one outcome.
#[derive(Clone, Copy)]
pub struct Evaluator {
    pub id: &'static str,
    pub phase: Phase,
    pub eval: fn(&FieldMap) -> Option<RuleOutcome>,
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .finish()
    }
}

/// The full rulebook, rule-1 through rule-30.
pub fn default_catalog() -> Vec<Evaluator> {
    criteria::EVALUATORS
        .iter()
        .chain(proceedings::EVALUATORS)
        .chain(closing::EVALUATORS)
        .copied()
        .collect()
}

/// Evaluates an ordered catalog over a field map. Output order is catalog
/// order; evaluators that have nothing to say are simply absent.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    catalog: Vec<Evaluator>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_catalog(default_catalog())
    }

    pub fn with_catalog(catalog: Vec<Evaluator>) -> Self {
        Self { catalog }
    }

    /// Subset of the default catalog, in the order given. Unknown ids are
    /// skipped.
    pub fn only(ids: &[&str]) -> Self {
        let all = default_catalog();
        let catalog = ids
            .iter()
            .filter_map(|id| {
                let found = all.iter().find(|evaluator| evaluator.id == *id).copied();
                if found.is_none() {
                    tracing::warn!(rule = id, "unknown rule id, skipping");
                }
                found
            })
            .collect();
        Self { catalog }
    }

    pub fn evaluators(&self) -> &[Evaluator] {
        &self.catalog
    }

    pub fn evaluate(&self, fields: &FieldMap) -> Vec<RuleOutcome> {
        self.catalog
            .iter()
            .filter_map(|evaluator| (evaluator.eval)(fields))
            .collect()
    }
}

/// Evaluate the default rulebook.
pub fn evaluate(fields: &FieldMap) -> Vec<RuleOutcome> {
    RuleEngine::new().evaluate(fields)
}
