// Rule validation - the legal rulebook evaluated over an extracted field map.
// - engine.rs: Evaluator, Phase, RuleEngine and the default catalog
// - criteria.rs: initial criteria, price registration, participation
// - proceedings.rs: proposal, bidding, judgment
// - closing.rs: habilitation, publication deadlines, budget
// - numeric.rs: lenient integer/percentage parsing

mod closing;
mod criteria;
pub mod engine;
pub mod numeric;
mod proceedings;

pub use engine::{default_catalog, evaluate, Evaluator, Phase, RuleEngine};
