// Edital Checklist Core Library
//
// Checks Brazilian public-procurement notices (editais) against the
// Lei 14.133/2021 checklist. Plain text in, field map and rule outcomes out.

pub mod alternate;
pub mod config;
pub mod extraction;
pub mod observer;
pub mod processor;
pub mod serialization;
pub mod structure;
pub mod text;
pub mod types;
pub mod validation;

// Re-export main types and functions for easy use
pub use types::*;
pub use alternate::{AlternateError, AlternateExtractor};
pub use config::ExtractionConfig;
pub use extraction::{extract, FieldExtractor, FieldRule, Finding};
pub use observer::{ExtractionObserver, NoopObserver, PipelineEvent, TracingObserver};
pub use processor::{ChecklistProcessor, ChecklistReport, ReportSummary, StepProfiler};
pub use serialization::{from_json, to_json, SerializationError};
pub use structure::{find_section, index, RelevanceMatcher, StructureIndexer};
pub use validation::{evaluate, RuleEngine};
