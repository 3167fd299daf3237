//! Field Extraction
//!
//! Pattern-based extraction of checklist fields from edital text.
//!
//! ```text
//! text + sections
//!     ↓
//! [FieldExtractor]  runs the configured FieldRule units in order
//!     ↓
//! Finding (assign / refine / suppressed)
//!     ↓
//! FieldMap + SourceAttribution list
//! ```
//!
//! Rules never see each other, only the shared [`ExtractionContext`] holding
//! the text and the fields set so far.

pub mod context;
pub mod engine;
pub mod rules;

pub use context::ExtractionContext;
pub use engine::{attribute, extract, FieldExtractor, FieldRule, Finding};
