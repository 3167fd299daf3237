//! Diagnostic events emitted while a document moves through the pipeline.
//!
//! Pipeline components receive an [`ExtractionObserver`] and report what they
//! did. The default [`TracingObserver`] forwards events to `tracing`; tests
//! swap in a recorder or [`NoopObserver`].

use crate::alternate::AlternateError;
use crate::structure::IndexStats;
use crate::types::{ExtractionMethod, Field};

#[derive(Debug)]
pub enum PipelineEvent<'a> {
    SectionsIndexed {
        stats: IndexStats,
    },
    /// Outline supplied by the caller instead of indexed
    SectionsProvided {
        count: usize,
    },
    RuleStarted {
        rule: &'a str,
    },
    RuleDisabled {
        rule: &'a str,
    },
    UnknownRule {
        rule: &'a str,
    },
    FieldAssigned {
        rule: &'a str,
        field: Field,
        value: &'a str,
    },
    /// Write-once field already held a value; the new one was dropped
    FieldKept {
        rule: &'a str,
        field: Field,
        kept: &'a str,
        dropped: &'a str,
    },
    FindingSuppressed {
        rule: &'a str,
        field: Field,
        reason: &'a str,
    },
    /// Evidence located but no section of the outline matched it
    SectionUnresolved {
        field: Field,
    },
    /// Evidence text could not be located in the document
    EvidenceMissing {
        field: Field,
    },
    AlternateFailed {
        extractor: &'a str,
        error: &'a AlternateError,
    },
    ExtractionFinished {
        method: ExtractionMethod,
        fields: usize,
        sources: usize,
    },
    RulesEvaluated {
        ok: usize,
        warnings: usize,
    },
}

pub trait ExtractionObserver: Send + Sync {
    fn on_event(&self, event: &PipelineEvent<'_>);
}

/// Forwards events to the `tracing` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ExtractionObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent<'_>) {
        match event {
            PipelineEvent::SectionsIndexed { stats } => tracing::info!(
                total = stats.total(),
                top_level = stats.top_level,
                sub_items = stats.sub_items,
                fallback = stats.fallback,
                "indexed document outline"
            ),
            PipelineEvent::SectionsProvided { count } => {
                tracing::info!(count, "using caller-supplied outline")
            }
            PipelineEvent::RuleStarted { rule } => tracing::trace!(rule, "applying field rule"),
            PipelineEvent::RuleDisabled { rule } => {
                tracing::debug!(rule, "skipping disabled field rule")
            }
            PipelineEvent::UnknownRule { rule } => {
                tracing::warn!(rule, "unknown field rule in pipeline, skipping")
            }
            PipelineEvent::FieldAssigned { rule, field, value } => {
                tracing::debug!(rule, field = field.key(), value, "field assigned")
            }
            PipelineEvent::FieldKept {
                rule,
                field,
                kept,
                dropped,
            } => tracing::debug!(rule, field = field.key(), kept, dropped, "field already set"),
            PipelineEvent::FindingSuppressed {
                rule,
                field,
                reason,
            } => tracing::debug!(rule, field = field.key(), reason, "candidate suppressed"),
            PipelineEvent::SectionUnresolved { field } => {
                tracing::trace!(field = field.key(), "no section for attribution")
            }
            PipelineEvent::EvidenceMissing { field } => {
                tracing::warn!(field = field.key(), "evidence not found in document")
            }
            PipelineEvent::AlternateFailed { extractor, error } => tracing::warn!(
                extractor,
                error = %error,
                "alternate extraction failed, falling back to pattern rules"
            ),
            PipelineEvent::ExtractionFinished {
                method,
                fields,
                sources,
            } => tracing::info!(?method, fields, sources, "extraction finished"),
            PipelineEvent::RulesEvaluated { ok, warnings } => {
                tracing::info!(ok, warnings, "rulebook evaluated")
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {
    fn on_event(&self, _event: &PipelineEvent<'_>) {}
}
