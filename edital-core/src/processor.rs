use crate::alternate::{value_attributions, AlternateExtractor};
use crate::config::ExtractionConfig;
use crate::extraction::FieldExtractor;
use crate::observer::{ExtractionObserver, PipelineEvent, TracingObserver};
use crate::structure::StructureIndexer;
use crate::types::*;
use crate::validation::RuleEngine;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        tracing::info!(step = step_name, ms = elapsed.as_millis() as u64, "step finished");
        self.timings.push((step_name.to_string(), elapsed));

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            tracing::info!(
                step = step.as_str(),
                ms = duration.as_millis() as u64,
                share = format!("{percentage:.1}%"),
                "profile"
            );
        }
        tracing::info!(total_ms = total.as_millis() as u64, "profile total");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub ok: usize,
    pub warnings: usize,
    /// Fields determined by extraction
    pub fields: usize,
}

impl ReportSummary {
    pub fn new(outcomes: &[RuleOutcome], fields: &FieldMap) -> Self {
        let warnings = outcomes.iter().filter(|o| o.is_warning()).count();
        Self {
            ok: outcomes.len() - warnings,
            warnings,
            fields: fields.len(),
        }
    }
}

/// Everything one run over an edital produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    /// SHA-256 of the analysed text
    pub document_fingerprint: String,
    /// SHA-256 of the serialized extraction config
    pub config_fingerprint: String,
    pub extraction_method: ExtractionMethod,
    /// Set when the alternate extractor failed and the pattern rules took over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub sections: Vec<Section>,
    pub fields: FieldMap,
    pub sources: Vec<SourceAttribution>,
    pub outcomes: Vec<RuleOutcome>,
    pub summary: ReportSummary,
}

/// Index, extract and evaluate one edital.
pub struct ChecklistProcessor {
    config: ExtractionConfig,
    indexer: StructureIndexer,
    extractor: FieldExtractor,
    engine: RuleEngine,
    alternate: Option<Box<dyn AlternateExtractor>>,
    observer: Arc<dyn ExtractionObserver>,
    profile: bool,
}

impl Default for ChecklistProcessor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl ChecklistProcessor {
    pub fn new(config: ExtractionConfig) -> Self {
        let observer: Arc<dyn ExtractionObserver> = Arc::new(TracingObserver);
        Self {
            indexer: StructureIndexer::new(config.structure.clone()),
            extractor: FieldExtractor::new(config.clone()).with_observer(observer.clone()),
            engine: RuleEngine::default(),
            alternate: None,
            observer,
            profile: false,
            config,
        }
    }

    /// Try `alternate` before the pattern rules on every document.
    pub fn with_alternate(mut self, alternate: Box<dyn AlternateExtractor>) -> Self {
        self.alternate = Some(alternate);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.extractor = self.extractor.with_observer(observer.clone());
        self.observer = observer;
        self
    }

    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profile = enabled;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Run the whole pipeline. `sections` replaces indexing when supplied.
    pub fn process(&self, text: &str, sections: Option<Vec<Section>>) -> ChecklistReport {
        let mut profiler = StepProfiler::new(self.profile);

        let sections = match sections {
            Some(sections) => {
                self.observer.on_event(&PipelineEvent::SectionsProvided {
                    count: sections.len(),
                });
                sections
            }
            None => {
                let (sections, stats) =
                    profiler.time_step("index", || self.indexer.index_with_stats(text));
                self.observer
                    .on_event(&PipelineEvent::SectionsIndexed { stats });
                sections
            }
        };

        let (result, method, warning) =
            profiler.time_step("extract", || self.extract(text, &sections));

        let outcomes = profiler.time_step("evaluate", || {
            let mut outcomes = self.evaluate_fields(&result.fields);
            link_sources(&mut outcomes, &result);
            outcomes
        });

        profiler.log_summary();

        ChecklistReport {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            document_fingerprint: document_fingerprint(text),
            config_fingerprint: calculate_config_hash(&self.config).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not fingerprint config");
                String::new()
            }),
            extraction_method: method,
            warning,
            summary: ReportSummary::new(&outcomes, &result.fields),
            sections,
            fields: result.fields,
            sources: result.sources,
            outcomes,
        }
    }

    /// Evaluate an already-determined field map, e.g. one imported from JSON.
    pub fn evaluate_fields(&self, fields: &FieldMap) -> Vec<RuleOutcome> {
        let outcomes = self.engine.evaluate(fields);
        let warnings = outcomes.iter().filter(|o| o.is_warning()).count();
        self.observer.on_event(&PipelineEvent::RulesEvaluated {
            ok: outcomes.len() - warnings,
            warnings,
        });
        outcomes
    }

    fn extract(
        &self,
        text: &str,
        sections: &[Section],
    ) -> (ExtractionResult, ExtractionMethod, Option<String>) {
        let Some(alternate) = &self.alternate else {
            return (self.extractor.extract(text, sections), ExtractionMethod::Pattern, None);
        };

        match alternate.extract(text) {
            Ok(fields) => {
                let sources = value_attributions(&fields);
                self.observer.on_event(&PipelineEvent::ExtractionFinished {
                    method: ExtractionMethod::Alternate,
                    fields: fields.len(),
                    sources: sources.len(),
                });
                (
                    ExtractionResult { fields, sources },
                    ExtractionMethod::Alternate,
                    None,
                )
            }
            Err(error) => {
                self.observer.on_event(&PipelineEvent::AlternateFailed {
                    extractor: alternate.name(),
                    error: &error,
                });
                (
                    self.extractor.extract(text, sections),
                    ExtractionMethod::Pattern,
                    Some(error.warning_message()),
                )
            }
        }
    }
}

/// Point each outcome at the section its field was found in.
fn link_sources(outcomes: &mut [RuleOutcome], result: &ExtractionResult) {
    for outcome in outcomes {
        let Some(field) = outcome.field else {
            continue;
        };
        let Some(source) = result.source_for(field) else {
            continue;
        };
        if let Some(number) = &source.section_number {
            outcome.source = Some(SectionRef {
                number: number.clone(),
                title: source.section_title.clone().unwrap_or_default(),
            });
        }
    }
}

pub fn calculate_config_hash<T: Serialize>(config: &T) -> Result<String> {
    let config_json =
        serde_json::to_string(config).context("Failed to serialize config for hashing")?;

    let mut hasher = Sha256::new();
    hasher.update(config_json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn document_fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
