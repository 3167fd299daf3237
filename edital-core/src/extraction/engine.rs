use super::context::ExtractionContext;
use super::rules;
use crate::config::{ContextConfig, ExtractionConfig};
use crate::observer::{ExtractionObserver, PipelineEvent, TracingObserver};
use crate::structure::RelevanceMatcher;
use crate::text;
use crate::types::{ExtractionMethod, ExtractionResult, Field, Section, SourceAttribution};
use regex::RegexBuilder;
use std::sync::Arc;

/// Outcome of one field rule over the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Write-once assignment; `evidence` is the matched text, if any
    Assign {
        field: Field,
        value: String,
        evidence: Option<String>,
    },
    /// Like `Assign`, but replaces a value set by an earlier rule
    Refine {
        field: Field,
        value: String,
        evidence: Option<String>,
    },
    /// A candidate was found and deliberately discarded
    Suppressed { field: Field, reason: String },
}

impl Finding {
    pub fn assign(field: Field, value: impl Into<String>, evidence: Option<&str>) -> Self {
        Finding::Assign {
            field,
            value: value.into(),
            evidence: evidence.map(str::to_string),
        }
    }

    pub fn refine(field: Field, value: impl Into<String>, evidence: Option<&str>) -> Self {
        Finding::Refine {
            field,
            value: value.into(),
            evidence: evidence.map(str::to_string),
        }
    }

    pub fn suppressed(field: Field, reason: impl Into<String>) -> Self {
        Finding::Suppressed {
            field,
            reason: reason.into(),
        }
    }
}

// Field rule pipeline infrastructure
pub trait FieldRule: Send + Sync {
    fn name(&self) -> &str;
    /// Inspect the document; must not depend on anything but `ctx`.
    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding>;
}

/// Runs the configured field rules over a document.
pub struct FieldExtractor {
    config: ExtractionConfig,
    catalog: Vec<Box<dyn FieldRule>>,
    observer: Arc<dyn ExtractionObserver>,
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl FieldExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self {
            config,
            catalog: rules::default_catalog(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ExtractionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Register an additional rule. It runs when its name appears in the
    /// pipeline config; a rule with an existing name replaces the old one.
    pub fn with_rule(mut self, rule: Box<dyn FieldRule>) -> Self {
        self.catalog.retain(|existing| existing.name() != rule.name());
        self.catalog.push(rule);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract every configured field. Never fails: text without any
    /// recognizable statement yields empty fields and sources.
    pub fn extract(&self, text: &str, sections: &[Section]) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        if text.trim().is_empty() {
            self.finish(&result);
            return result;
        }

        let lower = text.to_lowercase();
        let matcher = RelevanceMatcher::new(sections);

        for rule_config in &self.config.pipeline.rules {
            if !rule_config.enabled {
                self.observer.on_event(&PipelineEvent::RuleDisabled {
                    rule: &rule_config.name,
                });
                continue;
            }

            let Some(rule) = self.rule_by_name(&rule_config.name) else {
                self.observer.on_event(&PipelineEvent::UnknownRule {
                    rule: &rule_config.name,
                });
                continue;
            };

            self.observer
                .on_event(&PipelineEvent::RuleStarted { rule: rule.name() });
            let findings = {
                let ctx =
                    ExtractionContext::new(text, &lower, &result.fields, &self.config.context);
                rule.apply(&ctx)
            };
            self.record(rule.name(), findings, text, &matcher, &mut result);
        }

        self.finish(&result);
        result
    }

    fn finish(&self, result: &ExtractionResult) {
        self.observer.on_event(&PipelineEvent::ExtractionFinished {
            method: ExtractionMethod::Pattern,
            fields: result.fields.len(),
            sources: result.sources.len(),
        });
    }

    fn rule_by_name(&self, name: &str) -> Option<&dyn FieldRule> {
        self.catalog
            .iter()
            .find(|rule| rule.name() == name)
            .map(|rule| rule.as_ref())
    }

    fn record(
        &self,
        rule: &str,
        findings: Vec<Finding>,
        text: &str,
        matcher: &RelevanceMatcher<'_>,
        result: &mut ExtractionResult,
    ) {
        for finding in findings {
            match finding {
                Finding::Assign {
                    field,
                    value,
                    evidence,
                } => {
                    if let Some(kept) = result.fields.get(field) {
                        self.observer.on_event(&PipelineEvent::FieldKept {
                            rule,
                            field,
                            kept,
                            dropped: &value,
                        });
                        continue;
                    }
                    self.store(rule, field, value, evidence, text, matcher, result);
                }
                Finding::Refine {
                    field,
                    value,
                    evidence,
                } => {
                    result.sources.retain(|source| source.field != field);
                    self.store(rule, field, value, evidence, text, matcher, result);
                }
                Finding::Suppressed { field, reason } => {
                    self.observer.on_event(&PipelineEvent::FindingSuppressed {
                        rule,
                        field,
                        reason: &reason,
                    });
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn store(
        &self,
        rule: &str,
        field: Field,
        value: String,
        evidence: Option<String>,
        text: &str,
        matcher: &RelevanceMatcher<'_>,
        result: &mut ExtractionResult,
    ) {
        self.observer.on_event(&PipelineEvent::FieldAssigned {
            rule,
            field,
            value: &value,
        });
        result.fields.set(field, value);

        let Some(evidence) = evidence else {
            return;
        };
        match attribute(field, text, &evidence, &self.config.context, matcher) {
            Some(source) => {
                if source.section_number.is_none() {
                    self.observer
                        .on_event(&PipelineEvent::SectionUnresolved { field });
                }
                result.sources.push(source);
            }
            None => self.observer.on_event(&PipelineEvent::EvidenceMissing { field }),
        }
    }
}

/// Extract with the default configuration and no diagnostics.
pub fn extract(text: &str, sections: &[Section]) -> ExtractionResult {
    FieldExtractor::default()
        .with_observer(Arc::new(crate::observer::NoopObserver))
        .extract(text, sections)
}

/// Locate the first case-insensitive occurrence of `evidence` and record it
/// with its surrounding context and owning section.
pub fn attribute(
    field: Field,
    text: &str,
    evidence: &str,
    windows: &ContextConfig,
    matcher: &RelevanceMatcher<'_>,
) -> Option<SourceAttribution> {
    let pattern = RegexBuilder::new(&regex::escape(evidence))
        .case_insensitive(true)
        .build()
        .ok()?;
    let found = pattern.find(text)?;

    let snippet = found.as_str().trim();
    let context = text::window(text, found.start(), found.end(), windows.attribution_window).trim();
    let context = if text::char_len(context) > text::char_len(snippet) {
        context
    } else {
        snippet
    };

    let section = matcher.find(snippet);
    Some(SourceAttribution {
        field,
        snippet: snippet.to_string(),
        context: context.to_string(),
        section_number: section.map(|s| s.number.clone()),
        section_title: section.map(|s| s.title.clone()),
    })
}
