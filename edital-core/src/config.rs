use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_top_level_window() -> usize {
    5000
}

fn default_sub_item_window() -> usize {
    2000
}

fn default_fallback_window() -> usize {
    3000
}

fn default_min_title() -> usize {
    5
}

fn default_min_fallback_title() -> usize {
    10
}

fn default_max_fallback_title() -> usize {
    100
}

fn default_max_sub_item_title() -> usize {
    300
}

fn default_fallback_threshold() -> usize {
    5
}

fn default_attribution_window() -> usize {
    100
}

fn default_negation_window() -> usize {
    150
}

fn default_confidentiality_window() -> usize {
    200
}

fn default_toc_window() -> usize {
    100
}

fn default_visit_window() -> usize {
    200
}

/// Field rules in default pipeline order.
pub const DEFAULT_FIELD_RULES: [&str; 23] = [
    "ObjectDescription",
    "PriceRegistration",
    "ObjectForm",
    "JudgmentCriterion",
    "JudgmentScope",
    "DisputeMode",
    "MinimumBidInterval",
    "EstimatedValue",
    "BudgetConfidentiality",
    "DeadlineClass",
    "PncpPublication",
    "PncpDeadline",
    "PncpIntention",
    "AppealDeadline",
    "SmallBusinessPreference",
    "Subcontracting",
    "ContractGuarantee",
    "BidGuarantee",
    "SiteVisit",
    "Demonstration",
    "Samples",
    "Cooperatives",
    "Consortium",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Heading detection windows and thresholds
    #[serde(default)]
    pub structure: StructureConfig,
    /// Context window sizes used by field rules
    #[serde(default)]
    pub context: ContextConfig,
    /// Pipeline configuration - defines which field rules run and in what order
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Max characters of content scanned after a top-level heading
    #[serde(default = "default_top_level_window")]
    pub top_level_window: usize,
    /// Max characters of content scanned after a sub-item heading
    #[serde(default = "default_sub_item_window")]
    pub sub_item_window: usize,
    #[serde(default = "default_fallback_window")]
    pub fallback_window: usize,
    #[serde(default = "default_min_title")]
    pub min_title_chars: usize,
    #[serde(default = "default_max_sub_item_title")]
    pub max_sub_item_title_chars: usize,
    #[serde(default = "default_min_fallback_title")]
    pub min_fallback_title_chars: usize,
    #[serde(default = "default_max_fallback_title")]
    pub max_fallback_title_chars: usize,
    /// The fallback strategy runs only below this many sections
    #[serde(default = "default_fallback_threshold")]
    pub fallback_threshold: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            top_level_window: default_top_level_window(),
            sub_item_window: default_sub_item_window(),
            fallback_window: default_fallback_window(),
            min_title_chars: default_min_title(),
            max_sub_item_title_chars: default_max_sub_item_title(),
            min_fallback_title_chars: default_min_fallback_title(),
            max_fallback_title_chars: default_max_fallback_title(),
            fallback_threshold: default_fallback_threshold(),
        }
    }
}

/// Window sizes in characters on each side of a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Context stored with each source attribution
    #[serde(default = "default_attribution_window")]
    pub attribution_window: usize,
    /// Negation scan around ME/EPP, guarantee and requirement matches
    #[serde(default = "default_negation_window")]
    pub negation_window: usize,
    /// Secrecy scan around monetary values
    #[serde(default = "default_confidentiality_window")]
    pub confidentiality_window: usize,
    /// Table-of-contents scan around price-registration candidates
    #[serde(default = "default_toc_window")]
    pub toc_window: usize,
    #[serde(default = "default_visit_window")]
    pub visit_window: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            attribution_window: default_attribution_window(),
            negation_window: default_negation_window(),
            confidentiality_window: default_confidentiality_window(),
            toc_window: default_toc_window(),
            visit_window: default_visit_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// List of field rules to run in order
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules: DEFAULT_FIELD_RULES
                .iter()
                .map(|name| RuleConfig {
                    name: name.to_string(),
                    enabled: true,
                })
                .collect(),
        }
    }
}

impl PipelineConfig {
    /// Names of enabled rules, in configured order.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(|rule| rule.name.as_str())
    }
}

impl ExtractionConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        let config: ExtractionConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {path}"))?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!(path = p, error = %e, "failed to load config, using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
