//! ME/EPP (micro and small enterprise) preference and subcontracting.
//!
//! The preference follows the same staged scheme as price registration:
//! an explicit negation anywhere decides `nao` for the preference and all of
//! its sub-benefits; otherwise the object description, then a cover-page
//! marker or a strong legal phrase, may decide `sim`. The preference defaults
//! to `nao`. Sub-benefits are only inspected when nothing negated the
//! preference, and each is decided on its own.

use crate::extraction::context::{has_negation, normalize_amount, ExtractionContext};
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::{Match, Regex};
use std::sync::LazyLock;

// Fragments shared by several patterns
const SMALL_BUSINESS: &str = r"(?:ME\s*/\s*EPP|\bME\b|microempresas?|empresas?\s+de\s+pequeno\s+porte)";
const LC_123: &str = r"(?:LC\s*(?:nº\s*)?123|Lei\s+Complementar\s+(?:nº\s*)?123)";

static NEGATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)preferência(?:\s+(?:para\s+)?ME\s*/\s*EPP)?\s*:?\s*não\b".to_string(),
        format!(r"(?i)não\s+se\s+aplica[^.]{{0,200}}?(?:tratamento\s+favorecido|{LC_123}|ME\s*/\s*EPP)"),
        format!(r"(?i)(?:tratamento\s+favorecido|{LC_123}|ME\s*/\s*EPP)[^.]{{0,200}}?não\s+se\s+aplica"),
        r"(?i)não\s+haverá[^.]{0,100}?(?:tratamento\s+diferenciado|preferência[^.]{0,50}?\bME\b)"
            .to_string(),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static OBJECT_PREFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)exclusiv\w*[^.]{{0,80}}?{SMALL_BUSINESS}|tratamento\s+(?:diferenciado|favorecido)"
    ))
    .unwrap()
});

static OBJECT_SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)sumário|pageref").unwrap());

static COVER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)preferência(?:\s+(?:para\s+)?ME\s*/\s*EPP)?\s*:\s*(sim|não)\b").unwrap()
});

static STRONG_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:aplicar|aplicará|aplica-se|aplicam-se)[^.]{{0,100}}?(?:tratamento\s+(?:diferenciado|favorecido)|{LC_123})"
    ))
    .unwrap()
});

/// Negation window for strong positive phrases.
const STRONG_PHRASE_WINDOW: usize = 100;

static EXCLUSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:exclusiva|cota\s+reservada)[^.]{{0,150}}?{SMALL_BUSINESS}"
    ))
    .unwrap()
});

static QUOTA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cota[^.]{0,100}?(?:25\s*%|vinte\s+e\s+cinco\s+por\s+cento)").unwrap()
});

static INDIVISIBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)não\s+divisível|item\s+único|único\s+item").unwrap());

static TIE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)desempate[^.]{{0,150}}?(?:{SMALL_BUSINESS}|{LC_123})"
    ))
    .unwrap()
});

static NO_SUBCONTRACTING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:contratad[oa]|licitante)[^.]{0,100}?não\s+poderá\s+subcontratar|subcontratação[^.]{0,100}?(?:vedada|não\s+(?:será\s+)?permitida)",
    )
    .unwrap()
});

static SUBCONTRACTING_SHARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)subcontrata\w*[^.]{0,150}?(\d+(?:,\d+)?)\s*%").unwrap());

/// Fields forced to `nao` by a negated preference.
const NEGATED_FIELDS: [Field; 4] = [
    Field::PreferenciaMe,
    Field::ExclusivaMe,
    Field::Cota25Me,
    Field::CriterioDesempateMe,
];

type Stage = fn(&ExtractionContext<'_>, &mut Vec<Finding>) -> Option<Finding>;

const STAGES: [Stage; 2] = [object_mention, cover_or_strong_phrase];

pub struct SmallBusinessPreference;

impl FieldRule for SmallBusinessPreference {
    fn name(&self) -> &str {
        "SmallBusinessPreference"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();

        if let Some(evidence) = explicit_negation(ctx, &mut findings) {
            findings.extend(
                NEGATED_FIELDS
                    .iter()
                    .map(|&field| Finding::assign(field, "nao", Some(evidence))),
            );
            return findings;
        }

        let decision = STAGES
            .iter()
            .find_map(|stage| stage(ctx, &mut findings))
            .unwrap_or_else(|| Finding::assign(Field::PreferenciaMe, "nao", None));
        findings.push(decision);

        findings.extend(decide(ctx, Field::ExclusivaMe, &EXCLUSIVE, None));
        findings.extend(decide(ctx, Field::Cota25Me, &QUOTA, Some(&INDIVISIBLE)));
        findings.extend(decide(ctx, Field::CriterioDesempateMe, &TIE_BREAK, None));
        findings
    }
}

fn explicit_negation<'t>(
    ctx: &ExtractionContext<'t>,
    suppressed: &mut Vec<Finding>,
) -> Option<&'t str> {
    for pattern in NEGATIONS.iter() {
        for m in pattern.find_iter(ctx.text) {
            if ctx.toc_near(&m) {
                suppressed.push(Finding::suppressed(
                    Field::PreferenciaMe,
                    format!("table of contents: {}", m.as_str()),
                ));
                continue;
            }
            return Some(m.as_str());
        }
    }
    None
}

fn object_mention(ctx: &ExtractionContext<'_>, _suppressed: &mut Vec<Finding>) -> Option<Finding> {
    let objeto = ctx.field(Field::ObjetoDescricao)?;
    if OBJECT_PREFERENCE.is_match(objeto) && !OBJECT_SUMMARY.is_match(objeto) {
        Some(Finding::assign(Field::PreferenciaMe, "sim", Some(objeto)))
    } else {
        None
    }
}

fn cover_or_strong_phrase(
    ctx: &ExtractionContext<'_>,
    suppressed: &mut Vec<Finding>,
) -> Option<Finding> {
    if let Some(caps) = COVER_MARKER.captures(ctx.text) {
        let value = if caps[1].to_lowercase() == "sim" { "sim" } else { "nao" };
        return Some(Finding::assign(Field::PreferenciaMe, value, Some(&caps[0])));
    }

    for m in STRONG_PHRASE.find_iter(ctx.text) {
        if has_negation(ctx.around(&m, STRONG_PHRASE_WINDOW)) {
            suppressed.push(Finding::suppressed(
                Field::PreferenciaMe,
                format!("negated: {}", m.as_str()),
            ));
            continue;
        }
        return Some(Finding::assign(Field::PreferenciaMe, "sim", Some(m.as_str())));
    }
    None
}

/// First mention decides: `nao` when negated (or rejected), `sim` otherwise.
fn decide(
    ctx: &ExtractionContext<'_>,
    field: Field,
    pattern: &Regex,
    rejection: Option<&Regex>,
) -> Option<Finding> {
    let m = pattern.find(ctx.text)?;
    let rejected = rejection.is_some_and(|re| re.is_match(window(ctx, &m)));
    let value = if rejected || ctx.negated_near(&m) {
        "nao"
    } else {
        "sim"
    };
    Some(Finding::assign(field, value, Some(m.as_str())))
}

fn window<'t>(ctx: &ExtractionContext<'t>, m: &Match<'_>) -> &'t str {
    ctx.around(m, ctx.windows.negation_window)
}

/// Share of the contract that may be subcontracted.
pub struct Subcontracting;

impl FieldRule for Subcontracting {
    fn name(&self) -> &str {
        "Subcontracting"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        if let Some(m) = NO_SUBCONTRACTING.find(ctx.text) {
            return vec![Finding::assign(Field::SubcontratacaoMe, "0%", Some(m.as_str()))];
        }

        let mut findings = Vec::new();
        for caps in SUBCONTRACTING_SHARE.captures_iter(ctx.text) {
            let (Some(whole), Some(share)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if ctx.negated_near(&whole) {
                findings.push(Finding::suppressed(
                    Field::SubcontratacaoMe,
                    format!("negated: {}", whole.as_str()),
                ));
                continue;
            }
            findings.push(Finding::assign(
                Field::SubcontratacaoMe,
                format!("{}%", normalize_amount(share.as_str())),
                Some(whole.as_str()),
            ));
            break;
        }
        findings
    }
}
