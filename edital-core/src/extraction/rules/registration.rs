//! Price registration (SRP) detection.
//!
//! Editais routinely carry the model text of the price-registration chapter
//! even when the procurement is not one, and the table of contents repeats
//! the chapter heading. Detection therefore runs in stages, each consulted
//! only when the previous one found nothing:
//!
//! 1. an explicit statement that the chapter does not apply (negative wins
//!    over any positive wording anywhere else in the document);
//! 2. a substantive mention in the already-extracted object description;
//! 3. strong positive phrases ("ata de registro de preços", ...).
//!
//! Candidates whose surroundings look like table-of-contents material are
//! ignored at every stage. With no evidence at all the field is "nao".

use crate::extraction::context::ExtractionContext;
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;
use std::sync::LazyLock;

static NEGATIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)não\s+se\s+trata\s+de\s+(?:uma\s+)?licitação\s+para\s+registro\s+de\s+preços?",
        r"(?i)não\s+se\s+aplica\s+(?:no\s+presente\s+procedimento|neste\s+procedimento).*?registro\s+de\s+preços?",
        r"(?i)registro\s+de\s+preços?.*?não\s+se\s+aplica",
        r"(?i)(?:item|subitem|disciplina).*?não\s+se\s+aplica.*?registro\s+de\s+preços?",
        r"(?i)disciplina\s+deste\s+item.*?não\s+se\s+aplica.*?por\s+não\s+se\s+tratar",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static POSITIVES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)ata\s+de\s+registro\s+de\s+preços?",
        r"(?i)validade\s+(?:do|da)\s+registro",
        r"(?i)vigência\s+(?:do|da)\s+registro",
        r"(?i)intenção\s+de\s+registro",
        r"(?i)sistema\s+de\s+registro\s+de\s+preços?",
        r"(?i)\bSRP\s*[-–]\s*sistema\s+de\s+registro",
        r"(?i)registro\s+de\s+preços?\s+para\s+(?:contratações?|aquisições?)\s+futuras?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static OBJECT_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)registro\s+de\s+pre[çc]os?|\bSRP\b").unwrap());

// Summary residue in an object description scraped from the cover page
static OBJECT_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)sumário|do\s+registro\s+de\s+preços?\s+\d+|pageref").unwrap()
});

type Stage = fn(&ExtractionContext<'_>, &mut Vec<Finding>) -> Option<Finding>;

const STAGES: [Stage; 3] = [explicit_negation, object_mention, positive_phrase];

pub struct PriceRegistration;

impl FieldRule for PriceRegistration {
    fn name(&self) -> &str {
        "PriceRegistration"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        let decision = STAGES
            .iter()
            .find_map(|stage| stage(ctx, &mut findings))
            .unwrap_or_else(|| Finding::assign(Field::RegistroPreco, "nao", None));
        findings.push(decision);
        findings
    }
}

/// First match of any pattern, in pattern order, that is not TOC noise.
fn first_substantive<'t>(
    ctx: &ExtractionContext<'t>,
    patterns: &[Regex],
    suppressed: &mut Vec<Finding>,
) -> Option<&'t str> {
    for pattern in patterns {
        for m in pattern.find_iter(ctx.text) {
            if ctx.toc_near(&m) {
                suppressed.push(Finding::suppressed(
                    Field::RegistroPreco,
                    format!("table of contents: {}", m.as_str()),
                ));
                continue;
            }
            return Some(m.as_str());
        }
    }
    None
}

fn explicit_negation(ctx: &ExtractionContext<'_>, suppressed: &mut Vec<Finding>) -> Option<Finding> {
    first_substantive(ctx, &NEGATIONS, suppressed)
        .map(|evidence| Finding::assign(Field::RegistroPreco, "nao", Some(evidence)))
}

fn object_mention(ctx: &ExtractionContext<'_>, _suppressed: &mut Vec<Finding>) -> Option<Finding> {
    let objeto = ctx.field(Field::ObjetoDescricao)?;
    if OBJECT_MENTION.is_match(objeto) && !OBJECT_SUMMARY.is_match(objeto) {
        Some(Finding::assign(Field::RegistroPreco, "sim", Some(objeto)))
    } else {
        None
    }
}

fn positive_phrase(ctx: &ExtractionContext<'_>, suppressed: &mut Vec<Finding>) -> Option<Finding> {
    first_substantive(ctx, &POSITIVES, suppressed)
        .map(|evidence| Finding::assign(Field::RegistroPreco, "sim", Some(evidence)))
}
