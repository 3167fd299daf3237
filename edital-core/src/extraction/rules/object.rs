use crate::extraction::context::ExtractionContext;
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;
use std::sync::LazyLock;

// "OBJETO: <descrição>" up to the next header keyword
static OBJECT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)OBJETO[:\s]+([^.]{20,300})\s*(?:VALOR|DATA|CRITÉRIO|MODO|PREFERÊNCIA|EDITAL|Sumário|DO REGISTRO)",
    )
    .unwrap()
});

// Cover-page fields that bleed into the description
static TRAILING_HEADERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\s*(?:VALOR TOTAL|DATA DA|CRITÉRIO|Sumário).*$").unwrap());

// "1. DO OBJETO: ..." or "1.1 OBJETO ..." on a single line
static OBJECT_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:1\.|1\.1\.?)\s*(?:DO\s+)?OBJETO[:\s]+([^\n]{20,300})").unwrap()
});

const ITEM_STOPWORDS: [&str; 7] = [
    "VALOR",
    "EDITAL",
    "Sumário",
    "DO REGISTRO",
    "DA PARTICIPAÇÃO",
    "CRITÉRIO",
    "DATA",
];

/// Stopwords closer than this to the start are part of the description.
const MIN_DESCRIPTION_CHARS: usize = 20;

pub struct ObjectDescription;

impl FieldRule for ObjectDescription {
    fn name(&self) -> &str {
        "ObjectDescription"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        header_description(ctx.text)
            .or_else(|| item_description(ctx.text))
            .map(|(description, evidence)| {
                vec![Finding::assign(
                    Field::ObjetoDescricao,
                    description,
                    Some(evidence),
                )]
            })
            .unwrap_or_default()
    }
}

fn header_description(text: &str) -> Option<(String, &str)> {
    let caps = OBJECT_HEADER.captures(text)?;
    let (whole, body) = (caps.get(0)?, caps.get(1)?);

    let description = TRAILING_HEADERS.replace(body.as_str(), "");
    let description = description.trim();
    if description.is_empty() {
        return None;
    }
    Some((description.to_string(), &text[whole.start()..body.end()]))
}

fn item_description(text: &str) -> Option<(String, &str)> {
    let caps = OBJECT_ITEM.captures(text)?;
    let (whole, body) = (caps.get(0)?, caps.get(1)?);

    let mut description = body.as_str();
    let cut = ITEM_STOPWORDS
        .iter()
        .filter_map(|stopword| description.find(stopword))
        .filter(|&i| description[..i].chars().count() > MIN_DESCRIPTION_CHARS)
        .min();
    if let Some(i) = cut {
        description = &description[..i];
    }

    let description = description
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'))
        .trim_end();
    if description.is_empty() {
        return None;
    }
    Some((description.to_string(), whole.as_str()))
}
