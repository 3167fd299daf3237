use crate::extraction::context::ExtractionContext;
use crate::extraction::engine::{FieldRule, Finding};
use crate::types::Field;
use regex::Regex;
use std::sync::LazyLock;

static COOPERATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcooperativas?\b").unwrap());

static CONSORTIUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcons[óo]rcios?\b").unwrap());

static DENIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)vedad[oa]s?|não\s+(?:ser(?:á|ão)\s+)?admitid[oa]s?|não\s+poderão\s+participar",
    )
    .unwrap()
});

static ALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)admitid[oa]s?|permitid[oa]s?|poderão\s+participar").unwrap()
});

pub struct Cooperatives;

impl FieldRule for Cooperatives {
    fn name(&self) -> &str {
        "Cooperatives"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        participation(ctx, &COOPERATIVE, Field::Cooperativas)
    }
}

pub struct Consortium;

impl FieldRule for Consortium {
    fn name(&self) -> &str {
        "Consortium"
    }

    fn apply(&self, ctx: &ExtractionContext<'_>) -> Vec<Finding> {
        participation(ctx, &CONSORTIUM, Field::Consorcio)
    }
}

/// Walk the mentions in document order; the first whose sentence carries a
/// denial or a permission decides. Denials are checked first.
fn participation(ctx: &ExtractionContext<'_>, mention: &Regex, field: Field) -> Vec<Finding> {
    for m in mention.find_iter(ctx.text) {
        let (offset, sentence) = ctx.sentence_around(&m, ctx.windows.negation_window);

        let decision = DENIED
            .find(sentence)
            .map(|marker| ("vedado", marker))
            .or_else(|| ALLOWED.find(sentence).map(|marker| ("permitido", marker)));

        if let Some((value, marker)) = decision {
            let start = m.start().min(offset + marker.start());
            let end = m.end().max(offset + marker.end());
            return vec![Finding::assign(field, value, Some(&ctx.text[start..end]))];
        }
    }
    Vec::new()
}
