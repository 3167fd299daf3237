use crate::config::ContextConfig;
use crate::text;
use crate::types::{Field, FieldMap};
use regex::{Match, Regex};
use std::sync::LazyLock;

// Phrases that cancel a nearby requirement ("não se aplica", "vedado", ...)
static NEGATION_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)não\s+(?:se\s+)?aplica|não\s+haverá|não\s+há\b|não\s+será|não\s+se\s+trata|vedad[oa]|não\s+admitid[oa]|não\s+permitid[oa]|não\s+exigid[oa]|não\s+obrigatóri[oa]|não\s+poderá|não\s+pode\b",
    )
    .unwrap()
});

// Literal index markers left by word processors
static TOC_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)PAGEREF|_Toc\d*|sumário").unwrap());

// "DO REGISTRO DE PREÇOS 4" - heading followed by a bare page number
static TOC_PAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bD[AO]S?[ ][\p{Lu} ]{3,}?[ \t.…]+\d{1,3}[ \t]*\r?\n").unwrap()
});

/// Read-only view shared by every field rule during one extraction pass.
pub struct ExtractionContext<'a> {
    /// Original document text
    pub text: &'a str,
    /// Lowercased copy, for phrase checks only; offsets do not map onto `text`
    pub lower: &'a str,
    /// Fields extracted by earlier rules
    pub fields: &'a FieldMap,
    pub windows: &'a ContextConfig,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(
        text: &'a str,
        lower: &'a str,
        fields: &'a FieldMap,
        windows: &'a ContextConfig,
    ) -> Self {
        Self {
            text,
            lower,
            fields,
            windows,
        }
    }

    /// Case-insensitive phrase check; `phrase` must already be lowercase.
    pub fn mentions(&self, phrase: &str) -> bool {
        self.lower.contains(phrase)
    }

    pub fn field(&self, field: Field) -> Option<&'a str> {
        self.fields.get(field)
    }

    /// Text around a match, `radius` characters on each side.
    pub fn around(&self, m: &Match<'_>, radius: usize) -> &'a str {
        text::window(self.text, m.start(), m.end(), radius)
    }

    /// Negation marker within the configured negation window of a match.
    pub fn negated_near(&self, m: &Match<'_>) -> bool {
        has_negation(self.around(m, self.windows.negation_window))
    }

    /// Table-of-contents noise within the configured TOC window of a match.
    pub fn toc_near(&self, m: &Match<'_>) -> bool {
        is_toc_noise(self.around(m, self.windows.toc_window))
    }

    /// Like [`around`](Self::around) but clipped to the sentence holding the
    /// match: line breaks, semicolons and sentence-ending periods bound it.
    pub fn sentence_around(&self, m: &Match<'_>, radius: usize) -> (usize, &'a str) {
        let lo = text::retreat_chars(self.text, m.start(), radius);
        let hi = text::advance_chars(self.text, m.end(), radius);

        let before = &self.text[lo..m.start()];
        let start = before
            .rfind(['\n', ';'])
            .map(|i| i + 1)
            .into_iter()
            .chain(before.rfind(". ").map(|i| i + 2))
            .max()
            .map_or(lo, |i| lo + i);

        let after = &self.text[m.end()..hi];
        let end = after
            .find(['\n', ';'])
            .into_iter()
            .chain(after.find(". "))
            .min()
            .map_or(hi, |i| m.end() + i);

        (start, &self.text[start..end])
    }
}

pub fn has_negation(context: &str) -> bool {
    NEGATION_MARKERS.is_match(context)
}

/// True when the text looks like table-of-contents material rather than a
/// substantive statement.
pub fn is_toc_noise(context: &str) -> bool {
    TOC_MARKERS.is_match(context) || TOC_PAGE_LINE.is_match(context)
}

/// Brazilian amount to plain decimal: "1.234,56" becomes "1234.56".
pub fn normalize_amount(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', ','])
        .replace('.', "")
        .replace(',', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_markers() {
        assert!(has_negation("A disciplina deste item não se aplica"));
        assert!(has_negation("É VEDADA a participação"));
        assert!(has_negation("a vistoria não será exigida"));
        assert!(!has_negation("será aplicado o tratamento diferenciado"));
    }

    #[test]
    fn test_toc_noise() {
        assert!(is_toc_noise("Sumário\n1. DO OBJETO"));
        assert!(is_toc_noise("2. DO REGISTRO DE PREÇOS 4\n3. DA PARTICIPAÇÃO"));
        assert!(is_toc_noise("DO REGISTRO DE PREÇOS\t4\n"));
        assert!(is_toc_noise("HYPERLINK \\l _Toc1234 PAGEREF"));
        assert!(!is_toc_noise("2. DO REGISTRO DE PREÇOS\n2.1. As regras"));
        assert!(!is_toc_noise("nos termos da LEI 14.133, de 2021"));
    }

    #[test]
    fn test_normalize_amount() {
        assert_eq!(normalize_amount("1.234.567,89"), "1234567.89");
        assert_eq!(normalize_amount("10.000,00."), "10000.00");
        assert_eq!(normalize_amount("0,5"), "0.5");
        assert_eq!(normalize_amount("350"), "350");
    }

    #[test]
    fn test_sentence_around_stops_at_boundaries() {
        let text = "É vedada a participação de consórcios. Serão admitidas cooperativas; demais regras.";
        let fields = FieldMap::new();
        let windows = ContextConfig::default();
        let lower = text.to_lowercase();
        let ctx = ExtractionContext::new(text, &lower, &fields, &windows);

        let re = Regex::new("cooperativas").unwrap();
        let m = re.find(text).unwrap();
        let (_, sentence) = ctx.sentence_around(&m, 150);
        assert_eq!(sentence, "Serão admitidas cooperativas");
    }
}
