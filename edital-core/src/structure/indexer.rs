use super::path::{compare_dotted_path, is_descendant};
use crate::config::StructureConfig;
use crate::text::{advance_chars, char_len, truncate_chars};
use crate::types::Section;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

// "2. DO REGISTRO DE PREÇOS" - uppercase title, no digits, whole line
static TOP_LEVEL_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(\d+)\.[ \t]+(D[AO]S?[ \t]+\p{Lu}[\p{Lu} \t,/()\-–]*?)[ \t\r]*$")
        .unwrap()
});

// "3.5.2. Texto" or "3.5.2 Texto"
static SUB_ITEM_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(\d+(?:\.\d+)+)(?:\.[ \t]*|[ \t]+)(\S[^\n]*?)[ \t\r]*$").unwrap()
});

// "4. Qualquer linha iniciada por maiúscula"
static FALLBACK_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(\d+)\.[ \t]+(\p{Lu}[^\n]*?)[ \t\r]*$").unwrap()
});

// Any numbered line that can end a section's content
static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:(\d+)\.[ \t]+|(\d+(?:\.\d+)+)(?:\.|[ \t]))").unwrap()
});

// Table-of-contents page number after a title: tab, dot leader or wide gap
static PAGE_NUMBER_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\t|\.{3,}|…|[ ]{2,})[ \t.]*\d{1,4}$").unwrap());

/// How many sections each strategy contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub top_level: usize,
    pub sub_items: usize,
    pub fallback: usize,
}

impl IndexStats {
    pub fn total(&self) -> usize {
        self.top_level + self.sub_items + self.fallback
    }
}

/// Recovers the numbered outline of an edital from plain text.
pub struct StructureIndexer {
    config: StructureConfig,
}

impl Default for StructureIndexer {
    fn default() -> Self {
        Self::new(StructureConfig::default())
    }
}

impl StructureIndexer {
    pub fn new(config: StructureConfig) -> Self {
        Self { config }
    }

    pub fn index(&self, text: &str) -> Vec<Section> {
        self.index_with_stats(text).0
    }

    /// Index the text and report per-strategy counts. Never fails: a text
    /// without recognizable headings yields an empty outline.
    pub fn index_with_stats(&self, text: &str) -> (Vec<Section>, IndexStats) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut sections = Vec::new();
        let mut stats = IndexStats::default();

        stats.top_level = self.collect(
            text,
            &TOP_LEVEL_HEADING,
            self.config.min_title_chars,
            usize::MAX,
            self.config.top_level_window,
            &mut seen,
            &mut sections,
        );

        stats.sub_items = self.collect(
            text,
            &SUB_ITEM_HEADING,
            self.config.min_title_chars,
            usize::MAX,
            self.config.sub_item_window,
            &mut seen,
            &mut sections,
        );

        if sections.len() < self.config.fallback_threshold {
            stats.fallback = self.collect(
                text,
                &FALLBACK_HEADING,
                self.config.min_fallback_title_chars,
                self.config.max_fallback_title_chars,
                self.config.fallback_window,
                &mut seen,
                &mut sections,
            );
        }

        sections.sort_by(|a, b| compare_dotted_path(&a.number, &b.number));
        (sections, stats)
    }

    /// Run one heading strategy, appending accepted sections. Returns how many were added.
    #[allow(clippy::too_many_arguments)]
    fn collect(
        &self,
        text: &str,
        pattern: &Regex,
        min_title: usize,
        max_title: usize,
        window: usize,
        seen: &mut HashSet<String>,
        sections: &mut Vec<Section>,
    ) -> usize {
        let mut added = 0;

        for caps in pattern.captures_iter(text) {
            let (Some(heading), Some(number), Some(raw_title)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let number = number.as_str();
            if seen.contains(number) {
                continue;
            }

            let title = clean_title(raw_title.as_str());
            let title_len = char_len(title);
            if title_len < min_title || title_len > max_title || is_heading_noise(title) {
                continue;
            }
            let title = truncate_chars(title, self.config.max_sub_item_title_chars);

            let content = section_content(text, heading.end(), number, window);
            seen.insert(number.to_string());
            sections.push(Section::new(number, title, content));
            added += 1;
        }

        added
    }
}

/// Index with default thresholds.
pub fn index(text: &str) -> Vec<Section> {
    StructureIndexer::default().index(text)
}

fn clean_title(raw: &str) -> &str {
    raw.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':'))
        .trim_end()
}

/// Markup leftovers, bare numbers and table-of-contents lines.
fn is_heading_noise(title: &str) -> bool {
    if title
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == '.' || c == ',')
    {
        return true;
    }
    if title.contains('<') || title.contains("PAGEREF") || title.contains("_Toc") {
        return true;
    }
    PAGE_NUMBER_TAIL.is_match(title)
}

/// Text after a heading up to the next numbered line that is not one of its
/// descendants, bounded by `window` characters.
fn section_content(text: &str, start: usize, number: &str, window: usize) -> String {
    let limit = advance_chars(text, start, window);
    let region = &text[start..limit];

    let end = NUMBERED_LINE
        .captures_iter(region)
        .find_map(|caps| {
            let candidate = caps.get(1).or_else(|| caps.get(2))?;
            if is_descendant(candidate.as_str(), number) {
                None
            } else {
                caps.get(0).map(|m| m.start())
            }
        })
        .unwrap_or(region.len());

    region[..end].trim().to_string()
}
