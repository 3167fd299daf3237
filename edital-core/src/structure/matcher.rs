use crate::types::Section;

/// Snippet words shorter than this (in characters) are ignored when scoring.
const MIN_SIGNIFICANT_WORD: usize = 5;

/// Resolves which section of the outline a snippet of text came from.
///
/// Lowercased section text is computed once, so one matcher can serve every
/// attribution of an extraction pass.
pub struct RelevanceMatcher<'a> {
    sections: &'a [Section],
    contents: Vec<String>,
    haystacks: Vec<String>,
}

impl<'a> RelevanceMatcher<'a> {
    pub fn new(sections: &'a [Section]) -> Self {
        let contents = sections.iter().map(|s| s.content.to_lowercase()).collect();
        let haystacks = sections
            .iter()
            .map(|s| format!("{} {}", s.title, s.content).to_lowercase())
            .collect();
        Self {
            sections,
            contents,
            haystacks,
        }
    }

    /// Exact containment in a section's content wins outright, in outline
    /// order. Otherwise the section whose title and content contain the most
    /// significant snippet words wins; ties keep the earlier section.
    pub fn find(&self, snippet: &str) -> Option<&'a Section> {
        if self.sections.is_empty() {
            return None;
        }

        let needle = snippet.to_lowercase();
        if let Some(i) = self.contents.iter().position(|c| c.contains(&needle)) {
            return Some(&self.sections[i]);
        }

        let words: Vec<&str> = needle
            .split_whitespace()
            .filter(|w| w.chars().count() >= MIN_SIGNIFICANT_WORD)
            .collect();

        let mut best: Option<(usize, usize)> = None;
        for (i, haystack) in self.haystacks.iter().enumerate() {
            let score = words.iter().filter(|w| haystack.contains(*w)).count();
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((i, score));
            }
        }

        best.map(|(i, _)| &self.sections[i])
    }
}

/// One-shot lookup; prefer [`RelevanceMatcher`] for repeated queries.
pub fn find_section<'a>(snippet: &str, sections: &'a [Section]) -> Option<&'a Section> {
    RelevanceMatcher::new(sections).find(snippet)
}
