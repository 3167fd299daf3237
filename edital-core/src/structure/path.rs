//! Ordering for dotted section numbers.
//!
//! Edital items are numbered "3", "3.5", "3.5.2", ... and must sort in
//! document order: "2.10" after "2.9", "3" before "3.1". Plain string
//! comparison gets both wrong, so numbers are compared component by
//! component as integers. A missing trailing component counts as 0, which
//! makes "3" and "3.0" equal.

use std::cmp::Ordering;

/// Integer components of a dotted path. Non-numeric components count as 0.
fn components(path: &str) -> Vec<u64> {
    path.trim()
        .trim_end_matches('.')
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(0))
        .collect()
}

/// Compare two dotted numeric paths component-wise.
pub fn compare_dotted_path(a: &str, b: &str) -> Ordering {
    let left = components(a);
    let right = components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// True when `candidate` sits strictly below `ancestor` in the outline.
pub fn is_descendant(candidate: &str, ancestor: &str) -> bool {
    candidate.len() > ancestor.len()
        && candidate.starts_with(ancestor)
        && candidate[ancestor.len()..].starts_with('.')
}
