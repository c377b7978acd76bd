//! Plain-text find and replace over the buffer.
//!
//! Ranges are char indices into the rope. Matching is literal; case folding
//! compares characters with `to_lowercase`.

use std::ops::Range;

use super::Buffer;

/// State of the last search
#[derive(Debug, Default)]
pub struct Search {
    pub query: String,
    /// Range of the match the cursor was last moved to
    pub current: Option<Range<usize>>,
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }
}

fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    a == b || (!case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
}

fn matches_at(haystack: &[char], at: usize, needle: &[char], case_sensitive: bool) -> bool {
    haystack[at..at + needle.len()]
        .iter()
        .zip(needle)
        .all(|(&a, &b)| chars_eq(a, b, case_sensitive))
}

/// Every non-overlapping match, in buffer order
pub fn find_all(buffer: &Buffer, needle: &str, case_sensitive: bool) -> Vec<Range<usize>> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return Vec::new();
    }
    let haystack: Vec<char> = buffer.chars().collect();
    let mut found = Vec::new();
    let mut at = 0;
    while at + needle.len() <= haystack.len() {
        if matches_at(&haystack, at, &needle, case_sensitive) {
            found.push(at..at + needle.len());
            at += needle.len();
        } else {
            at += 1;
        }
    }
    found
}

/// First match starting at or after `from`, wrapping to the start of the
/// buffer when nothing follows
pub fn find_next(
    buffer: &Buffer,
    needle: &str,
    from: usize,
    case_sensitive: bool,
) -> Option<Range<usize>> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return None;
    }
    let haystack: Vec<char> = buffer.chars().collect();
    let last = haystack.len().checked_sub(needle.len())?;
    let from = from.min(last + 1);
    (from..=last)
        .chain(0..from)
        .find(|&at| matches_at(&haystack, at, &needle, case_sensitive))
        .map(|at| at..at + needle.len())
}

/// Replace every occurrence of `needle`, returning how many were replaced
pub fn replace_all(
    buffer: &mut Buffer,
    needle: &str,
    replacement: &str,
    case_sensitive: bool,
) -> usize {
    let found = find_all(buffer, needle, case_sensitive);
    // Back to front so earlier ranges stay valid
    for range in found.iter().rev() {
        buffer.replace_range(range.clone(), replacement);
    }
    found.len()
}
