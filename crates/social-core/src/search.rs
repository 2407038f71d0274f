//! Fuzzy description matching
//!
//! Trigram similarity computed the way PostgreSQL's `pg_trgm` does it, so the
//! in-memory backend matches and ranks like `similarity()` in SQL.

use std::collections::HashSet;

/// Minimum similarity for a description to match a search query
pub const SIMILARITY_THRESHOLD: f64 = 0.11;

/// Trigrams of `text`. Each alphanumeric word is lowercased and padded with
/// two leading spaces and one trailing space.
pub fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut set = HashSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars().flat_map(char::to_lowercase))
            .chain(std::iter::once(' '))
            .collect();
        set.extend(padded.windows(3).map(|w| [w[0], w[1], w[2]]));
    }
    set
}

/// Shared trigrams over all distinct trigrams, in `0.0..=1.0`
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(&right).count();
    let total = left.len() + right.len() - shared;
    shared as f64 / total as f64
}

pub fn is_similar(description: &str, query: &str) -> bool {
    trigram_similarity(description, query) > SIMILARITY_THRESHOLD
}
