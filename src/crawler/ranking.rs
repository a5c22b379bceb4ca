//! Word-count ranking
//!
//! Runs once, single-threaded, after every traversal task has completed.

use std::collections::HashMap;

/// Ranks accumulated word counts and keeps the top entries
///
/// Ordering:
/// 1. Occurrence count, descending
/// 2. Word length, descending
/// 3. Lexicographic order, ascending
///
/// The returned vector's order is the rank order; downstream serialization
/// must preserve it. If fewer than `popular_word_count` distinct words
/// exist, all of them are returned, fully ordered. A count of zero yields
/// an empty vector.
pub fn rank_words(counts: HashMap<String, u64>, popular_word_count: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts.into_iter().collect();

    entries.sort_by(|(word_a, count_a), (word_b, count_b)| {
        count_b
            .cmp(count_a)
            .then_with(|| word_b.len().cmp(&word_a.len()))
            .then_with(|| word_a.cmp(word_b))
    });

    entries.truncate(popular_word_count);
    entries
}
