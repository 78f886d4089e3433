//! "Did-you-mean" name suggestions.

use crate::types::Suggestion;

/// Default maximum edit distance for a suggestion.
pub const DEFAULT_MAX_DISTANCE: usize = 4;

/// Normalizes a name for comparison: trimmed and uppercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Levenshtein distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    if a.is_empty() {
        return b.chars().count();
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let b_chars: Vec<char> = b.chars().collect();
    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut cur_row = vec![0; b_chars.len() + 1];

    for (i, a_ch) in a.chars().enumerate() {
        cur_row[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != *b_ch);
            cur_row[j + 1] = (prev_row[j + 1] + 1)
                .min(cur_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut cur_row);
    }
    prev_row[b_chars.len()]
}

/// Ranks `corpus` entries within `max_distance` edits of `query`.
///
/// Both sides are normalized with [`normalize_name`]. Candidates are sorted
/// by ascending distance; ties keep corpus order.
pub fn suggest<I, S>(query: &str, corpus: I, max_distance: usize) -> Vec<Suggestion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let query = normalize_name(query);
    if query.is_empty() {
        return Vec::new();
    }

    let mut suggestions: Vec<Suggestion> = corpus
        .into_iter()
        .map(|c| normalize_name(c.as_ref()))
        .filter(|c| !c.is_empty())
        .filter_map(|candidate| {
            let distance = levenshtein(&query, &candidate);
            (distance <= max_distance).then_some(Suggestion {
                candidate,
                distance,
            })
        })
        .collect();

    suggestions.sort_by_key(|s| s.distance);
    suggestions
}
