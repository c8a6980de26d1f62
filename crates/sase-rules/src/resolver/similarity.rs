//! Character-overlap similarity for the last resolution tier
//!
//! The score is the size of the (multiset) intersection of the two strings'
//! lower-cased characters divided by the longer length. Character order is
//! ignored, so this is deliberately cheaper and looser than edit distance.

use std::collections::HashMap;

/// Overlap ratio in `[0, 1]`; two empty strings score 0.
pub fn overlap_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }

    let mut remaining: HashMap<char, usize> = HashMap::new();
    for c in &b {
        *remaining.entry(*c).or_default() += 1;
    }

    let mut common = 0usize;
    for c in &a {
        if let Some(count) = remaining.get_mut(c) {
            if *count > 0 {
                *count -= 1;
                common += 1;
            }
        }
    }

    common as f64 / longest as f64
}

/// Highest-scoring candidate strictly above `threshold`. Ties keep the first
/// candidate in iteration order.
pub fn best_match<'c, I>(key: &str, candidates: I, threshold: f64) -> Option<(&'c str, f64)>
where
    I: IntoIterator<Item = &'c str>,
{
    let mut best: Option<(&'c str, f64)> = None;
    for candidate in candidates {
        let score = overlap_ratio(key, candidate);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best.filter(|(_, score)| *score > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_ratio() {
        assert_eq!(overlap_ratio("abcd", "abxy"), 0.5);
        assert_eq!(overlap_ratio("abc", "cba"), 1.0);
        assert_eq!(overlap_ratio("Email", "email"), 1.0);
        assert_eq!(overlap_ratio("", ""), 0.0);
        // Repeated characters only count as often as they appear on both sides.
        assert_eq!(overlap_ratio("aaaa", "abcd"), 0.25);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(best_match("abcd", ["abxy"], 0.5), None);

        let key = format!("{}{}", "a".repeat(51), "b".repeat(49));
        let candidate = format!("{}{}", "a".repeat(51), "c".repeat(49));
        let (found, score) = best_match(&key, [candidate.as_str()], 0.5).unwrap();
        assert_eq!(found, candidate);
        assert!((score - 0.51).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let found = best_match("abcz", ["abcx", "abcy"], 0.5).map(|(c, _)| c);
        assert_eq!(found, Some("abcx"));
    }

    #[test]
    fn test_highest_score_wins() {
        let found = best_match("company", ["compass", "companyName", "company_"], 0.5);
        assert_eq!(found.map(|(c, _)| c), Some("company_"));
    }
}
