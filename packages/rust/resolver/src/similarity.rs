//! Ratcliff/Obershelp similarity for "did you mean" suggestions.
//!
//! `ratio = 2·M / (|a| + |b|)` where `M` is the number of characters in the
//! matching blocks found by repeatedly taking the longest common substring
//! and recursing on both sides of it.

/// Similarity of `a` and `b` in `[0, 1]`. Two empty strings score 1.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Longest common substring as `(start_a, start_b, len)`; ties go to the
/// earliest start in `a`, then in `b`.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let len = cur[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    best
}

/// Up to `limit` candidates scoring at least `cutoff` against `query`,
/// best first, ties broken by the candidate text.
pub fn close_matches<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    limit: usize,
    cutoff: f64,
) -> Vec<&'a str> {
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|c| (ratio(query, c), c))
        .filter(|(score, _)| *score >= cutoff)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(limit).map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn ratio_basics() {
        assert!(approx(ratio("abcd", "abcd"), 1.0));
        assert!(approx(ratio("abcd", "wxyz"), 0.0));
        assert!(approx(ratio("", ""), 1.0));
        assert!(approx(ratio("abc", ""), 0.0));
    }

    #[test]
    fn ratio_recurses_around_longest_block() {
        // blocks "ab" and "d": M = 3
        assert!(approx(ratio("abcd", "abxd"), 0.75));
        // one transposition in a longer word
        assert!(approx(ratio("ipamorelin", "ipamorelni"), 0.9));
    }

    #[test]
    fn close_matches_orders_and_cuts() {
        let terms = ["semaglutide", "tirzepatide", "semax", "selank"];
        let hits = close_matches("semaglutid", terms, 5, 0.78);
        assert_eq!(hits, ["semaglutide"]);

        let hits = close_matches("semax", terms, 5, 0.0);
        assert_eq!(hits[0], "semax");
        assert_eq!(hits.len(), 4);

        assert!(close_matches("zzz", terms, 5, 0.78).is_empty());
    }

    #[test]
    fn close_matches_breaks_ties_by_term() {
        let hits = close_matches("ab", ["ax", "aa", "ay"], 2, 0.5);
        assert_eq!(hits, ["aa", "ax"]);
    }
}
