use std::collections::HashSet;

/// Jaccard overlap of the lowercased whitespace-separated token sets of two texts.
///
/// Returns 0.0 when either side has no tokens.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let left = token_set(a);
    let right = token_set(b);

    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();

    intersection as f64 / union as f64
}

fn token_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_is_one() {
        let text = "The AMF terminates the N2 interface";
        assert!((jaccard(text, text) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn symmetric() {
        let a = "latency budget under ten milliseconds";
        let b = "the latency budget is ten milliseconds end to end";
        assert!((jaccard(a, b) - jaccard(b, a)).abs() < 1e-12);
    }

    #[test]
    fn case_insensitive() {
        assert!((jaccard("UPF Anchor", "upf anchor") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_is_zero() {
        assert_eq!(jaccard("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn empty_side_is_zero() {
        assert_eq!(jaccard("", "anything"), 0.0);
        assert_eq!(jaccard("anything", "   \n "), 0.0);
        assert_eq!(jaccard("", ""), 0.0);
    }

    #[test]
    fn partial_overlap_ratio() {
        // {a, b, c} vs {b, c, d}: 2 shared of 4 distinct
        assert!((jaccard("a b c", "b c d") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn duplicate_tokens_collapse() {
        assert!((jaccard("x x x y", "x y") - 1.0).abs() < 1e-9);
    }
}
