use strsim::normalized_levenshtein;

/// Token-order-insensitive similarity between two strings, scaled to 0-100.
///
/// Each string is whitespace-tokenized, its tokens sorted lexicographically
/// and rejoined, and the two token-sorted strings compared with a normalized
/// edit-distance ratio. 100 means identical after token reordering. The
/// score is symmetric, and any string scores 100 against itself.
pub fn token_sort_similarity(a: &str, b: &str) -> u8 {
    let a_sorted = token_sort(a);
    let b_sorted = token_sort(b);

    (normalized_levenshtein(&a_sorted, &b_sorted) * 100.0).round() as u8
}

fn token_sort(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(token_sort_similarity("acme widgets", "acme widgets"), 100);
    }

    #[test]
    fn test_token_order_insensitive() {
        assert_eq!(token_sort_similarity("widgets acme", "acme widgets"), 100);
        assert_eq!(
            token_sort_similarity("global trading acme", "acme global trading"),
            100
        );
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            ("acme", "acme widgets"),
            ("alpha beta", "beta gamma"),
            ("", "nonempty"),
        ];
        for (a, b) in pairs {
            assert_eq!(token_sort_similarity(a, b), token_sort_similarity(b, a));
        }
    }

    #[test]
    fn test_dissimilar_names_score_low() {
        assert!(token_sort_similarity("acme widgets", "zenith logistics") < 40);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(token_sort_similarity("", ""), 100);
        assert_eq!(token_sort_similarity("abc", "xyz"), 0);
    }

    #[test]
    fn test_extra_whitespace_ignored() {
        assert_eq!(token_sort_similarity("acme   widgets", "widgets acme"), 100);
    }
}
