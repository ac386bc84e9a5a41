use strsim::levenshtein;

/// Largest edit distance accepted against `reference`: a tenth of its length,
/// rounded half up.
pub(super) fn threshold(reference: &str) -> usize {
    (reference.chars().count() + 5) / 10
}

/// `true` if `current` is within [`threshold`] edits of `reference`.
pub(super) fn is_similar(reference: &str, current: &str) -> bool {
    levenshtein(reference, current) <= threshold(reference)
}

/// Like [`is_similar`], but a prefix of `reference` also qualifies.
pub(super) fn is_similar_value(reference: &str, current: &str) -> bool {
    reference.starts_with(current) || is_similar(reference, current)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", 0)]
    #[case("abcd", 0)]
    #[case("abcde", 1)]
    #[case("quarkus.http.port", 2)]
    #[case("abcdefghijklmnopqrstuvwxy", 3)]
    fn thresholds_round_half_up(#[case] reference: &str, #[case] expected: usize) {
        assert_eq!(threshold(reference), expected);
    }

    #[test]
    fn names() {
        assert!(is_similar("quarkus.http.port", "quarkus.http.prot"));
        assert!(is_similar("quarkus.http.port", "quarkus.http.port"));
        assert!(!is_similar("quarkus.http.port", "quarkus.http.pot.x"));
        assert!(!is_similar("quarkus.http.port", "totally.unrelated"));
        assert!(!is_similar("port", "prot"));
    }

    #[test]
    fn values() {
        assert!(is_similar_value("debug", "deb"));
        assert!(is_similar_value("fine-grained", "fine-graned"));
        assert!(!is_similar_value("debug", "dbg"));
        assert!(!is_similar_value("info", "infos"));
    }
}
