//! Normalized string similarity based on Levenshtein edit distance.
//!
//! Used to spot redundant titles (merge candidates) and to penalize expansion
//! candidates that repeat what is already selected.

/// Classic Levenshtein distance: insertion, deletion and substitution each cost 1.
///
/// Computed over Unicode scalar values with the two-row dynamic-programming
/// table: `row[j]` holds the distance between the first `i` chars of `a` and
/// the first `j` chars of `b`. O(n·m) time, O(m) memory.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 − distance(longer, shorter) / len(longer)`, in [0, 1].
///
/// Two empty strings are identical (1.0).
pub fn calculate_string_similarity(a: &str, b: &str) -> f64 {
    let (longer, shorter) = if a.chars().count() >= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let longer_len = longer.chars().count();
    if longer_len == 0 {
        return 1.0;
    }

    1.0 - levenshtein(longer, shorter) as f64 / longer_len as f64
}

/// Titles above this similarity are treated as covering the same material.
pub const MERGE_SIMILARITY_THRESHOLD: f64 = 0.6;

const MIN_STEM_LEN: usize = 4;

/// Decides whether two topic titles describe mergeable material.
///
/// True when the case-insensitive similarity exceeds the merge threshold, or
/// when the titles share a stem: a word of at least four characters in one
/// title that is a strict prefix of a longer word in the other ("Math" /
/// "Mathematics"). Identical words alone ("Data Structures" / "Data Mining")
/// do not count.
pub fn titles_mergeable(a: &str, b: &str) -> bool {
    let a_norm = a.trim().to_lowercase();
    let b_norm = b.trim().to_lowercase();

    if a_norm.is_empty() || b_norm.is_empty() {
        return false;
    }

    calculate_string_similarity(&a_norm, &b_norm) > MERGE_SIMILARITY_THRESHOLD
        || shares_stem(&a_norm, &b_norm)
}

fn shares_stem(a: &str, b: &str) -> bool {
    let a_words = words(a);
    let b_words = words(b);

    a_words
        .iter()
        .any(|wa| b_words.iter().any(|wb| is_strict_stem(wa, wb) || is_strict_stem(wb, wa)))
}

fn is_strict_stem(stem: &str, word: &str) -> bool {
    stem.chars().count() >= MIN_STEM_LEN && stem.len() < word.len() && word.starts_with(stem)
}

fn words(s: &str) -> Vec<&str> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_known_values() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn test_identical_strings_are_fully_similar() {
        assert_eq!(calculate_string_similarity("Linear Algebra", "Linear Algebra"), 1.0);
        assert_eq!(calculate_string_similarity("", ""), 1.0);
    }

    #[test]
    fn test_similarity_against_empty_is_zero() {
        assert_eq!(calculate_string_similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let ab = calculate_string_similarity("Mathematics", "Math Fundamentals");
        let ba = calculate_string_similarity("Math Fundamentals", "Mathematics");
        assert!((ab - ba).abs() < 1e-12);
        // distance 10 over 17 chars
        assert!((ab - (1.0 - 10.0 / 17.0)).abs() < 1e-9, "similarity was {ab}");
    }

    #[test]
    fn test_near_identical_titles_mergeable() {
        assert!(titles_mergeable("Thermodynamics", "Thermodynamic"));
        assert!(titles_mergeable("Cell Biology", "cell biology"));
    }

    #[test]
    fn test_shared_stem_titles_mergeable() {
        assert!(titles_mergeable("Mathematics", "Math Fundamentals"));
    }

    #[test]
    fn test_short_stems_do_not_merge() {
        // "art" is below the stem length
        assert!(!titles_mergeable("Art History", "Artificial Intelligence"));
    }

    #[test]
    fn test_shared_whole_word_is_not_a_stem() {
        assert!(!titles_mergeable("Data Structures", "Data Mining"));
        assert!(!titles_mergeable("Linear Algebra", "Linear Regression"));
        assert!(!titles_mergeable("Cell Biology", "Marine Biology"));
    }

    #[test]
    fn test_unrelated_titles_not_mergeable() {
        assert!(!titles_mergeable("Organic Chemistry", "World War II"));
        assert!(!titles_mergeable("", "Anything"));
    }
}
