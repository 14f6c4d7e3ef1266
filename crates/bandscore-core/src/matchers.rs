//! Per-kind answer matchers.
//!
//! Every matcher is a pure predicate. An absent or empty value on either side
//! never matches, and a shape mismatch (list submitted for a string key, and
//! so on) is simply `false`.

use std::collections::{BTreeMap, HashSet};

use crate::model::AnswerValue;
use crate::normalize::{normalize, normalize_option};
use crate::registry::MatcherKind;

/// Fraction of the key's words that must appear in a free-text answer.
pub const FLEXIBLE_OVERLAP_THRESHOLD: f64 = 0.70;

/// Trimmed, upper-cased equality.
pub fn exact_match(submitted: &str, correct: &str) -> bool {
    if submitted.trim().is_empty() || correct.trim().is_empty() {
        return false;
    }
    normalize_option(submitted) == normalize_option(correct)
}

/// Equality after [`normalize`].
pub fn case_insensitive(submitted: &str, correct: &str) -> bool {
    if submitted.trim().is_empty() || correct.trim().is_empty() {
        return false;
    }
    normalize(submitted) == normalize(correct)
}

/// Unordered equality of normalized items, ignoring duplicates.
pub fn set_match(submitted: &[String], correct: &[String]) -> bool {
    if submitted.is_empty() || correct.is_empty() {
        return false;
    }
    let submitted: HashSet<String> = submitted.iter().map(|s| normalize(s)).collect();
    let correct: HashSet<String> = correct.iter().map(|s| normalize(s)).collect();
    submitted == correct
}

/// Whole-mapping equality with trimmed keys and trimmed, upper-cased values.
pub fn mapping_match(
    submitted: &BTreeMap<String, String>,
    correct: &BTreeMap<String, String>,
) -> bool {
    if submitted.is_empty() || correct.is_empty() {
        return false;
    }
    let canonical = |map: &BTreeMap<String, String>| -> BTreeMap<String, String> {
        map.iter()
            .map(|(k, v)| (k.trim().to_string(), normalize_option(v)))
            .collect()
    };
    canonical(submitted) == canonical(correct)
}

/// Free-text match tolerant of paraphrase and extra words.
///
/// Rejects answers longer than `max_words`. Otherwise accepts normalized
/// equality, or a submission containing at least
/// [`FLEXIBLE_OVERLAP_THRESHOLD`] of the key's distinct words.
pub fn flexible_text(submitted: &str, correct: &str, max_words: Option<u32>) -> bool {
    if submitted.trim().is_empty() || correct.trim().is_empty() {
        return false;
    }

    let submitted = normalize(submitted);
    let correct = normalize(correct);

    if let Some(limit) = max_words.filter(|&m| m > 0) {
        if submitted.split(' ').count() > limit as usize {
            return false;
        }
    }

    if submitted == correct {
        return true;
    }

    let correct_words: HashSet<&str> = correct.split(' ').collect();
    let submitted_words: HashSet<&str> = submitted.split(' ').collect();
    if correct_words.is_empty() {
        return false;
    }

    let overlap = correct_words.intersection(&submitted_words).count();
    overlap as f64 / correct_words.len() as f64 >= FLEXIBLE_OVERLAP_THRESHOLD
}

impl MatcherKind {
    /// Apply this matcher to a submitted value and an answer key.
    ///
    /// Scalar matchers given a mapping key grade item by item: the submission
    /// must be a mapping with the same (trimmed) keys, and every item must
    /// match under this matcher.
    pub fn matches(
        self,
        submitted: &AnswerValue,
        correct: &AnswerValue,
        max_words: Option<u32>,
    ) -> bool {
        use AnswerValue::{List, Map, Text};

        match (self, submitted, correct) {
            (MatcherKind::SetMatch, List(s), List(c)) => set_match(s, c),
            (MatcherKind::SetMatch, _, _) => false,

            (MatcherKind::MappingMatch, Map(s), Map(c)) => mapping_match(s, c),
            (MatcherKind::MappingMatch, Text(s), Text(c)) => exact_match(s, c),
            (MatcherKind::MappingMatch, _, _) => false,

            (kind, Text(s), Text(c)) => kind.matches_text(s, c, max_words),
            (kind, Map(s), Map(c)) => {
                if s.is_empty() || c.is_empty() {
                    return false;
                }
                let submitted: BTreeMap<&str, &str> =
                    s.iter().map(|(k, v)| (k.trim(), v.as_str())).collect();
                let correct: BTreeMap<&str, &str> =
                    c.iter().map(|(k, v)| (k.trim(), v.as_str())).collect();
                submitted.len() == correct.len()
                    && correct.iter().all(|(key, expected)| {
                        submitted
                            .get(key)
                            .is_some_and(|given| kind.matches_text(given, expected, max_words))
                    })
            }
            _ => false,
        }
    }

    fn matches_text(self, submitted: &str, correct: &str, max_words: Option<u32>) -> bool {
        match self {
            MatcherKind::ExactMatch | MatcherKind::MappingMatch => exact_match(submitted, correct),
            MatcherKind::CaseInsensitive => case_insensitive(submitted, correct),
            MatcherKind::FlexibleText => flexible_text(submitted, correct, max_words),
            MatcherKind::SetMatch => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_letters() {
        assert!(exact_match(" c", "C"));
        assert!(exact_match("not given", "NOT GIVEN"));
        assert!(!exact_match("B", "C"));
        assert!(!exact_match("", "C"));
        assert!(!exact_match("C", ""));
    }

    #[test]
    fn case_insensitive_ignores_case_and_spacing() {
        assert!(case_insensitive("  sarah   WILSON ", "Sarah Wilson"));
        assert!(!case_insensitive("Sara Wilson", "Sarah Wilson"));
        assert!(!case_insensitive("   ", "   "));
    }

    #[test]
    fn set_match_is_order_and_case_independent() {
        assert!(set_match(&strings(&["a", "B"]), &strings(&["b", "A"])));
        assert!(!set_match(&strings(&["a"]), &strings(&["a", "b"])));
        assert!(set_match(&strings(&["A", "a", "C"]), &strings(&["c", "a"])));
        assert!(!set_match(&[], &strings(&["a"])));
        assert!(!set_match(&[], &[]));
    }

    #[test]
    fn mapping_match_whole_mapping() {
        let correct: BTreeMap<String, String> =
            [("Dr. Smith".to_string(), "C".to_string()), ("Ms. Lee".to_string(), "A".to_string())]
                .into_iter()
                .collect();
        let good: BTreeMap<String, String> =
            [(" Dr. Smith ".to_string(), " c".to_string()), ("Ms. Lee".to_string(), "a".to_string())]
                .into_iter()
                .collect();
        let partial: BTreeMap<String, String> =
            [("Dr. Smith".to_string(), "C".to_string())].into_iter().collect();

        assert!(mapping_match(&good, &correct));
        assert!(!mapping_match(&partial, &correct));
        assert!(!mapping_match(&BTreeMap::new(), &correct));
    }

    #[test]
    fn flexible_text_overlap() {
        assert!(flexible_text("greenhouse gases", "greenhouse", None));
        assert!(!flexible_text("gas", "greenhouse gases", None));
        assert!(flexible_text("Global  Action", "global action", None));
    }

    #[test]
    fn flexible_text_threshold_boundary() {
        // 7 of 10 key words present is exactly the threshold.
        let key = "one two three four five six seven eight nine ten";
        assert!(flexible_text("one two three four five six seven", key, None));
        assert!(!flexible_text("one two three four five six", key, None));
    }

    #[test]
    fn flexible_text_word_limit() {
        assert!(!flexible_text("final answer is done", "final", Some(2)));
        assert!(flexible_text("final answer", "final", Some(2)));
        // A zero limit means no limit.
        assert!(flexible_text("final answer is done", "final", Some(0)));
    }

    #[test]
    fn kind_rejects_shape_mismatch() {
        let text = AnswerValue::from("A");
        let list = AnswerValue::from(vec!["A"]);
        let map = AnswerValue::from(vec![("1", "A")]);

        assert!(!MatcherKind::SetMatch.matches(&text, &list, None));
        assert!(!MatcherKind::MappingMatch.matches(&text, &map, None));
        assert!(!MatcherKind::ExactMatch.matches(&list, &text, None));
        assert!(!MatcherKind::CaseInsensitive.matches(&map, &text, None));
        assert!(!MatcherKind::FlexibleText.matches(&list, &list, None));
    }

    #[test]
    fn mapping_kind_with_scalar_key_uses_exact() {
        let key = AnswerValue::from("C");
        assert!(MatcherKind::MappingMatch.matches(&AnswerValue::from("c"), &key, None));
        assert!(!MatcherKind::MappingMatch.matches(&AnswerValue::from("B"), &key, None));
    }

    #[test]
    fn scalar_kind_with_mapping_key_grades_each_item() {
        let key = AnswerValue::from(vec![("7", "September"), ("8", "materials")]);
        let good = AnswerValue::from(vec![("7", "september"), ("8", "all the materials")]);
        let missing = AnswerValue::from(vec![("7", "September")]);

        assert!(MatcherKind::FlexibleText.matches(&good, &key, None));
        assert!(!MatcherKind::CaseInsensitive.matches(&good, &key, None));
        assert!(!MatcherKind::FlexibleText.matches(&missing, &key, None));
    }
}
