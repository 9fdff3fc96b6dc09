//! Match Evaluator Service
//!
//! Pure domain logic for deciding whether a resolved country is one of
//! the caller's candidates.

use crate::domain::entities::CountryMatch;

/// Compares a resolved country name against a candidate list.
///
/// Matching is exact and case-sensitive. Candidates are scanned in order
/// and the first equal entry wins.
pub struct MatchEvaluator;

impl MatchEvaluator {
    /// Evaluate `resolved` against `candidates`.
    ///
    /// An empty `resolved` name or an empty candidate list never matches.
    ///
    /// # Example
    /// ```
    /// use geolocate_ip::domain::services::MatchEvaluator;
    ///
    /// let candidates = vec!["Australia".to_string(), "Canada".to_string()];
    /// let m = MatchEvaluator::evaluate("Canada", &candidates);
    /// assert!(m.matched);
    /// assert_eq!(m.matched_name, "Canada");
    /// ```
    pub fn evaluate<S: AsRef<str>>(resolved: &str, candidates: &[S]) -> CountryMatch {
        if resolved.is_empty() {
            return CountryMatch::none();
        }

        candidates
            .iter()
            .map(AsRef::as_ref)
            .find(|candidate| *candidate == resolved)
            .map(CountryMatch::found)
            .unwrap_or_else(CountryMatch::none)
    }
}
