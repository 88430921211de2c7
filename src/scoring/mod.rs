//! Deterministic mapping from normalized analyzer output to scores,
//! suggestions and the one-line summary.

pub mod scores;
pub mod suggestions;
pub mod summary;

use lazy_static::lazy_static;
use regex::Regex;

pub use scores::score_from;
pub use suggestions::build_suggestions;
pub use summary::pretty_summary;

lazy_static! {
    static ref RE_TEST_IMPORT: Regex = Regex::new(r"\bimport\s+(unittest|pytest)\b").unwrap();
    static ref RE_TEST_FUNCTION: Regex = Regex::new(r"\bdef\s+test_").unwrap();
    static ref RE_SECURITY_RULE: Regex = Regex::new(r"^B\d+$").unwrap();
}

/// Whether the source imports a test framework or defines a `test_*` function.
pub fn has_test_signal(code: &str) -> bool {
    RE_TEST_IMPORT.is_match(code) || RE_TEST_FUNCTION.is_match(code)
}

/// Whether an issue category is a security scanner rule id (`B101`, `B602`, ...).
pub fn is_security_rule(kind: &str) -> bool {
    RE_SECURITY_RULE.is_match(kind)
}

/// Round half to even, matching how the scores have always been displayed.
pub(crate) fn round_score(value: f64, max: f64) -> u8 {
    value.clamp(0.0, max).round_ties_even() as u8
}
