use crate::types::review::Metrics;

/// Qualitative label for an average complexity.
pub fn complexity_label(average: Option<f64>) -> &'static str {
    match average {
        None => "n/a",
        Some(avg) if avg == 0.0 => "trivial",
        Some(avg) if avg <= 3.0 => "low",
        Some(avg) if avg <= 6.0 => "moderate",
        Some(avg) if avg <= 10.0 => "high",
        Some(_) => "very high",
    }
}

fn format_or_na(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}

/// One-line digest shown verbatim to users; field order and punctuation are fixed.
pub fn pretty_summary(metrics: &Metrics, lint_count: usize, security_count: usize) -> String {
    format!(
        "Maintainability Index: {} | Complexity: avg {} ({}), max {} | Ruff: {} issues | Bandit: {} findings",
        format_or_na(metrics.maintainability_index, 0),
        format_or_na(metrics.average_complexity, 1),
        complexity_label(metrics.average_complexity),
        format_or_na(metrics.maximum_complexity, 1),
        lint_count,
        security_count,
    )
}
