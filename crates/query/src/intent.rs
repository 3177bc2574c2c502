use crate::model::Intent;

/// Ordered keyword rules. First match wins, so ordering is load-bearing:
/// "show me the average" is Average, not Chart, because the Average rule
/// is listed first. Keep this a flat inspectable table, never nested
/// conditionals.
const RULES: &[(&[&str], Intent)] = &[
    (&["average", "mean"], Intent::Average),
    (&["count", "how many"], Intent::Count),
    (&["maximum", "max", "highest"], Intent::Max),
    (&["minimum", "min", "lowest"], Intent::Min),
    (&["chart", "graph", "plot", "show"], Intent::Chart),
    (&["compare", "by"], Intent::Comparison),
    (&["where", "filter"], Intent::Filter),
];

/// Classify a question into exactly one intent. Plain substring matching
/// over the lowercased text; no rule matching falls back to Summary.
pub fn classify(question: &str) -> Intent {
    let text = question.to_lowercase();
    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(k)))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Summary)
}
