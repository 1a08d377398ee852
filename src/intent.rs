/// Coarse classification of a free-text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    TrafficOrAccident,
    JudicialProcess,
    PainReported,
    Generic,
}

/// One keyword group. A message matches if it contains any of the keywords.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,
    /// Lowercase keywords.
    pub keywords: &'static [&'static str],
    pub template: &'static str,
}

/// Return the intent of the first rule whose keywords occur in `text`,
/// or `Intent::Generic` if none does. Matching is case-insensitive.
pub fn classify(text: &str, rules: &[IntentRule]) -> Intent {
    let lowered = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Generic)
}
