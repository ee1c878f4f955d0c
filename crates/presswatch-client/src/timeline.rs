// Activity timeline
//
// Status messages are mapped onto short timeline titles by substring
// match. The rule table is ordered and the first match wins; a message no
// rule matches keeps its own text as the title.

/// One entry in the research activity timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedEvent {
    /// Short phase label shown as the entry heading.
    pub title: String,
    /// The full status message.
    pub detail: String,
}

/// Ordered (substring, title) rules. More specific patterns come first.
const TITLE_RULES: &[(&str, &str)] = &[
    ("Initializing", "Initializing"),
    ("Searching", "Searching Press Sources"),
    ("Analyzing sentiment", "Sentiment Analysis"),
    ("Analyzing", "Analysis"),
    ("Generating digest", "Generating Digest"),
    ("Generating", "Generating"),
    ("Finalizing", "Finalizing Report"),
];

/// Map a status message onto a timeline entry.
pub fn process_status(message: &str) -> ProcessedEvent {
    let title = TITLE_RULES
        .iter()
        .find(|(pattern, _)| message.contains(pattern))
        .map(|(_, title)| title.to_string())
        .unwrap_or_else(|| message.to_string());

    ProcessedEvent {
        title,
        detail: message.to_string(),
    }
}
