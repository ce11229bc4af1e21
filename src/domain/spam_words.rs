use std::sync::LazyLock;

use regex::{Captures, Regex};

// Applied top to bottom. Longer phrases come before the words they contain, and
// no replacement may itself match a pattern, so rewriting twice changes nothing.
const SPAM_WORDS: &[(&str, &str)] = &[
    (r"\bemail lists?\b", "decision-maker contacts"),
    (r"\bmailing lists?\b", "decision-maker contacts"),
    (r"\bbuy now\b", "take a look"),
    (r"\bbuy\b", "explore"),
    (r"\bpurchase\b", "explore"),
    (r"\brisk[- ]free\b", "low-commitment"),
    (r"\bfree sample\b", "complimentary preview"),
    (r"\bfree\b", "complimentary"),
    (r"\bguaranteed\b", "proven"),
    (r"\bguarantee\b", "commitment"),
    (r"\bact now\b", "when convenient"),
    (r"\blimited time\b", "this season"),
    (r"\burgent\b", "timely"),
    (r"\bcash\b", "budget"),
    (r"\bcheap\b", "cost-effective"),
    (r"\bdiscount\b", "preferred pricing"),
    (r"\bno obligation\b", "no pressure"),
    (r"\bclick here\b", "see details"),
    (r"\bdouble your\b", "grow your"),
    (r"\b100% satisfied\b", "happy"),
];

static SPAM_WORD_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    SPAM_WORDS
        .iter()
        .map(|(pattern, replacement)| {
            let regex =
                Regex::new(&format!("(?i){}", pattern)).expect("spam word pattern is valid");
            (regex, *replacement)
        })
        .collect()
});

/// Softens phrasing that tends to trip spam filters.
pub fn rewrite_spam_words(text: &str) -> String {
    SPAM_WORD_PATTERNS
        .iter()
        .fold(text.to_string(), |acc, (regex, replacement)| {
            regex
                .replace_all(&acc, |caps: &Captures| {
                    match_leading_case(&caps[0], replacement)
                })
                .into_owned()
        })
}

/// "Buy" becomes "Explore", "buy" becomes "explore".
fn match_leading_case(matched: &str, replacement: &str) -> String {
    let starts_upper = matched.chars().next().is_some_and(|c| c.is_uppercase());
    let mut chars = replacement.chars();

    match (starts_upper, chars.next()) {
        (true, Some(first)) => first.to_uppercase().chain(chars).collect(),
        _ => replacement.to_string(),
    }
}
