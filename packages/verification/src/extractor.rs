//! Signal extraction from raw input text.
//!
//! Pure regex/heuristic rules, no I/O and no failure mode: empty input
//! yields empty containers. The extracted elements feed the search query
//! builder; nothing here is meant to be linguistically rigorous, it only has
//! to pull enough signal out of a post to search for it.

use indexmap::IndexSet;
use regex::Regex;

use crate::types::ExtractedElements;

/// Sentences shorter than this carry too little signal to be a key statement.
const MIN_STATEMENT_LEN: usize = 20;
/// Sentences longer than this are usually several claims mashed together.
const MAX_STATEMENT_LEN: usize = 300;
const MAX_KEY_STATEMENTS: usize = 5;
const MAX_NAMES: usize = 10;

/// Reporting/declarative verbs and data words that mark a checkable claim.
const REPORTING_WORDS: &[&str] = &[
    "claims", "states", "reports", "announces", "announced", "reported",
    "says", "said", "revealed", "discovered", "found", "confirmed",
    "established", "result", "study", "research", "analysis", "data",
    "statistics", "percent", "increase", "decrease",
];

/// Common place names that match the proper-name patterns but are too
/// generic to search for.
const NAME_STOPLIST: &[&str] = &[
    "United States",
    "United Kingdom",
    "New York",
    "European Union",
    "Soviet Union",
];

/// Extract all key elements from a text.
pub fn extract(text: &str) -> ExtractedElements {
    ExtractedElements {
        key_statements: extract_key_statements(text),
        dates: extract_dates(text),
        numbers: extract_numbers(text),
        names: extract_names(text),
        links: extract_links(text),
    }
}

/// Salient sentences: right length, and either a reporting word or a digit.
pub fn extract_key_statements(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|sentence| {
            let length = sentence.chars().count();
            if length <= MIN_STATEMENT_LEN || length >= MAX_STATEMENT_LEN {
                return false;
            }
            let lower = sentence.to_lowercase();
            let has_reporting_word = REPORTING_WORDS.iter().any(|w| lower.contains(w));
            let has_digit = sentence.chars().any(|c| c.is_ascii_digit());
            has_reporting_word || has_digit
        })
        .take(MAX_KEY_STATEMENTS)
        .map(str::to_string)
        .collect()
}

/// Date mentions: numeric formats, ISO dates, spelled-out months, relative
/// days, and years next to a "year" token.
pub fn extract_dates(text: &str) -> Vec<String> {
    let patterns = [
        // DD.MM.YYYY or DD/MM/YYYY
        r"\b\d{1,2}[./]\d{1,2}[./]\d{2,4}\b",
        // ISO YYYY-MM-DD
        r"\b\d{4}-\d{1,2}-\d{1,2}\b",
        // 12 March 2024
        r"(?i)\b\d{1,2}\s+(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{2,4}\b",
        // March 12, 2024
        r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2},?\s+\d{2,4}\b",
        // relative days
        r"(?i)\b(?:today|yesterday|tomorrow|tonight)\b",
        // "the 2024 fiscal year", "year 2023"
        r"(?i)\b(?:19|20)\d{2}(?:\s+\w+)?\s+year\b|\byear\s+(?:19|20)\d{2}\b",
    ];

    collect_matches(text, &patterns)
}

/// Numeric mentions: percentages, grouped thousands, decimals, bare integers
/// of 2+ digits, currency amounts.
pub fn extract_numbers(text: &str) -> Vec<String> {
    let patterns = [
        // percentages
        r"\b\d+(?:\.\d+)?\s*%",
        // grouped thousands (1 000 000 or 1,000,000)
        r"\b\d{1,3}(?:[ ,]\d{3})+\b",
        // decimals
        r"\b\d+\.\d+\b",
        // bare integers, 2+ digits
        r"\b\d{2,}\b",
        // currency amounts
        r"(?i)\b\d+(?:\.\d+)?\s*(?:usd|eur|rub|dollars?|euros?|rubles?)\b",
        r"[$€₽]\s?\d+(?:\.\d+)?",
    ];

    collect_matches(text, &patterns)
}

/// Proper names: two-capitalized-word sequences, quoted capitalized phrases,
/// all-caps acronyms. Filtered against a small stoplist, capped at 10.
pub fn extract_names(text: &str) -> Vec<String> {
    let patterns = [
        // First Last
        r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b",
        // quoted organization names
        r#"["«“][A-Z][^"»”]+["»”]"#,
        // acronyms
        r"\b[A-Z]{2,}\b",
    ];

    let mut names: IndexSet<String> = IndexSet::new();
    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        for m in re.find_iter(text) {
            let name = m
                .as_str()
                .trim_matches(|c| c == '"' || c == '«' || c == '»' || c == '“' || c == '”')
                .trim()
                .to_string();
            names.insert(name);
        }
    }

    names
        .into_iter()
        .filter(|name| {
            name.chars().count() > 2
                && !NAME_STOPLIST.contains(&name.as_str())
                && !name.chars().all(|c| c.is_ascii_digit())
        })
        .take(MAX_NAMES)
        .collect()
}

/// All http(s) URLs, conservatively matched and deduplicated.
pub fn extract_links(text: &str) -> Vec<String> {
    let re = Regex::new(r#"(?i)https?://[^\s<>"{}|\\^`\[\]]+"#).unwrap();
    re.find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

fn collect_matches(text: &str, patterns: &[&str]) -> Vec<String> {
    let mut matches: IndexSet<String> = IndexSet::new();
    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        for m in re.find_iter(text) {
            matches.insert(m.as_str().to_string());
        }
    }
    matches.into_iter().collect()
}

/// Build a search query from the extracted elements.
///
/// Takes the first 5 words of the first key statement as a quoted phrase, up
/// to 2 names, and the first date. If fewer than 3 parts were collected,
/// pads with up to 3 words of length >4 from the raw text.
pub fn build_query(elements: &ExtractedElements, original_text: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(statement) = elements.key_statements.first() {
        let phrase = statement
            .split_whitespace()
            .take(5)
            .collect::<Vec<_>>()
            .join(" ");
        parts.push(format!("\"{phrase}\""));
    }

    parts.extend(elements.names.iter().take(2).cloned());

    if let Some(date) = elements.dates.first() {
        parts.push(date.clone());
    }

    if parts.len() < 3 {
        parts.extend(
            original_text
                .split_whitespace()
                .filter(|word| word.chars().count() > 4)
                .take(3)
                .map(str::to_string),
        );
    }

    parts.join(" ")
}
