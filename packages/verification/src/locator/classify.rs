//! Source-type classification from URL hostnames.
//!
//! Curated pattern lists, checked in fixed order: official, research, news,
//! blog. Anything else (or an unparseable URL) is `Unknown`.

use url::Url;

use crate::types::SourceType;

/// Government/education TLD markers, matched as suffix or dotted infix
/// (covers `cdc.gov` as well as `gov.uk` style hosts).
const OFFICIAL_TLDS: &[&str] = &[".gov", ".edu", ".mil"];

const OFFICIAL_PATTERNS: &[&str] = &[
    ".ac.",
    "europa.eu",
    "un.org",
    "who.int",
    "imf.org",
    "worldbank.org",
];

/// Research platforms sitting on an official-looking TLD; checked before the
/// TLD rule so they land in the research bucket.
const RESEARCH_TLD_EXCEPTIONS: &[&str] = &["academia.edu"];

const RESEARCH_PATTERNS: &[&str] = &[
    "arxiv.org",
    "pubmed",
    "scholar",
    "researchgate",
    "springer",
    "ieee.org",
    "nature.com",
    "science.org",
];

const NEWS_PATTERNS: &[&str] = &[
    "reuters.com",
    "apnews.com",
    "bbc.co",
    "nytimes.com",
    "theguardian.com",
    "washingtonpost.com",
    "bloomberg.com",
    "cnn.com",
    "ft.com",
    "aljazeera.com",
];

const BLOG_PATTERNS: &[&str] = &[
    "medium.com",
    "substack.com",
    "blogspot",
    "wordpress.com",
    "livejournal.com",
    "tumblr.com",
];

/// Classify a URL by hostname.
pub fn classify_source_type(url: &str) -> SourceType {
    let hostname = match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_lowercase(),
            None => return SourceType::Unknown,
        },
        Err(_) => return SourceType::Unknown,
    };

    let matches_any = |patterns: &[&str]| patterns.iter().any(|p| hostname.contains(p));

    if RESEARCH_TLD_EXCEPTIONS
        .iter()
        .any(|host| hostname == *host || hostname.ends_with(&format!(".{host}")))
    {
        return SourceType::Research;
    }

    let official_tld = OFFICIAL_TLDS
        .iter()
        .any(|tld| hostname.ends_with(tld) || hostname.contains(&format!("{tld}.")));

    if official_tld || matches_any(OFFICIAL_PATTERNS) {
        SourceType::Official
    } else if matches_any(RESEARCH_PATTERNS) {
        SourceType::Research
    } else if matches_any(NEWS_PATTERNS) {
        SourceType::News
    } else if matches_any(BLOG_PATTERNS) {
        SourceType::Blog
    } else {
        SourceType::Unknown
    }
}
