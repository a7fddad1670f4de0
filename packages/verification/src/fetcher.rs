//! Content retrieval and cleaning for candidate sources.
//!
//! This stage never fails a request: every candidate resolves to either
//! cleaned page text or a fallback (the search snippet, or
//! `ContentStatus::Unavailable`). Per-URL fetches for one request run
//! concurrently and re-assemble in candidate order, so completion order is
//! irrelevant. Failures are logged with a triaged category, not a full
//! error chain.

use futures::future::join_all;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::json::truncate_chars;
use crate::types::{ContentStatus, SearchResult, SourceContent, UNTITLED};

/// Sources fetched per request unless the caller overrides it.
pub const DEFAULT_FETCH_LIMIT: usize = 3;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_REDIRECTS: usize = 5;
/// Loaded text cap; longer bodies are cut here with an ellipsis.
const MAX_TEXT_CHARS: usize = 5000;
/// A content-selector candidate must exceed this many chars to be accepted.
const MIN_CONTENT_LEN: usize = 200;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Why a fetch produced no content. Only the category is logged.
#[derive(Debug)]
enum FetchFailure {
    Forbidden,
    NotFound,
    Timeout,
    Other(String),
}

impl FetchFailure {
    fn category(&self) -> &'static str {
        match self {
            FetchFailure::Forbidden => "forbidden",
            FetchFailure::NotFound => "not-found",
            FetchFailure::Timeout => "timeout",
            FetchFailure::Other(_) => "other",
        }
    }
}

pub struct ContentFetcher {
    client: reqwest::Client,
}

impl Default for ContentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Fetch the top `limit` candidates concurrently.
    ///
    /// The output has exactly `min(limit, results.len())` elements, in the
    /// same order as the input.
    pub async fn fetch_content(
        &self,
        results: &[SearchResult],
        limit: usize,
    ) -> Vec<SourceContent> {
        let top = &results[..results.len().min(limit)];
        join_all(top.iter().map(|result| self.fetch_source(result))).await
    }

    async fn fetch_source(&self, result: &SearchResult) -> SourceContent {
        match self.fetch_page(&result.url).await {
            Ok(page) if !page.text.trim().is_empty() => {
                debug!(url = %result.url, chars = page.text.len(), "source content loaded");
                SourceContent {
                    url: result.url.clone(),
                    title: page.title,
                    content: ContentStatus::Loaded(page.text),
                    source_type: result.source_type,
                }
            }
            Ok(_) => {
                debug!(url = %result.url, "page loaded but no text extracted, using snippet");
                self.fallback_source(result)
            }
            Err(failure) => {
                warn!(
                    url = %result.url,
                    category = failure.category(),
                    "source fetch failed"
                );
                self.fallback_source(result)
            }
        }
    }

    /// Substitute the search snippet, or mark the source unavailable.
    fn fallback_source(&self, result: &SearchResult) -> SourceContent {
        let content = if result.snippet.trim().is_empty() {
            ContentStatus::Unavailable
        } else {
            ContentStatus::Loaded(result.snippet.clone())
        };

        SourceContent {
            url: result.url.clone(),
            title: if result.title.is_empty() {
                UNTITLED.to_string()
            } else {
                result.title.clone()
            },
            content,
            source_type: result.source_type,
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<CleanedPage, FetchFailure> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", BROWSER_USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Referer", "https://www.google.com/")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchFailure::Timeout
                } else {
                    FetchFailure::Other(e.to_string())
                }
            })?;

        let status = response.status();
        match status.as_u16() {
            403 => return Err(FetchFailure::Forbidden),
            404 => return Err(FetchFailure::NotFound),
            s if s >= 400 => return Err(FetchFailure::Other(format!("HTTP {s}"))),
            _ => {}
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchFailure::Other(e.to_string()))?;

        Ok(clean_page(&html))
    }
}

struct CleanedPage {
    title: String,
    text: String,
}

/// Clean an HTML document into a title and body text.
fn clean_page(html: &str) -> CleanedPage {
    let stripped = strip_noise(html);
    CleanedPage {
        title: extract_title(&stripped),
        text: extract_body_text(&stripped),
    }
}

/// Drop script/style/navigation chrome before text extraction.
fn strip_noise(html: &str) -> String {
    let mut text = html.to_string();
    for element in ["script", "style", "nav", "footer", "header", "aside"] {
        let pattern = Regex::new(&format!(r"(?si)<{element}[^>]*>.*?</{element}>")).unwrap();
        text = pattern.replace_all(&text, "").to_string();
    }
    text
}

/// Title precedence: `<title>`, first `<h1>`, `og:title`, placeholder.
fn extract_title(html: &str) -> String {
    let title_re = Regex::new(r"(?si)<title[^>]*>(.*?)</title>").unwrap();
    if let Some(title) = title_re
        .captures(html)
        .map(|cap| strip_tags(&cap[1]))
        .filter(|t| !t.is_empty())
    {
        return title;
    }

    let h1_re = Regex::new(r"(?si)<h1[^>]*>(.*?)</h1>").unwrap();
    if let Some(title) = h1_re
        .captures(html)
        .map(|cap| strip_tags(&cap[1]))
        .filter(|t| !t.is_empty())
    {
        return title;
    }

    let og_re = Regex::new(
        r#"(?si)<meta[^>]+property=["']og:title["'][^>]+content=["']([^"']*)["']|<meta[^>]+content=["']([^"']*)["'][^>]+property=["']og:title["']"#,
    )
    .unwrap();
    if let Some(cap) = og_re.captures(html) {
        let content = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str().trim());
        if let Some(title) = content.filter(|t| !t.is_empty()) {
            return title.to_string();
        }
    }

    UNTITLED.to_string()
}

/// Body extraction: first content selector whose collapsed text exceeds the
/// minimum length, else all paragraphs regardless of length. Truncated at
/// the text cap with an ellipsis.
fn extract_body_text(html: &str) -> String {
    let selectors = [
        r"(?si)<article[^>]*>(.*?)</article>",
        r"(?si)<main[^>]*>(.*?)</main>",
        r#"(?si)<[a-z][a-z0-9]*[^>]*class=["'][^"']*(?:post-content|article-content|content)[^"']*["'][^>]*>(.*?)</[a-z][a-z0-9]*>"#,
        r#"(?si)<[a-z][a-z0-9]*[^>]*id=["']content["'][^>]*>(.*?)</[a-z][a-z0-9]*>"#,
        r"(?si)<p[^>]*>(.*?)</p>",
    ];

    let mut text = String::new();
    for selector in selectors {
        let candidate = selector_text(html, selector);
        if candidate.chars().count() > MIN_CONTENT_LEN {
            text = candidate;
            break;
        }
    }

    if text.chars().count() <= MIN_CONTENT_LEN {
        text = selector_text(html, r"(?si)<p[^>]*>(.*?)</p>");
    }

    if text.chars().count() > MAX_TEXT_CHARS {
        let mut truncated = truncate_chars(&text, MAX_TEXT_CHARS).to_string();
        truncated.push_str("...");
        truncated
    } else {
        text
    }
}

/// Concatenated, tag-stripped, whitespace-collapsed text of every match.
fn selector_text(html: &str, pattern: &str) -> String {
    let re = Regex::new(pattern).unwrap();
    let joined = re
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    strip_tags(&joined)
}

/// Remove remaining tags, decode common entities, collapse whitespace.
fn strip_tags(html: &str) -> String {
    let tag_re = Regex::new(r"<[^>]+>").unwrap();
    let text = tag_re.replace_all(html, " ");

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let ws_re = Regex::new(r"\s+").unwrap();
    ws_re.replace_all(&decoded, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceType;

    fn candidate(url: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: "Candidate title".into(),
            url: url.into(),
            snippet: snippet.into(),
            source_type: SourceType::Unknown,
        }
    }

    #[test]
    fn test_title_precedence() {
        assert_eq!(
            extract_title("<html><title>Page Title</title><h1>H1</h1></html>"),
            "Page Title"
        );
        assert_eq!(extract_title("<html><h1>Only H1</h1></html>"), "Only H1");
        assert_eq!(
            extract_title(r#"<meta property="og:title" content="OG Title">"#),
            "OG Title"
        );
        assert_eq!(extract_title("<html><body>nothing</body></html>"), UNTITLED);
    }

    #[test]
    fn test_strip_noise_removes_chrome() {
        let html = "<nav>menu</nav><script>var x=1;</script><p>real text</p><footer>foot</footer>";
        let stripped = strip_noise(html);
        assert!(!stripped.contains("menu"));
        assert!(!stripped.contains("var x"));
        assert!(!stripped.contains("foot"));
        assert!(stripped.contains("real text"));
    }

    #[test]
    fn test_article_selector_preferred_when_long_enough() {
        let body = "word ".repeat(60);
        let html = format!("<article><p>{body}</p></article><p>stray paragraph</p>");
        let text = extract_body_text(&html);
        assert!(text.starts_with("word word"));
        assert!(!text.contains("stray"));
    }

    #[test]
    fn test_short_selectors_fall_back_to_paragraphs() {
        let html = "<article>too short</article><p>first para</p><p>second para</p>";
        let text = extract_body_text(html);
        assert_eq!(text, "first para second para");
    }

    #[test]
    fn test_text_truncated_with_ellipsis() {
        let body = "a".repeat(6000);
        let html = format!("<article>{body}</article>");
        let text = extract_body_text(&html);
        assert_eq!(text.chars().count(), MAX_TEXT_CHARS + 3);
        assert!(text.ends_with("..."));
    }

    #[test]
    fn test_strip_tags_decodes_entities() {
        assert_eq!(
            strip_tags("<b>bold &amp; loud</b>\n\n  spaced"),
            "bold & loud spaced"
        );
    }

    #[tokio::test]
    async fn test_unreachable_url_is_idempotent_fallback() {
        // Connection refused locally; no real network involved.
        let fetcher = ContentFetcher::new();
        let result = candidate("http://127.0.0.1:9/page", "");

        let first = fetcher.fetch_content(std::slice::from_ref(&result), 3).await;
        let second = fetcher.fetch_content(std::slice::from_ref(&result), 3).await;

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].content, ContentStatus::Unavailable);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_snippet_substituted_on_failure() {
        let fetcher = ContentFetcher::new();
        let result = candidate("http://127.0.0.1:9/page", "a useful snippet");

        let fetched = fetcher.fetch_content(&[result], 3).await;
        assert_eq!(
            fetched[0].content,
            ContentStatus::Loaded("a useful snippet".into())
        );
        assert_eq!(fetched[0].title, "Candidate title");
    }

    #[tokio::test]
    async fn test_limit_bounds_output_length() {
        let fetcher = ContentFetcher::new();
        let results: Vec<SearchResult> = (0..5)
            .map(|i| candidate(&format!("http://127.0.0.1:9/{i}"), "s"))
            .collect();

        let fetched = fetcher.fetch_content(&results, 3).await;
        assert_eq!(fetched.len(), 3);
    }
}
