//! Input resolution: plain text passes through, recognized post links are
//! fetched and their body text pulled out of the public embed markup.

use regex::Regex;
use std::time::Duration;
use tracing::warn;

const POST_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// True when the input looks like a link to a post rather than a passage.
pub fn is_post_link(input: &str) -> bool {
    let trimmed = input.trim();
    let link_re = Regex::new(r"^https?://(t\.me|telegram\.me|telegram\.org)/").unwrap();
    let handle_re = Regex::new(r"^@\w+").unwrap();
    link_re.is_match(trimmed) || handle_re.is_match(trimmed)
}

/// Resolve raw input to the text to verify.
///
/// Post links resolve to the post body, or to an empty string when the post
/// cannot be read (the caller treats blank text as `EmptyInput`). Bare
/// `@handle` inputs have no fetchable page and resolve to empty.
pub async fn resolve_input(input: &str) -> String {
    let trimmed = input.trim();
    if !is_post_link(trimmed) {
        return trimmed.to_string();
    }

    if trimmed.starts_with('@') {
        warn!(input = %trimmed, "bare channel handles cannot be resolved");
        return String::new();
    }

    match fetch_post_text(trimmed).await {
        Ok(text) => text,
        Err(category) => {
            warn!(url = %trimmed, category, "post fetch failed");
            String::new()
        }
    }
}

/// Fetch a public post page and extract the message text from the embed
/// widget markup.
async fn fetch_post_text(url: &str) -> Result<String, &'static str> {
    let client = reqwest::Client::builder()
        .timeout(POST_FETCH_TIMEOUT)
        .build()
        .unwrap_or_default();

    let response = client
        .get(url)
        .header("User-Agent", BROWSER_USER_AGENT)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .send()
        .await
        .map_err(|e| if e.is_timeout() { "timeout" } else { "other" })?;

    let status = response.status().as_u16();
    match status {
        403 => return Err("forbidden"),
        404 => return Err("not-found"),
        s if s >= 400 => return Err("other"),
        _ => {}
    }

    let html = response.text().await.map_err(|_| "other")?;
    Ok(extract_widget_text(&html))
}

/// The post body lives in a `tgme_widget_message_text` block on the public
/// page; tags are stripped and whitespace collapsed.
fn extract_widget_text(html: &str) -> String {
    let widget_re = Regex::new(
        r#"(?si)<div[^>]*class="[^"]*tgme_widget_message_text[^"]*"[^>]*>(.*?)</div>"#,
    )
    .unwrap();

    let Some(cap) = widget_re.captures(html) else {
        return String::new();
    };

    let tag_re = Regex::new(r"<[^>]+>").unwrap();
    let ws_re = Regex::new(r"\s+").unwrap();
    let text = tag_re.replace_all(&cap[1], " ");
    ws_re.replace_all(&text, " ").trim().to_string()
}
