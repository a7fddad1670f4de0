//! Chat-facing formatting of pipeline results and errors.
//!
//! Output is HTML-flavored chat markup: bold titles, anchor links, emoji
//! markers for source type and confidence tier.

use verification::{ConfidenceTier, PipelineError, PipelineResult, SourceType};

const EXPLANATION_PREVIEW_CHARS: usize = 150;
const TEXT_PREVIEW_CHARS: usize = 200;

fn type_emoji(source_type: SourceType) -> &'static str {
    match source_type {
        SourceType::Official => "🏛️",
        SourceType::News => "📰",
        SourceType::Blog => "✍️",
        SourceType::Research => "🔬",
        SourceType::Unknown => "📄",
    }
}

/// Char-safe preview with a trailing ellipsis when shortened.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

/// Render a pipeline result as a numbered chat message.
pub fn format_result(result: &PipelineResult) -> String {
    if result.sources.is_empty() {
        return "❌ Could not retrieve content from any source.".to_string();
    }

    let mut response = String::from("📋 <b>Found sources:</b>\n\n");

    for (index, source) in result.sources.iter().enumerate() {
        response.push_str(&format!(
            "{}. {} <b>{}</b>\n   Type: {}\n",
            index + 1,
            type_emoji(source.source_type),
            source.title,
            source.source_type.label(),
        ));

        if let Some(confidence) = source.confidence {
            let marker = ConfidenceTier::from_confidence(confidence).marker();
            response.push_str(&format!("   {marker} Confidence: {confidence}%\n"));
            if let Some(explanation) = &source.explanation {
                response.push_str(&format!(
                    "   {}\n",
                    preview(explanation, EXPLANATION_PREVIEW_CHARS)
                ));
            }
        }

        response.push_str(&format!("   <a href=\"{0}\">{0}</a>\n", source.url));

        if !source.text.is_empty() {
            response.push_str(&format!(
                "   {}\n",
                preview(&source.text, TEXT_PREVIEW_CHARS)
            ));
        }

        response.push('\n');
    }

    if let Some(summary) = &result.ai_summary {
        response.push_str("\n📊 <b>AI analysis:</b>\n");
        response.push_str(summary);
        response.push('\n');
    }

    response
}

/// Render a pipeline failure as a chat message.
pub fn format_error(error: &PipelineError) -> String {
    match error {
        PipelineError::EmptyInput => {
            "❌ Could not extract any text from your message. \
             Send a text passage or a link to a public post."
                .to_string()
        }
        PipelineError::NoSourcesFound => {
            "❌ No sources found for your request. Try rephrasing it.".to_string()
        }
        PipelineError::Search(error) => {
            format!("❌ An error occurred while processing your request: {error}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verification::VerifiedSource;

    fn result_with(sources: Vec<VerifiedSource>, ai_summary: Option<&str>) -> PipelineResult {
        PipelineResult {
            query: "q".into(),
            sources,
            ai_summary: ai_summary.map(String::from),
        }
    }

    fn source(confidence: Option<u8>, explanation: Option<&str>) -> VerifiedSource {
        VerifiedSource {
            title: "Central bank statement".into(),
            url: "https://example.gov/rates".into(),
            text: "The bank raised its key rate.".into(),
            source_type: SourceType::Official,
            confidence,
            explanation: explanation.map(String::from),
        }
    }

    #[test]
    fn test_format_numbers_sources_and_marks_tiers() {
        let result = result_with(
            vec![source(Some(85), Some("corroborates")), source(Some(30), None)],
            Some("mostly confirmed"),
        );

        let text = format_result(&result);
        assert!(text.contains("1. 🏛️ <b>Central bank statement</b>"));
        assert!(text.contains("✅ Confidence: 85%"));
        assert!(text.contains("❌ Confidence: 30%"));
        assert!(text.contains("Type: Official source"));
        assert!(text.contains("📊 <b>AI analysis:</b>\nmostly confirmed"));
    }

    #[test]
    fn test_format_omits_confidence_when_absent() {
        let text = format_result(&result_with(vec![source(None, None)], None));
        assert!(!text.contains("Confidence:"));
        assert!(!text.contains("AI analysis"));
    }

    #[test]
    fn test_previews_are_char_safe_and_elided() {
        let long = "é".repeat(300);
        let mut s = source(Some(50), None);
        s.explanation = Some(long.clone());
        s.text = long;

        let text = format_result(&result_with(vec![s], None));
        assert!(text.contains(&format!("{}...", "é".repeat(150))));
        assert!(text.contains(&format!("{}...", "é".repeat(200))));
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        assert!(format_error(&PipelineError::EmptyInput).contains("text passage"));
        assert!(format_error(&PipelineError::NoSourcesFound).contains("rephrasing"));
    }
}
