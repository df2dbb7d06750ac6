//! Article rewriting
//!
//! The rewrite response arrives in two concatenated parts: a `JSON:` block
//! carrying metadata followed by an `ARTICLE:` block with the rewritten
//! markdown. Either marker missing is a hard parse failure; missing fields
//! inside an otherwise well-formed JSON block fall back to fixed defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Max tokens requested for a rewrite completion
pub const REWRITE_MAX_TOKENS: u32 = 4000;

/// System prompt for the rewrite call.
pub(crate) const REWRITE_SYSTEM_PROMPT: &str = r#"You are a GEO (Generative Engine Optimization) expert. Rewrite the following article to maximize its visibility and citation on AI search platforms (ChatGPT, Perplexity, Gemini).

Apply these optimizations:
1. Add a TL;DR section at the top with a direct, concise answer
2. Restructure with clear H2 and H3 headers
3. Add bullet points for key information
4. Include [CITATION NEEDED] placeholders where data or sources should be added
5. Add a comprehensive FAQ section at the end
6. Remove fluff and unnecessary words
7. Front-load the most important information
8. Use clear, direct language that answers questions explicitly

Before the rewritten article, provide a JSON object with:
{
  "oldScore": 34,
  "newScore": 87,
  "improvements": [
    "Added TL;DR section",
    "Restructured with clear headers",
    "Added citation placeholders",
    "Created comprehensive FAQ section",
    "Removed unnecessary fluff"
  ]
}

Then provide the rewritten article in markdown format.

Format your response exactly like this:
JSON:
{json object here}

ARTICLE:
{rewritten article here}"#;

const JSON_MARKER: &str = "JSON:";
const ARTICLE_MARKER: &str = "ARTICLE:";

fn default_old_score() -> u8 {
    34
}

fn default_new_score() -> u8 {
    87
}

/// Result of a rewrite call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResult {
    /// Estimated score of the original article
    #[serde(rename = "oldScore", default = "default_old_score")]
    pub old_score: u8,
    /// Estimated score of the rewritten article
    #[serde(rename = "newScore", default = "default_new_score")]
    pub new_score: u8,
    /// Rewritten article markdown
    #[serde(default)]
    pub article: String,
    /// Improvements applied
    #[serde(default)]
    pub improvements: Vec<String>,
}

/// Parse the raw upstream text into a [`RewriteResult`].
pub(crate) fn parse_rewrite_response(raw: &str) -> Result<RewriteResult> {
    let json_start = raw
        .find(JSON_MARKER)
        .ok_or_else(|| Error::InvalidResponse("missing JSON: marker".to_string()))?;
    let article_start = raw
        .find(ARTICLE_MARKER)
        .ok_or_else(|| Error::InvalidResponse("missing ARTICLE: marker".to_string()))?;

    if article_start < json_start {
        return Err(Error::InvalidResponse(
            "ARTICLE: marker precedes JSON: marker".to_string(),
        ));
    }

    let json_part = raw[json_start + JSON_MARKER.len()..article_start].trim();
    let article = raw[article_start + ARTICLE_MARKER.len()..].trim();

    let mut result: RewriteResult = serde_json::from_str(json_part)
        .map_err(|e| Error::InvalidResponse(format!("rewrite metadata: {e}")))?;
    result.article = article.to_string();

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_response() {
        let raw = "JSON:\n{\"oldScore\":30,\"newScore\":80,\"improvements\":[\"x\"]}\nARTICLE:\nHello";
        let result = parse_rewrite_response(raw).unwrap();
        assert_eq!(result.old_score, 30);
        assert_eq!(result.new_score, 80);
        assert_eq!(result.improvements, vec!["x".to_string()]);
        assert_eq!(result.article, "Hello");
    }

    #[test]
    fn test_missing_article_marker_fails() {
        let raw = "JSON:\n{\"oldScore\":30,\"newScore\":80,\"improvements\":[]}";
        let err = parse_rewrite_response(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_missing_json_marker_fails() {
        let raw = "{\"oldScore\":30}\nARTICLE:\nHello";
        let err = parse_rewrite_response(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let raw = "JSON:\n{}\nARTICLE:\nRewritten body";
        let result = parse_rewrite_response(raw).unwrap();
        assert_eq!(result.old_score, 34);
        assert_eq!(result.new_score, 87);
        assert!(result.improvements.is_empty());
        assert_eq!(result.article, "Rewritten body");
    }

    #[test]
    fn test_markers_out_of_order_fail() {
        let raw = "ARTICLE:\nHello\nJSON:\n{}";
        let err = parse_rewrite_response(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }

    #[test]
    fn test_malformed_metadata_fails() {
        let raw = "JSON:\nnot json\nARTICLE:\nHello";
        let err = parse_rewrite_response(raw).unwrap_err();
        assert!(matches!(err, Error::InvalidResponse(_)));
    }
}
