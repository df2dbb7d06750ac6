//! GEO visibility scoring
//!
//! Prompt construction and strict parsing for the score operation. The
//! upstream is instructed to return a bare JSON object; a stray markdown
//! code fence is tolerated and stripped, anything else is a parse failure.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Max tokens requested for a score completion
pub const SCORE_MAX_TOKENS: u32 = 2000;

/// System prompt for the scoring call: 5 criteria, 20 points each.
pub(crate) const SCORE_SYSTEM_PROMPT: &str = r#"You are a GEO (Generative Engine Optimization) expert. Analyze the following article for AI search visibility on platforms like ChatGPT, Perplexity, and Gemini.

Score the article out of 100 based on these 5 criteria (20 points each):
1. Direct Answer: Does it provide a clear, concise answer in the first paragraph?
2. Structure: Is it well-structured with headers, bullet points, and FAQ sections?
3. Citations: Does it include sources, data, and citations that AI can reference?
4. Freshness: Does it mention recent dates, updates, or current information?
5. Clarity: Is it written clearly without fluff, directly answering questions?

Return a JSON object with this structure:
{
  "score": 34,
  "label": "Not AI-friendly" | "Needs work" | "AI-ready",
  "breakdown": [
    {"criteria": "Direct Answer", "score": 4, "issue": "No clear answer in first paragraph"},
    {"criteria": "Structure", "score": 8, "issue": "Missing headers and FAQ"},
    {"criteria": "Citations", "score": 2, "issue": "No sources or data"},
    {"criteria": "Freshness", "score": 10, "issue": "No recent dates"},
    {"criteria": "Clarity", "score": 10, "issue": "Too much fluff"}
  ],
  "problems": [
    "No direct answer in first paragraph",
    "Missing FAQ section",
    "No sources or citations"
  ]
}

The label should be:
- "Not AI-friendly" for scores 0-40
- "Needs work" for scores 41-70
- "AI-ready" for scores 71-100

Provide only the JSON response, no additional text."#;

/// Per-criterion score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionScore {
    /// Criterion name (Direct Answer, Structure, Citations, Freshness, Clarity)
    pub criteria: String,
    /// Points awarded, out of 20
    pub score: u8,
    /// Short description of the main issue found
    pub issue: String,
}

/// Result of a score call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Overall score, 0-100
    pub score: u8,
    /// Bucketed label derived from the score
    pub label: String,
    /// Per-criterion breakdown (5 entries)
    pub breakdown: Vec<CriterionScore>,
    /// Top issues, most important first
    pub problems: Vec<String>,
}

/// Bucket a 0-100 score into its display label.
///
/// Boundaries are exact: 0-40 "Not AI-friendly", 41-70 "Needs work",
/// 71-100 "AI-ready".
#[must_use]
pub fn label_for_score(score: u8) -> &'static str {
    match score {
        0..=40 => "Not AI-friendly",
        41..=70 => "Needs work",
        _ => "AI-ready",
    }
}

/// Strip an optional ``` / ```json fence wrapping the payload.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.trim_start().strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse the raw upstream text into a [`ScoreResult`].
///
/// The label is recomputed from the parsed score rather than trusted from
/// the model, so the bucket boundaries always hold.
pub(crate) fn parse_score_response(raw: &str) -> Result<ScoreResult> {
    #[derive(Deserialize)]
    struct Wire {
        score: u8,
        #[serde(default)]
        breakdown: Vec<CriterionScore>,
        #[serde(default)]
        problems: Vec<String>,
    }

    let payload = strip_code_fence(raw);
    let wire: Wire = serde_json::from_str(payload)
        .map_err(|e| Error::InvalidResponse(format!("score payload: {e}")))?;

    if wire.score > 100 {
        return Err(Error::InvalidResponse(format!(
            "score {} out of range",
            wire.score
        )));
    }
    for entry in &wire.breakdown {
        if entry.score > 20 {
            return Err(Error::InvalidResponse(format!(
                "criterion '{}' score {} out of range",
                entry.criteria, entry.score
            )));
        }
    }

    Ok(ScoreResult {
        score: wire.score,
        label: label_for_score(wire.score).to_string(),
        breakdown: wire.breakdown,
        problems: wire.problems,
    })
}
