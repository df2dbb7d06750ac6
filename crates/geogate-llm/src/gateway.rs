//! The `ArticleModel` capability trait
//!
//! Handlers depend on this trait rather than on the Anthropic client so the
//! upstream model can be stubbed in tests and swapped without touching the
//! HTTP layer.

use tracing::instrument;

use crate::client::AnthropicClient;
use crate::error::Result;
use crate::rewrite::{parse_rewrite_response, RewriteResult, REWRITE_SYSTEM_PROMPT};
use crate::score::{parse_score_response, ScoreResult, SCORE_SYSTEM_PROMPT};
use crate::{REWRITE_MAX_TOKENS, SCORE_MAX_TOKENS};

/// Capability interface over the upstream text-generation model
#[async_trait::async_trait]
pub trait ArticleModel: Send + Sync {
    /// Score an article for AI-search visibility
    async fn score(&self, article: &str) -> Result<ScoreResult>;

    /// Rewrite an article for AI-search visibility
    async fn rewrite(&self, article: &str) -> Result<RewriteResult>;
}

#[async_trait::async_trait]
impl ArticleModel for AnthropicClient {
    #[instrument(skip(self, article), fields(article_len = article.len()))]
    async fn score(&self, article: &str) -> Result<ScoreResult> {
        let user_content = format!("Analyze this article for GEO:\n\n{article}");
        let raw = self
            .send(SCORE_SYSTEM_PROMPT, user_content, SCORE_MAX_TOKENS)
            .await?;
        parse_score_response(&raw)
    }

    #[instrument(skip(self, article), fields(article_len = article.len()))]
    async fn rewrite(&self, article: &str) -> Result<RewriteResult> {
        let user_content = format!("Rewrite this article for GEO:\n\n{article}");
        let raw = self
            .send(REWRITE_SYSTEM_PROMPT, user_content, REWRITE_MAX_TOKENS)
            .await?;
        parse_rewrite_response(&raw)
    }
}
