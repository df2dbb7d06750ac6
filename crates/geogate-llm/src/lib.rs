//! Geogate LLM - Upstream model gateway
//!
//! This crate wraps the single external text-generation endpoint Geogate
//! relies on:
//! - Client: Anthropic Messages API transport (blocking call, no retries)
//! - Score: GEO visibility scoring prompt + strict JSON response parsing
//! - Rewrite: article rewriting prompt + `JSON:`/`ARTICLE:` marker parsing
//! - Gateway: the `ArticleModel` capability trait so the upstream can be
//!   swapped or stubbed in tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod gateway;
pub mod rewrite;
pub mod score;
pub mod types;
pub mod util;

pub use client::AnthropicClient;
pub use error::{Error, Result};
pub use gateway::ArticleModel;
pub use rewrite::{RewriteResult, REWRITE_MAX_TOKENS};
pub use score::{label_for_score, CriterionScore, ScoreResult, SCORE_MAX_TOKENS};
pub use types::AnthropicConfig;
