//! Resume structuring — turns extracted plain text into a `ResumeProfile`.
//!
//! `AppState` holds an `Arc<dyn ResumeStructurer>`; the production backend is
//! `LlmResumeStructurer`, tests swap in fixed implementations.

pub mod models;
pub mod prompts;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{parse_json_lenient, LlmClient, LlmError, MODEL};
pub use models::{ResumeProfile, PROFILE_KEYS};
use prompts::{RESUME_PARSE_PROMPT, RESUME_PARSE_SYSTEM};

/// Shortest input worth sending to the model.
const MIN_STRUCTURE_CHARS: usize = 10;

#[async_trait]
pub trait ResumeStructurer: Send + Sync {
    /// Label persisted alongside parsed records.
    fn model_name(&self) -> &str;

    async fn structure(&self, resume_text: &str) -> Result<ResumeProfile, AppError>;
}

pub struct LlmResumeStructurer {
    llm: LlmClient,
}

impl LlmResumeStructurer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ResumeStructurer for LlmResumeStructurer {
    fn model_name(&self) -> &str {
        MODEL
    }

    async fn structure(&self, resume_text: &str) -> Result<ResumeProfile, AppError> {
        let text = resume_text.trim();
        if text.chars().count() < MIN_STRUCTURE_CHARS {
            return Ok(ResumeProfile::default());
        }
        if !self.llm.has_api_key() {
            warn!("No LLM API key configured; returning empty resume profile");
            return Ok(ResumeProfile::default());
        }

        let prompt = RESUME_PARSE_PROMPT.replace("{resume_text}", text);
        let raw = self
            .llm
            .call_text(&prompt, RESUME_PARSE_SYSTEM)
            .await
            .map_err(map_llm_error)?;

        let profile = coerce_profile(&raw);
        info!(
            "Structured resume: name={} skills={} education={} experience={}",
            profile.full_name.is_some(),
            profile.skills.len(),
            profile.education.len(),
            profile.experience.len()
        );
        Ok(profile)
    }
}

/// Model output → profile. Unparseable output becomes the empty profile.
pub fn coerce_profile(raw: &str) -> ResumeProfile {
    match parse_json_lenient::<Value>(raw) {
        Ok(value) => ResumeProfile::from_value(&value),
        Err(e) => {
            warn!("Model output was not JSON ({e}); using empty profile");
            ResumeProfile::default()
        }
    }
}

pub fn map_llm_error(e: LlmError) -> AppError {
    if e.is_unauthorized() {
        AppError::Unauthorized(
            "Invalid LLM API key or insufficient permissions. Set ANTHROPIC_API_KEY and restart the service."
                .to_string(),
        )
    } else {
        AppError::Llm(format!("Failed to structure resume: {e}"))
    }
}
