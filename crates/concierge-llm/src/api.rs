//! API-based language model using OpenAI-compatible chat endpoints.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use concierge_types::CollaboratorError;

use crate::model::{match_topic_label, LanguageModel, RewriteContext, Safety, Verdict};
use crate::prompts;

/// Configuration for the API language model.
#[derive(Debug, Clone)]
pub struct ApiModelConfig {
    /// API base URL (e.g., "https://api.openai.com/v1").
    pub base_url: String,

    /// Model for classification, privacy, and verification calls.
    pub triage_model: String,

    /// Model for answer rewriting.
    pub rewrite_model: String,

    /// API key.
    pub api_key: SecretString,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries on rate limiting before degrading.
    pub max_retries: u32,
}

impl ApiModelConfig {
    /// Config for the OpenAI chat API.
    pub fn openai(
        api_key: impl Into<String>,
        triage_model: impl Into<String>,
        rewrite_model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            triage_model: triage_model.into(),
            rewrite_model: rewrite_model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Override the base URL (for compatible self-hosted endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Language model backed by an OpenAI-compatible `/chat/completions`
/// endpoint.
pub struct ApiModel {
    client: Client,
    config: ApiModelConfig,
}

impl ApiModel {
    /// Create a new API model.
    pub fn new(config: ApiModelConfig) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Call the endpoint with bounded exponential backoff on rate limits.
    async fn complete_with_retry(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<String, CollaboratorError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, model, "Calling chat API");

            match self.complete(model, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempts < self.config.max_retries => {
                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Chat call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn complete(&self, model: &str, prompt: &str) -> Result<String, CollaboratorError> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChatResponseMessage,
        }

        #[derive(Deserialize)]
        struct ChatResponseMessage {
            content: String,
        }

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .json(&ChatRequest {
                model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                temperature: 0.2,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::Timeout(self.config.timeout)
                } else {
                    CollaboratorError::Unavailable(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(CollaboratorError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Unavailable(format!(
                "HTTP {status}: {body}"
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        let choice = body.choices.into_iter().next().ok_or_else(|| {
            CollaboratorError::InvalidResponse("empty choices in chat response".to_string())
        })?;

        Ok(choice.message.content)
    }
}

/// Parse a `VERDICT:` line out of a verification response.
///
/// Models sometimes skip the requested format and answer with a bare
/// "APPROVED"; that counts only when no verdict line parses. Anything else
/// is [`Verdict::Undetermined`], which the caller treats as a rejection.
pub(crate) fn parse_verdict(response: &str) -> Verdict {
    for line in response.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("VERDICT:") {
            let value = rest.trim().to_uppercase();
            if value.starts_with("APPROVED") {
                return Verdict::Approved;
            }
            if value.starts_with("REJECTED") {
                return Verdict::Rejected;
            }
        }
    }

    let bare = response.trim().to_uppercase();
    if bare.starts_with("APPROVED") {
        return Verdict::Approved;
    }
    if bare.starts_with("REJECTED") {
        return Verdict::Rejected;
    }

    Verdict::Undetermined
}

#[async_trait]
impl LanguageModel for ApiModel {
    async fn classify(
        &self,
        question: &str,
        labels: &[String],
    ) -> Result<Option<String>, CollaboratorError> {
        let prompt = prompts::classification_prompt(question, labels);
        let response = self
            .complete_with_retry(&self.config.triage_model, &prompt)
            .await?;

        let answer = response.trim();
        if answer.eq_ignore_ascii_case("NONE") {
            return Ok(None);
        }
        Ok(match_topic_label(answer, labels))
    }

    async fn check_privacy(&self, question: &str) -> Result<Safety, CollaboratorError> {
        let prompt = prompts::privacy_prompt(question);
        let response = self
            .complete_with_retry(&self.config.triage_model, &prompt)
            .await?;

        let answer = response.trim().to_uppercase();
        if answer.starts_with("YES") {
            Ok(Safety::Unsafe)
        } else {
            Ok(Safety::Safe)
        }
    }

    async fn rewrite(
        &self,
        raw_answer: &str,
        question: &str,
        context: &RewriteContext,
    ) -> Result<String, CollaboratorError> {
        let prompt = prompts::rewrite_prompt(raw_answer, question, context);
        let response = self
            .complete_with_retry(&self.config.rewrite_model, &prompt)
            .await?;
        Ok(response.trim().to_string())
    }

    async fn verify(
        &self,
        question: &str,
        answer: &str,
    ) -> Result<Verdict, CollaboratorError> {
        let prompt = prompts::verification_prompt(question, answer);
        let response = self
            .complete_with_retry(&self.config.triage_model, &prompt)
            .await?;
        Ok(parse_verdict(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_config() {
        let config = ApiModelConfig::openai("key", "gpt-4o-mini", "gpt-4o");
        assert_eq!(config.triage_model, "gpt-4o-mini");
        assert_eq!(config.rewrite_model, "gpt-4o");
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_parse_verdict_approved() {
        let response = "REASONING: Faithful rewrite.\nVERDICT: APPROVED";
        assert_eq!(parse_verdict(response), Verdict::Approved);
    }

    #[test]
    fn test_parse_verdict_rejected() {
        let response = "REASONING: Added a deadline.\nVERDICT: REJECTED";
        assert_eq!(parse_verdict(response), Verdict::Rejected);
    }

    #[test]
    fn test_parse_verdict_garbage_is_undetermined() {
        assert_eq!(parse_verdict("looks fine to me"), Verdict::Undetermined);
    }

    #[test]
    fn test_parse_verdict_bare_affirmative() {
        assert_eq!(parse_verdict("Approved."), Verdict::Approved);
    }

    #[test]
    fn test_parse_verdict_tolerates_padding() {
        let response = "  VERDICT:  approved, with minor wording changes";
        assert_eq!(parse_verdict(response), Verdict::Approved);
    }
}
