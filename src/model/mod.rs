pub mod types;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use thiserror::Error;

use crate::config::RelayConfig;
use types::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};

// Finish reasons after which the SDK refuses to hand out text.
const BLOCKING_FINISH_REASONS: &[&str] = &["SAFETY", "RECITATION", "LANGUAGE"];

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("Malformed response from Gemini: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Candidate was blocked due to {0}")]
    CandidateBlocked(String),

    #[error("Text not available. {0}")]
    PromptBlocked(String),
}

/// Anything that can turn a prompt context into generated text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        contents: &[Content],
        config: &GenerationConfig,
    ) -> Result<String, UpstreamError>;
}

// A wrapper for the Gemini REST API
pub struct GeminiModel {
    client: Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiModel {
    pub fn new(config: &RelayConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &RelayConfig, client: Client) -> Self {
        info!("Using Gemini model {} at {}", config.model, config.api_base);

        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[async_trait]
impl Generator for GeminiModel {
    async fn generate(
        &self,
        contents: &[Content],
        config: &GenerationConfig,
    ) -> Result<String, UpstreamError> {
        let payload = GenerateContentRequest {
            contents,
            generation_config: config,
        };

        info!(
            "Sending {} content blocks to {} (max_output_tokens: {})",
            contents.len(),
            self.model,
            config.max_output_tokens
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Api {
                status: status.as_u16(),
                message: api_error_message(status.as_u16(), &body),
            });
        }

        debug!("Response JSON: {}", body);
        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        let text = extract_text(parsed)?;

        info!("Response length: {} characters", text.chars().count());
        Ok(text)
    }
}

/// Pulls the human-readable message out of a Google error envelope.
fn api_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => format!("{}: {}", status, body.trim()),
    }
}

/// Reads the reply text the way the Google SDK's `text()` accessor does.
pub fn extract_text(response: GenerateContentResponse) -> Result<String, UpstreamError> {
    if response.candidates.len() > 1 {
        warn!(
            "Gemini returned {} candidates, using the first",
            response.candidates.len()
        );
    }

    if let Some(candidate) = response.candidates.into_iter().next() {
        if let Some(reason) = candidate.finish_reason {
            if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) {
                return Err(UpstreamError::CandidateBlocked(reason));
            }
        }

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        return Ok(text);
    }

    if let Some(feedback) = response.prompt_feedback {
        let mut message = String::from("Response was blocked");
        if let Some(reason) = feedback.block_reason {
            message.push_str(&format!(" due to {}", reason));
        }
        if let Some(detail) = feedback.block_reason_message {
            message.push_str(&format!(": {}", detail));
        }
        return Err(UpstreamError::PromptBlocked(message));
    }

    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let response = parse(json!({
            "candidates": [
                {
                    "content": { "role": "model", "parts": [{ "text": "Hi " }, { "text": "there" }] },
                    "finishReason": "STOP"
                },
                {
                    "content": { "role": "model", "parts": [{ "text": "ignored" }] }
                }
            ]
        }));
        assert_eq!(extract_text(response).unwrap(), "Hi there");
    }

    #[test]
    fn max_tokens_finish_still_returns_text() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "partial" }] },
                "finishReason": "MAX_TOKENS"
            }]
        }));
        assert_eq!(extract_text(response).unwrap(), "partial");
    }

    #[test]
    fn safety_finish_is_an_error() {
        let response = parse(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }));
        let err = extract_text(response).unwrap_err();
        assert_eq!(err.to_string(), "Candidate was blocked due to SAFETY");
    }

    #[test]
    fn language_finish_is_an_error() {
        let response = parse(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "unsupported" }] },
                "finishReason": "LANGUAGE"
            }]
        }));
        let err = extract_text(response).unwrap_err();
        assert!(matches!(err, UpstreamError::CandidateBlocked(ref r) if r == "LANGUAGE"));
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let response = parse(json!({
            "promptFeedback": { "blockReason": "OTHER" }
        }));
        let err = extract_text(response).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Text not available. Response was blocked due to OTHER"
        );
    }

    #[test]
    fn empty_response_passes_through_as_empty_text() {
        assert_eq!(extract_text(parse(json!({}))).unwrap(), "");
        let no_parts = parse(json!({ "candidates": [{ "content": { "role": "model" } }] }));
        assert_eq!(extract_text(no_parts).unwrap(), "");
    }

    #[test]
    fn api_error_prefers_envelope_message() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(api_error_message(429, body), "quota exceeded");
        assert_eq!(api_error_message(502, "Bad Gateway\n"), "502: Bad Gateway");
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let config = RelayConfig::from_lookup(|key| match key {
            "GOOGLE_API_KEY" => Some("k".to_string()),
            "GEMINI_API_BASE" => Some("http://localhost:9000/".to_string()),
            _ => None,
        })
        .unwrap();
        let model = GeminiModel::new(&config);
        assert_eq!(
            model.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
