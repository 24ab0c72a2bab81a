//! Google Gemini completion client
//!
//! Calls the `generateContent` REST endpoint with reqwest:
//! - Endpoint: POST {api_base}/models/{model}:generateContent
//! - Auth: `x-goog-api-key` header
//! - One system instruction + one user message per request

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CompletionClient;
use crate::errors::{ChatError, Result};

/// Default Gemini API base
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Default request timeout (60 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini REST client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create client with default endpoint and model
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_config(DEFAULT_API_BASE, DEFAULT_MODEL, api_key, DEFAULT_TIMEOUT)
    }

    /// Create client with custom configuration
    pub fn with_config(
        api_base: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ChatError::HttpError)?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ChatError::completion(format!("missing API key (set {})", API_KEY_ENV)))
    }

    /// Check that the model endpoint answers for this key.
    ///
    /// Uses the model metadata endpoint so no tokens are spent. `Ok(false)`
    /// means the endpoint answered with an error status; transport failures
    /// are returned as errors.
    pub async fn health_check(&self) -> Result<bool> {
        let key = self.api_key()?;
        let url = format!("{}/models/{}", self.api_base, self.model);

        match self
            .client
            .get(&url)
            .header("x-goog-api-key", key)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => Err(ChatError::completion(transport_cause(&e))),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, system_instruction: &str, user_message: &str) -> Result<String> {
        let key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: user_message.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::completion(transport_cause(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ChatError::completion(format!("HTTP {}: {}", status, message)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ChatError::completion(format!("Failed to parse response: {}", e)))?;

        parsed.into_text()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn transport_cause(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<String> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no reason given".to_string());
            return Err(ChatError::completion(format!(
                "response contained no candidates ({})",
                reason
            )));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "UNKNOWN".to_string());
            return Err(ChatError::completion(format!(
                "empty completion (finish reason: {})",
                reason
            )));
        }

        Ok(text)
    }
}
