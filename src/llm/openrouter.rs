// ABOUTME: OpenRouter chat completion provider with a five minute request timeout
// ABOUTME: Maps OpenAI-style error bodies and transport timeouts into structured errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::config::LlmConfig;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::utils::http_client::llm_client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

const SERVICE: &str = "openrouter";

/// Connection settings
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Bearer API key
    pub api_key: String,
    /// Model used when the request names none
    pub default_model: String,
    /// API base URL, e.g. `https://openrouter.ai/api/v1`
    pub base_url: String,
}

impl OpenRouterConfig {
    /// Build from environment settings
    ///
    /// # Errors
    ///
    /// Returns a config error when `OPENROUTER_API_KEY` is not set
    pub fn from_config(config: &LlmConfig) -> AppResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AppError::config("OPENROUTER_API_KEY is not set"))?;
        Ok(Self {
            api_key,
            default_model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// OpenRouter provider
pub struct OpenRouterProvider {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterProvider {
    /// Provider with the five minute LLM client
    #[must_use]
    pub fn new(config: OpenRouterConfig) -> Self {
        Self::with_client(llm_client(), config)
    }

    /// Provider using a caller-supplied HTTP client
    #[must_use]
    pub const fn with_client(client: reqwest::Client, config: OpenRouterConfig) -> Self {
        Self { client, config }
    }

    /// Provider from environment settings
    ///
    /// # Errors
    ///
    /// Returns a config error when no API key is configured
    pub fn from_config(config: &LlmConfig) -> AppResult<Self> {
        Ok(Self::new(OpenRouterConfig::from_config(config)?))
    }

    fn api_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn parse_error_response(status: u16, body: &str) -> AppError {
        let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |parsed| parsed.error.message,
        );
        match status {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE}: authentication failed: {message}"),
            ),
            402 => AppError::new(
                ErrorCode::ExternalRequestRejected,
                format!("{SERVICE}: insufficient credits: {message}"),
            ),
            _ => AppError::from_upstream_status(SERVICE, status, &message),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        SERVICE
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);
        let body = CompletionRequest {
            model,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "OpenRouter request failed");
                if e.is_timeout() {
                    AppError::external_unavailable(SERVICE, "program generation timed out")
                } else {
                    AppError::external_unavailable(SERVICE, e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::external_unavailable(SERVICE, "program generation timed out")
            } else {
                AppError::external_service(SERVICE, format!("failed to read response: {e}"))
            }
        })?;
        if !status.is_success() {
            return Err(Self::parse_error_response(status.as_u16(), &text));
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| AppError::external_service(SERVICE, format!("invalid response: {e}")))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE, "response had no choices"))?;
        let content = choice.message.content.unwrap_or_default();
        debug!(
            chars = content.len(),
            finish_reason = ?choice.finish_reason,
            "OpenRouter completion received"
        );

        Ok(ChatResponse {
            content,
            model: parsed.model.unwrap_or_else(|| model.to_owned()),
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}
