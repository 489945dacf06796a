//! External LLM inference clients.
//!
//! Non-streaming completions against OpenAI-compatible (OpenAI, Groq) and
//! Anthropic APIs. A provider safety refusal surfaces as
//! `Error::ContentRejected`, distinct from transport or API failures.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use redraft_core::{Error, Result};

use crate::config::LlmConfig;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Groq,
}

impl Provider {
    fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => OPENAI_BASE_URL,
            Provider::Groq => GROQ_BASE_URL,
            Provider::Anthropic => ANTHROPIC_BASE_URL,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::OpenAi => write!(f, "openai"),
            Provider::Anthropic => write!(f, "anthropic"),
            Provider::Groq => write!(f, "groq"),
        }
    }
}

/// One completion round-trip: prompts in, text out.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        max_output_tokens: usize,
    ) -> Result<String>;

    /// Model identifier recorded on completed jobs.
    fn model(&self) -> &str;
}

/// HTTP inference client for the configured provider.
pub struct HttpInference {
    client: Client,
    provider: Provider,
    model: String,
    api_key: String,
    base_url: String,
}

impl HttpInference {
    pub fn new(provider: Provider, model: String, api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            provider,
            model,
            api_key,
            base_url,
        }
    }

    /// Build a client from the resolved provider configuration.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let (provider, model, api_key) = config
            .resolve_provider()
            .ok_or_else(|| Error::Config("no inference provider configured".into()))?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());
        Ok(Self::new(provider, model, api_key, base_url))
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    async fn complete_openai_compat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        max_output_tokens: usize,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "temperature": temperature,
            "max_tokens": max_output_tokens,
        });

        debug!("Completion request to {} with model {}", url, self.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("API error {status}: {body}")));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("malformed response: {e}")))?;

        let choice = &parsed["choices"][0];
        if choice["finish_reason"].as_str() == Some("content_filter") {
            return Err(Error::ContentRejected(
                "completion stopped by content filter".into(),
            ));
        }

        choice["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Inference("completion response has no content".into()))
    }

    async fn complete_anthropic(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        max_output_tokens: usize,
    ) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = json!({
            "model": self.model,
            "system": system_prompt,
            "messages": [{"role": "user", "content": user_prompt}],
            "temperature": temperature,
            "max_tokens": max_output_tokens,
        });

        debug!("Completion request to {} with model {}", url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!("API error {status}: {body}")));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("malformed response: {e}")))?;

        if parsed["stop_reason"].as_str() == Some("refusal") {
            return Err(Error::ContentRejected("completion refused".into()));
        }

        let text: String = parsed["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|b| b["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Inference("completion response has no content".into()));
        }
        Ok(text)
    }
}

#[async_trait]
impl InferenceClient for HttpInference {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f64,
        max_output_tokens: usize,
    ) -> Result<String> {
        match self.provider {
            Provider::OpenAi | Provider::Groq => {
                self.complete_openai_compat(system_prompt, user_prompt, temperature, max_output_tokens)
                    .await
            }
            Provider::Anthropic => {
                self.complete_anthropic(system_prompt, user_prompt, temperature, max_output_tokens)
                    .await
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}
