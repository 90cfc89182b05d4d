//! Ollama HTTP client.
//!
//! Talks to a locally-running Ollama instance over `/api/chat` (one
//! synchronous, non-streaming request per extraction) and `/api/tags`
//! (model inventory). Also home to the mock client used across the
//! test suites.

use serde::{Deserialize, Serialize};

use crate::config;
use crate::types::LlmClient;
use crate::ExtractError;

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at an Ollama instance.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default Ollama instance at localhost:11434 with the stock timeout.
    pub fn default_local() -> Self {
        Self::new(config::DEFAULT_BASE_URL, config::DEFAULT_TIMEOUT_SECS)
    }

    /// Build a client from the environment.
    ///
    /// Honors `OLLAMA_HOST` the way Ollama's own CLI does (scheme
    /// optional, `host:port` accepted); falls back to the local default
    /// when the variable is unset or blank.
    pub fn from_env() -> Self {
        match std::env::var("OLLAMA_HOST") {
            Ok(host) if !host.trim().is_empty() => {
                Self::new(&normalize_host(host.trim()), config::DEFAULT_TIMEOUT_SECS)
            }
            _ => Self::default_local(),
        }
    }

    /// Base URL this client talks to (trailing slash already trimmed).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Prefix a scheme-less host with `http://`.
fn normalize_host(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Validate a model name against the Ollama naming convention.
///
/// Blocks path traversal, shell metacharacters, and other junk before any
/// HTTP call. Accepts `model`, `model:tag`, and one optional community
/// namespace segment (`namespace/model:tag`). Each segment must start
/// with an alphanumeric character.
pub fn validate_model_name(name: &str) -> Result<(), ExtractError> {
    if name.is_empty() {
        return Err(ExtractError::InvalidModelName(name.to_string()));
    }

    let valid = regex::Regex::new(
        r"^[a-zA-Z0-9][a-zA-Z0-9._-]*(/[a-zA-Z0-9][a-zA-Z0-9._-]*)?(:[a-zA-Z0-9._-]+)?$",
    )
    .expect("static regex");

    if valid.is_match(name) {
        Ok(())
    } else {
        Err(ExtractError::InvalidModelName(name.to_string()))
    }
}

/// Request body for Ollama /api/chat
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

/// One message in the chat request.
#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Generation options. Temperature only: extraction wants determinism,
/// not creative sampling knobs.
#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Response body from Ollama /api/chat
#[derive(Deserialize)]
struct ChatResponse {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<TaggedModel>,
}

#[derive(Deserialize)]
struct TaggedModel {
    name: String,
}

impl LlmClient for OllamaClient {
    fn chat(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, ExtractError> {
        validate_model_name(model)?;

        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            options: ChatOptions { temperature },
        };

        let started = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    ExtractError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    ExtractError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    ExtractError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ExtractError::ResponseParsing(e.to_string()))?;

        tracing::debug!(
            model = %model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chat round trip complete"
        );

        Ok(parsed.message.content)
    }

    fn is_model_available(&self, model: &str) -> Result<bool, ExtractError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, ExtractError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(|e| {
            if e.is_connect() {
                ExtractError::Connection(self.base_url.clone())
            } else {
                ExtractError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TagsResponse = response
            .json()
            .map_err(|e| ExtractError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock LLM client for testing — returns a configurable response.
pub struct MockLlmClient {
    response: String,
    available_models: Vec<String>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            available_models: vec!["llama3.1:latest".to_string()],
        }
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }
}

impl LlmClient for MockLlmClient {
    fn chat(
        &self,
        _model: &str,
        _system: &str,
        _prompt: &str,
        _temperature: f32,
    ) -> Result<String, ExtractError> {
        Ok(self.response.clone())
    }

    fn is_model_available(&self, model: &str) -> Result<bool, ExtractError> {
        Ok(self.available_models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, ExtractError> {
        Ok(self.available_models.clone())
    }
}
