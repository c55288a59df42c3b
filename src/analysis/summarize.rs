//! Natural-language synopses of source files.
//!
//! The pipeline only depends on the [`Summarizer`] contract (raw text in,
//! synopsis out). [`LlmSummarizer`] fulfils it with an OpenAI-compatible chat
//! endpoint or a local Ollama server.

use crate::config::{SummarizerConfig, SummarizerProvider};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that explains code accurately and concisely.";

/// Turns raw file text into a short description
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String>;
}

/// Cache of summaries keyed by content hash
#[derive(Debug, Default)]
pub struct SummaryCache {
    cache: Mutex<HashMap<String, String>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    pub fn set(&self, key: String, value: String) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Summarizer backed by a hosted or local LLM
pub struct LlmSummarizer {
    config: SummarizerConfig,
    cache: SummaryCache,
    client: reqwest::Client,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Response from OpenAI API
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessage {
    content: String,
}

/// Request to OpenAI API
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIRequestMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAIRequestMessage {
    role: String,
    content: String,
}

impl LlmSummarizer {
    pub fn new(config: SummarizerConfig) -> Self {
        Self {
            config,
            cache: SummaryCache::new(),
            client: reqwest::Client::new(),
        }
    }

    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    async fn query_llm(&self, code: &str) -> Result<String> {
        match self.config.provider {
            SummarizerProvider::Ollama => self.query_ollama(code).await,
            SummarizerProvider::OpenAI => self.query_openai(code).await,
        }
    }

    async fn query_ollama(&self, code: &str) -> Result<String> {
        let url = self
            .config
            .api_url
            .as_deref()
            .unwrap_or("http://localhost:11434");
        let endpoint = format!("{}/api/generate", url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": self.config.model,
            "system": SYSTEM_PROMPT,
            "prompt": build_prompt(code),
            "stream": false
        });

        let response = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::summarize(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::summarize(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| Error::summarize(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(result.response.trim().to_string())
    }

    async fn query_openai(&self, code: &str) -> Result<String> {
        let url = self
            .config
            .api_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1");
        let endpoint = format!("{}/chat/completions", url.trim_end_matches('/'));

        let api_key = self
            .config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| Error::summarize("OpenAI API key not configured"))?;

        let request = OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                OpenAIRequestMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OpenAIRequestMessage {
                    role: "user".to_string(),
                    content: build_prompt(code),
                },
            ],
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::summarize(format!("OpenAI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::summarize(format!(
                "OpenAI returned status {}",
                response.status()
            )));
        }

        let result: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| Error::summarize(format!("Failed to parse OpenAI response: {}", e)))?;

        result
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| Error::summarize("No response from OpenAI"))
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::invalid_input("file content is required"));
        }

        let code = truncate_chars(text, self.config.max_input_chars);
        let key = content_key(code);
        if let Some(cached) = self.cache.get(&key) {
            debug!(key = %key, "summary cache hit");
            return Ok(cached);
        }

        let summary = self.query_llm(code).await?;
        self.cache.set(key, summary.clone());
        Ok(summary)
    }
}

fn build_prompt(code: &str) -> String {
    format!(
        "Explain the functionality of the code in brief and concise terms accurately: \n\n{}",
        code
    )
}

/// Cut `text` to at most `max` chars without splitting a code point
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn content_key(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}
