use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::ExtractError;
use crate::prompt::build_messages;
use crate::schema::{
    ChatRequest, ExtractionMode, FailureKind, Measurement, RequestFailure, RequestOptions,
    ResponseOutput, ServerTimings,
};
use crate::tokens::estimate_tokens;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Sends one non-streaming chat request per call and times it.
#[derive(Clone)]
pub struct OllamaChatClient {
    base_url: String,
    client: reqwest::Client,
}

/// Decoding options and the optional keep-alive for a mode
pub fn options_for(mode: ExtractionMode) -> (RequestOptions, Option<String>) {
    match mode {
        ExtractionMode::Default => (
            RequestOptions {
                temperature: 0.0,
                top_p: Some(0.6),
                top_k: Some(30),
            },
            Some("10m".to_string()),
        ),
        ExtractionMode::NuExtract => (
            RequestOptions {
                temperature: 0.0,
                top_p: None,
                top_k: None,
            },
            None,
        ),
    }
}

impl OllamaChatClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Client whose requests give up after `timeout`
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    pub fn build_request(model: &str, article_text: &str, mode: ExtractionMode) -> ChatRequest {
        let (options, keep_alive) = options_for(mode);
        ChatRequest {
            model: model.to_string(),
            messages: build_messages(article_text, mode),
            stream: false,
            options,
            keep_alive,
        }
    }

    /// Run one extraction request. Transport and parse problems end up in
    /// the returned measurement; this never fails.
    pub async fn run_extraction(
        &self,
        model: &str,
        article_text: &str,
        mode: ExtractionMode,
    ) -> Measurement {
        let request = Self::build_request(model, article_text, mode);
        let num_tokens = estimate_tokens(&request.messages);

        info!(model, mode = %mode, tokens = num_tokens, "Benchmarking model");

        let start = Instant::now();
        let sent = self.client.post(self.chat_url()).json(&request).send().await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => return network_failure(model, mode, num_tokens, e),
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return network_failure(model, mode, num_tokens, e),
        };
        let elapsed = start.elapsed().as_secs_f64();

        debug!(model, status, elapsed_s = elapsed, "Response received");

        let (output, server_timings) = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(value) => {
                let timings = ServerTimings::from_body(&value);
                (ResponseOutput::Parsed(value), timings)
            }
            Err(e) => {
                warn!(model, status, error = %e, "Response body is not valid JSON");
                (
                    ResponseOutput::Failed(RequestFailure {
                        kind: FailureKind::InvalidJson,
                        message: format!("Invalid JSON response ({}): {}", e, body),
                    }),
                    None,
                )
            }
        };

        Measurement {
            model: model.to_string(),
            mode,
            num_tokens,
            processing_time: Some(elapsed),
            response_status: Some(status),
            output,
            server_timings,
        }
    }

    /// Like [`run_extraction`](Self::run_extraction) but takes the mode as a
    /// tag. An unknown tag is rejected before anything is sent.
    pub async fn run_extraction_tagged(
        &self,
        model: &str,
        article_text: &str,
        tag: &str,
    ) -> Result<Measurement, ExtractError> {
        let mode: ExtractionMode = tag.parse()?;
        Ok(self.run_extraction(model, article_text, mode).await)
    }
}

impl Default for OllamaChatClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL.to_string())
    }
}

fn network_failure(
    model: &str,
    mode: ExtractionMode,
    num_tokens: usize,
    error: reqwest::Error,
) -> Measurement {
    warn!(model, mode = %mode, error = %error, "Request failed");

    Measurement {
        model: model.to_string(),
        mode,
        num_tokens,
        processing_time: None,
        response_status: None,
        output: ResponseOutput::Failed(RequestFailure {
            kind: FailureKind::Network,
            message: format!("Request failed: {}", error),
        }),
        server_timings: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_payload() {
        let request = OllamaChatClient::build_request("m", "text", ExtractionMode::Default);
        let payload = serde_json::to_value(&request).unwrap();

        assert_eq!(payload["model"], "m");
        assert_eq!(payload["stream"], false);
        assert_eq!(payload["keep_alive"], "10m");
        assert_eq!(payload["options"], json!({"temperature": 0.0, "top_p": 0.6, "top_k": 30}));
        assert_eq!(payload["messages"].as_array().unwrap().len(), 2);
        assert_eq!(payload["messages"][0]["role"], "system");
    }

    #[test]
    fn test_nuextract_payload() {
        let request = OllamaChatClient::build_request("m", "text", ExtractionMode::NuExtract);
        let payload = serde_json::to_value(&request).unwrap();

        assert_eq!(payload["options"], json!({"temperature": 0.0}));
        assert!(payload.get("keep_alive").is_none());
        assert_eq!(payload["messages"][0]["role"], "user");
    }

    #[test]
    fn test_chat_url_trims_slash() {
        let client = OllamaChatClient::new("http://localhost:11434/".to_string());
        assert_eq!(client.chat_url(), "http://localhost:11434/api/chat");
        assert_eq!(OllamaChatClient::default().chat_url(), "http://localhost:11434/api/chat");
    }
}
