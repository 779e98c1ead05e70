use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExtractError;

/// Prompt/schema convention used to ask a model for entities and relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Default,
    NuExtract,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Default => "default",
            ExtractionMode::NuExtract => "nuextract",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(ExtractionMode::Default),
            "nuextract" => Ok(ExtractionMode::NuExtract),
            other => Err(ExtractError::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Decoding parameters sent under `options`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// Body of a non-streaming `/api/chat` call.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    pub options: RequestOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    InvalidJson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// What came back from the server: a parsed body or a typed failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOutput {
    Parsed(serde_json::Value),
    Failed(RequestFailure),
}

impl ResponseOutput {
    pub fn is_failure(&self) -> bool {
        matches!(self, ResponseOutput::Failed(_))
    }

    pub fn failure(&self) -> Option<&RequestFailure> {
        match self {
            ResponseOutput::Failed(f) => Some(f),
            ResponseOutput::Parsed(_) => None,
        }
    }
}

/// Timing counters Ollama reports alongside a chat completion.
/// Durations are in nanoseconds, as sent by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerTimings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ServerTimings {
    /// Pull the timing counters out of a response body, if any are there.
    pub fn from_body(body: &serde_json::Value) -> Option<Self> {
        let field = |name: &str| body.get(name).and_then(|v| v.as_u64());
        let timings = Self {
            total_duration: field("total_duration"),
            load_duration: field("load_duration"),
            prompt_eval_count: field("prompt_eval_count"),
            eval_count: field("eval_count"),
        };

        if timings == Self::default() {
            None
        } else {
            Some(timings)
        }
    }
}

/// One timed request, before it is attached to an input text.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub model: String,
    pub mode: ExtractionMode,
    pub num_tokens: usize,
    pub processing_time: Option<f64>,
    pub response_status: Option<u16>,
    pub output: ResponseOutput,
    pub server_timings: Option<ServerTimings>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("default".parse::<ExtractionMode>().unwrap(), ExtractionMode::Default);
        assert_eq!("nuextract".parse::<ExtractionMode>().unwrap(), ExtractionMode::NuExtract);
        assert!("NuExtract".parse::<ExtractionMode>().is_err());
        assert!("".parse::<ExtractionMode>().is_err());
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ExtractionMode::NuExtract).unwrap(), json!("nuextract"));
        assert_eq!(ExtractionMode::Default.to_string(), "default");
    }

    #[test]
    fn test_options_skip_missing_fields() {
        let options = RequestOptions {
            temperature: 0.0,
            top_p: None,
            top_k: None,
        };
        assert_eq!(serde_json::to_value(&options).unwrap(), json!({"temperature": 0.0}));
    }

    #[test]
    fn test_failure_output_shape() {
        let output = ResponseOutput::Failed(RequestFailure {
            kind: FailureKind::InvalidJson,
            message: "bad".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"failed": {"kind": "invalid_json", "message": "bad"}})
        );
    }

    #[test]
    fn test_server_timings_from_body() {
        let body = json!({"message": {"content": "{}"}, "total_duration": 1200, "eval_count": 7});
        let timings = ServerTimings::from_body(&body).unwrap();
        assert_eq!(timings.total_duration, Some(1200));
        assert_eq!(timings.eval_count, Some(7));
        assert_eq!(timings.load_duration, None);

        assert!(ServerTimings::from_body(&json!({"message": {}})).is_none());
        assert!(ServerTimings::from_body(&json!([1, 2])).is_none());
    }
}
