use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::AiConfig;
use crate::types::AssistTask;

pub(crate) const SYSTEM_PROMPT: &str = "You are an assistant that helps with text editing.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub(crate) role: String,
    pub(crate) content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ChatRequest {
    pub(crate) model: String,
    pub(crate) messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum AiError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl AiError {
    pub(crate) fn user_message(&self) -> String {
        match self {
            AiError::MissingCredential => {
                "No API key is configured.\nSet OPENAI_API_KEY (or the variable named by \
                 api_key_env in config.json) and restart."
                    .to_string()
            }
            AiError::Network(detail) => {
                format!("Could not reach the completion service:\n{detail}")
            }
            AiError::Auth { status, message } => {
                format!("The completion service rejected the API key (HTTP {status}):\n{message}")
            }
            AiError::RateLimited(message) => {
                format!("Rate limited by the completion service. Try again shortly.\n{message}")
            }
            AiError::Service { status, message } => {
                format!("The completion service returned HTTP {status}:\n{message}")
            }
            AiError::MalformedResponse(detail) => {
                format!("Unexpected response from the completion service:\n{detail}")
            }
        }
    }
}

/// Anything that can answer a chat-completion request.
pub(crate) trait CompletionBackend: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, AiError>;
}

pub(crate) fn build_request(model: &str, task: AssistTask, text: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: "system".to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Please {} for the following text:\n\n{}",
                    task.instruction(),
                    text
                ),
            },
        ],
    }
}

pub(crate) struct OpenAiClient {
    http: Option<Client>,
    endpoint: Url,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub(crate) fn new(config: &AiConfig) -> Self {
        let http = match Client::builder().timeout(config.timeout).build() {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!(%err, "failed to initialize HTTP client");
                None
            }
        };
        Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

impl CompletionBackend for OpenAiClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, AiError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AiError::MissingCredential);
        };
        let Some(http) = self.http.as_ref() else {
            return Err(AiError::Network("HTTP client unavailable".to_string()));
        };
        let response = http
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(request)
            .send()
            .map_err(|err| AiError::Network(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| AiError::Network(err.to_string()))?;
        if !status.is_success() {
            return Err(classify_status(status, &body));
        }
        parse_completion(&body)
    }
}

pub(crate) fn classify_status(status: StatusCode, body: &str) -> AiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiError::Auth {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => AiError::RateLimited(message),
        _ => AiError::Service {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extracts the trimmed content of the first choice.
pub(crate) fn parse_completion(body: &str) -> Result<String, AiError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|err| AiError::MalformedResponse(err.to_string()))?;
    let Some(choice) = parsed.choices.into_iter().next() else {
        return Err(AiError::MalformedResponse("no choices".to_string()));
    };
    let Some(content) = choice.message.content else {
        return Err(AiError::MalformedResponse("choice has no content".to_string()));
    };
    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_has_system_and_user_messages() {
        let req = build_request("gpt-3.5-turbo", AssistTask::FixGrammar, "teh cat");
        assert_eq!(req.model, "gpt-3.5-turbo");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert_eq!(req.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(req.messages[1].role, "user");
        assert_eq!(
            req.messages[1].content,
            "Please correct grammar for the following text:\n\nteh cat"
        );
    }

    #[test]
    fn test_request_serializes_to_wire_shape() {
        let req = build_request("m", AssistTask::Summarize, "x");
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(
            value["messages"][1]["content"],
            "Please summarize for the following text:\n\nx"
        );
    }

    #[test]
    fn test_parse_takes_first_choice_trimmed() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  short  \n"}},{"message":{"content":"other"}}]}"#;
        assert_eq!(parse_completion(body).expect("parse"), "short");
    }

    #[test]
    fn test_parse_rejects_missing_choices_and_garbage() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(AiError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(AiError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion("<html>"),
            Err(AiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_status_codes_map_to_error_kinds() {
        let body = r#"{"error":{"message":"Incorrect API key provided"}}"#;
        match classify_status(StatusCode::UNAUTHORIZED, body) {
            AiError::Auth { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            AiError::RateLimited(_)
        ));
        match classify_status(StatusCode::INTERNAL_SERVER_ERROR, "oops") {
            AiError::Service { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_key_fails_before_any_request() {
        let client = OpenAiClient::new(&AiConfig::default());
        let req = build_request("m", AssistTask::Generate, "hello");
        assert!(matches!(
            client.complete(&req),
            Err(AiError::MissingCredential)
        ));
    }

    #[test]
    fn test_each_error_kind_has_distinct_message() {
        let messages = [
            AiError::MissingCredential.user_message(),
            AiError::Network("x".into()).user_message(),
            AiError::Auth {
                status: 401,
                message: "x".into(),
            }
            .user_message(),
            AiError::RateLimited("x".into()).user_message(),
            AiError::Service {
                status: 500,
                message: "x".into(),
            }
            .user_message(),
            AiError::MalformedResponse("x".into()).user_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
