//! OpenAI-compatible chat completion client (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
};

const PROVIDER: &str = "openai-compat";

/// Chat completion request body.
#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    stream: bool,
}

/// Chat completion response (non-streaming).
#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ReplyMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// `LlmProvider` backed by any `/chat/completions` endpoint.
pub struct OpenAiCompatProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
    timeout: Duration,
}

impl OpenAiCompatProvider {
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            timeout,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout {
                provider: PROVIDER.to_string(),
                timeout: self.timeout,
            }
        } else {
            LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            let text = response.text().await.unwrap_or_default();

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthFailed {
                    provider: PROVIDER.to_string(),
                },
                StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
                    provider: PROVIDER.to_string(),
                    retry_after,
                },
                _ => LlmError::RequestFailed {
                    provider: PROVIDER.to_string(),
                    reason: format!("HTTP {}: {}", status.as_u16(), text),
                },
            });
        }

        let raw = response.text().await.map_err(|e| self.map_send_error(e))?;
        let reply: ChatCompletionReply = serde_json::from_str(&raw)?;

        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: "response has no choices".to_string(),
            })?;

        let (input_tokens, output_tokens) = reply
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            input_tokens,
            output_tokens,
            finish_reason: FinishReason::from_api(choice.finish_reason.as_deref()),
            response_id: reply.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiCompatProvider {
        OpenAiCompatProvider::new(
            &server.uri(),
            SecretString::from("gsk_test"),
            "llama-3.1-8b-instant",
            Duration::from_secs(2),
        )
        .unwrap()
    }

    fn classify_request() -> CompletionRequest {
        CompletionRequest::new(vec![
            ChatMessage::system("classify"),
            ChatMessage::user("Preciso da fatura"),
        ])
        .with_max_tokens(10)
        .with_temperature(0.1)
        .with_top_p(0.9)
    }

    #[tokio::test]
    async fn sends_sampling_parameters_and_parses_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama-3.1-8b-instant",
                "max_tokens": 10,
                "stream": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": " PRODUTIVO "},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 40, "completion_tokens": 3, "total_tokens": 43}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider_for(&server)
            .complete(classify_request())
            .await
            .unwrap();

        assert_eq!(response.content, " PRODUTIVO ");
        assert_eq!(response.input_tokens, 40);
        assert_eq!(response.output_tokens, 3);
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.response_id.as_deref(), Some("chatcmpl-1"));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(classify_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::AuthFailed { .. }));
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(classify_request())
            .await
            .unwrap_err();
        match err {
            LlmError::RateLimited { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("Expected RateLimited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_error_maps_to_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(classify_request())
            .await
            .unwrap_err();
        match err {
            LlmError::RequestFailed { reason, .. } => assert!(reason.contains("500")),
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-2",
                "choices": []
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(classify_request())
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn slow_server_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let provider = OpenAiCompatProvider::new(
            &server.uri(),
            SecretString::from("gsk_test"),
            "m",
            Duration::from_millis(200),
        )
        .unwrap();

        let err = provider.complete(classify_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout { .. }));
    }

    #[test]
    fn trailing_slash_trimmed_from_base_url() {
        let provider = OpenAiCompatProvider::new(
            "https://api.groq.com/openai/v1/",
            SecretString::from("gsk_x"),
            "m",
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(provider.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(provider.model_name(), "m");
    }
}
