//! OpenAI-compatible chat completions endpoint
//!
//! One `POST {base_url}/chat/completions` per call. Retries, caching and
//! circuit breaking are layered on top by the application's resilient client.

use async_trait::async_trait;
use consilium_application::{Completion, CompletionRequest, RemoteEndpoint, RemoteError, Usage};
use consilium_domain::Endpoint;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}

/// Build the JSON body for one call: optional system message, then the user payload.
fn request_body(request: &CompletionRequest) -> ChatRequest<'_> {
    let mut messages = Vec::with_capacity(2);
    if let Some(instructions) = &request.instructions {
        messages.push(ChatMessage {
            role: "system",
            content: instructions,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.payload,
    });

    ChatRequest {
        model: &request.params.model,
        messages,
        temperature: request.params.temperature,
        max_tokens: request.params.max_tokens,
    }
}

/// Extract the first choice's text and the token usage from a response body.
pub(crate) fn parse_completion(body: &str) -> Result<Completion, RemoteError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| RemoteError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| RemoteError::MalformedResponse("response has no choices".to_string()))?;

    let completion = Completion::new(text);
    Ok(match response.usage {
        Some(usage) => completion.with_usage(Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
        None => completion,
    })
}

/// Remote endpoint speaking the OpenAI chat completions protocol
pub struct ChatCompletionsEndpoint {
    http_client: reqwest::Client,
    api_key: Option<String>,
    call_timeout: Duration,
}

impl ChatCompletionsEndpoint {
    /// * `api_key` - Bearer token; omitted for local servers that need none
    /// * `connect_timeout` - Deadline for establishing the connection
    /// * `call_timeout` - Deadline for the whole exchange
    pub fn new(
        api_key: Option<String>,
        connect_timeout: Duration,
        call_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(call_timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            call_timeout,
        })
    }

    fn url(endpoint: &Endpoint) -> String {
        format!(
            "{}/chat/completions",
            endpoint.base_url().trim_end_matches('/')
        )
    }

    fn classify(&self, error: reqwest::Error) -> RemoteError {
        if error.is_timeout() {
            RemoteError::Timeout(self.call_timeout)
        } else if error.is_decode() {
            RemoteError::MalformedResponse(error.to_string())
        } else if error.is_builder() {
            RemoteError::InvalidRequest(error.to_string())
        } else {
            RemoteError::Connection(error.to_string())
        }
    }
}

#[async_trait]
impl RemoteEndpoint for ChatCompletionsEndpoint {
    async fn complete(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> Result<Completion, RemoteError> {
        let url = Self::url(endpoint);
        debug!("POST {} (model {})", url, request.params.model);
        let started = Instant::now();

        let mut builder = self.http_client.post(&url).json(&request_body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(RemoteError::from_status(status.as_u16(), body));
        }

        let completion = parse_completion(&body)?;
        info!(
            "{} answered in {:.2}s ({} tokens)",
            endpoint,
            started.elapsed().as_secs_f64(),
            completion.usage.map(|u| u.total_tokens).unwrap_or(0)
        );
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consilium_domain::ModelParams;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const OK_BODY: &str = r#"{
        "choices": [{"message": {"role": "assistant", "content": "Likely central retinal artery occlusion."}}],
        "usage": {"prompt_tokens": 120, "completion_tokens": 30, "total_tokens": 150}
    }"#;

    /// Serve one canned HTTP response; the handle yields the raw request.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (base_url, handle)
    }

    fn endpoint_at(base_url: &str) -> Endpoint {
        Endpoint::new("retina", base_url)
    }

    fn client() -> ChatCompletionsEndpoint {
        ChatCompletionsEndpoint::new(
            Some("test-key".to_string()),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("Sudden vision loss.", ModelParams::default().with_temperature(0.3))
            .with_instructions("You are a retina specialist.")
    }

    #[test]
    fn test_parse_completion() {
        let completion = parse_completion(OK_BODY).unwrap();
        assert_eq!(completion.text, "Likely central retinal artery occlusion.");
        assert_eq!(completion.usage.unwrap().total_tokens, 150);
    }

    #[test]
    fn test_parse_rejects_empty_choices() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, RemoteError::MalformedResponse(_)));
        assert!(!err.is_transient());

        let err = parse_completion("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, RemoteError::MalformedResponse(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let request = request();
        let json = serde_json::to_value(request_body(&request)).unwrap();

        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "Sudden vision loss.");

        let bare = CompletionRequest::new("only payload", ModelParams::default());
        let json = serde_json::to_value(request_body(&bare)).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_call() {
        let (base_url, server) = serve_once("200 OK", OK_BODY).await;

        let completion = client()
            .complete(&endpoint_at(&base_url), &request())
            .await
            .unwrap();

        assert_eq!(completion.text, "Likely central retinal artery occlusion.");
        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions"));
        assert!(raw.to_ascii_lowercase().contains("authorization: bearer test-key"));
        assert!(raw.contains("You are a retina specialist."));
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let (base_url, _server) =
            serve_once("503 Service Unavailable", r#"{"error": "overloaded"}"#).await;

        let err = client()
            .complete(&endpoint_at(&base_url), &request())
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Upstream { status: 503, .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_auth_failure_is_permanent() {
        let (base_url, _server) =
            serve_once("401 Unauthorized", r#"{"error": "invalid api key"}"#).await;

        let err = client()
            .complete(&endpoint_at(&base_url), &request())
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Unauthorized(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_refused_connection_is_transient() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        drop(listener);

        let err = client()
            .complete(&endpoint_at(&base_url), &request())
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Connection(_)));
    }
}
