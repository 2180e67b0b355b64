//! Remote multimodal AI client (C6).
//!
//! Grounded directly on the teacher's `GeminiClient`: a `reqwest` client
//! posting the same `{contents:[{role,parts}], generationConfig}`
//! envelope to a Gemini-shaped endpoint. Retry/backoff/timeout is new —
//! the teacher's `analyze_transcript` only does model-name fallback, so
//! the retry loop is grounded instead on the exponential-backoff helper
//! this crate carries forward as [`crate::retry`]. Response parsing
//! extends the teacher's markdown-fence stripping with the balanced-brace
//! extraction, forgiving repair, and regex fallback in [`crate::parser`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{watch, Mutex, Semaphore};
use tracing::{info, warn};

use crate::error::{AiClientError, AiClientResult};
use crate::parser::{parse_reply, ParsedReply};
use crate::retry::{retry_async, RetryConfig, RetryResult};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Remote handle to an uploaded artifact, returned by `upload`.
#[derive(Debug, Clone)]
pub struct RemoteHandle {
    pub uri: String,
    pub mime_type: String,
}

/// A credential cached until near expiry. API-key auth never truly
/// expires, but the type still carries an `expires_at` so token-based
/// auth backends can slot in without changing the call site.
#[derive(Debug, Clone)]
pub struct ShortLivedToken {
    pub value: String,
    pub expires_at: Instant,
}

impl ShortLivedToken {
    pub fn is_near_expiry(&self) -> bool {
        self.expires_at.saturating_duration_since(Instant::now()) < Duration::from_secs(30)
    }
}

/// Generation parameters forwarded into `generationConfig`.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub temperature: f64,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

/// A raw, unparsed reply alongside the parsed+repaired structured value.
#[derive(Debug, Clone)]
pub struct RawReply {
    pub text: String,
    pub parsed: ParsedReply,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "fileData", skip_serializing_if = "Option::is_none")]
    file_data: Option<RequestFileData>,
}

#[derive(Debug, Serialize)]
struct RequestFileData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    #[serde(rename = "fileUri")]
    file_uri: String,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: String,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestGenerationConfig {
    temperature: f64,
    #[serde(rename = "topP")]
    top_p: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: RequestGenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Configuration for the AI client, loaded once at process start.
#[derive(Debug, Clone)]
pub struct AiClientConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    pub max_concurrent_requests: usize,
}

impl AiClientConfig {
    /// Load from `GEMINI_API_KEY` (required) and `REELSORT_AI_ENDPOINT`
    /// (optional override, used to point at a mock server in tests).
    pub fn from_env() -> AiClientResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AiClientError::config_error("GEMINI_API_KEY not set"))?;
        let endpoint = std::env::var("REELSORT_AI_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        Ok(Self {
            api_key,
            endpoint,
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrent_requests: 3,
        })
    }
}

/// Client for a Gemini-shaped multimodal analysis endpoint.
pub struct AiClient {
    config: AiClientConfig,
    http: Client,
    semaphore: Arc<Semaphore>,
    token: Mutex<Option<ShortLivedToken>>,
}

impl AiClient {
    pub fn new(config: AiClientConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_requests));
        Self {
            http: Client::new(),
            semaphore,
            token: Mutex::new(None),
            config,
        }
    }

    pub fn from_env() -> AiClientResult<Self> {
        Ok(Self::new(AiClientConfig::from_env()?))
    }

    /// Return a cached token, refreshing transparently when near expiry.
    /// API-key auth has no real refresh step; this still exercises the
    /// cache so a future OAuth-based backend is a drop-in.
    pub async fn auth_token(&self) -> ShortLivedToken {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if !token.is_near_expiry() {
                return token.clone();
            }
        }
        let token = ShortLivedToken {
            value: self.config.api_key.clone(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };
        *guard = Some(token.clone());
        token
    }

    /// Upload a local artifact and return a handle the model can
    /// reference by URI in subsequent `generate` calls.
    pub async fn upload(&self, path: impl AsRef<std::path::Path>, mime_hint: &str) -> AiClientResult<RemoteHandle> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        let token = self.auth_token().await;
        let url = format!("{}/upload/v1beta/files?key={}", self.config.endpoint, token.value);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(path.file_name().and_then(|n| n.to_str()).unwrap_or("artifact").to_string())
            .mime_str(mime_hint)
            .map_err(|e| AiClientError::UploadFailed(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AiClientError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiClientError::UploadFailed(format!("{}: {}", status, body)));
        }

        let body: Value = response.json().await.map_err(|e| AiClientError::UploadFailed(e.to_string()))?;
        let uri = body
            .pointer("/file/uri")
            .and_then(Value::as_str)
            .ok_or_else(|| AiClientError::UploadFailed("upload response missing file.uri".to_string()))?
            .to_string();

        Ok(RemoteHandle {
            uri,
            mime_type: mime_hint.to_string(),
        })
    }

    /// Generate content from a text prompt and optional attachments,
    /// retrying on transient/5xx failures and honoring a per-call timeout
    /// and cooperative cancellation.
    pub async fn generate(
        &self,
        prompt: &str,
        attachments: &[RemoteHandle],
        params: &GenerationParams,
        cancel: &watch::Receiver<bool>,
    ) -> AiClientResult<RawReply> {
        let retry_config = RetryConfig::for_remote_ai();

        let result = retry_async(&retry_config, || self.generate_once(prompt, attachments, params, cancel)).await;

        match result {
            RetryResult::Success(reply) => Ok(reply),
            RetryResult::Failed { error, attempts } => {
                warn!(attempts, "all retry attempts exhausted for generate()");
                Err(error)
            }
        }
    }

    async fn generate_once(
        &self,
        prompt: &str,
        attachments: &[RemoteHandle],
        params: &GenerationParams,
        cancel: &watch::Receiver<bool>,
    ) -> AiClientResult<RawReply> {
        if *cancel.borrow() {
            return Err(AiClientError::Cancelled);
        }

        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| AiClientError::request_failed("semaphore closed"))?;

        let token = self.auth_token().await;
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, token.value
        );

        let mut parts = vec![RequestPart {
            text: Some(prompt.to_string()),
            file_data: None,
        }];
        for handle in attachments {
            parts.push(RequestPart {
                text: None,
                file_data: Some(RequestFileData {
                    mime_type: handle.mime_type.clone(),
                    file_uri: handle.uri.clone(),
                }),
            });
        }

        let body = GenerateRequest {
            model: self.config.model.clone(),
            contents: vec![RequestContent {
                role: "user".to_string(),
                parts,
            }],
            generation_config: RequestGenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                max_output_tokens: params.max_output_tokens,
            },
        };

        let request = self.http.post(&url).json(&body).timeout(self.config.timeout).send();

        let response = tokio::select! {
            result = request => result.map_err(classify_reqwest_error)?,
            _ = wait_for_cancel(cancel) => return Err(AiClientError::Cancelled),
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_status(status.as_u16(), body));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            AiClientError::request_failed(format!("failed to parse generate response: {}", e))
        })?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();

        info!(bytes = text.len(), "received generate() reply");

        let parsed_reply = parse_reply(&text);
        Ok(RawReply {
            text,
            parsed: parsed_reply,
        })
    }
}

async fn wait_for_cancel(cancel: &watch::Receiver<bool>) {
    let mut cancel = cancel.clone();
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> AiClientError {
    if err.is_timeout() {
        AiClientError::Timeout(DEFAULT_TIMEOUT_SECS)
    } else {
        AiClientError::request_failed(err.to_string())
    }
}

/// 4xx (except 429) are fatal and not retried by returning an
/// `AllModelsFailed`-shaped terminal error path is handled by the caller;
/// this just classifies the status for `retry_async`'s `Err` arm, which
/// the retry loop itself doesn't distinguish — non-retryable callers are
/// expected to check `RawReply`/error content and stop further model
/// fallback when this happens repeatedly.
fn classify_http_status(status: u16, body: String) -> AiClientError {
    AiClientError::request_failed(format!("endpoint returned {}: {}", status, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_near_expiry_when_close_to_now() {
        let token = ShortLivedToken {
            value: "x".to_string(),
            expires_at: Instant::now() + Duration::from_secs(5),
        };
        assert!(token.is_near_expiry());
    }

    #[test]
    fn token_is_not_near_expiry_when_far_out() {
        let token = ShortLivedToken {
            value: "x".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };
        assert!(!token.is_near_expiry());
    }

    #[tokio::test]
    async fn auth_token_is_cached_across_calls() {
        let config = AiClientConfig {
            api_key: "test-key".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(1),
            max_concurrent_requests: 1,
        };
        let client = AiClient::new(config);
        let a = client.auth_token().await;
        let b = client.auth_token().await;
        assert_eq!(a.value, b.value);
    }

    #[tokio::test]
    async fn generate_parses_successful_reply() {
        use wiremock::matchers::{method, path_regex};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"/.*:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "{\"summary\": \"hello\"}"}]}}]
            })))
            .mount(&server)
            .await;

        let config = AiClientConfig {
            api_key: "test-key".to_string(),
            endpoint: server.uri(),
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(5),
            max_concurrent_requests: 1,
        };
        let client = AiClient::new(config);
        let (_tx, rx) = watch::channel(false);

        let reply = client
            .generate("describe this video", &[], &GenerationParams::default(), &rx)
            .await
            .unwrap();

        assert!(!reply.parsed.degraded);
        assert_eq!(reply.parsed.value["summary"], "hello");
    }

    #[tokio::test]
    async fn generate_respects_pre_set_cancellation() {
        let config = AiClientConfig {
            api_key: "test-key".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(5),
            max_concurrent_requests: 1,
        };
        let client = AiClient::new(config);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let err = client
            .generate_once("prompt", &[], &GenerationParams::default(), &rx)
            .await
            .unwrap_err();
        assert!(matches!(err, AiClientError::Cancelled));
    }
}
