//! Gemini HTTP backend implementation
//!
//! Talks to the Gemini REST API directly: `generateContent` with a JSON
//! response schema for slide text, and the Imagen `predict` endpoint for
//! illustrations. One HTTP call per operation; failures are classified into
//! [`BackendError`] variants and surfaced without retrying.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use deckgen_config::Config;
use deckgen_utils::error::BackendError;
use deckgen_utils::types::{ContentBody, ImageRef};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prompts;
use crate::types::{ContentRequest, ImageRequest, RefineRequest, SlideBackend};

/// Collaborator responses sometimes arrive wrapped in a Markdown code fence
/// despite the JSON response mime type. Strip a leading ```json and trailing
/// ``` before parsing.
static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(?:json)?\s*|```\s*$").expect("code fence pattern is valid"));

/// Gemini backend configuration
#[derive(Clone)]
pub(crate) struct GeminiBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    image_model: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Misconfiguration` if the HTTP client cannot be
    /// constructed.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        image_model: String,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            BackendError::Misconfiguration(format!("failed to construct HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model,
            image_model,
        })
    }

    /// Create a new Gemini backend from configuration
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Misconfiguration` if:
    /// - The API key environment variable is not set
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, BackendError> {
        let api_key_env = config.api_key_env();

        let api_key = std::env::var(api_key_env).map_err(|_| {
            BackendError::Misconfiguration(format!(
                "Gemini API key not found in environment variable '{}'. \
                 Set this variable or configure a different api_key_env in [collaborator].",
                api_key_env
            ))
        })?;

        Self::new(
            api_key,
            config.base_url().to_string(),
            config.model().to_string(),
            config.image_model().to_string(),
        )
    }

    fn text_endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn image_endpoint(&self) -> String {
        format!(
            "{}/models/{}:predict",
            self.base_url.trim_end_matches('/'),
            self.image_model
        )
    }

    /// Send one prompt through `generateContent` and return the raw text of
    /// the first candidate.
    async fn invoke_text(&self, prompt: String, timeout: Duration) -> Result<String, BackendError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: slide_content_schema(),
            },
        };

        let response = self
            .client
            .post(self.text_endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_request_error(&e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &body));
        }

        let response_body: GenerateContentResponse = response.json().await.map_err(|e| {
            BackendError::Malformed(format!("failed to parse Gemini response: {e}"))
        })?;

        let mut parts = Vec::new();
        for candidate in &response_body.candidates {
            if let Some(content) = &candidate.content {
                for part in &content.parts {
                    if let Some(text) = &part.text {
                        parts.push(text.clone());
                    }
                }
            }
            // Only the first candidate is requested; ignore any extras.
            break;
        }

        let text = parts.join("");
        if text.is_empty() {
            return Err(BackendError::Malformed(
                "Gemini response contained no text candidate".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl SlideBackend for GeminiBackend {
    async fn generate_content(&self, req: ContentRequest) -> Result<ContentBody, BackendError> {
        debug!(
            provider = "gemini",
            model = %self.model,
            slide = %req.slide_title,
            timeout_secs = req.timeout.as_secs(),
            "Drafting slide content"
        );

        let prompt = prompts::content_prompt(&req.deck_title, &req.topic);
        let text = self.invoke_text(prompt, req.timeout).await?;
        let body = parse_content_body(&text)?;

        debug!(
            provider = "gemini",
            slide = %req.slide_title,
            bullets = body.bullets.len(),
            "Slide content drafted"
        );

        Ok(body)
    }

    async fn refine_content(&self, req: RefineRequest) -> Result<ContentBody, BackendError> {
        debug!(
            provider = "gemini",
            model = %self.model,
            slide = %req.current.title,
            timeout_secs = req.timeout.as_secs(),
            "Refining slide content"
        );

        let prompt = prompts::refine_prompt(&req.current, &req.instruction);
        let text = self.invoke_text(prompt, req.timeout).await?;
        parse_content_body(&text)
    }

    async fn generate_image(&self, req: ImageRequest) -> Result<ImageRef, BackendError> {
        debug!(
            provider = "gemini",
            model = %self.image_model,
            slide = %req.content.title,
            timeout_secs = req.timeout.as_secs(),
            "Rendering slide illustration"
        );

        let request_body = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompts::image_prompt(&req.content),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "16:9".to_string(),
            },
        };

        let response = self
            .client
            .post(self.image_endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .timeout(req.timeout)
            .send()
            .await
            .map_err(|e| classify_request_error(&e, req.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_http_failure(status, &body));
        }

        let response_body: PredictResponse = response.json().await.map_err(|e| {
            BackendError::Malformed(format!("failed to parse Imagen response: {e}"))
        })?;

        let prediction = response_body.predictions.first().ok_or_else(|| {
            BackendError::Malformed("no images were generated".to_string())
        })?;

        image_from_prediction(prediction)
    }
}

/// Strip Markdown code fences and parse the collaborator's JSON body.
fn parse_content_body(text: &str) -> Result<ContentBody, BackendError> {
    let sanitized = CODE_FENCE.replace_all(text.trim(), "");

    serde_json::from_str(sanitized.trim())
        .map_err(|e| BackendError::Malformed(format!("slide content was not valid JSON: {e}")))
}

/// Decode the base64 image payload of one Imagen prediction.
fn image_from_prediction(prediction: &Prediction) -> Result<ImageRef, BackendError> {
    let encoded = prediction.bytes_base64_encoded.as_deref().ok_or_else(|| {
        BackendError::Malformed("Imagen prediction carried no image bytes".to_string())
    })?;

    let data = BASE64
        .decode(encoded)
        .map_err(|e| BackendError::Malformed(format!("image payload was not valid base64: {e}")))?;

    match prediction.mime_type.as_deref() {
        Some(mime) => Ok(ImageRef::new(data, mime)),
        None => Ok(ImageRef::png(data)),
    }
}

/// Map an HTTP error status to a backend error.
///
/// The first 200 characters of the response body ride along so auth and
/// quota messages from the provider stay visible in logs.
fn classify_http_failure(status: reqwest::StatusCode, body: &str) -> BackendError {
    let snippet: String = body.chars().take(200).collect();
    let detail = format!("HTTP {status}: {snippet}");

    match status.as_u16() {
        401 | 403 => BackendError::Auth(detail),
        429 => BackendError::Quota(detail),
        500..=599 => BackendError::Outage(detail),
        _ => BackendError::Transport(detail),
    }
}

/// Map a reqwest transport error to a backend error.
fn classify_request_error(err: &reqwest::Error, timeout: Duration) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout { duration: timeout }
    } else if err.is_connect() {
        BackendError::Transport(format!("connection failed: {err}"))
    } else {
        BackendError::Transport(err.to_string())
    }
}

/// Response schema for slide content, sent with every text call.
///
/// Forces the collaborator to answer with a JSON object shaped like
/// [`ContentBody`]: a title, an optional subtitle, and bullet strings.
fn slide_content_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A concise and engaging title for the slide.",
            },
            "subtitle": {
                "type": "STRING",
                "description": "An optional short subtitle to complement the title.",
            },
            "body": {
                "type": "ARRAY",
                "description": "The main content of the slide, as an array of bullet \
                                points (strings). Keep each point concise.",
                "items": { "type": "STRING" },
            },
        },
        "required": ["title", "body"],
    })
}

/// `generateContent` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

/// One content block in a request
#[derive(Debug, Clone, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

/// Text part of a request content block
#[derive(Debug, Clone, Serialize)]
struct RequestPart {
    text: String,
}

/// Structured output settings for a text call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

/// `generateContent` response body
#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// One candidate answer
#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

/// Content of a candidate
#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

/// One part of a candidate's content
#[derive(Debug, Clone, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Imagen `predict` request body
#[derive(Debug, Clone, Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

/// One generation instance in a predict request
#[derive(Debug, Clone, Serialize)]
struct PredictInstance {
    prompt: String,
}

/// Imagen generation parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: String,
}

/// Imagen `predict` response body
#[derive(Debug, Clone, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

/// One generated image in a predict response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_config::Config;

    fn backend() -> GeminiBackend {
        GeminiBackend::new(
            "test-key".to_string(),
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            "gemini-2.5-flash".to_string(),
            "imagen-4.0-generate-001".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_from_config_requires_api_key() {
        let mut config = Config::default();
        config.collaborator.api_key_env = Some("DECKGEN_TEST_GEMINI_KEY_MISSING".to_string());
        unsafe {
            std::env::remove_var("DECKGEN_TEST_GEMINI_KEY_MISSING");
        }

        let err = GeminiBackend::new_from_config(&config).err();
        match err {
            Some(BackendError::Misconfiguration(msg)) => {
                assert!(msg.contains("DECKGEN_TEST_GEMINI_KEY_MISSING"));
            }
            other => panic!("expected Misconfiguration, got {other:?}"),
        }
    }

    #[test]
    fn test_new_from_config_reads_key_from_env() {
        let mut config = Config::default();
        config.collaborator.api_key_env = Some("DECKGEN_TEST_GEMINI_KEY_SET".to_string());
        unsafe {
            std::env::set_var("DECKGEN_TEST_GEMINI_KEY_SET", "k-123");
        }

        let backend = GeminiBackend::new_from_config(&config).unwrap();
        assert_eq!(backend.api_key, "k-123");

        unsafe {
            std::env::remove_var("DECKGEN_TEST_GEMINI_KEY_SET");
        }
    }

    #[test]
    fn test_endpoints_interpolate_models() {
        let backend = backend();

        assert_eq!(
            backend.text_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            backend.image_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/imagen-4.0-generate-001:predict"
        );
    }

    #[test]
    fn test_endpoints_tolerate_trailing_slash() {
        let backend = GeminiBackend::new(
            "k".to_string(),
            "http://localhost:8080/v1beta/".to_string(),
            "m".to_string(),
            "im".to_string(),
        )
        .unwrap();

        assert_eq!(
            backend.text_endpoint(),
            "http://localhost:8080/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_parse_content_body_plain_json() {
        let body = parse_content_body(
            r#"{"title": "Intro", "subtitle": "Hello", "body": ["One", "Two"]}"#,
        )
        .unwrap();

        assert_eq!(body.title, "Intro");
        assert_eq!(body.subtitle.as_deref(), Some("Hello"));
        assert_eq!(body.bullets, vec!["One", "Two"]);
    }

    #[test]
    fn test_parse_content_body_strips_code_fence() {
        let fenced = "```json\n{\"title\": \"Intro\", \"body\": [\"One\"]}\n```";

        let body = parse_content_body(fenced).unwrap();
        assert_eq!(body.title, "Intro");
        assert_eq!(body.subtitle, None);
    }

    #[test]
    fn test_parse_content_body_rejects_prose() {
        let err = parse_content_body("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_classify_http_failure_variants() {
        use reqwest::StatusCode;

        assert!(matches!(
            classify_http_failure(StatusCode::UNAUTHORIZED, "bad key"),
            BackendError::Auth(_)
        ));
        assert!(matches!(
            classify_http_failure(StatusCode::FORBIDDEN, ""),
            BackendError::Auth(_)
        ));
        assert!(matches!(
            classify_http_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            BackendError::Quota(_)
        ));
        assert!(matches!(
            classify_http_failure(StatusCode::INTERNAL_SERVER_ERROR, ""),
            BackendError::Outage(_)
        ));
        assert!(matches!(
            classify_http_failure(StatusCode::IM_A_TEAPOT, ""),
            BackendError::Transport(_)
        ));
    }

    #[test]
    fn test_classify_http_failure_truncates_body() {
        let long_body = "x".repeat(1000);
        let err = classify_http_failure(reqwest::StatusCode::BAD_REQUEST, &long_body);

        match err {
            BackendError::Transport(msg) => assert!(msg.len() < 300),
            other => panic!("expected Transport, got {other:?}"),
        }
    }

    #[test]
    fn test_image_from_prediction_decodes_base64() {
        let prediction = Prediction {
            bytes_base64_encoded: Some(BASE64.encode(b"not-really-a-png")),
            mime_type: Some("image/png".to_string()),
        };

        let image = image_from_prediction(&prediction).unwrap();
        assert_eq!(image.data, b"not-really-a-png");
        assert_eq!(image.mime, "image/png");
    }

    #[test]
    fn test_image_from_prediction_rejects_missing_bytes() {
        let prediction = Prediction {
            bytes_base64_encoded: None,
            mime_type: None,
        };

        let err = image_from_prediction(&prediction).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_schema_requires_title_and_body() {
        let schema = slide_content_schema();

        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["required"][0], "title");
        assert_eq!(schema["required"][1], "body");
        assert_eq!(schema["properties"]["body"]["type"], "ARRAY");
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: "hello".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: slide_content_schema(),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_predict_request_serializes_camel_case() {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: "a farm".to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "16:9".to_string(),
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["parameters"]["sampleCount"], 1);
        assert_eq!(json["parameters"]["aspectRatio"], "16:9");
    }

    #[test]
    fn test_prediction_deserializes_camel_case() {
        let raw = r#"{"predictions": [{"bytesBase64Encoded": "QUJD", "mimeType": "image/png"}]}"#;

        let response: PredictResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            response.predictions[0].bytes_base64_encoded.as_deref(),
            Some("QUJD")
        );
    }

    #[test]
    fn test_default_config_targets_gemini() {
        let config = Config::default();

        assert_eq!(config.provider(), "gemini");
        assert_eq!(config.api_key_env(), "GEMINI_API_KEY");
    }
}
