use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::config::CONFIG;
use crate::error::ForgeError;
use crate::llm::media::{detect_mime_type, DEFAULT_IMAGE_MIME};
use crate::prompt::{build_prompt, TraitSelection};
use crate::utils::http::get_http_client;
use crate::utils::timing::log_request_timing;

const ERROR_BODY_LIMIT: usize = 300;
const IMAGEN_MODEL_PREFIX: &str = "imagen";

/// Request shape family, chosen from the model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// `:predict` with `instances`, answered with `predictions`.
    Imagen,
    /// `:generateContent` with `contents`, answered with candidate parts.
    Gemini,
}

impl ModelFamily {
    pub fn for_model(model: &str) -> Self {
        if model.trim().starts_with(IMAGEN_MODEL_PREFIX) {
            ModelFamily::Imagen
        } else {
            ModelFamily::Gemini
        }
    }

    fn method(self) -> &'static str {
        match self {
            ModelFamily::Imagen => "predict",
            ModelFamily::Gemini => "generateContent",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ModelFamily::Imagen => "Imagen",
            ModelFamily::Gemini => "Gemini",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub family: ModelFamily,
    pub prompt: String,
}

impl GenerationRequest {
    pub fn new(selection: &TraitSelection, model: &str) -> Self {
        let model = model.trim().to_string();
        GenerationRequest {
            family: ModelFamily::for_model(&model),
            prompt: build_prompt(selection),
            model,
        }
    }

    pub fn body(&self) -> Value {
        match self.family {
            ModelFamily::Imagen => json!({
                "instances": [{ "prompt": self.prompt }],
                "parameters": {
                    "sampleCount": 1,
                    "aspectRatio": "3:4",
                    "outputOptions": { "mimeType": "image/png" }
                }
            }),
            ModelFamily::Gemini => json!({
                "contents": [{ "parts": [{ "text": self.prompt }] }],
                "generationConfig": {
                    "responseModalities": ["IMAGE", "TEXT"],
                    "temperature": 1.0
                }
            }),
        }
    }

    pub fn endpoint(&self, base_url: &str, credential: &str) -> Result<Url, ForgeError> {
        let raw = format!(
            "{}/models/{}:{}",
            base_url.trim_end_matches('/'),
            self.model,
            self.family.method()
        );
        let mut url = Url::parse(&raw)
            .map_err(|err| ForgeError::Input(format!("Invalid API endpoint {raw}: {err}")))?;
        url.query_pairs_mut().append_pair("key", credential);
        Ok(url)
    }
}

/// Base64 image payload returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image_base64: String,
    pub mime_type: String,
}

impl GenerationResult {
    pub fn decode_bytes(&self) -> Result<Vec<u8>, ForgeError> {
        general_purpose::STANDARD
            .decode(self.image_base64.as_bytes())
            .map_err(|err| ForgeError::Payload(format!("Image data is not valid base64: {err}")))
    }
}

#[derive(Debug, Deserialize)]
struct ImagenResponse {
    predictions: Option<Vec<ImagenPrediction>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagenPrediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: Option<String>,
    data: Option<String>,
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

fn redact_credential(text: &str, credential: &str) -> String {
    let key = credential.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

const SNIFF_PREFIX_CHARS: usize = 64;

/// The provider's mime type is kept as sent. When it is missing, the leading
/// bytes are sniffed and only an `image/*` match is used, else PNG.
fn image_result(data: String, mime_type: Option<String>) -> GenerationResult {
    let mime_type = mime_type
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| sniff_image_mime(&data));
    GenerationResult {
        image_base64: data,
        mime_type,
    }
}

fn sniff_image_mime(data: &str) -> String {
    let prefix = data.get(..SNIFF_PREFIX_CHARS).unwrap_or(data);
    general_purpose::STANDARD
        .decode(prefix.as_bytes())
        .ok()
        .and_then(|bytes| detect_mime_type(&bytes))
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string())
}

fn extract_imagen_image(body: &str) -> Result<GenerationResult, ForgeError> {
    let response: ImagenResponse = serde_json::from_str(body)
        .map_err(|err| ForgeError::Payload(format!("Malformed Imagen response: {err}")))?;
    let prediction = response
        .predictions
        .and_then(|predictions| predictions.into_iter().next());
    match prediction {
        Some(ImagenPrediction {
            bytes_base64_encoded: Some(data),
            mime_type,
        }) if !data.is_empty() => Ok(image_result(data, mime_type)),
        _ => Err(ForgeError::Payload("No image in Imagen response".to_string())),
    }
}

fn extract_gemini_image(body: &str) -> Result<GenerationResult, ForgeError> {
    let response: GeminiResponse = serde_json::from_str(body)
        .map_err(|err| ForgeError::Payload(format!("Malformed Gemini response: {err}")))?;
    let parts = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .unwrap_or_default();

    let mut text_parts = 0usize;
    for part in parts {
        if part.text.is_some() {
            text_parts += 1;
        }
        if let Some(GeminiInlineData {
            data: Some(data),
            mime_type,
        }) = part.inline_data
        {
            if !data.is_empty() {
                return Ok(image_result(data, mime_type));
            }
        }
    }

    debug!(target: "llm.gemini", text_parts, "Gemini response carried no inline image");
    Err(ForgeError::Payload("No image data in response".to_string()))
}

/// Client for the generative language image endpoints.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(get_http_client().clone(), CONFIG.api_base_url.clone())
    }

    pub async fn generate_portrait(
        &self,
        selection: &TraitSelection,
        credential: &str,
        model: &str,
    ) -> Result<GenerationResult, ForgeError> {
        let request = GenerationRequest::new(selection, model);
        let metadata = json!({ "family": request.family.label(), "promptChars": request.prompt.len() });
        log_request_timing(
            "gemini",
            &request.model,
            "generate_portrait",
            Some(metadata),
            || self.send(&request, credential),
        )
        .await
    }

    async fn send(
        &self,
        request: &GenerationRequest,
        credential: &str,
    ) -> Result<GenerationResult, ForgeError> {
        let url = request.endpoint(&self.base_url, credential)?;
        debug!(
            target: "llm.gemini",
            model = %request.model,
            family = request.family.label(),
            url = %redact_credential(url.as_str(), credential),
            "Sending portrait request"
        );

        let response = self
            .client
            .post(url)
            .json(&request.body())
            .send()
            .await
            .map_err(|err| {
                let err_text = redact_credential(&err.to_string(), credential);
                warn!(
                    "Portrait request failed to send: {} (timeout={}, connect={})",
                    err_text,
                    err.is_timeout(),
                    err.is_connect()
                );
                ForgeError::Network(err_text)
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            let excerpt = truncate_chars(&redact_credential(&body, credential), ERROR_BODY_LIMIT);
            warn!(
                "Image API error: status={}, model={}, body={}",
                status, request.model, excerpt
            );
            return Err(ForgeError::Transport {
                status: status.as_u16(),
                body: excerpt,
            });
        }

        match request.family {
            ModelFamily::Imagen => extract_imagen_image(&body),
            ModelFamily::Gemini => extract_gemini_image(&body),
        }
    }
}

/// Generates one portrait with the configured endpoint and shared HTTP client.
pub async fn generate_portrait(
    selection: &TraitSelection,
    credential: &str,
    model: &str,
) -> Result<GenerationResult, ForgeError> {
    GeminiClient::from_config()
        .generate_portrait(selection, credential, model)
        .await
}
