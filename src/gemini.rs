use crate::errors::AppError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the Gemini generateContent API.
///
/// The base URL is injectable so tests can point the client at a mock server.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

/// Shape of a generateContent reply, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Creates a new `GeminiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the Gemini API.
    /// * `api_key` - The API key for authentication.
    /// * `model` - The model name used for every call.
    pub fn new(base_url: String, api_key: String, model: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Gemini client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    /// Generates a model completion for a prompt, requesting JSON output.
    ///
    /// The JSON response mode is advisory on the provider side; callers still
    /// parse the returned text defensively.
    ///
    /// # Arguments
    ///
    /// * `prompt` - The full prompt text.
    ///
    /// # Returns
    ///
    /// * `Result<String, AppError>` - The first candidate's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let body = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        });

        self.post_generate(&body).await
    }

    /// Tests whether the Gemini API is reachable and responding.
    ///
    /// # Returns
    ///
    /// * `bool` - True iff the model answered the probe prompt with "OK".
    pub async fn check_connection(&self) -> bool {
        let body = json!({
            "contents": [{
                "parts": [{"text": "Hello, respond with 'OK' if you can hear me."}]
            }]
        });

        match self.post_generate(&body).await {
            Ok(text) => text.to_uppercase().contains("OK"),
            Err(e) => {
                tracing::warn!("Gemini connectivity check failed: {}", e);
                false
            }
        }
    }

    /// Sends a generateContent request and extracts the candidate text.
    async fn post_generate(&self, body: &Value) -> Result<String, AppError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        tracing::debug!("Calling Gemini model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Gemini returned {}: {}",
                status, error_text
            )));
        }

        let data: GenerateContentResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text: String = data
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .map(|part| part.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::ExternalApiError(
                "Gemini response contained no candidate text".to_string(),
            ));
        }

        Ok(text)
    }
}
