use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::sources::body_snippet;

/// The one long outbound timeout in the system; generation is slow.
const GENERATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: String,
}

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(base_url: &str, api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(GENERATION_TIMEOUT_SECS))
            .user_agent("Seance/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    /// Run one single-turn generation and return the first candidate's text.
    ///
    /// When a response schema is given, the request constrains the model to
    /// JSON output matching it; the returned text is then that JSON.
    pub async fn generate(&self, prompt: &str, response_schema: Option<&Value>) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let payload = if let Some(schema) = response_schema {
            json!({
                "contents": [{
                    "parts": [
                        {"text": prompt}
                    ]
                }],
                "generationConfig": {
                    "response_mime_type": "application/json",
                    "response_schema": schema,
                }
            })
        } else {
            json!({
                "contents": [{
                    "parts": [
                        {"text": prompt}
                    ]
                }]
            })
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Gemini API returned {}: {}",
                status,
                body_snippet(&text)
            );
            return Err(anyhow!("Gemini API request failed: {}", status));
        }

        let body: GeminiResponse = response.json().await?;

        body.candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.clone())
            .ok_or_else(|| anyhow!("No text output found in Gemini response"))
    }
}
