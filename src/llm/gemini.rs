use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{LlmError, TextGenerator};

lazy_static! {
    static ref QUOTA_MARKERS: Regex = Regex::new(r"(?i)429|quota|exceeded").unwrap();
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    api_key: String,
    api_base: String,
    model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        api_base: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::Upstream(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            api_base,
            model,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = self.endpoint();
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        tracing::debug!(url = %url, prompt_len = prompt.len(), "Sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_failure)?;

        let status = response.status();
        if !status.is_success() {
            let response_body = response
                .text()
                .await
                .unwrap_or_else(|_| "could not read body".to_string());
            return Err(classify_failure(
                Some(status.as_u16()),
                &format!("Gemini API error ({}): {}", status, response_body),
            ));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Upstream(format!("Invalid Gemini response: {}", e)))?;

        let text = parsed.into_text()?;
        tracing::debug!(status = %status, text_len = text.len(), "Gemini response received");
        Ok(text)
    }
}

/// The URL is dropped from the message so the port number can never look like a 429.
fn transport_failure(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        return LlmError::Upstream(format!("Gemini request timed out: {}", e.without_url()));
    }
    let status = e.status().map(|s| s.as_u16());
    classify_failure(status, &e.without_url().to_string())
}

/// Decides whether a failed call means the quota ran out.
///
/// The provider reports exhaustion as HTTP 429 or with "quota"/"exceeded"
/// in its message, so both the status and the text are checked.
pub fn classify_failure(status: Option<u16>, message: &str) -> LlmError {
    if status == Some(429) || QUOTA_MARKERS.is_match(message) {
        LlmError::QuotaExceeded(message.to_string())
    } else {
        LlmError::Upstream(message.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Joins the first candidate's text parts. A reply with no candidate or
    /// no text part at all (a blocked prompt, say) is an upstream failure.
    fn into_text(self) -> Result<String, LlmError> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(no_text(block_reason.as_deref().map(|r| ("blockReason", r))));
        };

        let texts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if texts.is_empty() {
            let reason = block_reason
                .as_deref()
                .map(|r| ("blockReason", r))
                .or(candidate.finish_reason.as_deref().map(|r| ("finishReason", r)));
            return Err(no_text(reason));
        }

        Ok(texts.concat())
    }
}

fn no_text(reason: Option<(&str, &str)>) -> LlmError {
    match reason {
        Some((field, value)) => {
            LlmError::Upstream(format!("Gemini returned no text ({}: {})", field, value))
        }
        None => LlmError::Upstream("Gemini returned no text".to_string()),
    }
}
