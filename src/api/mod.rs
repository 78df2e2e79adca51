pub mod handlers;
pub mod routes;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::tts::{DEFAULT_FILENAME, DEFAULT_VOICE_ID};
use crate::workflow::ConversationMessage;

/// Returns the field if it holds something other than whitespace.
fn required<'a>(field: &'a Option<String>, message: &str) -> Result<&'a str, AppError> {
    field
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct WorkflowRequest {
    pub goal: Option<String>,
}

impl WorkflowRequest {
    pub fn goal(&self) -> Result<&str, AppError> {
        required(&self.goal, "No user goal provided")
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub workflow: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateWorkflowResponse {
    pub steps: String,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: Option<String>,
    #[serde(default)]
    pub workflow_steps: Vec<String>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationMessage>,
}

impl QuestionRequest {
    pub fn question(&self) -> Result<&str, AppError> {
        required(&self.question, "No question provided")
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: Option<String>,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_filename() -> String {
    DEFAULT_FILENAME.to_string()
}

impl TtsRequest {
    pub fn text(&self) -> Result<&str, AppError> {
        required(&self.text, "No text provided")
    }
}

#[derive(Debug, Serialize)]
pub struct TtsResponse {
    pub audio_url: String,
    pub audio_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub gemini_configured: bool,
    pub murf_configured: bool,
    pub version: String,
}
