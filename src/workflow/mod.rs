pub mod fallback;

use std::sync::Arc;

use serde::Deserialize;

use crate::error::AppError;
use crate::llm::{LlmError, TextGenerator};

pub use fallback::select_fallback;

/// How many history entries (three exchanges) go into an answer prompt.
const HISTORY_WINDOW: usize = 6;

const NO_WORKFLOW_CONTEXT: &str = "No workflow context available.";
const EMPTY_ANSWER: &str = "I understand your question. Let me help you with that.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    #[serde(other)]
    Assistant,
}

/// One turn of the caller's conversation, supplied with every request.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationMessage {
    #[serde(rename = "type")]
    pub speaker: Speaker,
    pub content: String,
}

pub struct WorkflowService {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl WorkflowService {
    /// `None` means no credential was configured; every call then fails
    /// with a configuration error.
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    fn generator(&self) -> Result<&dyn TextGenerator, AppError> {
        self.generator
            .as_deref()
            .ok_or_else(|| AppError::Configuration("GEMINI_API_KEY not configured".into()))
    }

    pub async fn generate_workflow(&self, goal: &str) -> Result<String, AppError> {
        let generator = self.generator()?;

        tracing::info!("Generating workflow for: {}", goal);
        match generator.generate(&workflow_prompt(goal)).await {
            Ok(text) => {
                tracing::debug!("Generated workflow: {}...", preview(&text));
                Ok(text)
            }
            Err(LlmError::QuotaExceeded(msg)) => {
                tracing::warn!("Quota exceeded, using fallback workflow: {}", msg);
                Ok(select_fallback(goal))
            }
            Err(e) => {
                tracing::error!("Error generating workflow: {}", e);
                Err(AppError::Upstream(e.to_string()))
            }
        }
    }

    pub async fn answer_question(
        &self,
        question: &str,
        workflow_steps: &[String],
        history: &[ConversationMessage],
    ) -> Result<String, AppError> {
        let generator = self.generator()?;

        let prompt = answer_prompt(question, workflow_steps, history);
        let text = generator
            .generate(&prompt)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let answer = text.trim();
        if answer.is_empty() {
            Ok(EMPTY_ANSWER.to_string())
        } else {
            Ok(answer.to_string())
        }
    }
}

pub fn workflow_prompt(goal: &str) -> String {
    format!(
        "Create a detailed step-by-step workflow for: {goal}

Please provide a clear, actionable workflow with numbered steps.
Make it practical and easy to follow."
    )
}

pub fn answer_prompt(
    question: &str,
    workflow_steps: &[String],
    history: &[ConversationMessage],
) -> String {
    let workflow_context = if workflow_steps.is_empty() {
        NO_WORKFLOW_CONTEXT.to_string()
    } else {
        workflow_steps.join("\n")
    };

    let recent = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
    let recent_context = recent
        .iter()
        .map(|msg| {
            let who = match msg.speaker {
                Speaker::User => "User",
                Speaker::Assistant => "Assistant",
            };
            format!("{}: {}", who, msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a helpful AI assistant helping with a workflow. Answer the user's question based on the workflow context and conversation history.

Workflow Steps:
{workflow_context}

Recent Conversation:
{recent_context}

User Question: {question}

Provide a helpful, specific answer that relates to the workflow. Be conversational and encouraging.
Keep your response concise but informative (2-4 sentences)."
    )
}

fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}
