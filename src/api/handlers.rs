use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use super::{
    AnswerResponse, GenerateWorkflowResponse, HealthResponse, QuestionRequest, TtsRequest,
    TtsResponse, WorkflowRequest, WorkflowResponse,
};
use crate::api::routes::AppState;
use crate::error::AppError;

pub async fn index() -> &'static str {
    "Goalflow API is running! Available routes: /api/workflow, /api/generate_workflow, /api/ask, /api/tts, /audio/<filename>"
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        gemini_configured: state.workflow.is_configured(),
        murf_configured: state.tts.is_configured(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn workflow(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WorkflowRequest>, JsonRejection>,
) -> Result<Json<WorkflowResponse>, AppError> {
    let Json(request) = payload?;
    let goal = request.goal()?;

    tracing::info!("Received goal: {}", goal);
    let workflow = state.workflow.generate_workflow(goal).await?;

    Ok(Json(WorkflowResponse { workflow }))
}

pub async fn generate_workflow(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WorkflowRequest>, JsonRejection>,
) -> Result<Json<GenerateWorkflowResponse>, AppError> {
    let Json(request) = payload?;
    let goal = request.goal()?;

    let steps = state.workflow.generate_workflow(goal).await?;

    Ok(Json(GenerateWorkflowResponse { steps }))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, AppError> {
    let Json(request) = payload?;
    let question = request.question()?;

    tracing::info!(
        steps = request.workflow_steps.len(),
        history = request.conversation_history.len(),
        "Answering question: {}",
        question
    );
    let answer = state
        .workflow
        .answer_question(
            question,
            &request.workflow_steps,
            &request.conversation_history,
        )
        .await?;

    Ok(Json(AnswerResponse { answer }))
}

pub async fn tts(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Json<TtsResponse>, AppError> {
    let Json(request) = payload?;
    let text = request.text()?;

    let synthesis = state
        .tts
        .synthesize(text, &request.voice_id, &request.filename);

    Ok(Json(TtsResponse {
        audio_url: synthesis.audio_url,
        audio_urls: synthesis.audio_urls,
    }))
}
