use super::types::{
    BatchChatRequest, BatchChatResponse, ChatRequest, ChatResponse, ErrorResponse,
    FeedbackRequest,
};
use crate::{
    generation,
    history::{ChatRecord, ChatStore},
    pipeline::{GenerationParams, TextGenerationPipeline},
    Error,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ChatStore>,
    /// Absent when the backend could not be configured; generation then
    /// degrades to placeholder answers instead of failing requests.
    pub pipeline: Option<Arc<dyn TextGenerationPipeline>>,
    pub params: GenerationParams,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn internal_error(e: impl std::fmt::Display) -> HandlerError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Storage error: {}", e),
        }),
    )
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, HandlerError> {
    info!("Received chat request for question: {}", request.question);

    // Generate session ID if not provided
    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let (answer, response_time) = generation::generate_response(
        state.pipeline.as_deref(),
        &request.question,
        &state.params,
    )
    .await;

    let record = ChatRecord::new(
        session_id.clone(),
        request.question,
        answer.clone(),
        response_time,
    );
    let chat_id = match state.store.save(record).await {
        Ok(id) => Some(id),
        Err(e) => {
            error!("Failed to persist chat record: {}", e);
            return Err(internal_error(e));
        }
    };

    Ok(Json(ChatResponse {
        session_id,
        chat_id,
        answer,
        response_time,
    }))
}

pub async fn chat_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchChatRequest>,
) -> Result<Json<BatchChatResponse>, HandlerError> {
    info!("Received batch chat request with {} questions", request.questions.len());

    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let (answers, timings) = generation::generate_batch_responses(
        state.pipeline.as_deref(),
        &request.questions,
        &state.params,
    )
    .await;

    let average_response_time = timings.first().copied().unwrap_or(0.0);

    for (question, answer) in request.questions.iter().zip(answers.iter()) {
        let record = ChatRecord::new(
            session_id.clone(),
            question.clone(),
            answer.clone(),
            average_response_time,
        );
        if let Err(e) = state.store.save(record).await {
            error!("Failed to persist batch chat record: {}", e);
            return Err(internal_error(e));
        }
    }

    Ok(Json(BatchChatResponse {
        session_id,
        answers,
        average_response_time,
    }))
}

pub async fn history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<ChatRecord>>, HandlerError> {
    match state.store.list(&session_id).await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            error!("Failed to list history for session {}: {}", session_id, e);
            Err(internal_error(e))
        }
    }
}

pub async fn feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<StatusCode, HandlerError> {
    match state
        .store
        .set_feedback(request.chat_id, &request.feedback)
        .await
    {
        Ok(()) => Ok(StatusCode::OK),
        Err(Error::ChatNotFound { chat_id }) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Chat record not found: {}", chat_id),
            }),
        )),
        Err(e) => {
            error!("Failed to save feedback: {}", e);
            Err(internal_error(e))
        }
    }
}
