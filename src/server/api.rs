use axum::{
    extract::{ rejection::JsonRejection, State },
    http::StatusCode,
    response::{ Html, IntoResponse, Response },
    routing::{ get, post },
    Json,
    Router,
};
use log::{ debug, error, info };
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{ Any, CorsLayer };
use uuid::Uuid;

use super::page::render_index;
use crate::agent::{ AgentError, PersonaAgent };
use crate::history::HistoryStore;
use crate::models::chat::{ ChatMessage, ChatReply, ChatRequest };

#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<PersonaAgent>,
    pub history: Arc<dyn HistoryStore>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rejected(#[from] JsonRejection),
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Body rejections and generation failures both surface as 500.
        let body = match &self {
            ApiError::Rejected(rejection) => rejection.body_text(),
            ApiError::Agent(e) => e.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error: body })).into_response()
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/chat", post(chat_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.agent.persona()))
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        error!("Unreadable /chat body ({}): {}", rejection.status(), rejection.body_text());
        rejection
    })?;

    // Only sessions the client asked for are stored.
    let session_id = match req.session_id.filter(|id| !id.trim().is_empty()) {
        Some(id) => Some(id),
        None if req.new_session => Some(Uuid::new_v4().to_string()),
        None => None,
    };

    let mut conversation = match &session_id {
        Some(id) =>
            match state.history.load(id).await {
                Some(existing) => existing,
                None => {
                    info!("Starting session {}", id);
                    state.agent.new_conversation(id.clone())
                }
            }
        None => state.agent.new_conversation("stateless"),
    };

    debug!("Conversation {} user message: {} chars", conversation.id, req.message.len());
    conversation.push(ChatMessage::user(req.message));

    let result = state.agent.respond(&conversation).await;
    let reply = match result {
        Ok(reply) => reply,
        Err(e) => {
            error!("Generation failed for conversation {}: {}", conversation.id, e);
            if session_id.is_some() {
                state.history.save(conversation).await;
            }
            return Err(e.into());
        }
    };

    if session_id.is_some() {
        conversation.push(ChatMessage::assistant(reply.clone()));
        state.history.save(conversation).await;
    }

    Ok(Json(ChatReply { reply, session_id }))
}
