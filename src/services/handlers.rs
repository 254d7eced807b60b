//! Chat handlers - Endpoint REST di ripiego per client non connessi
//!
//! La consegna live sul WebSocket è best effort: questi endpoint permettono a
//! un client disconnesso di riallinearsi interrogando direttamente il
//! ChatService, senza alcun coinvolgimento del registro presenze.

use crate::core::{AppError, AppState, Identity};
use crate::dtos::{MessageDTO, RecentQuery, UnreadCountDTO};
use crate::repositories::{MessageStore, UserDirectory};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Default per /chat/recent quando il client non specifica un limite
const DEFAULT_RECENT_LIMIT: i64 = 50;

#[instrument(skip(state), fields(user_id = %identity.0))]
pub async fn get_conversation<S: MessageStore, D: UserDirectory>(
    State(state): State<Arc<AppState<S, D>>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    debug!("Fetching own conversation");
    // Al primo contatto questa chiamata inserisce il benvenuto di sistema,
    // vedi ChatService::conversation
    let messages = state.chat.conversation(identity.0).await?;
    info!("Retrieved {} messages", messages.len());
    Ok(Json(messages.into_iter().map(MessageDTO::from).collect()))
}

#[instrument(skip(state), fields(user_id = %identity.0, other_user_id = %other_user_id))]
pub async fn get_conversation_with<S: MessageStore, D: UserDirectory>(
    State(state): State<Arc<AppState<S, D>>>,
    Path(other_user_id): Path<i32>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    debug!("Fetching pair conversation");
    let messages = state
        .chat
        .conversation_between(identity.0, other_user_id)
        .await?;
    Ok(Json(messages.into_iter().map(MessageDTO::from).collect()))
}

#[instrument(skip(state), fields(user_id = %identity.0))]
pub async fn get_unread<S: MessageStore, D: UserDirectory>(
    State(state): State<Arc<AppState<S, D>>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    let messages = state.chat.unread(identity.0).await?;
    Ok(Json(messages.into_iter().map(MessageDTO::from).collect()))
}

#[instrument(skip(state), fields(user_id = %identity.0))]
pub async fn get_unread_count<S: MessageStore, D: UserDirectory>(
    State(state): State<Arc<AppState<S, D>>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UnreadCountDTO>, AppError> {
    let count = state.chat.unread_count(identity.0).await?;
    Ok(Json(UnreadCountDTO { count }))
}

#[instrument(skip(state), fields(user_id = %identity.0))]
pub async fn get_recent<S: MessageStore, D: UserDirectory>(
    State(state): State<Arc<AppState<S, D>>>,
    Query(params): Query<RecentQuery>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let messages = state.chat.recent(identity.0, limit).await?;
    Ok(Json(messages.into_iter().map(MessageDTO::from).collect()))
}

/// Marca un singolo messaggio come letto. Id assente o messaggio già letto
/// => no-op, sempre 204: i client possono ritentare senza gestire errori.
#[instrument(skip(state), fields(message_id = %message_id))]
pub async fn mark_message_read<S: MessageStore, D: UserDirectory>(
    State(state): State<Arc<AppState<S, D>>>,
    Path(message_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    state.chat.mark_read(message_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state), fields(user_id = %identity.0, other_user_id = %other_user_id))]
pub async fn mark_conversation_read<S: MessageStore, D: UserDirectory>(
    State(state): State<Arc<AppState<S, D>>>,
    Path(other_user_id): Path<i32>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UnreadCountDTO>, AppError> {
    let marked = state
        .chat
        .mark_conversation_read(identity.0, other_user_id)
        .await?;
    Ok(Json(UnreadCountDTO {
        count: marked.len(),
    }))
}
