//! Services module - Business logic e handler HTTP
//!
//! `chat_service` contiene le regole di instradamento indipendenti dal
//! trasporto; `handlers` espone la superficie REST di polling che vi si
//! appoggia.

pub mod chat_service;
pub mod handlers;

// Re-exports per facilitare l'import
pub use chat_service::ChatService;
pub use handlers::{
    get_conversation, get_conversation_with, get_recent, get_unread, get_unread_count,
    mark_conversation_read, mark_message_read,
};

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
