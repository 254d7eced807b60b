//! Support chat server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, ChatConfig, Config, Identity};
pub use crate::services::root;

use crate::core::identity_middleware;
use crate::repositories::{MessageStore, UserDirectory};
use crate::ws::ws_handler;
use axum::{Router, middleware, routing::{any, get, post}};
use std::sync::Arc;

/// Crea il router principale dell'applicazione
///
/// Generico sui gateway così i test montano lo stesso router sopra double
/// in-memory. Tutte le route tranne la root richiedono l'identità verificata.
pub fn create_router<S: MessageStore, D: UserDirectory>(state: Arc<AppState<S, D>>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/chat", configure_chat_routes::<S, D>())
        .route(
            "/ws",
            any(ws_handler::<S, D>).layer(middleware::from_fn(identity_middleware)),
        )
        .with_state(state)
}

/// Configura le routes REST di ripiego per i client non connessi
fn configure_chat_routes<S: MessageStore, D: UserDirectory>() -> Router<Arc<AppState<S, D>>> {
    use crate::services::*;

    Router::new()
        .route("/conversation", get(get_conversation::<S, D>))
        .route("/conversation/{user_id}", get(get_conversation_with::<S, D>))
        .route(
            "/conversation/{user_id}/read",
            post(mark_conversation_read::<S, D>),
        )
        .route("/unread", get(get_unread::<S, D>))
        .route("/unread/count", get(get_unread_count::<S, D>))
        .route("/recent", get(get_recent::<S, D>))
        .route("/messages/{message_id}/read", post(mark_message_read::<S, D>))
        .layer(middleware::from_fn(identity_middleware))
}
