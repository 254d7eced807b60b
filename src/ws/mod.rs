//! WebSocket Module - Hub realtime della chat di assistenza
//!
//! Questo modulo gestisce le connessioni WebSocket per la comunicazione in
//! tempo reale tra client e server. Include:
//! - Gestione upgrade HTTP -> WebSocket
//! - Gestione connessioni (split sender/receiver, un task di lettura e uno di
//!   scrittura per connessione)
//! - Handler per i comandi del client (messaggi, ricevute di lettura, typing)
//! - Registro presenze e utility di fan-out
//!
//! Un'unica istanza di stato serve tutte le connessioni.

pub mod connection;
pub mod event_handlers;
pub mod presence;
pub mod utils;

// Re-exports pubblici
pub use connection::handle_socket;
pub use presence::{ConnectionId, PresenceRegistry};

use crate::core::{AppState, Identity};
use crate::repositories::{MessageStore, UserDirectory};
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Intervallo minimo tra due comandi dello stesso client
pub const RATE_LIMITER_MILLIS: u64 = 50;
/// Una connessione muta oltre questa soglia viene chiusa
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;

/// Entry point per gestire richieste di upgrade WebSocket
/// Operazioni:
/// 1. Estrarre l'identità verificata inserita dall'identity middleware
/// 2. Eseguire upgrade HTTP -> WebSocket
/// 3. Passare la connessione ad handle_socket
pub async fn ws_handler<S: MessageStore, D: UserDirectory>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S, D>>>,
    Extension(identity): Extension<Identity>, // popolata dall'identity middleware
) -> Response {
    // Gestisce automaticamente l'upgrade a WebSocket.
    // Se l'upgrade fallisce, ritorna un errore; altrimenti restituisce la nuova connessione al client.
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity.0))
}
