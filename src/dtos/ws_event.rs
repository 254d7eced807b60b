//! WebSocket Event DTOs - Eventi push inviati alle connessioni

use crate::dtos::MessageDTO;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enum per gestire gli eventi WebSocket in modo type-safe
/// Tagged union per eventi WebSocket
/// Serde serializza questo come:
/// { "type": "NewMessage", "data": { ... } }
/// oppure
/// { "type": "UserOffline", "data": { "user_id": 7 } }
/// etc.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum WsEvent {
    NewMessage(MessageDTO),
    MessageRead {
        message_id: i32,
        read_at: DateTime<Utc>,
    },
    ConversationRead {
        reader_id: i32,
    },
    Typing {
        user_id: i32,
    },
    StoppedTyping {
        user_id: i32,
    },
    /// Notifica one-way al pool di assistenza: un utente si è connesso.
    /// Consegna best effort, mai persistita.
    UserJoined {
        user_id: i32,
        username: String,
    },
    UserOffline {
        user_id: i32,
    },
    Error {
        code: u16,
        message: String,
    },
}
