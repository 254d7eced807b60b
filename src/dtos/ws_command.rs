//! WebSocket Command DTOs - Comandi inviati dal client sul socket

use serde::{Deserialize, Serialize};

/// Tagged union per i comandi WebSocket in ingresso.
/// Serde serializza questo come:
/// { "type": "UserMessage", "data": { "content": "..." } }
/// oppure
/// { "type": "Typing", "data": { "target_id": 7 } }
/// etc.
///
/// Il mittente è sempre implicito: è l'identità verificata della connessione,
/// mai un campo del payload.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum WsCommand {
    /// Utente -> pool di assistenza (nessun destinatario esplicito)
    UserMessage { content: String },
    /// Assistenza -> utente specifico; richiede identità nel pool di assistenza
    SupportMessage { recipient_id: i32, content: String },
    MarkRead { message_id: i32 },
    MarkConversationRead { other_user_id: i32 },
    Typing { target_id: i32 },
    StopTyping { target_id: i32 },
}
