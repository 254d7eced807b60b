//! Message entity - Entità messaggio di assistenza

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Messaggio persistito della chat di assistenza.
///
/// `recipient_id` a `None` indica un messaggio diretto all'intero pool di
/// assistenza e non a un singolo utente. `sender_id` può essere l'identità di
/// sistema riservata (vedi `Config::system_user_id`).
///
/// Il messaggio è immutabile dopo la creazione, con l'unica eccezione dello
/// stato di lettura: `is_read` passa da false a true una sola volta e
/// `read_at` viene valorizzato nello stesso istante.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ChatMessage {
    pub message_id: i32,
    pub sender_id: i32,
    pub recipient_id: Option<i32>,
    pub content: String,
    // il server si aspetta una stringa litterale iso8601 che viene parsata in oggetto DateTime di tipo UTC
    pub sent_at: DateTime<Utc>,
    pub from_support: bool,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}
