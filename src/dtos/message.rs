//! Message DTOs - Data Transfer Objects per messaggi

use crate::entities::ChatMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub message_id: i32,
    pub sender_id: i32,
    pub recipient_id: Option<i32>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub from_support: bool,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<ChatMessage> for MessageDTO {
    fn from(value: ChatMessage) -> Self {
        Self {
            message_id: value.message_id,
            sender_id: value.sender_id,
            recipient_id: value.recipient_id,
            content: value.content,
            sent_at: value.sent_at,
            from_support: value.from_support,
            is_read: value.is_read,
            read_at: value.read_at,
        }
    }
}

/// DTO per creare un nuovo messaggio (senza message_id, stato lettura a false)
///
/// `sent_at` viene assegnato dal service al momento della persistenza ed è
/// autoritativo per l'ordinamento delle conversazioni.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct NewMessageDTO {
    pub sender_id: i32,
    pub recipient_id: Option<i32>,

    #[validate(length(min = 1, max = 5000, message = "Message content must be between 1 and 5000 characters"))]
    pub content: String,

    pub sent_at: DateTime<Utc>,
    pub from_support: bool,
}
