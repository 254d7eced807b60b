#![allow(dead_code)]

//! Utilities condivise dai test di integrazione: double in-memory dei due
//! gateway e costruttori di stato. Nessun database richiesto.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;
use support_chat::core::{AppState, ChatConfig};
use support_chat::dtos::NewMessageDTO;
use support_chat::entities::{ChatMessage, UserAccount, UserRole};
use support_chat::repositories::{MessageStore, UserDirectory};

/// Identità di sistema usata nei test: fuori dallo spazio id dell'anagrafica
pub const SYSTEM_ID: i32 = 0;

/// Store messaggi in-memory. `append_count` conta le scritture effettive,
/// per verificare le proprietà di idempotenza del primo contatto.
pub struct MemoryMessageStore {
    messages: Mutex<Vec<ChatMessage>>,
    next_id: AtomicI32,
    append_count: AtomicUsize,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
            append_count: AtomicUsize::new(0),
        }
    }

    pub fn append_count(&self) -> usize {
        self.append_count.load(Ordering::SeqCst)
    }

    pub fn all(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }

    fn sorted_asc(mut messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
        messages.sort_by_key(|m| (m.sent_at, m.message_id));
        messages
    }

    fn in_pair(m: &ChatMessage, a: i32, b: i32) -> bool {
        (m.sender_id == a && (m.recipient_id == Some(b) || m.recipient_id.is_none()))
            || (m.sender_id == b && (m.recipient_id == Some(a) || m.recipient_id.is_none()))
    }
}

impl MessageStore for MemoryMessageStore {
    async fn append(&self, data: &NewMessageDTO) -> Result<ChatMessage, sqlx::Error> {
        let message = ChatMessage {
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            sender_id: data.sender_id,
            recipient_id: data.recipient_id,
            content: data.content.clone(),
            sent_at: data.sent_at,
            from_support: data.from_support,
            is_read: false,
            read_at: None,
        };
        self.messages.lock().unwrap().push(message.clone());
        self.append_count.fetch_add(1, Ordering::SeqCst);
        Ok(message)
    }

    async fn find_by_participant(&self, user_id: &i32) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let messages = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.sender_id == *user_id || m.recipient_id == Some(*user_id))
            .cloned()
            .collect();
        Ok(Self::sorted_asc(messages))
    }

    async fn find_by_pair(&self, user_a: &i32, user_b: &i32) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let messages = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| Self::in_pair(m, *user_a, *user_b))
            .cloned()
            .collect();
        Ok(Self::sorted_asc(messages))
    }

    async fn find_unread(&self, user_id: &i32) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let messages = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.recipient_id == Some(*user_id) && !m.is_read)
            .cloned()
            .collect();
        Ok(Self::sorted_asc(messages))
    }

    async fn find_recent(&self, user_id: &i32, limit: i64) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let mut messages = self.find_by_participant(user_id).await?;
        messages.reverse();
        messages.truncate(limit.max(0) as usize);
        Ok(messages)
    }

    async fn find_by_id(&self, id: &i32) -> Result<Option<ChatMessage>, sqlx::Error> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.message_id == *id)
            .cloned())
    }

    async fn mark_read(&self, id: &i32, read_at: &DateTime<Utc>) -> Result<(), sqlx::Error> {
        let mut messages = self.messages.lock().unwrap();
        if let Some(message) = messages.iter_mut().find(|m| m.message_id == *id) {
            if !message.is_read {
                message.is_read = true;
                message.read_at = Some(*read_at);
            }
        }
        Ok(())
    }
}

/// Directory utenti in-memory
pub struct MemoryDirectory {
    users: HashMap<i32, UserAccount>,
}

impl MemoryDirectory {
    pub fn new(users: Vec<UserAccount>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.user_id, u)).collect(),
        }
    }
}

impl UserDirectory for MemoryDirectory {
    async fn find_by_id(&self, user_id: &i32) -> Result<Option<UserAccount>, sqlx::Error> {
        Ok(self.users.get(user_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<UserAccount>, sqlx::Error> {
        Ok(self.users.values().cloned().collect())
    }
}

pub fn account(user_id: i32, username: &str, role: UserRole) -> UserAccount {
    UserAccount {
        user_id,
        username: username.to_string(),
        role,
    }
}

pub fn test_config() -> ChatConfig {
    ChatConfig {
        system_user_id: SYSTEM_ID,
        welcome_message: "Benvenuto! Un operatore ti risponderà il prima possibile.".to_string(),
    }
}

pub type TestState = AppState<Arc<MemoryMessageStore>, MemoryDirectory>;

/// Stato con store condiviso: il chiamante tiene un clone dell'Arc per
/// ispezionare le scritture
pub fn create_test_state(
    store: Arc<MemoryMessageStore>,
    users: Vec<UserAccount>,
) -> Arc<TestState> {
    Arc::new(AppState::with_gateways(
        store,
        MemoryDirectory::new(users),
        test_config(),
    ))
}

/// Un cast tipico dai fixture dei test: due operatori e tre clienti
pub fn default_cast() -> Vec<UserAccount> {
    vec![
        account(1, "alice", UserRole::Admin),
        account(2, "bob", UserRole::Manager),
        account(3, "carla", UserRole::Client),
        account(7, "dario", UserRole::Client),
        account(8, "elena", UserRole::Client),
    ]
}
