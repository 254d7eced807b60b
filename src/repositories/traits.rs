//! Gateway traits
//!
//! This module defines the interfaces towards the message store and the user
//! directory. Both are external collaborators: the chat core never assumes
//! anything about their schema beyond these operations.
//!
//! The methods return `impl Future + Send` so that services generic over the
//! gateways can still be driven from spawned connection tasks.

use crate::dtos::NewMessageDTO;
use crate::entities::{ChatMessage, UserAccount};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Append-only store of chat messages with point lookups.
///
/// # Contract
/// * `append` assigns the id and returns the stored message.
/// * Sequences are ordered by `sent_at` ascending, except `find_recent`
///   which returns the newest `limit` messages descending.
/// * `mark_read` only transitions `is_read` false→true; marking an already
///   read message is a no-op.
pub trait MessageStore: Send + Sync + 'static {
    /// Persists a new message and returns it with the assigned id
    fn append(
        &self,
        data: &NewMessageDTO,
    ) -> impl Future<Output = Result<ChatMessage, sqlx::Error>> + Send;

    /// All messages where the user is sender or recipient
    fn find_by_participant(
        &self,
        user_id: &i32,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;

    /// Messages exchanged between exactly that pair, including pool
    /// broadcasts sent by either party
    fn find_by_pair(
        &self,
        user_a: &i32,
        user_b: &i32,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;

    /// Unread messages addressed to the user
    fn find_unread(
        &self,
        user_id: &i32,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;

    /// Most recent `limit` messages involving the user, newest first
    fn find_recent(
        &self,
        user_id: &i32,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;

    /// Point lookup by message id
    fn find_by_id(
        &self,
        id: &i32,
    ) -> impl Future<Output = Result<Option<ChatMessage>, sqlx::Error>> + Send;

    /// Transitions the message to read at the given instant (false→true only)
    fn mark_read(
        &self,
        id: &i32,
        read_at: &DateTime<Utc>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
}

// Delega per gateway condivisi dietro Arc (usata dai test per tenere un
// riferimento allo store iniettato nello stato)
impl<T: MessageStore> MessageStore for std::sync::Arc<T> {
    fn append(
        &self,
        data: &NewMessageDTO,
    ) -> impl Future<Output = Result<ChatMessage, sqlx::Error>> + Send {
        T::append(self, data)
    }

    fn find_by_participant(
        &self,
        user_id: &i32,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send {
        T::find_by_participant(self, user_id)
    }

    fn find_by_pair(
        &self,
        user_a: &i32,
        user_b: &i32,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send {
        T::find_by_pair(self, user_a, user_b)
    }

    fn find_unread(
        &self,
        user_id: &i32,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send {
        T::find_unread(self, user_id)
    }

    fn find_recent(
        &self,
        user_id: &i32,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send {
        T::find_recent(self, user_id, limit)
    }

    fn find_by_id(
        &self,
        id: &i32,
    ) -> impl Future<Output = Result<Option<ChatMessage>, sqlx::Error>> + Send {
        T::find_by_id(self, id)
    }

    fn mark_read(
        &self,
        id: &i32,
        read_at: &DateTime<Utc>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send {
        T::mark_read(self, id, read_at)
    }
}

/// Read-only lookup of user records from the directory.
pub trait UserDirectory: Send + Sync + 'static {
    /// Point lookup by user id
    fn find_by_id(
        &self,
        user_id: &i32,
    ) -> impl Future<Output = Result<Option<UserAccount>, sqlx::Error>> + Send;

    /// Every user record; the support pool is recomputed from this on demand
    fn list_all(&self) -> impl Future<Output = Result<Vec<UserAccount>, sqlx::Error>> + Send;
}
