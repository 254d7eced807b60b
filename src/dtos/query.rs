//! Query DTOs - Parametri query string e risposte di conteggio

use serde::{Deserialize, Serialize};

/// Query params per /chat/recent?limit=N
#[derive(Deserialize, Debug)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Risposta di /chat/unread/count
#[derive(Serialize, Deserialize, Debug)]
pub struct UnreadCountDTO {
    pub count: usize,
}
