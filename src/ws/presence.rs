//! PresenceRegistry - Registro concorrente delle connessioni live
//!
//! Mappa bidirezionale utente <-> connessioni aperte, costruita e posseduta
//! da `AppState` e iniettata negli handler: mai un singleton di processo. Le
//! operazioni sono puramente in-memory e non bloccano mai su I/O; una lettura
//! concorrente a register/unregister osserva lo stato prima o dopo la
//! mutazione, mai uno parziale (lock per shard di DashMap).

use crate::dtos::WsEvent;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

/// Handle opaco di una singola connessione, allocato dal registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

struct PresenceEntry {
    id: ConnectionId,
    tx: UnboundedSender<WsEvent>,
}

pub struct PresenceRegistry {
    /// Connessioni aperte per utente: un utente può averne zero, una o più
    /// (dispositivi/tab multipli)
    connections: DashMap<i32, Vec<PresenceEntry>>,

    /// Mappa inversa connessione -> utente, per lo sgancio puntuale
    owners: DashMap<u64, i32>,

    next_connection_id: AtomicU64,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        PresenceRegistry {
            connections: DashMap::new(),
            owners: DashMap::new(),
            next_connection_id: AtomicU64::new(1),
        }
    }

    /// Registra una nuova connessione per l'utente e ritorna il suo handle.
    /// Una registrazione aggiunge una voce, non sostituisce le esistenti.
    #[instrument(skip(self, tx), fields(user_id))]
    pub fn register(&self, user_id: i32, tx: UnboundedSender<WsEvent>) -> ConnectionId {
        let id = ConnectionId(self.next_connection_id.fetch_add(1, Ordering::Relaxed));
        self.owners.insert(id.0, user_id);
        self.connections
            .entry(user_id)
            .or_default()
            .push(PresenceEntry { id, tx });
        info!("Connection registered, user now online");
        id
    }

    /// Rimuove la connessione; ritorna l'utente proprietario e se era la sua
    /// ultima connessione (utente ora completamente offline). `None` se
    /// l'handle non è (più) registrato.
    #[instrument(skip(self))]
    pub fn unregister(&self, conn_id: ConnectionId) -> Option<(i32, bool)> {
        let (_, user_id) = self.owners.remove(&conn_id.0)?;

        let mut was_last = false;
        if let Some(mut entries) = self.connections.get_mut(&user_id) {
            entries.retain(|e| e.id != conn_id);
            was_last = entries.is_empty();
        }
        if was_last {
            // rimozione condizionata: una register concorrente che ha appena
            // aggiunto una voce vince e la chiave resta
            self.connections
                .remove_if(&user_id, |_, entries| entries.is_empty());
        }

        info!(user_id, was_last, "Connection unregistered");
        Some((user_id, was_last))
    }

    pub fn is_online(&self, user_id: &i32) -> bool {
        self.connections
            .get(user_id)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    /// Numero di utenti con almeno una connessione aperta
    pub fn online_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .count()
    }

    /// Numero di connessioni aperte per l'utente
    pub fn connection_count(&self, user_id: &i32) -> usize {
        self.connections
            .get(user_id)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    /// Handle delle connessioni aperte dell'utente (vuoto se offline)
    pub fn connections_for(&self, user_id: &i32) -> Vec<ConnectionId> {
        self.connections
            .get(user_id)
            .map(|entries| entries.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    /// Consegna l'evento a tutte le connessioni dell'utente, clonandolo per
    /// ciascuna. Best effort: un canale chiuso viene solo loggato. Ritorna il
    /// numero di consegne riuscite.
    #[instrument(skip(self, event), fields(user_id))]
    pub fn send_to_user(&self, user_id: &i32, event: WsEvent) -> usize {
        let Some(entries) = self.connections.get(user_id) else {
            return 0;
        };

        let mut sent = 0;
        for entry in entries.iter() {
            if entry.tx.send(event.clone()).is_ok() {
                sent += 1;
            } else {
                warn!(user_id, "Connection channel closed, event dropped");
            }
        }
        sent
    }

    /// Consegna l'evento a ogni connessione registrata (fire-and-forget)
    #[instrument(skip(self, event))]
    pub fn broadcast_all(&self, event: WsEvent) -> usize {
        let mut sent = 0;
        for entry in self.connections.iter() {
            for conn in entry.value().iter() {
                if conn.tx.send(event.clone()).is_ok() {
                    sent += 1;
                }
            }
        }
        sent
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
