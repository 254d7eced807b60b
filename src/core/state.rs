//! Application State - Stato globale dell'applicazione
//!
//! Contiene il service di conversazione e il registro presenze condiviso.
//! Lo stato è costruito esplicitamente dal processo ospite e passato per
//! `Arc` a ogni handler: nessuna mappa di connessioni globale nascosta, così
//! i test possono montare gateway in-memory al posto di MySQL.

use crate::core::config::ChatConfig;
use crate::repositories::{MessageRepository, MessageStore, UserDirectory, UserRepository};
use crate::services::ChatService;
use crate::ws::presence::PresenceRegistry;
use sqlx::MySqlPool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState<S = MessageRepository, D = UserRepository> {
    /// Business logic di conversazione sopra i due gateway
    pub chat: ChatService<S, D>,

    /// Mappa concorrente delle connessioni live per utente
    pub presence: PresenceRegistry,
}

impl AppState {
    /// Crea lo stato di produzione: gateway sqlx sul pool MySQL condiviso.
    pub fn new(pool: MySqlPool, config: ChatConfig) -> Self {
        Self::with_gateways(
            MessageRepository::new(pool.clone()),
            UserRepository::new(pool),
            config,
        )
    }
}

impl<S: MessageStore, D: UserDirectory> AppState<S, D> {
    /// Costruttore generico sui gateway: usato dai test per iniettare double
    /// in-memory al posto delle implementazioni sqlx.
    pub fn with_gateways(store: S, directory: D, config: ChatConfig) -> Self {
        Self {
            chat: ChatService::new(store, directory, config),
            presence: PresenceRegistry::new(),
        }
    }
}
