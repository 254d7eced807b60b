//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};

/// Ruolo dell'utente nel gestionale.
///
/// L'insieme è chiuso: il confronto con stringhe di ruolo avviene solo al
/// confine sqlx, mai nella logica di routing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Manager,
    Client,
}

impl UserRole {
    /// Un ruolo fa parte del pool di assistenza?
    pub fn is_support(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Manager)
    }
}
