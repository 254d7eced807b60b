//! User entity - Entità utente (record anagrafico)

use super::enums::UserRole;
use serde::{Deserialize, Serialize};

/// Record anagrafico esposto dalla directory utenti.
///
/// L'anagrafica è gestita altrove (CRUD del gestionale); qui serve solo per
/// validare mittenti/destinatari e classificare il ruolo.
#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct UserAccount {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
}
