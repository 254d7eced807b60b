//! Repositories module - Gateway verso persistenza e anagrafica
//!
//! Il sottosistema chat non possiede né lo schema messaggi né l'anagrafica
//! utenti: vi accede attraverso i due trait di questo modulo. Le
//! implementazioni sqlx/MySQL stanno nei sotto-moduli; i test montano double
//! in-memory sugli stessi trait.

pub mod message;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{MessageStore, UserDirectory};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use message::MessageRepository;
pub use user::UserRepository;
