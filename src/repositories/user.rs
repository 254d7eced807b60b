//! UserRepository - Gateway sqlx/MySQL verso l'anagrafica utenti

use super::UserDirectory;
use crate::entities::UserAccount;
use sqlx::{Error, MySqlPool};

// USER REPO
pub struct UserRepository {
    connection_pool: MySqlPool,
}

impl UserRepository {
    pub fn new(connection_pool: MySqlPool) -> UserRepository {
        Self { connection_pool }
    }
}

impl UserDirectory for UserRepository {
    async fn find_by_id(&self, user_id: &i32) -> Result<Option<UserAccount>, Error> {
        let user = sqlx::query_as::<_, UserAccount>(
            "SELECT user_id, username, role FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    async fn list_all(&self) -> Result<Vec<UserAccount>, Error> {
        let users =
            sqlx::query_as::<_, UserAccount>("SELECT user_id, username, role FROM users")
                .fetch_all(&self.connection_pool)
                .await?;

        Ok(users)
    }
}
