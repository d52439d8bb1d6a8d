use sqlx::{FromRow, MySqlPool};

use crate::error::AppError;
use crate::model::user::{User, split_roles};

#[derive(FromRow)]
struct UserSql {
    id: u64,
    name: String,
    email: String,
    password_hash: String,
    roles: String,
}

impl From<UserSql> for User {
    fn from(row: UserSql) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            roles: split_roles(&row.roles),
        }
    }
}

/// Read-only view of the employee directory used by login.
#[derive(Clone)]
pub struct UserDirectory {
    pool: MySqlPool,
}

impl UserDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Looks a user up by an already normalized (trimmed, lower-cased) email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserSql>(
            r#"
            SELECT id, name, email, password_hash, roles
            FROM users
            WHERE email = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}
