//! Account persistence.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use atelier_core::Email;

use super::{RepositoryError, conflict_on_unique, decode_doc};
use crate::models::User;
use crate::password;

/// Storage for customer accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up an account by email, ignoring case.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Store a new account.
    ///
    /// The password is hashed first unless it is already an argon2 PHC
    /// string, so storing the same user twice never double-hashes.
    async fn create(&self, user: User) -> Result<User, RepositoryError>;
}

/// Hash the user's password for storage if it is still plaintext.
pub(crate) fn with_hashed_password(mut user: User) -> Result<User, RepositoryError> {
    user.password =
        password::ensure_hashed(user.password).map_err(|_| RepositoryError::PasswordHash)?;
    Ok(user)
}

/// `PostgreSQL` account repository.
///
/// Email uniqueness is enforced by the `users_email_key` index.
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM users WHERE lower(email) = lower($1)")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;
        doc.map(decode_doc).transpose()
    }

    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let user = with_hashed_password(user)?;

        sqlx::query("INSERT INTO users (email, doc) VALUES ($1, $2)")
            .bind(user.email.as_str())
            .bind(Json(&user))
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "email already exists"))?;
        Ok(user)
    }
}
