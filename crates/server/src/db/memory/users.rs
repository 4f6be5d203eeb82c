//! In-memory account store.
//!
//! Passwords are hashed on insert, as in `PostgreSQL`. Email uniqueness is
//! not enforced.

use std::sync::LazyLock;

use async_trait::async_trait;
use tokio::sync::RwLock;

use atelier_core::Email;

use super::fixtures;
use crate::db::users::with_hashed_password;
use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Fixture accounts, hashed once per process.
static SEEDED_USERS: LazyLock<Vec<User>> = LazyLock::new(|| {
    fixtures::users()
        .into_iter()
        .filter_map(|user| {
            with_hashed_password(user)
                .inspect_err(|e| tracing::error!(error = %e, "failed to hash fixture user"))
                .ok()
        })
        .collect()
});

/// In-memory account store. Emails are not unique here.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the fixture administrator.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            users: RwLock::new(SEEDED_USERS.clone()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(email.as_str()))
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let user = with_hashed_password(user)?;
        self.users.write().await.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::password::{ARGON2_PREFIX, verify_password};

    #[tokio::test]
    async fn test_seeded_admin_password_is_hashed() {
        let repo = InMemoryUserRepository::seeded();
        let admin = repo
            .find_by_email(&Email::parse("ADMIN@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();

        assert!(admin.password.starts_with(ARGON2_PREFIX));
        assert!(verify_password("password123", &admin.password));
    }

    #[tokio::test]
    async fn test_create_does_not_rehash() {
        let repo = InMemoryUserRepository::new();
        let stored = SEEDED_USERS[0].clone();

        let created = repo.create(stored.clone()).await.unwrap();
        assert_eq!(created.password, stored.password);
    }

    #[tokio::test]
    async fn test_create_allows_duplicate_emails() {
        let repo = InMemoryUserRepository::seeded();
        let duplicate = SEEDED_USERS[0].clone();
        assert!(repo.create(duplicate).await.is_ok());
    }
}
