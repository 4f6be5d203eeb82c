//! Authentication service.
//!
//! Password registration and login. Password hashing happens in the user
//! repository so records that are already hashed are stored as-is.

mod error;

pub use error::AuthError;

use tracing::instrument;

use atelier_core::Email;

use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewUser, PublicUser, User};
use crate::password::verify_password;

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the store rejects the email
    /// as taken.
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    pub async fn register(&self, new_user: NewUser) -> Result<PublicUser, AuthError> {
        let email = Email::parse(&new_user.email)?;

        let user = self
            .users
            .create(User {
                full_name: new_user.full_name,
                email,
                phone_number: new_user.phone_number,
                password: new_user.password,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(email = %user.email, "user registered");
        Ok(user.into())
    }

    /// Check a login attempt.
    ///
    /// Returns the account without its password when the email is known and
    /// the password matches, `None` otherwise. Unknown emails skip the hash
    /// comparison.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    #[instrument(skip(self, password))]
    pub async fn validate_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<PublicUser>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };

        let Some(user) = self.users.find_by_email(&email).await? else {
            return Ok(None);
        };

        if verify_password(password, &user.password) {
            Ok(Some(user.into()))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryUserRepository;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            full_name: "Test Buyer".to_owned(),
            email: email.to_owned(),
            phone_number: "+380501112233".to_owned(),
            password: "correct horse".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let repo = InMemoryUserRepository::new();
        let auth = AuthService::new(&repo);

        let registered = auth.register(new_user("buyer@example.com")).await.unwrap();
        assert_eq!(registered.email.as_str(), "buyer@example.com");

        let found = auth
            .validate_user("buyer@example.com", "correct horse")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, registered);
    }

    #[tokio::test]
    async fn test_wrong_password_is_none() {
        let repo = InMemoryUserRepository::new();
        let auth = AuthService::new(&repo);
        auth.register(new_user("buyer@example.com")).await.unwrap();

        let result = auth
            .validate_user("buyer@example.com", "battery staple")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unknown_email_is_none() {
        let repo = InMemoryUserRepository::seeded();
        let auth = AuthService::new(&repo);

        assert!(
            auth.validate_user("nobody@example.com", "password123")
                .await
                .unwrap()
                .is_none()
        );
        assert!(auth.validate_user("not-an-email", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seeded_admin_can_log_in() {
        let repo = InMemoryUserRepository::seeded();
        let auth = AuthService::new(&repo);

        let admin = auth
            .validate_user("admin@example.com", "password123")
            .await
            .unwrap();
        assert!(admin.is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email() {
        let repo = InMemoryUserRepository::new();
        let auth = AuthService::new(&repo);

        let result = auth.register(new_user("no-at-sign")).await;
        assert!(matches!(result, Err(AuthError::InvalidEmail(_))));
    }
}
