//! Customer accounts.

use serde::{Deserialize, Serialize};

use atelier_core::Email;

/// A stored account.
///
/// `password` holds an argon2 PHC string once persisted. `Debug` is
/// implemented manually to keep it out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub full_name: String,
    pub email: Email,
    pub phone_number: String,
    pub password: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// An account as returned to clients, without the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub full_name: String,
    pub email: Email,
    pub phone_number: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name,
            email: user.email,
            phone_number: user.phone_number,
        }
    }
}

/// Body of `POST /auth/register`.
///
/// The email is kept raw so the auth service can reject it with a client
/// error instead of a body-rejection.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    pub password: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_public_user_drops_password() {
        let user = User {
            full_name: "Admin User".to_string(),
            email: Email::parse("admin@example.com").unwrap(),
            phone_number: "+1234567890".to_string(),
            password: "$argon2id$v=19$stub".to_string(),
        };

        assert!(!format!("{user:?}").contains("argon2"));

        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["fullName"], "Admin User");
    }
}
