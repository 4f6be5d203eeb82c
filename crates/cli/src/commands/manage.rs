//! Account and promo management commands.
//!
//! # Usage
//!
//! ```bash
//! atelier-cli user create -e jane@example.com -n "Jane Doe" -p hunter22
//! atelier-cli promo create SPRING25 --discount 25
//! ```

use atelier_core::PromoCode;
use atelier_server::db::Repositories;
use atelier_server::models::{NewUser, PromoItem};
use atelier_server::services::{AuthError, AuthService, PromoError, PromoService};
use rust_decimal::Decimal;

use super::{CommandError, connect};

/// Errors that can occur during management operations.
#[derive(Debug, thiserror::Error)]
pub enum ManageError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Promo(#[from] PromoError),

    /// Promo discount outside 0..=100.
    #[error("Invalid discount: {0}. Expected a percentage between 0 and 100")]
    InvalidDiscount(Decimal),
}

/// Register a customer account.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
    phone: &str,
) -> Result<(), ManageError> {
    let pool = connect().await?;
    let repos = Repositories::postgres(&pool);

    tracing::info!("Creating account: {}", email);
    let user = AuthService::new(repos.users.as_ref())
        .register(NewUser {
            full_name: name.to_owned(),
            email: email.to_owned(),
            phone_number: phone.to_owned(),
            password: password.to_owned(),
        })
        .await?;

    tracing::info!("Account created: {} ({})", user.email, user.full_name);
    Ok(())
}

/// Create a promo code.
pub async fn create_promo(name: &str, discount: Decimal) -> Result<(), ManageError> {
    if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
        return Err(ManageError::InvalidDiscount(discount));
    }

    let pool = connect().await?;
    let repos = Repositories::postgres(&pool);

    let promo = PromoService::new(repos.promos.as_ref())
        .create(PromoItem {
            name: PromoCode::new(name),
            discount,
        })
        .await?;

    tracing::info!("Promo created: {} (-{}%)", promo.name, promo.discount);
    Ok(())
}
