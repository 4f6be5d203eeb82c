//! Seed the database with the demo catalog and accounts.
//!
//! Loads the same fixtures the in-memory stores start from, so a fresh
//! `PostgreSQL` deployment behaves like `USE_MOCK_REPOSITORIES=true`.
//! Records that already exist are left untouched, so the command can be
//! run repeatedly.

use atelier_server::db::memory::fixtures;
use atelier_server::db::{Repositories, RepositoryError};

use super::{CommandError, connect};

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Counts for one seeded collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedCount {
    pub inserted: usize,
    pub skipped: usize,
}

impl SeedCount {
    /// Record the outcome of one insert, treating conflicts as skips.
    fn record<T>(&mut self, result: Result<T, RepositoryError>) -> Result<(), RepositoryError> {
        match result {
            Ok(_) => self.inserted += 1,
            Err(RepositoryError::Conflict(_)) => self.skipped += 1,
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

/// Insert every fixture into `PostgreSQL`.
pub async fn run() -> Result<(), SeedError> {
    let pool = connect().await?;
    let repos = Repositories::postgres(&pool);

    let mut items = SeedCount::default();
    for item in fixtures::shop_items() {
        items.record(repos.shop_items.create(item).await)?;
    }
    tracing::info!(inserted = items.inserted, skipped = items.skipped, "shop items");

    let mut orders = SeedCount::default();
    for order in fixtures::orders() {
        orders.record(repos.orders.create(order).await)?;
    }
    tracing::info!(inserted = orders.inserted, skipped = orders.skipped, "orders");

    // Promo names and certificate codes carry no unique constraint.
    let mut promos = SeedCount::default();
    for promo in fixtures::promos() {
        if repos.promos.find_by_code(&promo.name).await?.is_some() {
            promos.skipped += 1;
            continue;
        }
        promos.record(repos.promos.create(promo).await)?;
    }
    tracing::info!(inserted = promos.inserted, skipped = promos.skipped, "promos");

    let mut certificates = SeedCount::default();
    for certificate in fixtures::certificates() {
        if repos
            .certificates
            .find_by_code(&certificate.code)
            .await?
            .is_some()
        {
            certificates.skipped += 1;
            continue;
        }
        certificates.record(repos.certificates.create(certificate).await)?;
    }
    tracing::info!(
        inserted = certificates.inserted,
        skipped = certificates.skipped,
        "certificates"
    );

    let mut users = SeedCount::default();
    for user in fixtures::users() {
        users.record(repos.users.create(user).await)?;
    }
    tracing::info!(inserted = users.inserted, skipped = users.skipped, "users");

    tracing::info!("Seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_conflicts_as_skipped() {
        let mut count = SeedCount::default();
        count.record(Ok(())).unwrap();
        count
            .record::<()>(Err(RepositoryError::Conflict("taken".to_owned())))
            .unwrap();

        assert_eq!(
            count,
            SeedCount {
                inserted: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn test_record_propagates_other_errors() {
        let mut count = SeedCount::default();
        let result = count.record::<()>(Err(RepositoryError::NotFound));

        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert_eq!(count, SeedCount::default());
    }
}
