//! In-memory gift certificate store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use atelier_core::CertificateCode;

use super::fixtures;
use crate::db::{CertificateRepository, RepositoryError};
use crate::models::Certificate;

/// In-memory gift certificate store.
#[derive(Default)]
pub struct InMemoryCertificateRepository {
    certificates: RwLock<Vec<Certificate>>,
}

impl InMemoryCertificateRepository {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the fixture certificates.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            certificates: RwLock::new(fixtures::certificates()),
        }
    }
}

#[async_trait]
impl CertificateRepository for InMemoryCertificateRepository {
    async fn find_all(&self) -> Result<Vec<Certificate>, RepositoryError> {
        Ok(self.certificates.read().await.clone())
    }

    async fn find_by_code(
        &self,
        code: &CertificateCode,
    ) -> Result<Option<Certificate>, RepositoryError> {
        let certificates = self.certificates.read().await;
        Ok(certificates.iter().find(|c| &c.code == code).cloned())
    }

    async fn create(&self, certificate: Certificate) -> Result<Certificate, RepositoryError> {
        self.certificates.write().await.push(certificate.clone());
        Ok(certificate)
    }

    async fn delete(&self, code: &CertificateCode) -> Result<bool, RepositoryError> {
        let mut certificates = self.certificates.write().await;
        let before = certificates.len();
        certificates.retain(|c| &c.code != code);
        Ok(certificates.len() != before)
    }
}
