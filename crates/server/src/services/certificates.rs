//! Gift certificates.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use atelier_core::CertificateCode;

use crate::db::{CertificateRepository, RepositoryError};
use crate::models::{Certificate, CreateCertificateRequest};

/// Errors from certificate operations.
#[derive(Debug, Error)]
pub enum CertificateError {
    /// No certificate with this code.
    #[error("Incorrect certificate")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Certificate service.
pub struct CertificateService<'a> {
    certificates: &'a dyn CertificateRepository,
}

impl<'a> CertificateService<'a> {
    /// Create a new certificate service.
    #[must_use]
    pub const fn new(certificates: &'a dyn CertificateRepository) -> Self {
        Self { certificates }
    }

    /// All certificates.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::Repository` if the store fails.
    pub async fn get_all(&self) -> Result<Vec<Certificate>, CertificateError> {
        Ok(self.certificates.find_all().await?)
    }

    /// Look up a certificate by code.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::NotFound` if the code is unknown.
    pub async fn get_by_code(&self, code: &CertificateCode) -> Result<Certificate, CertificateError> {
        self.certificates
            .find_by_code(code)
            .await?
            .ok_or(CertificateError::NotFound)
    }

    /// Issue a certificate stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::Repository` if the store fails.
    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create(
        &self,
        request: CreateCertificateRequest,
    ) -> Result<Certificate, CertificateError> {
        let certificate = self.certificates.create(request.issue(Utc::now())).await?;
        tracing::info!(code = %certificate.code, "certificate issued");
        Ok(certificate)
    }

    /// Remove a certificate.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::NotFound` if the code is unknown.
    #[instrument(skip(self))]
    pub async fn delete(&self, code: &CertificateCode) -> Result<(), CertificateError> {
        if self.certificates.delete(code).await? {
            Ok(())
        } else {
            Err(CertificateError::NotFound)
        }
    }
}
