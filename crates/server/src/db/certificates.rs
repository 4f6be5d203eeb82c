//! Gift certificate persistence.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::types::Json;

use atelier_core::CertificateCode;

use super::{RepositoryError, decode_doc, decode_docs};
use crate::models::Certificate;

/// Storage for gift certificates. Codes are not unique; the oldest match wins.
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Certificate>, RepositoryError>;

    async fn find_by_code(
        &self,
        code: &CertificateCode,
    ) -> Result<Option<Certificate>, RepositoryError>;

    async fn create(&self, certificate: Certificate) -> Result<Certificate, RepositoryError>;

    /// Remove every certificate with `code`. Returns whether any was removed.
    async fn delete(&self, code: &CertificateCode) -> Result<bool, RepositoryError>;
}

/// `PostgreSQL` certificate repository.
pub struct PgCertificateRepository {
    pool: PgPool,
}

impl PgCertificateRepository {
    /// Create a new certificate repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CertificateRepository for PgCertificateRepository {
    async fn find_all(&self) -> Result<Vec<Certificate>, RepositoryError> {
        let docs: Vec<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM certificates ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        decode_docs(docs)
    }

    async fn find_by_code(
        &self,
        code: &CertificateCode,
    ) -> Result<Option<Certificate>, RepositoryError> {
        let doc: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT doc FROM certificates WHERE code = $1 ORDER BY id LIMIT 1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;
        doc.map(decode_doc).transpose()
    }

    async fn create(&self, certificate: Certificate) -> Result<Certificate, RepositoryError> {
        sqlx::query("INSERT INTO certificates (code, doc) VALUES ($1, $2)")
            .bind(&certificate.code)
            .bind(Json(&certificate))
            .execute(&self.pool)
            .await?;
        Ok(certificate)
    }

    async fn delete(&self, code: &CertificateCode) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM certificates WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
