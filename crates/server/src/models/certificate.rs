//! Gift certificates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::CertificateCode;

/// A gift certificate redeemable by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub code: CertificateCode,
    pub owner: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /certificates`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCertificateRequest {
    pub code: CertificateCode,
    pub owner: String,
    pub amount: Decimal,
}

impl CreateCertificateRequest {
    /// Stamp the certificate with its issue time.
    #[must_use]
    pub fn issue(self, created_at: DateTime<Utc>) -> Certificate {
        Certificate {
            code: self.code,
            owner: self.owner,
            amount: self.amount,
            created_at,
        }
    }
}
