//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Errors returned by handlers carry a JSON body
//! `{"statusCode": u16, "message": String}`; server-side failures get an
//! opaque message. Bodies the axum extractors cannot decode are rejected
//! before a handler runs and keep axum's plain-text rejection (400 for
//! malformed JSON, 422 for a well-formed body of the wrong shape).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cloudinary::MediaHostError;
use crate::db::RepositoryError;
use crate::services::{
    AuthError, CatalogError, CertificateError, MediaError, OrderError, PromoError,
};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Media host operation failed.
    #[error("Media host error: {0}")]
    MediaHost(#[from] MediaHostError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credentials rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with stored state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MediaHost(MediaHostError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            Self::MediaHost(MediaHostError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::MediaHost(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    // Don't expose internal error details to clients
    fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::MediaHost(MediaHostError::NotConfigured) => {
                "Media uploads are not configured".to_string()
            }
            Self::MediaHost(MediaHostError::NotFound(_)) => "Media not found".to_string(),
            Self::MediaHost(_) => "External service error".to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::MediaHost(MediaHostError::Http(_) | MediaHostError::Api { .. })
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = serde_json::json!({
            "statusCode": status.as_u16(),
            "message": self.client_message(),
        });

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(_) => Self::BadRequest("Invalid email address".to_string()),
            AuthError::UserAlreadyExists => {
                Self::Conflict("An account with this email already exists".to_string())
            }
            AuthError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Repository(e) => Self::Database(e),
            OrderError::AlreadyExists(_) => Self::Conflict(err.to_string()),
            OrderError::ShopItemNotFound(_)
            | OrderError::OutOfStock { .. }
            | OrderError::MissingShipping(_) => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::AlreadyExists(_) => Self::BadRequest(err.to_string()),
            CatalogError::NotFound(_) => Self::NotFound(err.to_string()),
            CatalogError::Media(e) => e.into(),
            CatalogError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Host(e) => Self::MediaHost(e),
            MediaError::NoFiles | MediaError::TooManyFiles { .. } | MediaError::InvalidFileType(_) => {
                Self::BadRequest(err.to_string())
            }
        }
    }
}

impl From<PromoError> for AppError {
    fn from(err: PromoError) -> Self {
        match err {
            PromoError::NotFound => Self::NotFound(err.to_string()),
            PromoError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<CertificateError> for AppError {
    fn from(err: CertificateError) -> Self {
        match err {
            CertificateError::NotFound => Self::NotFound(err.to_string()),
            CertificateError::Repository(e) => Self::Database(e),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::ShopItemId;

    use super::*;

    fn get_status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("PROD-123".to_string());
        assert_eq!(err.to_string(), "Not found: PROD-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(MediaHostError::NotConfigured),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(MediaHostError::Api {
                status: 401,
                message: "bad key".to_string()
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_domain_errors_map_to_client_statuses() {
        let id = ShopItemId::new("PROD-404");
        assert_eq!(
            get_status(OrderError::ShopItemNotFound(id.clone())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::OutOfStock {
                id: id.clone(),
                size: "M".to_string()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(OrderError::AlreadyExists(atelier_core::OrderId::new("ORD-001"))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CatalogError::AlreadyExists(id.clone())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(get_status(CatalogError::NotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(get_status(PromoError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(get_status(MediaError::NoFiles), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(OrderError::Repository(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_errors_are_opaque() {
        let response = AppError::Database(RepositoryError::DataCorruption(
            "orders.doc is not an object".to_string(),
        ))
        .into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["statusCode"], 500);
    }
}
