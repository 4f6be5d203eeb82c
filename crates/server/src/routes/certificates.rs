//! Gift certificate handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use atelier_core::CertificateCode;

use crate::error::Result;
use crate::models::{Certificate, CreateCertificateRequest};
use crate::services::CertificateService;
use crate::state::AppState;

fn service(state: &AppState) -> CertificateService<'_> {
    CertificateService::new(state.repositories().certificates.as_ref())
}

/// GET /certificates
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Certificate>>> {
    Ok(Json(service(&state).get_all().await?))
}

/// GET /certificates/{code}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(code): Path<CertificateCode>,
) -> Result<Json<Certificate>> {
    Ok(Json(service(&state).get_by_code(&code).await?))
}

/// POST /certificates
#[instrument(skip(state, request), fields(code = %request.code))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateCertificateRequest>,
) -> Result<(StatusCode, Json<Certificate>)> {
    let certificate = service(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(certificate)))
}

/// DELETE /certificates/{code}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(code): Path<CertificateCode>,
) -> Result<StatusCode> {
    service(&state).delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
