use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use atelier_core::PromoCode;

use crate::error::Result;
use crate::models::PromoItem;
use crate::services::PromoService;
use crate::state::AppState;

/// GET /promos/{code}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(code): Path<PromoCode>,
) -> Result<Json<PromoItem>> {
    let promo = PromoService::new(state.repositories().promos.as_ref())
        .get_by_code(&code)
        .await?;
    Ok(Json(promo))
}

/// POST /promos
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    Json(promo): Json<PromoItem>,
) -> Result<(StatusCode, Json<PromoItem>)> {
    let promo = PromoService::new(state.repositories().promos.as_ref())
        .create(promo)
        .await?;
    Ok((StatusCode::CREATED, Json(promo)))
}
