//! Catalog ("shop items v2") handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use atelier_core::ShopItemId;

use super::multipart::read_upload_form;
use crate::error::{AppError, Result};
use crate::models::{ShopItem, ShopItemPatch};
use crate::services::CatalogService;
use crate::state::AppState;

/// Listing filters. `category` wins when both are given.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub collection: Option<String>,
}

/// Body of `PUT /shop-items-v2/{id}/photos`.
#[derive(Debug, Deserialize)]
pub struct PhotosBody {
    pub photos: Vec<String>,
}

fn service(state: &AppState) -> CatalogService<'_> {
    CatalogService::new(state.repositories().shop_items.as_ref(), state.media_host())
}

/// GET /shop-items-v2[?category=|?collection=]
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<ShopItem>>> {
    let catalog = service(&state);
    let items = match (query.category, query.collection) {
        (Some(category), _) => catalog.get_by_category(&category).await?,
        (None, Some(collection)) => catalog.get_by_collection(&collection).await?,
        (None, None) => catalog.get_all().await?,
    };
    Ok(Json(items))
}

/// GET /shop-items-v2/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ShopItemId>,
) -> Result<Json<ShopItem>> {
    Ok(Json(service(&state).get_by_id(&id).await?))
}

/// POST /shop-items-v2
#[instrument(skip(state, item), fields(id = %item.id))]
pub async fn create(
    State(state): State<AppState>,
    Json(item): Json<ShopItem>,
) -> Result<(StatusCode, Json<ShopItem>)> {
    let item = service(&state).create(item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// POST /shop-items-v2/with-media
///
/// Multipart: `data` holds the item as JSON, `files` up to ten images or
/// videos that become its photos.
#[instrument(skip(state, multipart))]
pub async fn create_with_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ShopItem>)> {
    let form = read_upload_form(multipart, "files").await?;
    let data = form
        .data
        .ok_or_else(|| AppError::BadRequest("Missing data field".to_string()))?;
    let item: ShopItem = serde_json::from_str(&data)
        .map_err(|_| AppError::BadRequest("Invalid JSON data format".to_string()))?;

    let item = service(&state).create_with_media(item, form.files).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /shop-items-v2/{id}
#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ShopItemId>,
    Json(patch): Json<ShopItemPatch>,
) -> Result<Json<ShopItem>> {
    Ok(Json(service(&state).update(&id, patch).await?))
}

/// PUT /shop-items-v2/{id}/photos
#[instrument(skip(state, body))]
pub async fn update_photos(
    State(state): State<AppState>,
    Path(id): Path<ShopItemId>,
    Json(body): Json<PhotosBody>,
) -> Result<Json<ShopItem>> {
    Ok(Json(service(&state).update_photos(&id, body.photos).await?))
}

/// DELETE /shop-items-v2/{id}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<ShopItemId>,
) -> Result<StatusCode> {
    service(&state).delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
