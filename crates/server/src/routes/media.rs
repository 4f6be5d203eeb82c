//! Media upload handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;
use tracing::instrument;

use atelier_core::{MediaKind, ShopItemId};

use super::multipart::read_upload_form;
use crate::error::{AppError, Result};
use crate::services::{MediaService, MediaUploadResult, media};
use crate::state::AppState;

/// Response of `DELETE /media/{*publicId}`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /media/shop-items/{id}/upload
///
/// Multipart field `files`, up to ten images or videos.
#[instrument(skip(state, multipart))]
pub async fn upload_shop_item(
    State(state): State<AppState>,
    Path(id): Path<ShopItemId>,
    multipart: Multipart,
) -> Result<Json<Vec<MediaUploadResult>>> {
    let form = read_upload_form(multipart, "files").await?;
    media::validate_files(&form.files)?;

    let results = MediaService::new(state.media_host())
        .upload_shop_item_media(form.files, &id)
        .await?;
    Ok(Json(results))
}

/// POST /media/banners/upload/{name}
///
/// Multipart field `file`, one image or video.
#[instrument(skip(state, multipart))]
pub async fn upload_banner(
    State(state): State<AppState>,
    Path(name): Path<String>,
    multipart: Multipart,
) -> Result<Json<MediaUploadResult>> {
    let form = read_upload_form(multipart, "file").await?;
    let Some(file) = form.files.into_iter().next() else {
        return Err(AppError::BadRequest("No file uploaded".to_string()));
    };
    media::validate_file_types(std::slice::from_ref(&file))?;

    let result = MediaService::new(state.media_host())
        .upload_banner_media(file, &name)
        .await?;
    Ok(Json(result))
}

/// DELETE /media/{*publicId}
///
/// Public ids under a `videos` folder are deleted as videos, anything else
/// as an image.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let public_id = public_id.trim_start_matches('/');
    let kind = if public_id.contains("/videos/") {
        MediaKind::Video
    } else {
        MediaKind::Image
    };

    MediaService::new(state.media_host())
        .delete_media(public_id, kind)
        .await?;
    Ok(Json(MessageResponse {
        message: "Media deleted successfully",
    }))
}
