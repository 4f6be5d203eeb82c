//! Shop item catalog management.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::instrument;

use atelier_core::{MediaKind, ShopItemId};

use super::media::{self, MediaError, MediaService, UploadedFile};
use crate::cloudinary::MediaHost;
use crate::db::{RepositoryError, ShopItemRepository};
use crate::models::{ShopItem, ShopItemPatch};

/// Hosted product photo: `.../shopItems/images/<dir>/<name>.<ext>`.
static HOSTED_PHOTO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/shopItems/images/([^/]+)/([^.]+)").expect("Invalid regex"));

/// Errors from catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An item with this id already exists.
    #[error("Shop item with ID {0} already exists")]
    AlreadyExists(ShopItemId),

    /// No item with this id.
    #[error("Shop item with ID {0} not found")]
    NotFound(ShopItemId),

    /// Media validation or upload failed.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Public identifier of a hosted product photo, if the URL is one.
fn hosted_photo_id(url: &str) -> Option<String> {
    HOSTED_PHOTO_RE
        .captures(url)
        .map(|c| format!("shopItems/images/{}/{}", &c[1], &c[2]))
}

/// Catalog service.
pub struct CatalogService<'a> {
    items: &'a dyn ShopItemRepository,
    host: &'a dyn MediaHost,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(items: &'a dyn ShopItemRepository, host: &'a dyn MediaHost) -> Self {
        Self { items, host }
    }

    /// All items in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn get_all(&self) -> Result<Vec<ShopItem>, CatalogError> {
        Ok(self.items.find_all().await?)
    }

    /// One item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id is unknown.
    pub async fn get_by_id(&self, id: &ShopItemId) -> Result<ShopItem, CatalogError> {
        self.items
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Items tagged with `category`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn get_by_category(&self, category: &str) -> Result<Vec<ShopItem>, CatalogError> {
        Ok(self.items.find_by_category(category).await?)
    }

    /// Items in `collection`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the store fails.
    pub async fn get_by_collection(&self, collection: &str) -> Result<Vec<ShopItem>, CatalogError> {
        Ok(self.items.find_by_collection(collection).await?)
    }

    /// Add an item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::AlreadyExists` if the id is taken.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub async fn create(&self, item: ShopItem) -> Result<ShopItem, CatalogError> {
        if self.items.find_by_id(&item.id).await?.is_some() {
            return Err(CatalogError::AlreadyExists(item.id));
        }

        let id = item.id.clone();
        let created = self.items.create(item).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => CatalogError::AlreadyExists(id),
            other => CatalogError::Repository(other),
        })?;

        tracing::info!(id = %created.id, "shop item created");
        Ok(created)
    }

    /// Add an item and upload its media, storing the hosted URLs as photos.
    ///
    /// Files are checked before the item is stored. If an upload fails the
    /// item stays in the catalog without photos.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Media` for rejected files or failed uploads and
    /// `CatalogError::AlreadyExists` if the id is taken.
    #[instrument(skip(self, item, files), fields(id = %item.id, files = files.len()))]
    pub async fn create_with_media(
        &self,
        mut item: ShopItem,
        files: Vec<UploadedFile>,
    ) -> Result<ShopItem, CatalogError> {
        if files.len() > media::MAX_FILES_PER_UPLOAD {
            return Err(MediaError::TooManyFiles {
                max: media::MAX_FILES_PER_UPLOAD,
            }
            .into());
        }
        media::validate_file_types(&files)?;

        item.photos.clear();
        let created = self.create(item).await?;
        if files.is_empty() {
            return Ok(created);
        }

        let uploads = MediaService::new(self.host)
            .upload_shop_item_media(files, &created.id)
            .await?;
        let photos = uploads.into_iter().map(|u| u.url).collect();

        self.update_photos(&created.id, photos).await
    }

    /// Replace the supplied fields of an item.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id is unknown.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: &ShopItemId,
        patch: ShopItemPatch,
    ) -> Result<ShopItem, CatalogError> {
        self.items
            .update(id, patch)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Replace an item's photo list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id is unknown.
    #[instrument(skip(self, photos), fields(photos = photos.len()))]
    pub async fn update_photos(
        &self,
        id: &ShopItemId,
        photos: Vec<String>,
    ) -> Result<ShopItem, CatalogError> {
        self.items
            .update_photos(id, photos)
            .await?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// Remove an item, then try to delete its hosted photos.
    ///
    /// Photo deletion failures are logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the id is unknown.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &ShopItemId) -> Result<(), CatalogError> {
        let item = self.get_by_id(id).await?;
        if !self.items.delete(id).await? {
            return Err(CatalogError::NotFound(id.clone()));
        }
        tracing::info!(%id, "shop item deleted");

        for public_id in item.photos.iter().filter_map(|url| hosted_photo_id(url)) {
            if let Err(e) = self.host.destroy(&public_id, MediaKind::Image).await {
                tracing::warn!(%public_id, error = %e, "failed to delete photo");
            }
        }
        Ok(())
    }
}
