//! Media uploads and delivery URLs.
//!
//! Public identifiers are deterministic so re-uploading a product's media
//! overwrites the previous files:
//!
//! ```text
//! shopItems/images/{id}/{id}_{n}     product image n (1-based)
//! shopItems/videos/{id}/{id}_{n}     product video n
//! banners/images/{name}_{millis}     banner image
//! banners/videos/{name}_{millis}     banner video
//! ```

use std::sync::LazyLock;

use chrono::Utc;
use futures::future::try_join_all;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use atelier_core::{MediaKind, ShopItemId};

use crate::cloudinary::{MediaHost, MediaHostError, MediaUpload};

/// Maximum number of files in one upload request.
pub const MAX_FILES_PER_UPLOAD: usize = 10;

/// Legacy catalog photos: `.../<name>.jpg`.
static LEGACY_JPG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/([^/]+)\.jpg$").expect("Invalid regex"));

/// Errors from media operations.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The request carried no file.
    #[error("No files uploaded")]
    NoFiles,

    /// More files than a single request may carry.
    #[error("Too many files, at most {max} per upload")]
    TooManyFiles { max: usize },

    /// A file is neither an image nor a video.
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// The media host failed.
    #[error(transparent)]
    Host(#[from] MediaHostError),
}

/// A file received from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Kind declared by the content type. Anything not `video/*` is stored
    /// as an image.
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_content_type(&self.content_type).unwrap_or(MediaKind::Image)
    }
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUploadResult {
    pub url: String,
    pub public_id: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub original_name: String,
}

/// Check a batch before anything is uploaded: at least one file, at most
/// [`MAX_FILES_PER_UPLOAD`], each an image or a video.
///
/// # Errors
///
/// Returns the first rule the batch breaks.
pub fn validate_files(files: &[UploadedFile]) -> Result<(), MediaError> {
    if files.is_empty() {
        return Err(MediaError::NoFiles);
    }
    if files.len() > MAX_FILES_PER_UPLOAD {
        return Err(MediaError::TooManyFiles {
            max: MAX_FILES_PER_UPLOAD,
        });
    }
    validate_file_types(files)
}

/// Reject any file that is neither `image/*` nor `video/*`.
///
/// # Errors
///
/// Returns `MediaError::InvalidFileType` naming the offending content type.
pub fn validate_file_types(files: &[UploadedFile]) -> Result<(), MediaError> {
    match files
        .iter()
        .find(|f| MediaKind::from_content_type(&f.content_type).is_none())
    {
        Some(file) => Err(MediaError::InvalidFileType(file.content_type.clone())),
        None => Ok(()),
    }
}

/// `q_auto`/`f_auto` transformation with optional size.
fn transformation(base: &str, width: Option<u32>, height: Option<u32>) -> String {
    let mut parts = vec![base.to_owned()];
    if let Some(w) = width {
        parts.push(format!("w_{w}"));
    }
    if let Some(h) = height {
        parts.push(format!("h_{h}"));
    }
    parts.join(",")
}

/// Media service.
pub struct MediaService<'a> {
    host: &'a dyn MediaHost,
}

impl<'a> MediaService<'a> {
    /// Create a new media service.
    #[must_use]
    pub const fn new(host: &'a dyn MediaHost) -> Self {
        Self { host }
    }

    /// Upload a product's media, numbering files from 1 in request order.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Host` if any upload fails.
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn upload_shop_item_media(
        &self,
        files: Vec<UploadedFile>,
        id: &ShopItemId,
    ) -> Result<Vec<MediaUploadResult>, MediaError> {
        let uploads = files.into_iter().enumerate().map(|(i, file)| {
            let kind = file.kind();
            let public_id = format!("shopItems/{}/{id}/{id}_{}", kind.folder(), i + 1);
            self.upload(file, kind, public_id)
        });

        let results = try_join_all(uploads).await?;
        tracing::info!(count = results.len(), "shop item media uploaded");
        Ok(results)
    }

    /// Upload a banner under `name`, suffixed with the upload time.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Host` if the upload fails.
    #[instrument(skip(self, file))]
    pub async fn upload_banner_media(
        &self,
        file: UploadedFile,
        name: &str,
    ) -> Result<MediaUploadResult, MediaError> {
        let kind = file.kind();
        let public_id = format!(
            "banners/{}/{name}_{}",
            kind.folder(),
            Utc::now().timestamp_millis()
        );
        self.upload(file, kind, public_id).await
    }

    async fn upload(
        &self,
        file: UploadedFile,
        kind: MediaKind,
        public_id: String,
    ) -> Result<MediaUploadResult, MediaError> {
        let original_name = file.file_name.clone();
        let asset = self
            .host
            .upload(MediaUpload {
                public_id,
                kind,
                file_name: file.file_name,
                content_type: file.content_type,
                bytes: file.bytes,
            })
            .await?;

        Ok(MediaUploadResult {
            url: asset.secure_url,
            public_id: asset.public_id,
            kind,
            original_name,
        })
    }

    /// Delete an asset.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Host` if the host refuses.
    #[instrument(skip(self))]
    pub async fn delete_media(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaError> {
        self.host.destroy(public_id, kind).await?;
        tracing::info!(%public_id, "media deleted");
        Ok(())
    }

    /// Cropped, auto-quality, auto-format image URL.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Host` if the host is not configured.
    pub fn generate_optimized_image_url(
        &self,
        public_id: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<String, MediaError> {
        let t = transformation("c_fill,q_auto,f_auto", width, height);
        Ok(self.host.delivery_url(public_id, MediaKind::Image, &t)?)
    }

    /// Auto-quality, auto-format video URL, scaled without cropping.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Host` if the host is not configured.
    pub fn generate_optimized_video_url(
        &self,
        public_id: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<String, MediaError> {
        let t = transformation("q_auto,f_auto", width, height);
        Ok(self.host.delivery_url(public_id, MediaKind::Video, &t)?)
    }

    /// Rewrite a legacy `.../<name>.jpg` photo URL to its hosted equivalent
    /// under `shopItems/images/<name>`. Other URLs are returned unchanged.
    #[must_use]
    pub fn convert_legacy_url(&self, url: &str) -> String {
        let Some(name) = LEGACY_JPG_RE.captures(url).and_then(|c| c.get(1)) else {
            return url.to_owned();
        };

        let public_id = format!("shopItems/images/{}", name.as_str());
        match self
            .host
            .delivery_url(&public_id, MediaKind::Image, "q_auto,f_auto")
        {
            Ok(converted) => converted,
            Err(e) => {
                tracing::warn!(error = %e, %url, "cannot convert legacy url");
                url.to_owned()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::FakeMediaHost;

    fn file(name: &str, content_type: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_owned(),
            content_type: content_type.to_owned(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn test_validate_files() {
        assert!(matches!(validate_files(&[]), Err(MediaError::NoFiles)));
        assert!(validate_files(&[file("a.jpg", "image/jpeg"), file("b.mp4", "video/mp4")]).is_ok());

        let err = validate_files(&[file("a.jpg", "image/jpeg"), file("c.pdf", "application/pdf")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid file type: application/pdf");

        let many: Vec<_> = (0..11).map(|i| file(&format!("{i}.png"), "image/png")).collect();
        assert!(matches!(
            validate_files(&many),
            Err(MediaError::TooManyFiles { max: 10 })
        ));
    }

    #[tokio::test]
    async fn test_shop_item_public_ids() {
        let host = FakeMediaHost::new();
        let media = MediaService::new(&host);

        let results = media
            .upload_shop_item_media(
                vec![file("front.jpg", "image/jpeg"), file("walk.mp4", "video/mp4")],
                &ShopItemId::new("PROD-009"),
            )
            .await
            .unwrap();

        assert_eq!(results[0].public_id, "shopItems/images/PROD-009/PROD-009_1");
        assert_eq!(results[0].kind, MediaKind::Image);
        assert_eq!(results[0].original_name, "front.jpg");
        assert_eq!(results[1].public_id, "shopItems/videos/PROD-009/PROD-009_2");
        assert_eq!(results[1].kind, MediaKind::Video);
        assert!(results[1].url.contains("/video/upload/"));
        assert_eq!(host.uploaded().await.len(), 2);
    }

    #[tokio::test]
    async fn test_banner_public_id() {
        let host = FakeMediaHost::new();
        let media = MediaService::new(&host);

        let result = media
            .upload_banner_media(file("hero.webp", "image/webp"), "spring")
            .await
            .unwrap();
        assert!(result.public_id.starts_with("banners/images/spring_"));
        let suffix = result.public_id.trim_start_matches("banners/images/spring_");
        assert!(suffix.parse::<i64>().is_ok());
    }

    #[test]
    fn test_optimized_urls() {
        let host = FakeMediaHost::new();
        let media = MediaService::new(&host);

        assert_eq!(
            media
                .generate_optimized_image_url("shopItems/images/P/P_1", Some(400), Some(600))
                .unwrap(),
            "https://res.cloudinary.com/test-cloud/image/upload/c_fill,q_auto,f_auto,w_400,h_600/shopItems/images/P/P_1"
        );
        assert_eq!(
            media
                .generate_optimized_video_url("shopItems/videos/P/P_1", Some(720), None)
                .unwrap(),
            "https://res.cloudinary.com/test-cloud/video/upload/q_auto,f_auto,w_720/shopItems/videos/P/P_1"
        );
    }

    #[test]
    fn test_convert_legacy_url() {
        let host = FakeMediaHost::new();
        let media = MediaService::new(&host);

        assert_eq!(
            media.convert_legacy_url("https://old.example.com/static/coat-black.jpg"),
            "https://res.cloudinary.com/test-cloud/image/upload/q_auto,f_auto/shopItems/images/coat-black"
        );
        assert_eq!(
            media.convert_legacy_url("https://old.example.com/static/coat.png"),
            "https://old.example.com/static/coat.png"
        );
    }

    #[tokio::test]
    async fn test_host_failure_surfaces() {
        let host = crate::cloudinary::DisabledMediaHost;
        let media = MediaService::new(&host);

        let err = media
            .delete_media("banners/images/x_1", MediaKind::Image)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Host(MediaHostError::NotConfigured)));
        assert_eq!(
            media.convert_legacy_url("https://old.example.com/a.jpg"),
            "https://old.example.com/a.jpg"
        );
    }
}
