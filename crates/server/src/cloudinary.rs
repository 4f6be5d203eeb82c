//! Cloudinary media hosting.
//!
//! Uploads and deletions go through Cloudinary's signed REST API. Request
//! signatures use SHA-256, so the Cloudinary account must have SHA-256
//! signatures enabled.
//!
//! # API
//!
//! - `POST https://api.cloudinary.com/v1_1/{cloud}/{image|video}/upload`
//! - `POST https://api.cloudinary.com/v1_1/{cloud}/{image|video}/destroy`
//! - Delivery: `https://res.cloudinary.com/{cloud}/{image|video}/upload/{transformation}/{public_id}`

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use atelier_core::MediaKind;

use crate::config::CloudinaryConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";
const DELIVERY_BASE: &str = "https://res.cloudinary.com";

/// Errors talking to the media host.
#[derive(Debug, Error)]
pub enum MediaHostError {
    /// No media host credentials are configured.
    #[error("media host is not configured")]
    NotConfigured,

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The host rejected the request.
    #[error("media host returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The asset to delete does not exist.
    #[error("asset not found: {0}")]
    NotFound(String),
}

/// A file to store under a fixed public identifier.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub public_id: String,
    pub kind: MediaKind,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
}

/// Image/video CDN.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Store a file, overwriting any asset with the same public identifier.
    async fn upload(&self, upload: MediaUpload) -> Result<UploadedAsset, MediaHostError>;

    /// Delete an asset.
    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaHostError>;

    /// Public URL of an asset with a transformation applied.
    ///
    /// An empty `transformation` yields the original asset.
    fn delivery_url(
        &self,
        public_id: &str,
        kind: MediaKind,
        transformation: &str,
    ) -> Result<String, MediaHostError>;
}

/// Build a delivery URL for `cloud_name`.
#[must_use]
pub fn delivery_url(
    cloud_name: &str,
    public_id: &str,
    kind: MediaKind,
    transformation: &str,
) -> String {
    let resource = kind.resource_type();
    if transformation.is_empty() {
        format!("{DELIVERY_BASE}/{cloud_name}/{resource}/upload/{public_id}")
    } else {
        format!("{DELIVERY_BASE}/{cloud_name}/{resource}/upload/{transformation}/{public_id}")
    }
}

/// Sign API parameters: sorted `key=value` pairs joined by `&`, followed
/// by the API secret, hashed with SHA-256.
fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha256::digest(format!("{to_sign}{api_secret}").as_bytes()))
}

fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        .to_string()
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Deserialize)]
struct ApiErrorMessage {
    message: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary REST client.
pub struct CloudinaryClient {
    client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

impl CloudinaryClient {
    /// Create a new Cloudinary client.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: &CloudinaryConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{API_BASE}/{}/{}/{action}",
            self.cloud_name,
            kind.resource_type()
        )
    }

    async fn api_error(response: reqwest::Response) -> MediaHostError {
        let status = response.status().as_u16();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.error.message,
            Err(_) => "unreadable error body".to_owned(),
        };
        MediaHostError::Api { status, message }
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    #[tracing::instrument(skip(self, upload), fields(public_id = %upload.public_id, size = upload.bytes.len()))]
    async fn upload(&self, upload: MediaUpload) -> Result<UploadedAsset, MediaHostError> {
        let timestamp = unix_timestamp();
        let signature = sign(
            &[
                ("public_id", upload.public_id.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
            self.api_secret.expose_secret(),
        );

        let file = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("public_id", upload.public_id)
            .text("timestamp", timestamp)
            .text("signature", signature)
            .part("file", file);

        let response = self
            .client
            .post(self.endpoint(upload.kind, "upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let asset: UploadedAsset = response.json().await?;
        tracing::info!(public_id = %asset.public_id, "media uploaded");
        Ok(asset)
    }

    #[tracing::instrument(skip(self))]
    async fn destroy(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaHostError> {
        let timestamp = unix_timestamp();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            self.api_secret.expose_secret(),
        );

        let response = self
            .client
            .post(self.endpoint(kind, "destroy"))
            .form(&[
                ("api_key", self.api_key.as_str()),
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let body: DestroyResponse = response.json().await?;
        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => Err(MediaHostError::NotFound(public_id.to_owned())),
            other => Err(MediaHostError::Api {
                status: 200,
                message: other.to_owned(),
            }),
        }
    }

    fn delivery_url(
        &self,
        public_id: &str,
        kind: MediaKind,
        transformation: &str,
    ) -> Result<String, MediaHostError> {
        Ok(delivery_url(&self.cloud_name, public_id, kind, transformation))
    }
}

/// Media host used when Cloudinary is not configured. Every call fails with
/// [`MediaHostError::NotConfigured`].
pub struct DisabledMediaHost;

#[async_trait]
impl MediaHost for DisabledMediaHost {
    async fn upload(&self, _upload: MediaUpload) -> Result<UploadedAsset, MediaHostError> {
        Err(MediaHostError::NotConfigured)
    }

    async fn destroy(&self, _public_id: &str, _kind: MediaKind) -> Result<(), MediaHostError> {
        Err(MediaHostError::NotConfigured)
    }

    fn delivery_url(
        &self,
        _public_id: &str,
        _kind: MediaKind,
        _transformation: &str,
    ) -> Result<String, MediaHostError> {
        Err(MediaHostError::NotConfigured)
    }
}
