//! Test doubles for the email and media collaborators.
//!
//! Compiled for unit tests and, through the `test-utils` feature, for the
//! integration test crate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use atelier_core::MediaKind;

use crate::cloudinary::{self, MediaHost, MediaHostError, MediaUpload, UploadedAsset};
use crate::config::ServerConfig;
use crate::db::Repositories;
use crate::email::{EmailError, Mailer, Notifier, OutgoingEmail};
use crate::state::AppState;

/// How long [`Outbox::next`] waits for a background send.
const DELIVERY_WAIT: Duration = Duration::from_secs(2);

/// How long [`Outbox::is_drained`] waits before declaring the outbox empty.
const QUIET_PERIOD: Duration = Duration::from_millis(100);

// =============================================================================
// Email
// =============================================================================

/// Mailer that forwards every message to an [`Outbox`].
pub struct RecordingMailer {
    sender: mpsc::UnboundedSender<OutgoingEmail>,
}

impl RecordingMailer {
    /// Create a mailer and the outbox receiving its messages.
    #[must_use]
    pub fn new() -> (Self, Outbox) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, Outbox { receiver })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        // The outbox may already be dropped by a test that ignores email.
        let _ = self.sender.send(email);
        Ok(())
    }
}

/// Messages sent through a [`RecordingMailer`].
pub struct Outbox {
    receiver: mpsc::UnboundedReceiver<OutgoingEmail>,
}

impl Outbox {
    /// Wait for the next message. `None` if nothing arrives in time.
    pub async fn next(&mut self) -> Option<OutgoingEmail> {
        tokio::time::timeout(DELIVERY_WAIT, self.receiver.recv())
            .await
            .ok()
            .flatten()
    }

    /// Whether no further message arrives within a short quiet period.
    pub async fn is_drained(&mut self) -> bool {
        tokio::time::timeout(QUIET_PERIOD, self.receiver.recv())
            .await
            .is_err()
    }
}

/// Mailer whose every delivery fails.
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), EmailError> {
        Err(EmailError::InvalidAddress("unreachable@test".to_owned()))
    }
}

// =============================================================================
// Media host
// =============================================================================

/// Cloud name used in fake delivery URLs.
pub const FAKE_CLOUD_NAME: &str = "test-cloud";

/// In-memory media host recording uploads and deletions.
#[derive(Default)]
pub struct FakeMediaHost {
    uploaded: Mutex<Vec<MediaUpload>>,
    destroyed: Mutex<Vec<String>>,
    fail_destroy: bool,
}

impl FakeMediaHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that accepts uploads but fails every deletion.
    #[must_use]
    pub fn failing_destroy() -> Self {
        Self {
            fail_destroy: true,
            ..Self::default()
        }
    }

    /// Uploads received so far.
    pub async fn uploaded(&self) -> Vec<MediaUpload> {
        self.uploaded.lock().await.clone()
    }

    /// Public ids deleted so far.
    pub async fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().await.clone()
    }
}

#[async_trait]
impl MediaHost for FakeMediaHost {
    async fn upload(&self, upload: MediaUpload) -> Result<UploadedAsset, MediaHostError> {
        let asset = UploadedAsset {
            secure_url: cloudinary::delivery_url(FAKE_CLOUD_NAME, &upload.public_id, upload.kind, ""),
            public_id: upload.public_id.clone(),
        };
        self.uploaded.lock().await.push(upload);
        Ok(asset)
    }

    async fn destroy(&self, public_id: &str, _kind: MediaKind) -> Result<(), MediaHostError> {
        if self.fail_destroy {
            return Err(MediaHostError::Api {
                status: 500,
                message: "destroy failed".to_owned(),
            });
        }
        self.destroyed.lock().await.push(public_id.to_owned());
        Ok(())
    }

    fn delivery_url(
        &self,
        public_id: &str,
        kind: MediaKind,
        transformation: &str,
    ) -> Result<String, MediaHostError> {
        Ok(cloudinary::delivery_url(
            FAKE_CLOUD_NAME,
            public_id,
            kind,
            transformation,
        ))
    }
}

// =============================================================================
// Application state
// =============================================================================

/// Application state over fresh seeded in-memory stores, with handles on the
/// fakes standing in for SMTP and Cloudinary.
pub struct TestContext {
    pub state: AppState,
    pub outbox: Outbox,
    pub media: Arc<FakeMediaHost>,
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        let config = ServerConfig::local();
        let (mailer, outbox) = RecordingMailer::new();
        let notifier = Notifier::new(Arc::new(mailer), config.admin_email.clone());
        let media = Arc::new(FakeMediaHost::new());

        let state = AppState::new(
            config,
            Repositories::in_memory(),
            notifier,
            Arc::clone(&media) as Arc<dyn MediaHost>,
            None,
        );

        Self {
            state,
            outbox,
            media,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
