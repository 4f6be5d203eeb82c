//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cloudinary::{CloudinaryClient, DisabledMediaHost, MediaHost};
use crate::config::ServerConfig;
use crate::db::{self, Repositories};
use crate::email::{DisabledMailer, Mailer, Notifier, SmtpMailer};

/// Error building application state from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("media host client error: {0}")]
    MediaHost(#[from] reqwest::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// repositories and outbound collaborators chosen at start-up.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    repositories: Repositories,
    notifier: Notifier,
    media_host: Arc<dyn MediaHost>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Assemble state from already-built parts.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        repositories: Repositories,
        notifier: Notifier,
        media_host: Arc<dyn MediaHost>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                repositories,
                notifier,
                media_host,
                pool,
            }),
        }
    }

    /// Build state from configuration.
    ///
    /// Repositories are in-memory when mocks are requested or no database is
    /// configured, `PostgreSQL`-backed otherwise. SMTP and Cloudinary fall
    /// back to disabled implementations when unconfigured.
    ///
    /// # Errors
    ///
    /// Returns an error if the database pool, SMTP transport or HTTP client
    /// cannot be created.
    pub async fn from_config(config: ServerConfig) -> Result<Self, StateError> {
        let pool = match &config.database_url {
            Some(url) if !config.use_mock_repositories => {
                let pool = db::create_pool(url).await?;
                tracing::info!("Database pool created");
                Some(pool)
            }
            _ => {
                tracing::info!("Using in-memory repositories");
                None
            }
        };
        let repositories = pool
            .as_ref()
            .map_or_else(Repositories::in_memory, Repositories::postgres);

        let mailer: Arc<dyn Mailer> = match &config.email {
            Some(email) => Arc::new(SmtpMailer::new(email)?),
            None => {
                tracing::warn!("SMTP not configured, emails will be dropped");
                Arc::new(DisabledMailer)
            }
        };
        let notifier = Notifier::new(mailer, config.admin_email.clone());

        let media_host: Arc<dyn MediaHost> = match &config.cloudinary {
            Some(cloudinary) => Arc::new(CloudinaryClient::new(cloudinary)?),
            None => {
                tracing::warn!("Cloudinary not configured, media uploads disabled");
                Arc::new(DisabledMediaHost)
            }
        };

        Ok(Self::new(config, repositories, notifier, media_host, pool))
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the repository handles.
    #[must_use]
    pub fn repositories(&self) -> &Repositories {
        &self.inner.repositories
    }

    /// Get the email notifier.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Get the media host client.
    #[must_use]
    pub fn media_host(&self) -> &dyn MediaHost {
        self.inner.media_host.as_ref()
    }

    /// Get the database pool, `None` when serving from memory.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
