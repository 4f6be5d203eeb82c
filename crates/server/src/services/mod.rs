//! Business logic services.
//!
//! Each service borrows the repositories and collaborators it needs from
//! [`crate::state::AppState`] for the duration of one request.
//!
//! # Services
//!
//! - `auth` - Account registration and password login
//! - `orders` - Checkout, payment approval, stock decrement
//! - `catalog` - Shop item CRUD and hosted photo cleanup
//! - `promos` - Promo code lookup
//! - `certificates` - Gift certificates
//! - `media` - Uploads to the media host and delivery URLs

pub mod auth;
pub mod catalog;
pub mod certificates;
pub mod media;
pub mod orders;
pub mod promos;

pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use certificates::{CertificateError, CertificateService};
pub use media::{MediaError, MediaService, MediaUploadResult, UploadedFile};
pub use orders::{OrderError, OrderService};
pub use promos::{PromoError, PromoService};
