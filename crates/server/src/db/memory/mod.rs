//! In-memory repositories.
//!
//! Each store is an explicitly constructed object owning one
//! `RwLock<Vec<_>>`. [`seeded`](InMemoryOrderRepository::seeded) constructors
//! start from [`fixtures`]; `new` starts empty. Nothing is shared between
//! instances, so every test can build its own.
//!
//! Differences from the `PostgreSQL` repositories:
//! - account emails are not unique,
//! - data lives for the lifetime of the process.

pub mod fixtures;

mod certificates;
mod orders;
mod promos;
mod shop_items;
mod users;

pub use certificates::InMemoryCertificateRepository;
pub use orders::InMemoryOrderRepository;
pub use promos::InMemoryPromoRepository;
pub use shop_items::InMemoryShopItemRepository;
pub use users::InMemoryUserRepository;
