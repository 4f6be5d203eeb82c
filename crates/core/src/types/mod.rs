//! Core types for Atelier.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod media;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use media::MediaKind;
pub use price::{Currency, MulticurrencyPrice};
