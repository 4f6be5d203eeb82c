//! Atelier Core - Shared domain primitives.
//!
//! This crate provides the small value types shared by the server and the
//! CLI:
//! - `server` - HTTP API, services and repositories
//! - `cli` - Migrations and fixture seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. The optional `postgres` feature adds `sqlx` encoding
//! for the identifier newtypes.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, emails, prices and media kinds

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
