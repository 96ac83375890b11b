//! `petget-core` — shared primitives of the PetGet API access layer.
//!
//! This crate contains the types every other crate agrees on (tenant scope,
//! resolved identity) and nothing infrastructure-flavored.

pub mod error;
pub mod id;
pub mod identity;

pub use error::{CoreError, CoreResult};
pub use id::TenantId;
pub use identity::UserIdentity;
