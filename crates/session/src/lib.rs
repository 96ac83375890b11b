//! `petget-session` — credential storage and session reads.
//!
//! Single source of truth for the persisted session (access token, refresh
//! token, resolved identity). The HTTP pipeline and the auth operations
//! receive a [`SessionContext`] by construction; nothing in this workspace
//! reaches for ambient global state.

pub mod claims;
pub mod context;
pub mod medium;
pub mod store;

pub use claims::{decode_claims, ClaimsError};
pub use context::SessionContext;
pub use medium::{DetachedMedium, FileMedium, MemoryMedium, StorageMedium};
pub use store::{CredentialStore, Session};
