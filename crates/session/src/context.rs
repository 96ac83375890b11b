//! Injectable session handle shared by the pipeline and the auth operations.

use std::sync::Arc;

use petget_core::{TenantId, UserIdentity};

use crate::medium::{DetachedMedium, FileMedium, StorageMedium};
use crate::store::{CredentialStore, Session};

/// Cheap-to-clone view over one [`CredentialStore`].
///
/// Constructed once at startup and passed to every collaborator explicitly.
/// Reads go straight through to the store, so a session installed by one
/// clone is immediately visible to all of them.
#[derive(Clone, Debug)]
pub struct SessionContext {
    store: Arc<CredentialStore>,
}

impl SessionContext {
    pub fn new(medium: impl StorageMedium + 'static) -> Self {
        Self {
            store: Arc::new(CredentialStore::new(medium)),
        }
    }

    pub fn from_store(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    /// Startup constructor: restore whatever session the default persistent
    /// medium holds. Contexts without a resolvable data directory get a
    /// detached (never-persisting, never-failing) medium instead.
    pub fn hydrate() -> Self {
        match FileMedium::default_location() {
            Some(medium) => {
                let ctx = Self::new(medium);
                if ctx.is_authenticated() {
                    tracing::info!("restored persisted session");
                }
                ctx
            }
            None => {
                tracing::warn!("no persistent data directory; session will not survive restarts");
                Self::new(DetachedMedium)
            }
        }
    }

    pub fn session(&self) -> Session {
        self.store.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get().is_authenticated()
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get().access_token
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get().refresh_token
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.store.get().identity
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.store.get().identity.map(|i| i.tenant_id)
    }

    /// Install a full session. Callers: login, and the renewal path when the
    /// backend rotates more than the access token.
    pub fn install(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        identity: &UserIdentity,
    ) {
        self.store.set(access_token, refresh_token, identity);
    }

    /// Swap only the access token (the common renewal outcome).
    pub fn replace_access_token(&self, access_token: &str) {
        self.store.set_access_token(access_token);
    }

    /// Drop the session. Callers: logout, and the pipeline on terminal
    /// authentication failure.
    pub fn clear(&self) {
        self.store.clear();
    }
}
