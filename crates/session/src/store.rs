//! Credential store: the single reader/writer of persisted session state.

use std::sync::Mutex;

use petget_core::{TenantId, UserIdentity};

use crate::medium::StorageMedium;

/// Persisted entry names. Stable across releases: changing them logs every
/// user out on upgrade.
const ACCESS_TOKEN_KEY: &str = "petget_access_token";
const REFRESH_TOKEN_KEY: &str = "petget_refresh_token";
const USER_INFO_KEY: &str = "petget_user_info";

/// Snapshot of the persisted session.
///
/// A session is established iff both the access token and the identity are
/// present; any other combination reads as "not authenticated".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub identity: Option<UserIdentity>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.identity.is_some()
    }

    /// Tenant scope of the session. Sourced from the identity and nowhere
    /// else, so the tenant header can never disagree with the logged-in user.
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.identity.as_ref().map(|i| &i.tenant_id)
    }
}

/// Single source of truth for the persisted session.
///
/// One lock around the medium makes every operation all-or-nothing from a
/// reader's perspective: `get` never observes a half-written `set` or a
/// half-removed `clear`.
pub struct CredentialStore {
    medium: Mutex<Box<dyn StorageMedium>>,
}

impl CredentialStore {
    pub fn new(medium: impl StorageMedium + 'static) -> Self {
        Self {
            medium: Mutex::new(Box::new(medium)),
        }
    }

    /// Read the current session.
    ///
    /// A stored identity that fails to parse is deleted and treated as
    /// absent: corrupt storage self-heals instead of surfacing an error.
    pub fn get(&self) -> Session {
        let mut medium = self.medium.lock().unwrap_or_else(|e| e.into_inner());

        let access_token = medium.get(ACCESS_TOKEN_KEY);
        let refresh_token = medium.get(REFRESH_TOKEN_KEY);
        let identity = match medium.get(USER_INFO_KEY) {
            None => None,
            Some(raw) => match serde_json::from_str::<UserIdentity>(&raw) {
                Ok(identity) => Some(identity),
                Err(err) => {
                    tracing::warn!("discarding unparseable stored identity: {err}");
                    medium.remove(USER_INFO_KEY);
                    None
                }
            },
        };

        Session {
            access_token,
            refresh_token,
            identity,
        }
    }

    /// Install a session. All three entries are written under one lock; a
    /// `None` refresh token removes the refresh entry (some backends do not
    /// issue one).
    pub fn set(&self, access_token: &str, refresh_token: Option<&str>, identity: &UserIdentity) {
        let serialized = match serde_json::to_string(identity) {
            Ok(s) => s,
            Err(err) => {
                // Serialization of a plain struct cannot realistically fail,
                // but a half-written session must never be the fallback.
                tracing::error!("failed to serialize identity, session not persisted: {err}");
                return;
            }
        };

        let mut medium = self.medium.lock().unwrap_or_else(|e| e.into_inner());
        medium.put(ACCESS_TOKEN_KEY, access_token);
        match refresh_token {
            Some(token) => medium.put(REFRESH_TOKEN_KEY, token),
            None => medium.remove(REFRESH_TOKEN_KEY),
        }
        medium.put(USER_INFO_KEY, &serialized);
    }

    /// Replace only the access token, keeping refresh token and identity as
    /// stored. Used by the renewal path when the backend rotates nothing.
    pub fn set_access_token(&self, access_token: &str) {
        let mut medium = self.medium.lock().unwrap_or_else(|e| e.into_inner());
        medium.put(ACCESS_TOKEN_KEY, access_token);
    }

    /// Remove all entries. Idempotent: clearing an empty store does nothing.
    pub fn clear(&self) {
        let mut medium = self.medium.lock().unwrap_or_else(|e| e.into_inner());
        medium.remove(ACCESS_TOKEN_KEY);
        medium.remove(REFRESH_TOKEN_KEY);
        medium.remove(USER_INFO_KEY);
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never log token material.
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryMedium;

    fn identity(tenant: &str) -> UserIdentity {
        UserIdentity {
            id: 1,
            name: "Ana Souza".to_string(),
            email: "ana@petget.com".to_string(),
            role: "ADMIN".to_string(),
            tenant_id: TenantId::new(tenant),
            company_name: None,
            last_login_at: None,
        }
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = CredentialStore::new(MemoryMedium::new());
        store.set("t1", Some("r1"), &identity("tenant-a"));

        let session = store.get();
        assert_eq!(session.access_token.as_deref(), Some("t1"));
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
        assert!(session.is_authenticated());
        assert_eq!(session.tenant_id().unwrap().as_str(), "tenant-a");
    }

    #[test]
    fn set_without_refresh_token_removes_stale_entry() {
        let store = CredentialStore::new(MemoryMedium::new());
        store.set("t1", Some("r1"), &identity("tenant-a"));
        store.set("t2", None, &identity("tenant-a"));

        let session = store.get();
        assert_eq!(session.access_token.as_deref(), Some("t2"));
        assert_eq!(session.refresh_token, None);
    }

    #[test]
    fn clear_is_idempotent() {
        let store = CredentialStore::new(MemoryMedium::new());
        store.set("t1", Some("r1"), &identity("tenant-a"));

        store.clear();
        let after_once = store.get();
        store.clear();
        let after_twice = store.get();

        assert_eq!(after_once, Session::default());
        assert_eq!(after_once, after_twice);
        assert!(!after_twice.is_authenticated());
    }

    #[test]
    fn corrupt_identity_self_heals() {
        let mut medium = MemoryMedium::new();
        medium.put(ACCESS_TOKEN_KEY, "t1");
        medium.put(USER_INFO_KEY, "not json");
        let store = CredentialStore::new(medium);

        let session = store.get();
        assert!(session.identity.is_none());
        assert!(!session.is_authenticated());

        // The corrupt entry was deleted, not just skipped: a raw read of a
        // fresh snapshot finds nothing to re-trip over.
        let again = store.get();
        assert!(again.identity.is_none());
    }

    #[test]
    fn renewal_update_touches_only_access_token() {
        let store = CredentialStore::new(MemoryMedium::new());
        let original = identity("tenant-a");
        store.set("t1", Some("r1"), &original);

        store.set_access_token("t2");

        let session = store.get();
        assert_eq!(session.access_token.as_deref(), Some("t2"));
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
        assert_eq!(session.identity, Some(original));
    }

    #[test]
    fn detached_medium_makes_every_operation_a_noop() {
        let store = CredentialStore::new(crate::medium::DetachedMedium);
        store.set("t1", Some("r1"), &identity("tenant-a"));
        assert_eq!(store.get(), Session::default());
        store.clear();
        assert_eq!(store.get(), Session::default());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Set { token: String, refresh: Option<String> },
            SetAccessToken(String),
            Clear,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                ("[a-z0-9]{1,12}", proptest::option::of("[a-z0-9]{1,12}"))
                    .prop_map(|(token, refresh)| Op::Set { token, refresh }),
                "[a-z0-9]{1,12}".prop_map(Op::SetAccessToken),
                Just(Op::Clear),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// After any sequence of operations, a read observes either a
            /// fully-installed session, a fully-cleared one, or a cleared
            /// one plus a lone renewed token, never a torn `set`.
            #[test]
            fn reads_are_all_or_nothing(ops in proptest::collection::vec(op_strategy(), 1..24)) {
                let store = CredentialStore::new(MemoryMedium::new());
                let mut installed = false;

                for op in ops {
                    match op {
                        Op::Set { token, refresh } => {
                            store.set(&token, refresh.as_deref(), &identity("tenant-a"));
                            installed = true;

                            let s = store.get();
                            prop_assert_eq!(s.access_token.as_deref(), Some(token.as_str()));
                            prop_assert!(s.identity.is_some());
                            prop_assert!(s.is_authenticated());
                        }
                        Op::SetAccessToken(token) => {
                            store.set_access_token(&token);
                            let s = store.get();
                            prop_assert_eq!(s.access_token.as_deref(), Some(token.as_str()));
                            // Identity presence is unchanged by a token swap.
                            prop_assert_eq!(s.identity.is_some(), installed);
                        }
                        Op::Clear => {
                            store.clear();
                            installed = false;
                            prop_assert_eq!(store.get(), Session::default());
                        }
                    }
                }
            }

            /// Clearing twice is indistinguishable from clearing once.
            #[test]
            fn clear_is_idempotent_after_any_prefix(ops in proptest::collection::vec(op_strategy(), 0..16)) {
                let store = CredentialStore::new(MemoryMedium::new());
                for op in ops {
                    match op {
                        Op::Set { token, refresh } => {
                            store.set(&token, refresh.as_deref(), &identity("tenant-a"))
                        }
                        Op::SetAccessToken(token) => store.set_access_token(&token),
                        Op::Clear => store.clear(),
                    }
                }

                store.clear();
                let once = store.get();
                store.clear();
                let twice = store.get();

                prop_assert_eq!(&once, &Session::default());
                prop_assert_eq!(once, twice);
            }
        }
    }
}
