//! Rotating access credential for the AI proxy route.

use tokio::sync::RwLock;

use crate::store::{RealtimeStore, StoreError};
use crate::{Credential, UtcTimestamp};

const TOKEN_PATH_PREFIX: &str = "tokens";

/// Owns the process-wide "current credential" state.
///
/// Exactly one credential is current at a time. Rotation persists the new
/// value first, swaps the in-memory pointer, then best-effort deletes the
/// predecessor from the store; a failed delete is logged and never rolls
/// back the rotation.
pub struct TokenAuthority {
    store: RealtimeStore,
    current: RwLock<Option<Credential>>,
}

impl TokenAuthority {
    pub fn new(store: RealtimeStore) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    fn key_for(value: &str) -> String {
        format!("{TOKEN_PATH_PREFIX}/{value}")
    }

    /// Issue and persist a fresh credential, superseding the current one.
    pub async fn rotate(&self) -> Result<Credential, StoreError> {
        let value = fastrand::u32(100_000..=999_999).to_string();
        let credential = Credential::issue(value, UtcTimestamp::now())
            .expect("generated credential values are 6-digit numeric");

        self.store
            .set(&Self::key_for(&credential.value), &credential)
            .await?;

        let previous = {
            let mut slot = self.current.write().await;
            slot.replace(credential.clone())
        };

        if let Some(previous) = previous {
            if let Err(error) = self.store.remove(&Self::key_for(&previous.value)).await {
                tracing::warn!(%error, "failed to delete superseded credential");
            }
        }

        Ok(credential)
    }

    /// The in-memory current credential; `None` until the first rotation.
    pub async fn current(&self) -> Option<Credential> {
        self.current.read().await.clone()
    }

    /// Whether `candidate` names a credential that exists in the store.
    ///
    /// Empty or non-numeric candidates are rejected without a lookup; any
    /// lookup error also answers `false`.
    pub async fn authorize(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        if candidate.is_empty() || !candidate.chars().all(|ch| ch.is_ascii_digit()) {
            return false;
        }

        match self.store.get(&Self::key_for(candidate)).await {
            Ok(Some(value)) => serde_json::from_value::<Credential>(value).is_ok(),
            Ok(None) => false,
            Err(error) => {
                tracing::warn!(%error, "credential lookup failed");
                false
            }
        }
    }
}
