// # Memory Preferences Store
//
// In-memory implementation of PreferencesStore.
//
// ## When to Use
//
// - Testing environments
// - Embedding the updater where preferences are managed elsewhere and the
//   caller picks up the new value from [`MemoryPreferencesStore::preferences`]

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::preferences::{Preferences, keys};
use crate::traits::PreferencesStore;

/// In-memory preferences store
///
/// Clones share the same underlying preferences.
///
/// # Example
///
/// ```rust,no_run
/// use v6access_core::preferences::Preferences;
/// use v6access_core::state::MemoryPreferencesStore;
/// use v6access_core::traits::PreferencesStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let preferences: Preferences = [("customConnections", "")].into_iter().collect();
///     let store = MemoryPreferencesStore::new("1142ed040a27acc36ea876e8362b28464c3d240d", preferences);
///
///     store.update_custom_connections("http://example.com:32400").await?;
///     assert_eq!(store.write_count().await, 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryPreferencesStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Debug)]
struct MemoryState {
    identifier: String,
    preferences: Preferences,
    writes: usize,
}

impl MemoryPreferencesStore {
    /// Create a store for the device registered under `identifier`
    pub fn new(identifier: impl Into<String>, preferences: Preferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryState {
                identifier: identifier.into(),
                preferences,
                writes: 0,
            })),
        }
    }

    /// Snapshot of the current preferences
    pub async fn preferences(&self) -> Preferences {
        self.inner.read().await.preferences.clone()
    }

    /// Number of successful `update_custom_connections` calls
    pub async fn write_count(&self) -> usize {
        self.inner.read().await.writes
    }
}

#[async_trait]
impl PreferencesStore for MemoryPreferencesStore {
    async fn device_identifier(&self) -> Result<String, Error> {
        Ok(self.inner.read().await.identifier.clone())
    }

    async fn fetch_preferences(&self) -> Result<Preferences, Error> {
        Ok(self.inner.read().await.preferences.clone())
    }

    async fn update_custom_connections(&self, value: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.preferences.insert(keys::CUSTOM_CONNECTIONS, value);
        guard.writes += 1;
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
