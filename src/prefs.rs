use std::sync::Arc;

use crate::error::Result;
use crate::storage::backend::StorageBackend;

/// The storage key the theme preference lives under. Must never collide
/// with the session record key.
pub const THEME_PREFERENCE_KEY: &str = "color-theme";

/// The plaintext preference record sharing the persistence layer with
/// the session vault.
///
/// Preferences are not secrets: values are written raw, never through
/// the envelope or the JSON serialization path the session record uses.
pub struct PreferenceStore {
    backend: Arc<dyn StorageBackend>,
}

impl PreferenceStore {
    /// Creates a new `PreferenceStore` over `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Persists the color theme.
    pub async fn save_theme(&self, theme: &str) -> Result<()> {
        self.backend.put(THEME_PREFERENCE_KEY, theme).await
    }

    /// Reads the color theme, `None` when never set.
    pub async fn load_theme(&self) -> Result<Option<String>> {
        self.backend.get(THEME_PREFERENCE_KEY).await
    }

    /// Clears the color theme. Idempotent.
    pub async fn clear_theme(&self) -> Result<()> {
        self.backend.delete(THEME_PREFERENCE_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SESSION_RECORD_KEY;

    #[test]
    fn preference_key_does_not_collide_with_the_session_key() {
        assert_ne!(THEME_PREFERENCE_KEY, SESSION_RECORD_KEY);
    }
}
