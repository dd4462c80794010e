use std::sync::Arc;

use crate::database::KeyValueStore;
use crate::error::Result;
use crate::models::settings::Theme;

pub const API_KEY_KEY: &str = "gemini-api-key";
pub const THEME_KEY: &str = "theme";

/// Locally persisted user preferences: the API key and the theme.
#[derive(Clone)]
pub struct PreferencesService {
    store: Arc<dyn KeyValueStore>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn api_key(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(API_KEY_KEY)
            .await?
            .filter(|key| !key.trim().is_empty()))
    }

    pub async fn save_api_key(&self, api_key: &str) -> Result<()> {
        self.store.set(API_KEY_KEY, api_key).await
    }

    /// Stored theme; dark when unset or unrecognized.
    pub async fn theme(&self) -> Result<Theme> {
        let stored = self.store.get(THEME_KEY).await?;
        Ok(stored
            .and_then(|raw| raw.parse::<Theme>().ok())
            .unwrap_or_default())
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str()).await
    }

    pub async fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme().await?.toggled();
        self.set_theme(next).await?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn theme_defaults_to_dark_and_toggles() {
        let store = Arc::new(MemoryStore::new());
        let prefs = PreferencesService::new(store.clone());
        assert_eq!(prefs.theme().await.unwrap(), Theme::Dark);

        assert_eq!(prefs.toggle_theme().await.unwrap(), Theme::Light);
        assert_eq!(store.get(THEME_KEY).await.unwrap().as_deref(), Some("light"));
        assert_eq!(prefs.toggle_theme().await.unwrap(), Theme::Dark);

        store.set(THEME_KEY, "sepia").await.unwrap();
        assert_eq!(prefs.theme().await.unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn api_key_round_trips() {
        let prefs = PreferencesService::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.api_key().await.unwrap(), None);
        prefs.save_api_key("AIza-test").await.unwrap();
        assert_eq!(prefs.api_key().await.unwrap().as_deref(), Some("AIza-test"));
        prefs.save_api_key("  ").await.unwrap();
        assert_eq!(prefs.api_key().await.unwrap(), None);
    }
}
