use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::models::Identity;
use crate::session::SessionManager;
use crate::store::{get_json, set_json, settings_key, KeyValueStore};
use crate::theme::Theme;

/// Scopes the settings panel offers on top of the base login scopes
pub const OPTIONAL_SCOPES: [&str; 1] = ["gist"];

/// Per-identity preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_notifications: bool,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub additional_scopes: BTreeSet<String>,
}

/// Loads and saves the settings of one identity
pub struct SettingsPanel<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> SettingsPanel<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Stored settings, or defaults. A blank display name falls back to the
    /// identity's name or login.
    pub fn load(&self, identity: &Identity) -> Result<Settings> {
        let mut settings: Settings =
            get_json(self.store, &settings_key(identity.id))?.unwrap_or_default();
        if settings.display_name.trim().is_empty() {
            settings.display_name = identity.display_name().to_string();
        }
        Ok(settings)
    }

    pub fn save(&self, identity: &Identity, settings: &Settings) -> Result<()> {
        let mut settings = settings.clone();
        settings.display_name = settings.display_name.trim().to_string();
        set_json(self.store, &settings_key(identity.id), &settings)?;
        tracing::info!(identity = identity.id, "settings saved");
        Ok(())
    }

    /// Remove the identity's settings and end the session
    pub fn disconnect(&self, identity: &Identity, session: &SessionManager<'_>) -> Result<()> {
        self.store.remove(&settings_key(identity.id))?;
        session.logout()
    }
}
