use log::warn;

use crate::errors::CoreError;
use crate::models::settings::Settings;

use super::traits::KeyValueStore;

/// Store key of the JSON-encoded [`Settings`].
pub const SETTINGS_KEY: &str = "stack_settings";

/// Read settings, falling back to defaults when absent or unreadable.
pub fn load_settings<S: KeyValueStore + ?Sized>(store: &S) -> Settings {
    match store.get(SETTINGS_KEY) {
        Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("stored settings are unreadable, using defaults: {e}");
            Settings::default()
        }),
        Ok(None) => Settings::default(),
        Err(e) => {
            warn!("failed to read settings, using defaults: {e}");
            Settings::default()
        }
    }
}

pub fn save_settings<S: KeyValueStore + ?Sized>(
    store: &mut S,
    settings: &Settings,
) -> Result<(), CoreError> {
    let bytes = serde_json::to_vec(settings)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))?;
    store.set(SETTINGS_KEY, &bytes)
}
