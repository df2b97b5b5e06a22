use log::warn;
use serde::{ Deserialize, Serialize };

use super::store::{ PrefStore, StoreError };

/// Storage key of the persisted settings blob. The suffix is bumped when
/// the shape changes so stale blobs fall back to defaults instead of
/// half-parsing.
pub const SETTINGS_KEY: &str = "chat.settings.v2";

/// Storage key of the theme preference.
pub const THEME_KEY: &str = "chat.theme";

/// Policy for getting the system instruction in front of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendMode {
    /// Pin the instruction into the conversation when settings are saved.
    OnSave,
    /// Prepend the instruction to every outbound request, never persisting
    /// it into the conversation.
    EachMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub system_prompt: String,
    pub send_mode: SendMode,
    pub temperature: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            system_prompt: String::new(),
            send_mode: SendMode::EachMessage,
            temperature: 0.3,
        }
    }
}

impl Settings {
    /// Load persisted settings, merging stored fields over the defaults.
    /// A missing or corrupt blob falls back to defaults entirely.
    pub fn load(store: &PrefStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Some(blob) =>
                match serde_json::from_str(blob) {
                    Ok(settings) => settings,
                    Err(err) => {
                        warn!("discarding corrupt settings blob: {}", err);
                        Settings::default()
                    }
                }
            None => Settings::default(),
        }
    }

    pub fn save(&self, store: &mut PrefStore) -> Result<(), StoreError> {
        let blob = serde_json::to_string(self)?;
        store.set(SETTINGS_KEY, blob)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Anything but an explicit "light" is the dark default.
    pub fn load(store: &PrefStore) -> Self {
        match store.get(THEME_KEY) {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn save(self, store: &mut PrefStore) -> Result<(), StoreError> {
        store.set(THEME_KEY, self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> PrefStore {
        PrefStore::open(dir.path().join("prefs.json"))
    }

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&store_in(&dir));
        assert_eq!(settings.send_mode, SendMode::EachMessage);
        assert_eq!(settings.temperature, 0.3);
        assert!(settings.system_prompt.is_empty());
    }

    #[test]
    fn corrupt_settings_fall_back_to_defaults_entirely() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set(SETTINGS_KEY, "{not json").unwrap();

        let settings = Settings::load(&store);
        assert_eq!(settings.temperature, 0.3);
    }

    #[test]
    fn stored_fields_merge_over_defaults() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        store.set(SETTINGS_KEY, r#"{"send_mode":"on_save"}"#).unwrap();

        let settings = Settings::load(&store);
        assert_eq!(settings.send_mode, SendMode::OnSave);
        assert_eq!(settings.temperature, 0.3);
    }

    #[test]
    fn settings_survive_a_save_load_cycle() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        let settings = Settings {
            system_prompt: "be brief".to_string(),
            send_mode: SendMode::OnSave,
            temperature: 0.7,
        };
        settings.save(&mut store).unwrap();

        let reloaded = Settings::load(&PrefStore::open(dir.path().join("prefs.json")));
        assert_eq!(reloaded.system_prompt, "be brief");
        assert_eq!(reloaded.send_mode, SendMode::OnSave);
        assert_eq!(reloaded.temperature, 0.7);
    }

    #[test]
    fn theme_defaults_to_dark_and_toggles() {
        let dir = tempdir().unwrap();
        let mut store = store_in(&dir);
        assert_eq!(Theme::load(&store), Theme::Dark);

        Theme::Dark.toggled().save(&mut store).unwrap();
        assert_eq!(Theme::load(&store), Theme::Light);
    }
}
