//! Player preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::highscores::validate_player_name;
use crate::tuning::{Difficulty, Tuning};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Selected difficulty mode
    pub difficulty: Difficulty,
    /// Name entered at the last game over, reused for later runs
    #[serde(default)]
    pub player_name: Option<String>,
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "jungle_jump_settings";

    pub fn tuning(&self) -> Tuning {
        self.difficulty.tuning()
    }

    /// Backend collection for the selected mode's leaderboard
    pub fn collection(&self) -> &'static str {
        self.difficulty.collection()
    }

    /// Remember a name if it is valid; returns whether it was kept
    pub fn remember_name(&mut self, name: &str) -> bool {
        if validate_player_name(name).is_err() {
            return false;
        }
        self.player_name = Some(name.to_string());
        true
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
