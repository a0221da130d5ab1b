//! Player preferences
//!
//! Persisted separately from the profile. Nothing in here reaches the
//! simulation.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Sound effects on/off
    pub sound_enabled: bool,
    /// Background music on/off
    pub music_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no wobble sway, no scroll easing)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "settings";

    /// Effective sound effect volume (respects the toggle)
    pub fn effective_sfx_volume(&self) -> f32 {
        if !self.sound_enabled {
            return 0.0;
        }
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Effective music volume (respects the toggle)
    pub fn effective_music_volume(&self) -> f32 {
        if !self.music_enabled {
            return 0.0;
        }
        (self.master_volume * self.music_volume).clamp(0.0, 1.0)
    }

    /// Effective wobble sway for a renderer (respects reduced_motion)
    pub fn effective_wobble(&self, wobble_offset: f32) -> f32 {
        if self.reduced_motion { 0.0 } else { wobble_offset }
    }

    /// Mute or unmute background music
    pub fn toggle_music(&mut self) {
        self.music_enabled = !self.music_enabled;
    }

    /// Mute or unmute sound effects
    pub fn toggle_sfx(&mut self) {
        self.sound_enabled = !self.sound_enabled;
    }

    /// Pull volumes back into range after loading hand-edited data
    fn sanitize(&mut self) {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
    }

    /// Load settings, or defaults
    pub fn load(storage: &dyn Storage) -> Self {
        let mut settings: Self = persistence::load_or_default(storage, Self::STORAGE_KEY);
        settings.sanitize();
        settings
    }

    /// Save settings; failures are logged
    pub fn save(&self, storage: &mut dyn Storage) {
        match persistence::save_json(storage, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Settings not saved: {:#}", e),
        }
    }
}
