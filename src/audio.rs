//! Sound cue mapping
//!
//! Turns [`GameEvent`]s into sound cues and hands them to a backend. Playback
//! itself belongs to the host; [`LogBackend`] is the headless stand-in.

use crate::settings::Settings;
use crate::sim::{CollapseReason, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Piece placed on the tower
    Build,
    /// Golden placement
    Gold,
    /// Piece dropped past the tower, or toppled off it
    Fall,
    /// Game over
    Over,
    /// New high score
    HighScore,
}

impl SoundEffect {
    /// Cue for a core event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Placed { golden: true, .. } => Some(SoundEffect::Gold),
            GameEvent::Placed { golden: false, .. } => Some(SoundEffect::Build),
            GameEvent::Missed { .. }
            | GameEvent::Collapsed {
                reason: CollapseReason::Offset,
            } => Some(SoundEffect::Fall),
            // The tower leaning over is voiced by the game over cue alone
            GameEvent::Collapsed {
                reason: CollapseReason::WidthOverrun,
            } => None,
            GameEvent::GameOver { .. } => Some(SoundEffect::Over),
            GameEvent::NewHighScore { .. } => Some(SoundEffect::HighScore),
            GameEvent::Truncated { .. } => None,
        }
    }

    /// Asset name used by the host's sound bank
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Build => "build",
            SoundEffect::Gold => "gold",
            SoundEffect::Fall => "fall",
            SoundEffect::Over => "over",
            SoundEffect::HighScore => "highscore",
        }
    }
}

/// Something that can actually make noise
pub trait AudioBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Backend that only logs cues
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sound {} at {:.2}", effect.name(), volume);
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Build a manager that follows the player's settings
    pub fn from_settings(backend: B, settings: &Settings) -> Self {
        let mut audio = Self::new(backend);
        audio.apply_settings(settings);
        audio
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(!settings.sound_enabled);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.backend.play(effect, vol);
    }

    /// Play whatever cue an event maps to
    pub fn handle_event(&mut self, event: &GameEvent) {
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
