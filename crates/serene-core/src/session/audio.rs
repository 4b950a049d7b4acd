//! Ambient audio capability.
//!
//! The engine owns one [`AudioChannel`] per session and never touches a
//! process-wide player. Availability is not guaranteed: a backend may
//! fail any call, and the engine only logs it.

use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

/// Looping ambient track played during sessions.
pub const AMBIENT_MUSIC_URL: &str = "https://cdn.pixabay.com/audio/2022/03/10/audio_4dedf5bf94.mp3";

/// Volume a new session starts at.
pub const DEFAULT_VOLUME: f32 = 0.3;

/// A single playable audio resource.
pub trait AudioChannel {
    /// Bind the channel to `url`. Called once per session.
    fn load(&mut self, url: &str, looping: bool) -> Result<(), PlaybackError>;

    /// Start or resume playback. May complete asynchronously.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Apply an effective gain in 0.0..=1.0.
    fn set_volume(&mut self, gain: f32);

    /// Stop and release the resource.
    fn stop(&mut self);
}

/// Mixer state the engine tracks for its channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioState {
    /// Last volume the user chose, kept while muted.
    pub volume: f32,
    pub muted: bool,
    pub playing: bool,
}

impl AudioState {
    pub fn new(volume: f32) -> Self {
        Self {
            volume: clamp_unit(volume),
            muted: false,
            playing: false,
        }
    }

    /// Gain actually applied to the ambient track.
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// Gain for spoken prompts: louder than the music, never above 1.
    pub fn speech_gain(&self) -> f32 {
        (self.gain() * 1.5).min(1.0)
    }
}

impl Default for AudioState {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

/// Clamp into 0.0..=1.0, mapping NaN to silence.
pub fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Backend for environments without audio output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioChannel for NullAudio {
    fn load(&mut self, _url: &str, _looping: bool) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unsupported("audio"))
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unsupported("audio"))
    }

    fn pause(&mut self) {}

    fn set_volume(&mut self, _gain: f32) {}

    fn stop(&mut self) {}
}
