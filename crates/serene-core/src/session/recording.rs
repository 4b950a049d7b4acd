//! Backends that record calls instead of making sound.
//!
//! Used by headless hosts (simulated sessions) and tests to observe what
//! the engine asked of its audio and speech channels.

use std::sync::{Arc, Mutex};

use super::audio::AudioChannel;
use super::speech::{SpeechChannel, Utterance, Voice};
use crate::error::PlaybackError;

/// Handle onto a backend's call history that outlives the backend.
///
/// The engine owns its channels and `close` consumes the engine, so a
/// caller that needs to see teardown keeps a `CallLog` clone instead.
#[derive(Debug)]
pub struct CallLog<T>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for CallLog<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for CallLog<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T: Clone + PartialEq> CallLog<T> {
    fn push(&self, call: T) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(call);
    }

    pub fn calls(&self) -> Vec<T> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count(&self, call: &T) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Load { url: String, looping: bool },
    Play,
    Pause,
    Volume(f32),
    Stop,
}

#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    pub calls: Vec<AudioCall>,
    pub playing: bool,
    pub gain: f32,
    /// Make every `load`/`play` fail, as a sandboxed player would.
    pub fail: bool,
    log: CallLog<AudioCall>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self, call: &AudioCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Shared history of every call, still readable once the engine
    /// holding this backend is closed or dropped.
    pub fn log(&self) -> CallLog<AudioCall> {
        self.log.clone()
    }

    fn record(&mut self, call: AudioCall) {
        self.log.push(call.clone());
        self.calls.push(call);
    }
}

impl AudioChannel for RecordingAudio {
    fn load(&mut self, url: &str, looping: bool) -> Result<(), PlaybackError> {
        self.record(AudioCall::Load {
            url: url.to_string(),
            looping,
        });
        if self.fail {
            return Err(PlaybackError::Failed("load refused".into()));
        }
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.record(AudioCall::Play);
        if self.fail {
            return Err(PlaybackError::Failed("autoplay blocked".into()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.record(AudioCall::Pause);
        self.playing = false;
    }

    fn set_volume(&mut self, gain: f32) {
        self.record(AudioCall::Volume(gain));
        self.gain = gain;
    }

    fn stop(&mut self) {
        self.record(AudioCall::Stop);
        self.playing = false;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpeechCall {
    Speak(String),
    Cancel,
}

#[derive(Debug, Default, Clone)]
pub struct RecordingSpeech {
    pub voices: Vec<Voice>,
    /// Every utterance handed to `speak`, in order.
    pub spoken: Vec<Utterance>,
    pub cancels: usize,
    /// The utterance that would currently be audible.
    pub current: Option<Utterance>,
    pub fail: bool,
    log: CallLog<SpeechCall>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.spoken.iter().map(|u| u.text.as_str()).collect()
    }

    pub fn log(&self) -> CallLog<SpeechCall> {
        self.log.clone()
    }
}

impl SpeechChannel for RecordingSpeech {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), PlaybackError> {
        if self.fail {
            return Err(PlaybackError::Unsupported("speech synthesis"));
        }
        self.log.push(SpeechCall::Speak(utterance.text.clone()));
        self.current = Some(utterance.clone());
        self.spoken.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        self.log.push(SpeechCall::Cancel);
        self.cancels += 1;
        self.current = None;
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(current) = self.current.as_mut() {
            current.volume = volume;
        }
    }
}
