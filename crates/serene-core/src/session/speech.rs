//! Voice synthesis capability and voice selection.

use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

/// A voice offered by the synthesis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    /// BCP 47 tag, e.g. "en-GB".
    pub lang: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    fn is_english(&self) -> bool {
        self.lang.contains("en")
    }
}

/// One speech request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// `None` uses the service default.
    pub voice: Option<Voice>,
}

/// A speech-synthesis service.
///
/// At most one utterance is audible at a time: the engine calls
/// [`SpeechChannel::cancel`] before every [`SpeechChannel::speak`].
pub trait SpeechChannel {
    fn voices(&self) -> Vec<Voice>;

    /// Queue `utterance`; returns without waiting for it to finish.
    fn speak(&mut self, utterance: Utterance) -> Result<(), PlaybackError>;

    /// Silence whatever is playing or pending.
    fn cancel(&mut self);

    /// Adjust the volume of the utterance in flight, if any.
    fn set_volume(&mut self, volume: f32);
}

/// Delivery settings for spoken prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default = "default_rate")]
    pub rate: f32,
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    /// Voice names tried first, in order.
    #[serde(default = "default_preferred_voices")]
    pub preferred_voices: Vec<String>,
}

fn default_rate() -> f32 {
    0.7
}
fn default_pitch() -> f32 {
    0.9
}
fn default_preferred_voices() -> Vec<String> {
    ["Samantha", "Karen", "Victoria", "Google UK English Female"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: default_rate(),
            pitch: default_pitch(),
            preferred_voices: default_preferred_voices(),
        }
    }
}

/// Pick a soft English voice.
///
/// Order of preference: a voice whose name contains one of `preferred`,
/// an English voice with "female" in its name, any English voice, and
/// finally `None` for the service default.
pub fn select_voice(voices: &[Voice], preferred: &[String]) -> Option<Voice> {
    voices
        .iter()
        .find(|v| {
            preferred.iter().any(|p| v.name.contains(p.as_str()))
                || (v.is_english() && v.name.to_lowercase().contains("female"))
        })
        .or_else(|| voices.iter().find(|v| v.is_english()))
        .cloned()
}

/// Backend for environments without speech synthesis.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeech;

impl SpeechChannel for NullSpeech {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&mut self, _utterance: Utterance) -> Result<(), PlaybackError> {
        Err(PlaybackError::Unsupported("speech synthesis"))
    }

    fn cancel(&mut self) {}

    fn set_volume(&mut self, _volume: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: Option<Voice>) -> Option<String> {
        v.map(|v| v.name)
    }

    #[test]
    fn prefers_named_voice() {
        let voices = vec![
            Voice::new("Daniel", "en-GB"),
            Voice::new("Karen", "en-AU"),
        ];
        let pick = select_voice(&voices, &VoiceSettings::default().preferred_voices);
        assert_eq!(names(pick).as_deref(), Some("Karen"));
    }

    #[test]
    fn falls_back_to_english_female_then_any_english() {
        let prefs = VoiceSettings::default().preferred_voices;
        let voices = vec![
            Voice::new("Thomas", "fr-FR"),
            Voice::new("Alex", "en-US"),
            Voice::new("Generic Female", "en-US"),
        ];
        assert_eq!(names(select_voice(&voices, &prefs)).as_deref(), Some("Generic Female"));

        let voices = vec![Voice::new("Thomas", "fr-FR"), Voice::new("Alex", "en-US")];
        assert_eq!(names(select_voice(&voices, &prefs)).as_deref(), Some("Alex"));
    }

    #[test]
    fn no_english_voice_uses_default() {
        let voices = vec![Voice::new("Anna", "de-DE")];
        assert!(select_voice(&voices, &[]).is_none());
        assert!(select_voice(&[], &[]).is_none());
    }

    #[test]
    fn french_female_is_not_preferred() {
        let voices = vec![Voice::new("Female Amelie", "fr-CA"), Voice::new("Alex", "en-US")];
        assert_eq!(names(select_voice(&voices, &[])).as_deref(), Some("Alex"));
    }
}
