use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::BreathPhase;

/// Every state change in a session produces an Event.
/// The host renders them; a snapshot carries all derived view values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionResumed {
        remaining_secs: u64,
        /// True when this is the first start of a fresh countdown.
        first_activation: bool,
        at: DateTime<Utc>,
    },
    SessionPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionReset {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. The session keeps running.
    CountdownFinished {
        total_secs: u64,
        at: DateTime<Utc>,
    },
    BreathPhaseChanged {
        phase: BreathPhase,
        label: String,
        /// 1-based number of the cycle this phase belongs to.
        cycle: u32,
        at: DateTime<Utc>,
    },
    WelcomeSpoken {
        text: String,
        audible: bool,
        at: DateTime<Utc>,
    },
    PromptSpoken {
        index: usize,
        text: String,
        elapsed_secs: u64,
        /// False when muted or the speech service refused.
        audible: bool,
        at: DateTime<Utc>,
    },
    VolumeChanged {
        volume: f32,
        muted: bool,
        gain: f32,
        at: DateTime<Utc>,
    },
    SessionClosed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        session_id: Uuid,
        title: String,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        /// `MM:SS`
        remaining_display: String,
        /// 0.0 .. 1.0
        progress: f64,
        breath_phase: BreathPhase,
        breath_label: String,
        volume: f32,
        muted: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case name of the variant. Matches the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionResumed { .. } => "session_resumed",
            Event::SessionPaused { .. } => "session_paused",
            Event::SessionReset { .. } => "session_reset",
            Event::CountdownFinished { .. } => "countdown_finished",
            Event::BreathPhaseChanged { .. } => "breath_phase_changed",
            Event::WelcomeSpoken { .. } => "welcome_spoken",
            Event::PromptSpoken { .. } => "prompt_spoken",
            Event::VolumeChanged { .. } => "volume_changed",
            Event::SessionClosed { .. } => "session_closed",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(event: &Event) -> String {
        let value = serde_json::to_value(event).unwrap();
        value["type"].as_str().unwrap().to_string()
    }

    #[test]
    fn serialized_tag_matches_kind() {
        let at = Utc::now();
        let events = vec![
            Event::SessionResumed {
                remaining_secs: 600,
                first_activation: true,
                at,
            },
            Event::SessionPaused { remaining_secs: 590, at },
            Event::CountdownFinished { total_secs: 600, at },
            Event::BreathPhaseChanged {
                phase: BreathPhase::Hold,
                label: "Hold".into(),
                cycle: 2,
                at,
            },
            Event::PromptSpoken {
                index: 0,
                text: "Breathe".into(),
                elapsed_secs: 30,
                audible: false,
                at,
            },
            Event::SessionClosed { remaining_secs: 0, at },
        ];
        for event in &events {
            assert_eq!(tag(event), event.kind());
        }
    }

    #[test]
    fn snake_case_tag_deserializes() {
        let json = r#"{"type":"session_paused","remaining_secs":42,"at":"2024-01-01T00:00:00Z"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert!(matches!(event, Event::SessionPaused { remaining_secs: 42, .. }));
        assert!(serde_json::from_str::<Event>(&json.replace("session_paused", "SessionPaused")).is_err());
    }
}
