//! Built-in guided meditations.

use serde::Serialize;

use crate::error::ValidationError;
use crate::session::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meditation {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    /// Display label, e.g. "10 min".
    pub duration: &'static str,
    pub category: &'static str,
}

pub const MEDITATIONS: [Meditation; 6] = [
    Meditation {
        id: 1,
        title: "Morning Calm",
        description: "Start your day with clarity and intention through this gentle awakening meditation.",
        duration: "10 min",
        category: "Morning",
    },
    Meditation {
        id: 2,
        title: "Stress Relief",
        description: "Release tension and find peace with this soothing guided breathing exercise.",
        duration: "15 min",
        category: "Stress",
    },
    Meditation {
        id: 3,
        title: "Deep Focus",
        description: "Enhance concentration and mental clarity for work or creative pursuits.",
        duration: "20 min",
        category: "Focus",
    },
    Meditation {
        id: 4,
        title: "Body Scan",
        description: "A gentle journey through your body to release physical tension and stress.",
        duration: "25 min",
        category: "Relaxation",
    },
    Meditation {
        id: 5,
        title: "Loving Kindness",
        description: "Cultivate compassion for yourself and others with this heart-opening practice.",
        duration: "15 min",
        category: "Compassion",
    },
    Meditation {
        id: 6,
        title: "Sleep Journey",
        description: "Drift into peaceful slumber with this calming bedtime meditation.",
        duration: "30 min",
        category: "Sleep",
    },
];

pub fn all() -> &'static [Meditation] {
    &MEDITATIONS
}

pub fn find(id: u32) -> Option<&'static Meditation> {
    MEDITATIONS.iter().find(|m| m.id == id)
}

impl Meditation {
    /// Minutes parsed from the "N min" label.
    pub fn duration_minutes(&self) -> Result<u64, ValidationError> {
        parse_minutes(self.duration)
    }

    pub fn session_config(&self) -> Result<SessionConfig, ValidationError> {
        SessionConfig::from_minutes(self.duration_minutes()?, self.title)
    }
}

/// Parse a "N min" duration label.
pub fn parse_minutes(label: &str) -> Result<u64, ValidationError> {
    label
        .trim()
        .trim_end_matches("min")
        .trim()
        .parse::<u64>()
        .map_err(|e| ValidationError::InvalidValue {
            field: "duration".to_string(),
            message: format!("'{label}': {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_entries_with_unique_ids() {
        let mut ids: Vec<u32> = all().iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn durations_parse() {
        let minutes: Vec<u64> = all().iter().map(|m| m.duration_minutes().unwrap()).collect();
        assert_eq!(minutes, vec![10, 15, 20, 25, 15, 30]);
        assert_eq!(parse_minutes(" 7 min ").unwrap(), 7);
        assert!(parse_minutes("ten min").is_err());
    }

    #[test]
    fn entry_converts_to_session_config() {
        let config = find(1).unwrap().session_config().unwrap();
        assert_eq!(config.total_secs(), 600);
        assert_eq!(config.title(), "Morning Calm");
        assert!(find(99).is_none());
    }

    #[test]
    fn zero_minute_label_is_rejected_as_session() {
        let m = Meditation {
            duration: "0 min",
            ..MEDITATIONS[0]
        };
        assert_eq!(m.session_config(), Err(ValidationError::ZeroDuration));
    }
}
