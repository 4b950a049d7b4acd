//! 21-day trauma release journey with local progress tracking.
//!
//! Days unlock in order. Progress is stored as `journey.json` in the data
//! directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ValidationError};
use crate::session::SessionConfig;
use crate::storage::{data_dir, read_json, write_json};

pub const TOTAL_DAYS: u32 = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JourneyDay {
    pub day: u32,
    pub title: &'static str,
    pub description: &'static str,
}

const fn day(day: u32, title: &'static str, description: &'static str) -> JourneyDay {
    JourneyDay {
        day,
        title,
        description,
    }
}

pub const JOURNEY_DAYS: [JourneyDay; TOTAL_DAYS as usize] = [
    day(1, "Acknowledging Your Journey", "Begin by honoring where you are and setting your intention for healing."),
    day(2, "Creating Safety", "Establish inner resources and a sense of safety within your body."),
    day(3, "Grounding Practice", "Learn grounding techniques to stay present during emotional moments."),
    day(4, "Breath as Anchor", "Discover how conscious breathing can regulate your nervous system."),
    day(5, "Recognizing Patterns", "Gently explore recurring emotional patterns without judgment."),
    day(6, "The Body Remembers", "Understanding how trauma is stored in the body."),
    day(7, "Week One Reflection", "Integrate the first week's learnings with a compassionate reflection."),
    day(8, "Inner Child Connection", "Begin the gentle process of connecting with your younger self."),
    day(9, "Naming Your Emotions", "Practice identifying and naming emotions without being overwhelmed."),
    day(10, "Boundaries as Self-Care", "Explore how healthy boundaries support your healing journey."),
    day(11, "Releasing Shame", "Work through shame with compassion and understanding."),
    day(12, "Forgiveness Practice", "Explore forgiveness, not for others, but for your own freedom."),
    day(13, "Movement & Release", "Use gentle movement to release stored tension and energy."),
    day(14, "Week Two Integration", "Celebrate your progress and prepare for deeper work ahead."),
    day(15, "Meeting Your Protectors", "Understand the parts of you that developed to keep you safe."),
    day(16, "Grief & Loss", "Create space for grieving what was lost or never had."),
    day(17, "Rewiring Beliefs", "Identify and gently challenge limiting beliefs from the past."),
    day(18, "Self-Compassion Practice", "Deepen your capacity for self-love and acceptance."),
    day(19, "Connecting with Others", "Explore how healing impacts your relationships."),
    day(20, "Your Future Self", "Visualize and connect with your healed, whole self."),
    day(21, "Celebration & Continuation", "Honor your journey and create a plan for ongoing healing."),
];

/// Suggested practice length for a journey day, in minutes.
pub const PRACTICE_MINUTES: u64 = 15;

impl JourneyDay {
    /// Session for the day's practice, titled after the day.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::from_minutes(PRACTICE_MINUTES, format!("Day {}: {}", self.day, self.title))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Completed,
    Current,
    Locked,
}

/// The user's place in the journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyProgress {
    /// Day currently unlocked for practice. `TOTAL_DAYS + 1` once the
    /// last day is marked complete.
    current_day: u32,
}

impl JourneyProgress {
    pub fn new() -> Self {
        Self { current_day: 1 }
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    pub fn status(&self, day: u32) -> DayStatus {
        if day < self.current_day {
            DayStatus::Completed
        } else if day == self.current_day {
            DayStatus::Current
        } else {
            DayStatus::Locked
        }
    }

    /// Open a day for practice. Locked and unknown days are refused.
    pub fn select(&self, day: u32) -> Result<&'static JourneyDay, ValidationError> {
        let entry = lookup(day)?;
        if self.status(day) == DayStatus::Locked {
            return Err(ValidationError::DayLocked {
                day,
                current: self.current_day,
            });
        }
        Ok(entry)
    }

    /// Unlock the day after `day`. Completing an earlier day again never
    /// moves progress backwards.
    pub fn mark_complete(&mut self, day: u32) -> Result<(), ValidationError> {
        self.select(day)?;
        self.current_day = self.current_day.max(day + 1).min(TOTAL_DAYS + 1);
        Ok(())
    }

    /// 0.0 .. 100.0
    pub fn progress_pct(&self) -> f64 {
        (self.current_day as f64 / TOTAL_DAYS as f64 * 100.0).min(100.0)
    }

    pub fn days_remaining(&self) -> u32 {
        TOTAL_DAYS.saturating_sub(self.current_day)
    }

    pub fn is_finished(&self) -> bool {
        self.current_day >= TOTAL_DAYS
    }

    /// Status line shown under the progress bar.
    pub fn summary(&self) -> String {
        if self.is_finished() {
            "Congratulations! You've completed the journey!".to_string()
        } else {
            format!("{} days remaining in your journey", self.days_remaining())
        }
    }

    pub fn days(&self) -> impl Iterator<Item = (&'static JourneyDay, DayStatus)> + '_ {
        JOURNEY_DAYS.iter().map(move |d| (d, self.status(d.day)))
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("journey.json"))
    }

    /// Load saved progress, starting fresh if nothing is stored.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let progress: Option<Self> = read_json(path)?;
        Ok(progress.map(Self::sanitized).unwrap_or_default())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    /// Clamp a hand-edited file back into range.
    fn sanitized(self) -> Self {
        Self {
            current_day: self.current_day.clamp(1, TOTAL_DAYS + 1),
        }
    }
}

impl Default for JourneyProgress {
    fn default() -> Self {
        Self::new()
    }
}

pub fn lookup(day: u32) -> Result<&'static JourneyDay, ValidationError> {
    JOURNEY_DAYS
        .iter()
        .find(|d| d.day == day)
        .ok_or_else(|| ValidationError::OutOfBounds {
            collection: "journey days".to_string(),
            index: day as usize,
            len: JOURNEY_DAYS.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_journey_starts_at_day_one() {
        let p = JourneyProgress::new();
        assert_eq!(p.status(1), DayStatus::Current);
        assert_eq!(p.status(2), DayStatus::Locked);
        assert_eq!(p.days_remaining(), 20);
        assert_eq!(p.summary(), "20 days remaining in your journey");
    }

    #[test]
    fn locked_and_unknown_days_cannot_be_selected() {
        let p = JourneyProgress::new();
        assert!(p.select(1).is_ok());
        assert_eq!(
            p.select(3),
            Err(ValidationError::DayLocked { day: 3, current: 1 })
        );
        assert!(matches!(p.select(0), Err(ValidationError::OutOfBounds { .. })));
        assert!(matches!(p.select(22), Err(ValidationError::OutOfBounds { .. })));
    }

    #[test]
    fn completing_a_day_unlocks_the_next() {
        let mut p = JourneyProgress::new();
        p.mark_complete(1).unwrap();
        p.mark_complete(2).unwrap();
        assert_eq!(p.current_day(), 3);
        assert_eq!(p.status(1), DayStatus::Completed);
        assert_eq!(p.status(3), DayStatus::Current);

        p.mark_complete(1).unwrap();
        assert_eq!(p.current_day(), 3);
    }

    #[test]
    fn finishing_caps_progress() {
        let mut p = JourneyProgress::new();
        for d in 1..=TOTAL_DAYS {
            p.mark_complete(d).unwrap();
        }
        assert_eq!(p.current_day(), TOTAL_DAYS + 1);
        assert_eq!(p.progress_pct(), 100.0);
        assert_eq!(p.days_remaining(), 0);
        assert!(p.is_finished());
        assert_eq!(p.status(TOTAL_DAYS), DayStatus::Completed);
    }

    #[test]
    fn day_practice_session_is_titled() {
        let config = lookup(4).unwrap().session_config();
        assert_eq!(config.title(), "Day 4: Breath as Anchor");
        assert_eq!(config.total_secs(), PRACTICE_MINUTES * 60);
    }

    #[test]
    fn days_lists_all_with_status() {
        let p = JourneyProgress::new();
        let statuses: Vec<DayStatus> = p.days().map(|(_, s)| s).collect();
        assert_eq!(statuses.len(), 21);
        assert_eq!(statuses.iter().filter(|s| **s == DayStatus::Locked).count(), 20);
    }

    #[test]
    fn progress_roundtrips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journey.json");
        assert_eq!(JourneyProgress::load_from(&path).unwrap(), JourneyProgress::new());

        let mut p = JourneyProgress::new();
        p.mark_complete(1).unwrap();
        p.save_to(&path).unwrap();
        assert_eq!(JourneyProgress::load_from(&path).unwrap().current_day(), 2);
    }

    #[test]
    fn out_of_range_file_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journey.json");
        std::fs::write(&path, r#"{"current_day": 99}"#).unwrap();
        assert_eq!(JourneyProgress::load_from(&path).unwrap().current_day(), 22);
    }
}
