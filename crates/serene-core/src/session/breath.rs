use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One step of the breathing guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathPhase {
    Rest,
    Inhale,
    Hold,
    Exhale,
}

impl BreathPhase {
    /// Text shown under the countdown.
    pub fn label(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Breathe in...",
            BreathPhase::Hold => "Hold...",
            BreathPhase::Exhale => "Breathe out...",
            BreathPhase::Rest => "Ready when you are",
        }
    }
}

/// Full length of one inhale/hold/exhale/rest cycle.
pub const CYCLE: Duration = Duration::from_secs(12);

/// Phase transitions within a cycle, as offsets from cycle start.
///
/// Inhale 4s, hold 3s, exhale 4s, rest 1s.
pub const PHASE_OFFSETS: [(Duration, BreathPhase); 4] = [
    (Duration::from_secs(0), BreathPhase::Inhale),
    (Duration::from_secs(4), BreathPhase::Hold),
    (Duration::from_secs(7), BreathPhase::Exhale),
    (Duration::from_secs(11), BreathPhase::Rest),
];

/// Breathing guide state.
///
/// Only records what phase is showing and how many cycles have run; the
/// engine owns the timers that drive it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathCycle {
    phase: BreathPhase,
    /// Virtual time at which the current cycle began.
    cycle_started_at: Option<Duration>,
    cycles_started: u32,
    cycles_completed: u32,
}

impl BreathCycle {
    pub fn new() -> Self {
        Self {
            phase: BreathPhase::Rest,
            cycle_started_at: None,
            cycles_started: 0,
            cycles_completed: 0,
        }
    }

    pub fn phase(&self) -> BreathPhase {
        self.phase
    }

    pub fn cycle_started_at(&self) -> Option<Duration> {
        self.cycle_started_at
    }

    /// Cycles entered since the session was created.
    pub fn cycles_started(&self) -> u32 {
        self.cycles_started
    }

    /// Cycles that ran their full 12 seconds without interruption.
    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    /// Begin a fresh cycle at `now`. `previous_finished` is set when the
    /// prior cycle ran to its end rather than being cut short.
    pub(crate) fn begin(&mut self, now: Duration, previous_finished: bool) {
        if previous_finished {
            self.cycles_completed += 1;
        }
        self.cycles_started += 1;
        self.cycle_started_at = Some(now);
        self.phase = BreathPhase::Inhale;
    }

    /// Returns true if the phase actually changed.
    pub(crate) fn set_phase(&mut self, phase: BreathPhase) -> bool {
        let changed = self.phase != phase;
        self.phase = phase;
        changed
    }

    /// Stop guiding; the display falls back to rest.
    pub(crate) fn halt(&mut self) {
        self.phase = BreathPhase::Rest;
        self.cycle_started_at = None;
    }
}

impl Default for BreathCycle {
    fn default() -> Self {
        Self::new()
    }
}
