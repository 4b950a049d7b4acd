//! Meditation session engine.
//!
//! Coordinates four clocks over one virtual timeline: the one-second
//! countdown, the 12-second breathing guide, the 30-second voice prompts
//! and the one-shot welcome prompt. Like the rest of the crate it has no
//! internal thread; the host moves time forward with [`SessionEngine::advance`].
//!
//! ## Lifecycle
//!
//! ```text
//! start -> (toggle_running <-> toggle_running | reset)* -> close
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::start(config, audio, speech);
//! engine.toggle_running();
//! // In a loop:
//! for event in engine.advance(elapsed) { render(event) }
//! ```

use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::audio::{clamp_unit, AudioChannel, AudioState, AMBIENT_MUSIC_URL, DEFAULT_VOLUME};
use super::breath::{BreathCycle, BreathPhase, CYCLE, PHASE_OFFSETS};
use super::prompts::{DuePrompt, PromptQueue, WELCOME_PROMPT};
use super::scheduler::{Scheduler, TimerId};
use super::speech::{select_voice, SpeechChannel, Utterance, VoiceSettings};
use crate::error::ValidationError;
use crate::events::Event;

const TICK: Duration = Duration::from_secs(1);
const WELCOME_DELAY: Duration = Duration::from_secs(1);

pub const DEFAULT_MINUTES: u64 = 10;
pub const DEFAULT_TITLE: &str = "Meditation Session";

/// What a session asks for when it is created. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    total_secs: u64,
    title: String,
}

impl SessionConfig {
    pub fn new(total_secs: u64, title: impl Into<String>) -> Result<Self, ValidationError> {
        if total_secs == 0 {
            return Err(ValidationError::ZeroDuration);
        }
        Ok(Self {
            total_secs,
            title: title.into(),
        })
    }

    pub fn from_minutes(minutes: u64, title: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(minutes.saturating_mul(60), title)
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_secs: DEFAULT_MINUTES * 60,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

/// Host-tunable knobs that are not part of the session's identity.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub volume: f32,
    pub ambient_url: String,
    pub voice: VoiceSettings,
    pub prompts: PromptQueue,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            ambient_url: AMBIENT_MUSIC_URL.to_string(),
            voice: VoiceSettings::default(),
            prompts: PromptQueue::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wake {
    Countdown,
    Phase(BreathPhase),
    CycleStart,
    Welcome,
}

/// Cancellation tokens held by the session. Every exit path empties it.
#[derive(Debug, Default)]
struct SessionTimers {
    countdown: Option<TimerId>,
    breath: Vec<TimerId>,
    welcome: Option<TimerId>,
}

pub struct SessionEngine<A: AudioChannel, S: SpeechChannel> {
    id: Uuid,
    config: SessionConfig,
    remaining_secs: u64,
    running: bool,
    breath: BreathCycle,
    prompts: PromptQueue,
    audio_state: AudioState,
    voice: VoiceSettings,
    audio: A,
    speech: S,
    scheduler: Scheduler<Wake>,
    timers: SessionTimers,
    on_close: Option<Box<dyn FnOnce() + Send>>,
    closed: bool,
}

impl<A: AudioChannel, S: SpeechChannel> SessionEngine<A, S> {
    /// Create a paused session at full duration with default options.
    pub fn start(config: SessionConfig, audio: A, speech: S) -> Self {
        Self::with_options(config, SessionOptions::default(), audio, speech)
    }

    pub fn with_options(config: SessionConfig, options: SessionOptions, audio: A, speech: S) -> Self {
        let mut engine = Self {
            id: Uuid::new_v4(),
            remaining_secs: config.total_secs,
            config,
            running: false,
            breath: BreathCycle::new(),
            prompts: options.prompts,
            audio_state: AudioState::new(options.volume),
            voice: options.voice,
            audio,
            speech,
            scheduler: Scheduler::new(),
            timers: SessionTimers::default(),
            on_close: None,
            closed: false,
        };
        if let Err(e) = engine.audio.load(&options.ambient_url, true) {
            warn!(session = %engine.id, error = %e, "ambient audio unavailable");
        }
        engine.audio.set_volume(engine.audio_state.gain());
        info!(
            session = %engine.id,
            title = engine.config.title(),
            total_secs = engine.config.total_secs(),
            "session started"
        );
        engine
    }

    /// Notify the host when the session is closed.
    pub fn on_close(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        self.config.title()
    }

    pub fn total_secs(&self) -> u64 {
        self.config.total_secs()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.config.total_secs() - self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// 0.0 .. 1.0 of the countdown consumed.
    pub fn progress(&self) -> f64 {
        self.elapsed_secs() as f64 / self.config.total_secs() as f64
    }

    /// Remaining time as `MM:SS`.
    pub fn remaining_display(&self) -> String {
        format_mmss(self.remaining_secs)
    }

    pub fn breath(&self) -> &BreathCycle {
        &self.breath
    }

    pub fn breath_phase(&self) -> BreathPhase {
        self.breath.phase()
    }

    pub fn breath_label(&self) -> &'static str {
        self.breath.phase().label()
    }

    pub fn prompt_cursor(&self) -> usize {
        self.prompts.cursor()
    }

    pub fn last_spoken_mark(&self) -> u64 {
        self.prompts.last_spoken_mark()
    }

    pub fn audio_state(&self) -> AudioState {
        self.audio_state
    }

    pub fn volume(&self) -> f32 {
        self.audio_state.volume
    }

    pub fn is_muted(&self) -> bool {
        self.audio_state.muted
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn speech(&self) -> &S {
        &self.speech
    }

    /// Virtual time the session has been alive.
    pub fn clock(&self) -> Duration {
        self.scheduler.now()
    }

    /// Outstanding scheduled callbacks. Zero whenever paused.
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_count()
    }

    pub fn welcome_pending(&self) -> bool {
        self.timers.welcome.is_some()
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            session_id: self.id,
            title: self.config.title().to_string(),
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.config.total_secs(),
            remaining_display: self.remaining_display(),
            progress: self.progress(),
            breath_phase: self.breath.phase(),
            breath_label: self.breath_label().to_string(),
            volume: self.audio_state.volume,
            muted: self.audio_state.muted,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn toggle_running(&mut self) -> Vec<Event> {
        if self.running {
            self.pause()
        } else {
            self.resume()
        }
    }

    /// Advance the session by one second. Shorthand for
    /// `advance(TICK)`, so breath phases and the welcome fire as well.
    pub fn tick(&mut self) -> Vec<Event> {
        self.advance(TICK)
    }

    pub fn reset(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.running {
            self.running = false;
            self.audio_state.playing = false;
            self.audio.pause();
        }
        self.speech.cancel();
        self.cancel_timers();
        if let Some(e) = self.halt_breath() {
            events.push(e);
        }
        self.remaining_secs = self.config.total_secs();
        self.prompts.reset();
        debug!(session = %self.id, "session reset");
        events.push(Event::SessionReset {
            total_secs: self.config.total_secs(),
            at: Utc::now(),
        });
        events
    }

    /// Set the user volume, clamped to 0.0..=1.0. A non-zero volume
    /// also lifts mute.
    pub fn set_volume(&mut self, volume: f32) -> Event {
        let volume = clamp_unit(volume);
        self.audio_state.volume = volume;
        if volume > 0.0 && self.audio_state.muted {
            self.audio_state.muted = false;
        }
        self.apply_gain()
    }

    pub fn toggle_mute(&mut self) -> Event {
        self.audio_state.muted = !self.audio_state.muted;
        if self.audio_state.muted {
            self.speech.cancel();
        }
        self.apply_gain()
    }

    /// Move virtual time forward by `dt`, running every callback that
    /// comes due, in order.
    pub fn advance(&mut self, dt: Duration) -> Vec<Event> {
        let until = self.scheduler.now() + dt;
        let mut events = Vec::new();
        while let Some((_, wake)) = self.scheduler.pop_due(until) {
            match wake {
                Wake::Countdown => events.extend(self.count_down()),
                Wake::Phase(phase) => {
                    if self.breath.set_phase(phase) {
                        events.push(self.phase_event());
                    }
                }
                Wake::CycleStart => events.push(self.begin_breath_cycle(true)),
                Wake::Welcome => {
                    self.timers.welcome = None;
                    events.push(self.speak_welcome());
                }
            }
        }
        events
    }

    /// Tear the session down. Timers, audio and speech are released and
    /// the host's close callback runs.
    pub fn close(mut self) -> Event {
        let remaining_secs = self.remaining_secs;
        self.teardown();
        if let Some(f) = self.on_close.take() {
            f();
        }
        info!(session = %self.id, remaining_secs, "session closed");
        Event::SessionClosed {
            remaining_secs,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Countdown callback. Decrements first, then checks for a due prompt
    /// against the new elapsed value. Reaching zero disarms the countdown
    /// but leaves the session running.
    fn count_down(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.running || self.remaining_secs == 0 {
            return events;
        }
        self.remaining_secs -= 1;

        if let Some(due) = self.prompts.poll(self.elapsed_secs()) {
            events.push(self.speak_prompt(due));
        }

        if self.remaining_secs == 0 {
            self.disarm_countdown();
            info!(session = %self.id, "countdown finished");
            events.push(Event::CountdownFinished {
                total_secs: self.config.total_secs(),
                at: Utc::now(),
            });
        }
        events
    }

    fn resume(&mut self) -> Vec<Event> {
        let first_activation = self.remaining_secs == self.config.total_secs();
        self.running = true;
        self.audio_state.playing = true;
        if let Err(e) = self.audio.play() {
            warn!(session = %self.id, error = %e, "ambient audio failed to play");
        }

        if self.remaining_secs > 0 {
            self.timers.countdown = Some(self.scheduler.schedule_every(TICK, Wake::Countdown));
        }
        let mut events = vec![Event::SessionResumed {
            remaining_secs: self.remaining_secs,
            first_activation,
            at: Utc::now(),
        }];
        events.push(self.begin_breath_cycle(false));

        if first_activation {
            if let Some(old) = self.timers.welcome.take() {
                self.scheduler.cancel(old);
            }
            self.timers.welcome = Some(self.scheduler.schedule_once(WELCOME_DELAY, Wake::Welcome));
        }
        debug!(session = %self.id, remaining = self.remaining_secs, "session resumed");
        events
    }

    fn pause(&mut self) -> Vec<Event> {
        self.running = false;
        self.audio_state.playing = false;
        self.audio.pause();
        self.speech.cancel();
        self.cancel_timers();
        let mut events = vec![Event::SessionPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }];
        if let Some(e) = self.halt_breath() {
            events.push(e);
        }
        debug!(session = %self.id, remaining = self.remaining_secs, "session paused");
        events
    }

    /// Start a cycle at the current instant and schedule its phase
    /// transitions plus the next cycle.
    fn begin_breath_cycle(&mut self, previous_finished: bool) -> Event {
        for id in self.timers.breath.drain(..) {
            self.scheduler.cancel(id);
        }
        self.breath.begin(self.scheduler.now(), previous_finished);
        for (offset, phase) in PHASE_OFFSETS.iter().skip(1) {
            let id = self.scheduler.schedule_once(*offset, Wake::Phase(*phase));
            self.timers.breath.push(id);
        }
        let next = self.scheduler.schedule_once(CYCLE, Wake::CycleStart);
        self.timers.breath.push(next);
        self.phase_event()
    }

    fn halt_breath(&mut self) -> Option<Event> {
        let changed = self.breath.phase() != BreathPhase::Rest;
        self.breath.halt();
        changed.then(|| self.phase_event())
    }

    fn phase_event(&self) -> Event {
        let phase = self.breath.phase();
        Event::BreathPhaseChanged {
            phase,
            label: phase.label().to_string(),
            cycle: self.breath.cycles_started(),
            at: Utc::now(),
        }
    }

    fn disarm_countdown(&mut self) {
        if let Some(id) = self.timers.countdown.take() {
            self.scheduler.cancel(id);
        }
    }

    fn cancel_timers(&mut self) {
        self.disarm_countdown();
        for id in self.timers.breath.drain(..) {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.timers.welcome.take() {
            self.scheduler.cancel(id);
        }
    }

    fn speak_prompt(&mut self, due: DuePrompt) -> Event {
        let audible = self.speak(&due.text);
        Event::PromptSpoken {
            index: due.index,
            text: due.text,
            elapsed_secs: due.elapsed_secs,
            audible,
            at: Utc::now(),
        }
    }

    fn speak_welcome(&mut self) -> Event {
        let audible = self.speak(WELCOME_PROMPT);
        Event::WelcomeSpoken {
            text: WELCOME_PROMPT.to_string(),
            audible,
            at: Utc::now(),
        }
    }

    /// Returns whether the utterance was handed to the speech service.
    fn speak(&mut self, text: &str) -> bool {
        if self.audio_state.muted {
            debug!(session = %self.id, "muted, prompt skipped");
            return false;
        }
        self.speech.cancel();
        let utterance = Utterance {
            text: text.to_string(),
            rate: self.voice.rate,
            pitch: self.voice.pitch,
            volume: self.audio_state.speech_gain(),
            voice: select_voice(&self.speech.voices(), &self.voice.preferred_voices),
        };
        match self.speech.speak(utterance) {
            Ok(()) => true,
            Err(e) => {
                warn!(session = %self.id, error = %e, "speech synthesis failed");
                false
            }
        }
    }

    fn apply_gain(&mut self) -> Event {
        let gain = self.audio_state.gain();
        self.audio.set_volume(gain);
        self.speech.set_volume(self.audio_state.speech_gain());
        Event::VolumeChanged {
            volume: self.audio_state.volume,
            muted: self.audio_state.muted,
            gain,
            at: Utc::now(),
        }
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.running = false;
        self.audio_state.playing = false;
        self.scheduler.cancel_all();
        self.timers = SessionTimers::default();
        self.speech.cancel();
        self.audio.stop();
    }
}

impl<A: AudioChannel, S: SpeechChannel> Drop for SessionEngine<A, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Seconds as zero-padded `MM:SS`. Minutes are not wrapped into hours.
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::recording::{AudioCall, RecordingAudio, RecordingSpeech};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    type Engine = SessionEngine<RecordingAudio, RecordingSpeech>;

    fn engine(total_secs: u64) -> Engine {
        let config = SessionConfig::new(total_secs, "Test").unwrap();
        SessionEngine::start(config, RecordingAudio::new(), RecordingSpeech::new())
    }

    fn run_secs(e: &mut Engine, secs: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..secs {
            events.extend(e.advance(Duration::from_secs(1)));
        }
        events
    }

    fn prompts(events: &[Event]) -> Vec<u64> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::PromptSpoken { elapsed_secs, .. } => Some(*elapsed_secs),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_initializes_defaults() {
        let e = engine(600);
        assert_eq!(e.remaining_secs(), 600);
        assert!(!e.is_running());
        assert_eq!(e.breath_phase(), BreathPhase::Rest);
        assert_eq!(e.prompt_cursor(), 0);
        assert_eq!(e.volume(), DEFAULT_VOLUME);
        assert!(!e.is_muted());
        assert_eq!(e.pending_timers(), 0);
        assert_eq!(
            e.audio().calls[0],
            AudioCall::Load {
                url: AMBIENT_MUSIC_URL.to_string(),
                looping: true
            }
        );
    }

    #[test]
    fn zero_duration_rejected() {
        assert_eq!(SessionConfig::new(0, "x"), Err(ValidationError::ZeroDuration));
        assert_eq!(SessionConfig::from_minutes(1, "x").unwrap().total_secs(), 60);
    }

    #[test]
    fn countdown_reaches_zero_and_stays_running() {
        let mut e = engine(5);
        e.toggle_running();
        let events = run_secs(&mut e, 10);
        assert_eq!(e.remaining_secs(), 0);
        assert!(e.is_running());
        let finished = events
            .iter()
            .filter(|ev| matches!(ev, Event::CountdownFinished { .. }))
            .count();
        assert_eq!(finished, 1);
        assert_eq!(e.remaining_display(), "00:00");
        assert_eq!(e.progress(), 1.0);
    }

    #[test]
    fn paused_engine_does_not_count() {
        let mut e = engine(60);
        e.toggle_running();
        run_secs(&mut e, 3);
        e.toggle_running();
        assert_eq!(e.pending_timers(), 0);
        run_secs(&mut e, 20);
        assert_eq!(e.remaining_secs(), 57);
        assert!(e.tick().is_empty());
        assert_eq!(e.remaining_secs(), 57);
    }

    #[test]
    fn resume_rearms_without_double_counting() {
        let mut e = engine(120);
        for _ in 0..5 {
            e.toggle_running();
            run_secs(&mut e, 2);
            e.toggle_running();
        }
        assert_eq!(e.remaining_secs(), 110);
    }

    #[test]
    fn ticks_drive_the_whole_session() {
        let mut e = engine(600);
        e.toggle_running();
        let mut events = Vec::new();
        for _ in 0..30 {
            events.extend(e.tick());
        }
        assert_eq!(e.remaining_secs(), 570);
        assert_eq!(e.clock(), Duration::from_secs(30));
        assert_eq!(e.breath().cycles_started(), 3);
        assert_eq!(e.breath().cycles_completed(), 2);
        assert_eq!(e.breath_phase(), BreathPhase::Hold);
        assert!(events.iter().any(|ev| matches!(ev, Event::WelcomeSpoken { .. })));
        assert_eq!(prompts(&events), vec![30]);
    }

    #[test]
    fn tick_mixed_with_advance_counts_each_second_once() {
        let mut e = engine(600);
        e.toggle_running();
        for _ in 0..10 {
            e.advance(Duration::from_millis(500));
            e.tick();
            e.advance(Duration::from_millis(500));
        }
        assert_eq!(e.clock(), Duration::from_secs(20));
        assert_eq!(e.remaining_secs(), 580);
        assert_eq!(e.elapsed_secs(), 20);
    }

    #[test]
    fn breath_cycle_follows_fixed_schedule() {
        let mut e = engine(600);
        e.toggle_running();
        assert_eq!(e.breath_phase(), BreathPhase::Inhale);
        run_secs(&mut e, 4);
        assert_eq!(e.breath_phase(), BreathPhase::Hold);
        run_secs(&mut e, 3);
        assert_eq!(e.breath_phase(), BreathPhase::Exhale);
        run_secs(&mut e, 4);
        assert_eq!(e.breath_phase(), BreathPhase::Rest);
        run_secs(&mut e, 1);
        assert_eq!(e.breath_phase(), BreathPhase::Inhale);
        assert_eq!(e.breath().cycles_completed(), 1);
    }

    #[test]
    fn pause_mid_cycle_restarts_at_inhale() {
        let mut e = engine(600);
        e.toggle_running();
        run_secs(&mut e, 5);
        assert_eq!(e.breath_phase(), BreathPhase::Hold);
        e.toggle_running();
        assert_eq!(e.breath_phase(), BreathPhase::Rest);
        e.toggle_running();
        assert_eq!(e.breath_phase(), BreathPhase::Inhale);
        run_secs(&mut e, 3);
        assert_eq!(e.breath_phase(), BreathPhase::Inhale);
        run_secs(&mut e, 1);
        assert_eq!(e.breath_phase(), BreathPhase::Hold);
    }

    #[test]
    fn welcome_fires_once_after_first_start() {
        let mut e = engine(600);
        e.toggle_running();
        assert!(e.welcome_pending());
        let events = run_secs(&mut e, 2);
        assert!(events.iter().any(|ev| matches!(ev, Event::WelcomeSpoken { audible: true, .. })));
        assert_eq!(e.speech().texts(), vec![WELCOME_PROMPT]);

        e.toggle_running();
        e.toggle_running();
        run_secs(&mut e, 2);
        assert_eq!(e.speech().spoken.len(), 1);
    }

    #[test]
    fn sub_second_pause_cancels_welcome() {
        let mut e = engine(600);
        e.toggle_running();
        e.advance(Duration::from_millis(500));
        e.toggle_running();
        assert!(!e.welcome_pending());
        e.advance(Duration::from_secs(5));
        assert!(e.speech().spoken.is_empty());
    }

    #[test]
    fn prompts_use_post_decrement_elapsed() {
        let mut e = engine(600);
        e.toggle_running();
        let events = run_secs(&mut e, 125);
        assert_eq!(prompts(&events), vec![30, 60, 90, 120]);
        assert_eq!(e.prompt_cursor(), 4);
        assert_eq!(e.last_spoken_mark(), 120);
    }

    #[test]
    fn muted_prompts_are_consumed_silently() {
        let mut e = engine(600);
        e.toggle_mute();
        e.toggle_running();
        let events = run_secs(&mut e, 31);
        assert!(events
            .iter()
            .any(|ev| matches!(ev, Event::PromptSpoken { audible: false, elapsed_secs: 30, .. })));
        assert_eq!(e.prompt_cursor(), 1);
        assert!(e.speech().spoken.is_empty());
    }

    #[test]
    fn speech_failure_does_not_stop_clock() {
        let config = SessionConfig::new(90, "Headless").unwrap();
        let mut e = SessionEngine::start(config, RecordingAudio::failing(), RecordingSpeech::failing());
        e.toggle_running();
        assert!(e.audio_state().playing);
        let events = run_secs(&mut e, 61);
        assert_eq!(e.remaining_secs(), 29);
        assert_eq!(prompts(&events), vec![30, 60]);
        assert_eq!(e.breath().cycles_started(), 6);
    }

    #[test]
    fn utterance_uses_voice_settings_and_speech_gain() {
        let mut e = engine(600);
        e.toggle_running();
        run_secs(&mut e, 1);
        let u = &e.speech().spoken[0];
        assert_eq!(u.rate, 0.7);
        assert_eq!(u.pitch, 0.9);
        assert!((u.volume - 0.45).abs() < 1e-6);
    }

    #[test]
    fn volume_and_mute_drive_gain() {
        let mut e = engine(600);
        e.set_volume(0.6);
        assert_eq!(e.audio().gain, 0.6);
        e.toggle_mute();
        assert_eq!(e.audio().gain, 0.0);
        e.toggle_mute();
        assert_eq!(e.audio().gain, 0.6);
        e.set_volume(0.0);
        assert_eq!(e.audio().gain, 0.0);
        assert!(!e.is_muted());
    }

    #[test]
    fn nonzero_volume_lifts_mute() {
        let mut e = engine(600);
        e.toggle_mute();
        e.set_volume(0.4);
        assert!(!e.is_muted());
        assert_eq!(e.audio().gain, 0.4);
    }

    #[test]
    fn mute_cancels_speech_in_flight() {
        let mut e = engine(600);
        e.toggle_running();
        run_secs(&mut e, 1);
        assert!(e.speech().current.is_some());
        e.toggle_mute();
        assert!(e.speech().current.is_none());
    }

    #[test]
    fn audio_mirrors_running() {
        let mut e = engine(600);
        e.toggle_running();
        assert!(e.audio().playing);
        assert!(e.audio_state().playing);
        e.toggle_running();
        assert!(!e.audio().playing);
        assert!(!e.audio_state().playing);
    }

    #[test]
    fn reset_restores_everything_but_volume() {
        let mut e = engine(600);
        e.set_volume(0.8);
        e.toggle_running();
        run_secs(&mut e, 65);
        e.reset();
        assert_eq!(e.remaining_secs(), 600);
        assert!(!e.is_running());
        assert_eq!(e.prompt_cursor(), 0);
        assert_eq!(e.last_spoken_mark(), 0);
        assert_eq!(e.pending_timers(), 0);
        assert_eq!(e.volume(), 0.8);
        assert_eq!(e.breath_phase(), BreathPhase::Rest);
    }

    #[test]
    fn close_releases_resources_and_notifies_host() {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&closed);
        let mut e = engine(600).on_close(move || flag.store(true, Ordering::SeqCst));
        e.toggle_running();
        run_secs(&mut e, 3);
        let event = e.close();
        assert!(matches!(event, Event::SessionClosed { remaining_secs: 597, .. }));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn snapshot_reports_derived_values() {
        let mut e = engine(125);
        e.toggle_running();
        run_secs(&mut e, 5);
        match e.snapshot() {
            Event::StateSnapshot {
                remaining_display,
                progress,
                breath_label,
                running,
                ..
            } => {
                assert_eq!(remaining_display, "02:00");
                assert!((progress - 0.04).abs() < 1e-9);
                assert_eq!(breath_label, "Hold...");
                assert!(running);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn format_pads_minutes_and_seconds() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(65), "01:05");
        assert_eq!(format_mmss(600), "10:00");
        assert_eq!(format_mmss(7200), "120:00");
    }
}
