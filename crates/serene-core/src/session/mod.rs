mod audio;
mod breath;
mod engine;
mod prompts;
pub mod recording;
mod scheduler;
mod speech;

pub use audio::{clamp_unit, AudioChannel, AudioState, NullAudio, AMBIENT_MUSIC_URL, DEFAULT_VOLUME};
pub use breath::{BreathCycle, BreathPhase, CYCLE, PHASE_OFFSETS};
pub use engine::{
    format_mmss, SessionConfig, SessionEngine, SessionOptions, DEFAULT_MINUTES, DEFAULT_TITLE,
};
pub use prompts::{
    DuePrompt, PromptQueue, BREATHING_PROMPTS, PROMPT_INTERVAL_SECS, WELCOME_PROMPT,
};
pub use scheduler::{Scheduler, TimerId};
pub use speech::{select_voice, NullSpeech, SpeechChannel, Utterance, Voice, VoiceSettings};
