//! # Serene Core Library
//!
//! Core logic for the Serene meditation companion. Every feature is
//! available through the `serene` CLI binary; other front ends are thin
//! layers over the same library.
//!
//! ## Architecture
//!
//! - **Session Engine**: a virtual-clock state machine driving the countdown,
//!   breath guide, spoken prompts and ambient audio. The host advances it
//!   with `advance(dt)`; it never spawns threads or reads the wall clock.
//! - **Audio / Speech**: capabilities injected into the engine through the
//!   [`AudioChannel`] and [`SpeechChannel`] traits.
//! - **Catalog / Journey**: the built-in meditation list and the 21-day
//!   program with persisted progress.
//! - **Chat**: streaming client for the wellness assistant endpoint.
//! - **Sign-in**: email-code sign-in and observable auth state.
//! - **Storage**: TOML configuration and JSON state files.
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: session state machine
//! - [`Config`]: application configuration
//! - [`JourneyProgress`]: 21-day program progress
//! - [`ChatClient`]: streaming chat client

pub mod auth;
pub mod catalog;
pub mod chat;
pub mod error;
pub mod events;
pub mod journey;
pub mod session;
pub mod signin;
pub mod storage;

pub use auth::{AuthSession, AuthState};
pub use catalog::Meditation;
pub use chat::{ChatClient, ChatMessage, Conversation, Role};
pub use error::{ChatError, ConfigError, CoreError, PlaybackError, SignInError, ValidationError};
pub use events::Event;
pub use journey::{DayStatus, JourneyDay, JourneyProgress};
pub use session::{
    AudioChannel, BreathPhase, SessionConfig, SessionEngine, SessionOptions, SpeechChannel,
};
pub use signin::{EmailJsClient, EmailSender, EmailSignIn, SignInStep};
pub use storage::Config;
