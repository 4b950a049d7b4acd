use std::error::Error;
use std::time::Duration;

use clap::{Args, Subcommand};
use serene_core::catalog;
use serene_core::journey::JourneyProgress;
use serene_core::session::recording::{RecordingAudio, RecordingSpeech};
use serene_core::session::{format_mmss, AudioChannel, SpeechChannel, Utterance, Voice};
use serene_core::{Config, Event, PlaybackError, SessionConfig, SessionEngine};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::{runtime, CmdResult};

const FRAME: Duration = Duration::from_millis(200);

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a session in real time, controlled from stdin
    ///
    /// Commands: p (play/pause), r (reset), m (mute), v <0..1> (volume),
    /// s (snapshot), q (quit)
    Run {
        #[command(flatten)]
        target: SessionTarget,
        /// Start immediately instead of waiting for `p`
        #[arg(long)]
        autostart: bool,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Run a session on a virtual clock and print every event as JSON
    Simulate {
        #[command(flatten)]
        target: SessionTarget,
        /// Virtual seconds to run for
        #[arg(long = "run", default_value = "60")]
        run_secs: u64,
        /// Pause after this many seconds (fractions allowed)
        #[arg(long, value_parser = parse_secs)]
        pause_at: Option<Duration>,
        /// Stay paused for this many seconds before resuming
        #[arg(long, value_parser = parse_secs, default_value = "0")]
        resume_after: Duration,
        /// Mute before starting
        #[arg(long)]
        mute: bool,
    },
}

#[derive(Args)]
pub struct SessionTarget {
    /// Length in minutes (defaults to session.default_minutes)
    #[arg(long, conflicts_with_all = ["seconds", "catalog", "day"])]
    minutes: Option<u64>,
    /// Length in seconds
    #[arg(long, conflicts_with_all = ["catalog", "day"])]
    seconds: Option<u64>,
    /// Session title
    #[arg(long)]
    title: Option<String>,
    /// Built-in meditation id
    #[arg(long, conflicts_with = "day")]
    catalog: Option<u32>,
    /// Journey day (must be unlocked)
    #[arg(long)]
    day: Option<u32>,
}

impl SessionTarget {
    fn resolve(&self, config: &Config) -> Result<SessionConfig, Box<dyn Error>> {
        if let Some(id) = self.catalog {
            let meditation = catalog::find(id).ok_or_else(|| format!("no meditation with id {id}"))?;
            return Ok(meditation.session_config()?);
        }
        if let Some(day) = self.day {
            let progress = JourneyProgress::load()?;
            return Ok(progress.select(day)?.session_config());
        }
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| config.session.default_title.clone());
        let session = match self.seconds {
            Some(secs) => SessionConfig::new(secs, title)?,
            None => SessionConfig::from_minutes(self.minutes.unwrap_or(config.session.default_minutes), title)?,
        };
        Ok(session)
    }
}

/// Terminal stand-in for the ambient player. Reports transport changes
/// through the log.
struct ConsoleAudio;

impl AudioChannel for ConsoleAudio {
    fn load(&mut self, url: &str, looping: bool) -> Result<(), PlaybackError> {
        info!(url, looping, "ambient track loaded");
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        info!("ambient music playing");
        Ok(())
    }

    fn pause(&mut self) {
        info!("ambient music paused");
    }

    fn set_volume(&mut self, gain: f32) {
        debug!(gain, "ambient gain");
    }

    fn stop(&mut self) {
        info!("ambient music stopped");
    }
}

/// Prints prompts instead of speaking them.
struct ConsoleSpeech {
    quiet: bool,
}

impl SpeechChannel for ConsoleSpeech {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<(), PlaybackError> {
        if !self.quiet {
            println!("    \"{}\"", utterance.text);
        }
        Ok(())
    }

    fn cancel(&mut self) {}

    fn set_volume(&mut self, _volume: f32) {}
}

fn parse_secs(value: &str) -> Result<Duration, String> {
    let secs: f64 = value.parse().map_err(|e| format!("invalid seconds '{value}': {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid seconds '{value}': {e}"))
}

fn print_json(events: &[Event]) -> CmdResult {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

fn print_human(events: &[Event]) -> CmdResult {
    for event in events {
        match event {
            Event::SessionResumed { remaining_secs, .. } => {
                println!("[{}] playing", format_mmss(*remaining_secs))
            }
            Event::SessionPaused { remaining_secs, .. } => {
                println!("[{}] paused", format_mmss(*remaining_secs))
            }
            Event::SessionReset { total_secs, .. } => println!("[{}] reset", format_mmss(*total_secs)),
            Event::CountdownFinished { .. } => println!("[00:00] session complete"),
            Event::BreathPhaseChanged { label, .. } => println!("  {label}"),
            Event::VolumeChanged { volume, muted, .. } => {
                let state = if *muted { " (muted)" } else { "" };
                println!("volume {:.0}%{state}", volume * 100.0)
            }
            Event::SessionClosed { remaining_secs, .. } => {
                println!("[{}] session closed", format_mmss(*remaining_secs))
            }
            Event::StateSnapshot { .. } => println!("{}", serde_json::to_string_pretty(event)?),
            // Spoken text is printed by the speech channel.
            Event::WelcomeSpoken { .. } | Event::PromptSpoken { .. } => {}
        }
    }
    Ok(())
}

enum Command {
    Toggle,
    Reset,
    Mute,
    Volume(f32),
    Snapshot,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("p");
    match cmd {
        "p" | "play" | "pause" => Ok(Command::Toggle),
        "r" | "reset" => Ok(Command::Reset),
        "m" | "mute" => Ok(Command::Mute),
        "s" | "status" => Ok(Command::Snapshot),
        "q" | "quit" => Ok(Command::Quit),
        "v" | "volume" => {
            let value = parts.next().ok_or("usage: v <0..1>")?;
            value
                .parse::<f32>()
                .map(Command::Volume)
                .map_err(|e| format!("invalid volume '{value}': {e}"))
        }
        other => Err(format!("unknown command '{other}' (p, r, m, v <0..1>, s, q)")),
    }
}

fn run_live(session: SessionConfig, config: &Config, autostart: bool, json: bool) -> CmdResult {
    let print = if json { print_json } else { print_human };
    let mut engine = SessionEngine::with_options(
        session,
        config.session_options(),
        ConsoleAudio,
        ConsoleSpeech { quiet: json },
    );
    if !json {
        println!("{} ({})", engine.title(), engine.remaining_display());
    }

    runtime()?.block_on(async {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut frame = tokio::time::interval(FRAME);
        frame.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        if autostart {
            print(&engine.toggle_running())?;
        }

        loop {
            tokio::select! {
                _ = frame.tick() => {
                    let now = Instant::now();
                    let events = engine.advance(now - last);
                    last = now;
                    print(&events)?;
                    if events.iter().any(|e| matches!(e, Event::CountdownFinished { .. })) {
                        break;
                    }
                }
                line = lines.next_line(), if stdin_open => {
                    let Some(line) = line? else {
                        // Keep running to the end without input.
                        stdin_open = false;
                        continue;
                    };
                    match parse_command(&line) {
                        Ok(Command::Toggle) => print(&engine.toggle_running())?,
                        Ok(Command::Reset) => print(&engine.reset())?,
                        Ok(Command::Mute) => print(&[engine.toggle_mute()])?,
                        Ok(Command::Volume(v)) => print(&[engine.set_volume(v)])?,
                        Ok(Command::Snapshot) => print(&[engine.snapshot()])?,
                        Ok(Command::Quit) => break,
                        Err(msg) => eprintln!("{msg}"),
                    }
                }
            }
            if !stdin_open && !engine.is_running() {
                // Paused with nobody left to resume it.
                break;
            }
        }
        Ok::<(), Box<dyn Error>>(())
    })?;

    print(&[engine.close()])
}

struct PausePlan {
    at: Duration,
    resume_after: Duration,
}

fn run_simulated(session: SessionConfig, config: &Config, run: Duration, pause: Option<PausePlan>, mute: bool) -> CmdResult {
    let mut engine = SessionEngine::with_options(
        session,
        config.session_options(),
        RecordingAudio::new(),
        RecordingSpeech::new(),
    );
    if mute {
        print_json(&[engine.toggle_mute()])?;
    }
    print_json(&engine.toggle_running())?;
    match pause {
        Some(PausePlan { at, resume_after }) if at < run => {
            print_json(&engine.advance(at))?;
            print_json(&engine.toggle_running())?;
            // Paused time is part of the run.
            let paused = resume_after.min(run - at);
            print_json(&engine.advance(paused))?;
            if at + resume_after < run {
                print_json(&engine.toggle_running())?;
                print_json(&engine.advance(run - at - resume_after))?;
            }
        }
        _ => print_json(&engine.advance(run))?,
    }
    print_json(&[engine.snapshot()])?;
    print_json(&[engine.close()])
}

pub fn run(action: SessionAction) -> CmdResult {
    let config = Config::load()?;
    match action {
        SessionAction::Run {
            target,
            autostart,
            json,
        } => run_live(target.resolve(&config)?, &config, autostart, json),
        SessionAction::Simulate {
            target,
            run_secs,
            pause_at,
            resume_after,
            mute,
        } => {
            let pause = pause_at.map(|at| PausePlan { at, resume_after });
            run_simulated(
                target.resolve(&config)?,
                &config,
                Duration::from_secs(run_secs),
                pause,
                mute,
            )
        }
    }
}
