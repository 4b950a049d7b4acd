use clap::Subcommand;
use serene_core::journey::{DayStatus, JourneyProgress, PRACTICE_MINUTES, TOTAL_DAYS};

use super::CmdResult;

#[derive(Subcommand)]
pub enum JourneyAction {
    /// Show overall progress and every day's status
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one day (locked days are refused)
    Show {
        /// Day number (1-21)
        day: u32,
    },
    /// Mark a day complete, unlocking the next
    Complete {
        /// Day number (1-21)
        day: u32,
    },
    /// Forget all progress
    Reset,
}

fn marker(status: DayStatus) -> &'static str {
    match status {
        DayStatus::Completed => "[x]",
        DayStatus::Current => "[>]",
        DayStatus::Locked => "[ ]",
    }
}

pub fn run(action: JourneyAction) -> CmdResult {
    match action {
        JourneyAction::Status { json } => {
            let progress = JourneyProgress::load()?;
            if json {
                let days: Vec<_> = progress
                    .days()
                    .map(|(d, status)| serde_json::json!({ "day": d.day, "title": d.title, "status": status }))
                    .collect();
                let out = serde_json::json!({
                    "current_day": progress.current_day(),
                    "total_days": TOTAL_DAYS,
                    "progress_pct": progress.progress_pct(),
                    "summary": progress.summary(),
                    "days": days,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }
            println!("{:.0}% complete. {}", progress.progress_pct(), progress.summary());
            for (d, status) in progress.days() {
                println!("{} Day {:>2}: {}", marker(status), d.day, d.title);
            }
        }
        JourneyAction::Show { day } => {
            let progress = JourneyProgress::load()?;
            let entry = progress.select(day)?;
            println!("Day {}: {}", entry.day, entry.title);
            println!("{}", entry.description);
            println!("Practice: {PRACTICE_MINUTES} min (serene session run --day {day})");
        }
        JourneyAction::Complete { day } => {
            let mut progress = JourneyProgress::load()?;
            progress.mark_complete(day)?;
            progress.save()?;
            println!("Day {day} complete. {}", progress.summary());
        }
        JourneyAction::Reset => {
            JourneyProgress::new().save()?;
            println!("journey reset");
        }
    }
    Ok(())
}
