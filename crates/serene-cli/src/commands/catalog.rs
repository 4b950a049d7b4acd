use clap::Subcommand;
use serene_core::catalog;

use super::CmdResult;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List the built-in meditations
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one meditation
    Show {
        /// Meditation id
        id: u32,
    },
}

pub fn run(action: CatalogAction) -> CmdResult {
    match action {
        CatalogAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(catalog::all())?);
                return Ok(());
            }
            for m in catalog::all() {
                println!("{:>2}  {:<16} {:>7}  {}", m.id, m.title, m.duration, m.category);
            }
        }
        CatalogAction::Show { id } => {
            let m = catalog::find(id).ok_or_else(|| format!("no meditation with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(m)?);
        }
    }
    Ok(())
}
