use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "serene", version, about = "Serene meditation companion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run or simulate a meditation session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Browse the built-in meditations
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// 21-day journey progress
    Journey {
        #[command(subcommand)]
        action: commands::journey::JourneyAction,
    },
    /// Talk to the wellness assistant
    Chat {
        #[command(subcommand)]
        action: commands::chat::ChatAction,
    },
    /// Email-code sign-in
    Signin {
        #[command(subcommand)]
        action: commands::signin::SignInAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SERENE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Session { action } => commands::session::run(action),
        Commands::Catalog { action } => commands::catalog::run(action),
        Commands::Journey { action } => commands::journey::run(action),
        Commands::Chat { action } => commands::chat::run(action),
        Commands::Signin { action } => commands::signin::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
