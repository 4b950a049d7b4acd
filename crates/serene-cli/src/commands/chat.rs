use std::io::{BufRead, Write};

use clap::Subcommand;
use serene_core::{ChatClient, Config, Conversation};

use super::{runtime, CmdResult};

#[derive(Subcommand)]
pub enum ChatAction {
    /// Send one message and stream the reply
    Send {
        /// Message text
        message: String,
    },
    /// Interactive conversation on stdin (empty line or EOF ends it)
    Start,
}

fn print_delta(delta: &str) {
    print!("{delta}");
    let _ = std::io::stdout().flush();
}

pub fn run(action: ChatAction) -> CmdResult {
    let config = Config::load()?;
    let client = ChatClient::from_config(&config.chat)?;
    let mut conversation = Conversation::new(config.chat.greeting.clone());
    let rt = runtime()?;

    match action {
        ChatAction::Send { message } => {
            rt.block_on(client.reply(&mut conversation, &message, print_delta))?;
            println!();
        }
        ChatAction::Start => {
            println!("{}", config.chat.greeting);
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    break;
                }
                // Errors are shown and the conversation carries on.
                match rt.block_on(client.reply(&mut conversation, &line, print_delta)) {
                    Ok(_) => println!(),
                    Err(e) => eprintln!("error: {e}"),
                }
            }
        }
    }
    Ok(())
}
