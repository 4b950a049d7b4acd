pub mod catalog;
pub mod chat;
pub mod config;
pub mod journey;
pub mod session;
pub mod signin;

/// Boxed error shared by every command handler.
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Current-thread runtime for commands that talk to the network.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread().enable_all().build()
}
