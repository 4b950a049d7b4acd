use clap::Subcommand;
use serene_core::{AuthSession, Config, EmailJsClient, EmailSignIn};

use super::{runtime, CmdResult};

#[derive(Subcommand)]
pub enum SignInAction {
    /// Email a six-digit code
    Request {
        /// Address to send the code to
        email: String,
    },
    /// Send a new code to the same address
    Resend,
    /// Enter the code you received
    Verify {
        /// Six-digit code
        code: String,
    },
    /// Print the current sign-in state as JSON
    Status,
    /// Sign out and forget the pending attempt
    Signout,
}

pub fn run(action: SignInAction) -> CmdResult {
    match action {
        SignInAction::Request { email } => {
            let config = Config::load()?;
            let sender = EmailJsClient::new(config.email);
            let mut flow = EmailSignIn::new();
            runtime()?.block_on(flow.request_code(&email, &sender))?;
            flow.save()?;
            println!("code sent to {}", flow.email());
        }
        SignInAction::Resend => {
            let config = Config::load()?;
            let sender = EmailJsClient::new(config.email);
            let mut flow = EmailSignIn::load()?;
            runtime()?.block_on(flow.resend(&sender))?;
            flow.save()?;
            println!("new code sent to {}", flow.email());
        }
        SignInAction::Verify { code } => {
            let mut flow = EmailSignIn::load()?;
            let auth = AuthSession::new();
            let email = flow.verify(&code)?.to_string();
            flow.save()?;
            auth.sign_in(&email);
            println!("{}", serde_json::to_string(&auth.current())?);
        }
        SignInAction::Status => {
            let flow = EmailSignIn::load()?;
            let auth = AuthSession::from_sign_in(&flow);
            let out = serde_json::json!({
                "step": flow.step(),
                "auth": auth.current(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        SignInAction::Signout => {
            let auth = AuthSession::from_sign_in(&EmailSignIn::load()?);
            let was = auth.current();
            auth.sign_out();
            EmailSignIn::clear()?;
            match was.email() {
                Some(email) => println!("signed out {email}"),
                None => println!("not signed in"),
            }
        }
    }
    Ok(())
}
