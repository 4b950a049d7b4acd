//! Email-code sign-in.
//!
//! A mock one-time-password flow: a six-digit code is generated locally,
//! emailed through a transactional email API, and compared locally when
//! the user types it back. Nothing is verified server-side, so this is a
//! convenience gate, not authentication.

use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, SignInError};
use crate::storage::{data_dir, read_json, remove_file, write_json, EmailConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInStep {
    Email,
    Code,
    Verified,
}

/// Template parameters for the code email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeEmail {
    pub to_email: String,
    pub user_email: String,
    pub verification_code: String,
    pub message: String,
}

impl CodeEmail {
    pub fn new(email: &str, code: &str) -> Self {
        Self {
            to_email: email.to_string(),
            user_email: email.to_string(),
            verification_code: code.to_string(),
            message: format!("Your verification code is: {code}"),
        }
    }
}

/// Something that can deliver a code email.
pub trait EmailSender {
    fn send(&self, email: &CodeEmail) -> impl Future<Output = Result<(), SignInError>> + Send;
}

/// EmailJS REST API client.
pub struct EmailJsClient {
    http: Client,
    config: EmailConfig,
}

impl EmailJsClient {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

impl EmailSender for EmailJsClient {
    async fn send(&self, email: &CodeEmail) -> Result<(), SignInError> {
        let body = json!({
            "service_id": self.config.service_id,
            "template_id": self.config.template_id,
            "user_id": self.config.public_key,
            "template_params": email,
        });
        let resp = self.http.post(&self.config.endpoint).json(&body).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let text = resp.text().await.unwrap_or_default();
            Err(SignInError::SendFailed(format!("HTTP {status}: {text}")))
        }
    }
}

/// Six random digits, never starting with zero.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999u32).to_string()
}

fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.contains('@')
}

/// State of one sign-in attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSignIn {
    step: SignInStep,
    email: String,
    code: Option<String>,
}

impl EmailSignIn {
    pub fn new() -> Self {
        Self {
            step: SignInStep::Email,
            email: String::new(),
            code: None,
        }
    }

    pub fn step(&self) -> SignInStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_verified(&self) -> bool {
        self.step == SignInStep::Verified
    }

    /// Email a fresh code to `email` and wait for it to be entered.
    ///
    /// On failure the flow stays where it was.
    pub async fn request_code<S: EmailSender>(&mut self, email: &str, sender: &S) -> Result<(), SignInError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(SignInError::InvalidEmail);
        }
        let code = generate_code();
        sender.send(&CodeEmail::new(email, &code)).await?;
        debug!(email, "sign-in code sent");
        self.email = email.to_string();
        self.code = Some(code);
        self.step = SignInStep::Code;
        Ok(())
    }

    /// Send a new code to the same address. The old code stops working
    /// once the new one is sent.
    pub async fn resend<S: EmailSender>(&mut self, sender: &S) -> Result<(), SignInError> {
        if self.step != SignInStep::Code {
            return Err(SignInError::NoPendingCode);
        }
        let code = generate_code();
        sender.send(&CodeEmail::new(&self.email, &code)).await?;
        self.code = Some(code);
        Ok(())
    }

    /// Compare `code` with the one sent. A mismatch can be retried.
    pub fn verify(&mut self, code: &str) -> Result<&str, SignInError> {
        let expected = match (self.step, self.code.as_deref()) {
            (SignInStep::Code, Some(expected)) => expected,
            _ => return Err(SignInError::NoPendingCode),
        };
        if code.trim() != expected {
            warn!(email = %self.email, "sign-in code mismatch");
            return Err(SignInError::CodeMismatch);
        }
        self.step = SignInStep::Verified;
        self.code = None;
        Ok(&self.email)
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("signin.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Forget the stored attempt.
    pub fn clear() -> Result<()> {
        remove_file(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(read_json(path)?.unwrap_or_default())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    #[cfg(test)]
    pub(crate) fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

impl Default for EmailSignIn {
    fn default() -> Self {
        Self::new()
    }
}
