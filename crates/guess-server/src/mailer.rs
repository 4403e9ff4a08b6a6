//! Verification email delivery.

use std::time::Duration;

use guess_core::error::{GuessError, GuessResult};
use guess_core::models::notification::VerificationNotice;
use guess_core::notifier::Notifier;
use serde::Serialize;
use tracing::{debug, info};

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const SUBJECT: &str = "Verify your Guess Game account";
const DEFAULT_SENDER_NAME: &str = "Guess Game";

#[derive(Debug, Clone)]
pub struct BrevoConfig {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    html_content: String,
    text_content: String,
}

/// Sends through the Brevo transactional email API.
#[derive(Debug, Clone)]
pub struct BrevoMailer {
    client: reqwest::Client,
    config: BrevoConfig,
}

impl BrevoMailer {
    pub fn new(config: BrevoConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .user_agent(concat!("guess-server/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    fn body(&self, notice: &VerificationNotice) -> BrevoSendEmailBody {
        BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.config.sender_email.clone(),
                name: Some(
                    self.config
                        .sender_name
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string()),
                ),
            },
            to: vec![BrevoEmailAddress {
                email: notice.email.clone(),
                name: Some(notice.username.clone()),
            }],
            subject: SUBJECT.to_string(),
            html_content: html_body(notice),
            text_content: text_body(notice),
        }
    }
}

impl Notifier for BrevoMailer {
    async fn send_verification(&self, notice: VerificationNotice) -> GuessResult<()> {
        let resp = self
            .client
            .post(BREVO_SEND_URL)
            .header("api-key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&self.body(&notice))
            .send()
            .await
            .map_err(|e| GuessError::Notification(format!("Brevo request failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Verification email accepted by Brevo");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(GuessError::Notification(format!(
            "Brevo send failed (status={status}): {body}"
        )))
    }
}

/// Writes the verification link to the log instead of sending mail.
///
/// For local development when no mail provider is configured.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Notifier for LogMailer {
    async fn send_verification(&self, notice: VerificationNotice) -> GuessResult<()> {
        info!(
            email = %notice.email,
            verify_url = %notice.verify_url,
            expires_at = %notice.expires_at,
            "Mail delivery not configured; verification link logged"
        );
        Ok(())
    }
}

/// The notifier chosen at startup.
#[derive(Debug, Clone)]
pub enum Mailer {
    Brevo(BrevoMailer),
    Log(LogMailer),
}

impl Notifier for Mailer {
    async fn send_verification(&self, notice: VerificationNotice) -> GuessResult<()> {
        match self {
            Mailer::Brevo(m) => m.send_verification(notice).await,
            Mailer::Log(m) => m.send_verification(notice).await,
        }
    }
}

fn html_body(notice: &VerificationNotice) -> String {
    format!(
        "<h2>Welcome to Guess Game, {name}!</h2>\
         <p>Click the link below to verify your email:</p>\
         <a href=\"{url}\">{url}</a>\
         <p>This link expires in {window}.</p>",
        name = escape_html(&notice.username),
        url = notice.verify_url,
        window = describe_window(notice.valid_for_secs),
    )
}

fn text_body(notice: &VerificationNotice) -> String {
    format!(
        "Welcome to Guess Game!\n\nVerify your email by opening this link:\n{}\n\nThis link expires in {}.\n",
        notice.verify_url,
        describe_window(notice.valid_for_secs),
    )
}

/// Human wording for a validity window, e.g. "15 minutes" or "2 hours".
fn describe_window(secs: u64) -> String {
    let (amount, unit) = if secs >= 3600 && secs % 3600 == 0 {
        (secs / 3600, "hour")
    } else if secs >= 60 {
        (secs.div_ceil(60), "minute")
    } else {
        (secs, "second")
    };
    if amount == 1 {
        format!("1 {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
