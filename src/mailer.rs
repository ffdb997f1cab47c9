//! Outbound verification email.
//!
//! `SmtpMailer` is used when SMTP is configured; otherwise `LogMailer` stands
//! in so local development can complete registration from the logs.

use anyhow::Context;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, info};

use crate::config::SmtpConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, to: &str, name: &str, url: &str) -> anyhow::Result<()>;
}

fn verification_body(name: &str, url: &str) -> String {
    format!(
        "Hi {name},\n\n\
         Please verify your email address to activate your account:\n\n\
         {url}\n\n\
         If you did not create an account, you can ignore this message.\n"
    )
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .with_context(|| format!("smtp relay {}", cfg.host))?
            .port(cfg.port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();
        let from = cfg.from.parse::<Mailbox>().context("parse EMAIL_FROM")?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, to: &str, name: &str, url: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse::<Mailbox>().context("parse recipient")?)
            .subject("Your account verification link")
            .header(ContentType::TEXT_PLAIN)
            .body(verification_body(name, url))
            .context("build verification email")?;
        self.transport
            .send(message)
            .await
            .context("smtp send")?;
        info!(to = %to, "verification email sent");
        Ok(())
    }
}

/// Logs instead of delivering.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification(&self, to: &str, _name: &str, url: &str) -> anyhow::Result<()> {
        info!(to = %to, "verification email (log only)");
        debug!(url = %url, "verification link");
        Ok(())
    }
}
