use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use super::templates::{CandidateConfirmation, HrAlert};
use super::Notifier;
use crate::config::{EmailConfig, SmtpTls};
use crate::error::{Error, Result};
use crate::utils::time;

type Transport = AsyncSmtpTransport<Tokio1Executor>;

/// SMTP notifier. A notifier built from an invalid configuration still
/// exists, but every send fails with a configuration error.
pub struct EmailNotifier {
    config: EmailConfig,
    transport: std::result::Result<Transport, String>,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        let transport = validate(&config).and_then(|()| build_transport(&config));
        if let Err(reason) = &transport {
            tracing::warn!(reason = %reason, "Email configuration is invalid; notifications will fail");
        }
        Self { config, transport }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_ok()
    }

    async fn send_html(&self, to: &str, subject: String, body: String) -> Result<()> {
        let transport = self
            .transport
            .as_ref()
            .map_err(|reason| Error::Config(format!("Email not configured: {}", reason)))?;

        let from: Mailbox = format!("{} <{}>", self.config.company_name, self.config.from_email)
            .parse()
            .or_else(|_| self.config.from_email.parse())?;
        let message = Message::builder()
            .from(from)
            .to(to.parse()?)
            .subject(subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        transport.send(message).await?;
        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send_candidate_confirmation(
        &self,
        candidate_email: &str,
        candidate_name: &str,
        position: &str,
    ) -> Result<()> {
        let mail = CandidateConfirmation {
            candidate_name,
            position,
            company_name: &self.config.company_name,
        };
        self.send_html(candidate_email, mail.subject(), mail.render())
            .await
    }

    async fn send_hr_alert(
        &self,
        candidate_email: &str,
        candidate_name: &str,
        position: &str,
        resume_url: &str,
    ) -> Result<()> {
        let received_at = time::human_readable(time::now());
        let mail = HrAlert {
            candidate_name,
            candidate_email,
            position,
            resume_url,
            company_name: &self.config.company_name,
            received_at: &received_at,
        };
        self.send_html(&self.config.hr_email, mail.subject(), mail.render())
            .await
    }
}

fn validate(config: &EmailConfig) -> std::result::Result<(), String> {
    if config.smtp_host.trim().is_empty() {
        return Err("SMTP host is required".into());
    }
    if config.smtp_port == 0 {
        return Err("SMTP port must be non-zero".into());
    }
    if config.smtp_username.is_empty() {
        return Err("SMTP username is required".into());
    }
    if config.smtp_password.is_empty() {
        return Err("SMTP password is required".into());
    }
    if config.from_email.parse::<Mailbox>().is_err() {
        return Err(format!("Invalid from address: {}", config.from_email));
    }
    Ok(())
}

fn build_transport(config: &EmailConfig) -> std::result::Result<Transport, String> {
    let builder = match config.tls {
        SmtpTls::StartTls => Transport::starttls_relay(&config.smtp_host),
        SmtpTls::Wrapper => Transport::relay(&config.smtp_host),
        SmtpTls::None => Ok(Transport::builder_dangerous(&config.smtp_host)),
    }
    .map_err(|e| format!("Failed to build SMTP transport: {}", e))?;

    Ok(builder
        .port(config.smtp_port)
        .credentials(Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        ))
        .build())
}
