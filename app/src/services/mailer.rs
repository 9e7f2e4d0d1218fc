use std::sync::Arc;

use weave::{injectable, service, Injectable};

use crate::config::MailConfig;

#[service(LogMailer, SmtpMailer)]
pub trait Mailer {
    fn send(&self, to: &str, body: &str) -> String;
}

/// Writes mail to the log instead of sending it
#[derive(Injectable)]
pub struct LogMailer {
    #[inject]
    config: Arc<MailConfig>,
}

impl Mailer for LogMailer {
    fn send(&self, to: &str, body: &str) -> String {
        tracing::info!(from = %self.config.from_address, to, "mail logged");
        format!("[log] {} -> {}: {}", self.config.from_address, to, body)
    }
}

pub struct SmtpMailer {
    address: String,
    from: String,
}

#[injectable]
impl SmtpMailer {
    pub fn connect(config: Arc<MailConfig>) -> Result<Self, String> {
        if config.host.is_empty() {
            return Err("MAIL_HOST is empty".to_string());
        }
        Ok(Self {
            address: format!("{}:{}", config.host, config.port),
            from: config.from_address.clone(),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, body: &str) -> String {
        format!("[smtp {}] {} -> {}: {}", self.address, self.from, to, body)
    }
}
