use weave::config::env;

/// Mail configuration
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Mail driver (`log` or `smtp`)
    pub driver: String,
    /// SMTP host
    pub host: String,
    /// SMTP port
    pub port: u16,
    /// Default from email address
    pub from_address: String,
}

impl MailConfig {
    /// Build config from environment variables
    pub fn from_env() -> Self {
        Self {
            driver: env("MAIL_DRIVER", "log".to_string()),
            host: env("MAIL_HOST", "localhost".to_string()),
            port: env("MAIL_PORT", 587),
            from_address: env("MAIL_FROM_ADDRESS", "hello@example.com".to_string()),
        }
    }
}
