use anyhow::Result;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub send_timeout: Duration,
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self> {
        let send_timeout_secs = env::var("SMTP_SEND_TIMEOUT")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        Ok(SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "no-reply@gymdesk.local".to_string()),
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Gymdesk".to_string()),
            send_timeout: Duration::from_secs(send_timeout_secs),
        })
    }
}
