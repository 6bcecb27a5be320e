use anyhow::{anyhow, Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::config::SmtpConfig;

/// SMTP delivery with a generic send timeout. Templates are plain text with
/// `{{placeholder}}` substitution.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    send_timeout: Duration,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("from", &self.from)
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}

const OTP_TEMPLATE: &str = "Hi,\n\n\
Your {{purpose}} code is: {{code}}\n\n\
The code expires in 15 minutes. If you did not request it, ignore this email.\n\n\
— {{app_name}}";

const NOTIFICATION_TEMPLATE: &str = "Hi,\n\n\
{{title}}\n\n\
{{body}}\n\n\
— {{app_name}}";

impl EmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("invalid SMTP relay host")?
            .port(config.port);

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        Ok(Self {
            mailer: builder.build(),
            from: format!("{} <{}>", config.from_name, config.from_email),
            send_timeout: config.send_timeout,
        })
    }

    pub async fn send_otp_code(&self, to: &str, purpose: &str, code: &str) -> Result<()> {
        let purpose_text = match purpose {
            "activation" => "account activation",
            "password_reset" => "password reset",
            other => other,
        };

        let body = render(
            OTP_TEMPLATE,
            &[("purpose", purpose_text), ("code", code), ("app_name", "Gymdesk")],
        );

        self.send(to, &format!("Your Gymdesk {} code", purpose_text), &body)
            .await
    }

    pub async fn send_notification(&self, to: &str, title: &str, body: &str) -> Result<()> {
        let rendered = render(
            NOTIFICATION_TEMPLATE,
            &[("title", title), ("body", body), ("app_name", "Gymdesk")],
        );

        self.send(to, title, &rendered).await
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(self.from.parse().context("invalid from address")?)
            .to(to.parse().context("invalid recipient address")?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        tokio::time::timeout(self.send_timeout, self.mailer.send(message))
            .await
            .map_err(|_| anyhow!("SMTP send timed out"))?
            .context("SMTP send failed")?;

        Ok(())
    }
}

fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_rendering() {
        let rendered = render(
            "code {{code}} for {{purpose}}",
            &[("code", "123456"), ("purpose", "activation")],
        );
        assert_eq!(rendered, "code 123456 for activation");
    }

    #[test]
    fn test_unknown_placeholders_left_intact() {
        let rendered = render("hello {{name}}", &[("other", "x")]);
        assert_eq!(rendered, "hello {{name}}");
    }
}
