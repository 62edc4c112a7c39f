use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;
use std::error::Error;

/// SMTP notifier configured from the process environment.
///
/// Reads `SMTP_SERVER`, `SMTP_PORT` (default 587), `SMTP_USER` and
/// `SMTP_PASSWORD` when constructed; the connection uses STARTTLS against
/// the relay. Sends are synchronous with no retry or queue.
pub struct Mailer {
    smtp: SmtpTransport,
    from: String,
}

impl Mailer {
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let server = env::var("SMTP_SERVER").map_err(|_| "SMTP_SERVER is not set")?;
        let port: u16 = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()?;
        let user = env::var("SMTP_USER").map_err(|_| "SMTP_USER is not set")?;
        let password = env::var("SMTP_PASSWORD").map_err(|_| "SMTP_PASSWORD is not set")?;

        let creds = Credentials::new(user.clone(), password);

        let smtp = SmtpTransport::starttls_relay(&server)?
            .credentials(creds)
            .port(port)
            .build();

        Ok(Mailer { smtp, from: user })
    }

    /// Send one plain-text message and wait for the relay's response.
    pub fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), Box<dyn Error>> {
        let email = Message::builder()
            .from(self.from.parse()?)
            .to(recipient.parse()?)
            .subject(subject)
            .body(body.to_string())?;

        self.smtp.send(&email)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_requires_relay_settings() {
        env::remove_var("SMTP_SERVER");
        env::remove_var("SMTP_USER");
        env::remove_var("SMTP_PASSWORD");
        assert!(Mailer::from_env().is_err());

        env::set_var("SMTP_SERVER", "smtp.example.com");
        env::set_var("SMTP_USER", "ops@example.com");
        env::set_var("SMTP_PASSWORD", "secret");
        let mailer = Mailer::from_env().expect("relay settings present");
        assert_eq!(mailer.from, "ops@example.com");

        env::remove_var("SMTP_SERVER");
        env::remove_var("SMTP_USER");
        env::remove_var("SMTP_PASSWORD");
    }
}
