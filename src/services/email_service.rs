use crate::error::{Error, Result};
use crate::services::settings_service::SettingsService;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

/// Transport seam so tests can swap SMTP for a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> anyhow::Result<()>;
}

#[async_trait]
impl Mailer for AsyncSmtpTransport<Tokio1Executor> {
    async fn send(&self, message: Message) -> anyhow::Result<()> {
        AsyncTransport::send(self, message)
            .await
            .map(|_resp| ())
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    from: String,
    settings: SettingsService,
}

pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
    }
    rendered
}

pub fn default_template(key: &str) -> &'static str {
    match key {
        "welcome" => {
            "Hello {{name}}, your account has been created. Sign in with {{email}} \
             and the temporary password {{password}}."
        }
        "application_received" => {
            "Hello {{name}}, a new application for \"{{job_title}}\" has been received."
        }
        "status_update" => {
            "Hello {{name}}, the status of your application for \"{{job_title}}\" is now {{status}}."
        }
        "interview_scheduled" => {
            "Hello {{name}}, an interview for \"{{job_title}}\" has been scheduled on {{date}} \
             from {{start_time}} to {{end_time}} at {{location}}."
        }
        "help_resolved" => "Hello {{name}}, your help request \"{{subject}}\" has been resolved.",
        _ => "Hello {{name}}.",
    }
}

impl EmailService {
    pub fn new(settings: SettingsService) -> Self {
        let config = crate::config::get_config();
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map(|builder| builder.credentials(creds).build())
            .unwrap_or_else(|e| {
                tracing::warn!("Invalid SMTP relay {}: {}; using localhost", config.smtp_host, e);
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost").build()
            });
        Self {
            mailer: Arc::new(transport),
            from: config.smtp_from.clone(),
            settings,
        }
    }

    pub fn with_mailer(mailer: Arc<dyn Mailer>, from: &str, settings: SettingsService) -> Self {
        Self {
            mailer,
            from: from.to_string(),
            settings,
        }
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| Error::Internal(format!("Invalid from address: {:?}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| Error::BadRequest(format!("Invalid recipient address: {:?}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| Error::Internal(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| Error::Internal(format!("Email send failed: {}", e)))?;
        Ok(())
    }

    /// Renders the stored template (falling back to the built-in default)
    /// and sends it.
    pub async fn send_template(
        &self,
        to: &str,
        subject: &str,
        template_key: &str,
        vars: &[(&str, &str)],
    ) -> Result<()> {
        let template = self
            .settings
            .email_template(template_key)
            .await?
            .unwrap_or_else(|| default_template(template_key).to_string());
        let body = render_template(&template, vars);
        self.send(to, subject, &body).await
    }

    /// Fire-and-forget send. The triggering request never waits on, or
    /// fails because of, the mail transport.
    pub fn send_template_detached(
        &self,
        to: String,
        subject: String,
        template_key: &'static str,
        vars: Vec<(&'static str, String)>,
    ) {
        let service = self.clone();
        tokio::spawn(async move {
            let borrowed: Vec<(&str, &str)> =
                vars.iter().map(|(k, v)| (*k, v.as_str())).collect();
            if let Err(e) = service
                .send_template(&to, &subject, template_key, &borrowed)
                .await
            {
                tracing::error!(error = ?e, to = %to, "failed to send email");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        let rendered = render_template(
            "Hello {{name}}, status: {{status}}",
            &[("name", "Asha"), ("status", "shortlisted")],
        );
        assert_eq!(rendered, "Hello Asha, status: shortlisted");
    }

    #[test]
    fn unknown_placeholders_are_left_verbatim() {
        let rendered = render_template("Hi {{name}} ({{role}})", &[("name", "Asha")]);
        assert_eq!(rendered, "Hi Asha ({{role}})");
    }

    #[tokio::test]
    async fn mock_mailer_receives_the_built_message() {
        let mut mock = MockMailer::new();
        mock.expect_send().times(1).returning(|_| Ok(()));

        let message = Message::builder()
            .from("noreply@placement.test".parse().unwrap())
            .to("student@placement.test".parse().unwrap())
            .subject("Welcome")
            .body("Hello".to_string())
            .unwrap();
        mock.send(message).await.unwrap();
    }

    #[test]
    fn every_known_template_has_a_default() {
        for key in [
            "welcome",
            "application_received",
            "status_update",
            "interview_scheduled",
            "help_resolved",
        ] {
            assert!(default_template(key).contains("{{name}}"));
        }
    }
}
