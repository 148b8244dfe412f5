use async_trait::async_trait;
use lettre::message::Mailbox;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::message::OutgoingEmail;
use super::transport::EmailTransport;
use crate::config::MailApiConfig;
use crate::errors::{Result, TutorHubError};

/// 事务邮件 HTTP API 通道
///
/// 以 JSON 提交邮件，`Authorization: Bearer <api_key>` 认证，2xx 视为成功。
pub struct HttpApiTransport {
    http: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ApiAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl From<&Mailbox> for ApiAddress {
    fn from(mailbox: &Mailbox) -> Self {
        Self {
            email: mailbox.email.to_string(),
            name: mailbox.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiPayload<'a> {
    from: ApiAddress,
    to: Vec<ApiAddress>,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

impl HttpApiTransport {
    pub fn new(config: &MailApiConfig, timeout: Duration) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(TutorHubError::mail_config("邮件 API endpoint 未配置"));
        }
        if config.api_key.is_empty() {
            return Err(TutorHubError::mail_config("邮件 API key 未配置"));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TutorHubError::mail_config(format!("创建HTTP客户端失败: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn payload(email: &OutgoingEmail) -> ApiPayload<'_> {
        ApiPayload {
            from: ApiAddress::from(&email.from),
            to: vec![ApiAddress::from(&email.to)],
            subject: &email.subject,
            text: &email.text,
            html: email.html.as_deref(),
        }
    }
}

#[async_trait]
impl EmailTransport for HttpApiTransport {
    fn name(&self) -> &str {
        "http-api"
    }

    async fn deliver(&self, email: &OutgoingEmail) -> Result<()> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&Self::payload(email))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            debug!("Mail API accepted message with status {}", status);
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(TutorHubError::mail_delivery(format!(
                "邮件 API 返回 {status}: {body}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::EmailMessage;

    #[test]
    fn test_payload_shape() {
        let from: Mailbox = "TutorHub <no-reply@tutorhub.local>".parse().unwrap();
        let email =
            OutgoingEmail::build(&EmailMessage::new("ada@example.com", "Hi", "Body"), &from)
                .unwrap();

        let json = serde_json::to_value(HttpApiTransport::payload(&email)).unwrap();
        assert_eq!(json["from"]["email"], "no-reply@tutorhub.local");
        assert_eq!(json["from"]["name"], "TutorHub");
        assert_eq!(json["to"][0]["email"], "ada@example.com");
        assert_eq!(json["subject"], "Hi");
        assert!(json.get("html").is_none());
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let config = MailApiConfig {
            enabled: true,
            endpoint: "https://mail.example.com/send".into(),
            api_key: String::new(),
        };
        assert!(HttpApiTransport::new(&config, Duration::from_secs(5)).is_err());
    }
}
