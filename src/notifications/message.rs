use lettre::Message;
use lettre::message::{Mailbox, MultiPart, SinglePart};

use crate::errors::{Result, TutorHubError};

/// 待发送的邮件内容
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
            html: None,
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }
}

/// 已解析地址并构建好 MIME 消息的邮件，所有通道共用
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
    pub message: Message,
}

impl OutgoingEmail {
    pub fn build(message: &EmailMessage, from: &Mailbox) -> Result<Self> {
        let to: Mailbox = message
            .to
            .trim()
            .parse()
            .map_err(|e| TutorHubError::mail_config(format!("收件人地址无效 '{}': {e}", message.to)))?;

        let builder = Message::builder()
            .from(from.clone())
            .to(to.clone())
            .subject(message.subject.clone());

        let mime = match &message.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                html.clone(),
            ))?,
            None => builder.singlepart(SinglePart::plain(message.text.clone()))?,
        };

        Ok(Self {
            from: from.clone(),
            to,
            subject: message.subject.clone(),
            text: message.text.clone(),
            html: message.html.clone(),
            message: mime,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> Mailbox {
        "TutorHub <no-reply@tutorhub.local>".parse().unwrap()
    }

    #[test]
    fn test_build_plain_message() {
        let email = OutgoingEmail::build(
            &EmailMessage::new("ada@example.com", "Hello", "Welcome aboard"),
            &sender(),
        )
        .unwrap();

        assert_eq!(email.to.email.to_string(), "ada@example.com");
        let raw = String::from_utf8(email.message.formatted()).unwrap();
        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("Welcome aboard"));
    }

    #[test]
    fn test_build_html_alternative() {
        let email = OutgoingEmail::build(
            &EmailMessage::new("ada@example.com", "Hi", "plain").with_html("<p>html</p>"),
            &sender(),
        )
        .unwrap();
        let raw = String::from_utf8(email.message.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let result = OutgoingEmail::build(&EmailMessage::new("not an address", "x", "y"), &sender());
        assert!(result.is_err());
    }
}
