use lettre::message::Mailbox;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::api::HttpApiTransport;
use super::message::{EmailMessage, OutgoingEmail};
use super::smtp::SmtpTransport;
use super::transport::EmailTransport;
use crate::config::MailConfig;
use crate::errors::{Result, TutorHubError};

/// 按顺序尝试各通道的邮件发送器
pub struct Mailer {
    from: Mailbox,
    transports: Vec<Box<dyn EmailTransport>>,
    attempt_timeout: Duration,
}

impl Mailer {
    pub fn new(
        from: Mailbox,
        transports: Vec<Box<dyn EmailTransport>>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            from,
            transports,
            attempt_timeout,
        }
    }

    /// 按 starttls → ssl → api 的顺序装配已启用的通道
    ///
    /// 单个通道配置错误只记录日志并跳过。
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let address = config.from_address.parse().map_err(|e| {
            TutorHubError::mail_config(format!("发件人地址无效 '{}': {e}", config.from_address))
        })?;
        let from = Mailbox::new(
            Some(config.from_name.clone()).filter(|name| !name.trim().is_empty()),
            address,
        );
        let timeout = Duration::from_secs(config.attempt_timeout.max(1));

        let mut transports: Vec<Box<dyn EmailTransport>> = Vec::new();
        if config.starttls.enabled {
            match SmtpTransport::starttls(&config.starttls, timeout) {
                Ok(transport) => transports.push(Box::new(transport)),
                Err(e) => warn!("STARTTLS transport disabled: {}", e),
            }
        }
        if config.ssl.enabled {
            match SmtpTransport::ssl(&config.ssl, timeout) {
                Ok(transport) => transports.push(Box::new(transport)),
                Err(e) => warn!("SSL transport disabled: {}", e),
            }
        }
        if config.api.enabled {
            match HttpApiTransport::new(&config.api, timeout) {
                Ok(transport) => transports.push(Box::new(transport)),
                Err(e) => warn!("HTTP API transport disabled: {}", e),
            }
        }

        if transports.is_empty() {
            warn!("No email transport enabled, outgoing emails will be dropped");
        } else {
            info!(
                "Email cascade: {}",
                transports
                    .iter()
                    .map(|t| t.name())
                    .collect::<Vec<_>>()
                    .join(" -> ")
            );
        }

        Ok(Self::new(from, transports, timeout))
    }

    pub fn transport_names(&self) -> Vec<&str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// 发送邮件，返回是否有通道投递成功
    pub async fn send(&self, message: &EmailMessage) -> bool {
        if self.transports.is_empty() {
            warn!("Dropping email to {}: no transport configured", message.to);
            return false;
        }

        let email = match OutgoingEmail::build(message, &self.from) {
            Ok(email) => email,
            Err(e) => {
                warn!("Failed to build email to {}: {}", message.to, e);
                return false;
            }
        };

        for transport in &self.transports {
            match tokio::time::timeout(self.attempt_timeout, transport.deliver(&email)).await {
                Ok(Ok(())) => {
                    info!("Email to {} delivered via {}", message.to, transport.name());
                    return true;
                }
                Ok(Err(e)) => {
                    warn!("Email via {} failed: {}", transport.name(), e);
                }
                Err(_) => {
                    warn!(
                        "Email via {} timed out after {:?}",
                        transport.name(),
                        self.attempt_timeout
                    );
                }
            }
        }

        error!("All email transports failed for {}", message.to);
        false
    }

    /// 后台发送，不等待结果
    pub fn send_in_background(self: &Arc<Self>, message: EmailMessage) {
        let mailer = Arc::clone(self);
        tokio::spawn(async move {
            mailer.send(&message).await;
        });
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    pub enum Behavior {
        Succeed,
        Fail,
        Hang,
    }

    /// 记录调用次数的测试通道
    pub struct FakeTransport {
        pub name: &'static str,
        pub behavior: Behavior,
        pub calls: Arc<AtomicUsize>,
    }

    impl FakeTransport {
        pub fn new(name: &'static str, behavior: Behavior) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    name,
                    behavior,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl EmailTransport for FakeTransport {
        fn name(&self) -> &str {
            self.name
        }

        async fn deliver(&self, _email: &OutgoingEmail) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed => Ok(()),
                Behavior::Fail => Err(TutorHubError::mail_delivery("connection refused")),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
            }
        }
    }

    pub fn mailer_with(transports: Vec<FakeTransport>) -> Mailer {
        Mailer::new(
            "TutorHub <no-reply@tutorhub.local>".parse().unwrap(),
            transports
                .into_iter()
                .map(|t| Box::new(t) as Box<dyn EmailTransport>)
                .collect(),
            Duration::from_millis(50),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{Behavior, FakeTransport, mailer_with};
    use super::*;
    use std::sync::atomic::Ordering;

    fn message() -> EmailMessage {
        EmailMessage::new("ada@example.com", "Hello", "Body")
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let (first, first_calls) = FakeTransport::new("starttls", Behavior::Succeed);
        let (second, second_calls) = FakeTransport::new("ssl", Behavior::Succeed);
        let mailer = mailer_with(vec![first, second]);

        assert!(mailer.send(&message()).await);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_failures() {
        let (first, first_calls) = FakeTransport::new("starttls", Behavior::Fail);
        let (second, second_calls) = FakeTransport::new("ssl", Behavior::Hang);
        let (third, third_calls) = FakeTransport::new("api", Behavior::Succeed);
        let mailer = mailer_with(vec![first, second, third]);

        assert!(mailer.send(&message()).await);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_fail_returns_false() {
        let (first, _) = FakeTransport::new("starttls", Behavior::Fail);
        let (second, _) = FakeTransport::new("api", Behavior::Fail);
        let mailer = mailer_with(vec![first, second]);

        assert!(!mailer.send(&message()).await);
    }

    #[tokio::test]
    async fn test_empty_cascade_returns_false() {
        assert!(!mailer_with(Vec::new()).send(&message()).await);
    }

    #[tokio::test]
    async fn test_invalid_recipient_skips_transports() {
        let (first, calls) = FakeTransport::new("starttls", Behavior::Succeed);
        let mailer = mailer_with(vec![first]);

        assert!(!mailer.send(&EmailMessage::new("nope", "x", "y")).await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_from_config_orders_enabled_transports() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let mut config = crate::config::AppConfig::get().mail.clone();
        config.starttls.enabled = true;
        config.ssl.enabled = false;
        config.api.enabled = true;
        config.api.api_key = "key".into();

        let mailer = Mailer::from_config(&config).unwrap();
        assert_eq!(mailer.transport_names(), vec!["smtp-starttls", "http-api"]);
    }
}
