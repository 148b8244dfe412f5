use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::time::Duration;
use tracing::debug;

use super::message::OutgoingEmail;
use super::transport::EmailTransport;
use crate::config::SmtpConfig;
use crate::errors::{Result, TutorHubError};

/// SMTP 通道（STARTTLS 或隐式 TLS）
pub struct SmtpTransport {
    name: &'static str,
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// 明文连接后升级 TLS，通常为 587 端口
    pub fn starttls(config: &SmtpConfig, timeout: Duration) -> Result<Self> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?;
        Ok(Self {
            name: "smtp-starttls",
            inner: Self::finish(builder, config, timeout)?,
        })
    }

    /// 直接 TLS 连接，通常为 465 端口
    pub fn ssl(config: &SmtpConfig, timeout: Duration) -> Result<Self> {
        let builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?;
        Ok(Self {
            name: "smtp-ssl",
            inner: Self::finish(builder, config, timeout)?,
        })
    }

    fn finish(
        builder: lettre::transport::smtp::AsyncSmtpTransportBuilder,
        config: &SmtpConfig,
        timeout: Duration,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        if config.host.trim().is_empty() {
            return Err(TutorHubError::mail_config("SMTP host 未配置"));
        }

        let mut builder = builder.port(config.port).timeout(Some(timeout));
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ));
        }

        debug!("SMTP transport configured for {}:{}", config.host, config.port);
        Ok(builder.build())
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    fn name(&self) -> &str {
        self.name
    }

    async fn deliver(&self, email: &OutgoingEmail) -> Result<()> {
        let response = self.inner.send(email.message.clone()).await?;
        debug!("{} accepted message: {:?}", self.name, response.code());
        Ok(())
    }
}
