use async_trait::async_trait;

use super::message::OutgoingEmail;
use crate::errors::Result;

/// 一种邮件发送通道
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// 日志中使用的通道名称
    fn name(&self) -> &str;

    async fn deliver(&self, email: &OutgoingEmail) -> Result<()>;
}
