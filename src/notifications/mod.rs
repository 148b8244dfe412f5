//! 邮件通知
//!
//! 一封邮件只构建一次，然后按配置顺序（STARTTLS → SSL → HTTP API）依次尝试，
//! 第一个成功的通道即停止，全部失败只返回 `false`。

pub mod api;
pub mod mailer;
pub mod message;
pub mod smtp;
pub mod templates;
pub mod transport;

pub use api::HttpApiTransport;
pub use mailer::Mailer;
pub use message::{EmailMessage, OutgoingEmail};
pub use smtp::SmtpTransport;
pub use transport::EmailTransport;
