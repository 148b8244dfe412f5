//! 配置管理
//!
//! 配置来源优先级（低 → 高）：内置默认值、`config.toml`、`config.{APP_ENV}.toml`、
//! `TUTORHUB__*` 环境变量、常用的独立环境变量（`DATABASE_URL`、`JWT_SECRET` 等）。

mod loader;
mod structs;

pub use structs::*;
