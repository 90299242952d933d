//! 日志初始化模块
//!
//! 提供 tracing 日志的统一初始化。所有服务通过单一入口点配置日志，
//! 确保一致的字段命名和输出格式。

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::ObservabilityConfig;

/// 初始化 tracing（日志）
///
/// 日志级别优先读取 RUST_LOG 环境变量，其次使用配置中的 log_level。
/// log_format 为 "json" 时输出结构化日志，便于采集；否则输出人类可读格式。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = if config.log_format == "json" {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_safe() {
        let config = ObservabilityConfig::default();
        // 第一次初始化可能成功也可能因测试框架已安装全局 subscriber 而失败，
        // 重复初始化必须返回 Err 而不是 panic
        let _ = init(&config);
        assert!(init(&config).is_err());
    }
}
