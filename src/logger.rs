//! 日志初始化
//!
//! 默认级别为 info，可以通过 `RUST_LOG` 覆盖

use tracing_subscriber::EnvFilter;

/// 初始化全局日志；重复调用时忽略
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .try_init();
}
