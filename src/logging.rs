// ==========================================
// 课堂座位编排系统 - 日志初始化
// ==========================================
// 工具: tracing-subscriber (fmt + EnvFilter)
// 环境变量:
// - RUST_LOG: 过滤器, 默认 seat_arrange=info
// - SEAT_ARRANGE_LOG_FORMAT: text (默认) / json (宿主程序采集)
// 规则: 全局订阅者只安装一次, 重复初始化返回 false 而不是 panic
// ==========================================

use std::str::FromStr;
use tracing_subscriber::{fmt, EnvFilter};

/// 输出格式环境变量名
pub const LOG_FORMAT_ENV: &str = "SEAT_ARRANGE_LOG_FORMAT";

const DEFAULT_DIRECTIVE: &str = "seat_arrange=info";

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("未知日志格式: {}", other)),
        }
    }
}

impl LogFormat {
    /// 从环境变量读取, 缺失或无法识别时用 Text
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }
}

/// RUST_LOG 优先, 否则使用给定的默认过滤器
fn env_filter_or(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// 按指定格式安装全局订阅者
///
/// # 返回
/// - true: 本次安装成功
/// - false: 已有全局订阅者
pub fn init_with(format: LogFormat) -> bool {
    let filter = env_filter_or(DEFAULT_DIRECTIVE);
    let installed = match format {
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init(),
    };
    installed.is_ok()
}

/// 按环境变量选择格式并初始化
///
/// # 示例
/// ```no_run
/// seat_arrange::logging::init();
/// ```
pub fn init() -> bool {
    init_with(LogFormat::from_env())
}

/// 测试用: debug 级别, 输出交给测试框架捕获
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("seat_arrange=debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_format() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        init_test();
        assert!(!init_with(LogFormat::Json));
        assert!(!init());
    }
}
