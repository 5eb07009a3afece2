// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 环境变量:
// - RUST_LOG: 过滤器（默认只放开本 crate 的 info）
// - CATALOG_PARAMS_LOG_FORMAT: text（默认）/ json
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的过滤器
const DEFAULT_FILTER: &str = "warn,catalog_params=info";

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// 从 CATALOG_PARAMS_LOG_FORMAT 读取，未知值回退 Text
    pub fn from_env() -> Self {
        match std::env::var("CATALOG_PARAMS_LOG_FORMAT") {
            Ok(v) if v.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化日志系统（格式取自环境变量）
///
/// # 示例
/// ```no_run
/// use catalog_params::logging;
/// logging::init();
/// ```
pub fn init() {
    init_with(LogFormat::from_env());
}

/// 按指定格式初始化；JSON 供采集管道解析
pub fn init_with(format: LogFormat) {
    match format {
        LogFormat::Text => fmt()
            .with_env_filter(env_filter())
            .with_target(true)
            .with_line_number(true)
            .init(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(env_filter())
            .with_target(true)
            .init(),
    }
}

/// 初始化测试环境的日志系统
///
/// 使用 debug 级别并写入测试输出；重复调用安全
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("catalog_params=debug"))
        .with_test_writer()
        .try_init();
}
