use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

/// 运行中调整日志级别的句柄
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "quiz_client=debug,quiz_client::workflow=debug"
    } else {
        "quiz_client=info"
    }
}

/// 初始化 tracing
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择默认级别。
/// 返回的句柄用于读完配置文件后再调整级别；重复初始化时返回 None。
pub fn init(verbose: bool) -> Option<FilterHandle> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into());
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .ok()
        .map(|_| handle)
}

/// 配置加载之前，只能从环境变量判断是否输出详细日志
pub fn verbose_from_env() -> bool {
    std::env::var("VERBOSE_LOGGING").is_ok_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// 按配置调整日志级别；设置了 `RUST_LOG` 时保持不变
pub fn set_verbose(handle: &FilterHandle, verbose: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Err(e) = handle.reload(EnvFilter::new(default_filter(verbose))) {
        warn!("调整日志级别失败: {}", e);
    }
}

/// 初始化会话日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n答题会话日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 限时答题客户端");
    info!("🌐 后端地址: {}", config.backend_url);
    info!(
        "⏱️ 答题时限: {} 秒 | 超时策略: {:?}",
        config.quiz_time_limit_secs, config.expiry_policy
    );
    match config.proctor_browser_port {
        Some(port) => info!("🖥️ 全屏监考: 浏览器调试端口 {}", port),
        None => info!("🖥️ 全屏监考: 未启用"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录题目加载信息
///
/// # 参数
/// - `ctx`: 会话上下文的显示文本
/// - `total`: 题目数
/// - `time_limit_secs`: 时限
pub fn log_quiz_loaded(ctx: &str, total: usize, time_limit_secs: u32) {
    info!("{} ✓ 加载了 {} 道题", ctx, total);
    info!("{} ⏱️ 时限 {}", ctx, format_clock(time_limit_secs));
}

/// 打印单次答题的统计信息
///
/// # 参数
/// - `outcome`: 结束方式
/// - `answered`: 已作答题数
/// - `total`: 题目总数
/// - `log_file_path`: 日志文件路径
pub fn print_quiz_summary(outcome: &str, answered: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 答题结束");
    info!(
        "结束时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🏁 结束方式: {}", outcome);
    info!("✏️ 已作答: {}/{}", answered, total);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 把秒数格式化为 `m:ss`
pub fn format_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(599), "9:59");
        assert_eq!(format_clock(61), "1:01");
        assert_eq!(format_clock(0), "0:00");
    }

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(false), "quiz_client=info");
        assert!(default_filter(true).starts_with("quiz_client=debug"));
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("一二三四五六", 3), "一二三...");
    }
}
