//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use anyhow::Result;
use std::fs;
use tracing::info;

use crate::config::Config;

/// 初始化日志文件，写入带时间戳的表头
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n批改日志 - {}\n{}\n\n",
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
    info!("🚀 程序启动 - 批量批改模式");
    info!("📊 最大并发数: {}", config.max_concurrent_sessions);
    if config.oracle_enabled() {
        info!("🤖 模型梯队: {}", config.llm_model_names.join(" → "));
        info!("⏱️ 单次调用超时: {} 秒", config.attempt_timeout_secs);
    } else {
        info!("📐 未配置大模型，只使用本地规则判分");
    }
    info!("{}", "=".repeat(60));
}

/// 记录试卷加载信息
pub fn log_papers_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 份待批改的试卷", total);
    info!("📋 将以每批 {} 份的方式处理", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

/// 记录批次开始信息
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批试卷: {}-{} / 共 {} 份", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(
    success: usize,
    failed: usize,
    total: usize,
    average_score: Option<f64>,
    config: &Config,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部批改完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    if let Some(average) = average_score {
        info!("📈 平均综合得分: {:.2}", average);
    }
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", config.report_folder);
    info!("日志已保存至: {}", config.output_log_file);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本，超长时以 "..." 结尾
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("细胞分裂的过程", 4), "细胞分裂...");
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let path = std::env::temp_dir().join(format!("exam_grader_log_{}.txt", std::process::id()));
        let path_str = path.to_string_lossy().to_string();

        init_log_file(&path_str).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("批改日志"));

        let _ = fs::remove_file(&path);
    }
}
