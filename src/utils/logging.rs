/// 日志工具模块
///
/// 提供运行横幅和统计输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::orchestrator::RunStats;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始抓取 {} 时事测验", config.source_name);
    info!(
        "🌐 翻译: {} → {}，页面内并发数: {}",
        config.source_language, config.target_language, config.translate_workers
    );
    info!("{}", "=".repeat(60));
}

/// 记录 URL 发现结果
pub fn log_urls_discovered(processed: usize, new_urls: usize) {
    info!("✓ 已处理过 {} 个 URL", processed);
    info!("📋 发现 {} 个新 URL 待处理", new_urls);
}

/// 记录单个 URL 开始处理
pub fn log_url_start(position: usize, total: usize, url: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📄 [{}/{}] {}", position, total, url);
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &RunStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 抓取任务完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.completed, stats.discovered);
    info!("⏭️ 无题目: {}", stats.no_content);
    info!("❌ 失败: {}", stats.failed);
    info!("🔔 通知送达: {}", stats.notified);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
