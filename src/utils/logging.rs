/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use crate::config::Config;
use crate::orchestrator::BatchReport;
use tracing::info;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量 PDF 下载模式");
    info!("📊 最大并发数: {}", config.max_workers);
    info!("💾 每 {} 条保存一次检查点", config.checkpoint_interval);
    if let Some(size) = config.partition_size {
        info!("📂 按每 {} 条划分输出子目录", size);
    }
    info!("{}", "=".repeat(60));
}

/// 记录加载信息
///
/// # 参数
/// - `total`: 记录总数
/// - `direct`: 自带链接的记录数
/// - `max_workers`: 最大并发数
pub fn log_records_loaded(total: usize, direct: usize, max_workers: usize) {
    info!("✓ 找到 {} 条待处理的记录", total);
    info!("🔗 自带链接: {}, 需要搜索: {}", direct, total - direct);
    info!("📋 最多同时处理 {} 条\n", max_workers);
}

/// 记录检查点保存信息
pub fn log_checkpoint_saved(completed: usize, total: usize, path: &str) {
    info!("\n{}", "─".repeat(60));
    info!("💾 进度已保存: {}/{} 条已处理 -> {}", completed, total, path);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(report: &BatchReport, config: &Config) {
    info!("\n{}", "=".repeat(60));
    if report.interrupted {
        info!("⏹️ 处理已中断");
    } else {
        info!("📊 全部处理完成统计");
    }
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📦 已处理: {}/{}", report.processed(), report.total);
    info!("✅ 下载成功: {}", report.downloaded);
    info!("❌ HTTP 失败: {}", report.failed);
    info!("⚠️ 错误: {} (其中解析链接失败 {})", report.errors, report.resolution_errors);
    if report.pending > 0 {
        info!("⏸️ 未处理: {}", report.pending);
    }
    if report.checkpoint_failures > 0 {
        info!("💥 检查点写入失败: {} 次", report.checkpoint_failures);
    }
    info!("{}", "=".repeat(60));
    info!("\n结果表格: {}", config.output_sheet_path);
    info!("进度日志: {}", config.progress_log_path);
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
