//! 进度日志 - 业务能力层
//!
//! 只负责"追加写 progress log"能力，每条完成的记录一行

use crate::models::Outcome;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 进度日志
///
/// 职责：
/// - 按完成顺序追加 `Product: .., PDF Link: .., Status: ..` 行
/// - 每次运行开始时追加一段带时间的分隔头，不覆盖历史记录
/// - 只由批处理的唯一消费者调用，不做加锁
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入本次运行的分隔头
    pub fn start_run(&self, total: usize) -> Result<()> {
        let header = format!(
            "{}\nRun started {} - {} records\n{}\n",
            "=".repeat(60),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            total,
            "=".repeat(60)
        );
        self.append_raw(&header)
    }

    /// 追加一条结果
    pub fn append(&self, outcome: &Outcome) -> Result<()> {
        debug!("写入进度: #{} {}", outcome.position + 1, outcome.name);
        self.append_raw(&format!("{}\n", outcome.log_line()))
    }

    fn append_raw(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("无法创建日志目录: {}", parent.display()))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("无法打开进度日志: {}", self.path.display()))?;

        file.write_all(text.as_bytes())
            .with_context(|| format!("无法写入进度日志: {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::Record;

    #[test]
    fn test_append_keeps_previous_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = ProgressLog::new(dir.path().join("logs").join("process_log.txt"));

        let a = Record::new(0, "Aspirin", Some("https://a/1.pdf".into()));
        let b = Record::new(1, "Ibuprofen", None);

        log.start_run(2).unwrap();
        log.append(&Outcome::downloaded(&a, a.source_ref.clone(), "Output/Aspirin.pdf".into()))
            .unwrap();
        log.append(&Outcome::failed(&b, None, FetchError::HttpStatus(503)))
            .unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[1].starts_with("Run started"));
        assert_eq!(
            lines[3],
            "Product: Aspirin, PDF Link: https://a/1.pdf, Status: Downloaded"
        );
        assert_eq!(
            lines[4],
            "Product: Ibuprofen, PDF Link: , Status: Failed: 503"
        );
    }
}
