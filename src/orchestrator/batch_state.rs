//! 批处理状态 - 编排层
//!
//! 由编排器独占：工作任务只通过通道送回 `Outcome`，从不直接接触这里的数据。
//! 进度日志追加和检查点写入都只在这里发生，天然串行。

use crate::error::{BatchError, FetchError};
use crate::models::{DownloadStatus, Outcome, Record, Sheet};
use crate::services::{CheckpointWriter, ProgressLog};
use crate::utils::logging::{log_checkpoint_saved, truncate_text};
use tracing::{error, info, warn};

/// 批处理汇总
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    pub total: usize,
    pub downloaded: usize,
    /// 非 2xx 响应
    pub failed: usize,
    pub errors: usize,
    /// `errors` 中属于解析链接阶段的数量
    pub resolution_errors: usize,
    pub pending: usize,
    pub checkpoints_saved: usize,
    pub checkpoint_failures: usize,
    pub interrupted: bool,
    /// 按完成顺序排列的全部结果
    pub outcomes: Vec<Outcome>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }
}

pub struct BatchState {
    sheet: Sheet,
    /// 按行号索引
    outcomes: Vec<Option<Outcome>>,
    /// 按完成顺序记录的行号
    completion_order: Vec<usize>,
    progress_log: ProgressLog,
    checkpoint: CheckpointWriter,
    interval: usize,
    checkpoints_saved: usize,
    checkpoint_failures: usize,
}

impl BatchState {
    pub fn new(
        sheet: Sheet,
        progress_log: ProgressLog,
        checkpoint: CheckpointWriter,
        interval: usize,
    ) -> Self {
        let rows = sheet.len();
        Self {
            sheet,
            outcomes: vec![None; rows],
            completion_order: Vec::with_capacity(rows),
            progress_log,
            checkpoint,
            interval: interval.max(1),
            checkpoints_saved: 0,
            checkpoint_failures: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn completed(&self) -> usize {
        self.completion_order.len()
    }

    /// 记录一条完成的结果：写进度日志、存入结果表，到达间隔时保存检查点
    pub async fn record(&mut self, outcome: Outcome) {
        let position = outcome.position;
        match self.outcomes.get(position) {
            Some(None) => {}
            Some(Some(_)) => {
                error!("记录 #{} 重复上报结果，已忽略", position + 1);
                return;
            }
            None => {
                error!("记录 #{} 超出范围，已忽略", position + 1);
                return;
            }
        }

        if let Err(e) = self.progress_log.append(&outcome) {
            warn!("⚠️ 写入进度日志失败: {:#}", e);
        }

        info!(
            "[{}/{}] 已处理: {}, 状态: {}",
            self.completed() + 1,
            self.total(),
            truncate_text(&outcome.name, 60),
            outcome.status
        );

        self.outcomes[position] = Some(outcome);
        self.completion_order.push(position);

        if self.completed() % self.interval == 0 {
            if let Err(e) = self.save_checkpoint().await {
                warn!("⚠️ 检查点保存失败，继续处理: {}", e);
            }
        }
    }

    /// 为没有结果的记录补上错误结果（工作任务异常退出时）
    pub async fn fill_missing(&mut self, records: &[Record], reason: &str) {
        let missing: Vec<&Record> = records
            .iter()
            .filter(|r| matches!(self.outcomes.get(r.position), Some(None)))
            .collect();
        for record in missing {
            let outcome =
                Outcome::failed(record, None, FetchError::Internal(reason.to_string()));
            self.record(outcome).await;
        }
    }

    /// 写入检查点（失败时重试一次）
    pub async fn save_checkpoint(&mut self) -> Result<(), BatchError> {
        let snapshot = self.sheet.with_outcomes(&self.outcomes);
        match self.checkpoint.save_with_retry(snapshot).await {
            Ok(()) => {
                self.checkpoints_saved += 1;
                log_checkpoint_saved(
                    self.completed(),
                    self.total(),
                    &self.checkpoint.path().display().to_string(),
                );
                Ok(())
            }
            Err(e) => {
                self.checkpoint_failures += 1;
                Err(e)
            }
        }
    }

    /// 按完成顺序返回结果
    pub fn outcomes_in_completion_order(&self) -> Vec<&Outcome> {
        self.completion_order
            .iter()
            .filter_map(|&p| self.outcomes[p].as_ref())
            .collect()
    }

    pub fn report(&self, interrupted: bool) -> BatchReport {
        let outcomes: Vec<Outcome> = self
            .outcomes_in_completion_order()
            .into_iter()
            .cloned()
            .collect();

        let mut report = BatchReport {
            total: self.total(),
            pending: self.total() - outcomes.len(),
            checkpoints_saved: self.checkpoints_saved,
            checkpoint_failures: self.checkpoint_failures,
            interrupted,
            ..Default::default()
        };
        for outcome in &outcomes {
            match &outcome.status {
                DownloadStatus::Downloaded => report.downloaded += 1,
                DownloadStatus::Failed(_) => report.failed += 1,
                DownloadStatus::Error(e) => {
                    report.errors += 1;
                    if e.is_resolution_failure() {
                        report.resolution_errors += 1;
                    }
                }
            }
        }
        report.outcomes = outcomes;
        report
    }
}
