//! 记录处理上下文
//!
//! 封装"我正在处理第几条记录、它要写到哪里"这一信息

use crate::models::Record;
use std::fmt::Display;
use std::path::PathBuf;

/// 记录处理上下文
#[derive(Debug, Clone)]
pub struct RecordCtx {
    pub record: Record,

    /// 规划好的输出文件路径
    pub target: PathBuf,

    /// 记录总数（仅用于日志显示）
    pub total: usize,
}

impl RecordCtx {
    pub fn new(record: Record, target: PathBuf, total: usize) -> Self {
        Self {
            record,
            target,
            total,
        }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[记录 {}/{}]",
            self.record.position + 1,
            self.total
        )
    }
}
