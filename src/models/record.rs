//! 记录与处理结果

use crate::error::FetchError;
use std::fmt;
use std::path::PathBuf;

/// 输入表格中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 在表格中的行序号（从 0 开始，不含表头）
    pub position: usize,
    /// `index` 列的值；没有该列时等于 `position`
    pub index: usize,
    /// 产品名称
    pub name: String,
    /// 已知的 PDF 链接；为空时需要通过搜索获取
    pub source_ref: Option<String>,
}

impl Record {
    pub fn new(position: usize, name: impl Into<String>, source_ref: Option<String>) -> Self {
        Self {
            position,
            index: position,
            name: name.into(),
            source_ref,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }
}

/// 下载状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadStatus {
    Downloaded,
    /// 非 2xx 状态码
    Failed(u16),
    Error(FetchError),
}

impl DownloadStatus {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, DownloadStatus::Downloaded)
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadStatus::Downloaded => write!(f, "Downloaded"),
            DownloadStatus::Failed(code) => write!(f, "Failed: {}", code),
            DownloadStatus::Error(e) => write!(f, "Error: {}", e),
        }
    }
}

/// 单条记录的最终处理结果，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub position: usize,
    pub name: String,
    pub resolved_ref: Option<String>,
    pub status: DownloadStatus,
    /// 仅当 `status == Downloaded` 时存在
    pub output_path: Option<PathBuf>,
}

impl Outcome {
    pub fn downloaded(record: &Record, resolved_ref: Option<String>, path: PathBuf) -> Self {
        Self {
            position: record.position,
            name: record.name.clone(),
            resolved_ref,
            status: DownloadStatus::Downloaded,
            output_path: Some(path),
        }
    }

    /// 由错误构造结果：`HttpStatus` 归为 `Failed(code)`，其余归为 `Error`
    pub fn failed(record: &Record, resolved_ref: Option<String>, err: FetchError) -> Self {
        let status = match err {
            FetchError::HttpStatus(code) => DownloadStatus::Failed(code),
            other => DownloadStatus::Error(other),
        };
        Self {
            position: record.position,
            name: record.name.clone(),
            resolved_ref,
            status,
            output_path: None,
        }
    }

    /// 进度日志中的一行（不含换行）
    pub fn log_line(&self) -> String {
        format!(
            "Product: {}, PDF Link: {}, Status: {}",
            self.name,
            self.resolved_ref.as_deref().unwrap_or(""),
            self.status
        )
    }
}
