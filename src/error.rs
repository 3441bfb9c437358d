//! 错误类型
//!
//! - `FetchError`：单条记录范围内的错误，被捕获、分类并写入 Outcome，不会中断批处理
//! - `BatchError`：批处理级别的错误（加载输入、写检查点、配置），需要告知操作者

use std::path::Path;
use thiserror::Error;

/// 单条记录处理错误
///
/// 需要 `Clone`：它会被存进 `DownloadStatus::Error` 并随检查点反复写出。
/// 展示文本会直接进入输出表格的 `Download Status` 列。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 搜索步骤在限定时间内未就绪
    #[error("resolution timed out after {secs}s while waiting for {step}")]
    ResolutionTimeout { step: String, secs: u64 },

    /// 搜索结果中没有可用的链接
    #[error("no PDF link found for '{name}'")]
    ResolutionNotFound { name: String },

    /// 没有链接，产品名也为空，无从搜索
    #[error("product name is blank and no PDF link was given")]
    BlankName,

    /// 浏览器启动或脚本执行失败
    #[error("browser failure: {0}")]
    Browser(String),

    /// 网络层错误（DNS、TLS、连接重置、超时、读取响应体失败）
    #[error("transport error: {0}")]
    Transport(String),

    /// 请求完成但状态码不是 2xx
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// 写入输出文件失败
    #[error("failed to write {path}: {message}")]
    Persistence { path: String, message: String },

    /// 处理任务异常退出（panic）
    #[error("worker task failed: {0}")]
    Internal(String),
}

impl FetchError {
    pub fn transport(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }

    pub fn browser(err: impl std::fmt::Display) -> Self {
        FetchError::Browser(err.to_string())
    }

    pub fn persistence(path: &Path, err: impl std::fmt::Display) -> Self {
        FetchError::Persistence {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    /// 是否属于"解析下载地址"阶段的失败
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            FetchError::ResolutionTimeout { .. }
                | FetchError::ResolutionNotFound { .. }
                | FetchError::BlankName
                | FetchError::Browser(_)
        )
    }
}

/// 批处理级别错误
#[derive(Debug, Error)]
pub enum BatchError {
    /// 读取输入表格失败
    #[error("无法加载输入表格 {path}: {message}")]
    InputLoad { path: String, message: String },

    /// 输入表格缺少必需的列
    #[error("输入表格 {path} 缺少必需的列 '{column}'")]
    MissingColumn { path: String, column: String },

    /// 不支持的表格格式
    #[error("不支持的表格格式: {path}")]
    UnsupportedFormat { path: String },

    /// 写入检查点失败（已重试）
    #[error("写入检查点 {path} 失败: {message}")]
    Checkpoint { path: String, message: String },

    /// 配置值不合法
    #[error("配置错误: {0}")]
    InvalidConfig(String),
}

impl BatchError {
    pub fn input_load(path: &Path, err: impl std::fmt::Display) -> Self {
        BatchError::InputLoad {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn checkpoint(path: &Path, err: impl std::fmt::Display) -> Self {
        BatchError::Checkpoint {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
