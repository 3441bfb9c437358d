//! # PDF Batch Fetch
//!
//! 读取产品表格，为每个产品获取 PDF 链接（表格自带或通过浏览器搜索），
//! 下载到清洗过的文件名下，并持续记录进度、定期保存检查点。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure / Browser）
//! - `browser/` - 启动独立的无头浏览器，`BrowserSession` 保证会话在任何路径下都被释放
//! - `infrastructure/` - `JsExecutor` 持有 page，提供 goto() / eval() / wait_for() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条记录
//! - `BrowserSearch` - 按产品名搜索下载链接
//! - `PdfFetcher` - 流式下载 PDF
//! - `ProgressLog` / `CheckpointWriter` - 进度日志与检查点
//! - `sanitize_filename` / `OutputLayout` - 文件名与输出目录规划
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整处理流程（resolve → fetch → Outcome）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 加载、并发调度、单一写者消费结果
//! - `orchestrator/batch_state` - 结果表、进度日志、检查点节奏
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::BrowserSession;
pub use config::Config;
pub use error::{BatchError, FetchError};
pub use infrastructure::JsExecutor;
pub use models::{DownloadStatus, Outcome, Record};
pub use orchestrator::{App, BatchReport};
pub use services::SearchProvider;
pub use utils::logger;
pub use workflow::{RecordCtx, RecordFlow};
