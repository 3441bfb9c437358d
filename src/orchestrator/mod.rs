//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量调度和结果汇总，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量记录处理器
//! - 加载输入、规划输出路径
//! - 控制并发数量（Semaphore）
//! - 消费结果通道，输出全局统计信息
//!
//! ### `batch_state` - 批处理状态
//! - 唯一持有结果表、进度日志和检查点写入器
//! - 每完成 N 条保存一次检查点
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Record>)
//!     ↓
//! workflow::RecordFlow (处理单个 Record)
//!     ↓
//! services (能力层：resolve / search / fetch / log / checkpoint)
//!     ↓
//! browser + infrastructure (基础设施：BrowserSession、JsExecutor)
//! ```

pub mod batch_processor;
pub mod batch_state;

// 重新导出主要类型
pub use batch_processor::App;
pub use batch_state::{BatchReport, BatchState};
