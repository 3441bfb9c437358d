//! 批量记录处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量记录的调度和结果汇总。
//!
//! ## 核心功能
//!
//! 1. **批量加载**：读取输入表格，得到全部 `Record`
//! 2. **路径规划**：分发前一次性确定每条记录的输出文件
//! 3. **并发控制**：分发任务按输入顺序获取 Semaphore 许可，最多同时运行 `max_workers` 条
//! 4. **单一写者**：工作任务通过通道送回 `Outcome`，只有编排器写进度日志和检查点
//! 5. **中断处理**：收到 Ctrl-C 时停止分发、中止进行中的任务，仍然保存最终检查点
//! 6. **全局统计**：汇总所有记录的处理结果
//!
//! ## 设计特点
//!
//! - **不持有浏览器**：搜索会话由每个任务自己创建和释放
//! - **失败局部化**：单条记录的失败只体现在它的 `Outcome` 中

use crate::config::Config;
use crate::models::{load_records, Outcome};
use crate::orchestrator::batch_state::{BatchReport, BatchState};
use crate::services::{BrowserSearch, CheckpointWriter, OutputLayout, ProgressLog, SearchProvider};
use crate::utils::logging::{log_records_loaded, log_startup, print_final_stats};
use crate::workflow::{RecordCtx, RecordFlow};
use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App<S: SearchProvider = BrowserSearch> {
    config: Config,
    search: Arc<S>,
    flow: RecordFlow,
}

impl App<BrowserSearch> {
    /// 初始化应用（使用浏览器搜索）
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        log_startup(&config);

        let search = BrowserSearch::new(&config);
        Self::with_search(config, search)
    }
}

impl<S: SearchProvider> App<S> {
    /// 使用指定的搜索能力创建应用
    pub fn with_search(config: Config, search: S) -> Result<Self> {
        config.validate()?;
        let flow = RecordFlow::new(&config).context("无法创建 HTTP 客户端")?;
        Ok(Self {
            config,
            search: Arc::new(search),
            flow,
        })
    }

    /// 运行应用主逻辑，直到全部完成或收到 Ctrl-C
    pub async fn run(&self) -> Result<BatchReport> {
        self.run_until(shutdown_signal()).await
    }

    /// 运行应用主逻辑，`shutdown` 完成时视为中断
    pub async fn run_until<F>(&self, shutdown: F) -> Result<BatchReport>
    where
        F: Future<Output = ()>,
    {
        // 加载所有待处理的记录
        let input = Path::new(&self.config.input_path);
        info!("\n📁 正在加载输入表格: {}", input.display());
        let (sheet, records) = load_records(input)
            .await
            .context("加载输入表格失败")?;

        let checkpoint = CheckpointWriter::new(&self.config.output_sheet_path)?;
        let progress_log = ProgressLog::new(&self.config.progress_log_path);

        let total = records.len();
        if total == 0 {
            warn!("⚠️ 输入表格中没有记录");
        }
        let direct = records.iter().filter(|r| r.source_ref.is_some()).count();
        log_records_loaded(total, direct, self.config.max_workers);

        if let Err(e) = progress_log.start_run(total) {
            warn!("⚠️ 写入进度日志失败: {:#}", e);
        }

        // 规划输出路径
        let layout = OutputLayout::new(&self.config.output_dir, self.config.partition_size);
        let targets = layout.plan(&records);
        let jobs: Vec<RecordCtx> = records
            .iter()
            .cloned()
            .zip(targets)
            .map(|(record, target)| RecordCtx::new(record, target, total))
            .collect();

        let mut state = BatchState::new(
            sheet,
            progress_log,
            checkpoint,
            self.config.checkpoint_interval,
        );

        // 分发任务
        let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();
        let dispatcher = tokio::spawn(dispatch(
            jobs,
            self.config.max_workers,
            self.flow.clone(),
            Arc::clone(&self.search),
            tx,
        ));

        // 按完成顺序消费结果
        tokio::pin!(shutdown);
        let mut interrupted = false;
        loop {
            tokio::select! {
                received = rx.recv() => match received {
                    Some(outcome) => state.record(outcome).await,
                    None => break,
                },
                _ = &mut shutdown => {
                    warn!("⚠️ 收到中断信号，停止分发并保存已完成的结果");
                    interrupted = true;
                    dispatcher.abort();
                    while let Ok(outcome) = rx.try_recv() {
                        state.record(outcome).await;
                    }
                    break;
                }
            }
        }

        if !interrupted {
            if let Err(e) = dispatcher.await {
                error!("分发任务异常退出: {}", e);
            }
            state.fill_missing(&records, "task ended without an outcome").await;
        }

        // 最终检查点
        let final_save = state.save_checkpoint().await;
        let report = state.report(interrupted);
        print_final_stats(&report, &self.config);

        final_save.context("最终检查点写入失败")?;
        Ok(report)
    }
}

/// 按输入顺序分发任务
///
/// 先获取许可再 spawn，排队的记录按提交顺序开始执行。
/// 本函数所在任务被中止时，`JoinSet` 被丢弃，进行中的任务随之中止。
async fn dispatch<S: SearchProvider>(
    jobs: Vec<RecordCtx>,
    max_workers: usize,
    flow: RecordFlow,
    search: Arc<S>,
    tx: UnboundedSender<Outcome>,
) {
    let semaphore = Arc::new(Semaphore::new(max_workers));
    let mut units = JoinSet::new();

    for ctx in jobs {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let flow = flow.clone();
        let search = Arc::clone(&search);
        let tx = tx.clone();

        units.spawn(async move {
            let _permit = permit;
            let outcome = flow.run(search.as_ref(), &ctx).await;
            let _ = tx.send(outcome);
        });
    }
    drop(tx);

    while let Some(joined) = units.join_next().await {
        if let Err(e) = joined {
            error!("处理任务异常退出: {}", e);
        }
    }
}

/// 等待 Ctrl-C；无法注册信号处理时永不完成
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
