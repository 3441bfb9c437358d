//! 记录处理流程 - 流程层
//!
//! 核心职责：定义"一条记录"的完整处理流程
//!
//! 流程顺序：
//! 1. （可选）目标文件已存在 → 直接视为已下载
//! 2. 解析下载地址（自带链接 / 浏览器搜索）
//! 3. 下载到规划好的路径
//!
//! 任何失败都被分类成 `Outcome`，不向上传播。

use tracing::{info, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::models::Outcome;
use crate::services::{resolve_source, PdfFetcher, Resolution, SearchProvider};
use crate::workflow::record_ctx::RecordCtx;

/// 记录处理流程
///
/// - 不持有浏览器资源，搜索会话由 `SearchProvider` 在每次调用内部创建和释放
/// - 不接触批处理状态，只返回 `Outcome`
#[derive(Clone)]
pub struct RecordFlow {
    fetcher: PdfFetcher,
    skip_existing: bool,
}

impl RecordFlow {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: PdfFetcher::new(config)?,
            skip_existing: config.skip_existing,
        })
    }

    pub fn with_fetcher(fetcher: PdfFetcher, skip_existing: bool) -> Self {
        Self {
            fetcher,
            skip_existing,
        }
    }

    pub async fn run<S: SearchProvider>(&self, search: &S, ctx: &RecordCtx) -> Outcome {
        let record = &ctx.record;

        if self.skip_existing && tokio::fs::try_exists(&ctx.target).await.unwrap_or(false) {
            info!("{} ⏭️ 文件已存在，跳过: {}", ctx, ctx.target.display());
            return Outcome::downloaded(record, record.source_ref.clone(), ctx.target.clone());
        }

        // ========== 步骤 1: 解析下载地址 ==========
        if Resolution::of(record) == Resolution::Discovered && !record.name.trim().is_empty() {
            info!("{} 🔍 没有链接，开始搜索: {}", ctx, record.name);
        }
        let url = match resolve_source(record, search).await {
            Ok(url) => url,
            Err(e) => {
                warn!("{} ⚠️ 解析链接失败: {}", ctx, e);
                return Outcome::failed(record, None, e);
            }
        };

        // ========== 步骤 2: 下载 ==========
        match self.fetcher.fetch(&url, &ctx.target).await {
            Ok(bytes) => {
                info!(
                    "{} ✅ 已下载 {} ({} 字节)",
                    ctx,
                    ctx.target.display(),
                    bytes
                );
                Outcome::downloaded(record, Some(url), ctx.target.clone())
            }
            Err(e) => {
                warn!("{} ❌ 下载失败 {}: {}", ctx, url, e);
                Outcome::failed(record, Some(url), e)
            }
        }
    }
}
