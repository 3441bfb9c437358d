//! 浏览器会话
//!
//! 每次搜索独占一个会话：独立进程、独立的临时用户目录。
//! 正常路径调用 `close()` 关闭；提前返回、任务被取消或 panic 时由 `Drop` 兜底：
//! 后台事件任务被中止，`Browser` 被丢弃时会结束子进程，临时目录随之删除。

use crate::browser::headless::{launch_headless_browser, LaunchOptions};
use crate::infrastructure::JsExecutor;
use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct BrowserSession {
    browser: Browser,
    executor: JsExecutor,
    handler: JoinHandle<()>,
    // 最后释放：浏览器进程退出后再删除目录
    _profile_dir: TempDir,
}

impl BrowserSession {
    /// 启动浏览器并打开一个空白页
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        let profile_dir = tempfile::Builder::new()
            .prefix("pdf-batch-fetch-")
            .tempdir()
            .context("无法创建浏览器临时目录")?;

        let (browser, handler) = launch_headless_browser(options, profile_dir.path()).await?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(anyhow::anyhow!("创建页面失败: {}", e));
            }
        };

        Ok(Self {
            browser,
            executor: JsExecutor::new(page),
            handler,
            _profile_dir: profile_dir,
        })
    }

    pub fn executor(&self) -> &JsExecutor {
        &self.executor
    }

    /// 关闭浏览器并等待进程退出
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器退出失败: {}", e);
        }
        debug!("浏览器会话已关闭");
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
