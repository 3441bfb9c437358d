use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::config::Config;

/// 浏览器启动参数
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub chrome_executable: Option<PathBuf>,
    pub headless: bool,
    pub launch_timeout: Duration,
}

impl LaunchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chrome_executable: config.chrome_executable.as_ref().map(PathBuf::from),
            headless: config.headless,
            launch_timeout: config.step_timeout(),
        }
    }
}

/// 启动一个独立的浏览器进程
///
/// `profile_dir` 为本次会话专用的用户数据目录，并发启动的浏览器之间互不干扰。
/// 返回浏览器以及后台事件处理任务的句柄。
pub async fn launch_headless_browser(
    options: &LaunchOptions,
    profile_dir: &Path,
) -> Result<(Browser, JoinHandle<()>)> {
    debug!("🚀 启动浏览器, 配置目录: {}", profile_dir.display());

    let mut builder = BrowserConfig::builder();
    builder = if options.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = &options.chrome_executable {
        builder = builder.chrome_executable(executable);
    }

    let config = builder
        .user_data_dir(profile_dir)
        .launch_timeout(options.launch_timeout)
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--no-first-run",
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            anyhow::anyhow!("配置浏览器失败: {}", e)
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        anyhow::anyhow!("启动浏览器失败: {}", e)
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    Ok((browser, handler_task))
}
