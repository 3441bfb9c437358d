//! 产品搜索服务 - 业务能力层
//!
//! 通过无头浏览器在产品数据库中按名称搜索，取第一条结果的文档链接。
//!
//! 流程：
//! 1. 产品名 URL 编码后填入搜索地址模板
//! 2. 勾选免责声明复选框，点击 Agree 按钮
//! 3. 等待第一条搜索结果，读取 `dd.right a` 的链接
//!
//! 每一步等待都受 `step_timeout` 限制；每次搜索启动并关闭自己的浏览器会话。

use crate::browser::{BrowserSession, LaunchOptions};
use crate::config::Config;
use crate::error::FetchError;
use crate::infrastructure::{JsExecutor, WaitResult};
use crate::services::source_resolver::SearchProvider;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

const AGREE_CHECKBOX_JS: &str = r#"
(() => {
    const el = document.getElementById('agree-checkbox');
    if (!el || el.disabled) return null;
    el.click();
    return true;
})()
"#;

const AGREE_BUTTON_JS: &str = r#"
(() => {
    const btn = Array.from(document.querySelectorAll('button'))
        .find(b => b.textContent.includes('Agree') && !b.disabled);
    if (!btn) return null;
    btn.click();
    return true;
})()
"#;

const FIRST_RESULT_JS: &str = r#"
(() => {
    const result = document.querySelector('div.search-result');
    if (!result) return null;
    const link = result.querySelector('dd.right a');
    return { href: link ? link.href : null };
})()
"#;

#[derive(Debug, Deserialize)]
struct FirstResult {
    href: Option<String>,
}

/// 基于浏览器的产品搜索
pub struct BrowserSearch {
    url_template: String,
    step_timeout: Duration,
    launch: LaunchOptions,
}

impl BrowserSearch {
    pub fn new(config: &Config) -> Self {
        Self {
            url_template: config.search_url_template.clone(),
            step_timeout: config.step_timeout(),
            launch: LaunchOptions::from_config(config),
        }
    }

    /// 搜索页地址
    pub fn search_url(&self, name: &str) -> String {
        build_search_url(&self.url_template, name)
    }

    async fn lookup(&self, executor: &JsExecutor, name: &str) -> Result<String, FetchError> {
        let url = self.search_url(name);

        match timeout(self.step_timeout, executor.goto(&url)).await {
            Ok(result) => result.map_err(FetchError::browser)?,
            Err(_) => return Err(self.timed_out("search page")),
        }

        self.wait_step::<bool>(executor, "agree checkbox", AGREE_CHECKBOX_JS)
            .await?;
        debug!("已勾选免责声明: {}", name);
        self.wait_step::<bool>(executor, "agree button", AGREE_BUTTON_JS)
            .await?;
        debug!("已点击 Agree: {}", name);

        let first: FirstResult = self
            .wait_step(executor, "first search result", FIRST_RESULT_JS)
            .await?;

        match first.href {
            Some(href) if !href.trim().is_empty() => Ok(href),
            _ => Err(FetchError::ResolutionNotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn wait_step<T: serde::de::DeserializeOwned>(
        &self,
        executor: &JsExecutor,
        step: &str,
        js: &str,
    ) -> Result<T, FetchError> {
        let waited = executor.wait_for::<T>(js, self.step_timeout).await;
        self.settle(step, waited)
    }

    /// 把一步等待的结果归类：超时即 `ResolutionTimeout`
    fn settle<T>(&self, step: &str, waited: WaitResult<T>) -> Result<T, FetchError> {
        match waited {
            WaitResult::Ready(value) => Ok(value),
            WaitResult::TimedOut { last_error } => {
                if let Some(e) = last_error {
                    warn!("等待 {} 超时，最后一次脚本错误: {}", step, e);
                }
                Err(self.timed_out(step))
            }
        }
    }

    fn timed_out(&self, step: &str) -> FetchError {
        FetchError::ResolutionTimeout {
            step: step.to_string(),
            secs: self.step_timeout.as_secs(),
        }
    }
}

impl SearchProvider for BrowserSearch {
    async fn search(&self, name: &str) -> Result<String, FetchError> {
        info!("🔍 搜索产品: {}", name);

        let session = BrowserSession::launch(&self.launch)
            .await
            .map_err(FetchError::browser)?;
        let result = self.lookup(session.executor(), name).await;
        session.close().await;

        if let Ok(link) = &result {
            info!("✓ 找到链接: {} -> {}", name, link);
        }
        result
    }
}

/// 把产品名按表单编码（空格为 `+`）填入模板的 `{query}`
pub fn build_search_url(template: &str, name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    template.replace("{query}", &encoded)
}
