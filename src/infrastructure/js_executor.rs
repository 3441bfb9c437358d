//! JS 执行器 - 基础设施层
//!
//! 持有一个 page，只暴露"导航 / 执行 JS / 等待条件成立"的能力

use anyhow::Result;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::debug;

/// 轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// JS 执行器
///
/// 职责：
/// - 持有 Page 资源
/// - 暴露 goto() / eval() / wait_for() 能力
/// - 不认识 Record / Outcome
pub struct JsExecutor {
    page: Page,
}

/// `wait_for` 的结果
#[derive(Debug)]
pub enum WaitResult<T> {
    Ready(T),
    /// 超时；`last_error` 为最后一次脚本执行失败的信息
    TimedOut { last_error: Option<String> },
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 导航到指定地址并等待加载完成
    pub async fn goto(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 反复执行 JS 直到它返回非 null，或超过 `limit`
    ///
    /// 页面跳转期间脚本可能执行失败（执行上下文被销毁），这类错误视为"尚未就绪"。
    pub async fn wait_for<T: DeserializeOwned>(
        &self,
        js_code: &str,
        limit: Duration,
    ) -> WaitResult<T> {
        poll_until(move || self.eval_as::<Option<T>>(js_code), limit).await
    }
}

/// 每隔 `POLL_INTERVAL` 调用一次 `probe`，直到它返回 `Ok(Some(_))` 或超过 `limit`
pub async fn poll_until<T, F, Fut>(mut probe: F, limit: Duration) -> WaitResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let mut last_error = None;
    let poll = async {
        loop {
            match probe().await {
                Ok(Some(value)) => return value,
                Ok(None) => {}
                Err(e) => {
                    debug!("轮询时脚本执行失败，稍后重试: {:#}", e);
                    last_error = Some(format!("{:#}", e));
                }
            }
            sleep(POLL_INTERVAL).await;
        }
    };

    let waited = timeout(limit, poll).await;
    match waited {
        Ok(value) => WaitResult::Ready(value),
        Err(_) => WaitResult::TimedOut { last_error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_errors_during_navigation_are_retried() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let waited = poll_until(
            move || async move {
                match counter.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err(anyhow::anyhow!("Execution context was destroyed")),
                    2 => Ok(None),
                    _ => Ok(Some("https://a/1.pdf".to_string())),
                }
            },
            Duration::from_secs(5),
        )
        .await;

        assert!(matches!(waited, WaitResult::Ready(ref link) if link == "https://a/1.pdf"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_timeout_keeps_last_error() {
        let waited: WaitResult<bool> = poll_until(
            || async { Err(anyhow::anyhow!("Execution context was destroyed")) },
            Duration::from_millis(600),
        )
        .await;

        match waited {
            WaitResult::TimedOut { last_error } => {
                assert!(last_error.unwrap().contains("Execution context was destroyed"));
            }
            WaitResult::Ready(_) => panic!("不应就绪"),
        }
    }

    #[tokio::test]
    async fn test_never_ready_times_out_without_error() {
        let waited: WaitResult<bool> =
            poll_until(|| async { Ok(None) }, Duration::from_millis(300)).await;
        assert!(matches!(waited, WaitResult::TimedOut { last_error: None }));
    }
}
