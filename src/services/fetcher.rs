//! PDF 下载服务 - 业务能力层
//!
//! 响应体先流式写入 `<目标>.part`，完整写完后再重命名为目标文件；
//! 任何失败都会删除临时文件，不会留下看似成功的半截文件。

use crate::config::Config;
use crate::error::FetchError;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

const USER_AGENT: &str = concat!("pdf_batch_fetch/", env!("CARGO_PKG_VERSION"));

/// PDF 下载器
///
/// 内部的 `reqwest::Client` 可以在任务之间共享（内部使用 Arc）
#[derive(Clone)]
pub struct PdfFetcher {
    client: reqwest::Client,
}

impl PdfFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_timeout(config.request_timeout())
    }

    pub fn with_timeout(request_timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(request_timeout)
            .build()
            .map_err(FetchError::transport)?;
        Ok(Self { client })
    }

    /// 下载 `url` 到 `target`，返回写入的字节数
    pub async fn fetch(&self, url: &str, target: &Path) -> Result<u64, FetchError> {
        debug!("开始下载: {} -> {}", url, target.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| FetchError::persistence(parent, e))?;
            }
        }

        let partial = partial_path(target);
        match write_body(response, &partial).await {
            Ok(bytes) => {
                if let Err(e) = fs::rename(&partial, target).await {
                    let _ = fs::remove_file(&partial).await;
                    return Err(FetchError::persistence(target, e));
                }
                debug!("下载完成: {} ({} 字节)", target.display(), bytes);
                Ok(bytes)
            }
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }
}

async fn write_body(response: reqwest::Response, partial: &Path) -> Result<u64, FetchError> {
    let mut file = fs::File::create(partial)
        .await
        .map_err(|e| FetchError::persistence(partial, e))?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::transport)?;
        file.write_all(&chunk)
            .await
            .map_err(|e| FetchError::persistence(partial, e))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|e| FetchError::persistence(partial, e))?;
    Ok(written)
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> PdfFetcher {
        PdfFetcher::with_timeout(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_writes_full_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/doc.pdf")
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body("%PDF-1.4 test body")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("doc.pdf");
        let bytes = fetcher()
            .fetch(&format!("{}/doc.pdf", server.url()), &target)
            .await
            .unwrap();

        assert_eq!(bytes, 18);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "%PDF-1.4 test body");
        assert!(!partial_path(&target).exists());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_leaves_no_file() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.pdf")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing.pdf");
        let err = fetcher()
            .fetch(&format!("{}/missing.pdf", server.url()), &target)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::HttpStatus(404));
        assert!(!target.exists());
        assert!(!partial_path(&target).exists());
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x.pdf");
        // 端口 9 (discard) 在测试环境中通常无人监听
        let err = fetcher()
            .fetch("http://127.0.0.1:9/x.pdf", &target)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_partial_file() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/doc.pdf")
            .with_status(200)
            .with_body("%PDF")
            .create_async()
            .await;

        // 目标位置被一个非空目录占用，无法改名覆盖
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("doc.pdf");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), "x").unwrap();

        let err = fetcher()
            .fetch(&format!("{}/doc.pdf", server.url()), &target)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Persistence { .. }));
        assert!(!partial_path(&target).exists());
        assert!(target.join("keep").exists());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("Output/a.pdf")),
            PathBuf::from("Output/a.pdf.part")
        );
    }
}
