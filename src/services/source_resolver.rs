//! 下载地址解析 - 业务能力层
//!
//! - 记录自带链接：直接使用
//! - 记录没有链接：交给 `SearchProvider` 搜索

use crate::error::FetchError;
use crate::models::Record;
use std::future::Future;

/// 外部搜索能力：给定产品名，返回一个下载地址
///
/// 每次调用都应自行持有所需的资源（例如浏览器会话），不得在并发调用之间共享。
pub trait SearchProvider: Send + Sync + 'static {
    fn search(&self, name: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// 解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Direct,
    Discovered,
}

impl Resolution {
    pub fn of(record: &Record) -> Self {
        if record.source_ref.is_some() {
            Resolution::Direct
        } else {
            Resolution::Discovered
        }
    }
}

/// 解析记录的下载地址
///
/// 没有链接且产品名去掉空白后为空的记录不发起搜索，直接返回 `BlankName`。
pub async fn resolve_source<S: SearchProvider>(
    record: &Record,
    search: &S,
) -> Result<String, FetchError> {
    match &record.source_ref {
        Some(link) => Ok(link.clone()),
        None if record.name.trim().is_empty() => Err(FetchError::BlankName),
        None => search.search(&record.name).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSearch {
        calls: AtomicUsize,
    }

    impl SearchProvider for CountingSearch {
        async fn search(&self, name: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("https://found.example/{}.pdf", name))
        }
    }

    #[tokio::test]
    async fn test_direct_link_skips_search() {
        let search = CountingSearch {
            calls: AtomicUsize::new(0),
        };
        let record = Record::new(0, "Aspirin", Some("https://a/1.pdf".into()));
        assert_eq!(Resolution::of(&record), Resolution::Direct);

        let url = resolve_source(&record, &search).await.unwrap();
        assert_eq!(url, "https://a/1.pdf");
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_link_uses_search() {
        let search = CountingSearch {
            calls: AtomicUsize::new(0),
        };
        let record = Record::new(0, "Aspirin", None);
        assert_eq!(Resolution::of(&record), Resolution::Discovered);

        let url = resolve_source(&record, &search).await.unwrap();
        assert_eq!(url, "https://found.example/Aspirin.pdf");
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_never_searched() {
        let search = CountingSearch {
            calls: AtomicUsize::new(0),
        };
        for name in ["", "   "] {
            let record = Record::new(0, name, None);
            let err = resolve_source(&record, &search).await.unwrap_err();
            assert_eq!(err, FetchError::BlankName);
            assert!(err.is_resolution_failure());
        }
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);

        // 自带链接时名称为空也照常下载
        let record = Record::new(1, "", Some("https://a/2.pdf".into()));
        assert_eq!(resolve_source(&record, &search).await.unwrap(), "https://a/2.pdf");
    }
}
