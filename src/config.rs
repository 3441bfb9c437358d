use crate::error::BatchError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 指向 TOML 配置文件的环境变量
pub const CONFIG_FILE_ENV: &str = "BATCH_FETCH_CONFIG";

/// 默认的产品搜索地址模板，`{query}` 会被替换为 URL 编码后的产品名
pub const DEFAULT_SEARCH_URL_TEMPLATE: &str =
    "https://products.mhra.gov.uk/search/?search={query}&page=1";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 输入表格（.xlsx / .xls / .ods / .csv）
    pub input_path: String,
    /// 检查点输出表格（.xlsx 或 .csv）
    pub output_sheet_path: String,
    /// PDF 输出目录
    pub output_dir: String,
    /// 进度日志文件
    pub progress_log_path: String,
    /// 同时处理的记录数量
    pub max_workers: usize,
    /// 每完成多少条记录保存一次检查点
    pub checkpoint_interval: usize,
    /// 按索引区间划分子目录的大小，不设置则不划分
    pub partition_size: Option<usize>,
    /// 搜索地址模板
    pub search_url_template: String,
    /// 每个页面等待步骤的超时（秒）
    pub step_timeout_secs: u64,
    /// 单次下载请求的超时（秒）
    pub request_timeout_secs: u64,
    /// 浏览器可执行文件路径，不设置则自动探测
    pub chrome_executable: Option<String>,
    /// 是否使用无头模式
    pub headless: bool,
    /// 目标文件已存在时跳过下载
    pub skip_existing: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "products.xlsx".to_string(),
            output_sheet_path: "products_output.xlsx".to_string(),
            output_dir: "Output".to_string(),
            progress_log_path: "process_log.txt".to_string(),
            max_workers: 5,
            checkpoint_interval: 50,
            partition_size: None,
            search_url_template: DEFAULT_SEARCH_URL_TEMPLATE.to_string(),
            step_timeout_secs: 20,
            request_timeout_secs: 120,
            chrome_executable: None,
            headless: true,
            skip_existing: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量覆盖默认配置
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，未出现的字段使用默认值
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        Ok(config)
    }

    /// 加载配置：先读 `BATCH_FETCH_CONFIG` 指向的文件（如有），再应用环境变量，最后校验
    pub fn load() -> Result<Self> {
        let base = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            input_path: env_or("INPUT_PATH", self.input_path),
            output_sheet_path: env_or("OUTPUT_SHEET_PATH", self.output_sheet_path),
            output_dir: env_or("OUTPUT_DIR", self.output_dir),
            progress_log_path: env_or("PROGRESS_LOG_PATH", self.progress_log_path),
            max_workers: env_parse("MAX_WORKERS").unwrap_or(self.max_workers),
            checkpoint_interval: env_parse("CHECKPOINT_INTERVAL")
                .unwrap_or(self.checkpoint_interval),
            partition_size: env_parse("PARTITION_SIZE").or(self.partition_size),
            search_url_template: env_or("SEARCH_URL_TEMPLATE", self.search_url_template),
            step_timeout_secs: env_parse("STEP_TIMEOUT_SECS").unwrap_or(self.step_timeout_secs),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS")
                .unwrap_or(self.request_timeout_secs),
            chrome_executable: std::env::var("CHROME_EXECUTABLE")
                .ok()
                .or(self.chrome_executable),
            headless: env_parse("HEADLESS").unwrap_or(self.headless),
            skip_existing: env_parse("SKIP_EXISTING").unwrap_or(self.skip_existing),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.max_workers == 0 {
            return Err(BatchError::InvalidConfig("max_workers 必须大于 0".into()));
        }
        if self.checkpoint_interval == 0 {
            return Err(BatchError::InvalidConfig(
                "checkpoint_interval 必须大于 0".into(),
            ));
        }
        if self.partition_size == Some(0) {
            return Err(BatchError::InvalidConfig("partition_size 必须大于 0".into()));
        }
        if !self.search_url_template.contains("{query}") {
            return Err(BatchError::InvalidConfig(
                "search_url_template 必须包含 {query} 占位符".into(),
            ));
        }
        Ok(())
    }

    pub fn step_timeout(&self) -> Duration {
        Duration::from_secs(self.step_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_or(key: &str, fallback: String) -> String {
    std::env::var(key).unwrap_or(fallback)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
