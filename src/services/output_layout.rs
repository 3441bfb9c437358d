//! 输出路径规划
//!
//! 在分发任务之前一次性为每条记录确定输出文件路径：
//! - 可选按索引区间划分子目录（`Output_1_to_5000`、`Output_5001_to_10000` …）
//! - 同一目录下清洗后重名的文件依次加 `_2`、`_3` 后缀（不区分大小写）
//!
//! 规划结果只取决于输入顺序，工作任务之间不共享任何命名状态。

use crate::models::Record;
use crate::services::filename::sanitize_filename;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

const PDF_EXTENSION: &str = "pdf";

/// 索引所在的分区目录名（索引从 0 开始）
pub fn partition_folder(index: usize, size: usize) -> String {
    let batch = index / size;
    format!("Output_{}_to_{}", batch * size + 1, (batch + 1) * size)
}

pub struct OutputLayout {
    base_dir: PathBuf,
    partition_size: Option<usize>,
}

impl OutputLayout {
    pub fn new(base_dir: impl Into<PathBuf>, partition_size: Option<usize>) -> Self {
        Self {
            base_dir: base_dir.into(),
            partition_size: partition_size.filter(|size| *size > 0),
        }
    }

    /// 记录所在的目录
    pub fn folder_for(&self, record: &Record) -> PathBuf {
        match self.partition_size {
            Some(size) => self.base_dir.join(partition_folder(record.index, size)),
            None => self.base_dir.clone(),
        }
    }

    /// 为所有记录规划输出路径，返回值与 `records` 一一对应
    pub fn plan(&self, records: &[Record]) -> Vec<PathBuf> {
        let mut taken: HashMap<PathBuf, HashSet<String>> = HashMap::new();

        records
            .iter()
            .map(|record| {
                let folder = self.folder_for(record);
                let stem = match sanitize_filename(&record.name) {
                    s if s.is_empty() => format!("unnamed_{}", record.position + 1),
                    s => s,
                };
                let used = taken.entry(folder.clone()).or_default();
                let unique = claim_unique(used, &stem);
                if unique != stem {
                    tracing::warn!(
                        "文件名冲突: '{}' 已被占用，改用 '{}'",
                        stem,
                        unique
                    );
                }
                file_path(&folder, &unique)
            })
            .collect()
    }
}

fn claim_unique(used: &mut HashSet<String>, stem: &str) -> String {
    if used.insert(stem.to_ascii_lowercase()) {
        return stem.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{}_{}", stem, counter);
        if used.insert(candidate.to_ascii_lowercase()) {
            return candidate;
        }
        counter += 1;
    }
}

fn file_path(folder: &Path, stem: &str) -> PathBuf {
    folder.join(format!("{}.{}", stem, PDF_EXTENSION))
}
