//! 检查点写入 - 业务能力层
//!
//! 把整张表（原有列 + `PDF Link` + `Download Status`）完整重写到输出文件。
//! 先写临时文件再重命名，读者不会看到写了一半的表格。

use crate::error::BatchError;
use crate::models::Sheet;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SheetFormat {
    Xlsx,
    Csv,
}

pub struct CheckpointWriter {
    path: PathBuf,
    format: SheetFormat,
}

impl CheckpointWriter {
    /// 按扩展名选择格式：`.csv` 写 CSV，`.xlsx` 写 Excel
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, BatchError> {
        let path = path.into();
        let format = match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("csv") => SheetFormat::Csv,
            Some("xlsx") => SheetFormat::Xlsx,
            _ => {
                return Err(BatchError::UnsupportedFormat {
                    path: path.display().to_string(),
                })
            }
        };
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入一次检查点
    pub async fn save(&self, sheet: Sheet) -> Result<(), BatchError> {
        let path = self.path.clone();
        let format = self.format;
        tokio::task::spawn_blocking(move || write_sheet(&path, format, &sheet))
            .await
            .map_err(|e| BatchError::checkpoint(&self.path, e))?
    }

    /// 写入检查点，失败时重试一次
    pub async fn save_with_retry(&self, sheet: Sheet) -> Result<(), BatchError> {
        match self.save(sheet.clone()).await {
            Ok(()) => Ok(()),
            Err(first) => {
                warn!("⚠️ 检查点写入失败，重试一次: {}", first);
                self.save(sheet).await
            }
        }
    }
}

fn write_sheet(path: &Path, format: SheetFormat, sheet: &Sheet) -> Result<(), BatchError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| BatchError::checkpoint(path, e))?;
        }
    }

    let tmp = temp_path(path);
    let written = match format {
        SheetFormat::Csv => write_csv(&tmp, sheet),
        SheetFormat::Xlsx => write_xlsx(&tmp, sheet),
    };

    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp);
        return Err(BatchError::checkpoint(path, e));
    }

    std::fs::rename(&tmp, path).map_err(|e| BatchError::checkpoint(path, e))
}

fn write_csv(path: &Path, sheet: &Sheet) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_xlsx(path: &Path, sheet: &Sheet) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string(0, u16::try_from(col)?, header)?;
    }
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_num = u32::try_from(row_idx + 1)?;
        for (col, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                worksheet.write_string(row_num, u16::try_from(col)?, cell)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}
