use crate::error::BatchError;
use crate::models::record::Record;
use crate::models::sheet::Sheet;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::{Path, PathBuf};

/// 从表格文件加载数据
///
/// 支持 `.xlsx/.xlsm/.xls/.ods`（读取第一个工作表）和 `.csv`，第一行为表头
pub async fn load_sheet(path: &Path) -> Result<Sheet, BatchError> {
    if !path.exists() {
        return Err(BatchError::input_load(path, "文件不存在"));
    }

    let owned: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_sheet(&owned))
        .await
        .map_err(|e| BatchError::input_load(path, e))?
}

/// 加载表格并转换为记录列表
pub async fn load_records(path: &Path) -> Result<(Sheet, Vec<Record>), BatchError> {
    let sheet = load_sheet(path).await?;
    let records = sheet.records(&path.display().to_string())?;
    tracing::info!("成功加载 {} 条记录: {}", records.len(), path.display());
    Ok((sheet, records))
}

fn read_sheet(path: &Path) -> Result<Sheet, BatchError> {
    match extension(path).as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path),
        _ => Err(BatchError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn read_csv(path: &Path) -> Result<Sheet, BatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| BatchError::input_load(path, e))?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| BatchError::input_load(path, e))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    Ok(split_header(rows))
}

fn read_workbook(path: &Path) -> Result<Sheet, BatchError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| BatchError::input_load(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| BatchError::input_load(path, "工作簿中没有工作表"))?
        .map_err(|e| BatchError::input_load(path, e))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(split_header(rows))
}

fn split_header(mut rows: Vec<Vec<String>>) -> Sheet {
    if rows.is_empty() {
        return Sheet::default();
    }
    let headers = rows.remove(0);
    // 跳过完全空白的行
    rows.retain(|row| row.iter().any(|cell| !cell.trim().is_empty()));
    Sheet::new(headers, rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // 整数值的浮点数按整数写出，避免 "12.0"
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
