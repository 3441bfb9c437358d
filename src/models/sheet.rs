//! 表格数据：表头 + 字符串单元格

use crate::error::BatchError;
use crate::models::record::{Outcome, Record};

pub const NAME_COLUMN: &str = "Product Name";
pub const LINK_COLUMN: &str = "PDF Link";
pub const INDEX_COLUMN: &str = "index";
pub const STATUS_COLUMN: &str = "Download Status";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(|s| s.trim()).unwrap_or("")
    }

    /// 把每一行转换为 `Record`
    ///
    /// `source` 只用于错误信息
    pub fn records(&self, source: &str) -> Result<Vec<Record>, BatchError> {
        let name_col = self.column(NAME_COLUMN).ok_or_else(|| BatchError::MissingColumn {
            path: source.to_string(),
            column: NAME_COLUMN.to_string(),
        })?;
        let link_col = self.column(LINK_COLUMN);
        let index_col = self.column(INDEX_COLUMN);

        let records = (0..self.rows.len())
            .map(|row| {
                let source_ref = link_col
                    .map(|col| self.cell(row, col))
                    .filter(|link| !link.is_empty())
                    .map(str::to_string);
                let index = index_col
                    .and_then(|col| parse_index(self.cell(row, col)))
                    .unwrap_or(row);
                Record::new(row, self.cell(row, name_col), source_ref).with_index(index)
            })
            .collect();

        Ok(records)
    }

    /// 生成检查点表格：原有列 + `PDF Link` + `Download Status`
    ///
    /// `outcomes` 按行号索引，尚未完成的行保留原值、状态为空
    pub fn with_outcomes(&self, outcomes: &[Option<Outcome>]) -> Sheet {
        let mut headers = self.headers.clone();
        let link_col = self.column(LINK_COLUMN).unwrap_or_else(|| {
            headers.push(LINK_COLUMN.to_string());
            headers.len() - 1
        });
        let status_col = self.column(STATUS_COLUMN).unwrap_or_else(|| {
            headers.push(STATUS_COLUMN.to_string());
            headers.len() - 1
        });

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut row = row.clone();
                row.resize(headers.len(), String::new());
                if let Some(Some(outcome)) = outcomes.get(i) {
                    row[link_col] = outcome.resolved_ref.clone().unwrap_or_default();
                    row[status_col] = outcome.status.to_string();
                }
                row
            })
            .collect();

        Sheet { headers, rows }
    }
}

/// 表格里的序号可能是 "12" 也可能是 "12.0"
fn parse_index(cell: &str) -> Option<usize> {
    cell.parse::<usize>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as usize)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::record::DownloadStatus;

    fn sheet() -> Sheet {
        Sheet::new(
            vec!["index".into(), "Product Name".into(), "PDF Link".into()],
            vec![
                vec!["10".into(), "Aspirin".into(), "https://a/1.pdf".into()],
                vec!["11.0".into(), " Ibuprofen ".into(), "".into()],
            ],
        )
    }

    #[test]
    fn test_records_from_sheet() {
        let records = sheet().records("test.csv").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].index, 10);
        assert_eq!(records[0].source_ref.as_deref(), Some("https://a/1.pdf"));
        assert_eq!(records[1].index, 11);
        assert_eq!(records[1].name, "Ibuprofen");
        assert_eq!(records[1].source_ref, None);
    }

    #[test]
    fn test_missing_name_column() {
        let sheet = Sheet::new(vec!["Name".into()], vec![vec!["x".into()]]);
        assert!(matches!(
            sheet.records("x.csv"),
            Err(BatchError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_index_defaults_to_position() {
        let sheet = Sheet::new(
            vec!["Product Name".into()],
            vec![vec!["A".into()], vec!["B".into()]],
        );
        let records = sheet.records("x.csv").unwrap();
        assert_eq!(records[1].index, 1);
        assert_eq!(records[1].position, 1);
    }

    #[test]
    fn test_with_outcomes_adds_status_column() {
        let sheet = sheet();
        let records = sheet.records("x").unwrap();
        let outcomes = vec![
            None,
            Some(Outcome::failed(
                &records[1],
                Some("https://found/2.pdf".into()),
                FetchError::HttpStatus(500),
            )),
        ];

        let out = sheet.with_outcomes(&outcomes);
        assert_eq!(out.headers.len(), 4);
        assert_eq!(out.headers[3], "Download Status");
        assert_eq!(out.rows[0][2], "https://a/1.pdf");
        assert_eq!(out.rows[0][3], "");
        assert_eq!(out.rows[1][2], "https://found/2.pdf");
        assert_eq!(out.rows[1][3], DownloadStatus::Failed(500).to_string());
    }
}
