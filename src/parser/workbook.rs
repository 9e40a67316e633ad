//! Store Reader Module
//!
//! calamineを使用してストア（XLSX）のデータ行を読み出す。

use calamine::{open_workbook_auto_from_rs, Reader, Sheets, Xlsx};
use std::io::Cursor;
use std::path::Path;

use crate::error::QuizSheetError;
use crate::formatter::CellFormatter;
use crate::security::SecurityConfig;
use crate::types::{CellValue, SpreadsheetRow, COLUMN_COUNT};

/// ストアリーダー
///
/// calamineのラッパーとして、ワークブック全体をメモリに読み込んだうえで
/// 指定シートのデータ行（A〜K列）を取り出します。
pub(crate) struct WorkbookParser {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    formatter: CellFormatter,
}

impl WorkbookParser {
    /// ファイルからワークブックを開く
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - 読み込みに成功した場合
    /// * `Err(QuizSheetError::SourceMissing)` - ファイルが存在しない場合
    /// * `Err(QuizSheetError)` - サイズ制限違反、またはXLSXとして解析できない場合
    pub fn open(path: &Path, security: &SecurityConfig) -> Result<Self, QuizSheetError> {
        security.check_input_file(path)?;
        let buffer = std::fs::read(path)?;
        Self::from_bytes(buffer)
    }

    /// メモリ上のバイト列からワークブックを開く
    pub fn from_bytes(buffer: Vec<u8>) -> Result<Self, QuizSheetError> {
        let sheets =
            open_workbook_auto_from_rs(Cursor::new(buffer)).map_err(QuizSheetError::Parse)?;
        match sheets {
            Sheets::Xlsx(workbook) => Ok(Self {
                workbook,
                formatter: CellFormatter::new(),
            }),
            _ => Err(QuizSheetError::Config(
                "Only XLSX format is supported".to_string(),
            )),
        }
    }

    /// すべてのシート名を取得
    pub fn get_sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    /// 指定シートのデータ行を読み出す
    ///
    /// # 引数
    ///
    /// * `sheet_name` - 読み出すシート名
    /// * `first_data_row` - 最初のデータ行（1始まり）
    ///
    /// # 戻り値
    ///
    /// `first_data_row`から最終使用行までの行。途中の空行も含む。
    pub fn read_rows(
        &mut self,
        sheet_name: &str,
        first_data_row: u32,
    ) -> Result<Vec<SpreadsheetRow>, QuizSheetError> {
        if !self.get_sheet_names().iter().any(|name| name == sheet_name) {
            return Err(QuizSheetError::Config(format!(
                "Sheet '{}' not found",
                sheet_name
            )));
        }

        let range = self
            .workbook
            .worksheet_range(sheet_name)
            .map_err(|e| QuizSheetError::Parse(e.into()))?;

        let Some((last_row, _)) = range.end() else {
            return Ok(Vec::new());
        };

        let first_row = first_data_row.saturating_sub(1);
        let mut rows = Vec::new();
        for row in first_row..=last_row {
            let cells = (0..COLUMN_COUNT as u32)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(|cell| self.formatter.to_cell_value(cell))
                        .unwrap_or(CellValue::Empty)
                })
                .collect();
            rows.push(SpreadsheetRow::new(row + 1, cells));
        }

        Ok(rows)
    }
}

// 実際のXLSXファイルを使ったテストは統合テスト（tests/）で実装します。
