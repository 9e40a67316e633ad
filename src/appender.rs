//! Spreadsheet Appender Module
//!
//! パース済みレコードをストア（XLSX）の末尾に追記する。
//! 問題文（E列）が既存行と一致するレコードはスキップする。

use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use umya_spreadsheet::Worksheet;

use crate::api::QuestionBlockRecord;
use crate::builder::PipelineConfig;
use crate::error::QuizSheetError;
use crate::persist::write_atomically;
use crate::report::{Reporter, Severity};
use crate::types::{CellValue, Column, SpreadsheetRow};

/// 追記処理の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendSummary {
    /// 追記した行数
    pub appended: usize,
    /// 重複のためスキップしたレコード数
    pub duplicates: usize,
}

/// ストアへの追記処理
pub(crate) struct StoreAppender<'a> {
    config: &'a PipelineConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> StoreAppender<'a> {
    pub fn new(config: &'a PipelineConfig, reporter: &'a dyn Reporter) -> Self {
        Self { config, reporter }
    }

    /// レコードをストアに追記する
    ///
    /// # 処理フロー
    ///
    /// 1. ストアを読み込み、最初のデータ行から最終行までの問題文を収集
    /// 2. 入力順に、重複していないレコードを`max(最終行 + 1, 最初のデータ行)`から書き込む
    /// 3. すべてのレコードを処理した後に1回だけ保存
    ///
    /// 同じ実行内で先に追記した問題文も重複判定の対象になる。
    pub fn append(
        &self,
        records: &[QuestionBlockRecord],
        store: &Path,
    ) -> Result<AppendSummary, QuizSheetError> {
        self.config.security.check_input_file(store)?;

        let mut book = umya_spreadsheet::reader::xlsx::read(store).map_err(|e| {
            QuizSheetError::Spreadsheet(format!("failed to read {}: {}", store.display(), e))
        })?;

        let sheet_name = &self.config.sheet_name;
        let sheet = book.get_sheet_by_name_mut(sheet_name).ok_or_else(|| {
            QuizSheetError::Config(format!("Sheet '{}' not found", sheet_name))
        })?;

        let first_row = self.config.first_data_row;
        let max_row = sheet.get_highest_row();
        let mut existing = existing_questions(sheet, first_row, max_row);
        let mut next_row = (max_row + 1).max(first_row);
        let mut summary = AppendSummary::default();

        for record in records {
            if existing.contains(&record.question) {
                summary.duplicates += 1;
                self.reporter.record(
                    Severity::Info,
                    &format!("Skipping duplicate question: {}", record.question),
                );
                continue;
            }

            let row = SpreadsheetRow::from_block(next_row, record);
            write_row(sheet, &row);
            self.reporter.record(
                Severity::Debug,
                &format!(
                    "Wrote question to {}",
                    Column::Question.at_row(next_row).to_a1_notation()
                ),
            );

            existing.insert(record.question.clone());
            next_row += 1;
            summary.appended += 1;
        }

        if summary.appended > 0 {
            let mut buffer = Cursor::new(Vec::new());
            umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer).map_err(|e| {
                QuizSheetError::Spreadsheet(format!("failed to write {}: {}", store.display(), e))
            })?;
            write_atomically(store, &buffer.into_inner())?;
        }

        self.reporter.record(
            Severity::Info,
            &format!(
                "Appended {} questions to {}",
                summary.appended,
                store.display()
            ),
        );
        Ok(summary)
    }
}

/// 問題文列の既存値を収集（空セルは除く）
fn existing_questions(sheet: &Worksheet, first_row: u32, max_row: u32) -> HashSet<String> {
    let col = Column::Question.index() + 1;
    (first_row..=max_row)
        .filter_map(|row| sheet.get_cell((col, row)).map(|c| c.get_value().to_string()))
        .filter(|value| !value.is_empty())
        .collect()
}

/// 1行分のセルを書き込む（umya-spreadsheetの座標は1始まり）
fn write_row(sheet: &mut Worksheet, row: &SpreadsheetRow) {
    for (column, value) in Column::ALL.iter().zip(&row.cells) {
        let cell = sheet.get_cell_mut((column.index() + 1, row.row_number));
        match value {
            CellValue::Number(n) => {
                cell.set_value_number(*n);
            }
            CellValue::String(s) => {
                cell.set_value_string(s.as_str());
            }
            CellValue::Empty => {}
        }
    }
}

// ストアへの書き込みを伴うテストは統合テスト（tests/appender_test.rs）で実装します。
