//! Spreadsheet-to-JSON Converter Module
//!
//! ストアのデータ行を読み出し、連番IDを採番した問題レコードとして
//! JSONコレクションに追記する。

use std::path::Path;

use crate::api::{Answer, QuestionRecord, QuestionType, OPTION_LABELS};
use crate::builder::PipelineConfig;
use crate::collection::QuestionCollection;
use crate::error::QuizSheetError;
use crate::parser::WorkbookParser;
use crate::report::{Reporter, Severity};
use crate::types::{Column, SpreadsheetRow};

/// 変換処理の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    /// コレクションに追加したレコード数
    pub added: usize,
    /// 重複のためスキップした行数
    pub duplicates: usize,
    /// 問題文が空、または値を解釈できずスキップした行数
    pub invalid: usize,
}

/// ストアからJSONコレクションへの変換処理
pub(crate) struct CollectionConverter<'a> {
    config: &'a PipelineConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> CollectionConverter<'a> {
    pub fn new(config: &'a PipelineConfig, reporter: &'a dyn Reporter) -> Self {
        Self { config, reporter }
    }

    /// ストアの全データ行をコレクションに変換する
    ///
    /// # 処理フロー
    ///
    /// 1. コレクションを読み込み（存在しない場合は空）、最大IDと既存の問題文を取得
    /// 2. ストアを最初のデータ行から最終使用行まで走査
    /// 3. 重複していない行に`最大ID + 1`から順にIDを割り当ててレコード化
    /// 4. コレクション全体を1回で書き戻す
    pub fn convert(
        &self,
        store: &Path,
        collection_path: &Path,
    ) -> Result<ConvertSummary, QuizSheetError> {
        let security = &self.config.security;
        let mut collection = QuestionCollection::load(collection_path, security)?;
        let mut last_id = collection.last_id(self.config.baseline_id);
        let mut existing = collection.questions();
        self.reporter.record(
            Severity::Debug,
            &format!(
                "Loaded {} existing questions from {}",
                collection.len(),
                collection_path.display()
            ),
        );

        let mut parser = WorkbookParser::open(store, security)?;
        let rows = parser.read_rows(&self.config.sheet_name, self.config.first_data_row)?;

        let mut summary = ConvertSummary::default();
        let mut new_records = Vec::new();

        for row in &rows {
            let cell_ref = Column::Question.at_row(row.row_number).to_a1_notation();

            let Some(question) = row.text(Column::Question) else {
                summary.invalid += 1;
                self.reporter.record(
                    Severity::Warning,
                    &format!(
                        "Skipping row {}: question cell {} is empty",
                        row.row_number, cell_ref
                    ),
                );
                continue;
            };

            if existing.contains(&question) {
                summary.duplicates += 1;
                self.reporter.record(
                    Severity::Info,
                    &format!("Skipping duplicate question: {}", question),
                );
                continue;
            }

            let next_id = last_id.checked_add(1).ok_or_else(|| {
                QuizSheetError::Config(format!("cannot assign a question id after {}", last_id))
            })?;

            match self.build_record(row, question, next_id) {
                Ok(record) => {
                    last_id = record.id;
                    existing.insert(record.question.clone());
                    new_records.push(record);
                }
                Err(reason) => {
                    summary.invalid += 1;
                    self.reporter.record(
                        Severity::Warning,
                        &format!("Skipping row {}: {}", row.row_number, reason),
                    );
                }
            }
        }

        summary.added = new_records.len();
        if summary.added > 0 {
            collection.extend(new_records)?;
            collection.save(collection_path)?;
        }

        self.reporter.record(
            Severity::Info,
            &format!(
                "Added {} questions to {}",
                summary.added,
                collection_path.display()
            ),
        );
        Ok(summary)
    }

    /// 1行分のセルから問題レコードを生成する
    ///
    /// 空セルには設定済みのデフォルト値を使う。
    fn build_record(
        &self,
        row: &SpreadsheetRow,
        question: String,
        id: i64,
    ) -> Result<QuestionRecord, String> {
        let question_type = match row.text(Column::Type) {
            None => QuestionType::Single,
            Some(value) => QuestionType::parse(&value)
                .ok_or_else(|| format!("unknown question type '{}'", value))?,
        };

        let domain = match row.text(Column::Domain) {
            None => self.config.default_domain,
            Some(value) => value
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid domain '{}'", value))?,
        };

        let module = row
            .text(Column::Module)
            .unwrap_or_else(|| self.config.default_module.clone());

        let options = Column::OPTIONS
            .iter()
            .zip(OPTION_LABELS)
            .map(|(column, label)| {
                format!("{}. {}", label, row.text(*column).unwrap_or_default())
            })
            .collect();

        let answer = Answer::parse_cell(&row.text(Column::Answer).unwrap_or_default())?;

        Ok(QuestionRecord {
            id,
            question_type,
            domain,
            module,
            question,
            options,
            answer,
            explanation: row.text(Column::Explanation).unwrap_or_default(),
            extra: serde_json::Map::new(),
        })
    }
}
