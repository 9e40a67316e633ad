//! Builder Module
//!
//! Fluent Builder APIを提供し、`Pipeline`インスタンスを段階的に構築する。

use std::path::Path;
use std::sync::Arc;

use crate::api::QuestionBlockRecord;
use crate::appender::{AppendSummary, StoreAppender};
use crate::converter::{CollectionConverter, ConvertSummary};
use crate::error::QuizSheetError;
use crate::parser::TextBlockParser;
use crate::report::{Reporter, Severity, TracingReporter};
use crate::security::SecurityConfig;

/// パイプラインの設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct PipelineConfig {
    /// ストアのシート名
    pub sheet_name: String,

    /// 最初のデータ行（1始まり）。それより上はヘッダー・メタデータ行
    pub first_data_row: u32,

    /// コレクションが空の場合の基準ID（最初に採番されるIDは`baseline_id + 1`）
    pub baseline_id: i64,

    /// パース時・変換時に使用するドメインのデフォルト値
    pub default_domain: i64,

    /// パース時・変換時に使用するモジュールのデフォルト値
    pub default_module: String,

    /// 入力サイズの制限
    pub security: SecurityConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            first_data_row: 5,
            baseline_id: 301,
            default_domain: 4,
            default_module: "6".to_string(),
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use quizsheet::PipelineBuilder;
///
/// # fn main() -> Result<(), quizsheet::QuizSheetError> {
/// let pipeline = PipelineBuilder::new()
///     .with_sheet_name("Questions")
///     .with_baseline_id(500)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineBuilder {
    config: PipelineConfig,
    reporter: Option<Arc<dyn Reporter>>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("custom_reporter", &self.reporter.is_some())
            .finish()
    }
}

impl PipelineBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート名: `Sheet1`
    /// - 最初のデータ行: 5
    /// - 基準ID: 301
    /// - ドメイン: 4
    /// - モジュール: `"6"`
    /// - 通知先: `TracingReporter`
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            reporter: None,
        }
    }

    /// ストアのシート名を指定する
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    /// 最初のデータ行（1始まり）を指定する
    pub fn with_first_data_row(mut self, row: u32) -> Self {
        self.config.first_data_row = row;
        self
    }

    /// コレクションが空の場合の基準IDを指定する
    pub fn with_baseline_id(mut self, id: i64) -> Self {
        self.config.baseline_id = id;
        self
    }

    /// ドメインのデフォルト値を指定する
    pub fn with_default_domain(mut self, domain: i64) -> Self {
        self.config.default_domain = domain;
        self
    }

    /// モジュールのデフォルト値を指定する
    pub fn with_default_module(mut self, module: impl Into<String>) -> Self {
        self.config.default_module = module.into();
        self
    }

    /// 入力サイズの制限を指定する
    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.config.security = security;
        self
    }

    /// イベントの通知先を指定する
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use quizsheet::{MemoryReporter, PipelineBuilder};
    ///
    /// let reporter = MemoryReporter::new();
    /// let builder = PipelineBuilder::new().with_reporter(Arc::new(reporter.clone()));
    /// ```
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// 設定を検証し、`Pipeline`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `QuizSheetError::Config(String)`:
    ///   * 最初のデータ行が0
    ///   * シート名が空
    ///   * モジュールのデフォルト値が空
    pub fn build(self) -> Result<Pipeline, QuizSheetError> {
        if self.config.first_data_row == 0 {
            return Err(QuizSheetError::Config(
                "first data row must be >= 1".to_string(),
            ));
        }

        if self.config.sheet_name.trim().is_empty() {
            return Err(QuizSheetError::Config(
                "sheet name must not be empty".to_string(),
            ));
        }

        if self.config.default_module.trim().is_empty() {
            return Err(QuizSheetError::Config(
                "default module must not be empty".to_string(),
            ));
        }

        Ok(Pipeline {
            config: self.config,
            reporter: self.reporter.unwrap_or_else(|| Arc::new(TracingReporter)),
        })
    }
}

/// 3段階すべてを実行した結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// パースされたレコード数
    pub parsed: usize,
    /// ストアに追記した行数
    pub appended: usize,
    /// コレクションに追加したレコード数
    pub added: usize,
}

/// 変換パイプラインのファサード
///
/// テキスト → ストア（XLSX） → JSONコレクションの各段階を提供します。
/// `parse_*`/`append`/`convert`は失敗を境界で捕捉して通知先に報告し、
/// 「何も生成しない・何も変更しない」結果に縮退します。
/// 失敗を呼び出し側で扱いたい場合は`try_append`/`try_convert`を使用してください。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::path::Path;
/// use quizsheet::PipelineBuilder;
///
/// # fn main() -> Result<(), quizsheet::QuizSheetError> {
/// let pipeline = PipelineBuilder::new().build()?;
/// let records = pipeline.parse_file(Path::new("data/questions.txt"));
/// let appended = pipeline.append(&records, Path::new("test_questions.xlsx"));
/// let added = pipeline.convert(Path::new("test_questions.xlsx"), Path::new("data/questions.json"));
/// println!("{} rows appended, {} questions added", appended, added);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// テキストを解析する
    pub fn parse_text(&self, text: &str) -> Vec<QuestionBlockRecord> {
        TextBlockParser::new(&self.config, self.reporter.as_ref()).parse(text, "<text>")
    }

    /// テキストファイルを解析する（読み込み失敗時は空）
    pub fn parse_file(&self, path: &Path) -> Vec<QuestionBlockRecord> {
        TextBlockParser::new(&self.config, self.reporter.as_ref()).parse_file(path)
    }

    /// テキストファイルを解析する
    pub fn try_parse_file(&self, path: &Path) -> Result<Vec<QuestionBlockRecord>, QuizSheetError> {
        TextBlockParser::new(&self.config, self.reporter.as_ref()).try_parse_file(path)
    }

    /// レコードをストアに追記し、追記した行数を返す（失敗時は0）
    pub fn append(&self, records: &[QuestionBlockRecord], store: &Path) -> usize {
        match self.try_append(records, store) {
            Ok(summary) => summary.appended,
            Err(e) => {
                self.report_failure("appending to", store, &e);
                0
            }
        }
    }

    /// レコードをストアに追記する
    pub fn try_append(
        &self,
        records: &[QuestionBlockRecord],
        store: &Path,
    ) -> Result<AppendSummary, QuizSheetError> {
        StoreAppender::new(&self.config, self.reporter.as_ref()).append(records, store)
    }

    /// ストアをコレクションに変換し、追加したレコード数を返す（失敗時は0）
    pub fn convert(&self, store: &Path, collection: &Path) -> usize {
        match self.try_convert(store, collection) {
            Ok(summary) => summary.added,
            Err(e) => {
                self.report_failure("converting", store, &e);
                0
            }
        }
    }

    /// ストアをコレクションに変換する
    pub fn try_convert(
        &self,
        store: &Path,
        collection: &Path,
    ) -> Result<ConvertSummary, QuizSheetError> {
        CollectionConverter::new(&self.config, self.reporter.as_ref()).convert(store, collection)
    }

    /// テキスト → ストア → コレクションの全段階を実行する
    ///
    /// パース結果が空の場合は追記を行わず、変換のみ実行する。
    pub fn run(&self, source: &Path, store: &Path, collection: &Path) -> PipelineSummary {
        let records = self.parse_file(source);
        let appended = if records.is_empty() {
            self.reporter
                .record(Severity::Info, "No questions to append");
            0
        } else {
            self.append(&records, store)
        };
        let added = self.convert(store, collection);

        PipelineSummary {
            parsed: records.len(),
            appended,
            added,
        }
    }

    fn report_failure(&self, action: &str, path: &Path, error: &QuizSheetError) {
        let message = if error.is_source_missing() {
            QuizSheetError::SourceMissing(path.to_path_buf()).to_string()
        } else {
            format!("Error {} {}: {}", action, path.display(), error)
        };
        self.reporter.record(Severity::Error, &message);
    }
}
