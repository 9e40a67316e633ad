//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::path::PathBuf;
use thiserror::Error;

/// quizsheetクレート全体で使用するエラー型
///
/// テキストの解析、ストア（XLSX）への追記、JSONコレクションへの変換、
/// 設定の読み込み中に発生するすべてのエラーを統一的に扱います。
///
/// 重複スキップや不完全ブロックのスキップはエラーではなく、
/// [`Reporter`](crate::Reporter)へのイベントとして通知されます。
///
/// # 使用例
///
/// ```rust,no_run
/// use quizsheet::QuizSheetError;
///
/// fn read_source(path: &str) -> Result<String, QuizSheetError> {
///     let text = std::fs::read_to_string(path)?; // Ioエラーが自動的に変換される
///     Ok(text)
/// }
/// ```
#[derive(Error, Debug)]
pub enum QuizSheetError {
    /// I/O操作中に発生したエラー
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// calamineによるストアの読み込み中に発生したエラー
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// umya-spreadsheetによるストアの読み書き中に発生したエラー
    ///
    /// umya-spreadsheetのエラー型はバージョン間で安定しないため、
    /// メッセージ文字列として保持します。
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// JSONコレクションの解析・シリアライズエラー
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定ファイル（TOML）の解析エラー
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `PipelineBuilder::build()`時の検証や、存在しないシート名の指定などで発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 入力ファイルが存在しない
    #[error("Error: {} not found", .0.display())]
    SourceMissing(PathBuf),

    /// 入力ファイルは存在するが内容が空
    #[error("Error: {} is empty", .0.display())]
    SourceEmpty(PathBuf),

    /// サイズ制限やパストラバーサルなどのセキュリティ制限に違反した
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// 問題配信サービスの待ち受け・実行中に発生したエラー
    #[error("Server error: {0}")]
    Server(#[from] hyper::Error),
}

impl QuizSheetError {
    /// 入力ファイルが見つからなかったことを表すエラーか
    pub fn is_source_missing(&self) -> bool {
        match self {
            QuizSheetError::SourceMissing(_) => true,
            QuizSheetError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
