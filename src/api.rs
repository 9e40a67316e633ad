//! Public API Types
//!
//! 公開APIで使用するレコード型と列挙型を定義するモジュール。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 問題の回答形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    /// 単一回答
    Single,
    /// 複数回答（回答がカンマ区切りのリスト）
    Multiple,
}

impl QuestionType {
    /// 回答文字列から回答形式を導出する
    ///
    /// カンマを含む場合は`Multiple`、それ以外は`Single`。
    pub fn from_answer(answer: &str) -> Self {
        if answer.contains(',') {
            QuestionType::Multiple
        } else {
            QuestionType::Single
        }
    }

    /// セルに書き込む文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Single => "single",
            QuestionType::Multiple => "multiple",
        }
    }

    /// セルの文字列から回答形式を解釈する（大文字小文字を区別しない）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Some(QuestionType::Single),
            "multiple" => Some(QuestionType::Multiple),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSONコレクション上の回答
///
/// 単一の整数、またはカンマ区切りの回答から得られた整数のリストとして
/// シリアライズされます。
///
/// ```json
/// 3
/// [2, 4]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// 単一回答（例: `3`）
    Single(i64),
    /// 複数回答（例: `[2, 4]`）
    Multiple(Vec<i64>),
}

impl Default for Answer {
    fn default() -> Self {
        Answer::Single(0)
    }
}

impl Answer {
    /// ストアの回答セルを解釈する
    ///
    /// * カンマを含む場合: 各要素を整数として解釈したリスト
    /// * 空の場合: `0`
    /// * それ以外: 単一の整数
    ///
    /// # 戻り値
    ///
    /// * `Ok(Answer)` - 解釈に成功した場合
    /// * `Err(String)` - 整数として解釈できない要素を含む場合
    pub fn parse_cell(cell: &str) -> Result<Self, String> {
        if cell.contains(',') {
            cell.split(',')
                .map(|part| {
                    part.trim()
                        .parse::<i64>()
                        .map_err(|_| format!("invalid answer element '{}'", part.trim()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Answer::Multiple)
        } else if cell.trim().is_empty() {
            Ok(Answer::Single(0))
        } else {
            cell.trim()
                .parse::<i64>()
                .map(Answer::Single)
                .map_err(|_| format!("invalid answer '{}'", cell.trim()))
        }
    }
}

/// テキストブロックパーサーの出力レコード
///
/// 1回の解析実行の間だけ存在する一時的なレコードです。
/// `id`は下流で採番されるまで`0`のプレースホルダーです。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlockRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub domain: i64,
    pub module: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub answer: String,
    pub explanation: String,
}

/// JSONコレクションに永続化される問題レコード
///
/// キーの順序は`id, type, domain, module, question, options, answer, explanation`で固定です。
/// 定義外のキー（例: フロントエンドが参照する`program`）は`extra`に保持され、
/// シリアライズ時にそのまま出力されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub domain: i64,
    pub module: String,
    pub question: String,
    pub options: Vec<String>,
    pub answer: Answer,
    #[serde(default)]
    pub explanation: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// 選択肢に付与するラベル
pub(crate) const OPTION_LABELS: [&str; 4] = ["a", "b", "c", "d"];
