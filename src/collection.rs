//! Question Collection Module
//!
//! JSONコレクション（問題レコードのトップレベル配列）の読み込みと書き戻し。
//! コレクションは毎回全体を読み込み、追記後に全体を書き戻す。
//!
//! 既存のエントリーは`id`と`question`しか参照しないため、型付きレコードには変換せず
//! JSON値のまま保持する（`type`が`"Single"`、`domain`が`"4"`のような値もそのまま書き戻す）。

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::api::QuestionRecord;
use crate::error::QuizSheetError;
use crate::persist::write_atomically;
use crate::security::SecurityConfig;

/// 永続化されたJSONコレクション
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct QuestionCollection {
    entries: Vec<Value>,
}

impl QuestionCollection {
    /// コレクションを読み込む（ファイルが存在しない場合は空）
    pub fn load(path: &Path, security: &SecurityConfig) -> Result<Self, QuizSheetError> {
        match security.check_input_file(path) {
            Ok(_) => {}
            Err(QuizSheetError::SourceMissing(_)) => return Ok(Self::default()),
            Err(e) => return Err(e),
        }

        let bytes = std::fs::read(path)?;
        Self::from_slice(&bytes)
    }

    /// トップレベルが配列でなければ`QuizSheetError::Json`
    pub fn from_slice(bytes: &[u8]) -> Result<Self, QuizSheetError> {
        let entries: Vec<Value> = serde_json::from_slice(bytes)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 既存の最大ID（整数の`id`を持つエントリーがなければ`baseline`）
    pub fn last_id(&self, baseline: i64) -> i64 {
        self.entries
            .iter()
            .filter_map(|e| e.get("id").and_then(Value::as_i64))
            .max()
            .unwrap_or(baseline)
    }

    /// 既存の問題文の集合
    pub fn questions(&self) -> HashSet<String> {
        self.entries
            .iter()
            .filter_map(|e| e.get("question").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    /// 新しいレコードを末尾に追加する
    pub fn extend(&mut self, records: Vec<QuestionRecord>) -> Result<(), QuizSheetError> {
        for record in records {
            self.entries.push(serde_json::to_value(record)?);
        }
        Ok(())
    }

    /// 4スペースでインデントしたJSONに変換
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, QuizSheetError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.entries.serialize(&mut serializer)?;
        Ok(buffer)
    }

    /// コレクション全体を書き戻す
    pub fn save(&self, path: &Path) -> Result<(), QuizSheetError> {
        let bytes = self.to_pretty_json()?;
        write_atomically(path, &bytes)?;
        Ok(())
    }
}
