//! Configuration Module
//!
//! 起動時に一度だけTOMLファイルから設定を読み込む。
//! すべてのセクション・項目にデフォルト値があり、ファイルには変更したい項目だけを書けばよい。
//!
//! ```toml
//! [paths]
//! source = "data/questions.txt"
//! store = "test_questions.xlsx"
//!
//! [server]
//! bind = "127.0.0.1:8085"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::builder::PipelineBuilder;
use crate::error::QuizSheetError;
use crate::security::SecurityConfig;

/// 設定ファイルが指定されなかった場合に探すファイル名
pub const DEFAULT_CONFIG_FILE: &str = "quizsheet.toml";

/// アプリケーション設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub pipeline: PipelineSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub limits: LimitSettings,
}

/// 入出力ファイルのパス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// 区切り付きテキスト
    pub source: PathBuf,
    /// ストア（XLSX）
    pub store: PathBuf,
    /// ストアのシート名
    pub sheet: String,
    /// JSONコレクション
    pub collection: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            source: PathBuf::from("data/questions.txt"),
            store: PathBuf::from("test_questions.xlsx"),
            sheet: "Sheet1".to_string(),
            collection: PathBuf::from("app/questions.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub first_data_row: u32,
    pub baseline_id: i64,
    pub default_domain: i64,
    pub default_module: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            first_data_row: 5,
            baseline_id: 301,
            default_domain: 4,
            default_module: "6".to_string(),
        }
    }
}

/// 問題配信サービスの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 待ち受けアドレス
    pub bind: String,
    /// 静的アセットのルートディレクトリ
    pub static_root: PathBuf,
    /// `/api/questions`で配信するJSONファイル
    pub questions: PathBuf,
    /// `/`で配信するファイル名（`static_root`からの相対パス）
    pub index: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8085".to_string(),
            static_root: PathBuf::from("app"),
            questions: PathBuf::from("app/questions.json"),
            index: "index.html".to_string(),
        }
    }
}

/// ログ出力の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// ログファイルの出力先ディレクトリ
    pub dir: PathBuf,
    /// ログファイル名の接頭辞（`<prefix>_<YYYYMMDD_HHMM>.log`）
    pub file_prefix: String,
    /// ログレベル（`RUST_LOG`が設定されていればそちらを優先）
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("Error_Log"),
            file_prefix: "quizsheet_error_log".to_string(),
            level: "debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    pub max_input_file_size: u64,
    pub max_request_body: u64,
}

impl Default for LimitSettings {
    fn default() -> Self {
        let security = SecurityConfig::default();
        Self {
            max_input_file_size: security.max_input_file_size,
            max_request_body: security.max_request_body,
        }
    }
}

impl Settings {
    /// 設定を読み込む
    ///
    /// # 引数
    ///
    /// * `path` - 設定ファイルのパス。`None`の場合はカレントディレクトリの
    ///   `quizsheet.toml`を探し、存在しなければデフォルト設定を返す
    ///
    /// # 戻り値
    ///
    /// * `Err(QuizSheetError::SourceMissing)` - 明示的に指定したファイルが存在しない場合
    /// * `Err(QuizSheetError::Toml)` - TOMLとして解析できない場合
    pub fn load(path: Option<&Path>) -> Result<Self, QuizSheetError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => QuizSheetError::SourceMissing(path.clone()),
            _ => QuizSheetError::Io(e),
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, QuizSheetError> {
        Ok(toml::from_str(text)?)
    }

    pub fn security(&self) -> SecurityConfig {
        SecurityConfig {
            max_input_file_size: self.limits.max_input_file_size,
            max_request_body: self.limits.max_request_body,
        }
    }

    /// 設定値を反映したビルダーを生成する（検証は`build()`で行われる）
    pub fn pipeline_builder(&self) -> PipelineBuilder {
        PipelineBuilder::new()
            .with_sheet_name(self.paths.sheet.clone())
            .with_first_data_row(self.pipeline.first_data_row)
            .with_baseline_id(self.pipeline.baseline_id)
            .with_default_domain(self.pipeline.default_domain)
            .with_default_module(self.pipeline.default_module.clone())
            .with_security(self.security())
    }
}
