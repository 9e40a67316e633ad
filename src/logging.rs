//! Logging Module
//!
//! プロセス起動ごとに1つのログファイル（`<dir>/<prefix>_<YYYYMMDD_HHMM>.log`）を作成し、
//! `tracing`の出力をファイルと標準エラー出力の両方に流す。

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingSettings;
use crate::error::QuizSheetError;

/// 起動時刻からログファイルのパスを決定する
pub fn log_file_path(dir: &Path, prefix: &str, started_at: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}_{}.log", prefix, started_at.format("%Y%m%d_%H%M")))
}

/// グローバルなtracingサブスクライバーを初期化する
///
/// `RUST_LOG`が設定されている場合は設定ファイルのレベルより優先されます。
///
/// # 戻り値
///
/// 作成したログファイルのパス
///
/// # エラー
///
/// * ログディレクトリ・ファイルを作成できない場合は`QuizSheetError::Io`
/// * レベル指定が不正、またはサブスクライバーが初期化済みの場合は`QuizSheetError::Config`
pub fn init_logging(settings: &LoggingSettings) -> Result<PathBuf, QuizSheetError> {
    fs::create_dir_all(&settings.dir)?;
    let path = log_file_path(&settings.dir, &settings.file_prefix, Local::now());
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level).map_err(|e| {
            QuizSheetError::Config(format!("invalid log level '{}': {}", settings.level, e))
        })?,
    };

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file));
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| QuizSheetError::Config(format!("failed to initialize logging: {}", e)))?;

    Ok(path)
}
