//! Security Module
//!
//! 入力ファイルのサイズ制限と、静的アセットのパス検証を提供するモジュール。

use crate::error::QuizSheetError;
use std::path::{Component, Path, PathBuf};

/// セキュリティ設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityConfig {
    /// 入力ファイル（テキスト・XLSX・JSON）の最大サイズ（バイト）
    /// デフォルト: 64MB
    pub max_input_file_size: u64,
    /// `/api/log`で受け付けるリクエストボディの最大サイズ（バイト）
    /// デフォルト: 64KB
    pub max_request_body: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 67_108_864, // 64MB
            max_request_body: 65_536,        // 64KB
        }
    }
}

impl SecurityConfig {
    /// 入力ファイルが存在し、サイズ制限内であることを検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(u64)` - ファイルサイズ
    /// * `Err(QuizSheetError::SourceMissing)` - ファイルが存在しない場合
    /// * `Err(QuizSheetError::SecurityViolation)` - サイズ制限を超える場合
    pub fn check_input_file(&self, path: &Path) -> Result<u64, QuizSheetError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(QuizSheetError::SourceMissing(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.len() > self.max_input_file_size {
            return Err(QuizSheetError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                metadata.len(),
                self.max_input_file_size
            )));
        }

        Ok(metadata.len())
    }
}

/// 静的アセットの相対パスを検証する
///
/// パストラバーサル攻撃を防ぐため、リクエストされたパスを検証します。
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`、絶対パス、バックスラッシュを含む）
pub(crate) fn validate_asset_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // 絶対パスを拒否（Windows形式の`C:\`やUnix形式の`/`で始まるパス）
    if path.starts_with('/') || path.as_bytes().get(1) == Some(&b':') {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    if path.contains('\0') {
        return Err(format!("NUL byte in path is not allowed: {}", path));
    }

    if Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(format!("Path traversal detected: {}", path));
    }

    Ok(())
}

/// 検証済みの相対パスを静的ルートに連結する
pub(crate) fn resolve_asset_path(root: &Path, path: &str) -> Result<PathBuf, String> {
    validate_asset_path(path)?;
    Ok(root.join(path))
}
