//! 永続化ヘルパー
//!
//! ストアとコレクションは常に全体を書き戻すため、一時ファイルに書き込んでから
//! リネームで置き換える。書き込みに失敗しても元のファイルは実行前の状態のまま残る。

use std::io;
use std::path::{Path, PathBuf};

/// `path`と同じディレクトリの一時ファイルパス
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// バイト列をファイルに原子的に書き込む
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = temp_path(path);
    if let Err(e) = std::fs::write(&tmp, bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        e
    })
}
