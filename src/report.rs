//! Reporting Module
//!
//! 各コンポーネントが進捗・スキップ・失敗を通知するためのインターフェース。
//! コンポーネントはファイルシステムやロガーの詳細を知らず、
//! 注入された[`Reporter`]に`record(severity, message)`で通知するだけです。

use std::fmt;
use std::sync::{Arc, Mutex};

/// イベントの重大度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// イベント通知先
pub trait Reporter: Send + Sync {
    fn record(&self, severity: Severity, message: &str);
}

/// `tracing`へ転送するデフォルトの通知先
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn record(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!("{}", message),
            Severity::Info => tracing::info!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }
    }
}

/// 記録されたイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEvent {
    pub severity: Severity,
    pub message: String,
}

/// イベントをメモリ上に蓄積する通知先
///
/// クローンは同じバッファを共有するため、パイプラインに渡した後でも
/// 手元のハンドルからイベントを参照できます。
///
/// ```rust
/// use quizsheet::{MemoryReporter, Reporter, Severity};
///
/// let reporter = MemoryReporter::new();
/// reporter.record(Severity::Warning, "Skipping incomplete question: Unknown");
/// assert_eq!(reporter.count(Severity::Warning), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryReporter {
    events: Arc<Mutex<Vec<ReportEvent>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みイベントのスナップショット
    pub fn events(&self) -> Vec<ReportEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 指定した重大度のイベント数
    pub fn count(&self, severity: Severity) -> usize {
        self.events()
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// メッセージに`needle`を含むイベントがあるか
    pub fn contains(&self, needle: &str) -> bool {
        self.events().iter().any(|e| e.message.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn record(&self, severity: Severity, message: &str) {
        let event = ReportEvent {
            severity,
            message: message.to_string(),
        };
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_reporter_shares_buffer_between_clones() {
        let reporter = MemoryReporter::new();
        let handle = reporter.clone();

        reporter.record(Severity::Info, "Parsed 2 questions");
        reporter.record(Severity::Error, "Error: store.xlsx not found");

        assert_eq!(handle.events().len(), 2);
        assert_eq!(handle.count(Severity::Error), 1);
        assert!(handle.contains("not found"));
    }

    #[test]
    fn test_severity_ordering_and_display() {
        assert!(Severity::Error > Severity::Warning);
        assert_eq!(Severity::Warning.to_string(), "WARNING");
    }
}
