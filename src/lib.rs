//! quizsheet - Exam question pipeline: flat text to XLSX to JSON
//!
//! This crate turns delimited, human-authored question text into rows of a
//! spreadsheet store (XLSX), then converts those rows into a JSON collection
//! with sequential ids, and finally serves that collection to a static web
//! front end.
//!
//! ```text
//! questions.txt ──parse──▶ records ──append──▶ store.xlsx ──convert──▶ questions.json ──serve──▶ /api/questions
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use quizsheet::PipelineBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = PipelineBuilder::new().build()?;
//!
//!     // Parse, append and convert in one go
//!     let summary = pipeline.run(
//!         Path::new("data/questions.txt"),
//!         Path::new("test_questions.xlsx"),
//!         Path::new("app/questions.json"),
//!     );
//!     println!("{} appended, {} added", summary.appended, summary.added);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Handling Failures
//!
//! `append`/`convert` report failures to the configured [`Reporter`] and
//! return `0`. Use the `try_*` variants to get the error instead:
//!
//! ```rust,no_run
//! use std::path::Path;
//! use quizsheet::{PipelineBuilder, QuizSheetError};
//!
//! # fn main() -> Result<(), QuizSheetError> {
//! let pipeline = PipelineBuilder::new()
//!     .with_sheet_name("Questions")
//!     .with_baseline_id(500)
//!     .build()?;
//!
//! let records = pipeline.try_parse_file(Path::new("data/questions.txt"))?;
//! let appended = pipeline.try_append(&records, Path::new("bank.xlsx"))?;
//! let converted = pipeline.try_convert(Path::new("bank.xlsx"), Path::new("questions.json"))?;
//! println!("{:?} {:?}", appended, converted);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```rust,no_run
//! use quizsheet::Settings;
//!
//! # fn main() -> Result<(), quizsheet::QuizSheetError> {
//! // ./quizsheet.toml if present, defaults otherwise
//! let settings = Settings::load(None)?;
//! let pipeline = settings.pipeline_builder().build()?;
//! # Ok(())
//! # }
//! ```

mod api;
mod appender;
mod builder;
mod collection;
mod config;
mod converter;
mod error;
mod formatter;
mod logging;
mod parser;
mod persist;
mod report;
mod security;
mod server;
mod types;

// 公開API
pub use api::{Answer, QuestionBlockRecord, QuestionRecord, QuestionType};
pub use appender::AppendSummary;
pub use builder::{Pipeline, PipelineBuilder, PipelineSummary};
pub use config::{
    LimitSettings, LoggingSettings, PathSettings, PipelineSettings, ServerSettings, Settings,
    DEFAULT_CONFIG_FILE,
};
pub use converter::ConvertSummary;
pub use error::QuizSheetError;
pub use logging::{init_logging, log_file_path};
pub use report::{MemoryReporter, ReportEvent, Reporter, Severity, TracingReporter};
pub use security::SecurityConfig;
pub use server::{serve, ClientLogEntry, QuestionService};
