//! Integration Tests for the spreadsheet appender
//!
//! Stores are generated with rust_xlsxwriter: a title in row 1 and column
//! headers in row 4, so data starts at row 5.

use calamine::{open_workbook, Data, Reader, Xlsx};
use quizsheet::{MemoryReporter, Pipeline, PipelineBuilder, QuizSheetError, Severity};
use rust_xlsxwriter::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    pub const HEADERS: [&str; 11] = [
        "ID",
        "Type",
        "Domain",
        "Module",
        "Question",
        "Option A",
        "Option B",
        "Option C",
        "Option D",
        "Answer",
        "Explanation",
    ];

    /// Generate an empty store: title and headers only
    pub fn generate_empty_store() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Sheet1")?;

        worksheet.write_string(0, 0, "CAPM Question Bank")?;
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string(3, col as u16, *header)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a store holding one existing question at row 5
    pub fn generate_store_with_question(question: &str) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Sheet1")?;

        worksheet.write_string(0, 0, "CAPM Question Bank")?;
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string(3, col as u16, *header)?;
        }

        worksheet.write_number(4, 0, 0.0)?;
        worksheet.write_string(4, 1, "single")?;
        worksheet.write_number(4, 2, 4.0)?;
        worksheet.write_string(4, 3, "6")?;
        worksheet.write_string(4, 4, question)?;
        worksheet.write_string(4, 5, "A")?;
        worksheet.write_string(4, 6, "B")?;
        worksheet.write_string(4, 7, "C")?;
        worksheet.write_string(4, 8, "D")?;
        worksheet.write_string(4, 9, "1")?;
        worksheet.write_string(4, 10, "Existing explanation")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a store with a single header row and no metadata rows
    pub fn generate_short_header_store() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Sheet1")?;
        worksheet.write_string(0, 0, "ID")?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Generate a store whose only sheet is not named Sheet1
    pub fn generate_renamed_sheet_store() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Questions")?;
        worksheet.write_string(0, 0, "ID")?;

        Ok(workbook.save_to_buffer()?)
    }

    pub fn block(question: &str, answer: &str) -> String {
        format!(
            "Question: {}\nOption A: First\nOption B: Second\nOption C: Third\nOption D: Fourth\nAnswer: {}\nExplanation: Because.\n",
            question, answer
        )
    }
}

fn write_store(dir: &Path, bytes: Vec<u8>) -> PathBuf {
    let path = dir.join("test_questions.xlsx");
    std::fs::write(&path, bytes).unwrap();
    path
}

fn pipeline() -> (Pipeline, MemoryReporter) {
    let reporter = MemoryReporter::new();
    let pipeline = PipelineBuilder::new()
        .with_reporter(Arc::new(reporter.clone()))
        .build()
        .unwrap();
    (pipeline, reporter)
}

/// Read a cell as text (row and col are 1-based, like the spreadsheet UI)
fn cell_text(store: &Path, row: u32, col: u32) -> Option<String> {
    let mut workbook: Xlsx<_> = open_workbook(store).unwrap();
    let range = workbook.worksheet_range("Sheet1").unwrap();
    match range.get_value((row - 1, col - 1)) {
        Some(Data::String(s)) => Some(s.clone()),
        Some(Data::Float(f)) => Some(f.to_string()),
        Some(Data::Int(i)) => Some(i.to_string()),
        _ => None,
    }
}

#[test]
fn test_append_two_records_to_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), fixtures::generate_empty_store().unwrap());
    let (pipeline, _) = pipeline();

    let text = format!("{}//\n{}", fixtures::block("Q1", "1"), fixtures::block("Q2", "2,4"));
    let records = pipeline.parse_text(&text);
    assert_eq!(records.len(), 2);

    let summary = pipeline.try_append(&records, &store).unwrap();
    assert_eq!(summary.appended, 2);
    assert_eq!(summary.duplicates, 0);

    assert_eq!(cell_text(&store, 5, 5).as_deref(), Some("Q1"));
    assert_eq!(cell_text(&store, 6, 5).as_deref(), Some("Q2"));
    assert_eq!(cell_text(&store, 5, 1).as_deref(), Some("0"));
    assert_eq!(cell_text(&store, 5, 2).as_deref(), Some("single"));
    assert_eq!(cell_text(&store, 6, 2).as_deref(), Some("multiple"));
    assert_eq!(cell_text(&store, 5, 3).as_deref(), Some("4"));
    assert_eq!(cell_text(&store, 5, 4).as_deref(), Some("6"));
    assert_eq!(cell_text(&store, 6, 10).as_deref(), Some("2,4"));
    assert_eq!(cell_text(&store, 6, 11).as_deref(), Some("Because."));
}

#[test]
fn test_header_rows_are_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), fixtures::generate_empty_store().unwrap());
    let (pipeline, _) = pipeline();

    let records = pipeline.parse_text(&fixtures::block("Q1", "1"));
    pipeline.append(&records, &store);

    assert_eq!(cell_text(&store, 1, 1).as_deref(), Some("CAPM Question Bank"));
    assert_eq!(cell_text(&store, 4, 5).as_deref(), Some("Question"));
}

#[test]
fn test_rerun_appends_nothing_and_keeps_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), fixtures::generate_empty_store().unwrap());
    let (pipeline, reporter) = pipeline();

    let text = format!("{}//{}", fixtures::block("Q1", "1"), fixtures::block("Q2", "2"));
    let records = pipeline.parse_text(&text);
    assert_eq!(pipeline.append(&records, &store), 2);

    let before = std::fs::read(&store).unwrap();
    let summary = pipeline.try_append(&records, &store).unwrap();
    let after = std::fs::read(&store).unwrap();

    assert_eq!(summary.appended, 0);
    assert_eq!(summary.duplicates, 2);
    assert_eq!(before, after);
    assert!(reporter.contains("Skipping duplicate question: Q1"));
    assert!(reporter.contains("Skipping duplicate question: Q2"));
}

#[test]
fn test_duplicates_within_one_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), fixtures::generate_empty_store().unwrap());
    let (pipeline, _) = pipeline();

    let text = format!("{}//{}", fixtures::block("Same", "1"), fixtures::block("Same", "3"));
    let records = pipeline.parse_text(&text);
    let summary = pipeline.try_append(&records, &store).unwrap();

    assert_eq!(summary.appended, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(cell_text(&store, 6, 5), None);
}

#[test]
fn test_append_after_existing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(
        dir.path(),
        fixtures::generate_store_with_question("Existing").unwrap(),
    );
    let (pipeline, _) = pipeline();

    let text = format!("{}//{}", fixtures::block("Existing", "1"), fixtures::block("New", "2"));
    let records = pipeline.parse_text(&text);
    let summary = pipeline.try_append(&records, &store).unwrap();

    assert_eq!(summary.appended, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(cell_text(&store, 5, 5).as_deref(), Some("Existing"));
    assert_eq!(cell_text(&store, 6, 5).as_deref(), Some("New"));
}

#[test]
fn test_first_data_row_is_lower_bound() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), fixtures::generate_short_header_store().unwrap());
    let (pipeline, _) = pipeline();

    let records = pipeline.parse_text(&fixtures::block("Q1", "1"));
    assert_eq!(pipeline.append(&records, &store), 1);

    assert_eq!(cell_text(&store, 2, 5), None);
    assert_eq!(cell_text(&store, 5, 5).as_deref(), Some("Q1"));
}

#[test]
fn test_missing_store_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("missing.xlsx");
    let (pipeline, reporter) = pipeline();

    let records = pipeline.parse_text(&fixtures::block("Q1", "1"));
    let result = pipeline.try_append(&records, &store);
    assert!(matches!(result, Err(QuizSheetError::SourceMissing(_))));

    assert_eq!(pipeline.append(&records, &store), 0);
    assert!(!store.exists());
    assert!(reporter.contains("missing.xlsx not found"));
}

#[test]
fn test_missing_sheet_is_error_and_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), fixtures::generate_renamed_sheet_store().unwrap());
    let before = std::fs::read(&store).unwrap();
    let (pipeline, reporter) = pipeline();

    let records = pipeline.parse_text(&fixtures::block("Q1", "1"));
    match pipeline.try_append(&records, &store) {
        Err(QuizSheetError::Config(msg)) => assert!(msg.contains("Sheet1")),
        other => panic!("Expected Config error, got {:?}", other),
    }

    assert_eq!(pipeline.append(&records, &store), 0);
    assert_eq!(reporter.count(Severity::Error), 1);
    assert_eq!(std::fs::read(&store).unwrap(), before);
}

#[test]
fn test_custom_sheet_name() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), fixtures::generate_renamed_sheet_store().unwrap());
    let pipeline = PipelineBuilder::new()
        .with_sheet_name("Questions")
        .with_reporter(Arc::new(MemoryReporter::new()))
        .build()
        .unwrap();

    let records = pipeline.parse_text(&fixtures::block("Q1", "1"));
    assert_eq!(pipeline.append(&records, &store), 1);

    let mut workbook: Xlsx<_> = open_workbook(&store).unwrap();
    let range = workbook.worksheet_range("Questions").unwrap();
    assert_eq!(
        range.get_value((4, 4)),
        Some(&Data::String("Q1".to_string()))
    );
}

#[test]
fn test_empty_records_leave_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_store(dir.path(), fixtures::generate_empty_store().unwrap());
    let before = std::fs::read(&store).unwrap();
    let (pipeline, reporter) = pipeline();

    let summary = pipeline.try_append(&[], &store).unwrap();

    assert_eq!(summary.appended, 0);
    assert_eq!(std::fs::read(&store).unwrap(), before);
    assert!(reporter.contains("Appended 0 questions"));
}
