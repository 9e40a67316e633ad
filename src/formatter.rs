//! Formatter Module
//!
//! calamineのセルデータをストア行のセル値に変換するモジュール。

use calamine::Data;
use chrono::{Duration, NaiveDate};

use crate::types::CellValue;

/// セルフォーマッター
///
/// calamineが返すセル型の差異（整数・浮動小数点・日付など）を吸収し、
/// 行データとして扱える`CellValue`に正規化します。
#[derive(Debug, Default)]
pub(crate) struct CellFormatter;

impl CellFormatter {
    pub fn new() -> Self {
        Self
    }

    /// calamineのセルを`CellValue`に変換
    pub fn to_cell_value(&self, cell: &Data) -> CellValue {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::String(s.clone()),
            Data::Bool(b) => CellValue::String(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
            Data::DateTime(dt) => match serial_to_iso_date(dt.as_f64()) {
                Some(date) => CellValue::String(date),
                None => CellValue::Empty,
            },
            _ => CellValue::Empty,
        }
    }
}

/// Excelのシリアル値（1900年システム）をISO 8601形式の日付に変換
fn serial_to_iso_date(serial_value: f64) -> Option<String> {
    // 1899-12-30起算（1900年うるう年バグ以降の日付で正しい値になる）
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial_value.floor() as i64;
    let date = epoch.checked_add_signed(Duration::days(days))?;
    Some(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_become_number_cells() {
        let formatter = CellFormatter::new();
        assert_eq!(formatter.to_cell_value(&Data::Int(4)), CellValue::Number(4.0));
        assert_eq!(
            formatter.to_cell_value(&Data::Float(6.0)).as_text(),
            "6".to_string()
        );
    }

    #[test]
    fn test_strings_are_kept_verbatim() {
        let formatter = CellFormatter::new();
        assert_eq!(
            formatter.to_cell_value(&Data::String(" 2,4 ".into())),
            CellValue::String(" 2,4 ".into())
        );
    }

    #[test]
    fn test_empty_and_error_cells() {
        let formatter = CellFormatter::new();
        assert!(formatter.to_cell_value(&Data::Empty).is_empty());
        assert!(formatter
            .to_cell_value(&Data::Error(calamine::CellErrorType::NA))
            .is_empty());
    }

    #[test]
    fn test_bool_cells() {
        let formatter = CellFormatter::new();
        assert_eq!(formatter.to_cell_value(&Data::Bool(true)).as_text(), "TRUE");
    }

    #[test]
    fn test_serial_to_iso_date() {
        assert_eq!(serial_to_iso_date(45000.0).as_deref(), Some("2023-03-15"));
        assert_eq!(serial_to_iso_date(45000.75).as_deref(), Some("2023-03-15"));
    }
}
