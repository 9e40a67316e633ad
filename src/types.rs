//! Types Module
//!
//! クレート内部で使用するセル・座標・行のデータ型を定義するモジュール。

use crate::api::QuestionBlockRecord;

/// ストアの列数（A〜K）
pub(crate) const COLUMN_COUNT: usize = 11;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 値を文字列として取得
    ///
    /// 整数値の数値は小数点なしで出力する（`4.0` -> `"4"`）。
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::String(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// 数値をセル表示用の文字列に変換
pub(crate) fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, self.row + 1)
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// ストアの列（A〜K）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Column {
    Id,
    Type,
    Domain,
    Module,
    Question,
    OptionA,
    OptionB,
    OptionC,
    OptionD,
    Answer,
    Explanation,
}

impl Column {
    /// 列順序（A〜K）
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Id,
        Column::Type,
        Column::Domain,
        Column::Module,
        Column::Question,
        Column::OptionA,
        Column::OptionB,
        Column::OptionC,
        Column::OptionD,
        Column::Answer,
        Column::Explanation,
    ];

    /// 選択肢の列（A〜D）
    pub const OPTIONS: [Column; 4] = [
        Column::OptionA,
        Column::OptionB,
        Column::OptionC,
        Column::OptionD,
    ];

    /// 0始まりの列インデックス
    pub fn index(self) -> u32 {
        self as u32
    }

    /// 指定行（1始まり）におけるこの列のセル座標
    pub fn at_row(self, row_number: u32) -> CellCoord {
        CellCoord::new(row_number.saturating_sub(1), self.index())
    }
}

/// ストアの1行（A〜Kの11セル）
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpreadsheetRow {
    /// 行番号（1始まり）
    pub row_number: u32,

    /// 列順に並んだセル値（常に11個）
    pub cells: Vec<CellValue>,
}

impl SpreadsheetRow {
    /// セル値のリストから行を生成（不足分は空セルで埋める）
    pub fn new(row_number: u32, mut cells: Vec<CellValue>) -> Self {
        cells.resize(COLUMN_COUNT, CellValue::Empty);
        Self { row_number, cells }
    }

    /// パース済みレコードから書き込み用の行を生成
    pub fn from_block(row_number: u32, record: &QuestionBlockRecord) -> Self {
        let cells = vec![
            CellValue::Number(record.id as f64),
            CellValue::String(record.question_type.as_str().to_string()),
            CellValue::Number(record.domain as f64),
            CellValue::String(record.module.clone()),
            CellValue::String(record.question.clone()),
            CellValue::String(record.option_a.clone()),
            CellValue::String(record.option_b.clone()),
            CellValue::String(record.option_c.clone()),
            CellValue::String(record.option_d.clone()),
            CellValue::String(record.answer.clone()),
            CellValue::String(record.explanation.clone()),
        ];
        Self { row_number, cells }
    }

    /// 指定列のセル値
    pub fn cell(&self, column: Column) -> &CellValue {
        &self.cells[column.index() as usize]
    }

    /// 指定列のセルを文字列として取得（空セルは`None`）
    pub fn text(&self, column: Column) -> Option<String> {
        let cell = self.cell(column);
        if cell.is_empty() {
            None
        } else {
            Some(cell.as_text())
        }
    }
}
