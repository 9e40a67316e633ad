//! Parser Module
//!
//! 入力側の解析処理。テキストの問題ブロックと、calamineによるストア行の読み出しを提供します。

mod text;
mod workbook;

pub(crate) use text::TextBlockParser;
pub(crate) use workbook::WorkbookParser;
