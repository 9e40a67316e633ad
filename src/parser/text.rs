//! テキストブロックパーサー
//!
//! `//`で区切られた問題ブロックを[`QuestionBlockRecord`]に変換します。
//!
//! ```text
//! Question: What is a project charter?
//! Option A: A schedule
//! Option B: A document that authorizes the project
//! Option C: A risk register
//! Option D: A budget
//! Answer: 2
//! Explanation: The charter formally authorizes the project.
//! //
//! ```

use std::path::Path;

use crate::api::{QuestionBlockRecord, QuestionType};
use crate::builder::PipelineConfig;
use crate::error::QuizSheetError;
use crate::report::{Reporter, Severity};

/// ブロック区切り文字列
pub(crate) const BLOCK_DELIMITER: &str = "//";

/// レコードとして受理するために必要な認識済みフィールド数
const REQUIRED_FIELDS: usize = 7;

/// 認識するフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Question,
    OptionA,
    OptionB,
    OptionC,
    OptionD,
    Answer,
    Explanation,
}

/// 行頭プレフィックスとフィールドの対応
const PREFIXES: [(&str, Field); REQUIRED_FIELDS] = [
    ("Question:", Field::Question),
    ("Option A:", Field::OptionA),
    ("Option B:", Field::OptionB),
    ("Option C:", Field::OptionC),
    ("Option D:", Field::OptionD),
    ("Answer:", Field::Answer),
    ("Explanation:", Field::Explanation),
];

/// 1ブロック分の収集結果
#[derive(Debug, Default)]
struct BlockFields {
    question: Option<String>,
    option_a: Option<String>,
    option_b: Option<String>,
    option_c: Option<String>,
    option_d: Option<String>,
    answer: Option<String>,
    explanation: Option<String>,
}

/// 必須フィールドが揃わなかったブロック
#[derive(Debug)]
struct IncompleteBlock {
    question: Option<String>,
}

impl BlockFields {
    /// ブロック内の各行をプレフィックスで振り分ける
    ///
    /// 同じプレフィックスが複数回現れた場合は後勝ち。どのプレフィックスにも
    /// 一致しない行は無視する。
    fn scan(block: &str) -> Self {
        let mut fields = Self::default();
        for line in block.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some((field, value)) = match_prefix(line) {
                *fields.slot(field) = Some(value.to_string());
            }
        }
        fields
    }

    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Question => &mut self.question,
            Field::OptionA => &mut self.option_a,
            Field::OptionB => &mut self.option_b,
            Field::OptionC => &mut self.option_c,
            Field::OptionD => &mut self.option_d,
            Field::Answer => &mut self.answer,
            Field::Explanation => &mut self.explanation,
        }
    }

    fn into_record(self, config: &PipelineConfig) -> Result<QuestionBlockRecord, IncompleteBlock> {
        match self {
            BlockFields {
                question: Some(question),
                option_a: Some(option_a),
                option_b: Some(option_b),
                option_c: Some(option_c),
                option_d: Some(option_d),
                answer: Some(answer),
                explanation: Some(explanation),
            } => Ok(QuestionBlockRecord {
                id: 0,
                question_type: QuestionType::from_answer(&answer),
                domain: config.default_domain,
                module: config.default_module.clone(),
                question,
                option_a,
                option_b,
                option_c,
                option_d,
                answer,
                explanation,
            }),
            incomplete => Err(IncompleteBlock {
                question: incomplete.question,
            }),
        }
    }
}

fn match_prefix(line: &str) -> Option<(Field, &str)> {
    PREFIXES.iter().find_map(|(prefix, field)| {
        line.strip_prefix(prefix).map(|rest| (*field, rest.trim()))
    })
}

/// テキストブロックパーサー
pub(crate) struct TextBlockParser<'a> {
    config: &'a PipelineConfig,
    reporter: &'a dyn Reporter,
}

impl<'a> TextBlockParser<'a> {
    pub fn new(config: &'a PipelineConfig, reporter: &'a dyn Reporter) -> Self {
        Self { config, reporter }
    }

    /// テキストを解析してレコード列を返す
    ///
    /// # 引数
    ///
    /// * `text` - 解析するテキスト
    /// * `source` - イベントメッセージに使用する入力元の名前
    ///
    /// 空のテキストはエラーイベントを通知して空の列を返す。
    pub fn parse(&self, text: &str, source: &str) -> Vec<QuestionBlockRecord> {
        let content = text.trim();
        if content.is_empty() {
            self.reporter
                .record(Severity::Error, &format!("Error: {} is empty", source));
            return Vec::new();
        }

        let mut records = Vec::new();
        for block in content.split(BLOCK_DELIMITER) {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }

            match BlockFields::scan(block).into_record(self.config) {
                Ok(record) => records.push(record),
                Err(incomplete) => self.reporter.record(
                    Severity::Warning,
                    &format!(
                        "Skipping incomplete question: {}",
                        incomplete.question.as_deref().unwrap_or("Unknown")
                    ),
                ),
            }
        }

        self.reporter.record(
            Severity::Info,
            &format!("Parsed {} questions from {}", records.len(), source),
        );
        records
    }

    /// ファイルを読み込んで解析する
    ///
    /// 読み込みに失敗した場合はエラーイベントを通知して空の列を返す。
    pub fn parse_file(&self, path: &Path) -> Vec<QuestionBlockRecord> {
        match self.try_parse_file(path) {
            Ok(records) => records,
            Err(e @ (QuizSheetError::SourceMissing(_) | QuizSheetError::SourceEmpty(_))) => {
                self.reporter.record(Severity::Error, &e.to_string());
                Vec::new()
            }
            Err(e) => {
                self.reporter.record(
                    Severity::Error,
                    &format!("Error parsing {}: {}", path.display(), e),
                );
                Vec::new()
            }
        }
    }

    /// ファイルを読み込んで解析する（読み込みの失敗は`Err`として返す）
    pub fn try_parse_file(&self, path: &Path) -> Result<Vec<QuestionBlockRecord>, QuizSheetError> {
        let text = self.read_source(path)?;
        if text.trim().is_empty() {
            return Err(QuizSheetError::SourceEmpty(path.to_path_buf()));
        }
        Ok(self.parse(&text, &path.display().to_string()))
    }

    fn read_source(&self, path: &Path) -> Result<String, QuizSheetError> {
        self.config.security.check_input_file(path)?;
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use crate::security::SecurityConfig;

    const COMPLETE_BLOCK: &str = "Question: What is scope creep?\n\
        Option A: Planned change\n\
        Option B: Uncontrolled expansion of scope\n\
        Option C: A risk response\n\
        Option D: A schedule buffer\n\
        Answer: 2\n\
        Explanation: Scope creep is uncontrolled change.";

    fn parse(text: &str) -> (Vec<QuestionBlockRecord>, MemoryReporter) {
        let config = PipelineConfig::default();
        let reporter = MemoryReporter::new();
        let records = TextBlockParser::new(&config, &reporter).parse(text, "input.txt");
        (records, reporter)
    }

    #[test]
    fn test_parse_complete_block() {
        let (records, reporter) = parse(COMPLETE_BLOCK);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.question, "What is scope creep?");
        assert_eq!(record.option_b, "Uncontrolled expansion of scope");
        assert_eq!(record.answer, "2");
        assert_eq!(record.question_type, QuestionType::Single);
        assert_eq!(record.id, 0);
        assert_eq!(record.domain, 4);
        assert_eq!(record.module, "6");
        assert!(reporter.contains("Parsed 1 questions from input.txt"));
    }

    #[test]
    fn test_multiple_answer_sets_type() {
        let text = COMPLETE_BLOCK.replace("Answer: 2", "Answer: 2,4");
        let (records, _) = parse(&text);

        assert_eq!(records[0].question_type, QuestionType::Multiple);
        assert_eq!(records[0].answer, "2,4");
    }

    #[test]
    fn test_blocks_split_on_delimiter() {
        let second = COMPLETE_BLOCK.replace("scope creep", "a stakeholder");
        let text = format!("{}\n//\n{}\n//\n\n//", COMPLETE_BLOCK, second);
        let (records, reporter) = parse(&text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].question, "What is a stakeholder?");
        assert_eq!(reporter.count(Severity::Warning), 0);
    }

    #[test]
    fn test_incomplete_block_is_skipped_and_reported() {
        let text = COMPLETE_BLOCK.replace("Explanation: Scope creep is uncontrolled change.", "");
        let (records, reporter) = parse(&text);

        assert!(records.is_empty());
        assert!(reporter.contains("Skipping incomplete question: What is scope creep?"));
    }

    #[test]
    fn test_incomplete_block_without_question_reports_unknown() {
        let (records, reporter) = parse("Option A: x\nAnswer: 1");

        assert!(records.is_empty());
        assert!(reporter.contains("Skipping incomplete question: Unknown"));
    }

    #[test]
    fn test_unrecognised_lines_are_ignored() {
        let text = format!("Source: chapter 4\n{}\nNotes: none", COMPLETE_BLOCK);
        let (records, _) = parse(&text);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_crlf_and_indentation_are_trimmed() {
        let text = COMPLETE_BLOCK.replace('\n', "\r\n   ");
        let (records, _) = parse(&text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].explanation, "Scope creep is uncontrolled change.");
    }

    #[test]
    fn test_repeated_prefix_last_wins() {
        let text = format!("{}\nAnswer: 1,3", COMPLETE_BLOCK);
        let (records, _) = parse(&text);

        assert_eq!(records[0].answer, "1,3");
        assert_eq!(records[0].question_type, QuestionType::Multiple);
    }

    #[test]
    fn test_empty_text_reports_error() {
        let (records, reporter) = parse("  \n\n ");

        assert!(records.is_empty());
        assert_eq!(reporter.count(Severity::Error), 1);
        assert!(reporter.contains("input.txt is empty"));
    }

    #[test]
    fn test_configured_defaults_are_applied() {
        let config = PipelineConfig {
            default_domain: 2,
            default_module: "9".to_string(),
            ..PipelineConfig::default()
        };
        let reporter = MemoryReporter::new();
        let records = TextBlockParser::new(&config, &reporter).parse(COMPLETE_BLOCK, "x");

        assert_eq!(records[0].domain, 2);
        assert_eq!(records[0].module, "9");
    }

    #[test]
    fn test_parse_file_missing_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();
        let reporter = MemoryReporter::new();

        let records =
            TextBlockParser::new(&config, &reporter).parse_file(&dir.path().join("none.txt"));

        assert!(records.is_empty());
        assert_eq!(reporter.count(Severity::Error), 1);
        assert!(reporter.contains("not found"));
    }

    #[test]
    fn test_parse_file_reads_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.txt");
        std::fs::write(&path, COMPLETE_BLOCK.replace("scope creep", "スコープ")).unwrap();

        let config = PipelineConfig::default();
        let reporter = MemoryReporter::new();
        let records = TextBlockParser::new(&config, &reporter).parse_file(&path);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "What is スコープ?");
    }

    #[test]
    fn test_parse_file_invalid_utf8_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let config = PipelineConfig::default();
        let reporter = MemoryReporter::new();
        let records = TextBlockParser::new(&config, &reporter).parse_file(&path);

        assert!(records.is_empty());
        assert!(reporter.contains("Error parsing"));
    }

    #[test]
    fn test_parse_file_over_size_limit_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.txt");
        std::fs::write(&path, COMPLETE_BLOCK).unwrap();

        let config = PipelineConfig {
            security: SecurityConfig {
                max_input_file_size: 4,
                ..SecurityConfig::default()
            },
            ..PipelineConfig::default()
        };
        let reporter = MemoryReporter::new();
        let parser = TextBlockParser::new(&config, &reporter);

        assert!(parser.parse_file(&path).is_empty());
        assert!(reporter
            .events()
            .iter()
            .any(|e| e.severity == Severity::Error && e.message.starts_with("Error parsing")));
        assert!(matches!(
            parser.try_parse_file(&path),
            Err(QuizSheetError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_try_parse_file_empty_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.txt");
        std::fs::write(&path, "  \n\n").unwrap();

        let config = PipelineConfig::default();
        let reporter = MemoryReporter::new();
        let parser = TextBlockParser::new(&config, &reporter);

        assert!(matches!(
            parser.try_parse_file(&path),
            Err(QuizSheetError::SourceEmpty(_))
        ));
        assert!(parser.parse_file(&path).is_empty());
        assert!(reporter.contains("questions.txt is empty"));
    }
}
