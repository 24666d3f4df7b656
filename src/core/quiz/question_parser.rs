// Question-block parser.
//
// Turns pasted quiz text into validated questions. This file has NO I/O and no
// remote types, so the CLI can validate a batch offline (`check-quiz`) and the
// quiz builder can reject a bad batch before it creates anything remotely.
//
// Input format:
//
// ```text
// P1: Why is safety important?
// A) Reason one
// B) Reason two
// G: B
// ```

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

// ============================================================================
// MODELS
// ============================================================================

/// One multiple-choice question, ready to be added to a quiz form.
///
/// Fields are private so a `Question` can only come out of the parser with its
/// invariants already checked: at least two choices and an in-range answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    title: String,
    choices: Vec<String>,
    /// Lowercase key of each choice as typed, parallel to `choices`.
    keys: Vec<char>,
    correct_index: usize,
}

impl Question {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn choice_keys(&self) -> &[char] {
        &self.keys
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    /// Text of the graded correct answer.
    pub fn correct_choice(&self) -> &str {
        &self.choices[self.correct_index]
    }
}

/// Non-fatal things the operator probably wants to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A block declared `G:` more than once; the last one was used.
    RepeatedAnswerKey {
        question: String,
        previous: char,
        current: char,
    },
    /// A non-blank line that is neither an alternative nor an answer key.
    /// `question` is `None` for text that appears before the first marker.
    UnrecognizedLine {
        question: Option<String>,
        line: String,
    },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::RepeatedAnswerKey {
                question,
                previous,
                current,
            } => write!(
                f,
                "answer key declared more than once ('{}' then '{}'), using '{}' -> {}",
                previous.to_ascii_uppercase(),
                current.to_ascii_uppercase(),
                current.to_ascii_uppercase(),
                question
            ),
            ParseWarning::UnrecognizedLine {
                question: Some(question),
                line,
            } => write!(f, "ignored line \"{}\" in -> {}", line, question),
            ParseWarning::UnrecognizedLine {
                question: None,
                line,
            } => write!(f, "ignored line \"{}\" before the first question", line),
        }
    }
}

/// Successful parse: the questions plus any warnings collected on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuiz {
    pub questions: Vec<Question>,
    pub warnings: Vec<ParseWarning>,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Every failure aborts the whole batch. Per-question failures carry the
/// question title so the operator can find and fix it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no question text was provided")]
    EmptyInput,

    #[error("no question blocks found (expected lines like P1:, P2:, ...)")]
    NoQuestionBlocks,

    #[error("question has fewer than 2 alternatives -> {title}")]
    InsufficientChoices { title: String },

    #[error("question has no answer key (line 'G: X') -> {title}")]
    MissingAnswerKey { title: String },

    #[error("answer key '{}' does not match any alternative in -> {title}", .expected.to_ascii_uppercase())]
    AnswerKeyMismatch { expected: char, title: String },

    #[error("could not build any question from the text")]
    NoValidQuestions,
}

// ============================================================================
// LINE PATTERNS
// ============================================================================

fn block_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^P\d*:").expect("Invalid block start regex"))
}

fn alternative_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([A-Z])\)\s*(.+)$").expect("Invalid alternative regex"))
}

fn answer_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^G:\s*([A-Z])").expect("Invalid answer key regex"))
}

/// What a single trimmed line inside a block turned out to be.
enum BlockLine<'a> {
    Alternative { key: char, text: &'a str },
    AnswerKey(char),
    Other,
}

fn classify(line: &str) -> BlockLine<'_> {
    if let Some(caps) = alternative_regex().captures(line) {
        let key = first_char_lower(&caps[1]);
        let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        return BlockLine::Alternative { key, text };
    }
    if let Some(caps) = answer_key_regex().captures(line) {
        return BlockLine::AnswerKey(first_char_lower(&caps[1]));
    }
    BlockLine::Other
}

fn first_char_lower(s: &str) -> char {
    s.chars().next().map(|c| c.to_ascii_lowercase()).unwrap_or_default()
}

// ============================================================================
// PARSER
// ============================================================================

/// Parses pasted question text, discarding warnings.
pub fn parse_questions(input: &str) -> Result<Vec<Question>, ParseError> {
    parse_questions_with_warnings(input).map(|parsed| parsed.questions)
}

/// Parses pasted question text and keeps the warnings.
///
/// Single pass over the lines: split into blocks at every `P<n>:` marker, then
/// validate each block in order. The first invalid block fails the batch.
pub fn parse_questions_with_warnings(input: &str) -> Result<ParsedQuiz, ParseError> {
    let text = input.trim_matches(|c| c == '\n' || c == '\r');
    if text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut warnings = Vec::new();
    let blocks = split_blocks(text, &mut warnings)?;

    let mut questions = Vec::with_capacity(blocks.len());
    for block in blocks {
        if let Some(question) = build_question(&block, &mut warnings)? {
            questions.push(question);
        }
    }

    if questions.is_empty() {
        return Err(ParseError::NoValidQuestions);
    }

    Ok(ParsedQuiz {
        questions,
        warnings,
    })
}

/// Splits the input into question blocks. Lines before the first marker are
/// not part of any block.
fn split_blocks<'a>(
    text: &'a str,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Vec<Vec<&'a str>>, ParseError> {
    let mut blocks: Vec<Vec<&'a str>> = Vec::new();
    let mut current: Option<Vec<&'a str>> = None;

    for raw in text.lines() {
        let line = raw.trim();

        if block_start_regex().is_match(line) {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            let mut block = Vec::new();
            // Everything after the first colon is the start of the question text.
            if let Some((_, rest)) = line.split_once(':') {
                let rest = rest.trim();
                if !rest.is_empty() {
                    block.push(rest);
                }
            }
            current = Some(block);
            continue;
        }

        match current.as_mut() {
            Some(block) => block.push(line),
            None if !line.is_empty() => warnings.push(ParseWarning::UnrecognizedLine {
                question: None,
                line: line.to_string(),
            }),
            None => {}
        }
    }

    if let Some(block) = current {
        blocks.push(block);
    }

    if blocks.is_empty() {
        return Err(ParseError::NoQuestionBlocks);
    }

    Ok(blocks)
}

/// Validates one block. Returns `Ok(None)` for a block with no content at all
/// (e.g. `P1:` directly followed by `P2:`).
fn build_question(
    block: &[&str],
    warnings: &mut Vec<ParseWarning>,
) -> Result<Option<Question>, ParseError> {
    let mut lines = block.iter().copied().filter(|l| !l.is_empty());

    let Some(title) = lines.next() else {
        return Ok(None);
    };
    let title = title.to_string();

    let mut keys: Vec<char> = Vec::new();
    let mut choices: Vec<String> = Vec::new();
    let mut answer: Option<char> = None;

    for line in lines {
        match classify(line) {
            BlockLine::Alternative { key, text } => {
                keys.push(key);
                choices.push(text.to_string());
            }
            BlockLine::AnswerKey(key) => {
                if let Some(previous) = answer {
                    warnings.push(ParseWarning::RepeatedAnswerKey {
                        question: title.clone(),
                        previous,
                        current: key,
                    });
                }
                answer = Some(key);
            }
            BlockLine::Other => warnings.push(ParseWarning::UnrecognizedLine {
                question: Some(title.clone()),
                line: line.to_string(),
            }),
        }
    }

    if choices.len() < 2 {
        return Err(ParseError::InsufficientChoices { title });
    }

    let Some(expected) = answer else {
        return Err(ParseError::MissingAnswerKey { title });
    };

    let Some(correct_index) = keys.iter().position(|k| *k == expected) else {
        return Err(ParseError::AnswerKeyMismatch { expected, title });
    };

    Ok(Some(Question {
        title,
        choices,
        keys,
        correct_index,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFETY: &str = "P1: Why is safety important?\nA) Reason one\nB) Reason two\nG: B";

    #[test]
    fn test_single_question() {
        let questions = parse_questions(SAFETY).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].title(), "Why is safety important?");
        assert_eq!(questions[0].choices(), ["Reason one", "Reason two"]);
        assert_eq!(questions[0].correct_index(), 1);
        assert_eq!(questions[0].correct_choice(), "Reason two");
        assert_eq!(questions[0].choice_keys(), ['a', 'b']);
    }

    #[test]
    fn test_keys_follow_the_text() {
        let questions = parse_questions("P1: Pick
A) x
c) y
G: C").unwrap();
        assert_eq!(questions[0].choice_keys(), ['a', 'c']);
        assert_eq!(questions[0].correct_index(), 1);
    }

    #[test]
    fn test_two_blocks_keep_order() {
        let input = "P1: First?\nA) a1\nB) b1\nG: A\n\nP2: Second?\nA) a2\nB) b2\nC) c2\nG: C\n";
        let questions = parse_questions(input).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].title(), "First?");
        assert_eq!(questions[1].title(), "Second?");
        assert_eq!(questions[1].choices(), ["a2", "b2", "c2"]);
        assert_eq!(questions[1].correct_choice(), "c2");
    }

    #[test]
    fn test_single_alternative_fails() {
        let err = parse_questions("P1: Q\nA) only one\nG: A").unwrap_err();
        assert_eq!(
            err,
            ParseError::InsufficientChoices {
                title: "Q".to_string()
            }
        );
    }

    #[test]
    fn test_missing_answer_key_fails() {
        let err = parse_questions("P1: Q\nA) x\nB) y").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingAnswerKey {
                title: "Q".to_string()
            }
        );
    }

    #[test]
    fn test_mismatched_answer_key_fails() {
        let err = parse_questions("P1: Q\nA) x\nB) y\nG: C").unwrap_err();
        assert_eq!(
            err,
            ParseError::AnswerKeyMismatch {
                expected: 'c',
                title: "Q".to_string()
            }
        );
        assert!(err.to_string().contains("'C'"));
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(parse_questions("").unwrap_err(), ParseError::EmptyInput);
        assert_eq!(
            parse_questions("   \n\n  \t\n").unwrap_err(),
            ParseError::EmptyInput
        );
    }

    #[test]
    fn test_no_markers_fails() {
        let err = parse_questions("Just some text\nA) x\nB) y\nG: A").unwrap_err();
        assert_eq!(err, ParseError::NoQuestionBlocks);
    }

    #[test]
    fn test_only_empty_blocks_fails() {
        let err = parse_questions("P1:\nP2:\n").unwrap_err();
        assert_eq!(err, ParseError::NoValidQuestions);
    }

    #[test]
    fn test_one_bad_block_fails_whole_batch() {
        let input = "P1: Good\nA) x\nB) y\nG: A\nP2: Bad\nA) x\nG: A";
        let err = parse_questions(input).unwrap_err();
        assert_eq!(
            err,
            ParseError::InsufficientChoices {
                title: "Bad".to_string()
            }
        );
    }

    #[test]
    fn test_case_invariance() {
        let upper = parse_questions("P1: Q\nA) x\nB) y\nG: B").unwrap();
        let lower = parse_questions("p1: Q\na) x\nb) y\ng: b").unwrap();
        let mixed = parse_questions("p1: Q\nA) x\nb) y\nG: b").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper, mixed);
    }

    #[test]
    fn test_idempotent() {
        let input = "P1: First?\nA) a\nB) b\nG: A\nP2: Second?\nA) c\nB) d\nG: B";
        assert_eq!(parse_questions(input), parse_questions(input));
    }

    #[test]
    fn test_title_on_following_line() {
        let questions = parse_questions("P1:\n\nWhat is PPE?\nA) Gear\nB) Food\nG: A").unwrap();
        assert_eq!(questions[0].title(), "What is PPE?");
    }

    #[test]
    fn test_bare_marker_and_explanatory_text() {
        let input = "P: Which one?\nRead carefully before answering.\nA) first\n\nB) second\nG: a";
        let parsed = parse_questions_with_warnings(input).unwrap();
        assert_eq!(parsed.questions[0].choices(), ["first", "second"]);
        assert_eq!(parsed.questions[0].correct_index(), 0);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::UnrecognizedLine {
                question: Some("Which one?".to_string()),
                line: "Read carefully before answering.".to_string(),
            }]
        );
    }

    #[test]
    fn test_alternative_without_space_after_paren() {
        let questions = parse_questions("P1: Q\nA)x\nB)   y  \nG:B").unwrap();
        assert_eq!(questions[0].choices(), ["x", "y"]);
        assert_eq!(questions[0].correct_index(), 1);
    }

    #[test]
    fn test_malformed_alternative_is_warned_not_parsed() {
        let input = "P1: Q\nA) x\nB y\nC) z\nG: C";
        let parsed = parse_questions_with_warnings(input).unwrap();
        assert_eq!(parsed.questions[0].choices(), ["x", "z"]);
        assert_eq!(parsed.questions[0].correct_index(), 1);
        assert_eq!(parsed.warnings.len(), 1);
    }

    #[test]
    fn test_repeated_answer_key_last_wins() {
        let parsed = parse_questions_with_warnings("P1: Q\nA) x\nB) y\nG: A\nG: B").unwrap();
        assert_eq!(parsed.questions[0].correct_index(), 1);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::RepeatedAnswerKey {
                question: "Q".to_string(),
                previous: 'a',
                current: 'b',
            }]
        );
    }

    #[test]
    fn test_preamble_is_ignored_with_warning() {
        let input = "Quiz for week 3\n\nP1: Q\nA) x\nB) y\nG: A";
        let parsed = parse_questions_with_warnings(input).unwrap();
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::UnrecognizedLine {
                question: None,
                line: "Quiz for week 3".to_string(),
            }]
        );
    }

    #[test]
    fn test_duplicate_letter_answers_first() {
        let questions = parse_questions("P1: Q\nA) x\nB) y\nA) z\nG: A").unwrap();
        assert_eq!(questions[0].choices().len(), 3);
        assert_eq!(questions[0].correct_index(), 0);
    }

    #[test]
    fn test_windows_line_endings() {
        let questions = parse_questions("P1: Q\r\nA) x\r\nB) y\r\nG: B\r\n").unwrap();
        assert_eq!(questions[0].choices(), ["x", "y"]);
        assert_eq!(questions[0].correct_index(), 1);
    }

    #[test]
    fn test_correct_choice_matches_declared_letter() {
        let input = "P1: Q\nA) alpha\nB) beta\nC) gamma\nD) delta\nG: d";
        let questions = parse_questions(input).unwrap();
        assert_eq!(questions[0].correct_choice(), "delta");
    }
}
