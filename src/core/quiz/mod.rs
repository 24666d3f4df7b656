pub mod question_parser;
pub mod quiz_ports;
pub mod quiz_service;

pub use question_parser::{
    parse_questions, parse_questions_with_warnings, ParseError, ParseWarning, ParsedQuiz,
    Question,
};
pub use quiz_ports::{FileStorage, FormHandle, QuizForms};
pub use quiz_service::{QuizError, QuizPublication, QuizRequest, QuizService};
