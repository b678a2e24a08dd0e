//! Tokenizer errors.

use super::error_code::{self, DangleErrorCode};

/// Errors raised while turning source text into a linked token list.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{file}:{line}: unterminated {what} literal")]
    UnterminatedLiteral {
        file: String,
        line: u32,
        what: &'static str,
    },

    #[error("{file}:{line}: unterminated block comment")]
    UnterminatedComment { file: String, line: u32 },

    #[error("{file}:{line}: '{open}' is never closed")]
    UnbalancedBracket { file: String, line: u32, open: String },

    #[error("{file}:{line}: unexpected '{close}'")]
    UnexpectedCloser {
        file: String,
        line: u32,
        close: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DangleErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::IO_ERROR,
            _ => error_code::PARSE_ERROR,
        }
    }
}
