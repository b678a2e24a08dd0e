//! Token model and the C/C++ tokenizer that produces it.

pub mod lexer;
pub mod token;

pub use lexer::tokenize;
pub use token::{Token, TokenKind, TokenList};
