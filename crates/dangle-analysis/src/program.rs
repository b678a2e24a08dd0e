//! A parsed translation unit: tokens plus the symbols resolved over them.

use dangle_core::errors::ParseError;

use crate::symbols::SymbolDatabase;
use crate::tokens::{tokenize, TokenList};

#[derive(Debug)]
pub struct Program {
    pub tokens: TokenList,
    pub symbols: SymbolDatabase,
}

impl Program {
    /// Tokenize `source` and build its symbol database.
    pub fn parse(file_name: &str, source: &str) -> Result<Self, ParseError> {
        let mut tokens = tokenize(file_name, source)?;
        let symbols = SymbolDatabase::build(&mut tokens);
        Ok(Self { tokens, symbols })
    }
}
