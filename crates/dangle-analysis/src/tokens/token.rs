//! Linked token arena.
//!
//! Tokens are created once by the tokenizer, annotated with variable ids by
//! the symbol database builder, and read-only afterwards. Bracket tokens
//! carry the index of their matching counterpart.

use dangle_core::types::{FileId, TokenId, VarId};
use dangle_core::Location;
use lasso::Rodeo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    Number,
    StringLit,
    CharLit,
    Op,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
    pub var_id: Option<VarId>,
    pub link: Option<TokenId>,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, line: u32, column: u32) -> Self {
        Self {
            text: text.into(),
            kind,
            line,
            column,
            var_id: None,
            link: None,
        }
    }

    pub fn is_name(&self) -> bool {
        self.kind == TokenKind::Name
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

/// Ordered token sequence for one source file.
#[derive(Debug)]
pub struct TokenList {
    tokens: Vec<Token>,
    files: Rodeo,
    file: FileId,
}

impl TokenList {
    pub fn new(file_name: &str) -> Self {
        let mut files = Rodeo::default();
        let file = FileId::new(files.get_or_intern(file_name));
        Self {
            tokens: Vec::new(),
            files,
            file,
        }
    }

    pub fn push(&mut self, token: Token) -> TokenId {
        self.tokens.push(token);
        TokenId::new(self.tokens.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.index())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Text of the token at `index`, or `""` past either end.
    pub fn text(&self, index: usize) -> &str {
        self.tokens.get(index).map_or("", |t| t.text.as_str())
    }

    /// Text of the token `offset` positions away from `index`.
    pub fn text_at(&self, index: usize, offset: isize) -> &str {
        match index.checked_add_signed(offset) {
            Some(i) => self.text(i),
            None => "",
        }
    }

    pub fn var_id(&self, index: usize) -> Option<VarId> {
        self.tokens.get(index).and_then(|t| t.var_id)
    }

    /// Index of the bracket matching the one at `index`.
    pub fn link_of(&self, index: usize) -> Option<usize> {
        self.tokens
            .get(index)
            .and_then(|t| t.link)
            .map(TokenId::index)
    }

    pub fn file_name(&self) -> &str {
        self.files.resolve(&self.file.inner())
    }

    pub fn location(&self, index: usize) -> Location {
        let (line, column) = self
            .tokens
            .get(index)
            .map_or((0, 0), |t| (t.line, t.column));
        Location {
            file: self.file_name().to_string(),
            line,
            column,
        }
    }

    pub(crate) fn set_link(&mut self, open: usize, close: usize) {
        self.tokens[open].link = Some(TokenId::new(close));
        self.tokens[close].link = Some(TokenId::new(open));
    }

    pub(crate) fn set_var_id(&mut self, index: usize, id: VarId) {
        if let Some(t) = self.tokens.get_mut(index) {
            t.var_id = Some(id);
        }
    }

    /// Space-separated token texts, handy for debugging and tests.
    pub fn stringify(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
