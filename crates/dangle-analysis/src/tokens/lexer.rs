//! C/C++ tokenizer.
//!
//! Produces the flat, linked token list the checks walk. Comments and
//! preprocessor lines are dropped, `->` is normalized to `.`, and
//! `()`, `[]`, `{}` pairs are linked.

use dangle_core::errors::ParseError;

use super::token::{Token, TokenKind, TokenList};

const THREE_CHAR_OPS: &[&str] = &["<<=", ">>=", "...", "->*"];

const TWO_CHAR_OPS: &[&str] = &[
    "::", "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", ".*", "##",
];

/// Tokenize `source` into a linked token list.
pub fn tokenize(file_name: &str, source: &str) -> Result<TokenList, ParseError> {
    let mut lexer = Lexer::new(file_name, source);
    lexer.run()?;
    let mut list = lexer.list;
    link_brackets(&mut list)?;
    tracing::trace!(file = file_name, tokens = list.len(), "tokenized");
    Ok(list)
}

struct Lexer<'s> {
    file: &'s str,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    at_line_start: bool,
    list: TokenList,
}

impl<'s> Lexer<'s> {
    fn new(file: &'s str, source: &'s str) -> Self {
        Self {
            file,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
            list: TokenList::new(file),
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
            self.at_line_start = true;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek(0) {
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            if c == '/' && self.peek(1) == Some('/') {
                self.skip_line();
                continue;
            }
            if c == '/' && self.peek(1) == Some('*') {
                self.skip_block_comment()?;
                continue;
            }
            if c == '#' && self.at_line_start {
                self.skip_directive();
                continue;
            }
            self.at_line_start = false;

            let (line, column) = (self.line, self.column);
            if c.is_ascii_alphabetic() || c == '_' {
                let text = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                // String prefixes such as L"..." and u8"..." belong to the literal.
                if matches!(self.peek(0), Some('"') | Some('\''))
                    && matches!(text.as_str(), "L" | "u" | "U" | "u8")
                {
                    let quote = self.peek(0).unwrap_or('"');
                    let body = self.take_quoted(quote, line)?;
                    let kind = if quote == '"' { TokenKind::StringLit } else { TokenKind::CharLit };
                    self.list.push(Token::new(text + &body, kind, line, column));
                } else {
                    self.list.push(Token::new(text, TokenKind::Name, line, column));
                }
            } else if c.is_ascii_digit() || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) {
                let text = self.take_number();
                self.list.push(Token::new(text, TokenKind::Number, line, column));
            } else if c == '"' {
                let text = self.take_quoted('"', line)?;
                self.list.push(Token::new(text, TokenKind::StringLit, line, column));
            } else if c == '\'' {
                let text = self.take_quoted('\'', line)?;
                self.list.push(Token::new(text, TokenKind::CharLit, line, column));
            } else {
                let op = self.take_operator();
                let text = if op == "->" { ".".to_string() } else { op };
                self.list.push(Token::new(text, TokenKind::Op, line, column));
            }
        }
        Ok(())
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek(0) {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn take_number(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek(0) {
            let exponent_sign = (c == '+' || c == '-')
                && matches!(out.chars().last(), Some('e' | 'E' | 'p' | 'P'))
                && !out.starts_with("0x")
                && !out.starts_with("0X");
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '\'' || exponent_sign {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    fn take_quoted(&mut self, quote: char, line: u32) -> Result<String, ParseError> {
        let mut out = String::new();
        if let Some(open) = self.bump() {
            out.push(open);
        }
        loop {
            match self.bump() {
                Some('\\') => {
                    out.push('\\');
                    if let Some(escaped) = self.bump() {
                        out.push(escaped);
                    }
                }
                Some(c) if c == quote => {
                    out.push(c);
                    return Ok(out);
                }
                Some('\n') | None => {
                    return Err(ParseError::UnterminatedLiteral {
                        file: self.file.to_string(),
                        line,
                        what: if quote == '"' { "string" } else { "character" },
                    });
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn take_operator(&mut self) -> String {
        for ops in [THREE_CHAR_OPS, TWO_CHAR_OPS] {
            for op in ops {
                let len = op.len();
                let matches = op
                    .chars()
                    .enumerate()
                    .all(|(i, oc)| self.peek(i) == Some(oc));
                if matches {
                    for _ in 0..len {
                        self.bump();
                    }
                    return (*op).to_string();
                }
            }
        }
        self.bump().map(String::from).unwrap_or_default()
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        let at_line_start = self.at_line_start;
        self.bump();
        self.bump();
        loop {
            match self.peek(0) {
                Some('*') if self.peek(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    // A comment does not end the "start of line" state for directives.
                    if at_line_start {
                        self.at_line_start = true;
                    }
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
                None => {
                    return Err(ParseError::UnterminatedComment {
                        file: self.file.to_string(),
                        line,
                    })
                }
            }
        }
    }

    /// Skip a preprocessor directive, honouring backslash line continuations.
    fn skip_directive(&mut self) {
        while let Some(c) = self.peek(0) {
            if c == '\\' && self.peek(1) == Some('\n') {
                self.bump();
                self.bump();
                continue;
            }
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }
}

fn closer_for(open: &str) -> Option<&'static str> {
    match open {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" => Some("}"),
        _ => None,
    }
}

fn link_brackets(list: &mut TokenList) -> Result<(), ParseError> {
    let mut stack: Vec<usize> = Vec::new();
    for i in 0..list.len() {
        let text = list.text(i);
        if closer_for(text).is_some() {
            stack.push(i);
            continue;
        }
        if !matches!(text, ")" | "]" | "}") {
            continue;
        }
        let expected = stack.pop().and_then(|open| {
            (closer_for(list.text(open)) == Some(text)).then_some(open)
        });
        match expected {
            Some(open) => list.set_link(open, i),
            None => {
                let line = list.get(i).map_or(0, |t| t.line);
                return Err(ParseError::UnexpectedCloser {
                    file: list.file_name().to_string(),
                    line,
                    close: text.to_string(),
                });
            }
        }
    }
    if let Some(open) = stack.pop() {
        let token = list.get(open);
        return Err(ParseError::UnbalancedBracket {
            file: list.file_name().to_string(),
            line: token.map_or(0, |t| t.line),
            open: token.map_or_else(String::new, |t| t.text.clone()),
        });
    }
    Ok(())
}
