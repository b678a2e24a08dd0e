//! Pattern compilation and evaluation.

use dangle_core::types::collections::SmallVec8;
use smallvec::SmallVec;

use crate::tokens::{Token, TokenKind, TokenList};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Atom {
    Literal(String),
    AnyName,
    Type,
    Any,
    Number,
    Str,
    OneOf(SmallVec<[char; 4]>),
}

impl Atom {
    fn parse(word: &str) -> Self {
        match word {
            "%var%" => Self::AnyName,
            "%type%" => Self::Type,
            "%any%" => Self::Any,
            "%num%" => Self::Number,
            "%str%" => Self::Str,
            _ if word.len() > 2 && word.starts_with('[') && word.ends_with(']') => {
                Self::OneOf(word[1..word.len() - 1].chars().collect())
            }
            _ => Self::Literal(word.to_string()),
        }
    }

    fn matches(&self, token: &Token) -> bool {
        match self {
            Self::Literal(text) => token.text == *text,
            Self::AnyName => token.is_name(),
            Self::Type => token.is_name() && token.var_id.is_none() && token.text != "delete",
            Self::Any => true,
            Self::Number => token.kind == TokenKind::Number,
            Self::Str => token.kind == TokenKind::StringLit,
            Self::OneOf(chars) => {
                let mut it = token.text.chars();
                matches!((it.next(), it.next()), (Some(c), None) if chars.contains(&c))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Element {
    Alternatives {
        atoms: SmallVec<[Atom; 2]>,
        optional: bool,
    },
    Not(String),
}

impl Element {
    fn parse(word: &str) -> Self {
        if let Some(rest) = word.strip_prefix("!!") {
            return Self::Not(rest.to_string());
        }
        // `|` and `||` are operators, not alternation.
        if word == "|" || word == "||" || !word.contains('|') {
            return Self::Alternatives {
                atoms: SmallVec::from_elem(Atom::parse(word), 1),
                optional: false,
            };
        }
        let mut atoms = SmallVec::new();
        let mut optional = false;
        for alt in word.split('|') {
            if alt.is_empty() {
                optional = true;
            } else {
                atoms.push(Atom::parse(alt));
            }
        }
        Self::Alternatives { atoms, optional }
    }
}

/// A compiled token pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    elements: SmallVec8<Element>,
}

/// Positions of the tokens consumed by a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures {
    /// Token index per pattern element; `None` for a skipped optional
    /// element or a `!!` element that hit the end of the list.
    positions: SmallVec8<Option<usize>>,
    start: usize,
    end: usize,
}

impl Captures {
    /// Index of the token matched by element `n`.
    pub fn get(&self, n: usize) -> Option<usize> {
        self.positions.get(n).copied().flatten()
    }

    /// Index of the first matched token.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last consumed token.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of tokens consumed.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl Pattern {
    /// Compile a whitespace-separated pattern.
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            elements: source.split_whitespace().map(Element::parse).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match the pattern against the tokens starting at `start`.
    pub fn match_at(&self, tokens: &TokenList, start: usize) -> Option<Captures> {
        let mut positions = SmallVec8::new();
        let mut pos = start;
        for element in &self.elements {
            let token = tokens.get(pos);
            match element {
                Element::Not(text) => match token {
                    None => positions.push(None),
                    Some(t) if t.text == *text => return None,
                    Some(_) => {
                        positions.push(Some(pos));
                        pos += 1;
                    }
                },
                Element::Alternatives { atoms, optional } => {
                    let hit = token.is_some_and(|t| atoms.iter().any(|a| a.matches(t)));
                    if hit {
                        positions.push(Some(pos));
                        pos += 1;
                    } else if *optional {
                        positions.push(None);
                    } else {
                        return None;
                    }
                }
            }
        }
        Some(Captures {
            positions,
            start,
            end: pos,
        })
    }

    /// Whether the pattern matches at `start`.
    pub fn is_match(&self, tokens: &TokenList, start: usize) -> bool {
        self.match_at(tokens, start).is_some()
    }
}
