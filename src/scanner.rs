//! Tokenizer for the command language.
//!
//! Most tokens are single characters. Delimited strings (`/re/`, `a/text/`,
//! `s/re/text/`) are handled by a small state machine: the token before the
//! opening delimiter decides how many strings follow it.

use winnow::ModalResult;
use winnow::ascii::digit1;
use winnow::prelude::*;

use crate::error::{Error, Errors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Hash,
    Plus,
    Minus,
    Comma,
    Semicolon,
    Dollar,
    Dot,
    /// `'` - mark address, scanned but not supported
    Mark,
    /// `/` or `?`
    Delimiter(char),
    /// The contents of a delimited string, escapes resolved
    Text,
    Number,
    /// One of `x y z g v n`
    Operation(char),
    /// One of `p d a c i s =`
    Command(char),
    OpenBrace,
    CloseBrace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 0-based character offset in the command.
    pub pos: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            pos,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InDelimitedText { delim: char, remaining: usize },
    AtFinalDelimiter { delim: char, remaining: usize },
}

/// How many delimited strings follow a delimiter seen after `prev`.
fn strings_after(prev: Option<TokenKind>) -> usize {
    match prev {
        Some(TokenKind::Operation('n')) => 2,
        Some(TokenKind::Operation(_)) => 1,
        Some(TokenKind::Command('s')) => 2,
        Some(TokenKind::Command(_)) => 1,
        // a bare regex address
        _ => 1,
    }
}

/// Scan a command into tokens, collecting every error on the way.
pub fn scan(input: &str) -> (Vec<Token>, Errors) {
    let mut scanner = Scanner {
        rest: input,
        pos: 0,
        state: State::Normal,
        tokens: Vec::new(),
        errors: Errors::new(),
    };
    scanner.run();
    (scanner.tokens, scanner.errors)
}

struct Scanner<'s> {
    rest: &'s str,
    pos: usize,
    state: State,
    tokens: Vec<Token>,
    errors: Errors,
}

impl<'s> Scanner<'s> {
    fn run(&mut self) {
        while !self.rest.is_empty() {
            match self.state {
                State::Normal => self.normal(),
                State::InDelimitedText { delim, remaining } => {
                    self.delimited_text(delim, remaining)
                }
                State::AtFinalDelimiter { delim, remaining } => {
                    self.emit(TokenKind::Delimiter(delim), delim.to_string());
                    self.advance(delim.len_utf8());
                    self.state = if remaining > 1 {
                        State::InDelimitedText {
                            delim,
                            remaining: remaining - 1,
                        }
                    } else {
                        State::Normal
                    };
                }
            }
        }
    }

    fn advance(&mut self, bytes: usize) {
        self.pos += self.rest[..bytes].chars().count();
        self.rest = &self.rest[bytes..];
    }

    fn emit(&mut self, kind: TokenKind, text: impl Into<String>) {
        self.tokens.push(Token::new(kind, text, self.pos));
    }

    fn normal(&mut self) {
        let Some(c) = self.rest.chars().next() else {
            return;
        };
        if c.is_whitespace() {
            self.advance(c.len_utf8());
            return;
        }
        if c.is_ascii_digit() {
            self.number();
            return;
        }
        let kind = match c {
            '#' => TokenKind::Hash,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '$' => TokenKind::Dollar,
            '.' => TokenKind::Dot,
            '\'' => TokenKind::Mark,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            '/' | '?' => {
                let remaining = strings_after(self.tokens.last().map(|t| t.kind));
                self.emit(TokenKind::Delimiter(c), c.to_string());
                self.advance(1);
                self.state = State::InDelimitedText {
                    delim: c,
                    remaining,
                };
                return;
            }
            'x' | 'y' | 'z' | 'g' | 'v' | 'n' => TokenKind::Operation(c),
            'p' | 'd' | 'a' | 'c' | 'i' | 's' | '=' => TokenKind::Command(c),
            _ => {
                self.errors.push(Error::syntax(
                    format!("unexpected character '{}'", c),
                    self.pos,
                ));
                self.advance(c.len_utf8());
                return;
            }
        };
        self.emit(kind, c.to_string());
        self.advance(c.len_utf8());

        if kind == TokenKind::Hash && !self.rest.starts_with(|c: char| c.is_ascii_digit()) {
            self.errors
                .push(Error::syntax("expected a number after '#'", self.pos));
        }
    }

    fn number(&mut self) {
        let mut probe = self.rest;
        match digits(&mut probe) {
            Ok(text) => {
                self.emit(TokenKind::Number, text);
                self.advance(text.len());
            }
            Err(_) => {
                self.errors.push(Error::syntax("expected a number", self.pos));
                let skip = self.rest.chars().next().map_or(0, char::len_utf8);
                self.advance(skip);
            }
        }
    }

    /// Consume raw text up to the next unescaped `delim`.
    fn delimited_text(&mut self, delim: char, remaining: usize) {
        let mut text = String::new();
        let mut consumed = self.rest.len();
        let mut chars = self.rest.char_indices();
        while let Some((i, c)) = chars.next() {
            if c == delim {
                consumed = i;
                break;
            }
            if c != '\\' {
                text.push(c);
                continue;
            }
            match chars.next() {
                Some((_, next)) if next == delim || next == '\\' => text.push(next),
                Some((_, next)) => {
                    text.push('\\');
                    text.push(next);
                }
                None => text.push('\\'),
            }
        }
        self.emit(TokenKind::Text, text);
        self.advance(consumed);
        self.state = if self.rest.is_empty() {
            State::Normal
        } else {
            State::AtFinalDelimiter { delim, remaining }
        };
    }
}

fn digits<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    digit1.parse_next(input)
}
