//! Tokenizer for regex patterns.
//!
//! Multi-character constructs (escapes, classes, group openers, counted
//! repetitions) become single tokens so that reordering tokens never splits
//! one apart.

use winnow::ModalResult;
use winnow::ascii::digit1;
use winnow::combinator::{alt, opt, repeat};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_till, take_until, take_while};

use super::ast::{FlagSet, Token, TokenKind};
use crate::error::{Error, Errors};

/// Scan a pattern into tokens, collecting every error.
pub fn scan(pattern: &str) -> (Vec<Token>, Errors) {
    let mut scanner = Scanner {
        rest: pattern,
        pos: 0,
        tokens: Vec::new(),
        errors: Errors::new(),
    };
    while !scanner.rest.is_empty() {
        scanner.token();
    }
    (scanner.tokens, scanner.errors)
}

struct Scanner<'s> {
    rest: &'s str,
    pos: usize,
    tokens: Vec<Token>,
    errors: Errors,
}

impl<'s> Scanner<'s> {
    fn emit(&mut self, kind: TokenKind, bytes: usize) {
        let text = &self.rest[..bytes];
        self.tokens.push(Token::new(kind, text, self.pos));
        self.pos += text.chars().count();
        self.rest = &self.rest[bytes..];
    }

    /// Run `parser` on the remaining input without consuming it.
    fn probe(&self, parser: fn(&mut &'s str) -> ModalResult<&'s str>) -> Option<usize> {
        let mut input = self.rest;
        parser(&mut input).ok().map(str::len)
    }

    fn token(&mut self) {
        let Some(c) = self.rest.chars().next() else {
            return;
        };
        match c {
            '\\' => self.escape(),
            '[' => self.class(),
            '.' => self.emit(TokenKind::Class, 1),
            '^' | '$' => self.emit(TokenKind::Anchor, 1),
            '(' => self.group_open(),
            ')' => self.emit(TokenKind::CloseGroup, 1),
            '|' => self.emit(TokenKind::Alternation, 1),
            '*' | '+' | '?' => {
                let lazy = self.rest[1..].starts_with('?');
                self.emit(TokenKind::Repetition, if lazy { 2 } else { 1 });
            }
            '{' => match self.probe(counted_repetition) {
                Some(len) => self.emit(TokenKind::Repetition, len),
                None => self.emit(TokenKind::Literal, 1),
            },
            _ => self.emit(TokenKind::Literal, c.len_utf8()),
        }
    }

    fn escape(&mut self) {
        let Some(c) = self.rest[1..].chars().next() else {
            self.errors
                .push(Error::syntax("trailing backslash", self.pos));
            self.emit(TokenKind::Literal, 1);
            return;
        };
        match c {
            'd' | 'D' | 's' | 'S' | 'w' | 'W' | 'b' | 'B' => self.emit(TokenKind::Class, 2),
            'A' | 'z' => self.emit(TokenKind::DirectedAnchor, 2),
            'p' | 'P' => match self.probe(unicode_class) {
                Some(len) => self.emit(TokenKind::Class, len),
                None => self.invalid_escape("unicode class"),
            },
            'x' => match self.probe(hex_escape) {
                Some(len) => self.emit(TokenKind::Literal, len),
                None => self.invalid_escape("hex escape"),
            },
            '0'..='7' => match self.probe(octal_escape) {
                Some(len) => self.emit(TokenKind::Literal, len),
                None => self.invalid_escape("octal escape"),
            },
            _ => self.emit(TokenKind::Literal, 1 + c.len_utf8()),
        }
    }

    fn invalid_escape(&mut self, what: &str) {
        self.errors
            .push(Error::syntax(format!("invalid {}", what), self.pos));
        self.emit(TokenKind::Literal, 2);
    }

    /// A bracketed class, including nested classes and `[:name:]`.
    fn class(&mut self) {
        match self.probe(bracket_class) {
            Some(len) => self.emit(TokenKind::Class, len),
            None => {
                self.errors
                    .push(Error::syntax("unclosed character class", self.pos));
                let len = self.rest.len();
                self.emit(TokenKind::Class, len);
            }
        }
    }

    fn group_open(&mut self) {
        if !self.rest.starts_with("(?") {
            self.emit(TokenKind::OpenGroup, 1);
            return;
        }
        if let Some(len) = self.probe(named_group_open) {
            self.emit(TokenKind::OpenNamedGroup, len);
        } else if let Some(len) = self.probe(flags_open) {
            let kind = if self.rest[..len].ends_with(')') {
                TokenKind::Flags
            } else {
                TokenKind::OpenFlagsGroup
            };
            self.emit(kind, len);
        } else {
            self.errors
                .push(Error::syntax("unsupported group syntax", self.pos));
            // treat it as a plain group so the rest of the pattern still parses
            self.emit(TokenKind::OpenGroup, 2);
        }
    }
}

fn is_flag_char(c: char) -> bool {
    c == '-' || FlagSet::from_letter(c).is_some()
}

/// `]` right after the opening bracket (or `[^`) is literal.
fn bracket_class<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        '[',
        opt('^'),
        opt(']'),
        repeat::<_, _, (), _, _>(0.., class_item),
        ']',
    )
        .take()
        .parse_next(input)
}

fn class_item<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    alt((
        ('\\', any).take(),
        posix_class,
        bracket_class,
        take_while(1.., |c: char| !matches!(c, '\\' | '[' | ']')),
    ))
    .parse_next(input)
}

fn posix_class<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    ("[:", take_until(0.., ":]"), ":]").take().parse_next(input)
}

fn counted_repetition<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    ('{', digit1, opt((',', opt(digit1))), '}', opt('?'))
        .take()
        .parse_next(input)
}

fn unicode_class<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        '\\',
        one_of(('p', 'P')),
        alt((('{', take_till(1.., '}'), '}').take(), any.take())),
    )
        .take()
        .parse_next(input)
}

fn hex_escape<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        "\\x",
        alt((
            ('{', take_while(1.., |c: char| c.is_ascii_hexdigit()), '}').take(),
            take_while(2, |c: char| c.is_ascii_hexdigit()),
        )),
    )
        .take()
        .parse_next(input)
}

fn octal_escape<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    ('\\', take_while(1..=3, |c: char| ('0'..='7').contains(&c)))
        .take()
        .parse_next(input)
}

fn named_group_open<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    (
        alt(("(?P<", "(?<")),
        take_while(1.., |c: char| c.is_alphanumeric() || c == '_'),
        '>',
    )
        .take()
        .parse_next(input)
}

fn flags_open<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    ("(?", take_while(0.., is_flag_char), one_of((':', ')')))
        .take()
        .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(pattern: &str) -> Vec<(TokenKind, String)> {
        let (tokens, errors) = scan(pattern);
        assert!(errors.is_empty(), "unexpected errors: {}", errors);
        tokens.into_iter().map(|t| (t.kind, t.text)).collect()
    }

    fn tok(kind: TokenKind, text: &str) -> (TokenKind, String) {
        (kind, text.to_string())
    }

    #[test]
    fn literals_and_anchors() {
        assert_eq!(
            tokens("^ab$"),
            vec![
                tok(TokenKind::Anchor, "^"),
                tok(TokenKind::Literal, "a"),
                tok(TokenKind::Literal, "b"),
                tok(TokenKind::Anchor, "$"),
            ]
        );
    }

    #[test]
    fn escapes() {
        assert_eq!(
            tokens(r"\d\.\A\z\n"),
            vec![
                tok(TokenKind::Class, r"\d"),
                tok(TokenKind::Literal, r"\."),
                tok(TokenKind::DirectedAnchor, r"\A"),
                tok(TokenKind::DirectedAnchor, r"\z"),
                tok(TokenKind::Literal, r"\n"),
            ]
        );
    }

    #[test]
    fn unicode_classes() {
        assert_eq!(
            tokens(r"\pL\p{Greek}\P{Lu}"),
            vec![
                tok(TokenKind::Class, r"\pL"),
                tok(TokenKind::Class, r"\p{Greek}"),
                tok(TokenKind::Class, r"\P{Lu}"),
            ]
        );
    }

    #[test]
    fn numeric_escapes() {
        assert_eq!(
            tokens(r"\x41\x{263a}\0123"),
            vec![
                tok(TokenKind::Literal, r"\x41"),
                tok(TokenKind::Literal, r"\x{263a}"),
                tok(TokenKind::Literal, r"\012"),
                tok(TokenKind::Literal, "3"),
            ]
        );
    }

    #[test]
    fn bracket_classes() {
        assert_eq!(
            tokens(r"[a-z][^]x][[:alpha:]0-9][a[^b]]x"),
            vec![
                tok(TokenKind::Class, "[a-z]"),
                tok(TokenKind::Class, "[^]x]"),
                tok(TokenKind::Class, "[[:alpha:]0-9]"),
                tok(TokenKind::Class, "[a[^b]]"),
                tok(TokenKind::Literal, "x"),
            ]
        );
    }

    #[test]
    fn unclosed_class_takes_the_rest() {
        let (tokens, errors) = scan("a[b[c]");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().unwrap().position, Some(2));
        assert_eq!(tokens.last().unwrap().text, "[b[c]");
    }

    #[test]
    fn colon_without_posix_close_nests() {
        assert_eq!(tokens("[[:a]]"), vec![tok(TokenKind::Class, "[[:a]]")]);
    }

    #[test]
    fn escaped_bracket_in_class() {
        assert_eq!(tokens(r"[\]]"), vec![tok(TokenKind::Class, r"[\]]")]);
    }

    #[test]
    fn groups() {
        assert_eq!(
            tokens("(a)(?:b)(?P<n>c)(?<m>d)(?i)(?s-i:e)"),
            vec![
                tok(TokenKind::OpenGroup, "("),
                tok(TokenKind::Literal, "a"),
                tok(TokenKind::CloseGroup, ")"),
                tok(TokenKind::OpenFlagsGroup, "(?:"),
                tok(TokenKind::Literal, "b"),
                tok(TokenKind::CloseGroup, ")"),
                tok(TokenKind::OpenNamedGroup, "(?P<n>"),
                tok(TokenKind::Literal, "c"),
                tok(TokenKind::CloseGroup, ")"),
                tok(TokenKind::OpenNamedGroup, "(?<m>"),
                tok(TokenKind::Literal, "d"),
                tok(TokenKind::CloseGroup, ")"),
                tok(TokenKind::Flags, "(?i)"),
                tok(TokenKind::OpenFlagsGroup, "(?s-i:"),
                tok(TokenKind::Literal, "e"),
                tok(TokenKind::CloseGroup, ")"),
            ]
        );
    }

    #[test]
    fn repetitions() {
        assert_eq!(
            tokens("a*b+?c{2}d{1,}?e{1,3}"),
            vec![
                tok(TokenKind::Literal, "a"),
                tok(TokenKind::Repetition, "*"),
                tok(TokenKind::Literal, "b"),
                tok(TokenKind::Repetition, "+?"),
                tok(TokenKind::Literal, "c"),
                tok(TokenKind::Repetition, "{2}"),
                tok(TokenKind::Literal, "d"),
                tok(TokenKind::Repetition, "{1,}?"),
                tok(TokenKind::Literal, "e"),
                tok(TokenKind::Repetition, "{1,3}"),
            ]
        );
    }

    #[test]
    fn brace_without_count_is_literal() {
        assert_eq!(
            tokens("{x}"),
            vec![
                tok(TokenKind::Literal, "{"),
                tok(TokenKind::Literal, "x"),
                tok(TokenKind::Literal, "}"),
            ]
        );
    }

    #[test]
    fn multibyte_literal_positions() {
        let (tokens, _) = scan("é|b");
        assert_eq!(tokens[1].pos, 1);
        assert_eq!(tokens[2].pos, 2);
    }

    #[test]
    fn errors_accumulate() {
        let (_, errors) = scan(r"(?=a)[b\");
        assert_eq!(errors.len(), 2);
        let positions: Vec<_> = errors.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![Some(1), Some(6)]);
    }
}
