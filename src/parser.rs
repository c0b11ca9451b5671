//! Recursive-descent parser for the command language.
//!
//! ```text
//! expr       -> term* command*
//! term       -> group | addr | operation
//! group      -> '{' term* '}'
//! addr       -> innerAddr (',' addr | ';' addr)?
//! innerAddr  -> simpleAddr (('+' | '-') innerAddr)?
//! simpleAddr -> '#' NUM | NUM | '/' STR '/' | '?' STR '?' | '$' | '.'
//! operation  -> ('x'|'y'|'z'|'g'|'v') '/' STR '/' | 'n' '/' STR '/' STR '/'
//! command    -> 'd' | '=' | 'p' ('/' STR '/')? | ('a'|'c'|'i') '/' STR '/'
//!             | 's' '/' STR '/' STR '/'
//! ```
//!
//! Errors are collected rather than returned at the first one, so a caller
//! gets every problem in the command plus whatever tree could be built.

use crate::ast::{
    Address, Command, CommandKind, CompoundOp, Expr, Operation, OperationKind, Term,
};
use crate::error::{Error, Errors};
use crate::scanner::{Token, TokenKind, scan};

/// The tree built from a command, with every error found along the way.
#[derive(Debug)]
pub struct Parsed {
    pub expr: Expr,
    pub errors: Errors,
}

impl Parsed {
    pub fn into_result(self) -> Result<Expr, Errors> {
        self.errors.into_result(self.expr)
    }
}

/// Parse a command, failing if the scanner or parser found any error.
pub fn parse_expr(input: &str) -> Result<Expr, Errors> {
    parse(input, None).into_result()
}

/// Parse a command, keeping the partial tree.
///
/// `match_limit` bounds how many times the parser may inspect a token; `None`
/// derives a bound from the token count that a correct parse never reaches.
pub fn parse(input: &str, match_limit: Option<usize>) -> Parsed {
    let (tokens, mut errors) = scan(input);
    let limit = match_limit.unwrap_or(tokens.len() * 16 + 64);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: input.chars().count(),
        errors: Errors::new(),
        matches: 0,
        limit,
        aborted: false,
    };
    let expr = parser.expr();
    errors.extend(parser.errors);
    Parsed { expr, errors }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    /// Character length of the input, for errors at end of input.
    end: usize,
    errors: Errors,
    matches: usize,
    limit: usize,
    aborted: bool,
}

impl<'t> Parser<'t> {
    /// Look at the current token kind. Every grammar rule goes through here,
    /// so this is where the loop guard counts.
    fn peek(&mut self) -> Option<TokenKind> {
        if self.aborted {
            return None;
        }
        self.matches += 1;
        if self.matches > self.limit {
            self.aborted = true;
            self.errors.push(Error::internal(format!(
                "parser exceeded {} token matches at token {}; a grammar rule is not advancing",
                self.limit, self.pos
            )));
            return None;
        }
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn at(&mut self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Offset of the current token, or end of input.
    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.pos)
    }

    fn error(&mut self, message: impl Into<String>) {
        let offset = self.offset();
        self.errors.push(Error::syntax(message, offset));
    }

    fn describe_current(&self) -> String {
        match self.tokens.get(self.pos) {
            Some(t) if t.kind == TokenKind::Text => format!("text \"{}\"", t.text),
            Some(t) => format!("'{}'", t.text),
            None => "end of input".to_string(),
        }
    }

    fn expr(&mut self) -> Expr {
        let mut expr = Expr::default();
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Command(_) => {
                    if let Some(cmd) = self.command() {
                        expr.commands.push(cmd);
                    }
                }
                _ if starts_term(kind) && expr.commands.is_empty() => {
                    if let Some(term) = self.term() {
                        expr.terms.push(term);
                    }
                }
                _ if starts_term(kind) => {
                    self.error("addresses and operations must come before commands");
                    self.term();
                }
                _ => {
                    let found = self.describe_current();
                    self.error(format!("unexpected {}", found));
                    self.pos += 1;
                }
            }
        }
        expr
    }

    fn term(&mut self) -> Option<Term> {
        match self.peek()? {
            TokenKind::OpenBrace => Some(self.group()),
            TokenKind::Operation(_) => self.operation().map(Term::Operation),
            _ => self.addr().map(Term::Address),
        }
    }

    fn group(&mut self) -> Term {
        let open = self.offset();
        self.next();
        let mut terms = Vec::new();
        loop {
            match self.peek() {
                None => {
                    if !self.aborted {
                        self.errors.push(Error::syntax("unclosed '{'", open));
                    }
                    break;
                }
                Some(TokenKind::CloseBrace) => {
                    self.next();
                    break;
                }
                Some(kind) if starts_term(kind) => {
                    if let Some(term) = self.term() {
                        terms.push(term);
                    }
                }
                Some(_) => {
                    let found = self.describe_current();
                    self.error(format!("unexpected {} inside group", found));
                    self.pos += 1;
                }
            }
        }
        Term::Group(terms)
    }

    fn addr(&mut self) -> Option<Address> {
        let left = self.inner_addr()?;
        let op = match self.peek() {
            Some(TokenKind::Comma) => CompoundOp::Comma,
            Some(TokenKind::Semicolon) => CompoundOp::Semicolon,
            _ => return Some(left),
        };
        self.next();
        match self.addr() {
            Some(right) => Some(Address::compound(op, left, right)),
            None => Some(left),
        }
    }

    fn inner_addr(&mut self) -> Option<Address> {
        let left = self.simple_addr()?;
        let op = match self.peek() {
            Some(TokenKind::Plus) => CompoundOp::Plus,
            Some(TokenKind::Minus) => CompoundOp::Minus,
            _ => return Some(left),
        };
        self.next();
        match self.inner_addr() {
            Some(right) => Some(Address::compound(op, left, right)),
            None => Some(left),
        }
    }

    fn simple_addr(&mut self) -> Option<Address> {
        let Some(kind) = self.peek() else {
            if !self.aborted {
                self.error("expected an address");
            }
            return None;
        };
        match kind {
            TokenKind::Hash => {
                self.next();
                if self.at(TokenKind::Number) {
                    self.number().map(Address::char)
                } else {
                    // the scanner already reported the missing number
                    None
                }
            }
            TokenKind::Number => self.number().map(Address::line),
            TokenKind::Delimiter('/') => {
                let strings = self.delimited('/', 1)?;
                Some(Address::forward(&strings[0]))
            }
            TokenKind::Delimiter('?') => {
                let strings = self.delimited('?', 1)?;
                Some(Address::backward(&strings[0]))
            }
            TokenKind::Dollar => {
                self.next();
                Some(Address::end())
            }
            TokenKind::Dot => {
                self.next();
                Some(Address::dot())
            }
            TokenKind::Mark => {
                self.error("mark addresses are not supported");
                self.next();
                None
            }
            _ => {
                let found = self.describe_current();
                self.error(format!("expected an address, found {}", found));
                None
            }
        }
    }

    fn number(&mut self) -> Option<usize> {
        let offset = self.offset();
        let token = self.next()?;
        match token.text.parse::<usize>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.errors.push(Error::syntax(
                    format!("number {} is too large", token.text),
                    offset,
                ));
                None
            }
        }
    }

    fn operation(&mut self) -> Option<Operation> {
        let token = self.next()?;
        let TokenKind::Operation(letter) = token.kind else {
            return None;
        };
        let op = OperationKind::from_letter(letter)?;
        if !self.at(TokenKind::Delimiter('/')) {
            self.error(format!("expected '/' after '{}'", letter));
            return None;
        }
        if op == OperationKind::Nest {
            let strings = self.delimited('/', 2)?;
            Some(Operation::nest(&strings[0], &strings[1]))
        } else {
            let strings = self.delimited('/', 1)?;
            Some(Operation::new(op, &strings[0]))
        }
    }

    fn command(&mut self) -> Option<Command> {
        let token = self.next()?;
        let TokenKind::Command(letter) = token.kind else {
            return None;
        };
        let op = CommandKind::from_letter(letter)?;
        let has_args = self.at(TokenKind::Delimiter('/'));
        match op {
            CommandKind::Delete | CommandKind::Address => Some(Command::new(op)),
            CommandKind::Print if !has_args => Some(Command::new(op)),
            _ if !has_args => {
                self.error(format!("expected '/' after '{}'", letter));
                None
            }
            CommandKind::Substitute => {
                let strings = self.delimited('/', 2)?;
                Some(Command::substitute(&strings[0], &strings[1]))
            }
            _ => {
                let strings = self.delimited('/', 1)?;
                Some(Command::with_text(op, &strings[0]))
            }
        }
    }

    /// Consume `count` delimited strings. The current token is the opening
    /// delimiter.
    fn delimited(&mut self, delim: char, count: usize) -> Option<Vec<String>> {
        self.next();
        let mut strings = Vec::with_capacity(count);
        for _ in 0..count {
            if self.at(TokenKind::Text) {
                strings.push(self.next()?.text.clone());
            } else if self.at(TokenKind::Delimiter(delim)) {
                // the scanner emits no text token for a string cut off at end of input
                strings.push(String::new());
            } else {
                self.error(format!("expected text after '{}'", delim));
                return None;
            }
            if !self.at(TokenKind::Delimiter(delim)) {
                self.error(format!("expected closing '{}'", delim));
                return None;
            }
            self.next();
        }
        Some(strings)
    }
}

fn starts_term(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::OpenBrace
            | TokenKind::Hash
            | TokenKind::Number
            | TokenKind::Delimiter(_)
            | TokenKind::Dollar
            | TokenKind::Dot
            | TokenKind::Mark
            | TokenKind::Operation(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AddressKind, CompoundOp};

    fn addr_term(addr: Address) -> Term {
        Term::Address(addr)
    }

    #[test]
    fn empty_command() {
        let result = parse_expr("").unwrap();
        assert_eq!(result, Expr::default());
    }

    #[test]
    fn char_address() {
        let result = parse_expr("#51").unwrap();
        assert_eq!(result.terms, vec![addr_term(Address::char(51))]);
        assert!(result.commands.is_empty());
    }

    #[test]
    fn line_address_with_commands() {
        let result = parse_expr("20 dp").unwrap();
        assert_eq!(result.terms, vec![addr_term(Address::line(20))]);
        assert_eq!(
            result.commands,
            vec![
                Command::new(CommandKind::Delete),
                Command::new(CommandKind::Print)
            ]
        );
    }

    #[test]
    fn regex_addresses() {
        let result = parse_expr("/foo/?bar?").unwrap();
        assert_eq!(
            result.terms,
            vec![
                addr_term(Address::forward("foo")),
                addr_term(Address::backward("bar")),
            ]
        );
    }

    #[test]
    fn end_and_dot() {
        let result = parse_expr("$.").unwrap();
        assert_eq!(
            result.terms,
            vec![addr_term(Address::end()), addr_term(Address::dot())]
        );
    }

    #[test]
    fn comma_compound() {
        let result = parse_expr("#6,#8d").unwrap();
        assert_eq!(
            result.terms,
            vec![addr_term(Address::compound(
                CompoundOp::Comma,
                Address::char(6),
                Address::char(8)
            ))]
        );
        assert_eq!(result.commands, vec![Command::new(CommandKind::Delete)]);
    }

    #[test]
    fn plus_binds_tighter_than_comma() {
        let result = parse_expr("1+/a/,3").unwrap();
        assert_eq!(
            result.terms,
            vec![addr_term(Address::compound(
                CompoundOp::Comma,
                Address::compound(CompoundOp::Plus, Address::line(1), Address::forward("a")),
                Address::line(3),
            ))]
        );
    }

    #[test]
    fn comma_is_right_associative() {
        let result = parse_expr("1,2;3").unwrap();
        assert_eq!(
            result.terms,
            vec![addr_term(Address::compound(
                CompoundOp::Comma,
                Address::line(1),
                Address::compound(CompoundOp::Semicolon, Address::line(2), Address::line(3)),
            ))]
        );
    }

    #[test]
    fn minus_compound() {
        let result = parse_expr("/b/-/a/").unwrap();
        match &result.terms[0] {
            Term::Address(Address::Compound(c)) => {
                assert_eq!(c.op, CompoundOp::Minus);
                assert!(!c.reversed);
            }
            other => panic!("expected compound address, got {:?}", other),
        }
    }

    #[test]
    fn separate_terms() {
        let result = parse_expr("0/start/,/end/d").unwrap();
        assert_eq!(
            result.terms,
            vec![
                addr_term(Address::line(0)),
                addr_term(Address::compound(
                    CompoundOp::Comma,
                    Address::forward("start"),
                    Address::forward("end"),
                )),
            ]
        );
    }

    #[test]
    fn operations() {
        let result = parse_expr("x/a/y/b/z/c/g/d/v/e/").unwrap();
        let ops: Vec<_> = result
            .terms
            .iter()
            .map(|t| match t {
                Term::Operation(op) => (op.op.letter(), op.pattern.clone()),
                other => panic!("expected operation, got {:?}", other),
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                ('x', "a".to_string()),
                ('y', "b".to_string()),
                ('z', "c".to_string()),
                ('g', "d".to_string()),
                ('v', "e".to_string()),
            ]
        );
    }

    #[test]
    fn nest_operation() {
        let result = parse_expr("n/{/}/").unwrap();
        assert_eq!(
            result.terms,
            vec![Term::Operation(Operation::nest("{", "}"))]
        );
    }

    #[test]
    fn text_commands() {
        let result = parse_expr("a/x/c/y/i/z/").unwrap();
        assert_eq!(
            result.commands,
            vec![
                Command::with_text(CommandKind::Append, "x"),
                Command::with_text(CommandKind::Change, "y"),
                Command::with_text(CommandKind::Insert, "z"),
            ]
        );
    }

    #[test]
    fn print_with_separator() {
        let result = parse_expr("x/a/p/--/").unwrap();
        assert_eq!(
            result.commands,
            vec![Command::with_text(CommandKind::Print, "--")]
        );
    }

    #[test]
    fn substitute() {
        let result = parse_expr(r"s/hell(o)/\1/").unwrap();
        assert_eq!(result.commands, vec![Command::substitute("hell(o)", r"\1")]);
    }

    #[test]
    fn display_address() {
        let result = parse_expr("/x/=").unwrap();
        assert_eq!(result.commands, vec![Command::new(CommandKind::Address)]);
    }

    #[test]
    fn group() {
        let result = parse_expr("{x/a/ #3}d").unwrap();
        assert_eq!(
            result.terms,
            vec![Term::Group(vec![
                Term::Operation(Operation::new(OperationKind::Extract, "a")),
                addr_term(Address::char(3)),
            ])]
        );
    }

    #[test]
    fn nested_groups() {
        let result = parse_expr("{{$}}").unwrap();
        assert_eq!(
            result.terms,
            vec![Term::Group(vec![Term::Group(vec![addr_term(Address::end())])])]
        );
    }

    #[test]
    fn unclosed_group_error() {
        let errors = parse_expr("{x/a/").unwrap_err();
        assert_eq!(errors.len(), 1);
        let err = errors.iter().next().unwrap();
        assert!(err.message.contains("unclosed"));
        assert_eq!(err.position, Some(1));
    }

    #[test]
    fn missing_closing_delimiter_error() {
        let errors = parse_expr("x/foo").unwrap_err();
        let err = errors.iter().next().unwrap();
        assert!(err.message.contains("closing '/'"));
        assert_eq!(err.position, Some(6));
    }

    #[test]
    fn missing_text_argument_error() {
        let errors = parse_expr("a").unwrap_err();
        assert!(errors.iter().any(|e| e.message.contains("expected '/'")));
    }

    #[test]
    fn term_after_command_error() {
        let errors = parse_expr("d x/a/").unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| e.message.contains("must come before commands"))
        );
    }

    #[test]
    fn errors_accumulate_with_positions() {
        let parsed = parse("'a d", None);
        let positions: Vec<_> = parsed.errors.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![Some(1), Some(4)]);
        // the valid command still made it into the partial tree
        assert_eq!(parsed.expr.commands, vec![Command::new(CommandKind::Delete)]);
    }

    #[test]
    fn dangling_comma_keeps_left() {
        let parsed = parse("3,", None);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.expr.terms, vec![addr_term(Address::line(3))]);
    }

    #[test]
    fn missing_number_after_hash_reported_once() {
        let errors = parse_expr("#d").unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn loop_guard_trips_as_internal_error() {
        let parsed = parse("1,2,3,4,5,6,7,8 d", Some(3));
        assert!(parsed.errors.has_internal());
    }

    #[test]
    fn default_guard_never_trips_on_long_commands() {
        let command = "x/a/ ".repeat(200) + "{1,2;3+/b/-?c?} p";
        let parsed = parse(&command, None);
        assert!(parsed.errors.is_empty(), "{}", parsed.errors);
    }

    #[test]
    fn simple_address_kinds() {
        let result = parse_expr("5 #5 $ .").unwrap();
        let kinds: Vec<_> = result
            .terms
            .iter()
            .map(|t| match t {
                Term::Address(Address::Simple(s)) => s.kind,
                other => panic!("expected simple address, got {:?}", other),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                AddressKind::Line,
                AddressKind::Char,
                AddressKind::End,
                AddressKind::Dot
            ]
        );
    }
}
