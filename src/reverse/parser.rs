//! Parser from regex tokens to a [`Root`].
//!
//! ```text
//! root         -> branches
//! branches     -> terms ('|' terms)*
//! terms        -> (atom repetition*)*
//! atom         -> literal | class | anchor | flags | group
//! group        -> open branches ')'
//! ```

use super::ast::{FlagChange, Node, Root, Token, TokenKind};
use super::scanner::scan;
use crate::error::{Error, Errors};

/// Parse a pattern, failing with every scanner and parser error found.
pub fn parse(pattern: &str) -> Result<Root, Errors> {
    let (tokens, mut errors) = scan(pattern);
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        errors: Errors::new(),
    };
    let root = parser.root();
    errors.extend(parser.errors);
    errors.into_result(root)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    errors: Errors,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn root(&mut self) -> Root {
        let mut branches = Vec::new();
        loop {
            branches.extend(self.branches());
            match self.peek() {
                Some(t) if t.kind == TokenKind::CloseGroup => {
                    self.errors.push(Error::syntax("unmatched ')'", t.pos));
                    self.pos += 1;
                }
                _ => break,
            }
        }
        Root {
            body: Node::Alternatives(branches),
        }
    }

    fn branches(&mut self) -> Vec<Node> {
        let mut branches = vec![self.terms()];
        while let Some(t) = self.peek() {
            if t.kind != TokenKind::Alternation {
                break;
            }
            self.pos += 1;
            branches.push(self.terms());
        }
        branches
    }

    fn terms(&mut self) -> Node {
        let mut nodes: Vec<Node> = Vec::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Alternation | TokenKind::CloseGroup => break,
                TokenKind::Repetition => {
                    self.pos += 1;
                    match nodes.pop() {
                        Some(operand) if !matches!(operand, Node::Flags { .. }) => {
                            nodes.push(Node::Repetition {
                                operand: Box::new(operand),
                                quantifier: token.clone(),
                            });
                        }
                        other => {
                            nodes.extend(other);
                            self.errors.push(Error::syntax(
                                "repetition operator missing expression",
                                token.pos,
                            ));
                        }
                    }
                }
                _ => {
                    if let Some(node) = self.atom() {
                        nodes.push(node);
                    }
                }
            }
        }
        Node::Terms(nodes)
    }

    fn atom(&mut self) -> Option<Node> {
        let token = self.next()?;
        let node = match token.kind {
            TokenKind::Literal => Node::Literal(token.clone()),
            TokenKind::Class => Node::ClassOrEscape(token.clone()),
            TokenKind::Anchor => Node::BasicAnchor(token.clone()),
            TokenKind::DirectedAnchor => Node::DirectedAnchor(token.clone()),
            TokenKind::Flags => Node::Flags {
                token: token.clone(),
                change: FlagChange::from_token_text(&token.text),
            },
            TokenKind::OpenGroup | TokenKind::OpenNamedGroup | TokenKind::OpenFlagsGroup => {
                self.group(token)
            }
            TokenKind::CloseGroup | TokenKind::Alternation | TokenKind::Repetition => {
                return None;
            }
        };
        Some(node)
    }

    fn group(&mut self, open: &'t Token) -> Node {
        let body = Box::new(Node::Alternatives(self.branches()));
        match self.peek() {
            Some(t) if t.kind == TokenKind::CloseGroup => self.pos += 1,
            _ => self
                .errors
                .push(Error::syntax("unclosed group", open.pos)),
        }
        let open = open.clone();
        match open.kind {
            TokenKind::OpenNamedGroup => Node::NamedGroup { open, body },
            TokenKind::OpenFlagsGroup => Node::FlagsGroup {
                change: FlagChange::from_token_text(&open.text),
                open,
                body,
            },
            _ => Node::NumberedGroup { open, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(pattern: &str) -> Vec<Node> {
        match parse(pattern) {
            Ok(Root {
                body: Node::Alternatives(branches),
            }) => branches,
            other => panic!("unexpected parse result: {:?}", other),
        }
    }

    fn terms(node: &Node) -> &[Node] {
        match node {
            Node::Terms(nodes) => nodes,
            other => panic!("expected terms, got {:?}", other),
        }
    }

    #[test]
    fn literals_form_one_branch() {
        let branches = body("abc");
        assert_eq!(branches.len(), 1);
        assert_eq!(terms(&branches[0]).len(), 3);
    }

    #[test]
    fn alternation_splits_branches() {
        let branches = body("ab|c|");
        assert_eq!(branches.len(), 3);
        assert!(terms(&branches[2]).is_empty());
    }

    #[test]
    fn repetition_wraps_previous_atom() {
        let branches = body("ab*");
        let nodes = terms(&branches[0]);
        assert_eq!(nodes.len(), 2);
        assert!(matches!(
            &nodes[1],
            Node::Repetition { operand, quantifier }
                if matches!(**operand, Node::Literal(_)) && quantifier.text == "*"
        ));
    }

    #[test]
    fn groups_nest() {
        let branches = body("(a(?i:b)(?P<n>c))+");
        let nodes = terms(&branches[0]);
        let Node::Repetition { operand, .. } = &nodes[0] else {
            panic!("expected repetition, got {:?}", nodes[0]);
        };
        let Node::NumberedGroup { body, .. } = &**operand else {
            panic!("expected group, got {:?}", operand);
        };
        let Node::Alternatives(inner) = &**body else {
            panic!("expected alternatives, got {:?}", body);
        };
        let inner = terms(&inner[0]);
        assert!(matches!(inner[0], Node::Literal(_)));
        assert!(matches!(inner[1], Node::FlagsGroup { .. }));
        assert!(matches!(inner[2], Node::NamedGroup { .. }));
    }

    #[test]
    fn flags_group_reads_its_change() {
        let branches = body("(?i:a)");
        let Node::FlagsGroup { change, .. } = &terms(&branches[0])[0] else {
            panic!("expected flags group");
        };
        assert_eq!(change.set.letters(), "i");
    }

    #[test]
    fn repetition_without_operand() {
        let errors = parse("*a").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().map(|e| e.position), Some(Some(1)));

        let errors = parse("(?i)+").unwrap_err();
        assert!(errors.to_string().contains("missing expression"));
    }

    #[test]
    fn unclosed_group_points_at_open() {
        let errors = parse("ab(cd").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.iter().next().map(|e| e.position), Some(Some(3)));
    }

    #[test]
    fn unmatched_close_is_reported_and_skipped() {
        let errors = parse("a)b)c").unwrap_err();
        let positions: Vec<_> = errors.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![Some(2), Some(4)]);
    }
}
