use std::fmt;

use super::ast::{Node, Root};

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(token)
            | Node::ClassOrEscape(token)
            | Node::BasicAnchor(token)
            | Node::DirectedAnchor(token)
            | Node::Flags { token, .. } => f.write_str(&token.text),
            Node::FlagsGroup { open, body, .. }
            | Node::NamedGroup { open, body }
            | Node::NumberedGroup { open, body } => write!(f, "{}{})", open.text, body),
            Node::Repetition {
                operand,
                quantifier,
            } => write!(f, "{}{}", operand, quantifier.text),
            Node::Alternatives(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", branch)?;
                }
                Ok(())
            }
            Node::Terms(nodes) => nodes.iter().try_for_each(|n| write!(f, "{}", n)),
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}

/// Render a tree back into pattern text.
pub fn to_pattern(root: &Root) -> String {
    root.to_string()
}
