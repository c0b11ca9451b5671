//! Rewriting a regex tree so that matching it forward over reversed text
//! finds what the original finds matching backward.
//!
//! The tree is rebuilt rather than edited in place, so the parsed tree can
//! still be used after reversing.
//!
//! Term order is reversed at every level. The only part that needs care is
//! flag scope: a `(?i)` in the middle of a sequence affects everything to its
//! right in the source, which after reversal is everything to its left. Each
//! reversed sequence therefore opens with a transition to the state the
//! source sequence ends in, and every source flag boundary becomes the
//! inverse change at the same boundary.

use super::ast::{FlagChange, FlagSet, Node, Root, Token};

/// Reverse a pattern tree. `initial` is the flag state the pattern is
/// compiled with (e.g. multi-line mode set on the regex builder).
pub fn reverse(root: &Root, initial: FlagSet) -> Root {
    Root {
        body: reverse_branches(&root.body, initial),
    }
}

/// Reverse an `Alternatives` node entered with `entry` flags.
fn reverse_branches(node: &Node, entry: FlagSet) -> Node {
    let Node::Alternatives(branches) = node else {
        return reverse_node(node, entry);
    };
    // Flags set in one branch stay set in later branches, in both the source
    // and the reversed pattern, but the two reach each branch in different
    // states.
    let mut source_state = entry;
    let mut reversed_state = entry;
    let mut reversed = Vec::with_capacity(branches.len());
    for branch in branches {
        let sequence = match branch {
            Node::Terms(nodes) => nodes.as_slice(),
            other => std::slice::from_ref(other),
        };
        let out = reverse_terms(sequence, source_state, reversed_state);
        source_state = out.source_exit;
        reversed_state = out.reversed_exit;
        reversed.push(Node::Terms(out.nodes));
    }
    Node::Alternatives(reversed)
}

struct ReversedTerms {
    nodes: Vec<Node>,
    /// Flags in effect after the source sequence.
    source_exit: FlagSet,
    /// Flags in effect after the reversed sequence.
    reversed_exit: FlagSet,
}

fn reverse_terms(nodes: &[Node], source_entry: FlagSet, reversed_entry: FlagSet) -> ReversedTerms {
    let mut out = Vec::with_capacity(nodes.len() + 1);
    let mut state = source_entry;
    let mut first_node_state = None;
    for node in nodes {
        match node {
            Node::Flags { token, change } => {
                let next = change.apply(state);
                let inverse = FlagChange::between(next, state);
                // with nothing to the left in the source, the inverse would
                // trail the reversed sequence and guard nothing
                if !inverse.is_empty() && first_node_state.is_some() {
                    out.push(Node::flags(inverse, token.pos));
                }
                state = next;
            }
            other => {
                first_node_state.get_or_insert(state);
                out.push(reverse_node(other, state));
            }
        }
    }
    let leading = FlagChange::between(reversed_entry, state);
    if !leading.is_empty() {
        out.push(Node::flags(leading, 0));
    }
    out.reverse();
    ReversedTerms {
        nodes: out,
        source_exit: state,
        reversed_exit: first_node_state.unwrap_or(state),
    }
}

fn reverse_node(node: &Node, state: FlagSet) -> Node {
    match node {
        Node::BasicAnchor(token) => {
            let text = match token.text.as_str() {
                "^" => "$",
                "$" => "^",
                other => other,
            };
            Node::BasicAnchor(Token::new(token.kind, text, token.pos))
        }
        Node::Literal(_) | Node::ClassOrEscape(_) | Node::DirectedAnchor(_) | Node::Flags { .. } => {
            node.clone()
        }
        Node::Repetition {
            operand,
            quantifier,
        } => Node::Repetition {
            operand: Box::new(reverse_node(operand, state)),
            quantifier: quantifier.clone(),
        },
        Node::NumberedGroup { open, body } => Node::NumberedGroup {
            open: open.clone(),
            body: Box::new(reverse_branches(body, state)),
        },
        Node::NamedGroup { open, body } => Node::NamedGroup {
            open: open.clone(),
            body: Box::new(reverse_branches(body, state)),
        },
        Node::FlagsGroup { open, change, body } => Node::FlagsGroup {
            open: open.clone(),
            change: *change,
            body: Box::new(reverse_branches(body, change.apply(state))),
        },
        Node::Alternatives(_) => reverse_branches(node, state),
        Node::Terms(nodes) => Node::Terms(reverse_terms(nodes, state, state).nodes),
    }
}
