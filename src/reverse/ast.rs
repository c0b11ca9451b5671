//! Syntax tree for regex patterns.
//!
//! Every leaf keeps the token it was parsed from, so a tree serializes back
//! to exactly the source text it came from.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A single character or a character escape like `\.` or `\x41`
    Literal,
    /// `.`, `[...]`, `\d`, `\pL`, `\b` and friends
    Class,
    /// `^` or `$`
    Anchor,
    /// `\A` or `\z`
    DirectedAnchor,
    /// `(?flags)`
    Flags,
    /// `(`
    OpenGroup,
    /// `(?P<name>` or `(?<name>`
    OpenNamedGroup,
    /// `(?flags:` including `(?:`
    OpenFlagsGroup,
    /// `)`
    CloseGroup,
    /// `*`, `+`, `?` or `{m,n}`, with an optional lazy `?`
    Repetition,
    /// `|`
    Alternation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 0-based character offset in the pattern.
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

/// Flag letters in the order they are written out.
const FLAG_LETTERS: [char; 7] = ['i', 'm', 's', 'R', 'U', 'u', 'x'];

/// A set of regex flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagSet(u8);

impl FlagSet {
    pub const EMPTY: FlagSet = FlagSet(0);
    pub const CASE_INSENSITIVE: FlagSet = FlagSet(1 << 0);
    pub const MULTI_LINE: FlagSet = FlagSet(1 << 1);

    pub fn from_letter(c: char) -> Option<FlagSet> {
        FLAG_LETTERS
            .iter()
            .position(|&l| l == c)
            .map(|i| FlagSet(1 << i))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: FlagSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: FlagSet) -> FlagSet {
        FlagSet(self.0 | other.0)
    }

    pub fn difference(self, other: FlagSet) -> FlagSet {
        FlagSet(self.0 & !other.0)
    }

    /// The letters in this set, e.g. `"is"`.
    pub fn letters(self) -> String {
        FLAG_LETTERS
            .iter()
            .enumerate()
            .filter(|(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, &c)| c)
            .collect()
    }
}

/// The flags a `(?set-unset)` token turns on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagChange {
    pub set: FlagSet,
    pub unset: FlagSet,
}

impl FlagChange {
    /// Read the flag letters out of `(?i-s)` or `(?i-s:`.
    pub fn from_token_text(text: &str) -> FlagChange {
        let inner = text
            .trim_start_matches("(?")
            .trim_end_matches([')', ':']);
        let mut change = FlagChange::default();
        let mut negated = false;
        for c in inner.chars() {
            if c == '-' {
                negated = true;
                continue;
            }
            if let Some(flag) = FlagSet::from_letter(c) {
                if negated {
                    change.unset = change.unset.union(flag);
                } else {
                    change.set = change.set.union(flag);
                }
            }
        }
        change
    }

    /// The change that takes `from` to `to`.
    pub fn between(from: FlagSet, to: FlagSet) -> FlagChange {
        FlagChange {
            set: to.difference(from),
            unset: from.difference(to),
        }
    }

    pub fn apply(self, state: FlagSet) -> FlagSet {
        state.union(self.set).difference(self.unset)
    }

    pub fn is_empty(self) -> bool {
        self.set.is_empty() && self.unset.is_empty()
    }

    /// Render as a standalone flags token, e.g. `(?i-s)`.
    pub fn token_text(self) -> String {
        let mut text = format!("(?{}", self.set.letters());
        if !self.unset.is_empty() {
            text.push('-');
            text.push_str(&self.unset.letters());
        }
        text.push(')');
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(Token),
    ClassOrEscape(Token),
    BasicAnchor(Token),
    DirectedAnchor(Token),
    Flags {
        token: Token,
        change: FlagChange,
    },
    FlagsGroup {
        open: Token,
        change: FlagChange,
        body: Box<Node>,
    },
    NamedGroup {
        open: Token,
        body: Box<Node>,
    },
    NumberedGroup {
        open: Token,
        body: Box<Node>,
    },
    Repetition {
        operand: Box<Node>,
        quantifier: Token,
    },
    /// Branches separated by `|`; each branch is a `Terms`.
    Alternatives(Vec<Node>),
    Terms(Vec<Node>),
}

impl Node {
    /// A flags node that was not in the source, placed at `pos`.
    pub fn flags(change: FlagChange, pos: usize) -> Node {
        Node::Flags {
            token: Token::new(TokenKind::Flags, change.token_text(), pos),
            change,
        }
    }
}

/// A whole pattern. The body is always an `Alternatives` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    pub body: Node,
}
