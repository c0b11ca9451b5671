use std::fmt;

/// A parsed command: terms that select text, then commands that act on it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expr {
    pub terms: Vec<Term>,
    pub commands: Vec<Command>,
}

/// A term narrows or rewrites the range set.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// `{ ... }` - union of what each inner term selects
    Group(Vec<Term>),
    Address(Address),
    Operation(Operation),
}

/// An address selects one range relative to each input range.
#[derive(Debug, Clone, PartialEq)]
pub enum Address {
    Simple(SimpleAddress),
    Compound(CompoundAddress),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleAddress {
    pub kind: AddressKind,
    /// Line or character number, 0 otherwise.
    pub value: usize,
    /// Regex source, empty otherwise.
    pub pattern: String,
    /// Set when the address is evaluated over reversed text.
    pub reversed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// `n` - the nth line
    Line,
    /// `#n` - the nth character
    Char,
    /// `/re/`
    ForwardRegex,
    /// `?re?`
    BackwardRegex,
    /// `$`
    End,
    /// `.`
    Dot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAddress {
    pub op: CompoundOp,
    pub left: Box<Address>,
    pub right: Box<Address>,
    pub reversed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    /// `a,b` - from a's start to b's end
    Comma,
    /// `a;b` - like `,` but b is searched after a
    Semicolon,
    /// `a+b` - b searched forward from a's end
    Plus,
    /// `a-b` - b searched backward from a's start
    Minus,
}

impl CompoundOp {
    pub fn symbol(self) -> char {
        match self {
            CompoundOp::Comma => ',',
            CompoundOp::Semicolon => ';',
            CompoundOp::Plus => '+',
            CompoundOp::Minus => '-',
        }
    }

    /// The operator as seen over reversed text, where `+` and `-` trade
    /// directions.
    pub fn mirrored(self) -> Self {
        match self {
            CompoundOp::Plus => CompoundOp::Minus,
            CompoundOp::Minus => CompoundOp::Plus,
            op => op,
        }
    }
}

impl Address {
    pub fn line(n: usize) -> Self {
        Address::simple(AddressKind::Line, n, "")
    }

    pub fn char(n: usize) -> Self {
        Address::simple(AddressKind::Char, n, "")
    }

    pub fn forward(pattern: &str) -> Self {
        Address::simple(AddressKind::ForwardRegex, 0, pattern)
    }

    pub fn backward(pattern: &str) -> Self {
        Address::simple(AddressKind::BackwardRegex, 0, pattern)
    }

    pub fn end() -> Self {
        Address::simple(AddressKind::End, 0, "")
    }

    pub fn dot() -> Self {
        Address::simple(AddressKind::Dot, 0, "")
    }

    fn simple(kind: AddressKind, value: usize, pattern: &str) -> Self {
        Address::Simple(SimpleAddress {
            kind,
            value,
            pattern: pattern.to_string(),
            reversed: false,
        })
    }

    pub fn compound(op: CompoundOp, left: Address, right: Address) -> Self {
        Address::Compound(CompoundAddress {
            op,
            left: Box::new(left),
            right: Box::new(right),
            reversed: false,
        })
    }

    /// A copy of this address with the search orientation flipped throughout.
    ///
    /// Used for the right side of `-`, which is evaluated over reversed text.
    pub fn toggled(&self) -> Address {
        match self {
            Address::Simple(s) => Address::Simple(SimpleAddress {
                reversed: !s.reversed,
                ..s.clone()
            }),
            Address::Compound(c) => Address::Compound(CompoundAddress {
                op: c.op,
                left: Box::new(c.left.toggled()),
                right: Box::new(c.right.toggled()),
                reversed: !c.reversed,
            }),
        }
    }
}

/// A looping or filtering operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub op: OperationKind,
    pub pattern: String,
    /// Openers and closers for `n`, empty otherwise.
    pub args: [String; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// `x/re/` - every match
    Extract,
    /// `y/re/` - the text between matches
    Between,
    /// `z/re/` - each match extended to the next one
    Segment,
    /// `g/re/` - keep ranges that match
    Guard,
    /// `v/re/` - keep ranges that do not match
    Exclude,
    /// `n/open/close/` - the first balanced span
    Nest,
}

impl OperationKind {
    pub fn from_letter(c: char) -> Option<Self> {
        Some(match c {
            'x' => OperationKind::Extract,
            'y' => OperationKind::Between,
            'z' => OperationKind::Segment,
            'g' => OperationKind::Guard,
            'v' => OperationKind::Exclude,
            'n' => OperationKind::Nest,
            _ => return None,
        })
    }

    pub fn letter(self) -> char {
        match self {
            OperationKind::Extract => 'x',
            OperationKind::Between => 'y',
            OperationKind::Segment => 'z',
            OperationKind::Guard => 'g',
            OperationKind::Exclude => 'v',
            OperationKind::Nest => 'n',
        }
    }
}

impl Operation {
    pub fn new(op: OperationKind, pattern: &str) -> Self {
        Self {
            op,
            pattern: pattern.to_string(),
            args: Default::default(),
        }
    }

    pub fn nest(openers: &str, closers: &str) -> Self {
        Self {
            op: OperationKind::Nest,
            pattern: String::new(),
            args: [openers.to_string(), closers.to_string()],
        }
    }
}

/// An editing or display command, applied to the final range set.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub op: CommandKind,
    /// `s` uses both (pattern, replacement); `a`, `c`, `i` and `p` use the first.
    pub args: [String; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `d`
    Delete,
    /// `p` or `p/sep/`
    Print,
    /// `=`
    Address,
    /// `a/text/`
    Append,
    /// `c/text/`
    Change,
    /// `i/text/`
    Insert,
    /// `s/re/text/`
    Substitute,
}

impl CommandKind {
    pub fn from_letter(c: char) -> Option<Self> {
        Some(match c {
            'd' => CommandKind::Delete,
            'p' => CommandKind::Print,
            '=' => CommandKind::Address,
            'a' => CommandKind::Append,
            'c' => CommandKind::Change,
            'i' => CommandKind::Insert,
            's' => CommandKind::Substitute,
            _ => return None,
        })
    }

    pub fn letter(self) -> char {
        match self {
            CommandKind::Delete => 'd',
            CommandKind::Print => 'p',
            CommandKind::Address => '=',
            CommandKind::Append => 'a',
            CommandKind::Change => 'c',
            CommandKind::Insert => 'i',
            CommandKind::Substitute => 's',
        }
    }
}

impl Command {
    pub fn new(op: CommandKind) -> Self {
        Self {
            op,
            args: Default::default(),
        }
    }

    pub fn with_text(op: CommandKind, text: &str) -> Self {
        Self {
            op,
            args: [text.to_string(), String::new()],
        }
    }

    pub fn substitute(pattern: &str, replacement: &str) -> Self {
        Self {
            op: CommandKind::Substitute,
            args: [pattern.to_string(), replacement.to_string()],
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Simple(s) => match s.kind {
                AddressKind::Line => write!(f, "{}", s.value),
                AddressKind::Char => write!(f, "#{}", s.value),
                AddressKind::ForwardRegex => write!(f, "/{}/", s.pattern),
                AddressKind::BackwardRegex => write!(f, "?{}?", s.pattern),
                AddressKind::End => write!(f, "$"),
                AddressKind::Dot => write!(f, "."),
            },
            Address::Compound(c) => write!(f, "{}{}{}", c.left, c.op.symbol(), c.right),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            OperationKind::Nest => write!(f, "n/{}/{}/", self.args[0], self.args[1]),
            op => write!(f, "{}/{}/", op.letter(), self.pattern),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = self.op.letter();
        match self.op {
            CommandKind::Delete | CommandKind::Address => write!(f, "{}", letter),
            CommandKind::Print if self.args[0].is_empty() => write!(f, "{}", letter),
            CommandKind::Substitute => write!(f, "s/{}/{}/", self.args[0], self.args[1]),
            _ => write!(f, "{}/{}/", letter, self.args[0]),
        }
    }
}
