use regex::Regex;

use super::build_regex;
use crate::ast::{Address, AddressKind, CompoundOp, SimpleAddress};
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::interpreter::{Context, Select};
use crate::range::{Range, RuneCursor};
use crate::reverse::ast::FlagSet;
use crate::reverse::reverse_pattern_with;

/// Selects one range per input range, or none when the address is not found
/// or comes out empty. Empty results still serve as the left side of a
/// compound.
pub struct AddressStage {
    address: Compiled,
    label: String,
}

/// An address with its regexes compiled.
enum Compiled {
    Line(usize),
    Char(usize),
    Regex {
        regex: Regex,
        /// Search the text reversed, mapping the match back.
        over_reversed_text: bool,
    },
    End,
    Dot,
    Compound {
        op: CompoundOp,
        left: Box<Compiled>,
        right: Box<Compiled>,
    },
}

impl AddressStage {
    pub fn compile(address: &Address) -> Result<Self> {
        Ok(Self {
            address: Compiled::new(address)?,
            label: address.to_string(),
        })
    }
}

impl Select for AddressStage {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn select(&self, ctx: &Context, ranges: Vec<Range>) -> Result<Vec<Range>> {
        Ok(ranges
            .into_iter()
            .filter_map(|r| self.address.eval(ctx.buffer(), r, ctx.dot()))
            .filter(|r| !r.is_empty())
            .collect())
    }
}

impl Compiled {
    fn new(address: &Address) -> Result<Self> {
        match address {
            Address::Simple(s) => Compiled::simple(s),
            Address::Compound(c) => {
                // Over reversed text `-` still means toward the original
                // start. `,` and `;` never sit under `-`.
                let op = if c.reversed { c.op.mirrored() } else { c.op };
                // the right side of `-` runs over reversed text
                let right = match op {
                    CompoundOp::Minus => Compiled::new(&c.right.toggled())?,
                    _ => Compiled::new(&c.right)?,
                };
                Ok(Compiled::Compound {
                    op,
                    left: Box::new(Compiled::new(&c.left)?),
                    right: Box::new(right),
                })
            }
        }
    }

    fn simple(s: &SimpleAddress) -> Result<Self> {
        Ok(match s.kind {
            AddressKind::Line => Compiled::Line(s.value),
            AddressKind::Char => Compiled::Char(s.value),
            AddressKind::End => Compiled::End,
            AddressKind::Dot => Compiled::Dot,
            AddressKind::ForwardRegex | AddressKind::BackwardRegex => {
                let backward = s.kind == AddressKind::BackwardRegex;
                // A backward search reverses the text; so does evaluating
                // under `-`. Either one alone needs the pattern reversed.
                let pattern = if backward != s.reversed {
                    reverse_pattern_with(&s.pattern, FlagSet::MULTI_LINE)
                        .map_err(|errors| Error::regex(&s.pattern, errors))?
                } else {
                    s.pattern.clone()
                };
                Compiled::Regex {
                    regex: build_regex(&pattern)?,
                    over_reversed_text: backward,
                }
            }
        })
    }

    /// Evaluate within `within`. `None` means the address is not there.
    fn eval(&self, buffer: &Buffer, within: Range, dot: Option<usize>) -> Option<Range> {
        match self {
            Compiled::Line(n) => line(buffer, within, *n),
            Compiled::Char(0) => Some(Range::point(within.start)),
            Compiled::Char(n) => {
                let pos = within.start.checked_add(n - 1)?;
                (pos < within.end).then(|| Range::new(pos, pos + 1))
            }
            Compiled::Regex {
                regex,
                over_reversed_text: false,
            } => first_match(regex, buffer, within),
            Compiled::Regex {
                regex,
                over_reversed_text: true,
            } => {
                let reversed = buffer.reversed(within);
                let m = first_match(regex, &reversed, reversed.full())?;
                Some(Range::new(within.end - m.end, within.end - m.start))
            }
            Compiled::End if within.is_empty() => Some(Range::point(within.end)),
            Compiled::End => Some(Range::new(within.end - 1, within.end)),
            Compiled::Dot => match dot {
                Some(d) if within.contains(d) => Some(Range::new(d, d + 1)),
                _ => Some(within),
            },
            Compiled::Compound { op, left, right } => {
                let l = left.eval(buffer, within, dot)?;
                match op {
                    CompoundOp::Plus => right.eval(buffer, Range::new(l.end, within.end), dot),
                    CompoundOp::Minus => {
                        let before = Range::new(within.start, l.start);
                        let reversed = buffer.reversed(before);
                        let reversed_dot = dot
                            .filter(|&d| before.contains(d))
                            .map(|d| before.end - 1 - d);
                        let r = right.eval(&reversed, reversed.full(), reversed_dot)?;
                        Some(Range::new(before.end - r.end, before.end - r.start))
                    }
                    CompoundOp::Comma => {
                        let r = right.eval(buffer, within, dot)?;
                        (r.end >= l.start).then(|| Range::new(l.start, r.end))
                    }
                    CompoundOp::Semicolon => {
                        let r = right.eval(buffer, Range::new(l.end, within.end), dot)?;
                        Some(Range::new(l.start, r.end))
                    }
                }
            }
        }
    }
}

/// The `n`th line of `within`, counting from 1, with its newline.
fn line(buffer: &Buffer, within: Range, n: usize) -> Option<Range> {
    if n == 0 {
        return Some(Range::point(within.start));
    }
    let mut line = 1;
    let mut line_start = within.start;
    for (i, c) in buffer.chars(within).enumerate() {
        if c != '\n' {
            continue;
        }
        let end = within.start + i + 1;
        if line == n {
            return Some(Range::new(line_start, end));
        }
        line += 1;
        line_start = end;
    }
    // a final line without a newline; nothing follows a trailing newline
    (line == n && (line_start < within.end || n == 1)).then(|| Range::new(line_start, within.end))
}

fn first_match(regex: &Regex, buffer: &Buffer, within: Range) -> Option<Range> {
    let text = buffer.text(within);
    let m = regex.find(&text)?;
    Some(RuneCursor::new(&text).range(m.start(), m.end(), within.start))
}
