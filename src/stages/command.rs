use regex::{Captures, Regex};

use super::build_regex;
use crate::ast::{Command, CommandKind};
use crate::error::{Error, Result};
use crate::interpreter::{Context, Effect};
use crate::range::{Range, RuneCursor};

/// Editing and display commands.
///
/// Ranges are processed in order of start. Each edit shifts the ranges after
/// it, so a running offset turns every range into current coordinates before
/// it is reported. The ranges returned are in coordinates after all edits.
pub struct CommandStage {
    kind: CommandKind,
    text: String,
    /// The pattern for `s`.
    regex: Option<Regex>,
    label: String,
}

impl CommandStage {
    pub fn compile(command: &Command) -> Result<Self> {
        let (text, regex) = match command.op {
            CommandKind::Substitute => (
                command.args[1].clone(),
                Some(build_regex(&command.args[0])?),
            ),
            _ => (command.args[0].clone(), None),
        };
        Ok(Self {
            kind: command.op,
            text,
            regex,
            label: command.to_string(),
        })
    }

    fn edits(&self) -> bool {
        !matches!(self.kind, CommandKind::Print | CommandKind::Address)
    }

    /// Replace every match in `range`; returns the range's new extent.
    fn substitute(&self, ctx: &mut Context, regex: &Regex, range: Range) -> Result<Range> {
        let text = ctx.buffer().text(range).into_owned();
        let mut budget = ctx.budget(&self.label);
        let mut cursor = RuneCursor::new(&text);
        let mut delta: isize = 0;
        for caps in regex.captures_iter(&text) {
            budget.take()?;
            let Some(m) = caps.get(0) else { continue };
            let found = cursor.range(m.start(), m.end(), range.start).shifted(delta)?;
            let replacement = expand(&self.text, &caps);
            ctx.delete(found)?;
            ctx.insert(found.start, &replacement)?;
            delta += rune_len(&replacement) - found.len() as isize;
        }
        let end = range.end.checked_add_signed(delta).ok_or_else(|| {
            Error::internal(format!("substitution shrank {} below its start", range))
        })?;
        Ok(Range::new(range.start, end))
    }
}

impl Effect for CommandStage {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn apply(&self, ctx: &mut Context, ranges: Vec<Range>) -> Result<Vec<Range>> {
        let inserted = rune_len(&self.text);
        let mut offset: isize = 0;
        let mut previous_end = 0;
        let mut out = Vec::with_capacity(ranges.len());
        for (i, original) in ranges.into_iter().enumerate() {
            if self.edits() && original.start < previous_end {
                return Err(Error::runtime(format!(
                    "{}: changes not in sequence at {}",
                    self.label, original
                )));
            }
            previous_end = previous_end.max(original.end);

            let r = original.shifted(offset)?;
            let result = match self.kind {
                CommandKind::Delete => {
                    ctx.delete(r)?;
                    Range::point(r.start)
                }
                CommandKind::Insert => {
                    ctx.insert(r.start, &self.text)?;
                    Range::new(r.start, r.start + self.text.chars().count())
                }
                CommandKind::Append => {
                    ctx.insert(r.end, &self.text)?;
                    Range::new(r.end, r.end + self.text.chars().count())
                }
                CommandKind::Change => {
                    ctx.delete(r)?;
                    ctx.insert(r.start, &self.text)?;
                    Range::new(r.start, r.start + self.text.chars().count())
                }
                CommandKind::Substitute => match &self.regex {
                    Some(regex) => self.substitute(ctx, regex, r)?,
                    None => return Err(Error::internal("substitute compiled without a pattern")),
                },
                CommandKind::Print => {
                    let prefix = if i == 0 { "" } else { self.text.as_str() };
                    ctx.display_contents(r, prefix);
                    r
                }
                CommandKind::Address => {
                    ctx.display(r);
                    r
                }
            };
            offset += match self.kind {
                CommandKind::Delete => -(r.len() as isize),
                CommandKind::Insert | CommandKind::Append => inserted,
                CommandKind::Change => inserted - r.len() as isize,
                CommandKind::Substitute => result.len() as isize - r.len() as isize,
                CommandKind::Print | CommandKind::Address => 0,
            };
            out.push(result);
        }
        Ok(out)
    }
}

fn rune_len(text: &str) -> isize {
    text.chars().count() as isize
}

/// Build a replacement: `\N` is capture group N; a group that does not exist
/// or did not take part stays as written, as does a lone trailing `\`.
fn expand(replacement: &str, caps: &Captures) -> String {
    let mut out = String::with_capacity(replacement.len());
    let mut rest = replacement;
    while let Some(i) = rest.find('\\') {
        out.push_str(&rest[..i]);
        let after = &rest[i + 1..];
        let digits = after.len() - after.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            out.push('\\');
            rest = after;
            continue;
        }
        let group = after[..digits]
            .parse::<usize>()
            .ok()
            .and_then(|n| caps.get(n));
        match group {
            Some(m) => out.push_str(m.as_str()),
            None => out.push_str(&rest[i..i + 1 + digits]),
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    out
}
