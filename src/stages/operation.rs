use regex::Regex;

use super::build_regex;
use crate::ast::{Operation, OperationKind};
use crate::error::{Error, Result};
use crate::interpreter::{Context, MatchBudget, Select};
use crate::range::{Range, RuneCursor, invert_ranges};

/// `x y z g v n`: looping and filtering over the text of each range.
pub struct OperationStage {
    kind: OperationKind,
    regex: Regex,
    /// Openers and closers for `n`.
    nest: Option<Nest>,
    label: String,
}

/// Whole-token matchers for `n`.
struct Nest {
    openers: Regex,
    closers: Regex,
}

impl OperationStage {
    pub fn compile(op: &Operation) -> Result<Self> {
        let label = op.to_string();
        if op.op != OperationKind::Nest {
            return Ok(Self {
                kind: op.op,
                regex: build_regex(&op.pattern)?,
                nest: None,
                label,
            });
        }
        let (Some(openers), Some(closers)) =
            (alternation(&op.args[0]), alternation(&op.args[1]))
        else {
            return Err(Error::runtime(format!(
                "{} needs at least one opener and one closer",
                label
            )));
        };
        Ok(Self {
            kind: op.op,
            regex: build_regex(&format!("{}|{}", openers, closers))?,
            nest: Some(Nest {
                openers: build_regex(&format!(r"\A(?:{})\z", openers))?,
                closers: build_regex(&format!(r"\A(?:{})\z", closers))?,
            }),
            label,
        })
    }

    /// Every match in `text`, as rune ranges offset by `base`.
    fn matches(&self, text: &str, base: usize, budget: &mut MatchBudget) -> Result<Vec<Range>> {
        let mut cursor = RuneCursor::new(text);
        let mut found = Vec::new();
        for m in self.regex.find_iter(text) {
            budget.take()?;
            found.push(cursor.range(m.start(), m.end(), base));
        }
        Ok(found)
    }
}

impl Nest {
    /// The first balanced span in `text`. `tokens` finds openers and
    /// closers alike; a token that could be either closes when open.
    fn first_span(
        &self,
        tokens: &Regex,
        text: &str,
        base: usize,
        budget: &mut MatchBudget,
    ) -> Result<Option<Range>> {
        let mut cursor = RuneCursor::new(text);
        let mut depth = 0usize;
        let mut start = 0;
        for m in tokens.find_iter(text) {
            budget.take()?;
            let token = m.as_str();
            if depth > 0 && self.closers.is_match(token) {
                depth -= 1;
                if depth == 0 {
                    return Ok(Some(cursor.range(start, m.end(), base)));
                }
            } else if self.openers.is_match(token) {
                if depth == 0 {
                    start = m.start();
                }
                depth += 1;
            }
        }
        Ok(None)
    }
}

/// Join a comma-separated list into one alternation. An entry that is not
/// a valid pattern on its own, such as `{` or `(`, matches literally.
fn alternation(list: &str) -> Option<String> {
    let entries: Vec<String> = list
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|entry| match Regex::new(entry) {
            Ok(_) => format!("(?:{})", entry),
            Err(_) => regex::escape(entry),
        })
        .collect();
    (!entries.is_empty()).then(|| entries.join("|"))
}

impl Select for OperationStage {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn select(&self, ctx: &Context, ranges: Vec<Range>) -> Result<Vec<Range>> {
        let mut budget = ctx.budget(&self.label);
        let mut out = Vec::new();
        for r in ranges {
            let text = ctx.buffer().text(r);
            match self.kind {
                OperationKind::Extract => out.extend(self.matches(&text, r.start, &mut budget)?),
                OperationKind::Between => {
                    let matches = self.matches(&text, r.start, &mut budget)?;
                    out.extend(invert_ranges(&matches, r.start, r.end));
                }
                OperationKind::Segment => {
                    let matches = self.matches(&text, r.start, &mut budget)?;
                    let ends = matches.iter().skip(1).map(|m| m.start).chain([r.end]);
                    out.extend(matches.iter().zip(ends).map(|(m, end)| Range::new(m.start, end)));
                }
                OperationKind::Guard => {
                    if self.regex.is_match(&text) {
                        out.push(r);
                    }
                }
                OperationKind::Exclude => {
                    if !self.regex.is_match(&text) {
                        out.push(r);
                    }
                }
                OperationKind::Nest => {
                    if let Some(nest) = &self.nest {
                        out.extend(nest.first_span(&self.regex, &text, r.start, &mut budget)?);
                    }
                }
            }
        }
        Ok(out)
    }
}
