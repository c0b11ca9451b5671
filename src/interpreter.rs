//! Interpreter for the sx command language.
//!
//! A parsed command is compiled into a pipeline of stages. Selecting stages
//! (addresses, operations, groups) turn a range set into a new range set;
//! effect stages (commands) also report edits and displays to a handler.

use crate::ast::{Expr, Term};
use crate::buffer::Buffer;
use crate::config::Config;
use crate::error::{Error, Errors, Result};
use crate::handler::Handler;
use crate::parser;
use crate::range::{Range, sort_ranges};
use crate::stages::{AddressStage, CommandStage, GroupStage, Noop, OperationStage};
use crate::trace::Tracer;

/// A stage that only narrows or rewrites the range set.
pub trait Select {
    /// Source form of the stage, for tracing.
    fn label(&self) -> String;

    fn select(&self, ctx: &Context, ranges: Vec<Range>) -> Result<Vec<Range>>;
}

/// A stage that reports edits or displays for each range.
pub trait Effect {
    fn label(&self) -> String;

    fn apply(&self, ctx: &mut Context, ranges: Vec<Range>) -> Result<Vec<Range>>;
}

pub enum Stage {
    Select(Box<dyn Select>),
    Effect(Box<dyn Effect>),
}

impl Stage {
    pub fn label(&self) -> String {
        match self {
            Stage::Select(s) => s.label(),
            Stage::Effect(e) => e.label(),
        }
    }
}

/// State shared by the stages of one run.
///
/// The buffer is a working copy: every edit reported to the handler is
/// applied to it first, so later stages read the current text.
pub struct Context<'a> {
    buffer: Buffer,
    handler: &'a mut dyn Handler,
    tracer: &'a dyn Tracer,
    dot: Option<usize>,
    max_matches: Option<usize>,
}

impl<'a> Context<'a> {
    pub fn new(buffer: Buffer, handler: &'a mut dyn Handler, tracer: &'a dyn Tracer) -> Self {
        Self {
            buffer,
            handler,
            tracer,
            dot: None,
            max_matches: None,
        }
    }

    pub fn with_dot(mut self, dot: Option<usize>) -> Self {
        self.dot = dot;
        self
    }

    pub fn with_max_matches(mut self, max: Option<usize>) -> Self {
        self.max_matches = max;
        self
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn dot(&self) -> Option<usize> {
        self.dot
    }

    /// A fresh match counter for one stage.
    pub fn budget(&self, label: &str) -> MatchBudget {
        MatchBudget {
            label: label.to_string(),
            limit: self.max_matches,
            used: 0,
        }
    }

    /// Delete `range`. Nothing is reported for an empty range.
    pub fn delete(&mut self, range: Range) -> Result<()> {
        if range.is_empty() {
            return Ok(());
        }
        self.buffer.delete(range)?;
        self.tracer.edit("delete", range, "");
        self.handler.delete(range);
        Ok(())
    }

    /// Insert `text` at `index`. Nothing is reported for empty text.
    pub fn insert(&mut self, index: usize, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.buffer.insert(index, text)?;
        self.tracer.edit("insert", Range::point(index), text);
        self.handler.insert(index, text);
        Ok(())
    }

    pub fn display(&mut self, range: Range) {
        self.handler.display(range);
    }

    pub fn display_contents(&mut self, range: Range, prefix: &str) {
        self.handler.display_contents(range, prefix);
    }

    pub fn noop(&mut self, range: Range) {
        self.handler.noop(range);
    }
}

/// Counts regex matches against the configured bound.
#[derive(Debug)]
pub struct MatchBudget {
    label: String,
    limit: Option<usize>,
    used: usize,
}

impl MatchBudget {
    /// Count one match.
    pub fn take(&mut self) -> Result<()> {
        self.used += 1;
        match self.limit {
            Some(limit) if self.used > limit => Err(Error::runtime(format!(
                "{} found more than {} matches",
                self.label, limit
            ))),
            _ => Ok(()),
        }
    }
}

/// A compiled command, ready to run against any number of buffers.
pub struct Pipeline {
    stages: Vec<Stage>,
    config: Config,
}

impl Pipeline {
    /// Parse and compile `command`.
    pub fn from_command(command: &str, config: Config) -> std::result::Result<Self, Errors> {
        let expr = parser::parse(command, config.match_limit).into_result()?;
        Ok(compile(&expr, config)?)
    }

    pub fn labels(&self) -> Vec<String> {
        self.stages.iter().map(Stage::label).collect()
    }

    /// Run every stage over `buffer`, starting from `ranges`.
    ///
    /// Returns the final range set, in post-edit coordinates. `done` is
    /// called on the handler only if every stage succeeded.
    pub fn execute(
        &self,
        buffer: &[u8],
        ranges: &[Range],
        handler: &mut dyn Handler,
    ) -> Result<Vec<Range>> {
        let buffer = Buffer::from_bytes(buffer);
        let mut ranges: Vec<Range> = ranges.iter().map(|&r| buffer.clamp(r)).collect();
        sort_ranges(&mut ranges);

        let tracer = self.config.tracer.as_ref();
        let mut ctx = Context::new(buffer, handler, tracer)
            .with_dot(self.config.dot)
            .with_max_matches(self.config.max_matches);
        for (index, stage) in self.stages.iter().enumerate() {
            ranges = match stage {
                Stage::Select(s) => s.select(&ctx, ranges)?,
                Stage::Effect(e) => e.apply(&mut ctx, ranges)?,
            };
            sort_ranges(&mut ranges);
            tracer.stage(index, &stage.label(), &ranges);
        }
        ctx.handler.done();
        Ok(ranges)
    }

    /// Run over the whole of `buffer`.
    pub fn execute_all(&self, buffer: &[u8], handler: &mut dyn Handler) -> Result<Vec<Range>> {
        let whole = Buffer::from_bytes(buffer).full();
        self.execute(buffer, &[whole], handler)
    }
}

/// Compile a parsed command into a pipeline.
///
/// Every regex is compiled here, so a bad pattern fails before the handler
/// hears anything.
pub fn compile(expr: &Expr, config: Config) -> Result<Pipeline> {
    let mut stages = expr
        .terms
        .iter()
        .map(|t| compile_term(t).map(Stage::Select))
        .collect::<Result<Vec<_>>>()?;
    for command in &expr.commands {
        stages.push(Stage::Effect(Box::new(CommandStage::compile(command)?)));
    }
    if expr.commands.is_empty() {
        stages.push(Stage::Effect(Box::new(Noop)));
    }
    Ok(Pipeline { stages, config })
}

fn compile_term(term: &Term) -> Result<Box<dyn Select>> {
    Ok(match term {
        Term::Address(addr) => Box::new(AddressStage::compile(addr)?),
        Term::Operation(op) => Box::new(OperationStage::compile(op)?),
        Term::Group(terms) => Box::new(GroupStage::new(
            terms.iter().map(compile_term).collect::<Result<Vec<_>>>()?,
        )),
    })
}
