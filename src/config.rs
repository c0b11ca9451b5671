//! Settings for compiling and running a command.

use std::fmt;

use crate::trace::{Silent, Tracer};

/// Interpreter settings. `Default` is unbounded, with no dot and no tracing.
pub struct Config {
    /// Bound on token inspections in the parser; `None` derives one from the
    /// command length.
    pub match_limit: Option<usize>,
    /// Most regex matches a single stage may collect over all its ranges.
    pub max_matches: Option<usize>,
    /// Position for the `.` address.
    pub dot: Option<usize>,
    pub tracer: Box<dyn Tracer>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            match_limit: None,
            max_matches: None,
            dot: None,
            tracer: Box::new(Silent),
        }
    }
}

impl Config {
    pub fn with_match_limit(mut self, limit: usize) -> Self {
        self.match_limit = Some(limit);
        self
    }

    pub fn with_max_matches(mut self, max: usize) -> Self {
        self.max_matches = Some(max);
        self
    }

    pub fn with_dot(mut self, dot: usize) -> Self {
        self.dot = Some(dot);
        self
    }

    pub fn with_tracer(mut self, tracer: impl Tracer + 'static) -> Self {
        self.tracer = Box::new(tracer);
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("match_limit", &self.match_limit)
            .field("max_matches", &self.max_matches)
            .field("dot", &self.dot)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Logged;

    #[test]
    fn builders_set_fields() {
        let config = Config::default()
            .with_match_limit(10)
            .with_max_matches(100)
            .with_dot(4)
            .with_tracer(Logged);
        assert_eq!(config.match_limit, Some(10));
        assert_eq!(config.max_matches, Some(100));
        assert_eq!(config.dot, Some(4));
    }

    #[test]
    fn default_is_unbounded() {
        let config = Config::default();
        assert!(config.match_limit.is_none());
        assert!(config.max_matches.is_none());
        assert!(config.dot.is_none());
    }
}
