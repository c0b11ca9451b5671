use crate::error::Result;
use crate::interpreter::{Context, Select};
use crate::range::{Range, union_of_ranges};

/// `{ ... }`: every inner term runs on the same input, and the results are
/// merged.
pub struct GroupStage {
    terms: Vec<Box<dyn Select>>,
}

impl GroupStage {
    pub fn new(terms: Vec<Box<dyn Select>>) -> Self {
        Self { terms }
    }
}

impl Select for GroupStage {
    fn label(&self) -> String {
        let inner: Vec<String> = self.terms.iter().map(|t| t.label()).collect();
        format!("{{{}}}", inner.join(" "))
    }

    fn select(&self, ctx: &Context, ranges: Vec<Range>) -> Result<Vec<Range>> {
        let mut selected = Vec::new();
        for term in &self.terms {
            selected.extend(term.select(ctx, ranges.clone())?);
        }
        Ok(union_of_ranges(selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::handler::Recorder;
    use crate::trace::Silent;

    /// Selects fixed ranges regardless of input.
    struct Fixed(Vec<Range>);

    impl Select for Fixed {
        fn label(&self) -> String {
            "fixed".to_string()
        }

        fn select(&self, _ctx: &Context, _ranges: Vec<Range>) -> Result<Vec<Range>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn union_of_inner_results() {
        let group = GroupStage::new(vec![
            Box::new(Fixed(vec![Range::new(1, 5), Range::new(10, 15)])),
            Box::new(Fixed(vec![Range::new(2, 6), Range::new(20, 21)])),
        ]);
        let mut rec = Recorder::new();
        let ctx = Context::new(Buffer::from_text(""), &mut rec, &Silent);
        let out = group.select(&ctx, vec![Range::new(0, 30)]).unwrap();
        assert_eq!(
            out,
            vec![Range::new(1, 6), Range::new(10, 15), Range::new(20, 21)]
        );
        assert_eq!(group.label(), "{fixed fixed}");
    }

    #[test]
    fn empty_group_selects_nothing() {
        let group = GroupStage::new(Vec::new());
        let mut rec = Recorder::new();
        let ctx = Context::new(Buffer::from_text("abc"), &mut rec, &Silent);
        assert!(group.select(&ctx, vec![Range::new(0, 3)]).unwrap().is_empty());
    }
}
