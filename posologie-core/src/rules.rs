//! Ordered, first-match-wins rule tables shared by the extractors.

use regex::Regex;

/// One entry of a rule table. `apply` returns `None` to let the next entry run.
pub(crate) struct Rule<C: ?Sized, T> {
    pub name: &'static str,
    pub apply: fn(&str, &C) -> Option<T>,
}

/// Evaluate `rules` in order and return the first non-empty result.
pub(crate) fn first_match<C: ?Sized, T>(
    table: &'static str,
    rules: &[Rule<C, T>],
    line: &str,
    ctx: &C,
) -> Option<T> {
    rules.iter().find_map(|rule| {
        let hit = (rule.apply)(line, ctx);
        if hit.is_some() {
            tracing::trace!(table = table, rule = rule.name, "rule matched");
        }
        hit
    })
}

pub(crate) fn names<C: ?Sized, T>(rules: &[Rule<C, T>]) -> Vec<&'static str> {
    rules.iter().map(|rule| rule.name).collect()
}

/// Compile a pattern from a static rule table.
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid rule pattern - this is a bug")
}
