//! Cycle detection over the rule registry.
//!
//! The walk follows prerequisite names depth first from one target. The
//! current path lives in a call-local ordered set: a name is pushed on entry
//! and popped on exit, so siblings never see each other's path and separate
//! calls never share state. Names proven acyclic are remembered for the
//! duration of one call only.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::rules::Rule;

pub(super) fn find_cycle(
    rules: &IndexMap<String, Box<dyn Rule>>,
    target: &str,
) -> Option<Vec<String>> {
    CycleDetector::new(rules).visit(target)
}

struct CycleDetector<'a> {
    rules: &'a IndexMap<String, Box<dyn Rule>>,
    path: IndexSet<&'a str>,
    acyclic: HashSet<&'a str>,
}

impl<'a> CycleDetector<'a> {
    fn new(rules: &'a IndexMap<String, Box<dyn Rule>>) -> Self {
        Self {
            rules,
            path: IndexSet::new(),
            acyclic: HashSet::new(),
        }
    }

    fn visit(&mut self, node: &str) -> Option<Vec<String>> {
        if let Some(start) = self.path.get_index_of(node) {
            let mut cycle: Vec<String> = self
                .path
                .iter()
                .skip(start)
                .map(|name| (*name).to_owned())
                .collect();
            cycle.push(node.to_owned());
            debug!(?cycle, "dependency cycle found");
            return Some(cycle);
        }
        if self.acyclic.contains(node) {
            return None;
        }
        // Unregistered names are leaves and cannot recurse further.
        let rules = self.rules;
        let (name, rule) = rules.get_key_value(node)?;

        self.path.insert(name.as_str());
        for dep in rule.prerequisites() {
            if let Some(cycle) = self.visit(dep) {
                return Some(cycle);
            }
        }
        self.path.pop();
        self.acyclic.insert(name.as_str());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::TaskRule;

    fn registry(edges: &[(&str, &[&str])]) -> IndexMap<String, Box<dyn Rule>> {
        edges
            .iter()
            .map(|(target, deps)| {
                let rule: Box<dyn Rule> =
                    Box::new(TaskRule::aggregate(deps.iter().copied()).expect("rule"));
                ((*target).to_owned(), rule)
            })
            .collect()
    }

    #[test]
    fn detects_self_edge() {
        let rules = registry(&[("a", &["a"])]);
        assert_eq!(find_cycle(&rules, "a").expect("cycle"), ["a", "a"]);
    }

    #[test]
    fn detects_indirect_cycle_with_path() {
        let rules = registry(&[("a", &["b"]), ("b", &["c"]), ("c", &["b"])]);
        assert_eq!(find_cycle(&rules, "a").expect("cycle"), ["b", "c", "b"]);
    }

    #[test]
    fn unregistered_prerequisites_are_terminals() {
        let rules = registry(&[("a", &["a.c", "b"]), ("b", &["b.c"])]);
        assert!(find_cycle(&rules, "a").is_none());
    }

    #[test]
    fn diamonds_are_not_cycles() {
        let rules = registry(&[
            ("app", &["left", "right"]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("base", &[]),
        ]);
        assert!(find_cycle(&rules, "app").is_none());
    }

    #[test]
    fn separate_calls_do_not_share_paths() {
        let rules = registry(&[("a", &["b"]), ("b", &[])]);
        assert!(find_cycle(&rules, "a").is_none());
        assert!(find_cycle(&rules, "b").is_none());
        assert!(find_cycle(&rules, "a").is_none());
    }

    #[test]
    fn cycle_unreachable_from_target_is_ignored() {
        let rules = registry(&[("a", &[]), ("x", &["y"]), ("y", &["x"])]);
        assert!(find_cycle(&rules, "a").is_none());
        assert!(find_cycle(&rules, "x").is_some());
    }
}
