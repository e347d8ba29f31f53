//! DOT rendering of the registered dependency graph.
//!
//! Registered targets are drawn as boxes labelled with their rule kind;
//! leaves (names with no rule) are drawn as plain ellipses.
//!
//! # Examples
//!
//! ```
//! use vrog::{Engine, graph::render_dot};
//! use vrog::rules::TaskRule;
//!
//! let mut engine = Engine::default();
//! engine.register("all", TaskRule::aggregate(["a.c"])?)?;
//! let dot = render_dot(&engine);
//! assert!(dot.contains("\"all\" -> \"a.c\";"));
//! # Ok::<(), vrog::BuildError>(())
//! ```

use std::fmt::Write as _;

use indexmap::IndexSet;

use crate::engine::Engine;

/// Render `engine`'s rules as a Graphviz digraph.
#[must_use]
pub fn render_dot(engine: &Engine) -> String {
    let mut dot = String::from("digraph vrog {\n");
    let mut leaves = IndexSet::new();
    for (target, rule) in engine.rules() {
        // Writing to a String cannot fail.
        drop(writeln!(
            dot,
            "  {} [shape=box, label=\"{} ({})\"];",
            quote(target),
            escape(target),
            rule.kind()
        ));
        for dep in rule.prerequisites() {
            if engine.lookup(dep).is_none() {
                leaves.insert(dep.as_str());
            }
        }
    }
    for leaf in &leaves {
        drop(writeln!(dot, "  {};", quote(leaf)));
    }
    for (target, rule) in engine.rules() {
        for dep in rule.prerequisites() {
            drop(writeln!(dot, "  {} -> {};", quote(target), quote(dep)));
        }
    }
    dot.push_str("}\n");
    dot
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

fn quote(name: &str) -> String {
    format!("\"{}\"", escape(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{CleanRule, LinkRule, LinkerConfig, TaskRule};

    #[test]
    fn renders_rules_leaves_and_edges() {
        let mut engine = Engine::default();
        engine
            .register(
                "app",
                LinkRule::new(["a.c.o"], LinkerConfig::default()).expect("link"),
            )
            .expect("register");
        engine
            .register("a.c.o", TaskRule::aggregate(["a.c", "a.h"]).expect("rule"))
            .expect("register");
        engine
            .register("clean", CleanRule::new(["app", "a.c.o"]).expect("clean"))
            .expect("register");

        insta::assert_snapshot!(render_dot(&engine), @r#"
        digraph vrog {
          "app" [shape=box, label="app (link)"];
          "a.c.o" [shape=box, label="a.c.o (task)"];
          "clean" [shape=box, label="clean (clean)"];
          "a.c";
          "a.h";
          "app" -> "a.c.o";
          "a.c.o" -> "a.c";
          "a.c.o" -> "a.h";
        }
        "#);
    }

    #[test]
    fn escapes_quotes_in_names() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
