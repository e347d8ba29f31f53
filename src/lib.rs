//! Vrog core library.
//!
//! Vrog is a small build engine: targets are registered with the rule that
//! produces them, and [`Engine::build`] runs only the tasks whose targets are
//! missing or older than their prerequisites, in dependency order. Rule
//! variants cover compiling C sources, linking objects and cleaning up; the
//! [`manifest`] module reads a YAML `Vrogfile` describing a project.

pub mod cli;
pub mod context;
pub mod engine;
pub mod error;
pub mod fs;
pub mod graph;
pub mod manifest;
pub mod process;
pub mod report;
pub mod rules;
pub mod runner;

pub use context::BuildContext;
pub use engine::Engine;
pub use error::{BuildError, CommandError};
