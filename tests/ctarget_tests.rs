//! Compile, link and clean scenarios driven through a recording runner.

use anyhow::{Result, bail, ensure};
use rstest::{fixture, rstest};
use test_support::Harness;
use vrog::engine::CLEAN_TARGET;
use vrog::rules::{CompileRule, CompilerConfig, LinkerConfig, RuleKind};
use vrog::{BuildError, Engine};

struct Project {
    harness: Harness,
    engine: Engine,
}

#[fixture]
fn project() -> Project {
    let harness = Harness::new();
    harness.fs.touch("a.h");
    harness.fs.touch("a.c");
    harness.fs.touch("b.c");
    harness.runner.set_dependencies("a.c", "a.o: a.c \\\n  a.h\n");
    let engine = Engine::new(harness.context());
    Project { harness, engine }
}

fn compiler() -> CompilerConfig {
    let mut config = CompilerConfig::new("cc");
    config.warnings = vec!["all".to_owned()];
    config
}

impl Project {
    fn add_app(&mut self) -> Result<()> {
        self.engine.add_ctarget(
            "app",
            &["a.c", "b.c"],
            &compiler(),
            &LinkerConfig::new("cc"),
        )?;
        Ok(())
    }

    fn build(&self, target: &str) -> Result<Vec<String>> {
        self.harness.reporter.clear();
        self.harness.runner.clear();
        self.engine.build(target)?;
        Ok(self.harness.reporter.started())
    }
}

#[rstest]
fn add_ctarget_registers_link_and_compile_rules(mut project: Project) -> Result<()> {
    project.add_app()?;
    let rules: Vec<(&str, RuleKind, Vec<String>)> = project
        .engine
        .rules()
        .map(|(name, rule)| (name, rule.kind(), rule.prerequisites().to_vec()))
        .collect();
    ensure!(
        rules
            == [
                ("app", RuleKind::Link, vec!["a.c.o".to_owned(), "b.c.o".to_owned()]),
                ("a.c.o", RuleKind::Compile, vec!["a.c".to_owned(), "a.h".to_owned()]),
                ("b.c.o", RuleKind::Compile, vec!["b.c".to_owned()]),
            ],
        "unexpected rules: {rules:?}"
    );
    Ok(())
}

#[rstest]
fn compile_and_link_then_nothing(mut project: Project) -> Result<()> {
    project.add_app()?;

    let started = project.build("app")?;
    ensure!(
        started == ["a.c.o", "b.c.o", "app"],
        "unexpected tasks: {started:?}"
    );
    let commands = project.harness.runner.commands();
    ensure!(
        commands
            == [
                "cc -Wall -c a.c -o a.c.o",
                "cc -Wall -c b.c -o b.c.o",
                "cc a.c.o b.c.o -o app",
            ],
        "unexpected commands: {commands:?}"
    );

    let again = project.build("app")?;
    ensure!(again.is_empty(), "rerun executed {again:?}");
    ensure!(project.harness.runner.commands().is_empty());
    Ok(())
}

#[rstest]
fn touching_a_header_recompiles_its_source(mut project: Project) -> Result<()> {
    project.add_app()?;
    project.build("app")?;

    project.harness.fs.touch("a.h");
    let started = project.build("app")?;
    ensure!(started == ["a.c.o", "app"], "unexpected tasks: {started:?}");
    Ok(())
}

#[rstest]
fn clean_removes_every_built_file(mut project: Project) -> Result<()> {
    project.add_app()?;
    project.engine.add_clean()?;
    project.build("app")?;

    project.build(CLEAN_TARGET)?;
    let removed = project.harness.reporter.removed();
    ensure!(
        removed == ["app", "a.c.o", "b.c.o"],
        "unexpected removals: {removed:?}"
    );
    for name in ["app", "a.c.o", "b.c.o"] {
        ensure!(!project.harness.fs.exists(name), "{name} still exists");
    }
    for name in ["a.c", "b.c", "a.h"] {
        ensure!(project.harness.fs.exists(name), "{name} was removed");
    }

    let again = project.build(CLEAN_TARGET)?;
    ensure!(again == [CLEAN_TARGET], "second clean ran {again:?}");
    let removed_again = project.harness.reporter.removed();
    ensure!(
        removed_again.is_empty(),
        "second clean removed {removed_again:?}"
    );

    let rebuilt = project.build("app")?;
    ensure!(rebuilt.len() == 3, "clean build reran {rebuilt:?}");
    Ok(())
}

#[rstest]
fn failed_compile_stops_before_link(mut project: Project) -> Result<()> {
    project.add_app()?;
    project.harness.runner.fail_output("b.c.o");

    match project.build("app") {
        Err(err) => match err.downcast::<BuildError>()? {
            BuildError::ExternalCommandFailed {
                target, command, ..
            } => {
                ensure!(target == "b.c.o");
                ensure!(command == "cc -Wall -c b.c -o b.c.o", "{command}");
            }
            other => bail!("unexpected error {other:?}"),
        },
        Ok(started) => bail!("build should fail, ran {started:?}"),
    }
    ensure!(project.harness.fs.exists("a.c.o"), "earlier output is kept");
    ensure!(!project.harness.fs.exists("app"), "link must not run");
    Ok(())
}

#[rstest]
fn failed_extraction_registers_nothing(mut project: Project) -> Result<()> {
    project.harness.runner.fail_output("b.c");
    match project.add_app() {
        Err(err) => ensure!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::ExternalCommandFailed { target, .. }) if target == "b.c"
        )),
        Ok(()) => bail!("extraction should fail"),
    }
    ensure!(project.engine.is_empty(), "registry changed on failure");
    Ok(())
}

#[rstest]
#[case::no_sources("app", &[][..])]
#[case::empty_binary("", &["a.c"][..])]
fn invalid_executables_are_rejected(
    mut project: Project,
    #[case] binary: &str,
    #[case] sources: &[&str],
) {
    let err = project
        .engine
        .add_ctarget(binary, sources, &compiler(), &LinkerConfig::new("cc"))
        .expect_err("invalid executable");
    assert!(matches!(err, BuildError::InvalidArgument { .. }));
}

#[rstest]
fn explicit_prerequisites_skip_extraction(mut project: Project) -> Result<()> {
    let rule = CompileRule::with_prerequisites(
        "a.c",
        compiler(),
        vec!["a.c".to_owned(), "a.h".to_owned()],
    )?;
    project.engine.register("a.c.o", rule)?;
    ensure!(
        project.harness.runner.commands().is_empty(),
        "no extraction expected"
    );

    let started = project.build("a.c.o")?;
    ensure!(started == ["a.c.o"], "unexpected tasks: {started:?}");
    let commands = project.harness.runner.commands();
    ensure!(
        commands == ["cc -Wall -c a.c -o a.c.o"],
        "unexpected commands: {commands:?}"
    );

    project.harness.fs.touch("a.h");
    let rebuilt = project.build("a.c.o")?;
    ensure!(rebuilt == ["a.c.o"], "header change must recompile: {rebuilt:?}");
    Ok(())
}
