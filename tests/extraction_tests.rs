//! Dependency extraction against a mocked command runner.

use anyhow::{Result, bail, ensure};
use mockall::mock;
use vrog::process::{CommandLine, CommandRunner};
use vrog::rules::{CompileRule, CompilerConfig, Rule, extract_dependencies};
use vrog::{BuildError, CommandError};

mock! {
    pub Runner {}
    impl CommandRunner for Runner {
        fn run(&self, command: &CommandLine) -> Result<(), CommandError>;
        fn output(&self, command: &CommandLine) -> Result<String, CommandError>;
    }
}

fn gcc_c11() -> CompilerConfig {
    let mut config = CompilerConfig::new("gcc");
    config.std = Some("c11".to_owned());
    config.optimization = Some("2".to_owned());
    config
}

#[test]
fn included_headers_follow_the_source() -> Result<()> {
    let mut runner = MockRunner::new();
    runner
        .expect_output()
        .withf(|command| {
            command.program() == "gcc" && command.arguments() == ["-MM", "-std=c11", "a.c"]
        })
        .times(1)
        .returning(|_| Ok("a.o: a.c a.h\n".to_owned()));
    runner.expect_run().never();

    let deps = extract_dependencies("a.c", &gcc_c11(), &runner)?;
    ensure!(deps == ["a.c", "a.h"], "unexpected deps {deps:?}");
    Ok(())
}

#[test]
fn compile_rules_extract_once_at_construction() -> Result<()> {
    let mut runner = MockRunner::new();
    runner
        .expect_output()
        .times(1)
        .returning(|_| Ok("main.o: main.c \\\n  util.h config.h\n".to_owned()));

    let rule = CompileRule::new("main.c", gcc_c11(), &runner)?;
    ensure!(rule.prerequisites() == ["main.c", "util.h", "config.h"]);
    ensure!(rule.source() == "main.c");
    Ok(())
}

#[test]
fn compiler_failures_name_the_source_and_command() -> Result<()> {
    let mut runner = MockRunner::new();
    runner.expect_output().returning(|_| {
        Err(CommandError::Exit {
            status: Some(1),
            stderr: "missing.c: No such file or directory".to_owned(),
        })
    });

    match extract_dependencies("missing.c", &gcc_c11(), &runner) {
        Err(BuildError::ExternalCommandFailed {
            target,
            command,
            source: CommandError::Exit { status, .. },
        }) => {
            ensure!(target == "missing.c");
            ensure!(command == "gcc -MM -std=c11 missing.c", "{command}");
            ensure!(status == Some(1));
        }
        other => bail!("unexpected result {other:?}"),
    }
    Ok(())
}

#[test]
fn unparseable_output_is_rejected() -> Result<()> {
    let mut runner = MockRunner::new();
    runner
        .expect_output()
        .returning(|_| Ok("not a make rule\n".to_owned()));

    let result = extract_dependencies("a.c", &gcc_c11(), &runner);
    ensure!(
        matches!(
            result,
            Err(BuildError::ExternalCommandFailed {
                source: CommandError::InvalidOutput { .. },
                ..
            })
        ),
        "unexpected result {result:?}"
    );
    Ok(())
}
