//! Manifests populating an engine backed by the in-memory harness.

use anyhow::{Context, Result, bail, ensure};
use std::fs;
use tempfile::tempdir;
use test_support::Harness;
use vrog::Engine;
use vrog::manifest::{self, ManifestError, populate_with_env};
use vrog::rules::RuleKind;
use vrog_env::COMPILER_ENV;

fn load(harness: &Harness, yaml: &str, cc: Option<&str>) -> Result<Engine, ManifestError> {
    let parsed = manifest::from_str(yaml)?;
    let mut engine = Engine::new(harness.context());
    let compiler = cc.map(str::to_owned);
    populate_with_env(&mut engine, parsed, move |name| {
        (name == COMPILER_ENV).then(|| compiler.clone()).flatten()
    })?;
    Ok(engine)
}

const PROJECT: &str = r#"
vrog_version: "1.0.0"
compiler:
  std: c99
  defines: [NDEBUG]
linker:
  libraries: [m]
executables:
  - name: app
    sources: [main.c]
targets:
  - name: app.tar
    deps: [app, README]
    command: tar cf $out $in
defaults: [app]
"#;

#[test]
fn compiler_program_comes_from_the_environment() -> Result<()> {
    let harness = Harness::new();
    harness.fs.touch("main.c");
    let engine = load(&harness, PROJECT, Some("clang"))?;

    let extraction = harness.runner.commands();
    ensure!(
        extraction == ["clang -MM -std=c99 -DNDEBUG main.c"],
        "unexpected extraction: {extraction:?}"
    );

    harness.runner.clear();
    engine.build("app")?;
    let commands = harness.runner.commands();
    ensure!(
        commands
            == [
                "clang -std=c99 -DNDEBUG -c main.c -o main.c.o",
                "clang -lm main.c.o -o app",
            ],
        "unexpected commands: {commands:?}"
    );
    Ok(())
}

#[test]
fn compiler_falls_back_to_cc() -> Result<()> {
    let harness = Harness::new();
    load(&harness, PROJECT, None)?;
    let extraction = harness.runner.commands();
    ensure!(
        extraction.iter().all(|command| command.starts_with("cc ")),
        "unexpected extraction: {extraction:?}"
    );
    Ok(())
}

#[test]
fn rules_register_in_manifest_order() -> Result<()> {
    let harness = Harness::new();
    let engine = load(&harness, PROJECT, None)?;
    let kinds: Vec<(&str, RuleKind)> = engine
        .rules()
        .map(|(name, rule)| (name, rule.kind()))
        .collect();
    ensure!(
        kinds
            == [
                ("app", RuleKind::Link),
                ("main.c.o", RuleKind::Compile),
                ("app.tar", RuleKind::Task),
                ("clean", RuleKind::Clean),
            ],
        "unexpected rules: {kinds:?}"
    );
    Ok(())
}

#[cfg(unix)]
#[test]
fn target_commands_run_through_the_shell() -> Result<()> {
    let harness = Harness::new();
    let engine = load(&harness, PROJECT, None)?;
    harness.runner.clear();
    // Pretend the binary is already current so only the archive runs.
    harness.fs.touch("main.c");
    harness.fs.touch("main.c.o");
    harness.fs.touch("app");

    engine.build("app.tar")?;
    let commands = harness.runner.commands();
    let [command] = commands.as_slice() else {
        bail!("expected one command, got {commands:?}");
    };
    let words = command
        .strip_prefix("sh -c ")
        .and_then(shlex::split)
        .with_context(|| format!("not a shell command: {command}"))?;
    ensure!(
        words == ["tar", "cf", "app.tar", "app", "README"],
        "unexpected words: {words:?}"
    );
    Ok(())
}

#[test]
fn source_patterns_expand_sorted() -> Result<()> {
    let dir = tempdir().context("tempdir")?;
    for name in ["util.c", "main.c", "notes.md"] {
        fs::write(dir.path().join(name), "").with_context(|| format!("write {name}"))?;
    }
    let root = dir
        .path()
        .to_str()
        .context("utf8 tempdir")?
        .replace('\\', "/");
    let yaml = format!(
        "vrog_version: \"1.0.0\"\nexecutables:\n  - name: app\n    sources: \"{root}/*.c\"\nclean: false\n"
    );

    let harness = Harness::new();
    let engine = load(&harness, &yaml, None)?;
    let objects = engine
        .lookup("app")
        .context("link rule")?
        .prerequisites()
        .to_vec();
    ensure!(
        objects == [format!("{root}/main.c.o"), format!("{root}/util.c.o")],
        "unexpected objects: {objects:?}"
    );
    Ok(())
}

#[test]
fn patterns_matching_nothing_are_errors() -> Result<()> {
    let dir = tempdir().context("tempdir")?;
    let root = dir.path().to_str().context("utf8 tempdir")?;
    let yaml = format!(
        "vrog_version: \"1.0.0\"\nexecutables:\n  - name: app\n    sources: [\"{root}/*.c\"]\n"
    );
    match load(&Harness::new(), &yaml, None) {
        Err(ManifestError::EmptyGlob { pattern }) => {
            ensure!(pattern.ends_with("/*.c"), "{pattern}");
        }
        other => bail!("unexpected result {other:?}"),
    }
    Ok(())
}
