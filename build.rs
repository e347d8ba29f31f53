//! Generates the vrog manual pages from the clap definitions in `src/cli.rs`.
//!
//! `vrog.1` covers the whole interface and each subcommand gets its own
//! `vrog-<subcommand>.1` page.

use clap::{Command, CommandFactory};
use clap_mangen::Man;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

#[path = "src/cli.rs"]
#[expect(
    dead_code,
    reason = "Only type definitions are needed for man page generation"
)]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn render(cmd: Command, title: &str, dir: &Path) -> io::Result<()> {
    let mut buf = Vec::new();
    Man::new(cmd).title(title).render(&mut buf)?;
    fs::write(dir.join(format!("{title}.1")), buf)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_DESCRIPTION");

    let dir = PathBuf::from(MAN_DIR);
    if dir.exists() {
        fs::remove_dir_all(&dir)?;
    }
    fs::create_dir_all(&dir)?;

    let cmd = cli::Cli::command();
    let package = env::var("CARGO_PKG_NAME")?;
    if cmd.get_name() != package {
        return Err(format!(
            "CLI name '{}' differs from package name '{package}'",
            cmd.get_name()
        )
        .into());
    }
    for sub in cmd.get_subcommands().filter(|sub| !sub.is_hide_set()) {
        let title = format!("{package}-{}", sub.get_name());
        render(sub.clone(), &title, &dir)?;
    }
    render(cmd, &package, &dir)?;
    Ok(())
}
