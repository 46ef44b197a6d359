//! Top-level CLI argument parsing and the script-file driver.

use std::path::{Path, PathBuf};
use std::str::SplitWhitespace;

use anyhow::{bail, Context, Result};
use clap::Parser;
use corelib::LoadBalancer;

use crate::commands::Command;

/// Drive a consistent-hashing key-value store from the command line or from
/// a line-oriented script file.
///
/// Exactly one of a subcommand or `--script` is expected; this binary's
/// grammar and output are a demo convenience, not a normative interface.
#[derive(Debug, Parser)]
#[command(name = "consistent-hash-rs", version, about)]
pub struct CliConfig {
    #[command(subcommand)]
    command: Option<Command>,

    /// Run every command in this file instead of (or before) `command`.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Increase log verbosity; repeat for more (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl CliConfig {
    pub fn run(self) -> Result<()> {
        self.init_logging();
        let mut lb = LoadBalancer::new();

        if let Some(path) = &self.script {
            run_script(path, &mut lb)?;
        }
        if let Some(command) = &self.command {
            command.execute(&mut lb)?;
        }
        if self.script.is_none() && self.command.is_none() {
            bail!("no command given: pass a subcommand or --script <file>");
        }
        Ok(())
    }

    fn init_logging(&self) {
        let level = match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };
        let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
    }
}

fn run_script(path: &Path, lb: &mut LoadBalancer) -> Result<()> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = parse_script_line(line)
            .with_context(|| format!("{}:{}: invalid command", path.display(), lineno + 1))?;
        command.execute(lb)?;
    }
    Ok(())
}

fn parse_script_line(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let op = words.next().context("empty command")?;
    match op {
        "add-server" => Ok(Command::AddServer { id: parse_next(&mut words, "id")? }),
        "remove-server" => Ok(Command::RemoveServer { id: parse_next(&mut words, "id")? }),
        "store" => {
            let key = words.next().context("missing key")?.to_string();
            let value = words.next().context("missing value")?.to_string();
            Ok(Command::Store { key, value })
        }
        "retrieve" => Ok(Command::Retrieve { key: words.next().context("missing key")?.to_string() }),
        other => bail!("unknown command {other:?}"),
    }
}

fn parse_next(words: &mut SplitWhitespace<'_>, what: &str) -> Result<u32> {
    words.next().with_context(|| format!("missing {what}"))?.parse().with_context(|| format!("invalid {what}"))
}
