//! Interactive shell
//!
//! Reads one command per line and runs it against a single open workspace.
//! Mirror writes go through the debounced background writer, so bursts of
//! edits collapse into one write; the last snapshot is flushed on exit.

use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use docsmith_core::{Config, MirrorWriter, PersistResult, Workspace};

use crate::editor;
use crate::output::Output;
use crate::{run_command, Commands, Prompt};

/// One shell line, parsed with the regular command set
#[derive(Parser)]
#[command(name = "docsmith>", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: Commands,
}

/// Run the shell until `exit` or end of input
pub async fn run(config: &Config, output: &Output) -> Result<()> {
    let workspace = Workspace::open(config).context("Failed to open workspace")?;
    let writer = MirrorWriter::spawn(workspace.bridge().clone(), config.persist_debounce());
    let mut workspace = workspace.with_writer(writer);
    workspace.check_storage();

    let interactive = output.should_prompt() && editor::is_interactive();
    if interactive {
        println!(
            "docsmith shell - active template: {} (type 'help' or 'exit')",
            workspace.active_template()
        );
    }
    info!("Shell started");

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        if interactive {
            print!("{}> ", workspace.active_template());
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if matches!(line, "exit" | "quit") {
            break;
        }

        let words = match split_words(line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                continue;
            }
        };

        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Also covers `help`, which clap reports as an "error"
                let _ = e.print();
                continue;
            }
        };

        debug!("Shell command: {}", line);
        if let Err(e) = run_command(
            parsed.command,
            &mut workspace,
            config,
            output,
            Prompt::Disabled,
        ) {
            eprintln!("Error: {:#}", e);
        }
    }

    match workspace.close().await {
        Some(result @ PersistResult::Failure { .. }) => output.warn_persist(&result),
        Some(PersistResult::Success) => debug!("Final snapshot written"),
        None => {}
    }
    info!("Shell closed");

    Ok(())
}

/// Split a line into words
///
/// Whitespace separates words. Single quotes keep their content verbatim;
/// inside double quotes and bare words a backslash escapes the next char.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => bail!("Unterminated single quote"),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c) => current.push(c),
                            None => bail!("Unterminated double quote"),
                        },
                        Some(c) => current.push(c),
                        None => bail!("Unterminated double quote"),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}
