//! Docsmith CLI
//!
//! Command-line interface for Docsmith - structured design documents,
//! filled in field by field and exported as Markdown.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use docsmith_core::{Config, FieldEdit, Workspace};

mod commands;
mod editor;
mod logging;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(about = "Docsmith - fill in design document templates and export Markdown")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// List document templates
    Templates,
    /// Switch the active template
    Use {
        /// Template id (e.g. prd, hld, dbdd)
        id: String,
    },
    /// Show the active template's record
    Show {
        /// Show another template instead of the active one
        #[arg(short, long)]
        template: Option<String>,
    },
    /// Set a text field (opens $EDITOR when no value is given)
    Set {
        /// Field name (e.g. systemName)
        field: String,
        /// New value
        value: Option<String>,
    },
    /// Edit table rows
    Row {
        #[command(subcommand)]
        command: RowCommands,
    },
    /// Edit text list items
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Edit rows of a table-name-keyed section (dbdd tableFields)
    Section {
        #[command(subcommand)]
        command: SectionCommands,
    },
    /// Mark the active template as saved
    Save,
    /// Export the active template as Markdown
    Export {
        /// Output directory (defaults to {data_dir}/exports)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Print the document instead of writing a file
        #[arg(long, conflicts_with = "out")]
        stdout: bool,
    },
    /// Reset the active template (or every template) to defaults
    Reset {
        /// Reset every template and the active selection
        #[arg(long, conflicts_with = "template")]
        all: bool,
        /// Reset this template instead of the active one
        #[arg(short, long)]
        template: Option<String>,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Show status (active template, saved state, storage)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Interactive session; changes are written in the background
    Shell,
}

#[derive(Subcommand, Clone)]
enum RowCommands {
    /// Append an empty row
    #[command(alias = "create")]
    Add {
        /// Table field (e.g. userStories)
        field: String,
    },
    /// Remove a row
    #[command(alias = "delete")]
    Rm {
        field: String,
        /// Row index (as shown by `show`)
        index: usize,
    },
    /// Set one cell
    Set {
        field: String,
        index: usize,
        column: String,
        value: String,
    },
}

#[derive(Subcommand, Clone)]
enum ItemCommands {
    /// Append an item
    #[command(alias = "create")]
    Add {
        /// List field (e.g. inScope)
        field: String,
        #[arg(default_value = "")]
        value: String,
    },
    /// Remove an item
    #[command(alias = "delete")]
    Rm { field: String, index: usize },
    /// Replace an item
    Set {
        field: String,
        index: usize,
        value: String,
    },
}

#[derive(Subcommand, Clone)]
enum SectionCommands {
    /// Append an empty row to a section, creating the section if needed
    #[command(alias = "create")]
    Add {
        /// Keyed field (e.g. tableFields)
        field: String,
        /// Section key (e.g. a table name)
        section: String,
    },
    /// Remove a row from a section
    #[command(alias = "delete")]
    Rm {
        field: String,
        section: String,
        index: usize,
    },
    /// Set one cell of a section row
    Set {
        field: String,
        section: String,
        index: usize,
        column: String,
        value: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, persist_debounce_ms, default_template)
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Whether a command may stop and ask on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Allowed,
    Disabled,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't need the workspace
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    logging::init(&config);

    // Status is the default when no command is given
    match cli.command.unwrap_or(Commands::Status) {
        Commands::Shell => commands::shell::run(&config, &output).await,
        command => {
            let mut workspace = Workspace::open(&config).context("Failed to open workspace")?;
            run_command(command, &mut workspace, &config, &output, Prompt::Allowed)
        }
    }
}

/// Run one workspace command (shared by one-shot invocations and the shell)
fn run_command(
    command: Commands,
    workspace: &mut Workspace,
    config: &Config,
    output: &Output,
    prompt: Prompt,
) -> Result<()> {
    match command {
        Commands::Templates => commands::templates::list(workspace, output),
        Commands::Use { id } => commands::templates::activate(workspace, id, output),
        Commands::Show { template } => commands::edit::show(workspace, template, output),
        Commands::Set { field, value } => {
            commands::edit::set(workspace, field, value, prompt, output)
        }
        Commands::Row { command } => commands::edit::apply(workspace, row_edit(command), output),
        Commands::Item { command } => {
            commands::edit::apply(workspace, item_edit(command), output)
        }
        Commands::Section { command } => {
            commands::edit::apply(workspace, section_edit(command), output)
        }
        Commands::Save => commands::export::save(workspace, output),
        Commands::Export { out, stdout } => {
            commands::export::export(workspace, config, out, stdout, output)
        }
        Commands::Reset {
            all,
            template,
            yes,
        } => commands::reset::reset(workspace, all, template, yes, prompt, output),
        Commands::Status => commands::status::show(workspace, config, output),
        Commands::Config { .. } | Commands::Shell => {
            bail!("This command is not available inside the shell")
        }
    }
}

fn row_edit(command: RowCommands) -> FieldEdit {
    match command {
        RowCommands::Add { field } => FieldEdit::AddRow { field },
        RowCommands::Rm { field, index } => FieldEdit::RemoveRow { field, index },
        RowCommands::Set {
            field,
            index,
            column,
            value,
        } => FieldEdit::SetCell {
            field,
            index,
            column,
            value,
        },
    }
}

fn item_edit(command: ItemCommands) -> FieldEdit {
    match command {
        ItemCommands::Add { field, value } => FieldEdit::AddItem { field, value },
        ItemCommands::Rm { field, index } => FieldEdit::RemoveItem { field, index },
        ItemCommands::Set {
            field,
            index,
            value,
        } => FieldEdit::SetItem {
            field,
            index,
            value,
        },
    }
}

fn section_edit(command: SectionCommands) -> FieldEdit {
    match command {
        SectionCommands::Add { field, section } => FieldEdit::AddSectionRow { field, section },
        SectionCommands::Rm {
            field,
            section,
            index,
        } => FieldEdit::RemoveSectionRow {
            field,
            section,
            index,
        },
        SectionCommands::Set {
            field,
            section,
            index,
            column,
            value,
        } => FieldEdit::SetSectionCell {
            field,
            section,
            index,
            column,
            value,
        },
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["docsmith", "--json"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.json);
    }

    #[test]
    fn test_parse_row_set() {
        let cli =
            Cli::try_parse_from(["docsmith", "row", "set", "userStories", "0", "role", "Shopper"])
                .unwrap();
        let Some(Commands::Row { command }) = cli.command else {
            panic!("expected row command");
        };
        assert_eq!(
            row_edit(command),
            FieldEdit::SetCell {
                field: "userStories".to_string(),
                index: 0,
                column: "role".to_string(),
                value: "Shopper".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_section_add() {
        let cli = Cli::try_parse_from(["docsmith", "section", "add", "tableFields", "orders"])
            .unwrap();
        let Some(Commands::Section { command }) = cli.command else {
            panic!("expected section command");
        };
        assert_eq!(
            section_edit(command),
            FieldEdit::AddSectionRow {
                field: "tableFields".to_string(),
                section: "orders".to_string(),
            }
        );
    }

    #[test]
    fn test_item_add_defaults_to_empty_value() {
        let cli = Cli::try_parse_from(["docsmith", "item", "add", "inScope"]).unwrap();
        let Some(Commands::Item { command }) = cli.command else {
            panic!("expected item command");
        };
        assert_eq!(
            item_edit(command),
            FieldEdit::AddItem {
                field: "inScope".to_string(),
                value: String::new(),
            }
        );
    }

    #[test]
    fn test_reset_all_conflicts_with_template() {
        assert!(Cli::try_parse_from(["docsmith", "reset", "--all", "--template", "prd"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["docsmith", "status", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
