//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::fmt::Write as _;

use serde_json::Value;

use docsmith_core::{
    template, Config, DocumentRecord, ExportOutcome, PersistResult, StatusReport, TemplateId,
    CATALOG,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print the template catalog
    pub fn print_templates(&self, active: &TemplateId, saved: &[&TemplateId]) {
        let is_saved = |id: &str| saved.iter().any(|s| s.as_str() == id);

        match self.format {
            OutputFormat::Human => {
                for info in CATALOG {
                    let marker = if info.id == active.as_str() { "*" } else { " " };
                    let badge = if !info.is_available() {
                        " (coming soon)"
                    } else if is_saved(info.id) {
                        " [saved]"
                    } else {
                        ""
                    };
                    println!(
                        "{} {:<12} {:<12} {}{}",
                        marker, info.id, info.name, info.description, badge
                    );
                }
            }
            OutputFormat::Json => {
                let templates: Vec<Value> = CATALOG
                    .iter()
                    .map(|info| {
                        serde_json::json!({
                            "id": info.id,
                            "name": info.name,
                            "description": info.description,
                            "status": info.status,
                            "active": info.id == active.as_str(),
                            "saved": is_saved(info.id),
                        })
                    })
                    .collect();
                print_json(&Value::Array(templates));
            }
            OutputFormat::Quiet => {
                for info in CATALOG.iter().filter(|info| info.is_available()) {
                    println!("{}", info.id);
                }
            }
        }
    }

    /// Print one template's record
    pub fn print_record(&self, id: &TemplateId, record: &DocumentRecord, saved: bool) {
        match self.format {
            OutputFormat::Human => {
                let name = template::lookup(id).map(|info| info.name).unwrap_or("custom");
                println!("Template: {} ({})", id, name);
                println!("Stored:   {}", if saved { "yes" } else { "no (defaults)" });
                println!();
                print!("{}", render_record(record));
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "template": id,
                    "saved": saved,
                    "record": record,
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", record.as_value());
            }
        }
    }

    /// Print the status report
    pub fn print_status(&self, report: &StatusReport, config: &Config) {
        match self.format {
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "status": report,
                    "data_dir": config.data_dir,
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", report.active_template);
            }
            OutputFormat::Human => {
                let name = template::lookup(&report.active_template)
                    .map(|info| info.description)
                    .unwrap_or("custom template");
                println!("Docsmith Status");
                println!("===============");
                println!();
                println!("Template: {} ({})", report.active_template, name);
                println!("Data:     {}", report.data_status.label());
                println!("Storage:  {}", report.storage.label());
                if let docsmith_core::StorageStatus::Unavailable { reason, hint } = &report.storage
                {
                    println!("          {}", reason);
                    if let Some(hint) = hint {
                        println!("          {}", hint);
                    }
                }
                println!();
                println!("Location: {}", config.data_dir.display());
            }
        }
    }

    /// Print where an export landed
    pub fn print_export(&self, outcome: &ExportOutcome) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Exported {} to {} ({} bytes)",
                    outcome.template,
                    outcome.path.display(),
                    outcome.bytes
                );
            }
            OutputFormat::Json => {
                print_json(&serde_json::json!({
                    "template": outcome.template,
                    "path": outcome.path,
                    "bytes": outcome.bytes,
                    "persisted": outcome.persist.is_success(),
                }));
            }
            OutputFormat::Quiet => {
                println!("{}", outcome.path.display());
            }
        }
    }

    /// Warn when a mirror write failed; the edit itself still applies
    pub fn warn_persist(&self, result: &PersistResult) {
        if let PersistResult::Failure { reason, hint } = result {
            if !self.is_quiet() {
                eprintln!("⚠ Changes not persisted: {}", reason);
                if let Some(hint) = hint {
                    eprintln!("  {}", hint);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json(value: &Value) {
    println!("{:#}", value);
}

/// Human view of a record: one block per field, rows on one line each
pub fn render_record(record: &DocumentRecord) -> String {
    let mut out = String::new();
    let Some(fields) = record.fields() else {
        let _ = writeln!(out, "{}", record.as_value());
        return out;
    };

    for (name, value) in fields {
        match value {
            Value::String(text) if !text.contains('\n') => {
                let _ = writeln!(out, "{}: {}", name, text);
            }
            Value::String(text) => {
                let _ = writeln!(out, "{}:", name);
                for line in text.lines() {
                    let _ = writeln!(out, "    {}", line);
                }
            }
            Value::Array(items) => {
                let _ = writeln!(out, "{}:", name);
                write_items(&mut out, items, "  ");
            }
            Value::Object(sections) => {
                let _ = writeln!(out, "{}:", name);
                if sections.is_empty() {
                    let _ = writeln!(out, "  (none)");
                }
                for (section, rows) in sections {
                    let _ = writeln!(out, "  {}:", section);
                    if let Value::Array(rows) = rows {
                        write_items(&mut out, rows, "    ");
                    }
                }
            }
            other => {
                let _ = writeln!(out, "{}: {}", name, other);
            }
        }
    }
    out
}

fn write_items(out: &mut String, items: &[Value], indent: &str) {
    if items.is_empty() {
        let _ = writeln!(out, "{}(none)", indent);
    }
    for (index, item) in items.iter().enumerate() {
        let text = match item {
            Value::String(text) => truncate_line(text, 70),
            Value::Object(cells) => cells
                .iter()
                .map(|(column, cell)| {
                    let cell = cell.as_str().unwrap_or_default();
                    format!("{}={}", column, truncate_line(cell, 30))
                })
                .collect::<Vec<_>>()
                .join(" | "),
            other => other.to_string(),
        };
        let _ = writeln!(out, "{}[{}] {}", indent, index, text);
    }
}

/// Truncate a string to max length (in characters), adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    if first_line.len() < s.trim_end().len() {
        truncate(&format!("{} ...", first_line), max_len)
    } else {
        truncate(first_line, max_len)
    }
}
