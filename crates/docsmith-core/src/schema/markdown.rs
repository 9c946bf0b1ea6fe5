//! Small Markdown builder shared by the exporters
//!
//! Output is deterministic: the same record always yields the same bytes.

use crate::record::Row;

/// Text of one cell, "" when the column is missing
pub(crate) fn cell<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

/// Keep table cells on one line and away from the column separator
fn escape_cell(text: &str) -> String {
    text.trim()
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

fn non_blank(items: &[String]) -> impl Iterator<Item = &str> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
}

#[derive(Debug, Default)]
pub(crate) struct Markdown {
    out: String,
}

impl Markdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    pub fn heading(&mut self, level: usize, text: impl AsRef<str>) -> &mut Self {
        self.line(format!("{} {}", "#".repeat(level), text.as_ref()))
            .blank()
    }

    /// Section separator
    pub fn rule(&mut self) -> &mut Self {
        self.line("---").blank()
    }

    /// Free text followed by a blank line
    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        let text = text.trim_end();
        if !text.is_empty() {
            self.line(text);
        }
        self.blank()
    }

    /// Fenced code block
    pub fn code(&mut self, lang: &str, body: &str) -> &mut Self {
        self.line(format!("```{}", lang));
        let body = body.trim_end();
        if !body.is_empty() {
            self.line(body);
        }
        self.line("```").blank()
    }

    /// Header comment block used by the engineering templates
    pub fn banner(&mut self, title: &str, fields: &[(&str, &str)]) -> &mut Self {
        self.line("<!-- =====================================================");
        self.line(title);
        for (label, value) in fields {
            self.line(format!("{}: {}", label, value));
        }
        self.line("===================================================== -->")
            .blank()
    }

    pub fn table<I>(&mut self, headers: &[&str], rows: I) -> &mut Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        self.line(format!("| {} |", headers.join(" | ")));
        self.line(format!("|{}", "---|".repeat(headers.len())));
        for cells in rows {
            let cells: Vec<String> = cells.iter().map(|c| escape_cell(c)).collect();
            self.line(format!("| {} |", cells.join(" | ")));
        }
        self.blank()
    }

    /// Table whose cells are read from rows by column name
    pub fn row_table(&mut self, headers: &[&str], columns: &[&str], rows: &[Row]) -> &mut Self {
        self.table(
            headers,
            rows.iter().map(|row| {
                columns
                    .iter()
                    .map(|column| cell(row, column).to_string())
                    .collect()
            }),
        )
    }

    /// Bullet list of the non-blank items
    pub fn bullets(&mut self, items: &[String]) -> &mut Self {
        for item in non_blank(items) {
            self.line(format!("- {}", item));
        }
        self.blank()
    }

    /// Checkbox list of the non-blank items
    pub fn checklist(&mut self, items: &[String]) -> &mut Self {
        for item in non_blank(items) {
            self.line(format!("- [ ] {}", item));
        }
        self.blank()
    }

    pub fn finish(self) -> String {
        let mut out = self.out;
        let trimmed = out.trim_end_matches('\n').len();
        out.truncate(trimmed);
        out.push('\n');
        out
    }
}
