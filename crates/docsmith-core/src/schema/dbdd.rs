//! Database design document
//!
//! Besides ordinary row lists this template carries `tableFields`, a map
//! from a table name typed by the user to that table's column rows. The
//! data dictionary renders one subsection per declared table, looking its
//! columns up by name.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::markdown::{cell, Markdown};
use super::{file_stem_or, TemplateSchema};
use crate::record::{blank_row, row, Row};
use crate::template::TemplateKind;

/// Name of the keyed section field
pub const TABLE_FIELDS: &str = "tableFields";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DbddRecord {
    pub system_name: String,
    pub module_name: String,
    pub version: String,
    pub author: String,
    pub date: String,
    pub file_path: String,

    pub document_info: Vec<Row>,
    pub change_log: Vec<Row>,
    pub er_diagram: String,
    pub tables: Vec<Row>,
    pub table_fields: BTreeMap<String, Vec<Row>>,
    pub indexes: Vec<Row>,
    pub constraints_rules: String,
    pub init_script: String,
    pub capacity_estimation: Vec<Row>,
    pub security_permissions: String,
    pub backup_recovery: String,
    pub future_extensions: String,
}

impl DbddRecord {
    /// Column rows of a declared table; empty when none were added
    pub fn fields_of(&self, table_name: &str) -> &[Row] {
        self.table_fields
            .get(table_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn info(field: &str, content: &str) -> Row {
    row([("field", field), ("content", content)])
}

impl TemplateSchema for DbddRecord {
    const KIND: TemplateKind = TemplateKind::Dbdd;

    fn with_defaults(today: NaiveDate) -> Self {
        Self {
            system_name: String::new(),
            module_name: String::new(),
            version: "v1.0".to_string(),
            author: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            file_path: String::new(),
            document_info: vec![
                info("System / subsystem", ""),
                info("Database", "MySQL 8.0"),
                info("Character set", "utf8mb4"),
                info("Collation", "utf8mb4_general_ci"),
                info("High availability", ""),
                info("Backup strategy", ""),
            ],
            change_log: vec![blank_row(&["version", "date", "author", "changes"])],
            er_diagram: String::new(),
            tables: vec![row([
                ("tableName", ""),
                ("description", ""),
                ("engine", "InnoDB"),
            ])],
            table_fields: BTreeMap::new(),
            indexes: vec![blank_row(&[
                "indexName",
                "tableName",
                "fields",
                "type",
                "note",
            ])],
            constraints_rules: String::new(),
            init_script: String::new(),
            capacity_estimation: vec![blank_row(&[
                "tableName",
                "initialRows",
                "yearlyGrowth",
                "avgRowSize",
                "yearSpace",
            ])],
            security_permissions: String::new(),
            backup_recovery: String::new(),
            future_extensions: String::new(),
        }
    }

    fn section_row(field: &str) -> Option<Row> {
        (field == TABLE_FIELDS).then(|| {
            row([
                ("fieldName", ""),
                ("type", ""),
                ("nullable", "No"),
                ("defaultValue", ""),
                ("description", ""),
                ("index", ""),
            ])
        })
    }

    fn export_file_name(&self) -> String {
        format!(
            "dbdd-{}-{}.md",
            file_stem_or(&self.module_name, "module"),
            file_stem_or(&self.version, "v1.0")
        )
    }

    fn render_markdown(&self) -> String {
        let mut md = Markdown::new();

        md.banner(
            "Database Design Document (DBDD)",
            &[
                ("System", self.system_name.as_str()),
                ("Module", self.module_name.as_str()),
                ("Version", self.version.as_str()),
                ("Author", self.author.as_str()),
                ("Date", self.date.as_str()),
                ("Path", self.file_path.as_str()),
            ],
        );

        md.heading(1, "1. Document Information")
            .row_table(&["Field", "Content"], &["field", "content"], &self.document_info)
            .rule();

        md.heading(1, "2. Versions & Changes")
            .row_table(
                &["Version", "Date", "Author", "Changes"],
                &["version", "date", "author", "changes"],
                &self.change_log,
            )
            .rule();

        md.heading(1, "3. ER Diagram")
            .paragraph(&self.er_diagram)
            .rule();

        md.heading(1, "4. Data Dictionary");
        for (position, table) in self.tables.iter().enumerate() {
            let name = cell(table, "tableName");
            md.heading(
                2,
                format!(
                    "4.{} {} `{}`",
                    position + 1,
                    cell(table, "description"),
                    name
                ),
            )
            .table(
                &["Field", "Type", "Nullable", "Default", "Description", "Index"],
                self.fields_of(name).iter().map(|field| {
                    vec![
                        format!("`{}`", cell(field, "fieldName")),
                        format!("`{}`", cell(field, "type")),
                        cell(field, "nullable").to_string(),
                        cell(field, "defaultValue").to_string(),
                        cell(field, "description").to_string(),
                        cell(field, "index").to_string(),
                    ]
                }),
            );
        }
        md.rule();

        md.heading(1, "5. Indexes")
            .table(
                &["Index", "Table", "Fields", "Type", "Note"],
                self.indexes.iter().map(|index| {
                    vec![
                        format!("`{}`", cell(index, "indexName")),
                        format!("`{}`", cell(index, "tableName")),
                        format!("({})", cell(index, "fields")),
                        cell(index, "type").to_string(),
                        cell(index, "note").to_string(),
                    ]
                }),
            )
            .rule();

        md.heading(1, "6. Constraints & Rules")
            .paragraph(&self.constraints_rules)
            .rule();

        md.heading(1, "7. Initialization Script")
            .code("sql", &self.init_script)
            .rule();

        md.heading(1, "8. Capacity Estimation")
            .table(
                &["Table", "Initial rows", "Yearly growth", "Avg row size", "1-year space"],
                self.capacity_estimation.iter().map(|item| {
                    vec![
                        format!("`{}`", cell(item, "tableName")),
                        cell(item, "initialRows").to_string(),
                        cell(item, "yearlyGrowth").to_string(),
                        cell(item, "avgRowSize").to_string(),
                        cell(item, "yearSpace").to_string(),
                    ]
                }),
            )
            .rule();

        md.heading(1, "9. Security & Permissions")
            .paragraph(&self.security_permissions)
            .rule();

        md.heading(1, "10. Backup & Recovery")
            .paragraph(&self.backup_recovery)
            .rule();

        md.heading(1, "11. Future Extensions")
            .paragraph(&self.future_extensions)
            .rule();

        md.line("> **Review sign-off**  ")
            .line("> DBA: _______  Backend: _______  Architect: _______  Date: _______");

        md.finish()
    }
}
