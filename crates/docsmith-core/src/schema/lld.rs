//! Low-level design specification

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::markdown::{cell, Markdown};
use super::{file_stem_or, TemplateSchema};
use crate::record::{blank_row, Row};
use crate::template::TemplateKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LldRecord {
    pub module_name: String,
    pub version: String,
    pub author: String,
    pub date: String,
    pub file_path: String,

    pub requirements: Vec<Row>,
    pub current_scope: String,
    pub class_diagram: String,
    pub interface_list: Vec<Row>,
    pub table_changes: String,
    pub index_design: Vec<Row>,
    pub key_methods: Vec<Row>,
    pub non_functional_impl: Vec<Row>,
    pub exception_matrix: Vec<Row>,
    pub deployment_config: String,
    pub change_log: Vec<Row>,
}

impl TemplateSchema for LldRecord {
    const KIND: TemplateKind = TemplateKind::Lld;

    fn with_defaults(today: NaiveDate) -> Self {
        Self {
            module_name: String::new(),
            version: "v1.0".to_string(),
            author: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            file_path: String::new(),
            requirements: vec![blank_row(&["id", "description", "source"])],
            current_scope: String::new(),
            class_diagram: String::new(),
            interface_list: vec![blank_row(&["interface", "signature", "logic"])],
            table_changes: String::new(),
            index_design: vec![blank_row(&["indexName", "fields", "type", "reason"])],
            key_methods: vec![blank_row(&["methodName", "signature", "pseudocode"])],
            non_functional_impl: vec![blank_row(&["dimension", "implementation"])],
            exception_matrix: vec![blank_row(&[
                "scenario",
                "errorCode",
                "userMessage",
                "compensation",
            ])],
            deployment_config: String::new(),
            change_log: vec![blank_row(&["version", "date", "author", "changes"])],
        }
    }

    fn export_file_name(&self) -> String {
        format!(
            "lld-{}-{}.md",
            file_stem_or(&self.module_name, "module"),
            file_stem_or(&self.version, "v1.0")
        )
    }

    fn render_markdown(&self) -> String {
        let mut md = Markdown::new();

        md.banner(
            "Low-Level Design (LLD)",
            &[
                ("Module", self.module_name.as_str()),
                ("Version", self.version.as_str()),
                ("Author", self.author.as_str()),
                ("Date", self.date.as_str()),
                ("Path", self.file_path.as_str()),
            ],
        );

        md.heading(1, "1. Requirements Traceability").row_table(
            &["ID", "Description", "Source"],
            &["id", "description", "source"],
            &self.requirements,
        );

        md.heading(1, "2. Design Scope")
            .line(format!("- **This phase**: {}", self.current_scope))
            .blank();

        md.heading(1, "3. Class / Interface / Method Design")
            .heading(2, "3.1 Class Diagram")
            .paragraph(&self.class_diagram)
            .heading(2, "3.2 Interfaces")
            .row_table(
                &["Interface", "Signature", "Main logic"],
                &["interface", "signature", "logic"],
                &self.interface_list,
            );

        md.heading(1, "4. Data Layer")
            .heading(2, "4.1 Table Changes")
            .paragraph(&self.table_changes)
            .heading(2, "4.2 Indexes")
            .row_table(
                &["Index", "Fields", "Type", "Reason"],
                &["indexName", "fields", "type", "reason"],
                &self.index_design,
            );

        md.heading(1, "5. Key Method Pseudocode");
        for method in &self.key_methods {
            let body = [cell(method, "signature"), cell(method, "pseudocode")]
                .iter()
                .map(|part| part.trim_end())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            md.heading(2, cell(method, "methodName")).code("java", &body);
        }

        md.heading(1, "6. Non-functional Implementation").table(
            &["Dimension", "Implementation"],
            self.non_functional_impl.iter().map(|row| {
                let dimension = cell(row, "dimension").trim();
                vec![
                    if dimension.is_empty() {
                        String::new()
                    } else {
                        format!("**{}**", dimension)
                    },
                    cell(row, "implementation").to_string(),
                ]
            }),
        );

        md.heading(1, "7. Exception Matrix").row_table(
            &["Scenario", "Error code", "User message", "Compensation"],
            &["scenario", "errorCode", "userMessage", "compensation"],
            &self.exception_matrix,
        );

        md.heading(1, "8. Deployment & Configuration")
            .paragraph(&self.deployment_config);

        md.heading(1, "9. Change Log").row_table(
            &["Version", "Date", "Author", "Changes"],
            &["version", "date", "author", "changes"],
            &self.change_log,
        );

        md.finish()
    }
}
