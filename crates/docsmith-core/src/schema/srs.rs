//! Software requirements specification

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::markdown::{cell, Markdown};
use super::{file_stem_or, TemplateSchema};
use crate::record::{blank_row, row, Row};
use crate::template::TemplateKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SrsRecord {
    pub system_name: String,
    pub module_name: String,
    pub version: String,
    pub author: String,
    pub date: String,
    pub file_path: String,

    pub introduction: Vec<Row>,
    pub general_description: Vec<Row>,
    pub business_requirements: Vec<Row>,
    pub use_case_diagram: String,
    pub use_case_details: Vec<Row>,
    pub user_stories: Vec<Row>,
    pub non_functional_reqs: Vec<Row>,
    pub data_requirements: Vec<Row>,
    pub interface_specs: Vec<Row>,
    pub acceptance_criteria: Vec<String>,
    pub risks_assumptions: Vec<Row>,
    pub appendix: Vec<String>,
}

fn labelled(column: &str, label: &str) -> Row {
    row([(column, label), ("content", "")])
}

/// Two-column table with the label column in bold
fn label_rows<'a>(rows: &'a [Row], label: &'a str) -> impl Iterator<Item = Vec<String>> + 'a {
    rows.iter().map(move |item| {
        vec![
            format!("**{}**", cell(item, label)),
            cell(item, "content").to_string(),
        ]
    })
}

impl TemplateSchema for SrsRecord {
    const KIND: TemplateKind = TemplateKind::Srs;

    fn with_defaults(today: NaiveDate) -> Self {
        Self {
            system_name: String::new(),
            module_name: String::new(),
            version: "v1.0".to_string(),
            author: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            file_path: String::new(),
            introduction: vec![
                labelled("category", "1.1 Purpose"),
                labelled("category", "1.2 Scope"),
                labelled("category", "1.3 Glossary"),
                labelled("category", "1.4 References"),
            ],
            general_description: vec![
                labelled("category", "2.1 Business background"),
                labelled("category", "2.2 User roles"),
                labelled("category", "2.3 Operating environment"),
            ],
            business_requirements: vec![blank_row(&["id", "description", "criteria"])],
            use_case_diagram: String::new(),
            use_case_details: vec![
                labelled("field", "Use case ID"),
                labelled("field", "Use case name"),
                labelled("field", "Actors"),
                labelled("field", "Preconditions"),
                labelled("field", "Basic flow"),
                labelled("field", "Alternative flows"),
                labelled("field", "Exception flows"),
                labelled("field", "Postconditions"),
            ],
            user_stories: vec![blank_row(&["role", "story", "value"])],
            non_functional_reqs: vec![blank_row(&["dimension", "indicator", "requirement"])],
            data_requirements: vec![blank_row(&[
                "dataItem",
                "type",
                "source",
                "usage",
                "retention",
            ])],
            interface_specs: vec![blank_row(&[
                "endpoint",
                "method",
                "request",
                "response",
                "errorCode",
            ])],
            acceptance_criteria: vec![String::new()],
            risks_assumptions: vec![blank_row(&["risk", "level", "mitigation"])],
            appendix: vec![String::new()],
        }
    }

    fn export_file_name(&self) -> String {
        format!(
            "srs-{}-{}.md",
            file_stem_or(&self.module_name, "module"),
            file_stem_or(&self.version, "v1.0")
        )
    }

    fn render_markdown(&self) -> String {
        let mut md = Markdown::new();

        md.banner(
            "Software Requirements Specification (SRS)",
            &[
                ("System", self.system_name.as_str()),
                ("Module", self.module_name.as_str()),
                ("Version", self.version.as_str()),
                ("Author", self.author.as_str()),
                ("Date", self.date.as_str()),
                ("Path", self.file_path.as_str()),
            ],
        );

        md.heading(1, "1. Introduction")
            .table(&["Category", "Content"], label_rows(&self.introduction, "category"))
            .rule();

        md.heading(1, "2. General Description")
            .table(
                &["Category", "Content"],
                label_rows(&self.general_description, "category"),
            )
            .rule();

        md.heading(1, "3. Business Requirements")
            .row_table(
                &["ID", "Requirement", "Acceptance criteria"],
                &["id", "description", "criteria"],
                &self.business_requirements,
            )
            .rule();

        md.heading(1, "4. Functional Requirements")
            .line("> Described twice: as **use cases** and as **user stories**.")
            .blank()
            .heading(2, "4.1 Use Case Diagram")
            .paragraph(&self.use_case_diagram)
            .heading(2, "4.2 Use Case Details")
            .table(&["Field", "Content"], label_rows(&self.use_case_details, "field"))
            .heading(2, "4.3 User Stories")
            .row_table(
                &["Role", "Story", "Value"],
                &["role", "story", "value"],
                &self.user_stories,
            )
            .rule();

        md.heading(1, "5. Non-functional Requirements")
            .table(
                &["Dimension", "Indicator", "Requirement"],
                self.non_functional_reqs.iter().map(|req| {
                    vec![
                        format!("**{}**", cell(req, "dimension")),
                        cell(req, "indicator").to_string(),
                        cell(req, "requirement").to_string(),
                    ]
                }),
            )
            .rule();

        md.heading(1, "6. Data Requirements")
            .row_table(
                &["Data item", "Type", "Source", "Usage", "Retention"],
                &["dataItem", "type", "source", "usage", "retention"],
                &self.data_requirements,
            )
            .rule();

        md.heading(1, "7. Interface Specification")
            .table(
                &["Endpoint", "Method", "Request example", "Response example", "Error codes"],
                self.interface_specs.iter().map(|spec| {
                    vec![
                        format!("`{}`", cell(spec, "endpoint")),
                        cell(spec, "method").to_string(),
                        format!("`{}`", cell(spec, "request")),
                        format!("`{}`", cell(spec, "response")),
                        cell(spec, "errorCode").to_string(),
                    ]
                }),
            )
            .rule();

        md.heading(1, "8. Acceptance Criteria (DoD)")
            .checklist(&self.acceptance_criteria)
            .rule();

        md.heading(1, "9. Risks & Assumptions")
            .row_table(
                &["Risk", "Level", "Mitigation"],
                &["risk", "level", "mitigation"],
                &self.risks_assumptions,
            )
            .rule();

        md.heading(1, "10. Appendix")
            .bullets(&self.appendix)
            .rule();

        md.line("> **Sign-off**  ")
            .line("> Product: _______  Engineering: _______  QA: _______  Business: _______");

        md.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srs() -> SrsRecord {
        SrsRecord::with_defaults(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
    }

    #[test]
    fn test_defaults_seed_labelled_sections() {
        let record = srs();
        assert_eq!(record.introduction.len(), 4);
        assert_eq!(record.general_description.len(), 3);
        assert_eq!(record.use_case_details.len(), 8);
        assert_eq!(cell(&record.use_case_details[0], "field"), "Use case ID");
        assert_eq!(record.acceptance_criteria, vec![String::new()]);
    }

    #[test]
    fn test_interface_and_risk_columns_match_renderer() {
        let record = srs();
        let interface = &record.interface_specs[0];
        for column in ["endpoint", "method", "request", "response", "errorCode"] {
            assert!(interface.contains_key(column), "{}", column);
        }
        let risk = &record.risks_assumptions[0];
        assert!(risk.contains_key("level"));
    }

    #[test]
    fn test_render_labels_in_bold() {
        let mut record = srs();
        record.introduction[0].insert("content".to_string(), "Order intake".to_string());

        let md = record.render_markdown();
        assert!(md.contains("| **1.1 Purpose** | Order intake |"));
        assert!(md.contains("| **Basic flow** |  |"));
    }

    #[test]
    fn test_render_lists_and_sign_off() {
        let mut record = srs();
        record.acceptance_criteria = vec!["All APIs documented".to_string(), " ".to_string()];
        record.appendix = vec!["Glossary v2".to_string()];

        let md = record.render_markdown();
        assert!(md.contains("# 8. Acceptance Criteria (DoD)\n\n- [ ] All APIs documented\n\n---"));
        assert!(md.contains("# 10. Appendix\n\n- Glossary v2\n"));
        assert!(md.ends_with("QA: _______  Business: _______\n"));
    }

    #[test]
    fn test_file_name() {
        let mut record = srs();
        assert_eq!(record.export_file_name(), "srs-module-v1.0.md");
        record.module_name = "intake".to_string();
        assert_eq!(record.export_file_name(), "srs-intake-v1.0.md");
    }
}
