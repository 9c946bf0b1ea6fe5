//! Product requirements document

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::markdown::Markdown;
use super::{file_stem_or, TemplateSchema};
use crate::record::{blank_row, Row};
use crate::template::TemplateKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PrdRecord {
    pub document_name: String,
    pub product_owner: String,
    pub write_date: String,
    pub review_date: String,
    pub status: String,

    pub user_pain_point: String,
    pub business_goal: String,
    pub strategic_alignment: String,

    pub in_scope: Vec<String>,
    pub out_of_scope: Vec<String>,

    pub user_stories: Vec<Row>,

    pub flowchart_description: String,
    pub feature_list: Vec<Row>,

    pub prototype_link: String,
    pub key_interactions: String,

    pub data_requirements: Vec<Row>,
    pub non_functional_reqs: Vec<Row>,
    pub acceptance_criteria: Vec<String>,
    pub risks: Vec<Row>,
    pub milestones: Vec<Row>,
    pub change_log: Vec<Row>,
    pub appendix: Vec<String>,
}

impl TemplateSchema for PrdRecord {
    const KIND: TemplateKind = TemplateKind::Prd;

    fn with_defaults(today: NaiveDate) -> Self {
        Self {
            document_name: String::new(),
            product_owner: String::new(),
            write_date: today.format("%Y-%m-%d").to_string(),
            review_date: String::new(),
            status: "Draft".to_string(),
            user_pain_point: String::new(),
            business_goal: String::new(),
            strategic_alignment: String::new(),
            in_scope: vec![String::new()],
            out_of_scope: vec![String::new()],
            user_stories: vec![blank_row(&["role", "scenario", "requirement", "value"])],
            flowchart_description: String::new(),
            feature_list: vec![blank_row(&[
                "feature",
                "trigger",
                "precondition",
                "rules",
                "exception",
            ])],
            prototype_link: String::new(),
            key_interactions: String::new(),
            data_requirements: vec![blank_row(&["input", "output", "event", "note"])],
            non_functional_reqs: vec![blank_row(&["type", "requirement"])],
            acceptance_criteria: vec![String::new()],
            risks: vec![blank_row(&[
                "description",
                "probability",
                "impact",
                "solution",
                "owner",
            ])],
            milestones: vec![blank_row(&["stage", "time", "deliverable", "owner"])],
            change_log: vec![blank_row(&["version", "date", "changes", "author"])],
            appendix: vec![String::new()],
        }
    }

    fn export_file_name(&self) -> String {
        format!("{}_v1.0.md", file_stem_or(&self.document_name, "PRD"))
    }

    fn render_markdown(&self) -> String {
        let mut md = Markdown::new();

        md.heading(1, "Product Requirements Document (PRD)");
        md.line(format!("**Document**: {}PRD_v1.0  ", self.document_name))
            .line(format!("**Product owner**: {}  ", self.product_owner))
            .line(format!("**Written**: {}  ", self.write_date))
            .line(format!("**Review date**: {}  ", self.review_date))
            .line(format!("**Status**: {}", self.status))
            .blank()
            .rule();

        md.heading(2, "1. Background & Goals").table(
            &["Field", "Content"],
            [
                vec!["User pain point".to_string(), self.user_pain_point.clone()],
                vec!["Business goal".to_string(), self.business_goal.clone()],
                vec![
                    "Strategic alignment".to_string(),
                    self.strategic_alignment.clone(),
                ],
            ],
        );
        md.rule();

        md.heading(2, "2. Scope");
        md.line("**In scope**").blank().bullets(&self.in_scope);
        md.line("**Out of scope**").blank().bullets(&self.out_of_scope);
        md.rule();

        md.heading(2, "3. User Stories")
            .row_table(
                &["Role", "Scenario", "Requirement", "Value"],
                &["role", "scenario", "requirement", "value"],
                &self.user_stories,
            )
            .rule();

        md.heading(2, "4. Functional Logic")
            .heading(3, "4.1 Flowchart")
            .paragraph(&self.flowchart_description)
            .heading(3, "4.2 Features & Rules")
            .row_table(
                &["Feature", "Trigger", "Precondition", "Rules & limits", "Exception handling"],
                &["feature", "trigger", "precondition", "rules", "exception"],
                &self.feature_list,
            )
            .rule();

        md.heading(2, "5. Prototype & Interaction")
            .line(format!("- **Prototype link**: {}", self.prototype_link))
            .line("- **Key interactions**")
            .blank()
            .paragraph(&self.key_interactions)
            .rule();

        md.heading(2, "6. Data Requirements")
            .row_table(
                &["Input", "Output", "Tracking event", "Note"],
                &["input", "output", "event", "note"],
                &self.data_requirements,
            )
            .rule();

        md.heading(2, "7. Non-functional Requirements")
            .row_table(
                &["Type", "Requirement"],
                &["type", "requirement"],
                &self.non_functional_reqs,
            )
            .rule();

        md.heading(2, "8. Acceptance Criteria (DoD)")
            .checklist(&self.acceptance_criteria)
            .rule();

        md.heading(2, "9. Risks & Dependencies")
            .row_table(
                &["Risk", "Probability", "Impact", "Response", "Owner"],
                &["description", "probability", "impact", "solution", "owner"],
                &self.risks,
            )
            .rule();

        md.heading(2, "10. Milestones & Resources")
            .row_table(
                &["Stage", "Time", "Deliverable", "Owner"],
                &["stage", "time", "deliverable", "owner"],
                &self.milestones,
            )
            .rule();

        md.heading(2, "11. Change Log")
            .row_table(
                &["Version", "Date", "Changes", "Author"],
                &["version", "date", "changes", "author"],
                &self.change_log,
            )
            .rule();

        md.heading(3, "Appendix").bullets(&self.appendix);

        md.line("> **Tips**:  ")
            .line("> 1. Agile teams can drop the milestones section and track sprints instead.  ")
            .line("> 2. Complex domains should add a state machine and a domain model diagram.  ")
            .line("> 3. Ask every stakeholder to add hidden risks before the review.");

        md.finish()
    }
}
