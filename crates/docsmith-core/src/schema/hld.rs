//! High-level design specification

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::markdown::Markdown;
use super::{file_stem_or, TemplateSchema};
use crate::record::{blank_row, Row};
use crate::template::TemplateKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HldRecord {
    pub system_name: String,
    pub version: String,
    pub author: String,
    pub review_date: String,
    pub status: String,

    pub business_background: String,
    pub business_goal: String,
    pub current_scope: String,

    pub architecture_diagram: String,
    pub core_modules: Vec<Row>,
    pub api_list: Vec<Row>,
    pub database_tables: Vec<Row>,
    pub tech_stack: Vec<Row>,
    pub deployment_desc: String,
    pub performance_reqs: Vec<Row>,
    pub security_measures: Vec<String>,
    pub monitoring_items: Vec<Row>,
    pub risks: Vec<Row>,
    pub development_plan: Vec<Row>,
}

impl TemplateSchema for HldRecord {
    const KIND: TemplateKind = TemplateKind::Hld;

    // No date field is prefilled: the review date is chosen by the author.
    fn with_defaults(_today: NaiveDate) -> Self {
        Self {
            system_name: String::new(),
            version: "v1.0".to_string(),
            author: String::new(),
            review_date: String::new(),
            status: "Draft".to_string(),
            business_background: String::new(),
            business_goal: String::new(),
            current_scope: String::new(),
            architecture_diagram: String::new(),
            core_modules: vec![blank_row(&[
                "name",
                "responsibility",
                "technology",
                "interface",
            ])],
            api_list: vec![blank_row(&[
                "endpoint",
                "method",
                "description",
                "request",
                "response",
            ])],
            database_tables: vec![blank_row(&[
                "tableName",
                "description",
                "keyFields",
                "indexes",
            ])],
            tech_stack: vec![blank_row(&["category", "technology", "version", "reason"])],
            deployment_desc: String::new(),
            performance_reqs: vec![blank_row(&["metric", "target", "measurement"])],
            security_measures: vec![String::new()],
            monitoring_items: vec![blank_row(&["item", "metric", "threshold", "action"])],
            risks: vec![blank_row(&["risk", "probability", "impact", "mitigation"])],
            development_plan: vec![blank_row(&["phase", "duration", "deliverable", "owner"])],
        }
    }

    fn export_file_name(&self) -> String {
        format!(
            "{}_{}.md",
            file_stem_or(&self.system_name, "HLD"),
            file_stem_or(&self.version, "v1.0")
        )
    }

    fn render_markdown(&self) -> String {
        let mut md = Markdown::new();

        md.heading(1, "High-Level Design (HLD)")
            .line(format!("> **System**: {}  ", self.system_name))
            .line(format!("> **Version**: {}  ", self.version))
            .line(format!("> **Author**: {}  ", self.author))
            .line(format!("> **Review date**: {}  ", self.review_date))
            .line(format!("> **Status**: {}", self.status))
            .blank()
            .rule();

        md.heading(2, "1. Background & Goals")
            .line(format!("- **Business background**: {}", self.business_background))
            .line(format!("- **Business goal**: {}", self.business_goal))
            .line(format!("- **Scope of this phase**: {}", self.current_scope))
            .blank()
            .rule();

        md.heading(2, "2. Architecture")
            .paragraph(&self.architecture_diagram)
            .rule();

        md.heading(2, "3. Core Modules")
            .row_table(
                &["Module", "Responsibility", "Technology", "Interface"],
                &["name", "responsibility", "technology", "interface"],
                &self.core_modules,
            )
            .rule();

        md.heading(2, "4. API Design")
            .row_table(
                &["Endpoint", "Method", "Description", "Request", "Response"],
                &["endpoint", "method", "description", "request", "response"],
                &self.api_list,
            )
            .rule();

        md.heading(2, "5. Database Design")
            .row_table(
                &["Table", "Description", "Key fields", "Indexes"],
                &["tableName", "description", "keyFields", "indexes"],
                &self.database_tables,
            )
            .rule();

        md.heading(2, "6. Technology Stack")
            .row_table(
                &["Category", "Technology", "Version", "Rationale"],
                &["category", "technology", "version", "reason"],
                &self.tech_stack,
            )
            .rule();

        md.heading(2, "7. Deployment")
            .paragraph(&self.deployment_desc)
            .rule();

        md.heading(2, "8. Performance Targets")
            .row_table(
                &["Metric", "Target", "Measurement"],
                &["metric", "target", "measurement"],
                &self.performance_reqs,
            )
            .rule();

        md.heading(2, "9. Security")
            .bullets(&self.security_measures)
            .rule();

        md.heading(2, "10. Monitoring & Alerts")
            .row_table(
                &["Item", "Metric", "Threshold", "Action"],
                &["item", "metric", "threshold", "action"],
                &self.monitoring_items,
            )
            .rule();

        md.heading(2, "11. Risk Assessment")
            .row_table(
                &["Risk", "Probability", "Impact", "Mitigation"],
                &["risk", "probability", "impact", "mitigation"],
                &self.risks,
            )
            .rule();

        md.heading(2, "12. Development Plan")
            .row_table(
                &["Phase", "Duration", "Deliverable", "Owner"],
                &["phase", "duration", "deliverable", "owner"],
                &self.development_plan,
            )
            .rule();

        md.heading(3, "Appendix")
            .line("- **Related documents**: PRD, low-level design")
            .line("- **Technology research**: selection report")
            .line("- **Performance testing**: load test report and baselines")
            .blank();

        md.line("> **Review checklist**:  ")
            .line("> 1. Does the architecture meet the business and performance targets?  ")
            .line("> 2. Are the technology choices justified for scale and maintenance?  ")
            .line("> 3. Does the security design follow company policy?  ")
            .line("> 4. Do alerts cover the key metrics and help locate failures?");

        md.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hld() -> HldRecord {
        HldRecord::with_defaults(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    }

    #[test]
    fn test_file_name_uses_system_and_version() {
        let mut record = hld();
        assert_eq!(record.export_file_name(), "HLD_v1.0.md");
        record.system_name = "Billing".to_string();
        record.version = "v2.1".to_string();
        assert_eq!(record.export_file_name(), "Billing_v2.1.md");
    }

    #[test]
    fn test_render_api_table() {
        let mut record = hld();
        record.api_list[0].insert("endpoint".to_string(), "/orders".to_string());
        record.api_list[0].insert("method".to_string(), "POST".to_string());
        record.security_measures = vec!["TLS everywhere".to_string()];

        let md = record.render_markdown();
        assert!(md.contains("| /orders | POST |  |  |  |"));
        assert!(md.contains("## 9. Security\n\n- TLS everywhere\n"));
        assert!(md.contains("> **Status**: Draft"));
    }
}
