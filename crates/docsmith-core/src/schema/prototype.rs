//! Product prototype design document

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::markdown::{cell, Markdown};
use super::{file_stem_or, TemplateSchema};
use crate::record::{blank_row, row, Row};
use crate::template::TemplateKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PrototypeRecord {
    pub system_name: String,
    pub function_name: String,
    pub version: String,
    pub author: String,
    pub date: String,
    pub file_path: String,
    pub figma_url: String,

    pub prototype_info: Vec<Row>,
    pub prototype_links: Vec<Row>,
    pub ia_description: String,
    pub page_components: Vec<Row>,
    pub main_flow: String,
    pub branch_flows: String,
    pub page_details: Vec<Row>,
    pub responsive_breakpoints: Vec<Row>,
    pub accessibility_features: String,
    pub tracking_events: Vec<Row>,
    pub visual_specs: String,
    pub todos_risks: String,
    pub review_records: Vec<Row>,
}

impl TemplateSchema for PrototypeRecord {
    const KIND: TemplateKind = TemplateKind::Prototype;

    fn with_defaults(today: NaiveDate) -> Self {
        let info = |item: &str, content: &str| row([("item", item), ("content", content)]);
        let link = |platform: &str, permission: &str| {
            row([("platform", platform), ("link", ""), ("permission", permission)])
        };

        Self {
            system_name: String::new(),
            function_name: String::new(),
            version: "v1.0".to_string(),
            author: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
            file_path: String::new(),
            figma_url: String::new(),
            prototype_info: vec![
                info("Feature name", ""),
                info("Prototype tool", "Figma"),
                info("Design resolution", "1440×1024 (Web) / 375×812 (App)"),
                info("Design walkthrough date", ""),
                info("Review status", "Pending review"),
            ],
            prototype_links: vec![
                link("Web hi-fi", "Read-only"),
                link("App hi-fi", "Can comment"),
                link("Interactive demo", "No login required"),
            ],
            ia_description: String::new(),
            page_components: vec![blank_row(&["id", "name", "purpose", "note"])],
            main_flow: String::new(),
            branch_flows: String::new(),
            page_details: vec![blank_row(&[
                "pageId",
                "pageName",
                "url",
                "entry",
                "elements",
                "interactions",
                "imageUrl",
            ])],
            responsive_breakpoints: vec![blank_row(&["breakpoint", "layoutChange", "note"])],
            accessibility_features: String::new(),
            tracking_events: vec![blank_row(&["event", "parameters", "trigger"])],
            visual_specs: String::new(),
            todos_risks: String::new(),
            review_records: vec![blank_row(&["reviewer", "opinion", "status", "date"])],
        }
    }

    fn export_file_name(&self) -> String {
        format!(
            "prototype-{}-{}.md",
            file_stem_or(&self.function_name, "design"),
            file_stem_or(&self.version, "v1.0")
        )
    }

    fn render_markdown(&self) -> String {
        let mut md = Markdown::new();
        let tool = format!("Figma ({})", self.figma_url);

        md.banner(
            "Product Prototype Design (PRD-Prototyping)",
            &[
                ("System", self.system_name.as_str()),
                ("Feature", self.function_name.as_str()),
                ("Version", self.version.as_str()),
                ("Author", self.author.as_str()),
                ("Date", self.date.as_str()),
                ("Path", self.file_path.as_str()),
                ("Tool", tool.as_str()),
            ],
        );

        md.heading(1, "1. Prototype Information")
            .row_table(&["Item", "Content"], &["item", "content"], &self.prototype_info)
            .rule();

        md.heading(1, "2. Prototype Links")
            .table(
                &["Platform", "Link", "Access"],
                self.prototype_links.iter().map(|link| {
                    let platform = cell(link, "platform");
                    vec![
                        platform.to_string(),
                        format!("[{}]({})", platform, cell(link, "link")),
                        cell(link, "permission").to_string(),
                    ]
                }),
            )
            .rule();

        md.heading(1, "3. Information Architecture (IA)")
            .paragraph(&self.ia_description)
            .rule();

        md.heading(1, "4. Pages & Components")
            .row_table(
                &["ID", "Page / component", "Purpose", "Note"],
                &["id", "name", "purpose", "note"],
                &self.page_components,
            )
            .rule();

        md.heading(1, "5. Interaction Flows")
            .heading(2, "5.1 Main Flow")
            .paragraph(&self.main_flow)
            .heading(2, "5.2 Branch Flows")
            .paragraph(&self.branch_flows)
            .rule();

        md.heading(1, "6. Page Details");
        for page in &self.page_details {
            let name = cell(page, "pageName");
            md.heading(2, format!("{} {}", cell(page, "pageId"), name))
                .line(format!("- **URL**: `{}`", cell(page, "url")))
                .line(format!("- **Entry**: {}", cell(page, "entry")))
                .line(format!("- **New elements**: {}", cell(page, "elements")))
                .line(format!("- **Interactions**: {}", cell(page, "interactions")))
                .blank()
                .line(format!("![{}]({})", name, cell(page, "imageUrl")))
                .blank();
        }
        md.rule();

        md.heading(1, "7. Responsive Breakpoints")
            .row_table(
                &["Breakpoint", "Layout change", "Note"],
                &["breakpoint", "layoutChange", "note"],
                &self.responsive_breakpoints,
            )
            .rule();

        md.heading(1, "8. Accessibility (a11y)")
            .paragraph(&self.accessibility_features)
            .rule();

        md.heading(1, "9. Data & Tracking")
            .table(
                &["Event", "Parameters", "Trigger"],
                self.tracking_events.iter().map(|event| {
                    vec![
                        format!("`{}`", cell(event, "event")),
                        format!("`{}`", cell(event, "parameters")),
                        cell(event, "trigger").to_string(),
                    ]
                }),
            )
            .rule();

        md.heading(1, "10. Visual Specification")
            .paragraph(&self.visual_specs)
            .rule();

        md.heading(1, "11. Todos & Risks")
            .paragraph(&self.todos_risks)
            .rule();

        md.heading(1, "12. Review Records").row_table(
            &["Reviewer", "Opinion", "Status", "Date"],
            &["reviewer", "opinion", "status", "date"],
            &self.review_records,
        );

        md.finish()
    }
}
