//! Text output for query results

use cftools::health::{Condition, HealthReport};
use cftools::model::{AppSummary, Service, ServicePlan};
use cftools::resolve::{AppDetail, AppRow, BoundAppRow, BoundInstanceRow, InstanceRow, Placement, Resolver};
use cftools::tree::{self, LineKind, TreeEntry};
use cftools_core::format::{Style, BOLD, CYAN, RED};

const LABEL_WIDTH: usize = 19;
const RULE: &str = "------------------------";

/// Accumulates labelled output lines
pub struct Report {
    style: Style,
    out: String,
}

impl Report {
    pub fn new(style: Style) -> Self {
        Self {
            style,
            out: String::new(),
        }
    }

    pub fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// `Label:            value`
    pub fn field(&mut self, label: &str, value: impl std::fmt::Display) {
        let label = self.style.cyan(&format!("{:<width$}", label, width = LABEL_WIDTH));
        self.out.push_str(&format!("{}{}\n", label, value));
    }

    fn heading(&mut self, code: &str, text: &str) {
        let heading = self.style.paint(&format!("{}{}", BOLD, code), text);
        self.line(&heading);
    }

    fn placement(&mut self, placement: &Placement<'_>) {
        self.field("Org:", &placement.org.name);
        self.field("Space:", &placement.space.name);
    }

    fn summary_fields(&mut self, summary: &AppSummary) {
        self.field("App Name:", &summary.name);
        self.field("App Guid:", &summary.guid);
        self.field("App State:", &summary.state);
        self.field("Instances:", summary.instances);
        self.field("Running Instances:", summary.running_instances);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

pub fn apps(style: Style, rows: &[AppRow<'_>]) -> String {
    let mut report = Report::new(style);
    for row in rows {
        report.placement(&row.placement);
        report.field("App Name:", &row.app.name);
        report.field("App Guid:", &row.app.guid);
        report.field("App State:", &row.app.state);
        report.blank();
    }
    report.finish()
}

pub fn app_details(style: Style, details: &[AppDetail<'_>]) -> String {
    let mut report = Report::new(style);
    for detail in details {
        report.placement(&detail.placement);
        match detail.summary {
            Some(summary) => {
                report.summary_fields(summary);
                report.field("Health:", Condition::of(summary).as_str());
            }
            None => {
                report.field("App Name:", &detail.app.name);
                report.field("App Guid:", &detail.app.guid);
                report.field("App State:", &detail.app.state);
                report.field("Instances:", detail.app.instances);
            }
        }
        report.blank();
    }
    report.finish()
}

pub fn service_instances(style: Style, rows: &[InstanceRow<'_>]) -> String {
    let mut report = Report::new(style);
    for row in rows {
        report.placement(&row.placement);
        report.field("Service Name:", &row.service_instance.name);
        report.field("Service Guid:", &row.service_instance.guid);
        report.blank();
    }
    report.finish()
}

pub fn bound_instances(style: Style, rows: &[BoundInstanceRow<'_>]) -> String {
    let mut report = Report::new(style);
    for row in rows {
        report.placement(&row.placement);
        report.field("Service Name:", &row.service_instance.name);
        report.field("Service Guid:", &row.service_instance.guid);
        report.blank();
    }
    report.finish()
}

pub fn bound_apps(style: Style, rows: &[BoundAppRow<'_>]) -> String {
    let mut report = Report::new(style);
    for row in rows {
        report.placement(&row.placement);
        report.field("App Name:", &row.app.name);
        report.field("App Guid:", &row.app.guid);
        report.blank();
    }
    report.finish()
}

pub fn services(style: Style, services: &[(&Service, Vec<&ServicePlan>)]) -> String {
    let mut report = Report::new(style);
    for (service, plans) in services {
        report.line(&style.bold(&service.label));
        if !service.description.is_empty() {
            report.line(&format!("  {}", service.description));
        }
        if !plans.is_empty() {
            let names: Vec<&str> = plans.iter().map(|p| p.name.as_str()).collect();
            report.line(&format!("  plans: {}", names.join(", ")));
        }
    }
    report.finish()
}

/// Crashed and unhealthy sections followed by the totals
pub fn health(style: Style, resolver: &Resolver<'_>, health: &HealthReport<'_>) -> String {
    let mut report = Report::new(style);

    let sections: [(&str, &str, &[&AppSummary]); 2] = [
        (RED, "Crashed Apps", health.crashed.as_slice()),
        (CYAN, "Unhealthy Apps", health.degraded.as_slice()),
    ];

    for (code, title, apps) in sections {
        if apps.is_empty() {
            continue;
        }
        report.line(RULE);
        report.blank();
        report.heading(code, title);
        report.blank();
        for summary in apps {
            for placement in resolver.placements_for_space_guid(&summary.space_guid) {
                report.placement(&placement);
                report.summary_fields(summary);
                report.blank();
            }
        }
    }

    report.line(RULE);
    report.blank();
    report.field("Total apps:", health.total_apps);
    report.field("Started:", health.started);
    report.field("Stopped:", health.stopped);
    report.field("Unhealthy apps:", health.degraded_count());
    report.field("Crashed apps:", health.crashed_count());
    report.finish()
}

/// The usage tree, with org names bold cyan and space names green
pub fn usage_tree(style: Style, entries: &[TreeEntry<'_>]) -> String {
    let mut report = Report::new(style);
    for line in tree::render(entries) {
        let label = match line.kind {
            LineKind::Organization => style.paint(&format!("{}{}", BOLD, CYAN), line.label),
            LineKind::Space => style.green(line.label),
            LineKind::Instance => line.label.to_string(),
        };
        report.line(&format!("{} {}", line.prefix, label));
    }
    report.finish()
}
