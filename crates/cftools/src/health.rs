//! App health classification
//!
//! One pass over the app summaries, in stored order:
//! - `STARTED` and `STOPPED` states feed the started/stopped counters
//! - an app with no running instance that is not stopped is crashed
//! - otherwise, an app below its desired instance count that is not stopped
//!   is degraded
//!
//! An app scaled to zero desired instances is still counted as crashed
//! when it is not stopped.

use serde::Serialize;

use crate::model::AppSummary;
use crate::snapshot::Snapshot;

/// How a single app summary classifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Crashed,
    Degraded,
    Healthy,
}

impl Condition {
    pub fn of(summary: &AppSummary) -> Self {
        if summary.is_stopped() {
            Condition::Healthy
        } else if summary.running_instances == 0 {
            Condition::Crashed
        } else if summary.running_instances < summary.instances {
            Condition::Degraded
        } else {
            Condition::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Crashed => "crashed",
            Condition::Degraded => "degraded",
            Condition::Healthy => "healthy",
        }
    }
}

/// Aggregated health counters and detail lists
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport<'a> {
    /// Number of records in the app collection
    pub total_apps: usize,
    pub started: usize,
    pub stopped: usize,
    /// Crashed apps, in summary order
    pub crashed: Vec<&'a AppSummary>,
    /// Apps running below their desired instance count, in summary order
    pub degraded: Vec<&'a AppSummary>,
}

impl<'a> HealthReport<'a> {
    /// Classify a list of app summaries
    pub fn classify(summaries: &'a [AppSummary]) -> Self {
        let mut report = Self::default();

        for summary in summaries {
            if summary.is_started() {
                report.started += 1;
            } else if summary.is_stopped() {
                report.stopped += 1;
            }

            match Condition::of(summary) {
                Condition::Crashed => report.crashed.push(summary),
                Condition::Degraded => report.degraded.push(summary),
                Condition::Healthy => {}
            }
        }

        report
    }

    /// Classify a snapshot's app summaries and record its app total
    pub fn for_snapshot(snapshot: &'a Snapshot) -> Self {
        Self {
            total_apps: snapshot.apps.len(),
            ..Self::classify(&snapshot.app_summaries)
        }
    }

    pub fn crashed_count(&self) -> usize {
        self.crashed.len()
    }

    pub fn degraded_count(&self) -> usize {
        self.degraded.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, state: &str, desired: u32, running: u32) -> AppSummary {
        AppSummary {
            guid: format!("{}-guid", name),
            name: name.to_string(),
            state: state.to_string(),
            instances: desired,
            running_instances: running,
            space_guid: "s-1".to_string(),
        }
    }

    fn names<'a>(list: &[&'a AppSummary]) -> Vec<&'a str> {
        list.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_crashed_and_degraded() {
        let summaries = vec![
            summary("A1", "STARTED", 2, 1),
            summary("A2", "STARTED", 1, 0),
        ];
        let report = HealthReport::classify(&summaries);

        assert_eq!(report.started, 2);
        assert_eq!(report.stopped, 0);
        assert_eq!(names(&report.crashed), vec!["A2"]);
        assert_eq!(names(&report.degraded), vec!["A1"]);
    }

    #[test]
    fn test_stopped_apps_are_never_unhealthy() {
        let summaries = vec![summary("idle", "STOPPED", 3, 0)];
        let report = HealthReport::classify(&summaries);

        assert_eq!(report.stopped, 1);
        assert_eq!(report.crashed_count(), 0);
        assert_eq!(report.degraded_count(), 0);
    }

    #[test]
    fn test_zero_desired_counts_as_crashed() {
        let summaries = vec![summary("scaled-down", "STARTED", 0, 0)];
        let report = HealthReport::classify(&summaries);

        assert_eq!(names(&report.crashed), vec!["scaled-down"]);
        assert!(report.degraded.is_empty());
    }

    #[test]
    fn test_unknown_state_counts_neither_but_classifies() {
        let summaries = vec![
            summary("pending", "PENDING", 2, 0),
            summary("warming", "", 3, 1),
        ];
        let report = HealthReport::classify(&summaries);

        assert_eq!(report.started + report.stopped, 0);
        assert_eq!(names(&report.crashed), vec!["pending"]);
        assert_eq!(names(&report.degraded), vec!["warming"]);
    }

    #[test]
    fn test_detail_lists_keep_input_order() {
        let summaries = vec![
            summary("zeta", "STARTED", 1, 0),
            summary("alpha", "STARTED", 1, 0),
            summary("mid", "STARTED", 4, 4),
            summary("beta", "STARTED", 1, 0),
        ];
        let report = HealthReport::classify(&summaries);

        assert_eq!(names(&report.crashed), vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn test_counters_bounded_by_input() {
        let summaries = vec![
            summary("a", "STARTED", 2, 2),
            summary("b", "STOPPED", 1, 0),
            summary("c", "CRASHED", 1, 0),
            summary("d", "STARTED", 5, 3),
        ];
        let report = HealthReport::classify(&summaries);

        assert!(report.started + report.stopped <= summaries.len());
        assert!(report.crashed_count() + report.degraded_count() <= summaries.len());
        for s in &summaries {
            let in_crashed = report.crashed.iter().any(|c| c.name == s.name);
            let in_degraded = report.degraded.iter().any(|c| c.name == s.name);
            assert!(!(in_crashed && in_degraded));
        }
    }

    #[test]
    fn test_for_snapshot_uses_app_total() {
        let snapshot = Snapshot {
            apps: vec![Default::default(), Default::default(), Default::default()],
            app_summaries: vec![summary("a", "STARTED", 1, 1)],
            ..Default::default()
        };
        let report = HealthReport::for_snapshot(&snapshot);

        assert_eq!(report.total_apps, 3);
        assert_eq!(report.started, 1);
        assert_eq!(report.crashed_count() + report.degraded_count(), 0);
    }

    #[test]
    fn test_condition_names() {
        assert_eq!(Condition::of(&summary("x", "STARTED", 2, 1)).as_str(), "degraded");
        assert_eq!(Condition::of(&summary("x", "STARTED", 2, 2)), Condition::Healthy);
    }
}
