//! Snapshot entity records
//!
//! Field names follow the platform API's JSON. Missing fields fall back to
//! their defaults and unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// App state reported for a started app
pub const STATE_STARTED: &str = "STARTED";
/// App state reported for a stopped app
pub const STATE_STOPPED: &str = "STOPPED";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organization_guid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub instances: u32,
    #[serde(default)]
    pub space_guid: String,
}

/// Per-app summary with desired and actual instance counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSummary {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    /// Desired instances
    #[serde(default)]
    pub instances: u32,
    /// Instances actually running
    #[serde(default)]
    pub running_instances: u32,
    #[serde(default)]
    pub space_guid: String,
}

impl AppSummary {
    pub fn is_started(&self) -> bool {
        self.state == STATE_STARTED
    }

    pub fn is_stopped(&self) -> bool {
        self.state == STATE_STOPPED
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePlan {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub service_guid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub space_guid: String,
    #[serde(default)]
    pub service_guid: String,
    #[serde(default)]
    pub service_plan_guid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBinding {
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub app_guid: String,
    #[serde(default)]
    pub service_instance_guid: String,
}
