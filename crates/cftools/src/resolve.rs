//! Join resolution across snapshot collections
//!
//! Entities reference their parents by guid (app -> space -> org, service
//! instance -> space -> org, binding -> app + service instance). The
//! [`Resolver`] indexes every join key once, mapping it to the catalog
//! positions that carry it. A key held by several records keeps all of its
//! positions, so every lookup fans out to one row per matching record in
//! catalog order. Unresolvable parents drop the row; they are never errors.

use serde::Serialize;
use std::collections::HashMap;

use crate::model::{
    App, AppSummary, Organization, Service, ServiceBinding, ServiceInstance, ServicePlan, Space,
};
use crate::snapshot::Snapshot;

type Index<'a> = HashMap<&'a str, Vec<usize>>;

fn index_by<'a, T>(records: &'a [T], key: impl Fn(&'a T) -> &'a str) -> Index<'a> {
    let mut index: Index<'a> = HashMap::new();
    for (pos, record) in records.iter().enumerate() {
        index.entry(key(record)).or_default().push(pos);
    }
    index
}

/// An organization and one of its spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement<'a> {
    pub org: &'a Organization,
    pub space: &'a Space,
}

/// An app with its ancestor chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppRow<'a> {
    #[serde(flatten)]
    pub placement: Placement<'a>,
    pub app: &'a App,
}

/// An app, its ancestor chain and its summary when one was synced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppDetail<'a> {
    #[serde(flatten)]
    pub placement: Placement<'a>,
    pub app: &'a App,
    pub summary: Option<&'a AppSummary>,
}

/// A service instance with its ancestor chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstanceRow<'a> {
    #[serde(flatten)]
    pub placement: Placement<'a>,
    pub service_instance: &'a ServiceInstance,
}

/// A binding seen from the app side: the bound instance and where it lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundInstanceRow<'a> {
    pub binding: &'a ServiceBinding,
    #[serde(flatten)]
    pub placement: Placement<'a>,
    pub service_instance: &'a ServiceInstance,
}

/// A binding seen from the instance side: the bound app and where it lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundAppRow<'a> {
    pub binding: &'a ServiceBinding,
    #[serde(flatten)]
    pub placement: Placement<'a>,
    pub app: &'a App,
}

/// Indexed, read-only view over a snapshot
pub struct Resolver<'a> {
    snapshot: &'a Snapshot,
    orgs_by_guid: Index<'a>,
    spaces_by_guid: Index<'a>,
    apps_by_guid: Index<'a>,
    apps_by_name: Index<'a>,
    summaries_by_guid: Index<'a>,
    plans_by_service: Index<'a>,
    instances_by_guid: Index<'a>,
    instances_by_name: Index<'a>,
    bindings_by_app: Index<'a>,
    bindings_by_instance: Index<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self {
            snapshot,
            orgs_by_guid: index_by(&snapshot.orgs, |o| o.guid.as_str()),
            spaces_by_guid: index_by(&snapshot.spaces, |s| s.guid.as_str()),
            apps_by_guid: index_by(&snapshot.apps, |a| a.guid.as_str()),
            apps_by_name: index_by(&snapshot.apps, |a| a.name.as_str()),
            summaries_by_guid: index_by(&snapshot.app_summaries, |s| s.guid.as_str()),
            plans_by_service: index_by(&snapshot.service_plans, |p| p.service_guid.as_str()),
            instances_by_guid: index_by(&snapshot.service_instances, |i| i.guid.as_str()),
            instances_by_name: index_by(&snapshot.service_instances, |i| i.name.as_str()),
            bindings_by_app: index_by(&snapshot.service_bindings, |b| b.app_guid.as_str()),
            bindings_by_instance: index_by(&snapshot.service_bindings, |b| {
                b.service_instance_guid.as_str()
            }),
        }
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Positions recorded under `key`, in catalog order
    fn positions<'i>(index: &'i Index<'a>, key: &str) -> &'i [usize] {
        index.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Organization and space for a space guid
    pub fn placements_for_space_guid(&self, space_guid: &str) -> Vec<Placement<'a>> {
        let mut placements = Vec::new();
        for &s in Self::positions(&self.spaces_by_guid, space_guid) {
            let space = &self.snapshot.spaces[s];
            for &o in Self::positions(&self.orgs_by_guid, &space.organization_guid) {
                placements.push(Placement {
                    org: &self.snapshot.orgs[o],
                    space,
                });
            }
        }
        placements
    }

    /// Apps whose name equals `name` exactly
    pub fn apps_by_name(&self, name: &str) -> Vec<AppRow<'a>> {
        Self::positions(&self.apps_by_name, name)
            .iter()
            .flat_map(|&a| {
                let app = &self.snapshot.apps[a];
                self.placements_for_space_guid(&app.space_guid)
                    .into_iter()
                    .map(move |placement| AppRow { placement, app })
            })
            .collect()
    }

    /// Apps with the given guid, each with its summary if one exists
    pub fn app_by_guid(&self, guid: &str) -> Vec<AppDetail<'a>> {
        Self::positions(&self.apps_by_guid, guid)
            .iter()
            .flat_map(|&a| {
                let app = &self.snapshot.apps[a];
                let summary = self.summary_for_app(&app.guid);
                self.placements_for_space_guid(&app.space_guid)
                    .into_iter()
                    .map(move |placement| AppDetail {
                        placement,
                        app,
                        summary,
                    })
            })
            .collect()
    }

    /// First summary synced for an app guid
    pub fn summary_for_app(&self, app_guid: &str) -> Option<&'a AppSummary> {
        Self::positions(&self.summaries_by_guid, app_guid)
            .first()
            .map(|&s| &self.snapshot.app_summaries[s])
    }

    /// Service instances whose name equals `name` exactly
    pub fn service_instances_by_name(&self, name: &str) -> Vec<InstanceRow<'a>> {
        Self::positions(&self.instances_by_name, name)
            .iter()
            .flat_map(|&i| {
                let service_instance = &self.snapshot.service_instances[i];
                self.placements_for_space_guid(&service_instance.space_guid)
                    .into_iter()
                    .map(move |placement| InstanceRow {
                        placement,
                        service_instance,
                    })
            })
            .collect()
    }

    /// Service instances bound to an app, with their org and space
    pub fn bindings_for_app_guid(&self, app_guid: &str) -> Vec<BoundInstanceRow<'a>> {
        let mut rows = Vec::new();
        for &b in Self::positions(&self.bindings_by_app, app_guid) {
            let binding = &self.snapshot.service_bindings[b];
            for &i in Self::positions(&self.instances_by_guid, &binding.service_instance_guid) {
                let service_instance = &self.snapshot.service_instances[i];
                for placement in self.placements_for_space_guid(&service_instance.space_guid) {
                    rows.push(BoundInstanceRow {
                        binding,
                        placement,
                        service_instance,
                    });
                }
            }
        }
        rows
    }

    /// Apps bound to a service instance, with their org and space
    pub fn bindings_for_service_instance_guid(&self, instance_guid: &str) -> Vec<BoundAppRow<'a>> {
        let mut rows = Vec::new();
        for &b in Self::positions(&self.bindings_by_instance, instance_guid) {
            let binding = &self.snapshot.service_bindings[b];
            for &a in Self::positions(&self.apps_by_guid, &binding.app_guid) {
                let app = &self.snapshot.apps[a];
                for placement in self.placements_for_space_guid(&app.space_guid) {
                    rows.push(BoundAppRow {
                        binding,
                        placement,
                        app,
                    });
                }
            }
        }
        rows
    }

    /// Service with the given label. The last catalog entry wins.
    pub fn service_by_label(&self, label: &str) -> Option<&'a Service> {
        self.snapshot.services.iter().rev().find(|s| s.label == label)
    }

    /// Plans offered by a service, in catalog order
    pub fn plans_for_service(&self, service_guid: &str) -> Vec<&'a ServicePlan> {
        Self::positions(&self.plans_by_service, service_guid)
            .iter()
            .map(|&p| &self.snapshot.service_plans[p])
            .collect()
    }
}
