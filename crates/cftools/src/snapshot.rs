//! Snapshot storage
//!
//! A snapshot is eight JSON arrays, one file per collection, kept in the
//! cache directory (~/.cfcache by default):
//! - orgs.json, spaces.json, apps.json, appSummaries.json
//! - services.json, servicePlans.json, serviceInstances.json, serviceBindings.json
//!
//! Loading never aborts on an absent or unparseable collection. Both cases
//! load as an empty collection and are reported as a [`SnapshotIssue`] so the
//! caller decides whether partial data is good enough.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{
    App, AppSummary, Organization, Service, ServiceBinding, ServiceInstance, ServicePlan, Space,
};

/// The eight collections making up a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Organizations,
    Spaces,
    Apps,
    AppSummaries,
    Services,
    ServicePlans,
    ServiceInstances,
    ServiceBindings,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Organizations,
        Collection::Spaces,
        Collection::Apps,
        Collection::AppSummaries,
        Collection::Services,
        Collection::ServicePlans,
        Collection::ServiceInstances,
        Collection::ServiceBindings,
    ];

    /// File name inside the cache directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Organizations => "orgs.json",
            Collection::Spaces => "spaces.json",
            Collection::Apps => "apps.json",
            Collection::AppSummaries => "appSummaries.json",
            Collection::Services => "services.json",
            Collection::ServicePlans => "servicePlans.json",
            Collection::ServiceInstances => "serviceInstances.json",
            Collection::ServiceBindings => "serviceBindings.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Organizations => "organizations",
            Collection::Spaces => "spaces",
            Collection::Apps => "apps",
            Collection::AppSummaries => "app summaries",
            Collection::Services => "services",
            Collection::ServicePlans => "service plans",
            Collection::ServiceInstances => "service instances",
            Collection::ServiceBindings => "service bindings",
        }
    }
}

/// Snapshot errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid {} array: {message}", .path.display(), .collection.as_str())]
    Malformed {
        collection: Collection,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to serialize {}: {source}", .collection.as_str())]
    Serialize {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A collection that did not load cleanly and was replaced by an empty one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotIssue {
    /// The file is absent (or empty): the cache was never synced
    Missing { collection: Collection, path: PathBuf },
    /// The file exists but does not hold a JSON array of records
    Malformed {
        collection: Collection,
        path: PathBuf,
        message: String,
    },
}

impl SnapshotIssue {
    pub fn collection(&self) -> Collection {
        match self {
            SnapshotIssue::Missing { collection, .. } => *collection,
            SnapshotIssue::Malformed { collection, .. } => *collection,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, SnapshotIssue::Malformed { .. })
    }
}

/// How to treat malformed collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Accept partial data; malformed collections stay empty
    #[default]
    Lenient,
    /// Refuse to continue when any collection is malformed
    Strict,
}

/// An immutable, fully materialized snapshot
///
/// Collections keep their stored order ("catalog order").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub orgs: Vec<Organization>,
    pub spaces: Vec<Space>,
    pub apps: Vec<App>,
    pub app_summaries: Vec<AppSummary>,
    pub services: Vec<Service>,
    pub service_plans: Vec<ServicePlan>,
    pub service_instances: Vec<ServiceInstance>,
    pub service_bindings: Vec<ServiceBinding>,
}

/// A snapshot together with the problems met while loading it
#[derive(Debug, Clone, Default)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub issues: Vec<SnapshotIssue>,
}

impl LoadedSnapshot {
    /// Apply a load policy, yielding the snapshot if it is acceptable
    pub fn into_snapshot(self, policy: LoadPolicy) -> Result<Snapshot, SnapshotError> {
        if policy == LoadPolicy::Strict {
            let malformed = self.issues.into_iter().find(SnapshotIssue::is_malformed);
            if let Some(SnapshotIssue::Malformed {
                collection,
                path,
                message,
            }) = malformed
            {
                return Err(SnapshotError::Malformed {
                    collection,
                    path,
                    message,
                });
            }
        }
        Ok(self.snapshot)
    }
}

impl Snapshot {
    /// Load all eight collections from a cache directory
    pub fn load(dir: &Path) -> Result<LoadedSnapshot, SnapshotError> {
        let mut issues = Vec::new();

        let snapshot = Snapshot {
            orgs: read_collection(dir, Collection::Organizations, &mut issues)?,
            spaces: read_collection(dir, Collection::Spaces, &mut issues)?,
            apps: read_collection(dir, Collection::Apps, &mut issues)?,
            app_summaries: read_collection(dir, Collection::AppSummaries, &mut issues)?,
            services: read_collection(dir, Collection::Services, &mut issues)?,
            service_plans: read_collection(dir, Collection::ServicePlans, &mut issues)?,
            service_instances: read_collection(dir, Collection::ServiceInstances, &mut issues)?,
            service_bindings: read_collection(dir, Collection::ServiceBindings, &mut issues)?,
        };

        Ok(LoadedSnapshot { snapshot, issues })
    }

    /// Persist every collection to a cache directory.
    ///
    /// Each file is written to a temporary sibling and renamed into place, so
    /// a concurrent reader sees either the previous file or the new one.
    pub fn write(&self, dir: &Path) -> Result<(), SnapshotError> {
        fs::create_dir_all(dir).map_err(|source| SnapshotError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        write_collection(dir, Collection::Organizations, &self.orgs)?;
        write_collection(dir, Collection::Spaces, &self.spaces)?;
        write_collection(dir, Collection::Apps, &self.apps)?;
        write_collection(dir, Collection::AppSummaries, &self.app_summaries)?;
        write_collection(dir, Collection::Services, &self.services)?;
        write_collection(dir, Collection::ServicePlans, &self.service_plans)?;
        write_collection(dir, Collection::ServiceInstances, &self.service_instances)?;
        write_collection(dir, Collection::ServiceBindings, &self.service_bindings)?;
        Ok(())
    }

    /// Number of records held for a collection
    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Organizations => self.orgs.len(),
            Collection::Spaces => self.spaces.len(),
            Collection::Apps => self.apps.len(),
            Collection::AppSummaries => self.app_summaries.len(),
            Collection::Services => self.services.len(),
            Collection::ServicePlans => self.service_plans.len(),
            Collection::ServiceInstances => self.service_instances.len(),
            Collection::ServiceBindings => self.service_bindings.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Collection::ALL.iter().all(|c| self.len(*c) == 0)
    }
}

fn read_collection<T: DeserializeOwned>(
    dir: &Path,
    collection: Collection,
    issues: &mut Vec<SnapshotIssue>,
) -> Result<Vec<T>, SnapshotError> {
    let path = dir.join(collection.file_name());

    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} not present in cache", collection.file_name());
            issues.push(SnapshotIssue::Missing { collection, path });
            return Ok(Vec::new());
        }
        Err(source) => return Err(SnapshotError::Read { path, source }),
    };

    if bytes.trim_ascii().is_empty() {
        issues.push(SnapshotIssue::Missing { collection, path });
        return Ok(Vec::new());
    }

    // A synchronizer may persist an empty listing as `null`
    match serde_json::from_slice::<Option<Vec<T>>>(&bytes) {
        Ok(records) => {
            let records = records.unwrap_or_default();
            debug!("Loaded {} {}", records.len(), collection.as_str());
            Ok(records)
        }
        Err(e) => {
            warn!("Ignoring unparseable {}: {}", path.display(), e);
            issues.push(SnapshotIssue::Malformed {
                collection,
                path,
                message: e.to_string(),
            });
            Ok(Vec::new())
        }
    }
}

fn write_collection<T: Serialize>(
    dir: &Path,
    collection: Collection,
    records: &[T],
) -> Result<(), SnapshotError> {
    let path = dir.join(collection.file_name());
    let tmp = dir.join(format!(".{}.tmp", collection.file_name()));

    let bytes = serde_json::to_vec(records)
        .map_err(|source| SnapshotError::Serialize { collection, source })?;

    fs::write(&tmp, bytes).map_err(|source| SnapshotError::Write {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, &path).map_err(|source| SnapshotError::Write {
        path: path.clone(),
        source,
    })?;

    debug!("Wrote {} {} to {}", records.len(), collection.as_str(), path.display());
    Ok(())
}
