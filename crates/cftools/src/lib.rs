//! cftools - answer operator questions from a local platform snapshot
//!
//! "Ask the cache, not the controller."
//!
//! A synchronizer persists eight flat collections (organizations, spaces,
//! apps, app summaries, services, service plans, service instances, service
//! bindings). This crate loads them into an immutable [`Snapshot`] and
//! answers questions against it:
//! - where does an app or service instance live (org / space)
//! - what is bound to an app, and which apps use a service instance
//! - which apps are crashed or running below their desired instance count
//! - which orgs and spaces use a given service, as a tree

pub mod health;
pub mod model;
pub mod resolve;
pub mod snapshot;
pub mod tree;

pub use health::HealthReport;
pub use resolve::Resolver;
pub use snapshot::{Collection, LoadPolicy, LoadedSnapshot, Snapshot, SnapshotError, SnapshotIssue};
