//! Service usage tree
//!
//! Groups the instances of one service by organization and space and renders
//! them as a text tree:
//!
//! ```text
//! . O1
//! ├── S1
//! │   ├── db1
//! │   └── db3
//! ├── S2
//! +   └── db2
//! ```
//!
//! Grouping follows the catalog order of organizations and spaces, never the
//! order instances were found in and never a sort by name. Orgs and spaces
//! without a matching instance are left out.

use serde::Serialize;
use std::fmt;

use crate::model::{Organization, ServiceInstance, Space};
use crate::snapshot::Snapshot;

const ORG_PREFIX: &str = ".";
const SPACE_PREFIX: &str = "├──";
const LEAF_MIDDLE: &str = "│   ├──";
const LEAF_LAST_IN_SPACE: &str = "│   └──";
const LEAF_LAST_IN_TREE: &str = "+   └──";

/// One instance with the org and space it is grouped under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TreeEntry<'a> {
    pub org: &'a Organization,
    pub space: &'a Space,
    pub instance: &'a ServiceInstance,
}

/// Materialize (org, space, instance) triples for a service, in catalog order
pub fn group<'a>(snapshot: &'a Snapshot, service_guid: &str) -> Vec<TreeEntry<'a>> {
    let matches: Vec<&ServiceInstance> = snapshot
        .service_instances
        .iter()
        .filter(|i| i.service_guid == service_guid)
        .collect();

    let mut entries = Vec::with_capacity(matches.len());
    for org in &snapshot.orgs {
        for space in snapshot.spaces.iter().filter(|s| s.organization_guid == org.guid) {
            for &instance in matches.iter().filter(|i| i.space_guid == space.guid) {
                entries.push(TreeEntry {
                    org,
                    space,
                    instance,
                });
            }
        }
    }
    entries
}

/// Where an entry sits relative to its neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// First entry of an organization group
    pub new_org: bool,
    /// First entry of a space group
    pub new_space: bool,
    /// Next entry belongs to another space (or there is none)
    pub last_in_space: bool,
    /// Final entry of the tree
    pub last_in_tree: bool,
}

impl Position {
    /// Position of `entries[index]`
    pub fn at(entries: &[TreeEntry<'_>], index: usize) -> Self {
        let current = &entries[index];
        let prev = index.checked_sub(1).map(|i| &entries[i]);
        let next = entries.get(index + 1);

        let new_org = prev.map_or(true, |p| p.org.guid != current.org.guid);
        let new_space = new_org || prev.map_or(true, |p| p.space.guid != current.space.guid);
        let last_in_tree = next.is_none();
        let last_in_space =
            last_in_tree || next.map_or(true, |n| n.instance.space_guid != current.instance.space_guid);

        Self {
            new_org,
            new_space,
            last_in_space,
            last_in_tree,
        }
    }

    /// Connector glyph for the leaf line
    pub fn leaf_prefix(&self) -> &'static str {
        if self.last_in_tree {
            LEAF_LAST_IN_TREE
        } else if self.last_in_space {
            LEAF_LAST_IN_SPACE
        } else {
            LEAF_MIDDLE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Organization,
    Space,
    Instance,
}

/// A rendered line: connector prefix plus the entity's name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeLine<'a> {
    pub kind: LineKind,
    pub prefix: &'static str,
    pub label: &'a str,
}

impl fmt::Display for TreeLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.prefix, self.label)
    }
}

/// Render grouped entries into tree lines
pub fn render<'a>(entries: &[TreeEntry<'a>]) -> Vec<TreeLine<'a>> {
    let mut lines = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let position = Position::at(entries, index);

        if position.new_org {
            lines.push(TreeLine {
                kind: LineKind::Organization,
                prefix: ORG_PREFIX,
                label: &entry.org.name,
            });
        }
        if position.new_space {
            lines.push(TreeLine {
                kind: LineKind::Space,
                prefix: SPACE_PREFIX,
                label: &entry.space.name,
            });
        }
        lines.push(TreeLine {
            kind: LineKind::Instance,
            prefix: position.leaf_prefix(),
            label: &entry.instance.name,
        });
    }

    lines
}

/// Render grouped entries as plain text, one line each
pub fn render_text(entries: &[TreeEntry<'_>]) -> String {
    render(entries)
        .iter()
        .map(|line| format!("{}\n", line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tests::{instance, org, space};

    fn snapshot() -> Snapshot {
        Snapshot {
            orgs: vec![org("o-2", "O2"), org("o-1", "O1"), org("o-empty", "Empty")],
            spaces: vec![
                space("s-1", "S1", "o-1"),
                space("s-2", "S2", "o-1"),
                space("s-3", "S3", "o-2"),
                space("s-4", "Unused", "o-2"),
            ],
            service_instances: vec![
                instance("i-1", "db1", "s-1", "svc-pg"),
                instance("i-2", "db2", "s-2", "svc-pg"),
                instance("i-3", "cache", "s-1", "svc-redis"),
                instance("i-4", "db3", "s-1", "svc-pg"),
                instance("i-5", "db4", "s-3", "svc-pg"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_group_follows_catalog_order() {
        let snapshot = snapshot();
        let entries = group(&snapshot, "svc-pg");

        let names: Vec<&str> = entries.iter().map(|e| e.instance.name.as_str()).collect();
        assert_eq!(names, vec!["db4", "db1", "db3", "db2"]);
    }

    #[test]
    fn test_render_full_tree() {
        let snapshot = snapshot();
        let entries = group(&snapshot, "svc-pg");

        let expected = "\
. O2
├── S3
│   └── db4
. O1
├── S1
│   ├── db1
│   └── db3
├── S2
+   └── db2
";
        assert_eq!(render_text(&entries), expected);
    }

    #[test]
    fn test_two_spaces_one_instance_each() {
        let snapshot = Snapshot {
            orgs: vec![org("o-1", "O1")],
            spaces: vec![space("s-1", "S1", "o-1"), space("s-2", "S2", "o-1")],
            service_instances: vec![
                instance("i-1", "db1", "s-1", "svc"),
                instance("i-2", "db2", "s-2", "svc"),
            ],
            ..Default::default()
        };
        let lines = render(&group(&snapshot, "svc"));

        let orgs = lines.iter().filter(|l| l.kind == LineKind::Organization).count();
        let spaces = lines.iter().filter(|l| l.kind == LineKind::Space).count();
        assert_eq!(orgs, 1);
        assert_eq!(spaces, 2);

        let rendered: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(
            rendered,
            vec![". O1", "├── S1", "│   └── db1", "├── S2", "+   └── db2"]
        );
    }

    #[test]
    fn test_last_space_with_several_instances() {
        let snapshot = Snapshot {
            orgs: vec![org("o-1", "O1")],
            spaces: vec![space("s-1", "S1", "o-1"), space("s-2", "S2", "o-1")],
            service_instances: vec![
                instance("i-1", "x", "s-1", "svc"),
                instance("i-2", "a", "s-2", "svc"),
                instance("i-3", "b", "s-2", "svc"),
            ],
            ..Default::default()
        };
        let entries = group(&snapshot, "svc");

        let a = Position::at(&entries, 1);
        assert!(a.new_space && !a.last_in_space && !a.last_in_tree);
        let b = Position::at(&entries, 2);
        assert!(!b.new_org && !b.new_space && b.last_in_space && b.last_in_tree);

        let expected = "\
. O1
├── S1
│   └── x
├── S2
│   ├── a
+   └── b
";
        assert_eq!(render_text(&entries), expected);
    }

    #[test]
    fn test_single_instance_is_terminal() {
        let snapshot = Snapshot {
            orgs: vec![org("o-1", "O1")],
            spaces: vec![space("s-1", "S1", "o-1")],
            service_instances: vec![instance("i-1", "only", "s-1", "svc")],
            ..Default::default()
        };
        assert_eq!(render_text(&group(&snapshot, "svc")), ". O1\n├── S1\n+   └── only\n");
    }

    #[test]
    fn test_no_matches_renders_nothing() {
        let snapshot = snapshot();
        let entries = group(&snapshot, "svc-none");
        assert!(entries.is_empty());
        assert!(render(&entries).is_empty());
    }

    #[test]
    fn test_leaf_count_and_org_headers() {
        let snapshot = snapshot();
        let entries = group(&snapshot, "svc-pg");
        let lines = render(&entries);

        let matching = snapshot
            .service_instances
            .iter()
            .filter(|i| i.service_guid == "svc-pg")
            .count();
        let leaves = lines.iter().filter(|l| l.kind == LineKind::Instance).count();
        assert_eq!(leaves, matching);

        let orgs: Vec<&str> = lines
            .iter()
            .filter(|l| l.kind == LineKind::Organization)
            .map(|l| l.label)
            .collect();
        assert_eq!(orgs, vec!["O2", "O1"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let snapshot = snapshot();
        let first = render_text(&group(&snapshot, "svc-pg"));
        let second = render_text(&group(&snapshot, "svc-pg"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_instance_in_orphan_space_is_skipped() {
        let mut snapshot = snapshot();
        snapshot
            .service_instances
            .push(instance("i-9", "lost", "s-missing", "svc-pg"));
        let entries = group(&snapshot, "svc-pg");
        assert!(entries.iter().all(|e| e.instance.name != "lost"));
    }

    #[test]
    fn test_positions() {
        let snapshot = snapshot();
        let entries = group(&snapshot, "svc-pg");

        let first = Position::at(&entries, 0);
        assert!(first.new_org && first.new_space && first.last_in_space);
        assert!(!first.last_in_tree);

        let db1 = Position::at(&entries, 1);
        assert!(db1.new_org && !db1.last_in_space);
        assert_eq!(db1.leaf_prefix(), LEAF_MIDDLE);

        let db3 = Position::at(&entries, 2);
        assert!(!db3.new_org && !db3.new_space && db3.last_in_space);

        let db2 = Position::at(&entries, 3);
        assert!(!db2.new_org && db2.new_space && db2.last_in_tree);
        assert_eq!(db2.leaf_prefix(), LEAF_LAST_IN_TREE);
    }
}
