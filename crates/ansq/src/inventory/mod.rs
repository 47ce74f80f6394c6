//! host/group graph of an INI inventory
//!
//! [Inventory] is an arena: groups and hosts are stored in insertion order and referred to by
//! their index ([GroupId], [HostId]). Indices are stable once assigned. Relations are stored as
//! index sets on both ends, so every edge is always visible from both sides:
//!
//! - `Group::children` / `Group::parents`
//! - `Group::hosts` / `Host::groups`
//!
//! These sets hold what the file says directly. Most consumers want the closures instead (a
//! host in `db` that is a child of `web` is a member of `web` as well), see
//! [Inventory::host_groups], [Inventory::group_hosts], [Inventory::ancestors] and
//! [Inventory::descendants]. The format does not forbid cycles (`a` child of `b`, `b` child of
//! `a`), so every traversal keeps a visited set.
//!
//! `all` and `ungrouped` always exist, at [ALL] and [UNGROUPED].
mod parser;
mod pattern;
mod tokens;

pub use parser::InventoryError;

use crate::error::{Error, Result};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::Path;

pub type GroupId = usize;
pub type HostId = usize;

/// Index of the `all` group
pub const ALL: GroupId = 0;
/// Index of the `ungrouped` group
pub const UNGROUPED: GroupId = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    /// Variables from this group's `[name:vars]` sections only
    pub vars: IndexMap<String, Value>,
    pub hosts: BTreeSet<HostId>,
    pub parents: BTreeSet<GroupId>,
    pub children: BTreeSet<GroupId>,
}

impl Group {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Default::default(),
            hosts: Default::default(),
            parents: Default::default(),
            children: Default::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Host {
    pub name: String,
    /// From the `ansible_port`/`ansible_ssh_port` variables; `name:port` sets `ansible_port`
    pub port: Option<u16>,
    /// Inline variables of the host lines
    pub vars: IndexMap<String, Value>,
    pub groups: BTreeSet<GroupId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    groups: Vec<Group>,
    hosts: Vec<Host>,
    group_index: HashMap<String, GroupId>,
    host_index: HashMap<String, HostId>,
}

impl Default for Inventory {
    fn default() -> Self {
        let mut inventory = Self {
            groups: Default::default(),
            hosts: Default::default(),
            group_index: Default::default(),
            host_index: Default::default(),
        };

        inventory.get_or_insert_group("all");
        inventory.get_or_insert_group("ungrouped");
        inventory
    }
}

impl std::str::FromStr for Inventory {
    type Err = InventoryError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parser::parse(source)
    }
}

impl Inventory {
    pub fn parse_file(path: &Path) -> Result<Self> {
        tracing::debug!(path=%path.display(), "parsing inventory");

        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

        source.parse().map_err(|source| Error::Inventory {
            path: path.to_owned(),
            source,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.groups.iter().enumerate()
    }

    pub fn hosts(&self) -> impl Iterator<Item = (HostId, &Host)> {
        self.hosts.iter().enumerate()
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id]
    }

    pub fn host(&self, id: HostId) -> &Host {
        &self.hosts[id]
    }

    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.group_index.get(name).copied()
    }

    pub fn host_id(&self, name: &str) -> Option<HostId> {
        self.host_index.get(name).copied()
    }

    pub fn group_names(&self, ids: impl IntoIterator<Item = GroupId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| self.groups[id].name.clone())
            .collect()
    }

    pub fn host_names(&self, ids: impl IntoIterator<Item = HostId>) -> Vec<String> {
        ids.into_iter()
            .map(|id| self.hosts[id].name.clone())
            .collect()
    }

    /// Every group above `id`, following parent edges
    ///
    /// `id` itself is left out, even when a cycle leads back to it.
    pub fn ancestors(&self, id: GroupId) -> BTreeSet<GroupId> {
        self.walk(id, |group| &group.parents)
    }

    /// Every group below `id`, following child edges
    pub fn descendants(&self, id: GroupId) -> BTreeSet<GroupId> {
        self.walk(id, |group| &group.children)
    }

    /// Hosts of `id` and of all its descendants
    pub fn group_hosts(&self, id: GroupId) -> BTreeSet<HostId> {
        let mut hosts = self.groups[id].hosts.clone();
        for descendant in self.descendants(id) {
            hosts.extend(&self.groups[descendant].hosts);
        }
        hosts
    }

    /// Groups `id` is a member of, directly or through a parent group
    pub fn host_groups(&self, id: HostId) -> BTreeSet<GroupId> {
        let mut groups = self.hosts[id].groups.clone();
        for group in &self.hosts[id].groups {
            groups.extend(self.ancestors(*group));
        }
        groups
    }

    /// Variables of a group merged with those of its ancestors
    ///
    /// Ancestors are applied shallow to deep (distance from `all`, then name), the group's own
    /// variables last.
    pub fn group_vars(&self, id: GroupId) -> IndexMap<String, Value> {
        let mut vars = IndexMap::new();
        for ancestor in self.by_depth(self.ancestors(id)) {
            merge(&mut vars, &self.groups[ancestor].vars);
        }
        merge(&mut vars, &self.groups[id].vars);
        vars
    }

    /// Variables of every group the host is in, then the host's own inline variables
    pub fn host_vars(&self, id: HostId) -> IndexMap<String, Value> {
        let mut vars = IndexMap::new();
        for group in self.by_depth(self.host_groups(id)) {
            merge(&mut vars, &self.groups[group].vars);
        }
        merge(&mut vars, &self.hosts[id].vars);
        vars
    }

    /// Breadth first over `next`, `start` excluded
    fn walk<F>(&self, start: GroupId, next: F) -> BTreeSet<GroupId>
    where
        F: Fn(&Group) -> &BTreeSet<GroupId>,
    {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<GroupId> = next(&self.groups[start]).iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            if id == start || !seen.insert(id) {
                continue;
            }
            queue.extend(next(&self.groups[id]));
        }

        seen
    }

    /// Shortest distance of every group from `all`
    fn depths(&self) -> Vec<usize> {
        let mut depths = vec![usize::MAX; self.groups.len()];
        depths[ALL] = 0;

        let mut queue = VecDeque::from([ALL]);
        while let Some(id) = queue.pop_front() {
            for child in &self.groups[id].children {
                if depths[*child] == usize::MAX {
                    depths[*child] = depths[id] + 1;
                    queue.push_back(*child);
                }
            }
        }

        depths
    }

    fn by_depth(&self, ids: BTreeSet<GroupId>) -> Vec<GroupId> {
        let depths = self.depths();
        let mut ids: Vec<_> = ids.into_iter().collect();
        ids.sort_by(|a, b| {
            depths[*a]
                .cmp(&depths[*b])
                .then_with(|| self.groups[*a].name.cmp(&self.groups[*b].name))
        });
        ids
    }
}

/// Graph construction, used by the parser
impl Inventory {
    fn get_or_insert_group(&mut self, name: &str) -> GroupId {
        if let Some(id) = self.group_index.get(name) {
            return *id;
        }

        let id = self.groups.len();
        self.groups.push(Group::new(name));
        self.group_index.insert(name.to_string(), id);
        id
    }

    fn get_or_insert_host(&mut self, name: &str) -> HostId {
        if let Some(id) = self.host_index.get(name) {
            return *id;
        }

        let id = self.hosts.len();
        self.hosts.push(Host {
            name: name.to_string(),
            port: None,
            vars: Default::default(),
            groups: Default::default(),
        });
        self.host_index.insert(name.to_string(), id);
        id
    }

    fn add_child(&mut self, parent: GroupId, child: GroupId) {
        self.groups[parent].children.insert(child);
        self.groups[child].parents.insert(parent);
    }

    fn add_member(&mut self, group: GroupId, host: HostId) {
        self.groups[group].hosts.insert(host);
        self.hosts[host].groups.insert(group);
    }

    fn remove_member(&mut self, group: GroupId, host: HostId) {
        self.groups[group].hosts.remove(&host);
        self.hosts[host].groups.remove(&group);
    }

    /// Applies the implicit rules of the format once everything is read
    ///
    /// - `ungrouped` holds exactly the hosts without another group besides `all`
    /// - every group not below `all` yet becomes a child of `all`
    /// - `ansible_port`/`ansible_ssh_port` set the port of a host
    fn reconcile(&mut self) {
        for host in 0..self.hosts.len() {
            let has_group = self.hosts[host]
                .groups
                .iter()
                .any(|group| *group != ALL && *group != UNGROUPED);

            if has_group {
                self.remove_member(UNGROUPED, host);
            } else {
                self.add_member(UNGROUPED, host);
            }
        }

        let mut below_all = self.descendants(ALL);
        for group in 0..self.groups.len() {
            if group == ALL || below_all.contains(&group) {
                continue;
            }

            tracing::trace!(group = %self.groups[group].name, "attaching to all");
            self.add_child(ALL, group);
            below_all.insert(group);
            below_all.extend(self.descendants(group));
        }

        for host in 0..self.hosts.len() {
            let vars = self.host_vars(host);
            let port = ["ansible_port", "ansible_ssh_port"]
                .iter()
                .find_map(|key| vars.get(*key))
                .and_then(Value::as_str)
                .and_then(|port| port.trim().parse::<u16>().ok());

            if port.is_some() {
                self.hosts[host].port = port;
            }
        }
    }
}

fn merge(into: &mut IndexMap<String, Value>, from: &IndexMap<String, Value>) {
    for (key, value) in from {
        into.insert(key.clone(), value.clone());
    }
}
