//! flat rows of the four tables
//!
//! Projection is pure: the same parsed file and path always give the same rows, in declaration
//! order. Relations are projected as closures (see [crate::inventory]) and rendered as names.
use crate::inventory::Inventory;
use crate::playbook::{Play, PlayTasks, Task};
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub name: String,
    pub hosts: Vec<String>,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub vars: IndexMap<String, Value>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRow {
    pub name: String,
    pub port: Option<u16>,
    pub vars: IndexMap<String, Value>,
    pub groups: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayRow {
    #[serde(flatten)]
    pub play: Play,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    pub path: String,
    /// Name of the play the task belongs to, as written (may be empty)
    pub playbook_name: String,
    /// Position of that play in its file, starting at 0
    pub play_index: usize,
    #[serde(flatten)]
    pub task: Task,
}

pub fn project_groups(inventory: &Inventory, path: &str) -> Vec<GroupRow> {
    inventory
        .groups()
        .map(|(id, group)| GroupRow {
            name: group.name.clone(),
            hosts: inventory.host_names(inventory.group_hosts(id)),
            parents: inventory.group_names(inventory.ancestors(id)),
            children: inventory.group_names(inventory.descendants(id)),
            vars: inventory.group_vars(id),
            path: path.to_string(),
        })
        .collect()
}

pub fn project_hosts(inventory: &Inventory, path: &str) -> Vec<HostRow> {
    inventory
        .hosts()
        .map(|(id, host)| HostRow {
            name: host.name.clone(),
            port: host.port,
            vars: inventory.host_vars(id),
            groups: inventory.group_names(inventory.host_groups(id)),
            path: path.to_string(),
        })
        .collect()
}

pub fn project_playbooks(plays: &[Play], path: &str) -> Vec<PlayRow> {
    plays
        .iter()
        .map(|play| PlayRow {
            play: play.clone(),
            path: path.to_string(),
        })
        .collect()
}

pub fn project_tasks(plays: &[PlayTasks], path: &str) -> Vec<TaskRow> {
    plays
        .iter()
        .enumerate()
        .flat_map(|(play_index, play)| {
            play.tasks.iter().map(move |task| TaskRow {
                path: path.to_string(),
                playbook_name: play.name.clone(),
                play_index,
                task: task.clone(),
            })
        })
        .collect()
}
