//! plays and tasks of a YAML playbook
//!
//! A playbook is a list of plays. Only the first YAML document of a file is read; an empty file
//! has no plays, an empty list entry is a play with defaults. Keys that are not part of the
//! record are ignored, keys that are missing keep their default (see [de] for how scalars bind).
//!
//! The record a play is read into depends on the table:
//!
//! - [Play] holds every play field and keeps `tasks` as the [Value] written in the file
//! - [PlayTasks] holds the play's name and its decoded [Task]s, nothing else
//!
//! So a task the task table cannot decode does not break the playbook table, and a play field
//! of an unexpected shape does not break the task table.
mod de;

use crate::error::{Error, Result};
use crate::value::Value;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playbook<P = Play> {
    pub plays: Vec<P>,
}

impl<P> std::str::FromStr for Playbook<P>
where
    P: DeserializeOwned + Default,
{
    type Err = serde_yaml::Error;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let Some(document) = serde_yaml::Deserializer::from_str(source).next() else {
            return Ok(Playbook { plays: vec![] });
        };

        let plays = de::list(document)?;
        Ok(Playbook { plays })
    }
}

impl<P> Playbook<P>
where
    P: DeserializeOwned + Default,
{
    pub fn parse_file(path: &Path) -> Result<Self> {
        tracing::debug!(path=%path.display(), "parsing playbook");

        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

        source.parse().map_err(|source| Error::Playbook {
            path: path.to_owned(),
            source,
        })
    }
}

/// One play of a playbook
#[derive(Debug, Clone, Default, PartialEq, Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Play {
    #[serde(deserialize_with = "de::string")]
    pub name: String,
    #[serde(deserialize_with = "de::string")]
    pub hosts: String,

    #[serde(deserialize_with = "de::bool")]
    pub r#become: bool,
    #[serde(deserialize_with = "de::string")]
    pub become_user: String,
    #[serde(deserialize_with = "de::string")]
    pub become_flags: String,
    #[serde(deserialize_with = "de::string")]
    pub become_method: String,

    #[serde(deserialize_with = "de::bool")]
    pub check_mode: bool,
    #[serde(deserialize_with = "de::string")]
    pub debugger: String,
    #[serde(deserialize_with = "de::bool")]
    pub diff: bool,
    #[serde(deserialize_with = "de::bool")]
    pub force_handlers: bool,
    #[serde(deserialize_with = "de::bool")]
    pub gather_facts: bool,
    #[serde(deserialize_with = "de::bool")]
    pub ignore_errors: bool,
    #[serde(deserialize_with = "de::bool")]
    pub ignore_unreachable: bool,
    #[serde(deserialize_with = "de::int")]
    pub max_fail_percentage: i64,
    #[serde(deserialize_with = "de::bool")]
    pub no_log: bool,
    #[serde(deserialize_with = "de::string")]
    pub order: String,
    #[serde(deserialize_with = "de::string")]
    pub remote_user: String,
    #[serde(deserialize_with = "de::bool")]
    pub run_once: bool,
    #[serde(deserialize_with = "de::int")]
    pub serial: i64,
    #[serde(deserialize_with = "de::string")]
    pub strategy: String,
    #[serde(deserialize_with = "de::string")]
    pub tags: String,
    #[serde(deserialize_with = "de::int")]
    pub throttle: i64,
    #[serde(deserialize_with = "de::int")]
    pub timeout: i64,

    pub collections: Option<Value>,
    pub environment: Option<Value>,
    /// Also bound from `gether_subset`, a misspelling one schema revision used
    #[serde(alias = "gether_subset")]
    pub gather_subset: Option<Value>,
    pub handlers: Option<Value>,
    pub module_defaults: Option<Value>,
    pub post_tasks: Option<Value>,
    pub pre_tasks: Option<Value>,
    pub roles: Option<Value>,
    pub tasks: Option<Value>,

    pub vars: Option<Value>,
    pub vars_files: Option<Value>,
    pub vars_prompt: Option<Value>,
}

/// A play as the task table sees it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayTasks {
    #[serde(deserialize_with = "de::string")]
    pub name: String,
    #[serde(deserialize_with = "de::list")]
    pub tasks: Vec<Task>,
}

/// One entry of a play's `tasks`
///
/// `group` and `user` are written as `task_group` and `task_user`, the plain names collide
/// with reserved words of query languages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Task {
    #[serde(deserialize_with = "de::string")]
    pub name: String,
    #[serde(deserialize_with = "de::string")]
    pub any_errors_fatal: String,
    #[serde(deserialize_with = "de::int")]
    pub r#async: i64,

    #[serde(deserialize_with = "de::bool")]
    pub r#become: bool,
    #[serde(deserialize_with = "de::string")]
    pub become_user: String,
    #[serde(deserialize_with = "de::string")]
    pub become_flags: String,
    #[serde(deserialize_with = "de::string")]
    pub become_method: String,

    #[serde(deserialize_with = "de::string")]
    pub changed_when: String,
    #[serde(deserialize_with = "de::bool")]
    pub check_mode: bool,
    pub connection: Option<Value>,
    #[serde(deserialize_with = "de::string")]
    pub debugger: String,
    #[serde(deserialize_with = "de::int")]
    pub delay: i64,
    #[serde(deserialize_with = "de::bool")]
    pub delegate_facts: bool,
    #[serde(deserialize_with = "de::string")]
    pub delegate_to: String,
    #[serde(deserialize_with = "de::bool")]
    pub diff: bool,
    #[serde(deserialize_with = "de::string")]
    pub failed_when: String,
    #[serde(deserialize_with = "de::bool")]
    pub ignore_errors: bool,
    #[serde(deserialize_with = "de::bool")]
    pub ignore_unreachable: bool,
    #[serde(deserialize_with = "de::string")]
    pub r#loop: String,
    #[serde(deserialize_with = "de::string")]
    pub loop_action: String,
    #[serde(deserialize_with = "de::bool")]
    pub no_log: bool,
    #[serde(deserialize_with = "de::int")]
    pub poll: i64,
    #[serde(deserialize_with = "de::int")]
    pub port: i64,
    #[serde(deserialize_with = "de::string")]
    pub register: String,
    #[serde(deserialize_with = "de::string")]
    pub remote_user: String,
    #[serde(deserialize_with = "de::int")]
    pub retries: i64,
    #[serde(deserialize_with = "de::bool")]
    pub run_once: bool,
    #[serde(deserialize_with = "de::int")]
    pub throttle: i64,
    #[serde(deserialize_with = "de::int")]
    pub timeout: i64,
    #[serde(deserialize_with = "de::string")]
    pub until: String,
    #[serde(deserialize_with = "de::string")]
    pub when: String,

    pub collections: Option<Value>,
    pub loop_control: Option<Value>,
    pub module_defaults: Option<Value>,
    pub notify: Option<Value>,
    #[serde(deserialize_with = "de::strings")]
    pub tags: Option<Vec<String>>,
    #[serde(rename(serialize = "task_group", deserialize = "group"))]
    pub group: Option<Value>,
    #[serde(rename(serialize = "task_user", deserialize = "user"))]
    pub user: Option<Value>,
    pub vars: Option<Value>,
}
