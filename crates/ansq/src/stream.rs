//! lazy row streams over resolved files
//!
//! A stream pulls one path from the [ResolvedPaths], parses and projects that file, then hands
//! out its rows one by one. The next file is only opened once the rows of the current one are
//! used up, so a consumer that stops early never touches the remaining files.
//!
//! The first error ends the stream. Rows handed out before stay valid.
use crate::config::AnsibleConfig;
use crate::error::Result;
use crate::inventory::Inventory;
use crate::playbook::{Play, PlayTasks, Playbook};
use crate::resolve::{FileKind, FilePath, PathResolver, ResolvedPaths};
use crate::rows::{self, GroupRow, HostRow, PlayRow, TaskRow};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// The tables that can be queried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Group,
    Host,
    Playbook,
    Task,
}

impl Table {
    pub fn file_kind(&self) -> FileKind {
        match self {
            Table::Group | Table::Host => FileKind::Inventory,
            Table::Playbook | Table::Task => FileKind::Playbook,
        }
    }
}

/// A row of any table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Group(GroupRow),
    Host(HostRow),
    Playbook(PlayRow),
    Task(TaskRow),
}

/// Parses one file into rows
pub type FileRows<R> = fn(&FilePath) -> Result<Vec<R>>;

pub struct RowStream<'c, R> {
    paths: ResolvedPaths<'c>,
    file_rows: FileRows<R>,
    buffer: VecDeque<R>,
    done: bool,
}

impl<'c, R> RowStream<'c, R> {
    pub fn new(paths: ResolvedPaths<'c>, file_rows: FileRows<R>) -> Self {
        Self {
            paths,
            file_rows,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    fn fail<T>(&mut self, err: crate::error::Error) -> Option<Result<T>> {
        tracing::debug!(error=%err, "stream stopped");
        self.done = true;
        self.buffer.clear();
        Some(Err(err))
    }
}

impl<R> Iterator for RowStream<'_, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }

            if self.done {
                return None;
            }

            let file = match self.paths.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(err)) => return self.fail(err),
                Some(Ok(file)) => file,
            };

            match (self.file_rows)(&file) {
                Ok(rows) => {
                    tracing::debug!(path=%file.path.display(), rows = rows.len(), "file done");
                    self.buffer = rows.into();
                }
                Err(err) => return self.fail(err),
            }
        }
    }
}

impl<R> std::iter::FusedIterator for RowStream<'_, R> {}

fn group_rows(file: &FilePath) -> Result<Vec<GroupRow>> {
    let inventory = Inventory::parse_file(&file.path)?;
    Ok(rows::project_groups(&inventory, &file.display()))
}

fn host_rows(file: &FilePath) -> Result<Vec<HostRow>> {
    let inventory = Inventory::parse_file(&file.path)?;
    Ok(rows::project_hosts(&inventory, &file.display()))
}

fn play_rows(file: &FilePath) -> Result<Vec<PlayRow>> {
    let playbook = Playbook::<Play>::parse_file(&file.path)?;
    Ok(rows::project_playbooks(&playbook.plays, &file.display()))
}

fn task_rows(file: &FilePath) -> Result<Vec<TaskRow>> {
    let playbook = Playbook::<PlayTasks>::parse_file(&file.path)?;
    Ok(rows::project_tasks(&playbook.plays, &file.display()))
}

fn stream<'c, R>(
    config: &'c AnsibleConfig,
    kind: FileKind,
    path: Option<&Path>,
    file_rows: FileRows<R>,
) -> Result<RowStream<'c, R>> {
    let paths = PathResolver::new(config).resolve(kind, path)?;
    Ok(RowStream::new(paths, file_rows))
}

pub fn stream_groups<'c>(
    config: &'c AnsibleConfig,
    path: Option<&Path>,
) -> Result<RowStream<'c, GroupRow>> {
    stream(config, FileKind::Inventory, path, group_rows)
}

pub fn stream_hosts<'c>(
    config: &'c AnsibleConfig,
    path: Option<&Path>,
) -> Result<RowStream<'c, HostRow>> {
    stream(config, FileKind::Inventory, path, host_rows)
}

pub fn stream_playbooks<'c>(
    config: &'c AnsibleConfig,
    path: Option<&Path>,
) -> Result<RowStream<'c, PlayRow>> {
    stream(config, FileKind::Playbook, path, play_rows)
}

pub fn stream_tasks<'c>(
    config: &'c AnsibleConfig,
    path: Option<&Path>,
) -> Result<RowStream<'c, TaskRow>> {
    stream(config, FileKind::Playbook, path, task_rows)
}

/// A query against one table, optionally restricted to one file
///
/// ```no_run
/// # fn main() -> ansq::Result<()> {
/// let config = ansq::AnsibleConfig {
///     inventory_file_paths: Some(vec!["/etc/ansible/hosts".into()]),
///     ..Default::default()
/// };
///
/// for row in ansq::Query::new(ansq::Table::Host, &config).rows()? {
///     println!("{:?}", row?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Query<'c> {
    table: Table,
    config: &'c AnsibleConfig,
    path: Option<PathBuf>,
}

impl<'c> Query<'c> {
    pub fn new(table: Table, config: &'c AnsibleConfig) -> Self {
        Self {
            table,
            config,
            path: None,
        }
    }

    /// Only read `path`; the configured patterns are not used
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn table(&self) -> Table {
        self.table
    }

    pub fn rows(&self) -> Result<RowStream<'c, Row>> {
        let file_rows: FileRows<Row> = match self.table {
            Table::Group => |file: &FilePath| {
                Ok(group_rows(file)?.into_iter().map(Row::Group).collect())
            },
            Table::Host => |file: &FilePath| {
                Ok(host_rows(file)?.into_iter().map(Row::Host).collect())
            },
            Table::Playbook => |file: &FilePath| {
                Ok(play_rows(file)?.into_iter().map(Row::Playbook).collect())
            },
            Table::Task => |file: &FilePath| {
                Ok(task_rows(file)?.into_iter().map(Row::Task).collect())
            },
        };

        stream(
            self.config,
            self.table.file_kind(),
            self.path.as_deref(),
            file_rows,
        )
    }
}
