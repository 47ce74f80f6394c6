//! # ansq - ansible files as tables
//!
//! For CLI usage see `ansq --help`.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `ansq` works internally.
//!
//! ### Tables
//!
//! Four tables can be queried:
//!
//! | table      | source files         | one row per                  |
//! |------------|----------------------|------------------------------|
//! | `group`    | INI inventories      | group, `all` and `ungrouped` included |
//! | `host`     | INI inventories      | host                         |
//! | `playbook` | YAML playbooks       | play                         |
//! | `task`     | YAML playbooks       | entry of a play's `tasks`    |
//!
//! Every row carries the `path` of the file it came from.
//!
//! ### Finding files
//!
//! see [resolve::PathResolver]
//!
//! A query either names a single file (the row's `path`) or uses the glob patterns of the
//! connection config ([config::AnsibleConfig]):
//!
//! ```hcl
//! connection "ansible" {
//!   inventory_file_paths = ["/etc/ansible/hosts", "~/inventories/*.ini"]
//!   playbook_file_paths  = ["./playbooks/**/*.yml"]
//! }
//! ```
//!
//! Without a path and without patterns the query fails before anything is read. Directories
//! matched by a pattern are skipped.
//!
//! ### Parsing
//!
//! Inventories are parsed into an [inventory::Inventory], a graph of groups and hosts stored in
//! an arena. The file only states direct relations; the rows show closures:
//!
//! ```ini
//! [web]
//! h1
//!
//! [web:children]
//! db
//!
//! [db]
//! h2
//! ```
//!
//! `h2` is a member of `db`, of `web` (through `db`) and of `all`. `web` lists `h1` and `h2`.
//!
//! Playbooks are parsed into [playbook::Playbook]s. Known keys bind to typed fields, values
//! without a fixed shape (`vars`, `roles`, ...) are kept as [value::Value].
//!
//! ### Streaming
//!
//! see [stream::RowStream]
//!
//! Files are processed one at a time, in the order the resolver yields them. A file is parsed
//! once the rows of the previous file are consumed, so stopping early saves the remaining work.
//! The first error ends the stream.
//!
//! ### Logging
//!
//! The library logs through `tracing`. The `ansq` binary writes the log to stderr and reads
//! the filter from the `ANSQ_LOG` environment variable (for example `ANSQ_LOG=ansq=debug`).
pub mod config;
pub mod error;
pub mod inventory;
pub mod playbook;
pub mod resolve;
pub mod rows;
pub mod stream;
pub mod value;

pub use config::AnsibleConfig;
pub use error::{Error, Result};
pub use stream::{
    stream_groups, stream_hosts, stream_playbooks, stream_tasks, Query, Row, RowStream, Table,
};
