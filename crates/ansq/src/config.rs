//! connection configuration
//!
//! The configuration lives in an HCL connection file:
//!
//! ```hcl
//! connection "ansible" {
//!   plugin = "ansible"
//!
//!   inventory_file_paths = ["/etc/ansible/hosts", "~/inventories/*.ini"]
//!   playbook_file_paths  = ["./playbooks/**/*.yml"]
//! }
//! ```
//!
//! It is read once and then handed to every query by reference. Nothing mutates it afterwards.
use crate::error::{Error, Result};
use crate::resolve::FileKind;
use std::path::Path;

/// Glob patterns of the files to query
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct AnsibleConfig {
    #[serde(default)]
    pub inventory_file_paths: Option<Vec<String>>,
    #[serde(default)]
    pub playbook_file_paths: Option<Vec<String>>,
}

impl AnsibleConfig {
    /// Configured patterns for a kind of file
    ///
    /// An empty list counts as not configured.
    pub fn patterns(&self, kind: FileKind) -> Option<&[String]> {
        let patterns = match kind {
            FileKind::Inventory => self.inventory_file_paths.as_deref(),
            FileKind::Playbook => self.playbook_file_paths.as_deref(),
        };

        patterns.filter(|patterns| !patterns.is_empty())
    }

    /// Appends patterns to the list of the given kind
    pub fn extend_patterns<I, S>(&mut self, kind: FileKind, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = match kind {
            FileKind::Inventory => &mut self.inventory_file_paths,
            FileKind::Playbook => &mut self.playbook_file_paths,
        };

        let mut patterns = patterns.into_iter().map(Into::into).peekable();
        if patterns.peek().is_none() {
            return;
        }

        list.get_or_insert_with(Vec::new).extend(patterns);
    }

    /// Reads a connection block from HCL source
    ///
    /// Picks the `connection` block labeled `connection`, or the first one if none is given.
    /// Attributes other than the path lists (`plugin`, ...) are ignored.
    pub fn from_hcl_str(source: &str, connection: Option<&str>) -> Result<Self> {
        let body = hcl::parse(source)?;

        let block = body
            .blocks()
            .filter(|block| block.identifier() == "connection")
            .find(|block| match connection {
                None => true,
                Some(name) => block
                    .labels()
                    .first()
                    .is_some_and(|label| label.as_str() == name),
            });

        let Some(block) = block else {
            return Err(Error::Configuration(match connection {
                Some(name) => format!("connection {name:?} not found"),
                None => "no connection block found".to_string(),
            }));
        };

        let config: AnsibleConfig = hcl::from_body(block.body().clone())?;
        tracing::debug!(?config, "connection config loaded");
        Ok(config)
    }

    pub fn load_file(path: &Path, connection: Option<&str>) -> Result<Self> {
        tracing::info!(path=%path.display(), "loading connection config");

        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

        Self::from_hcl_str(&source, connection)
    }
}
