//! file path resolution
//!
//! A query either names one file exactly (an equality filter on `path`) or falls back to the
//! glob patterns of the connection config. An exact path is taken as-is: globs are not applied,
//! because a pattern could never equal the `path` value the caller asked for.
use crate::config::AnsibleConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// The kind of file a table reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Inventory,
    Playbook,
}

impl FileKind {
    /// Name of the config option holding the patterns for this kind
    pub fn config_key(&self) -> &'static str {
        match self {
            FileKind::Inventory => "inventory_file_paths",
            FileKind::Playbook => "playbook_file_paths",
        }
    }
}

/// A file to be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePath {
    pub path: PathBuf,
}

impl FilePath {
    /// The path as it appears in rows
    pub fn display(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

#[derive(derive_new::new, Debug)]
pub struct PathResolver<'c> {
    config: &'c AnsibleConfig,
}

impl<'c> PathResolver<'c> {
    /// Produces the files to read for `kind`
    ///
    /// Configuration problems (no patterns, invalid pattern) are reported here, before any file
    /// is touched. Expansion itself is lazy and happens while iterating.
    pub fn resolve(&self, kind: FileKind, exact_path: Option<&Path>) -> Result<ResolvedPaths<'c>> {
        if let Some(path) = exact_path {
            tracing::debug!(path=%path.display(), "exact path requested, skipping globs");
            return Ok(ResolvedPaths {
                source: Source::Exact(Some(path.to_owned())),
            });
        }

        let Some(patterns) = self.config.patterns(kind) else {
            return Err(Error::Configuration(format!(
                "{} must be configured",
                kind.config_key()
            )));
        };

        for pattern in patterns {
            glob::Pattern::new(&expand_home(pattern)).map_err(|source| Error::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        Ok(ResolvedPaths {
            source: Source::Globs {
                patterns: patterns.iter(),
                current: None,
            },
        })
    }
}

/// Lazy, finite sequence of [FilePath]s
///
/// Patterns are expanded in configured order, one at a time, when iteration reaches them.
/// Matches are not deduplicated across patterns. Directories are skipped.
pub struct ResolvedPaths<'c> {
    source: Source<'c>,
}

enum Source<'c> {
    Exact(Option<PathBuf>),
    Globs {
        patterns: std::slice::Iter<'c, String>,
        current: Option<glob::Paths>,
    },
}

impl Iterator for ResolvedPaths<'_> {
    type Item = Result<FilePath>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.source {
            Source::Exact(path) => path.take().map(|path| Ok(FilePath { path })),
            Source::Globs { patterns, current } => loop {
                if let Some(paths) = current {
                    match paths.next() {
                        Some(Ok(path)) if path.is_dir() => {
                            tracing::trace!(path=%path.display(), "skipping directory");
                            continue;
                        }
                        Some(Ok(path)) => return Some(Ok(FilePath { path })),
                        Some(Err(err)) => {
                            let path = err.path().to_owned();
                            return Some(Err(Error::Io {
                                path,
                                source: err.into(),
                            }));
                        }
                        None => *current = None,
                    }
                }

                let pattern = patterns.next()?;
                tracing::debug!(%pattern, "expanding glob");
                match glob::glob(&expand_home(pattern)) {
                    Ok(paths) => *current = Some(paths),
                    // already validated in resolve
                    Err(source) => {
                        return Some(Err(Error::Pattern {
                            pattern: pattern.clone(),
                            source,
                        }))
                    }
                }
            },
        }
    }
}

/// Expands a leading `~` to the home directory
fn expand_home(pattern: &str) -> String {
    let rest = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return pattern.to_string(),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home.to_string_lossy().into_owned(),
        Some(home) => home.join(rest).to_string_lossy().into_owned(),
        None => pattern.to_string(),
    }
}
