//! Directory-layout model of a simulator installation.
//!
//! Expected layout under the workspace root:
//!
//! ```text
//! <root>/
//!   mosaic.sh | mosaic.bat          launcher script
//!   logs/<run-dir>/output.csv       one dir per run, names sort newest-last
//!   logs/<run-dir>/apps/<app>/      per-application log dirs
//!   scenarios/<scenario>/
//!     scenario_config.json
//!     output/output_config.xml      event output schema
//!     <federate>/<name>.json        per-federate configuration documents
//! ```
//!
//! Run-directory names are timestamped so reverse lexicographic order is
//! reverse chronological order; index 0 always means the most recent run.

use crate::error::{Error, Result};

use std::fs;
use std::path::{Path, PathBuf};

/// A simulator installation root plus the scenario being worked on.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    scenario: String,
}

/// One run's log directory, produced by [`Workspace::select_result`].
#[derive(Debug, Clone)]
pub struct RunDir {
    path: PathBuf,
}

impl RunDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn output_csv(&self) -> PathBuf {
        self.path.join("output.csv")
    }

    /// Application directory names under `<run>/apps`, newest-style reverse
    /// sort to match run-directory ordering.
    pub fn list_apps(&self) -> Result<Vec<String>> {
        let apps = self.path.join("apps");
        let mut names = read_dir_names(&apps, "apps directory", EntryKind::Dir)?;
        names.sort();
        names.reverse();
        Ok(names)
    }
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, scenario: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            scenario: scenario.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn scenario_dir(&self) -> PathBuf {
        self.root.join("scenarios").join(&self.scenario)
    }

    /// Path of the event output schema document for this scenario.
    pub fn schema_path(&self) -> PathBuf {
        self.scenario_dir().join("output").join("output_config.xml")
    }

    pub fn scenario_config_path(&self) -> PathBuf {
        self.scenario_dir().join("scenario_config.json")
    }

    pub fn federate_dir(&self, federate: &str) -> PathBuf {
        self.scenario_dir().join(federate)
    }

    /// Run-directory names under `logs/`, most recent first.
    pub fn list_results(&self) -> Result<Vec<String>> {
        let logs = self.root.join("logs");
        let mut dirs = read_dir_names(&logs, "logs directory", EntryKind::Dir)?;
        dirs.sort();
        dirs.reverse();
        Ok(dirs)
    }

    /// Select one run by recency index (0 = most recent).
    pub fn select_result(&self, idx: usize) -> Result<RunDir> {
        let dirs = self.list_results()?;
        let name = dirs.get(idx).ok_or_else(|| Error::NotFound {
            what: format!("run directory at index {} ({} available)", idx, dirs.len()),
            path: self.root.join("logs"),
        })?;
        Ok(RunDir {
            path: self.root.join("logs").join(name),
        })
    }

    /// Entry names of the scenario directory: federate kinds plus the
    /// scenario-level files, sorted.
    pub fn list_federates(&self) -> Result<Vec<String>> {
        let mut names = read_dir_names(&self.scenario_dir(), "scenario directory", EntryKind::Any)?;
        names.sort();
        Ok(names)
    }

    /// Sorted `.json` file names inside a federate directory.
    pub fn federate_files(&self, federate: &str) -> Result<Vec<String>> {
        let dir = self.federate_dir(federate);
        let mut names = read_dir_names(&dir, "federate directory", EntryKind::File)?;
        names.retain(|n| n.ends_with(".json"));
        names.sort();
        Ok(names)
    }
}

enum EntryKind {
    Dir,
    File,
    Any,
}

fn read_dir_names(path: &Path, what: &str, kind: EntryKind) -> Result<Vec<String>> {
    if !path.is_dir() {
        return Err(Error::NotFound {
            what: what.to_string(),
            path: path.to_path_buf(),
        });
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let keep = match kind {
            EntryKind::Dir => entry.file_type()?.is_dir(),
            EntryKind::File => entry.file_type()?.is_file(),
            EntryKind::Any => true,
        };
        if keep {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
