//! Federate/scenario configuration documents.
//!
//! Each federate is configured by a JSON file under the scenario directory.
//! Values are addressed by dotted paths ("globalNetwork.uplink.delay.delay");
//! a segment is a map key, or an index when the current node is an array.
//! Writes never create intermediate structure: every segment before the last
//! must already resolve to a container. Every successful write rewrites the
//! whole backing file with 4-space indentation.

use crate::error::{Error, Result};
use crate::workspace::Workspace;

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// An in-memory configuration tree plus the file that backs it.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    path: PathBuf,
    name: String,
    root: Value,
}

impl ConfigDocument {
    /// Load the document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound {
                what: "configuration document".to_string(),
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&text)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            name,
            root,
        })
    }

    /// Select a federate document within a workspace. The special kind
    /// "scenario" refers to the scenario-level config; any other kind names
    /// a federate directory, from which the idx-th (sorted) JSON file is
    /// loaded.
    pub fn select(workspace: &Workspace, federate: &str, idx: usize) -> Result<Self> {
        if federate == "scenario" {
            return Self::load(&workspace.scenario_config_path());
        }
        let files = workspace.federate_files(federate)?;
        let name = files.get(idx).ok_or_else(|| Error::NotFound {
            what: format!(
                "federate document at index {} ({} available)",
                idx,
                files.len()
            ),
            path: workspace.federate_dir(federate),
        })?;
        Self::load(&workspace.federate_dir(federate).join(name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a dotted path to its value.
    pub fn get(&self, path: &str) -> Result<&Value> {
        resolve(&self.root, path)
    }

    /// Replace the value at a dotted path and rewrite the backing file.
    ///
    /// The parent of the final segment must already exist; in a mapping the
    /// final key may be new, in an array the final index must be in range.
    /// On any resolution failure neither memory nor file changes.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let (parent_path, leaf) = match path.rsplit_once('.') {
            Some((p, l)) => (Some(p), l),
            None => (None, path),
        };

        let parent = match parent_path {
            Some(p) => resolve_mut(&mut self.root, p, path)?,
            None => &mut self.root,
        };

        match parent {
            Value::Object(map) => {
                map.insert(leaf.to_string(), value);
            }
            Value::Array(items) => {
                let idx = parse_index(leaf, path)?;
                let len = items.len();
                let slot = items.get_mut(idx).ok_or_else(|| Error::PathNotFound {
                    path: path.to_string(),
                    reason: format!("index {} out of range (len {})", idx, len),
                })?;
                *slot = value;
            }
            _ => {
                return Err(Error::PathNotFound {
                    path: path.to_string(),
                    reason: format!("segment '{}' addresses into a scalar", leaf),
                });
            }
        }

        self.persist()
    }

    /// The whole document, 4-space indented.
    pub fn pretty(&self) -> Result<String> {
        pretty_json(&self.root)
    }

    fn persist(&self) -> Result<()> {
        fs::write(&self.path, pretty_json(&self.root)?)?;
        Ok(())
    }
}

/// Serialize with 4-space indentation to match the simulator's own files.
pub fn pretty_json(value: &Value) -> Result<String> {
    let mut out = Vec::new();
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, fmt);
    value.serialize(&mut ser)?;
    // serde_json writes valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn resolve<'a>(root: &'a Value, path: &str) -> Result<&'a Value> {
    let mut node = root;
    for segment in path.split('.') {
        node = match node {
            Value::Object(map) => map.get(segment).ok_or_else(|| Error::PathNotFound {
                path: path.to_string(),
                reason: format!("no key '{}'", segment),
            })?,
            Value::Array(items) => {
                let idx = parse_index(segment, path)?;
                items.get(idx).ok_or_else(|| Error::PathNotFound {
                    path: path.to_string(),
                    reason: format!("index {} out of range (len {})", idx, items.len()),
                })?
            }
            _ => {
                return Err(Error::PathNotFound {
                    path: path.to_string(),
                    reason: format!("segment '{}' addresses into a scalar", segment),
                });
            }
        };
    }
    Ok(node)
}

fn resolve_mut<'a>(root: &'a mut Value, path: &str, full_path: &str) -> Result<&'a mut Value> {
    let mut node = root;
    for segment in path.split('.') {
        node = match node {
            Value::Object(map) => map.get_mut(segment).ok_or_else(|| Error::PathNotFound {
                path: full_path.to_string(),
                reason: format!("no key '{}'", segment),
            })?,
            Value::Array(items) => {
                let idx = parse_index(segment, full_path)?;
                let len = items.len();
                items.get_mut(idx).ok_or_else(|| Error::PathNotFound {
                    path: full_path.to_string(),
                    reason: format!("index {} out of range (len {})", idx, len),
                })?
            }
            _ => {
                return Err(Error::PathNotFound {
                    path: full_path.to_string(),
                    reason: format!("segment '{}' addresses into a scalar", segment),
                });
            }
        };
    }
    Ok(node)
}

fn parse_index(segment: &str, path: &str) -> Result<usize> {
    segment.parse().map_err(|_| Error::PathNotFound {
        path: path.to_string(),
        reason: format!("segment '{}' is not an array index", segment),
    })
}
