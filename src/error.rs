//! Error taxonomy for the query/configuration core.
//!
//! Every failure mode callers can act on gets its own variant; the CLI in
//! main.rs converts these into anyhow errors at the boundary.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors produced by the schema/table/query/config layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The output schema document is missing, malformed, or declares an
    /// event type with no usable fields.
    #[error("schema parse error: {0}")]
    SchemaParse(String),

    /// A log row carries more values than the schema has columns.
    #[error("column arity mismatch at {path}:{line}: schema has {expected} columns, row has {found}")]
    ColumnArityMismatch {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// None of the recognized actor-identity columns exist in the event
    /// type's schema.
    #[error("no actor-identity column for event type '{event}' (tried {candidates:?})")]
    NoActorColumnFound {
        event: String,
        candidates: &'static [&'static str],
    },

    /// A projection names a field the event type's schema does not have.
    #[error("unknown field '{field}' requested for event type '{event}'")]
    UnknownFieldRequested { event: String, field: String },

    /// A dotted config path could not be resolved.
    #[error("config path '{path}' not found: {reason}")]
    PathNotFound { path: String, reason: String },

    /// The queried event type is absent from the loaded schema.
    #[error("unknown event type '{0}'")]
    UnknownEventType(String),

    /// A required file or directory does not exist.
    #[error("{what} not found at {path}")]
    NotFound { what: String, path: PathBuf },

    /// The external simulator exited with a non-success status.
    #[error("simulation run failed: {0}")]
    SimulationFailed(ExitStatus),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
