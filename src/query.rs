//! Filtering and projection over a loaded log table.
//!
//! A query names an event type (schema id, e.g. "VehicleUpdates"), an actor
//! (the simulated entity the rows belong to, e.g. "veh_0") and a field
//! selection. Rows carry the event type in their first column as an
//! upper-case underscore-delimited discriminator ("VEHICLE_UPDATES"); which
//! column names the actor differs per event type and is resolved from a
//! fixed candidate list.

use crate::error::{Error, Result};
use crate::schema::SchemaRegistry;
use crate::table::LogTable;

use std::collections::BTreeSet;

/// Columns that may denote the acting entity, in resolution priority order.
pub const ACTOR_COLUMN_CANDIDATES: &[&str] = &["Name", "MappingName", "ReceiverName", "SourceName"];

/// Columns the projection always retains (plus the resolved actor column).
const PINNED_COLUMNS: &[&str] = &["Event", "Time"];

/// Requested projection: everything, or a specific field subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    All,
    Fields(Vec<String>),
}

impl FieldSelection {
    /// CLI convention: the single word "all" selects every column.
    pub fn from_args(fields: &[String]) -> Self {
        match fields {
            [one] if one.as_str() == "all" => Self::All,
            _ => Self::Fields(fields.to_vec()),
        }
    }
}

/// Map a schema event-type id to the discriminator stored in the Event
/// column: an underscore before every internal uppercase run, then
/// upper-case. Pure and deterministic.
///
/// "VehicleUpdates" => "VEHICLE_UPDATES", "RsuRegistration" => "RSU_REGISTRATION"
pub fn event_discriminator(event_type: &str) -> String {
    let mut out = String::with_capacity(event_type.len() + 4);
    let mut prev_upper = true;
    for c in event_type.chars() {
        let upper = c.is_ascii_uppercase();
        if upper && !prev_upper && !out.is_empty() {
            out.push('_');
        }
        prev_upper = upper;
        out.extend(c.to_uppercase());
    }
    out
}

/// Pick the actor-identity column for an event type's schema: the first
/// candidate present among its columns.
pub fn resolve_actor_column<'a>(event_type: &str, columns: &'a [String]) -> Result<&'a str> {
    for candidate in ACTOR_COLUMN_CANDIDATES {
        if let Some(col) = columns.iter().find(|c| c == candidate) {
            return Ok(col.as_str());
        }
    }
    Err(Error::NoActorColumnFound {
        event: event_type.to_string(),
        candidates: ACTOR_COLUMN_CANDIDATES,
    })
}

/// Sorted distinct actor ids seen for one event type.
///
/// Only rows carrying the event type's discriminator are considered: the
/// physical table holds interleaved event types under a union schema, so the
/// actor column's position is shared with unrelated columns of other types.
/// Values padded in from shorter foreign rows are empty and dropped.
pub fn distinct_actors(
    table: &LogTable,
    registry: &SchemaRegistry,
    event_type: &str,
) -> Result<Vec<String>> {
    let schema_columns = registry.fields(event_type)?;
    let actor_column = resolve_actor_column(event_type, schema_columns)?;
    let discriminator = event_discriminator(event_type);

    let event_idx = table
        .column_index("Event")
        .ok_or_else(|| Error::UnknownFieldRequested {
            event: event_type.to_string(),
            field: "Event".to_string(),
        })?;
    let actor_idx =
        table
            .column_index(actor_column)
            .ok_or_else(|| Error::UnknownFieldRequested {
                event: event_type.to_string(),
                field: actor_column.to_string(),
            })?;

    let mut actors: Vec<String> = table
        .rows
        .iter()
        .filter(|row| row[event_idx] == discriminator && !row[actor_idx].is_empty())
        .map(|row| row[actor_idx].clone())
        .collect();
    actors.sort();
    actors.dedup();
    Ok(actors)
}

/// Filter `table` down to one event type and actor, projected to `selection`.
///
/// Row order is preserved (logs are append-ordered, so this is time order).
/// The Event, Time and actor-identity columns survive every projection, even
/// when the caller leaves them out of the field list. An actor with no rows
/// yields an empty table, not an error.
pub fn filter(
    table: &LogTable,
    registry: &SchemaRegistry,
    event_type: &str,
    actor: &str,
    selection: &FieldSelection,
) -> Result<LogTable> {
    let schema_columns = registry.fields(event_type)?;
    let actor_column = resolve_actor_column(event_type, schema_columns)?;
    let discriminator = event_discriminator(event_type);

    let event_idx = table
        .column_index("Event")
        .ok_or_else(|| Error::UnknownFieldRequested {
            event: event_type.to_string(),
            field: "Event".to_string(),
        })?;
    let actor_idx =
        table
            .column_index(actor_column)
            .ok_or_else(|| Error::UnknownFieldRequested {
                event: event_type.to_string(),
                field: actor_column.to_string(),
            })?;

    // Which column positions survive the projection, in original order.
    let keep: Vec<usize> = match selection {
        FieldSelection::All => (0..schema_columns.len()).collect(),
        FieldSelection::Fields(requested) => {
            for field in requested {
                if !schema_columns.iter().any(|c| c == field) {
                    return Err(Error::UnknownFieldRequested {
                        event: event_type.to_string(),
                        field: field.clone(),
                    });
                }
            }
            let wanted: BTreeSet<&str> = requested
                .iter()
                .map(String::as_str)
                .chain(PINNED_COLUMNS.iter().copied())
                .chain(std::iter::once(actor_column))
                .collect();
            schema_columns
                .iter()
                .enumerate()
                .filter(|(_, c)| wanted.contains(c.as_str()))
                .map(|(i, _)| i)
                .collect()
        }
    };

    // Projected positions refer to the event type's schema; map them into
    // the (possibly wider) physical table.
    let table_idx: Vec<usize> = keep
        .iter()
        .map(|&i| {
            table
                .column_index(&schema_columns[i])
                .ok_or_else(|| Error::UnknownFieldRequested {
                    event: event_type.to_string(),
                    field: schema_columns[i].clone(),
                })
        })
        .collect::<Result<_>>()?;

    let columns: Vec<String> = keep.iter().map(|&i| schema_columns[i].clone()).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .filter(|row| row[event_idx] == discriminator && row[actor_idx] == actor)
        .map(|row| table_idx.iter().map(|&i| row[i].clone()).collect())
        .collect();

    LogTable::from_rows(columns, rows)
}
