use clap::{Parser, Subcommand};
use serde_json::Value;

mod config;
mod error;
mod query;
mod runner;
mod schema;
mod table;
mod workspace;

use config::ConfigDocument;
use query::FieldSelection;
use schema::SchemaRegistry;
use table::LogTable;
use workspace::Workspace;

#[derive(Parser)]
#[command(name = "mosaic-query")]
#[command(about = "Query co-simulation logs and edit federate configuration", long_about = None)]
struct Cli {
    /// Simulator installation root (contains scenarios/ and logs/).
    #[arg(short, long)]
    workspace: String,

    /// Scenario name, e.g. Barnim.
    #[arg(short, long)]
    scenario: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenario to completion and record logs.
    Run {
        /// Suppress the simulator's verbose flag.
        #[arg(long)]
        quiet: bool,
    },

    /// List run directories, most recent first.
    Results,

    /// List per-application log directories of a run.
    Apps {
        /// Run index, 0 = most recent.
        #[arg(long, default_value_t = 0)]
        result: usize,
    },

    /// List event types declared by the scenario's output schema.
    Events,

    /// List the ordered columns of one event type.
    Fields { event: String },

    /// List distinct actor ids seen for one event type in a run.
    Actors {
        event: String,

        /// Run index, 0 = most recent.
        #[arg(long, default_value_t = 0)]
        result: usize,
    },

    /// Filter a run's log by event type and actor, projected to fields.
    Filter {
        event: String,
        actor: String,

        /// Field names to keep, or the single word "all".
        #[arg(default_value = "all")]
        fields: Vec<String>,

        /// Run index, 0 = most recent.
        #[arg(long, default_value_t = 0)]
        result: usize,

        /// Emit the result as JSON instead of an aligned table.
        #[arg(long)]
        json: bool,
    },

    /// List federate kinds configured for the scenario.
    Federates,

    /// List configuration files of one federate kind.
    ConfigFiles { federate: String },

    /// Print a federate configuration document.
    ConfigShow {
        federate: String,

        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Read a value at a dotted path, e.g. globalNetwork.uplink.delay.delay.
    ConfigGet {
        federate: String,
        path: String,

        #[arg(long, default_value_t = 0)]
        index: usize,
    },

    /// Write a value at a dotted path and persist the document.
    ConfigSet {
        federate: String,
        path: String,

        /// New value, parsed as JSON; anything unparseable is kept as a string.
        value: String,

        #[arg(long, default_value_t = 0)]
        index: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let ws = Workspace::new(&cli.workspace, &cli.scenario);

    match cli.cmd {
        Commands::Run { quiet } => {
            runner::run_simulation(&ws, !quiet)?;
        }
        Commands::Results => {
            for name in ws.list_results()? {
                println!("{}", name);
            }
        }
        Commands::Apps { result } => {
            let run = ws.select_result(result)?;
            println!("{}", run.path().display());
            for name in run.list_apps()? {
                println!("{}", name);
            }
        }
        Commands::Events => {
            let registry = SchemaRegistry::load(&ws.schema_path())?;
            for event in registry.event_types() {
                println!("{}", event);
            }
        }
        Commands::Fields { event } => {
            let registry = SchemaRegistry::load(&ws.schema_path())?;
            for field in registry.fields(&event)? {
                println!("{}", field);
            }
        }
        Commands::Actors { event, result } => {
            let (registry, table) = load_event_table(&ws, &event, result)?;
            for actor in query::distinct_actors(&table, &registry, &event)? {
                println!("{}", actor);
            }
        }
        Commands::Filter {
            event,
            actor,
            fields,
            result,
            json,
        } => {
            let (registry, table) = load_event_table(&ws, &event, result)?;
            let selection = FieldSelection::from_args(&fields);
            let filtered = query::filter(&table, &registry, &event, &actor, &selection)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&filtered)?);
            } else {
                print_table(&filtered);
            }
        }
        Commands::Federates => {
            for name in ws.list_federates()? {
                println!("{}", name);
            }
        }
        Commands::ConfigFiles { federate } => {
            for name in ws.federate_files(&federate)? {
                println!("{}", name);
            }
        }
        Commands::ConfigShow { federate, index } => {
            let doc = ConfigDocument::select(&ws, &federate, index)?;
            println!("{}", doc.name());
            println!("{}", doc.pretty()?);
        }
        Commands::ConfigGet {
            federate,
            path,
            index,
        } => {
            let doc = ConfigDocument::select(&ws, &federate, index)?;
            println!("{}", doc.get(&path)?);
        }
        Commands::ConfigSet {
            federate,
            path,
            value,
            index,
        } => {
            let mut doc = ConfigDocument::select(&ws, &federate, index)?;
            let value = parse_value(value);
            doc.set(&path, value.clone())?;
            println!("{} set to {} in {}", path, value, doc.name());
        }
    }

    Ok(())
}

/// Load the selected run's output.csv with the event type's schema columns.
fn load_event_table(
    ws: &Workspace,
    event: &str,
    result: usize,
) -> anyhow::Result<(SchemaRegistry, LogTable)> {
    let registry = SchemaRegistry::load(&ws.schema_path())?;
    let columns = registry.fields(event)?.to_vec();
    let run = ws.select_result(result)?;
    let table = LogTable::load(&run.output_csv(), columns)?;
    Ok((registry, table))
}

/// CLI values are JSON when they parse as JSON, plain strings otherwise, so
/// `config-set ... delay '"100 ms"'` and `config-set ... delay 100` both work.
fn parse_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

/// Print an aligned text table: header, separator, rows.
fn print_table(table: &LogTable) {
    if table.is_empty() {
        println!("(no rows)");
        return;
    }

    let mut widths: Vec<usize> = table.columns.iter().map(String::len).collect();
    for row in &table.rows {
        for (w, value) in widths.iter_mut().zip(row) {
            *w = (*w).max(value.len());
        }
    }

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(c, &w)| format!("{:<w$}", c))
        .collect();
    println!("{}", header.join("  "));
    println!(
        "{}",
        "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1))
    );

    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{:<w$}", v))
            .collect();
        println!("{}", cells.join("  "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    const SCHEMA_XML: &str = r#"
        <configuration><output><subscriptions>
          <subscription id="VehicleUpdates">
            <entries>
              <entry>Updated:VehicleUpdates</entry>
              <entry>Updated:Time</entry>
              <entry>Updated:Name</entry>
              <entry>Updated:Speed</entry>
              <entry>Updated:Position.Latitude</entry>
              <entry>Updated:Position.Longitude</entry>
            </entries>
          </subscription>
        </subscriptions></output></configuration>
    "#;

    #[test]
    fn filter_over_a_workspace_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path(), "Barnim");

        fs::create_dir_all(ws.scenario_dir().join("output")).unwrap();
        fs::write(ws.schema_path(), SCHEMA_XML).unwrap();

        let run_dir = tmp.path().join("logs").join("log-20240302-090000");
        fs::create_dir_all(&run_dir).unwrap();
        fs::write(
            run_dir.join("output.csv"),
            "VEHICLE_UPDATES;1.0;veh_0;5.2;52.61;13.55\n\
             VEHICLE_UPDATES;2.0;veh_0;6.1;52.61;13.56\n",
        )
        .unwrap();

        let (registry, table) = load_event_table(&ws, "VehicleUpdates", 0).unwrap();
        let filtered = query::filter(
            &table,
            &registry,
            "VehicleUpdates",
            "veh_0",
            &FieldSelection::Fields(vec!["Speed".to_string()]),
        )
        .unwrap();

        assert_eq!(filtered.columns, vec!["Event", "Time", "Name", "Speed"]);
        assert_eq!(
            filtered.rows,
            vec![
                vec!["VEHICLE_UPDATES", "1.0", "veh_0", "5.2"],
                vec!["VEHICLE_UPDATES", "2.0", "veh_0", "6.1"],
            ]
        );
    }

    #[test]
    fn cli_values_parse_as_json_or_fall_back_to_strings() {
        assert_eq!(parse_value("100".to_string()), json!(100));
        assert_eq!(parse_value("true".to_string()), json!(true));
        assert_eq!(parse_value("100 ms".to_string()), json!("100 ms"));
    }
}
