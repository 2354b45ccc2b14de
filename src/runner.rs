//! Launching the external simulator.
//!
//! The workspace root ships a platform launcher script (`mosaic.sh` on unix,
//! `mosaic.bat` on windows). We invoke it with the scenario name, hand the
//! workspace root to the child via `current_dir` rather than changing our own
//! working directory, and inherit stdio so the simulator's combined output
//! reaches the caller's streams. The call blocks until the run finishes.

use crate::error::{Error, Result};
use crate::workspace::Workspace;

use std::process::Command;

#[cfg(not(windows))]
const LAUNCHER: &str = "mosaic.sh";
#[cfg(windows)]
const LAUNCHER: &str = "mosaic.bat";

/// Run the workspace's scenario to completion.
///
/// A non-success exit status is an error: stale logs from an earlier run
/// must not be mistaken for this run's output.
pub fn run_simulation(workspace: &Workspace, verbose: bool) -> Result<()> {
    let script = workspace.root().join(LAUNCHER);
    if !script.is_file() {
        return Err(Error::NotFound {
            what: "simulator launcher script".to_string(),
            path: script,
        });
    }

    let mut cmd = Command::new(&script);
    cmd.current_dir(workspace.root())
        .arg("-s")
        .arg(workspace.scenario());
    if verbose {
        cmd.arg("-v");
    }

    let status = cmd.status()?;
    if !status.success() {
        return Err(Error::SimulationFailed(status));
    }
    Ok(())
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn workspace_with_launcher(body: &str) -> (tempfile::TempDir, Workspace) {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join(LAUNCHER);
        fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        let ws = Workspace::new(tmp.path(), "Barnim");
        (tmp, ws)
    }

    #[test]
    fn successful_run_returns_ok() {
        let (_tmp, ws) = workspace_with_launcher("exit 0");
        run_simulation(&ws, false).unwrap();
    }

    #[test]
    fn failed_run_is_an_error() {
        let (_tmp, ws) = workspace_with_launcher("exit 3");
        let err = run_simulation(&ws, true).unwrap_err();
        assert!(matches!(err, Error::SimulationFailed(_)), "got {err:?}");
    }

    #[test]
    fn missing_launcher_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let ws = Workspace::new(tmp.path(), "Barnim");
        let err = run_simulation(&ws, false).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }), "got {err:?}");
    }
}
