//! Capture collaborator: drives the Bluetooth control shell for a fixed scan
//! window and returns whatever it printed.
//!
//! The shell needs appropriate privileges to scan; running in group `lp`
//! usually suffices.

use crate::config::CaptureConfig;
use eyre::{Report, WrapErr, eyre};
use log::warn;
use std::fs::read_to_string;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::time::{self, Instant};

const CONTROL_SHELL: &str = "bluetoothctl";
const AGENT_READY_MARKER: &str = "Agent registered";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(20);
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns the raw capture, either replayed from a saved file or scanned
/// live. A failed live session degrades to an empty capture, which the
/// caller treats as a run failure; this catches all sorts of nonsense such
/// as a wrong controller address or an unplugged dongle.
pub async fn collect(config: &CaptureConfig) -> Result<Vec<String>, Report> {
    if let Some(filename) = &config.replay_filename {
        let contents =
            read_to_string(filename).wrap_err_with(|| format!("Replaying {filename}"))?;
        return Ok(contents.lines().map(str::to_owned).collect());
    }

    match scan(config).await {
        Ok(records) => Ok(records),
        Err(e) => {
            warn!("Scan session failed: {e:?}");
            Ok(Vec::new())
        }
    }
}

async fn scan(config: &CaptureConfig) -> Result<Vec<String>, Report> {
    let mut child = Command::new(CONTROL_SHELL)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .wrap_err_with(|| format!("Spawning {CONTROL_SHELL}"))?;
    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| eyre!("No stdin handle for {CONTROL_SHELL}"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| eyre!("No stdout handle for {CONTROL_SHELL}"))?;
    let mut lines = BufReader::new(stdout).lines();

    // Wait for the agent banner before issuing any commands.
    let startup_deadline = Instant::now() + STARTUP_TIMEOUT;
    loop {
        let line = time::timeout_at(startup_deadline, lines.next_line())
            .await
            .wrap_err("Control shell did not become ready")??
            .ok_or_else(|| eyre!("Control shell exited during startup"))?;
        if line.contains(AGENT_READY_MARKER) {
            break;
        }
    }

    if let Some(controller) = &config.controller {
        stdin
            .write_all(format!("select {controller}\n").as_bytes())
            .await?;
    }
    // We are after low-energy advertising packets only.
    stdin
        .write_all(b"menu scan\ntransport le\nback\nscan on\n")
        .await?;
    stdin.flush().await?;

    let deadline = Instant::now() + config.scan_duration;
    let mut records = Vec::new();
    while let Ok(next) = time::timeout_at(deadline, lines.next_line()).await {
        match next? {
            Some(line) => records.push(line),
            None => break,
        }
    }

    // Shut the shell down; the capture is already complete, so problems here
    // only get logged by the caller.
    let _ = stdin.write_all(b"scan off\nexit\n").await;
    let _ = stdin.flush().await;
    let _ = time::timeout(SHUTDOWN_TIMEOUT, child.wait()).await;

    Ok(records)
}
