//! Session persistence
//!
//! Progress is written as a plain line-oriented text file: the two
//! cursors and the key state as decimal integers, then every P1
//! candidate, then every P2 candidate, then (only when non-zero) the
//! auxiliary counter. Restoring tolerates nothing: any short or
//! unparsable read resets to a fresh search rather than resuming from a
//! half-trusted file.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use reaver_core::{KeyState, MacAddr, Result, P1_SIZE, P2_SIZE};
use tracing::{info, warn};

use crate::pins::PinScheduler;

/// System-wide configuration directory for session files
pub const CONF_DIR: &str = "/etc/reaver";
/// Session file extension
pub const CONF_EXT: &str = "wpc";

/// Outcome of a session restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// State restored from the file
    Restored,
    /// Restored, but the operator-fixed half PIN was already tested in
    /// the restored run
    AlreadyTested,
    /// No usable file; scheduler reset to a fresh state
    Fresh,
}

/// Default session path: `<BSSID-hex>.wpc` in the configuration
/// directory, or the current directory when it does not exist.
pub fn default_session_path(bssid: MacAddr) -> PathBuf {
    let name = format!("{}.{}", bssid.to_compact_string(), CONF_EXT);
    let conf = Path::new(CONF_DIR);
    if conf.is_dir() {
        conf.join(name)
    } else {
        PathBuf::from(name)
    }
}

/// Write the scheduler state to `path`. Returns `Ok(false)` when there
/// is nothing worth saving: no progress yet, or an arbitrary PIN string
/// is in use and the search state is meaningless.
pub fn save(scheduler: &PinScheduler, path: &Path) -> Result<bool> {
    if scheduler.pin_string_mode() {
        info!("string pin was specified, nothing to save");
        return Ok(false);
    }
    let progressed = scheduler.p1_index() > 0
        || scheduler.p2_index() > 0
        || scheduler.key_state() >= KeyState::Key2Wip
        || scheduler.aux_counter() > 0;
    if !progressed {
        info!("nothing done, nothing to save");
        return Ok(false);
    }

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", scheduler.p1_index())?;
    writeln!(out, "{}", scheduler.p2_index())?;
    writeln!(out, "{}", scheduler.key_state().as_code())?;
    for i in 0..P1_SIZE {
        writeln!(out, "{}", scheduler.p1_value(i))?;
    }
    for i in 0..P2_SIZE {
        writeln!(out, "{}", scheduler.p2_value(i))?;
    }
    if scheduler.aux_counter() > 0 {
        writeln!(out, "{}", scheduler.aux_counter())?;
    }
    out.flush()?;

    info!(path = %path.display(), "session saved");
    Ok(true)
}

/// Restore scheduler state from `path`. Any failure along the way
/// resets the scheduler to a fresh KEY1_WIP state at index zero.
pub fn restore(scheduler: &mut PinScheduler, path: &Path) -> RestoreOutcome {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(_) => return RestoreOutcome::Fresh,
    };
    let mut lines = BufReader::new(file).lines();

    let mut next_line = move || -> Option<String> {
        match lines.next() {
            Some(Ok(line)) => Some(line.trim_end().to_string()),
            _ => None,
        }
    };

    let parsed = (|| {
        let p1_index = next_line()?.trim().parse::<usize>().ok()?;
        let p2_index = next_line()?.trim().parse::<usize>().ok()?;
        let state_code = next_line()?.trim().parse::<i64>().ok()?;
        let key_state = KeyState::from_code(state_code)?;

        // Reconcile an operator-fixed half against the restored array:
        // inserting it at the cursor shifts later lines down one slot
        // until its old occurrence is dropped.
        let mut p1 = Vec::with_capacity(P1_SIZE);
        let mut p1_tried = false;
        let fixed_p1 =
            scheduler.static_p1().filter(|_| key_state < KeyState::Key2Wip).map(str::to_owned);
        let mut add = false;
        for i in 0..P1_SIZE {
            let line = next_line()?;
            if let Some(fixed) = &fixed_p1 {
                if i < p1_index {
                    if &line == fixed {
                        p1_tried = true;
                    }
                } else if i == p1_index {
                    if !p1_tried && &line != fixed {
                        // insert at the cursor; later lines shift down
                        p1.push(fixed.clone());
                        add = true;
                    }
                } else if add && &line == fixed {
                    // the displaced old occurrence is dropped
                    add = false;
                    continue;
                }
            }
            if p1.len() < P1_SIZE {
                p1.push(line);
            }
        }
        while p1.len() < P1_SIZE {
            p1.push(String::new());
        }

        let mut p2 = Vec::with_capacity(P2_SIZE);
        let mut p2_tried = false;
        let fixed_p2 =
            scheduler.static_p2().filter(|_| key_state != KeyState::KeyDone).map(str::to_owned);
        let mut add = false;
        for i in 0..P2_SIZE {
            let line = next_line()?;
            if let Some(fixed) = &fixed_p2 {
                if i < p2_index {
                    if &line == fixed {
                        p2_tried = true;
                    }
                } else if i == p2_index {
                    if !p2_tried && &line != fixed {
                        p2.push(fixed.clone());
                        add = true;
                    }
                } else if add && &line == fixed {
                    add = false;
                    continue;
                }
            }
            if p2.len() < P2_SIZE {
                p2.push(line);
            }
        }
        while p2.len() < P2_SIZE {
            p2.push(String::new());
        }

        let aux_counter = next_line()
            .and_then(|l| l.trim().parse::<u64>().ok())
            .unwrap_or(0);

        Some((p1, p2, p1_index, p2_index, key_state, aux_counter, p1_tried || p2_tried))
    })();

    match parsed {
        Some((p1, p2, p1_index, p2_index, key_state, aux, tried)) => {
            scheduler.restore(p1, p2, p1_index, p2_index, key_state, aux);
            if tried {
                warn!("the fixed half PIN was already tested in the restored session");
                RestoreOutcome::AlreadyTested
            } else {
                info!(path = %path.display(), "restored previous session");
                RestoreOutcome::Restored
            }
        }
        None => {
            warn!(path = %path.display(), "session file unusable, starting fresh");
            scheduler.reset_cursors();
            RestoreOutcome::Fresh
        }
    }
}

/// Percentage of the search space covered according to a session file's
/// header lines. `None` when the file is missing or unreadable.
pub fn crack_progress(path: &Path) -> Option<f64> {
    let file = File::open(path).ok()?;
    let mut lines = BufReader::new(file).lines();
    let mut next_int = move || -> Option<i64> {
        lines.next()?.ok()?.trim().parse::<i64>().ok()
    };

    let p1_index = next_int()?;
    let p2_index = next_int()?;
    let key_state = KeyState::from_code(next_int()?)?;

    let total = (P1_SIZE + P2_SIZE) as f64;
    Some(match key_state {
        KeyState::Key1Wip => (p1_index + 1) as f64 * 100.0 / total,
        KeyState::Key2Wip => (P1_SIZE as i64 + p2_index + 1) as f64 * 100.0 / total,
        KeyState::KeyDone => 100.0,
    })
}
