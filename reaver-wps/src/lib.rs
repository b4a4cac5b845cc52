//! WPS PIN search scheduling and session persistence.

pub mod pins;
pub mod registrar;
pub mod session;

pub use pins::{
    wps_pin_checksum, PinScheduler, Priority, JUMP_LOCKED, JUMP_NOOP, JUMP_REORDERED, JUMP_TRIED,
};
pub use registrar::{build_next_pin, Registrar};
pub use session::{crack_progress, default_session_path, restore, save, RestoreOutcome};
