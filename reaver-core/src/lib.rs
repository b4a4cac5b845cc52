//! Core types shared across the reaver-rs workspace.
//!
//! This crate carries the error type, the MAC-address newtype, the protocol
//! constant tables, the attack configuration value, and the transmit seam.
//! It deliberately has no capture or async dependencies so every other crate
//! can depend on it.

pub mod config;
pub mod error;
pub mod sink;
pub mod types;

pub use config::TargetConfig;
pub use error::{Error, Result};
pub use sink::{RecordingSink, TransmitSink};
pub use types::*;
