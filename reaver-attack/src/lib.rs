//! Pixie-dust attack runner.

pub mod pixie;

pub use pixie::{hex_format, PixieOutcome, PixieRequest, PixieRunner, DEFAULT_SOLVER};
