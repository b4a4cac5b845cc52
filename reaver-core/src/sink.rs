//! Frame transmission seam
//!
//! Anything that injects raw 802.11 frames implements [`TransmitSink`]. The
//! live implementation wraps a monitor-mode capture handle; tests swap in a
//! recording sink to assert on exactly what was sent.

use crate::Result;

/// Sink for fully built 802.11 frames.
pub trait TransmitSink: Send {
    /// Inject one frame. When `retry` is set the implementation may resend
    /// the frame a small fixed number of times to ride out injection loss.
    fn send(&mut self, frame: &[u8], retry: bool) -> Result<()>;
}

/// Test double that records every frame handed to it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub frames: Vec<Vec<u8>>,
}

impl TransmitSink for RecordingSink {
    fn send(&mut self, frame: &[u8], _retry: bool) -> Result<()> {
        self.frames.push(frame.to_vec());
        Ok(())
    }
}
