//! Monitor-mode packet source
//!
//! Wraps a pcap handle (live interface or replay file), decides once
//! whether the datalink carries radiotap headers, and hands out frames
//! that passed FCS validation. Frames are mirrored to an optional raw
//! output file before any filtering so a capture of the attack stays
//! complete.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use pcap::{Activated, Capture, Linktype};
use tracing::warn;

use reaver_core::{Error, Result, TransmitSink};
use reaver_packet::check_fcs;

use crate::pcapfile::PcapFileWriter;

const SNAPLEN: i32 = 65536;
const READ_TIMEOUT_MS: i32 = 100;
/// Total injections of one frame when retrying is requested
const RETRY_SENDS: usize = 3;

/// One captured frame, radiotap header (if any) still attached.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub data: Bytes,
    pub ts: SystemTime,
    pub caplen: u32,
    pub wirelen: u32,
}

pub struct CaptureSource {
    handle: Capture<dyn Activated>,
    has_radiotap: bool,
    validate_fcs: bool,
    output: Option<PcapFileWriter<BufWriter<File>>>,
    bad_fcs_warned: bool,
}

impl CaptureSource {
    /// Open a live capture on a monitor-mode interface.
    pub fn open_live(interface: &str) -> Result<Self> {
        let capture = Capture::from_device(interface)
            .map_err(|e| Error::Capture(format!("{}: {}", interface, e)))?
            .snaplen(SNAPLEN)
            .promisc(true)
            .timeout(READ_TIMEOUT_MS)
            .open()
            .map_err(|e| Error::Capture(format!("{}: {}", interface, e)))?;
        Ok(Self::from_capture(capture.into()))
    }

    /// Open a saved capture for replay.
    pub fn open_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let capture = Capture::from_file(path.as_ref())
            .map_err(|e| Error::Capture(e.to_string()))?;
        Ok(Self::from_capture(capture.into()))
    }

    fn from_capture(handle: Capture<dyn Activated>) -> Self {
        let has_radiotap = handle.get_datalink() == Linktype::IEEE802_11_RADIOTAP;
        Self {
            handle,
            has_radiotap,
            validate_fcs: true,
            output: None,
            bad_fcs_warned: false,
        }
    }

    /// Whether frames from this source start with a radiotap header.
    pub fn has_radiotap(&self) -> bool {
        self.has_radiotap
    }

    /// Some drivers hand up frames without an FCS even though the
    /// radiotap flags claim one; operators can turn validation off then.
    pub fn set_validate_fcs(&mut self, validate: bool) {
        self.validate_fcs = validate;
    }

    /// Mirror every accepted packet into a raw pcap output file.
    pub fn set_output_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.output = Some(PcapFileWriter::create(path)?);
        Ok(())
    }

    /// Blocking read of the next FCS-clean frame.
    pub fn next_frame(&mut self) -> Result<CapturedFrame> {
        loop {
            let packet = match self.handle.next_packet() {
                Ok(p) => p,
                Err(pcap::Error::TimeoutExpired) => continue,
                Err(e) => return Err(Error::Capture(e.to_string())),
            };

            let ts_sec = packet.header.ts.tv_sec as u32;
            let ts_usec = packet.header.ts.tv_usec as u32;
            let caplen = packet.header.caplen;
            let wirelen = packet.header.len;
            let data = Bytes::copy_from_slice(packet.data);

            if let Some(writer) = self.output.as_mut() {
                writer.write_record(ts_sec, ts_usec, wirelen, &data)?;
            }

            if self.validate_fcs && !check_fcs(&data, self.has_radiotap) {
                if !self.bad_fcs_warned {
                    warn!("found packet with bad FCS, skipping (reported once)");
                    self.bad_fcs_warned = true;
                }
                continue;
            }

            let ts = SystemTime::UNIX_EPOCH
                + Duration::new(ts_sec as u64, ts_usec.saturating_mul(1000));
            return Ok(CapturedFrame {
                data,
                ts,
                caplen,
                wirelen,
            });
        }
    }
}

/// Monitor-mode interfaces inject through the same pcap handle they
/// capture on.
impl TransmitSink for CaptureSource {
    fn send(&mut self, frame: &[u8], retry: bool) -> Result<()> {
        let sends = if retry { RETRY_SENDS } else { 1 };
        for _ in 0..sends {
            self.handle
                .sendpacket(frame)
                .map_err(|e| Error::Transmit(e.to_string()))?;
        }
        Ok(())
    }
}
