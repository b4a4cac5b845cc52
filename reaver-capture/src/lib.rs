//! Packet capture layer for reaver-rs: pcap-backed frame source with FCS
//! filtering, plus a classic pcap output file writer.

pub mod capture;
pub mod pcapfile;

pub use capture::{CaptureSource, CapturedFrame};
pub use pcapfile::PcapFileWriter;
