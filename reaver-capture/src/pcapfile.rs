//! Classic pcap output file
//!
//! Every frame the capture loop accepts is appended here when the
//! operator asked for a raw capture of the attack, bad FCS and all other
//! filtering applied downstream. The format is the classic little-endian
//! pcap file: 24-byte global header, then one 16-byte record header plus
//! payload per packet.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Global header: magic, version 2.4, zero thiszone/sigfigs, 256 KiB
/// snaplen, linktype 127 (radiotap).
const GLOBAL_HEADER: [u8; 24] = [
    0xd4, 0xc3, 0xb2, 0xa1, // magic
    0x02, 0x00, 0x04, 0x00, // version 2.4
    0x00, 0x00, 0x00, 0x00, // thiszone
    0x00, 0x00, 0x00, 0x00, // sigfigs
    0x00, 0x00, 0x04, 0x00, // snaplen
    0x7f, 0x00, 0x00, 0x00, // linktype: radiotap
];

pub struct PcapFileWriter<W: Write> {
    inner: W,
}

impl PcapFileWriter<BufWriter<File>> {
    /// Create the output file and write the global header.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        PcapFileWriter::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> PcapFileWriter<W> {
    pub fn new(mut inner: W) -> io::Result<Self> {
        inner.write_all(&GLOBAL_HEADER)?;
        Ok(Self { inner })
    }

    /// Append one record: seconds, microseconds, captured length, wire
    /// length, then the captured bytes.
    pub fn write_record(
        &mut self,
        ts_sec: u32,
        ts_usec: u32,
        wirelen: u32,
        data: &[u8],
    ) -> io::Result<()> {
        self.inner.write_all(&ts_sec.to_le_bytes())?;
        self.inner.write_all(&ts_usec.to_le_bytes())?;
        self.inner.write_all(&(data.len() as u32).to_le_bytes())?;
        self.inner.write_all(&wirelen.to_le_bytes())?;
        self.inner.write_all(data)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
