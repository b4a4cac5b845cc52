//! 802.11 management frame header parsing and classification

use reaver_core::{fctl, ftype, stype, Error, MacAddr, Result};

/// Fixed 802.11 header: fc, duration, addr1-3, frag/seq
pub const HEADER_LEN: usize = 24;
/// Timestamp + beacon interval + capability
pub const BEACON_FIXED_LEN: usize = 12;
/// Algorithm + sequence + status
pub const AUTH_FIXED_LEN: usize = 6;
/// Capability + status + association id
pub const ASSOC_RESP_FIXED_LEN: usize = 6;

/// Status code for successful authentication/association
pub const STATUS_SUCCESS: u16 = 0;

/// Parsed fixed 802.11 frame header. All fields little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dot11Header {
    pub fc: u16,
    pub duration: u16,
    pub addr1: MacAddr,
    pub addr2: MacAddr,
    pub addr3: MacAddr,
    pub frag_seq: u16,
}

impl Dot11Header {
    /// Parse the header at the front of `frame` (radiotap already stripped).
    pub fn parse(frame: &[u8]) -> Result<Self> {
        if frame.len() < HEADER_LEN {
            return Err(Error::parsing("frame too short for 802.11 header"));
        }

        let mac = |off: usize| -> MacAddr {
            let mut b = [0u8; 6];
            b.copy_from_slice(&frame[off..off + 6]);
            MacAddr(b)
        };

        Ok(Self {
            fc: u16::from_le_bytes([frame[0], frame[1]]),
            duration: u16::from_le_bytes([frame[2], frame[3]]),
            addr1: mac(4),
            addr2: mac(10),
            addr3: mac(16),
            frag_seq: u16::from_le_bytes([frame[22], frame[23]]),
        })
    }

    pub fn frame_type(&self) -> u16 {
        self.fc & fctl::FTYPE
    }

    pub fn subtype(&self) -> u16 {
        self.fc & fctl::STYPE
    }

    /// BSSID filter: frames from the target carry its address in addr3.
    pub fn is_from(&self, bssid: MacAddr) -> bool {
        self.addr3 == bssid
    }

    /// Receiver filter for auth/assoc responses addressed to our station.
    pub fn is_addressed_to(&self, mac: MacAddr) -> bool {
        self.addr1 == mac
    }
}

/// Management frame classification, gated on each kind's minimum body size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Beacon,
    ProbeResp,
    Auth,
    AssocResp,
    Deauth,
    /// Not a management frame, or too short for its subtype
    Other,
}

/// Classify a frame (radiotap already stripped).
pub fn classify(frame: &[u8]) -> FrameKind {
    let header = match Dot11Header::parse(frame) {
        Ok(h) => h,
        Err(_) => return FrameKind::Other,
    };
    if header.frame_type() != ftype::MGMT {
        return FrameKind::Other;
    }

    let body_len = frame.len() - HEADER_LEN;
    match header.subtype() {
        stype::BEACON if body_len >= BEACON_FIXED_LEN => FrameKind::Beacon,
        stype::PROBE_RESP if body_len >= BEACON_FIXED_LEN => FrameKind::ProbeResp,
        stype::AUTH if body_len >= AUTH_FIXED_LEN => FrameKind::Auth,
        stype::ASSOC_RESP if body_len >= ASSOC_RESP_FIXED_LEN => FrameKind::AssocResp,
        stype::DEAUTH if body_len >= 2 => FrameKind::Deauth,
        _ => FrameKind::Other,
    }
}

/// Capability field from a beacon or probe response body.
pub fn beacon_capability(frame: &[u8]) -> Option<u16> {
    let off = HEADER_LEN + 10;
    frame
        .get(off..off + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

/// Status code from an authentication response body.
pub fn auth_status(frame: &[u8]) -> Option<u16> {
    let off = HEADER_LEN + 4;
    frame
        .get(off..off + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

/// Status code from an association response body.
pub fn assoc_status(frame: &[u8]) -> Option<u16> {
    let off = HEADER_LEN + 2;
    frame
        .get(off..off + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

/// Offset of the tagged parameters in a beacon/probe response.
pub fn beacon_tag_offset() -> usize {
    HEADER_LEN + BEACON_FIXED_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacon_frame() -> Vec<u8> {
        let mut f = Vec::new();
        f.extend_from_slice(&0x0080u16.to_le_bytes()); // fc: beacon
        f.extend_from_slice(&[0x00, 0x00]); // duration
        f.extend_from_slice(&[0xff; 6]); // addr1
        f.extend_from_slice(&[0x02; 6]); // addr2
        f.extend_from_slice(&[0x02; 6]); // addr3
        f.extend_from_slice(&[0x00, 0x00]); // frag/seq
        f.extend_from_slice(&[0u8; 8]); // timestamp
        f.extend_from_slice(&0x0064u16.to_le_bytes()); // interval
        f.extend_from_slice(&0x0431u16.to_le_bytes()); // capability
        f
    }

    #[test]
    fn classifies_beacon() {
        let frame = beacon_frame();
        assert_eq!(classify(&frame), FrameKind::Beacon);
        assert_eq!(beacon_capability(&frame), Some(0x0431));
    }

    #[test]
    fn short_beacon_is_other() {
        let mut frame = beacon_frame();
        frame.truncate(HEADER_LEN + 4);
        assert_eq!(classify(&frame), FrameKind::Other);
    }

    #[test]
    fn bssid_filter_uses_addr3() {
        let frame = beacon_frame();
        let header = Dot11Header::parse(&frame).unwrap();
        assert!(header.is_from(MacAddr([0x02; 6])));
        assert!(!header.is_from(MacAddr([0x03; 6])));
    }

    #[test]
    fn auth_response_status() {
        let mut f = Vec::new();
        f.extend_from_slice(&0x00b0u16.to_le_bytes());
        f.extend_from_slice(&[0x00; 22]);
        f.extend_from_slice(&0x0000u16.to_le_bytes()); // algorithm
        f.extend_from_slice(&0x0002u16.to_le_bytes()); // sequence
        f.extend_from_slice(&STATUS_SUCCESS.to_le_bytes());
        assert_eq!(classify(&f), FrameKind::Auth);
        assert_eq!(auth_status(&f), Some(STATUS_SUCCESS));
    }
}
