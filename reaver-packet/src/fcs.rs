//! Frame check sequence validation
//!
//! Monitor-mode drivers that deliver the FCS announce it through the
//! radiotap FLAGS field. The FCS is the complement of the CRC-32 of the
//! frame body (radiotap header and trailing FCS excluded), stored
//! little-endian in the last four bytes.

use crate::radiotap::{self, RadiotapHeader};

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xedb8_8320
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC32_TABLE: [u32; 256] = build_crc32_table();

/// Running CRC-32 (IEEE polynomial, reflected) without the final
/// complement; callers invert the result themselves.
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for &b in data {
        crc = CRC32_TABLE[((crc ^ b as u32) & 0xff) as usize] ^ (crc >> 8);
    }
    !crc
}

/// Validate a captured frame's FCS.
///
/// Returns `true` when the frame should be kept. Frames whose radiotap
/// header reports no FCS at all pass unchecked, so do captures without a
/// radiotap header: frames we inject ourselves carry none of these flags
/// and must not be dropped as false positives.
pub fn check_fcs(packet: &[u8], has_radiotap: bool) -> bool {
    if !has_radiotap {
        return true;
    }
    if packet.len() <= 4 {
        return false;
    }

    let rt = match RadiotapHeader::parse(packet) {
        Ok(rt) => rt,
        Err(_) => return true,
    };
    let flags = match rt.flags() {
        Some(flags) => flags,
        None => return true,
    };
    if flags & radiotap::F_BADFCS != 0 {
        return false;
    }
    if flags & radiotap::F_FCS == 0 {
        return true;
    }

    let offset = rt.length as usize;
    if packet.len() < offset + 4 {
        return false;
    }

    let body = &packet[offset..packet.len() - 4];
    let tail = &packet[packet.len() - 4..];
    let reported = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);

    crc32(body) == reported
}
