//! Radiotap capture header parsing
//!
//! Only the handful of fields the attack cares about are pulled out:
//! FLAGS (for FCS validation), CHANNEL (frequency) and DBM_ANTSIGNAL.
//! The present bitmap may chain through its extension bit; extra words
//! add no fields we read but still shift the data area.

use reaver_core::{Error, Result};

/// Present-bitmap bit numbers
pub mod field {
    pub const TSFT: u32 = 0;
    pub const FLAGS: u32 = 1;
    pub const RATE: u32 = 2;
    pub const CHANNEL: u32 = 3;
    pub const FHSS: u32 = 4;
    pub const DBM_ANTSIGNAL: u32 = 5;
    pub const EXT: u32 = 31;
}

/// FLAGS bit: frame includes a trailing FCS
pub const F_FCS: u8 = 0x10;
/// FLAGS bit: frame failed the FCS check in the driver
pub const F_BADFCS: u8 = 0x40;

/// (size, alignment) per field, indexed by present-bitmap bit number
const FIELD_SIZE_ALIGN: [(usize, usize); 15] = [
    (8, 8), // TSFT
    (1, 1), // FLAGS
    (1, 1), // RATE
    (4, 2), // CHANNEL (freq u16 + flags u16)
    (2, 2), // FHSS
    (1, 1), // DBM_ANTSIGNAL
    (1, 1), // DBM_ANTNOISE
    (2, 2), // LOCK_QUALITY
    (2, 2), // TX_ATTENUATION
    (2, 2), // DB_TX_ATTENUATION
    (1, 1), // DBM_TX_POWER
    (1, 1), // ANTENNA
    (1, 1), // DB_ANTSIGNAL
    (1, 1), // DB_ANTNOISE
    (2, 2), // RX_FLAGS
];

/// Minimum radiotap header size: version, pad, length, one present word
pub const MIN_LEN: usize = 8;

/// Parsed view over a packet's radiotap header.
#[derive(Debug, Clone, Copy)]
pub struct RadiotapHeader<'a> {
    pub revision: u8,
    pub pad: u8,
    /// Total header length including all present words
    pub length: u16,
    /// First present bitmap word
    pub present: u32,
    /// Offset of the field data area (past all chained present words)
    fields_offset: usize,
    packet: &'a [u8],
}

impl<'a> RadiotapHeader<'a> {
    /// Parse the radiotap header at the front of `packet`.
    ///
    /// A declared length that overruns the captured packet means the
    /// capture stream itself can no longer be trusted; that case is
    /// reported as [`Error::CorruptCapture`] and callers are expected to
    /// abort rather than resynchronize.
    pub fn parse(packet: &'a [u8]) -> Result<Self> {
        if packet.len() < MIN_LEN {
            return Err(Error::parsing("packet too short for radiotap header"));
        }

        let revision = packet[0];
        let pad = packet[1];
        let length = u16::from_le_bytes([packet[2], packet[3]]);

        if length as usize > packet.len() {
            return Err(Error::CorruptCapture(format!(
                "radiotap length {} exceeds captured {} bytes",
                length,
                packet.len()
            )));
        }

        let present = u32::from_le_bytes([packet[4], packet[5], packet[6], packet[7]]);

        // Skip chained extension words to find the field data area
        let mut fields_offset = 8;
        let mut word = present;
        while word & (1 << field::EXT) != 0 {
            if fields_offset + 4 > packet.len() {
                return Err(Error::parsing("truncated radiotap present chain"));
            }
            word = u32::from_le_bytes([
                packet[fields_offset],
                packet[fields_offset + 1],
                packet[fields_offset + 2],
                packet[fields_offset + 3],
            ]);
            fields_offset += 4;
        }

        Ok(Self {
            revision,
            pad,
            length,
            present,
            fields_offset,
            packet,
        })
    }

    /// Stand-in for captures whose datalink carries no radiotap header:
    /// zero length, nothing present.
    pub fn absent() -> RadiotapHeader<'static> {
        RadiotapHeader {
            revision: 0,
            pad: 0,
            length: 0,
            present: 0,
            fields_offset: 0,
            packet: &[],
        }
    }

    /// Header for `packet` honoring the capture's datalink: parsed when
    /// radiotap is present, the zero-length stand-in otherwise. Either
    /// way `length` is where the 802.11 frame starts.
    pub fn for_packet(packet: &'a [u8], has_radiotap: bool) -> Result<Self> {
        if has_radiotap {
            Self::parse(packet)
        } else {
            Ok(Self::absent())
        }
    }

    /// Compute the data offset of a present field, walking every earlier
    /// present field with its natural alignment.
    fn field_offset(&self, bit: u32) -> Option<usize> {
        if self.present & (1 << bit) == 0 {
            return None;
        }

        let mut offset = self.fields_offset;
        for earlier in 0..bit {
            if self.present & (1 << earlier) == 0 {
                continue;
            }
            let (size, align) = *FIELD_SIZE_ALIGN.get(earlier as usize)?;
            offset = (offset + align - 1) & !(align - 1);
            offset += size;
        }

        let (size, align) = *FIELD_SIZE_ALIGN.get(bit as usize)?;
        offset = (offset + align - 1) & !(align - 1);
        if offset + size < self.packet.len() {
            Some(offset)
        } else {
            None
        }
    }

    /// The FLAGS field byte, if present
    pub fn flags(&self) -> Option<u8> {
        let offset = self.field_offset(field::FLAGS)?;
        Some(self.packet[offset])
    }

    /// Channel frequency in MHz from the CHANNEL field, if present
    pub fn channel_freq(&self) -> Option<u16> {
        let offset = self.field_offset(field::CHANNEL)?;
        Some(u16::from_le_bytes([
            self.packet[offset],
            self.packet[offset + 1],
        ]))
    }

    /// Antenna signal strength in dBm, if present
    pub fn antenna_signal_dbm(&self) -> Option<i8> {
        let offset = self.field_offset(field::DBM_ANTSIGNAL)?;
        Some(self.packet[offset] as i8)
    }
}

/// Map a channel frequency in MHz to its channel number.
///
/// Covers the 2.4 GHz, 5 GHz (including the 4.9 GHz public-safety band)
/// and 60 GHz bands.
pub fn freq_to_chan(freq: u16) -> Option<u8> {
    let chan = if (2412..=2472).contains(&freq) {
        (freq - 2407) / 5
    } else if freq == 2484 {
        14
    } else if (4900..5000).contains(&freq) {
        (freq - 4000) / 5
    } else if (5000..5900).contains(&freq) {
        (freq - 5000) / 5
    } else if (56160 + 2160..=56160 + 2160 * 4).contains(&freq) {
        (freq - 56160) / 2160
    } else {
        return None;
    };
    Some(chan as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_header() {
        let pkt = [0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff];
        let rt = RadiotapHeader::parse(&pkt).unwrap();
        assert_eq!(rt.length, 8);
        assert_eq!(rt.present, 0);
        assert_eq!(rt.flags(), None);
    }

    #[test]
    fn oversized_length_is_corrupt() {
        let pkt = [0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0x00, 0x00];
        match RadiotapHeader::parse(&pkt) {
            Err(reaver_core::Error::CorruptCapture(_)) => {}
            other => panic!("expected CorruptCapture, got {:?}", other.map(|r| r.length)),
        }
    }

    #[test]
    fn reads_fields_with_alignment() {
        // TSFT + FLAGS + CHANNEL + DBM_ANTSIGNAL present.
        // Data area: tsft (8, aligned) at 8, flags at 16, channel at 18
        // (2-aligned), antsignal at 22.
        let mut pkt = vec![0x00, 0x00, 0x18, 0x00, 0x2b, 0x00, 0x00, 0x00];
        pkt.extend_from_slice(&[0u8; 8]); // TSFT
        pkt.push(F_FCS); // FLAGS
        pkt.push(0x00); // alignment pad
        pkt.extend_from_slice(&2437u16.to_le_bytes()); // channel freq
        pkt.extend_from_slice(&[0x00, 0x00]); // channel flags
        pkt.push(0xc3); // -61 dBm
        pkt.push(0x00); // trailing frame byte so bounds checks pass

        let rt = RadiotapHeader::parse(&pkt).unwrap();
        assert_eq!(rt.flags(), Some(F_FCS));
        assert_eq!(rt.channel_freq(), Some(2437));
        assert_eq!(rt.antenna_signal_dbm(), Some(-61));
    }

    #[test]
    fn extension_words_shift_data_area() {
        // First word chains to a second via the EXT bit; FLAGS lands at 12.
        let pkt = [
            0x00, 0x00, 0x0e, 0x00, //
            0x02, 0x00, 0x00, 0x80, // FLAGS present + EXT
            0x00, 0x00, 0x00, 0x00, // second (empty) present word
            0x10, 0x00, // flags byte + padding
        ];
        let rt = RadiotapHeader::parse(&pkt).unwrap();
        assert_eq!(rt.flags(), Some(0x10));
    }

    #[test]
    fn non_radiotap_datalink_starts_at_zero() {
        let frame = [0x80, 0x00, 0x00, 0x00];
        let rt = RadiotapHeader::for_packet(&frame, false).unwrap();
        assert_eq!(rt.length, 0);
        assert_eq!(rt.flags(), None);
        assert_eq!(&frame[rt.length as usize..], &frame[..]);
    }

    #[test]
    fn freq_mapping() {
        assert_eq!(freq_to_chan(2412), Some(1));
        assert_eq!(freq_to_chan(2437), Some(6));
        assert_eq!(freq_to_chan(2484), Some(14));
        assert_eq!(freq_to_chan(5180), Some(36));
        assert_eq!(freq_to_chan(60480), Some(2));
        assert_eq!(freq_to_chan(1000), None);
    }
}
