//! Information-element (tagged parameter) extraction
//!
//! Each IE is a one-byte tag number, a one-byte length, then the payload.
//! A declared length larger than the remaining buffer is never returned,
//! but the walk still advances by the declared length, so a corrupted
//! length byte can desynchronize the rest of the walk. That matches the
//! behavior APs in the field have been probed with for years, so it is
//! kept as-is.

use reaver_core::tag;

/// Find the first IE with `number` and return its payload and the offset
/// of the IE itself within `data`.
pub fn find_tag(data: &[u8], number: u8) -> Option<(&[u8], usize)> {
    let mut offset = 0;
    while offset + 2 < data.len() {
        let found = data[offset];
        let declared = data[offset + 1] as usize;
        if found == number && declared <= data.len() - offset - 2 {
            return Some((&data[offset + 2..offset + 2 + declared], offset));
        }
        offset += 2 + declared;
    }
    None
}

/// Everything the attack wants from a single pass over a beacon's (or
/// probe response's) tagged parameters.
#[derive(Debug, Clone, Default)]
pub struct BeaconTags {
    pub ssid: Option<String>,
    pub channel: Option<u8>,
    pub rates: Vec<u8>,
    pub ext_rates: Vec<u8>,
    pub ht_caps: Vec<u8>,
    /// First vendor OUI matching the chipset heuristic, if any
    pub vendor_oui: Option<[u8; 3]>,
}

impl BeaconTags {
    /// Parse the tagged-parameter area of a beacon (everything after the
    /// fixed parameters).
    pub fn parse(tags: &[u8]) -> Self {
        let mut out = BeaconTags::default();

        if let Some((ie, _)) = find_tag(tags, tag::SSID) {
            out.ssid = Some(String::from_utf8_lossy(ie).into_owned());
        }
        if let Some((ie, _)) = find_tag(tags, tag::HT_CAPS) {
            out.ht_caps = ie.to_vec();
        }
        if let Some((ie, _)) = find_tag(tags, tag::SUPPORTED_RATES) {
            out.rates = ie.to_vec();
        }
        if let Some((ie, _)) = find_tag(tags, tag::EXT_RATES) {
            out.ext_rates = ie.to_vec();
        }
        if let Some((ie, _)) = find_tag(tags, tag::CHANNEL) {
            if ie.len() == 1 {
                out.channel = Some(ie[0]);
            }
        }

        out.vendor_oui = sniff_vendor_oui(tags);
        out
    }
}

/// Heuristic chipset-vendor sniff over the vendor-specific IEs.
///
/// Short vendor IEs that are neither Broadcom's 00:14:6c nor Microsoft's
/// 00:50:f2 tend to name the actual chipset maker; the one 30-byte
/// exception is AirTies (00:26:86).
fn sniff_vendor_oui(tags: &[u8]) -> Option<[u8; 3]> {
    let mut pos = 0;
    loop {
        if pos + 2 + 3 < tags.len() && tags[pos] == tag::VENDOR_SPECIFIC {
            let dlen = tags[pos + 1];
            let oui = [tags[pos + 2], tags[pos + 3], tags[pos + 4]];
            let interesting = (dlen < 11 && oui != [0x00, 0x14, 0x6c] && oui != [0x00, 0x50, 0xf2])
                || (dlen == 30 && oui == [0x00, 0x26, 0x86]);
            if interesting {
                return Some(oui);
            }
        }

        // step to the next IE; a truncated length ends the walk
        if pos + 2 >= tags.len() {
            return None;
        }
        pos = pos + 2 + tags[pos + 1] as usize;
        if pos >= tags.len() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_tag_payload_and_offset() {
        let tags = [
            0x00, 0x04, b't', b'e', b's', b't', // SSID
            0x03, 0x01, 0x06, // channel
        ];
        let (ssid, off) = find_tag(&tags, 0x00).unwrap();
        assert_eq!(ssid, b"test");
        assert_eq!(off, 0);
        let (chan, off) = find_tag(&tags, 0x03).unwrap();
        assert_eq!(chan, &[0x06]);
        assert_eq!(off, 6);
    }

    #[test]
    fn oversized_length_is_skipped_not_returned() {
        // declared length 0x20 but only 2 bytes remain
        let tags = [0x00, 0x20, 0xaa, 0xbb];
        assert!(find_tag(&tags, 0x00).is_none());
    }

    #[test]
    fn one_pass_beacon_extraction() {
        let tags = [
            0x00, 0x03, b'a', b'p', b'1', // SSID
            0x01, 0x02, 0x82, 0x84, // rates
            0x03, 0x01, 0x0b, // channel 11
            0x32, 0x01, 0x30, // ext rates
        ];
        let parsed = BeaconTags::parse(&tags);
        assert_eq!(parsed.ssid.as_deref(), Some("ap1"));
        assert_eq!(parsed.channel, Some(11));
        assert_eq!(parsed.rates, vec![0x82, 0x84]);
        assert_eq!(parsed.ext_rates, vec![0x30]);
        assert!(parsed.ht_caps.is_empty());
        assert_eq!(parsed.vendor_oui, None);
    }

    #[test]
    fn vendor_sniff_skips_microsoft_and_broadcom() {
        let tags = [
            0xdd, 0x05, 0x00, 0x50, 0xf2, 0x01, 0x01, // Microsoft, ignored
            0xdd, 0x05, 0x00, 0x1a, 0x2b, 0x00, 0x00, // short unknown OUI, hit
        ];
        assert_eq!(sniff_vendor_oui(&tags), Some([0x00, 0x1a, 0x2b]));
    }

    #[test]
    fn vendor_sniff_airties_special_case() {
        let mut tags = vec![0xdd, 30, 0x00, 0x26, 0x86];
        tags.extend_from_slice(&[0u8; 27]);
        assert_eq!(sniff_vendor_oui(&tags), Some([0x00, 0x26, 0x86]));
    }
}
