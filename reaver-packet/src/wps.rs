//! WPS information-element extraction
//!
//! The WPS IE is a vendor-specific tag whose payload opens with the
//! Wi-Fi Alliance OUI and the Simple Config type byte (00:50:F2:04).
//! The rest of the payload is a big-endian type/length element stream.

use reaver_core::{tag, vendor, wps_el};

/// AP Setup Locked attribute, tri-state because most APs omit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WpsLocked {
    #[default]
    Unspecified,
    Unlocked,
    Locked,
}

/// Device information advertised in a beacon's or probe response's WPS IE.
#[derive(Debug, Clone, Default)]
pub struct WpsDeviceData {
    /// WPS version byte (0x10 = 1.0, 0x20 = 2.0 via vendor extension)
    pub version: u8,
    /// WPS state (1 = unconfigured, 2 = configured)
    pub state: u8,
    pub locked: WpsLocked,
    pub manufacturer: Option<String>,
    pub model_name: Option<String>,
    pub model_number: Option<String>,
    pub device_name: Option<String>,
    pub ssid: Option<String>,
    pub serial: Option<String>,
    pub os_version: Option<String>,
    /// Hex-encoded fields
    pub uuid: Option<String>,
    pub selected_registrar: Option<String>,
    pub response_type: Option<String>,
    pub primary_device_type: Option<String>,
    pub config_methods: Option<String>,
    pub rf_bands: Option<String>,
}

impl WpsDeviceData {
    /// Pull the WPS IE out of a tagged-parameter area and decode it.
    /// Returns `None` when no WPS IE is present.
    pub fn parse(tags: &[u8]) -> Option<Self> {
        let blob = find_wps_ie(tags)?;
        Some(Self::from_elements(blob))
    }

    /// Decode the element stream inside a located WPS IE blob.
    pub fn from_elements(blob: &[u8]) -> Self {
        let mut out = WpsDeviceData::default();

        if let Some(el) = find_element(blob, wps_el::VERSION) {
            if let Some(&v) = el.first() {
                out.version = v;
            }
        }
        if let Some(el) = find_element(blob, wps_el::WPS_STATE) {
            if let Some(&v) = el.first() {
                out.state = v;
            }
        }
        if let Some(el) = find_element(blob, wps_el::AP_SETUP_LOCKED) {
            out.locked = match el.first() {
                Some(&0x01) => WpsLocked::Locked,
                Some(_) => WpsLocked::Unlocked,
                None => WpsLocked::Unspecified,
            };
        }

        out.manufacturer = string_element(blob, wps_el::MANUFACTURER);
        out.model_name = string_element(blob, wps_el::MODEL_NAME);
        out.model_number = string_element(blob, wps_el::MODEL_NUMBER);
        out.device_name = string_element(blob, wps_el::DEVICE_NAME);
        out.ssid = string_element(blob, wps_el::SSID);
        out.serial = string_element(blob, wps_el::SERIAL_NUMBER);
        out.os_version = string_element(blob, wps_el::OS_VERSION);

        out.uuid = hex_element(blob, wps_el::ENROLLEE_UUID);
        out.selected_registrar = hex_element(blob, wps_el::SELECTED_REGISTRAR);
        out.response_type = hex_element(blob, wps_el::RESPONSE_TYPE);
        out.primary_device_type = hex_element(blob, wps_el::PRIMARY_DEVICE_TYPE);
        out.config_methods = hex_element(blob, wps_el::CONFIG_METHODS);
        out.rf_bands = hex_element(blob, wps_el::RF_BANDS);

        if let Some(v2) = parse_vendor_extension(blob) {
            out.version = v2;
        }

        out
    }

    pub fn is_locked(&self) -> bool {
        self.locked == WpsLocked::Locked
    }
}

/// Locate the WPS IE in a tagged-parameter area and return the element
/// stream past the vendor id prefix.
pub fn find_wps_ie(tags: &[u8]) -> Option<&[u8]> {
    for i in 0..tags.len() {
        if tags[i] != tag::VENDOR_SPECIFIC {
            continue;
        }
        if tags.len() - i > 2 + vendor::WPS_IE_ID.len()
            && tags[i + 2..i + 6] == vendor::WPS_IE_ID
        {
            let dlen = tags[i + 1] as usize;
            let data_len = dlen.saturating_sub(vendor::WPS_IE_ID.len());
            let start = i + 6;
            let end = (start + data_len).min(tags.len());
            return Some(&tags[start..end]);
        }
    }
    None
}

/// Find a WPS element (big-endian 2-byte type + 2-byte length) inside a
/// WPS IE blob. The same declared-length sanity rule as the IE walk
/// applies.
pub fn find_element(blob: &[u8], wanted: u16) -> Option<&[u8]> {
    let mut offset = 0;
    while offset + 4 < blob.len() {
        let eltype = u16::from_be_bytes([blob[offset], blob[offset + 1]]);
        let ellen = u16::from_be_bytes([blob[offset + 2], blob[offset + 3]]) as usize;
        if eltype == wanted && ellen <= blob.len() - offset - 4 {
            return Some(&blob[offset + 4..offset + 4 + ellen]);
        }
        offset += 4 + ellen;
    }
    None
}

fn string_element(blob: &[u8], wanted: u16) -> Option<String> {
    find_element(blob, wanted).map(|el| String::from_utf8_lossy(el).into_owned())
}

fn hex_element(blob: &[u8], wanted: u16) -> Option<String> {
    find_element(blob, wanted).map(|el| el.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Walk a WFA vendor extension (3-byte WFA id, then 1-byte type + 1-byte
/// length sub-elements) for the Version2 value.
fn parse_vendor_extension(blob: &[u8]) -> Option<u8> {
    let el = find_element(blob, wps_el::VENDOR_EXTENSION)?;
    if el.len() < 3 || el[..3] != vendor::WFA_EXTENSION_ID {
        return None;
    }

    let mut sub = &el[3..];
    while sub.len() >= 2 {
        let subtype = sub[0];
        let sublen = sub[1] as usize;
        if subtype == vendor::WPS_VERSION2_ID {
            return sub.get(2).copied();
        }
        if sub.len() < 2 + sublen {
            break;
        }
        sub = &sub[2 + sublen..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wps_ie(elements: &[u8]) -> Vec<u8> {
        let mut tags = vec![
            0x00, 0x03, b'a', b'p', b'1', // SSID IE first
            0xdd,
            (4 + elements.len()) as u8,
            0x00, 0x50, 0xf2, 0x04,
        ];
        tags.extend_from_slice(elements);
        tags
    }

    #[test]
    fn extracts_core_fields() {
        let elements = [
            0x10, 0x4a, 0x00, 0x01, 0x10, // version 1.0
            0x10, 0x44, 0x00, 0x01, 0x02, // state: configured
            0x10, 0x57, 0x00, 0x01, 0x01, // locked
            0x10, 0x21, 0x00, 0x04, b'A', b'c', b'm', b'e', // manufacturer
        ];
        let tags = wps_ie(&elements);
        let wps = WpsDeviceData::parse(&tags).unwrap();
        assert_eq!(wps.version, 0x10);
        assert_eq!(wps.state, 0x02);
        assert!(wps.is_locked());
        assert_eq!(wps.manufacturer.as_deref(), Some("Acme"));
    }

    #[test]
    fn vendor_extension_overrides_version() {
        let elements = [
            0x10, 0x4a, 0x00, 0x01, 0x10, // version 1.0
            0x10, 0x49, 0x00, 0x06, // vendor extension
            0x00, 0x37, 0x2a, // WFA id
            0x00, 0x01, 0x20, // version2 = 2.0
        ];
        let tags = wps_ie(&elements);
        let wps = WpsDeviceData::parse(&tags).unwrap();
        assert_eq!(wps.version, 0x20);
    }

    #[test]
    fn hex_fields_are_hex_encoded() {
        let elements = [
            0x10, 0x08, 0x00, 0x02, 0x21, 0x48, // config methods
        ];
        let tags = wps_ie(&elements);
        let wps = WpsDeviceData::parse(&tags).unwrap();
        assert_eq!(wps.config_methods.as_deref(), Some("2148"));
    }

    #[test]
    fn no_wps_ie_yields_none() {
        let tags = [0x00, 0x03, b'a', b'p', b'1', 0xdd, 0x04, 0x00, 0x50, 0xf2, 0x01];
        assert!(WpsDeviceData::parse(&tags).is_none());
    }

    #[test]
    fn absent_lock_attribute_is_unspecified() {
        let tags = wps_ie(&[0x10, 0x4a, 0x00, 0x01, 0x10]);
        let wps = WpsDeviceData::parse(&tags).unwrap();
        assert_eq!(wps.locked, WpsLocked::Unspecified);
        assert!(!wps.is_locked());
    }
}
