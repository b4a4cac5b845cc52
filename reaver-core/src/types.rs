//! Common types and protocol constants used throughout reaver-rs

use std::fmt;
use std::str::FromStr;

/// MAC Address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Broadcast MAC address (ff:ff:ff:ff:ff:ff)
    pub const fn broadcast() -> Self {
        Self([0xff, 0xff, 0xff, 0xff, 0xff, 0xff])
    }

    /// Zero MAC address (00:00:00:00:00:00)
    pub const fn zero() -> Self {
        Self([0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff; 6]
    }

    /// Compact uppercase hex form without separators, used for session
    /// file names ("0123456789AB")
    pub fn to_compact_string(&self) -> String {
        self.0.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(crate::Error::parsing("Invalid MAC address format"));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| crate::Error::parsing("Invalid MAC address hex"))?;
        }

        Ok(MacAddr(bytes))
    }
}

/// Progress of the two-half PIN search.
///
/// Transitions only move forward: Key1Wip -> Key2Wip when the first half is
/// exhausted or cracked, Key2Wip -> KeyDone for the second half. A full-PIN
/// acceptance jumps straight to KeyDone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyState {
    Key1Wip = 0,
    Key2Wip = 1,
    KeyDone = 2,
}

impl KeyState {
    /// Decode the integer form used in session files
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(KeyState::Key1Wip),
            1 => Some(KeyState::Key2Wip),
            2 => Some(KeyState::KeyDone),
            _ => None,
        }
    }

    pub fn as_code(&self) -> i64 {
        *self as i64
    }
}

/// 802.11 frame-control field masks (the fc field itself is little-endian
/// on the wire)
pub mod fctl {
    pub const VERS: u16 = 0x0003;
    pub const FTYPE: u16 = 0x000c;
    pub const STYPE: u16 = 0x00f0;
    pub const TODS: u16 = 0x0100;
    pub const FROMDS: u16 = 0x0200;
    pub const RETRY: u16 = 0x0800;
    pub const PROTECTED: u16 = 0x4000;
}

/// 802.11 frame types (within [`fctl::FTYPE`])
pub mod ftype {
    pub const MGMT: u16 = 0x0000;
    pub const CTL: u16 = 0x0004;
    pub const DATA: u16 = 0x0008;
}

/// 802.11 management subtypes (within [`fctl::STYPE`])
pub mod stype {
    pub const ASSOC_REQ: u16 = 0x0000;
    pub const ASSOC_RESP: u16 = 0x0010;
    pub const PROBE_REQ: u16 = 0x0040;
    pub const PROBE_RESP: u16 = 0x0050;
    pub const BEACON: u16 = 0x0080;
    pub const AUTH: u16 = 0x00b0;
    pub const DEAUTH: u16 = 0x00c0;
}

/// Information-element tag numbers inside management frame bodies
pub mod tag {
    pub const SSID: u8 = 0x00;
    pub const SUPPORTED_RATES: u8 = 0x01;
    pub const CHANNEL: u8 = 0x03;
    pub const HT_CAPS: u8 = 0x2d;
    pub const RSN: u8 = 0x30;
    pub const EXT_RATES: u8 = 0x32;
    pub const VENDOR_SPECIFIC: u8 = 0xdd;
}

/// WPS sub-element identifiers (big-endian u16 inside the WPS IE blob)
pub mod wps_el {
    pub const AP_SETUP_LOCKED: u16 = 0x1057;
    pub const CONFIG_METHODS: u16 = 0x1008;
    pub const DEVICE_NAME: u16 = 0x1011;
    pub const MANUFACTURER: u16 = 0x1021;
    pub const MODEL_NAME: u16 = 0x1023;
    pub const MODEL_NUMBER: u16 = 0x1024;
    pub const OS_VERSION: u16 = 0x102d;
    pub const PRIMARY_DEVICE_TYPE: u16 = 0x1054;
    pub const RESPONSE_TYPE: u16 = 0x103b;
    pub const RF_BANDS: u16 = 0x103c;
    pub const SELECTED_REGISTRAR: u16 = 0x1041;
    pub const SERIAL_NUMBER: u16 = 0x1042;
    pub const SSID: u16 = 0x1045;
    pub const ENROLLEE_UUID: u16 = 0x1047;
    pub const VENDOR_EXTENSION: u16 = 0x1049;
    pub const VERSION: u16 = 0x104a;
    pub const WPS_STATE: u16 = 0x1044;

    // message attributes used in the registration protocol
    pub const MSG_TYPE: u16 = 0x1022;
    pub const ENROLLEE_NONCE: u16 = 0x101a;
    pub const REGISTRAR_NONCE: u16 = 0x1039;
    pub const CONFIG_ERROR: u16 = 0x1009;
    pub const REQUEST_TYPE: u16 = 0x103a;
}

/// EAP codes
pub mod eap {
    pub const REQUEST: u8 = 1;
    pub const RESPONSE: u8 = 2;
    pub const SUCCESS: u8 = 3;
    pub const FAILURE: u8 = 4;

    pub const TYPE_IDENTITY: u8 = 0x01;
    pub const TYPE_EXPANDED: u8 = 0xfe;
}

/// WSC (Simple Config) message-type identifiers carried in EAP-Expanded
/// payloads
pub mod wsc {
    pub const M1: u8 = 0x04;
    pub const M2: u8 = 0x05;
    pub const M3: u8 = 0x07;
    pub const M4: u8 = 0x08;
    pub const M5: u8 = 0x09;
    pub const M6: u8 = 0x0a;
    pub const M7: u8 = 0x0b;
    pub const M8: u8 = 0x0c;
    pub const NACK: u8 = 0x0e;
    pub const DONE: u8 = 0x0f;

    /// WSC opcodes (WFA expanded header opcode byte)
    pub const OP_START: u8 = 0x01;
    pub const OP_ACK: u8 = 0x02;
    pub const OP_NACK: u8 = 0x03;
    pub const OP_MSG: u8 = 0x04;
    pub const OP_DONE: u8 = 0x05;
}

/// Well-known vendor identifiers
pub mod vendor {
    /// WPS vendor-specific IE prefix (Wi-Fi Alliance OUI + Simple Config
    /// type byte)
    pub const WPS_IE_ID: [u8; 4] = [0x00, 0x50, 0xf2, 0x04];
    /// WFA expanded-header vendor id
    pub const WFA_ID: [u8; 3] = [0x00, 0x37, 0x2a];
    /// WFA vendor-extension id inside the WPS IE
    pub const WFA_EXTENSION_ID: [u8; 3] = [0x00, 0x37, 0x2a];
    /// Version2 sub-sub-element id inside a WFA vendor extension
    pub const WPS_VERSION2_ID: u8 = 0x00;
}

/// Number of candidates for the first (4-digit) PIN half
pub const P1_SIZE: usize = 10_000;
/// Number of candidates for the second (3-digit) PIN half
pub const P2_SIZE: usize = 1_000;
/// Digits in a full WPS PIN including the trailing checksum digit
pub const PIN_SIZE: usize = 8;
