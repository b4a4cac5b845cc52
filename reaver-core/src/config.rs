//! Attack-session configuration
//!
//! The original tool kept the target description in a process-wide mutable
//! "globule". Here it is an explicit value: built once from operator input
//! plus whatever the first target beacon reported, then passed by reference
//! into every component that needs it.

use crate::MacAddr;

/// Immutable description of the attack target and our own station.
#[derive(Debug, Clone, Default)]
pub struct TargetConfig {
    /// BSSID of the target access point
    pub bssid: MacAddr,
    /// Our own station MAC address
    pub own_mac: MacAddr,
    /// ESSID, either operator-fixed or learned from a beacon
    pub ssid: Option<String>,
    /// Whether the ssid was fixed by the operator (learned values must not
    /// overwrite it)
    pub ssid_fixed: bool,
    /// Current channel number
    pub channel: u8,
    /// Capability field reported by the target's beacon
    pub ap_capability: u16,
    /// Supported-rates IE payload learned from the beacon
    pub ap_rates: Vec<u8>,
    /// Extended-rates IE payload learned from the beacon
    pub ap_ext_rates: Vec<u8>,
    /// HT-capabilities IE payload learned from the beacon
    pub ap_htcaps: Vec<u8>,
    /// Operator-fixed first PIN half ("0000".."9999"), if any
    pub static_p1: Option<String>,
    /// Operator-fixed second PIN half ("000".."999"), if any
    pub static_p2: Option<String>,
    /// Operator supplied an arbitrary (non-numeric) PIN string; the search
    /// space and session persistence are meaningless in this mode
    pub pin_string_mode: bool,
}

impl TargetConfig {
    pub fn new(bssid: MacAddr, own_mac: MacAddr) -> Self {
        Self {
            bssid,
            own_mac,
            ..Default::default()
        }
    }

    /// Fold beacon-learned parameters into a new config. The fixed SSID, if
    /// any, wins over the beacon's.
    pub fn with_beacon_info(
        mut self,
        ssid: Option<String>,
        capability: u16,
        rates: Vec<u8>,
        ext_rates: Vec<u8>,
        htcaps: Vec<u8>,
    ) -> Self {
        if !self.ssid_fixed {
            self.ssid = ssid;
        }
        self.ap_capability = capability;
        self.ap_rates = rates;
        self.ap_ext_rates = ext_rates;
        self.ap_htcaps = htcaps;
        self
    }

    pub fn ssid_str(&self) -> &str {
        self.ssid.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ssid_survives_beacon_info() {
        let mut cfg = TargetConfig::new(MacAddr::broadcast(), MacAddr::zero());
        cfg.ssid = Some("operator".into());
        cfg.ssid_fixed = true;

        let cfg = cfg.with_beacon_info(Some("beacon".into()), 0x0431, vec![], vec![], vec![]);
        assert_eq!(cfg.ssid_str(), "operator");
        assert_eq!(cfg.ap_capability, 0x0431);
    }

    #[test]
    fn learned_ssid_applied_when_not_fixed() {
        let cfg = TargetConfig::new(MacAddr::zero(), MacAddr::zero()).with_beacon_info(
            Some("beacon".into()),
            0,
            vec![0x82, 0x84],
            vec![],
            vec![],
        );
        assert_eq!(cfg.ssid_str(), "beacon");
        assert_eq!(cfg.ap_rates, vec![0x82, 0x84]);
    }
}
