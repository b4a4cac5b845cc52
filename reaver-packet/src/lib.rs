//! 802.11 frame codec for reaver-rs: radiotap parsing, FCS validation,
//! management frame classification, IE and WPS extraction, and outgoing
//! frame construction.

pub mod builder;
pub mod dot11;
pub mod fcs;
pub mod ie;
pub mod radiotap;
pub mod wps;

pub use builder::{EapFraming, FrameBuilder};
pub use dot11::{classify, Dot11Header, FrameKind};
pub use fcs::check_fcs;
pub use ie::{find_tag, BeaconTags};
pub use radiotap::{freq_to_chan, RadiotapHeader};
pub use wps::{WpsDeviceData, WpsLocked};
