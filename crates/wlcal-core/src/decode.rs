//! Calibration record decoding.
//!
//! ## `cert-npc` (identity)
//!
//! ```text
//! 0x000  header (0x94 bytes, ignored)
//! 0x094  record count (u32 LE)
//! 0x098  record[0]: tag (8 bytes, NUL-padded) | payload (32 bytes)
//!        record[1] ...
//! ```
//!
//! The `WLAN_ID` record's first six payload bytes are the MAC address,
//! stored least-significant byte first.
//!
//! ## `cert-ccc` (certification)
//!
//! ```text
//! 0x000  header (368 bytes, ignored)
//! 0x170  byte count N (u32 LE)
//! 0x174  N/4 records of 4 bytes
//! ```
//!
//! A record equal to `00 00 02 00` marks the device as FCC certified.

use std::fmt;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::reader::{ByteReader, DecodeError};

/// Offset of the record count in `cert-npc`.
pub const NPC_HEADER_LEN: usize = 0x94;
/// Stride of one `cert-npc` record.
pub const NPC_RECORD_LEN: usize = 40;
/// Length of a `cert-npc` record tag.
pub const NPC_TAG_LEN: usize = 8;
/// Tag of the record carrying the WLAN MAC address.
pub const WLAN_ID_TAG: &[u8; NPC_TAG_LEN] = b"WLAN_ID\0";

/// Offset of the byte count in `cert-ccc`.
pub const CCC_HEADER_LEN: usize = 368;
/// Certification record marking FCC approval.
pub const FCC_RECORD: [u8; 4] = [0x00, 0x00, 0x02, 0x00];

/// A 6-byte Ethernet hardware address in transmission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// "No address found" sentinel.
    pub const ZERO: MacAddress = MacAddress([0; 6]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Build from the stored (reversed) byte order.
    pub fn from_stored(stored: [u8; 6]) -> Self {
        let mut out = stored;
        out.reverse();
        MacAddress(out)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Scan a `cert-npc` block for the `WLAN_ID` record.
///
/// Returns [`MacAddress::ZERO`] when no record matches. Records past the
/// end of the block are a decode error.
pub fn decode_mac(block: &[u8]) -> Result<MacAddress, DecodeError> {
    let mut r = ByteReader::new(block);
    r.seek(NPC_HEADER_LEN)?;
    let count = r.read_u32_le()?;

    for index in 0..count {
        let record = r.take(NPC_RECORD_LEN)?;
        if &record[..NPC_TAG_LEN] == WLAN_ID_TAG {
            let mut stored = [0u8; 6];
            stored.copy_from_slice(&record[NPC_TAG_LEN..NPC_TAG_LEN + 6]);
            debug!(index, "WLAN_ID record found");
            return Ok(MacAddress::from_stored(stored));
        }
    }
    Ok(MacAddress::ZERO)
}

/// Scan a `cert-ccc` block for the FCC certification record.
pub fn decode_fcc(block: &[u8]) -> Result<bool, DecodeError> {
    let mut r = ByteReader::new(block);
    r.seek(CCC_HEADER_LEN)?;
    let byte_count = r.read_u32_le()? as usize;

    let mut fcc = false;
    for _ in 0..byte_count / 4 {
        if r.read_array::<4>()? == FCC_RECORD {
            fcc = true;
        }
    }
    Ok(fcc)
}

/// MAC address from an optional `cert-npc` block, degrading to zero.
pub fn mac_from_block(block: Option<&Bytes>) -> MacAddress {
    let Some(block) = block else {
        warn!("no identity block, MAC address unknown");
        return MacAddress::ZERO;
    };
    match decode_mac(block) {
        Ok(mac) if mac.is_zero() => {
            warn!("identity block has no WLAN_ID record");
            mac
        }
        Ok(mac) => {
            info!(%mac, "MAC address decoded");
            mac
        }
        Err(e) => {
            warn!(error = %e, "identity block malformed, MAC address unknown");
            MacAddress::ZERO
        }
    }
}

/// FCC flag from an optional `cert-ccc` block, degrading to `false`.
pub fn fcc_from_block(block: Option<&Bytes>) -> bool {
    let Some(block) = block else {
        warn!("no certification block, assuming non-FCC");
        return false;
    };
    match decode_fcc(block) {
        Ok(fcc) => {
            info!(fcc, "certification block decoded");
            fcc
        }
        Err(e) => {
            warn!(error = %e, "certification block malformed, assuming non-FCC");
            false
        }
    }
}

/// NVS image from an optional `wlan-tx-cost3_0` block, used verbatim.
pub fn nvs_from_block(block: Option<&Bytes>) -> Option<Bytes> {
    block.filter(|b| !b.is_empty()).cloned()
}
