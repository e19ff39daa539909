//! Property-based tests for calibration decoding and NVS patching.
//!
//! Blocks are generated with the record layouts the factory tooling writes,
//! then decoded back.

use proptest::prelude::*;
use wlcal_core::decode::{
    decode_fcc, decode_mac, CCC_HEADER_LEN, FCC_RECORD, NPC_HEADER_LEN, NPC_RECORD_LEN,
    NPC_TAG_LEN, WLAN_ID_TAG,
};
use wlcal_core::nvs::{NvsImage, NvsSource, NVS_IMAGE_LEN, US_POWER_PATCH};
use wlcal_core::{MacAddress, RegulatoryDomain};

/// Build an NPC block with `count` records; record `wlan_at` (if any) is
/// the WLAN_ID record carrying `stored`.
fn npc_block(count: usize, wlan_at: Option<usize>, stored: [u8; 6], filler: u8) -> Vec<u8> {
    let mut out = vec![filler; NPC_HEADER_LEN];
    out.extend_from_slice(&(count as u32).to_le_bytes());
    for i in 0..count {
        let mut record = vec![filler; NPC_RECORD_LEN];
        if Some(i) == wlan_at {
            record[..NPC_TAG_LEN].copy_from_slice(WLAN_ID_TAG);
            record[NPC_TAG_LEN..NPC_TAG_LEN + 6].copy_from_slice(&stored);
        } else {
            record[..NPC_TAG_LEN].copy_from_slice(b"BT_ID\0\0\0");
        }
        out.extend_from_slice(&record);
    }
    out
}

fn ccc_block(records: &[[u8; 4]]) -> Vec<u8> {
    let mut out = vec![0u8; CCC_HEADER_LEN];
    out.extend_from_slice(&((records.len() * 4) as u32).to_le_bytes());
    for r in records {
        out.extend_from_slice(r);
    }
    out
}

// ─── MAC Address ─────────────────────────────────────────────────────────────

proptest! {
    /// The stored octets come back reversed wherever the WLAN_ID record sits.
    #[test]
    fn mac_found_at_any_record(
        count in 1usize..=12,
        at in 0usize..12,
        stored in any::<[u8; 6]>(),
        filler in any::<u8>(),
    ) {
        let at = at % count;
        let block = npc_block(count, Some(at), stored, filler);
        let mut expected = stored;
        expected.reverse();
        prop_assert_eq!(decode_mac(&block).unwrap(), MacAddress(expected));
    }

    /// Without a WLAN_ID record the address is all zeros.
    #[test]
    fn mac_absent_is_zero(count in 0usize..=12, filler in any::<u8>()) {
        let block = npc_block(count, None, [0xaa; 6], filler);
        prop_assert!(decode_mac(&block).unwrap().is_zero());
    }

    /// Cutting a block short inside the records is an error, never a panic.
    #[test]
    fn truncated_npc_is_error(count in 1usize..=8, cut in 1usize..NPC_RECORD_LEN) {
        let block = npc_block(count, None, [0; 6], 0);
        prop_assert!(decode_mac(&block[..block.len() - cut]).is_err());
    }
}

// ─── FCC Flag ────────────────────────────────────────────────────────────────

proptest! {
    /// The device is FCC certified iff the last record equal to the FCC
    /// marker exists; any other record leaves the flag untouched.
    #[test]
    fn fcc_iff_marker_present(records in proptest::collection::vec(any::<[u8; 4]>(), 0..16)) {
        let block = ccc_block(&records);
        let expected = records.iter().any(|r| *r == FCC_RECORD);
        prop_assert_eq!(decode_fcc(&block).unwrap(), expected);
    }

    #[test]
    fn fcc_marker_anywhere(n in 1usize..16, at in 0usize..16) {
        let mut records = vec![[1u8, 2, 3, 4]; n];
        records[at % n] = FCC_RECORD;
        prop_assert!(decode_fcc(&ccc_block(&records)).unwrap());
    }
}

// ─── Regulatory Patch ────────────────────────────────────────────────────────

proptest! {
    /// Only a full-length image under the US domain is patched, and only the
    /// four power-limit bytes change.
    #[test]
    fn patch_only_full_length_us(len in 0usize..=1024, fill in any::<u8>(), us in any::<bool>()) {
        let original = vec![fill; len];
        let mut image = NvsImage::new(original.clone(), NvsSource::Calibration);
        let domain = if us {
            RegulatoryDomain::US
        } else {
            RegulatoryDomain::parse("DE").unwrap()
        };
        let patched = image.apply_regulatory_patch(domain);

        prop_assert_eq!(patched, us && len == NVS_IMAGE_LEN);
        prop_assert_eq!(image.is_patched(), patched);
        for (i, (&after, &before)) in image.as_bytes().iter().zip(&original).enumerate() {
            match US_POWER_PATCH.iter().find(|(offset, _)| *offset == i) {
                Some(&(_, value)) if patched => prop_assert_eq!(after, value),
                _ => prop_assert_eq!(after, before),
            }
        }
    }
}
