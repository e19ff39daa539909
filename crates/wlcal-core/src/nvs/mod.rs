//! # NVS image assembly
//!
//! Exactly one source supplies the image, in priority order:
//!
//! 1. the calibration store's `wlan-tx-cost3_0` block (used verbatim)
//! 2. the first readable firmware file, behind 4 reserved zero bytes
//! 3. [`DEFAULT_NVS`]
//!
//! For the `US` domain a 756-byte image gets its power limits raised.
//! Images of any other length are never patched.

mod default_image;

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::regdomain::RegulatoryDomain;

pub use default_image::DEFAULT_NVS;

/// Length of a complete wl1251 NVS image including the reserved prefix.
pub const NVS_IMAGE_LEN: usize = 756;

/// Reserved length/sequence prefix, never sent to the driver.
pub const NVS_PREFIX_LEN: usize = 4;

/// Power-limit bytes rewritten for the `US` domain: `(offset, value)`.
pub const US_POWER_PATCH: [(usize, u8); 4] = [(337, 2), (340, 9), (377, 2), (380, 9)];

/// Default firmware-directory candidates, tried in order.
pub const DEFAULT_FIRMWARE_PATHS: [&str; 2] = [
    "/lib/firmware/ti-connectivity/wl1251-nvs.bin",
    "/lib/firmware/wl1251-nvs.bin",
];

/// Where the NVS image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NvsSource {
    Calibration,
    Firmware(PathBuf),
    BuiltIn,
}

impl fmt::Display for NvsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NvsSource::Calibration => write!(f, "calibration"),
            NvsSource::Firmware(path) => write!(f, "firmware:{}", path.display()),
            NvsSource::BuiltIn => write!(f, "built-in"),
        }
    }
}

/// An NVS image in calibration-store layout (4-byte prefix + payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NvsImage {
    bytes: Vec<u8>,
    source: NvsSource,
    patched: bool,
}

impl NvsImage {
    pub fn new(bytes: Vec<u8>, source: NvsSource) -> Self {
        Self {
            bytes,
            source,
            patched: false,
        }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_NVS.to_vec(), NvsSource::BuiltIn)
    }

    /// Full image including the reserved prefix.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The part pushed to the driver: everything after the prefix.
    pub fn payload(&self) -> &[u8] {
        self.bytes.get(NVS_PREFIX_LEN..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn source(&self) -> &NvsSource {
        &self.source
    }

    pub fn is_patched(&self) -> bool {
        self.patched
    }

    /// Apply the regulatory power patch. Returns whether the image changed.
    pub fn apply_regulatory_patch(&mut self, domain: RegulatoryDomain) -> bool {
        if domain != RegulatoryDomain::US {
            return false;
        }
        if self.bytes.len() != NVS_IMAGE_LEN {
            warn!(
                len = self.bytes.len(),
                expected = NVS_IMAGE_LEN,
                "unexpected NVS layout, US power patch skipped"
            );
            return false;
        }
        for (offset, value) in US_POWER_PATCH {
            self.bytes[offset] = value;
        }
        self.patched = true;
        debug!("US power patch applied");
        true
    }
}

/// Read the first openable firmware file and lay it out behind the prefix.
pub fn read_firmware_nvs<P: AsRef<Path>>(candidates: &[P]) -> Option<NvsImage> {
    for path in candidates {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(data) => {
                if data.is_empty() {
                    warn!(path = %path.display(), "firmware NVS file is empty");
                }
                let mut bytes = Vec::with_capacity(NVS_PREFIX_LEN + data.len());
                bytes.extend_from_slice(&[0u8; NVS_PREFIX_LEN]);
                bytes.extend_from_slice(&data);
                return Some(NvsImage::new(bytes, NvsSource::Firmware(path.to_path_buf())));
            }
            Err(e) => debug!(path = %path.display(), error = %e, "firmware NVS candidate unreadable"),
        }
    }
    None
}

/// Choose the NVS image by source priority.
pub fn assemble<P: AsRef<Path>>(calibration: Option<Bytes>, firmware_paths: &[P]) -> NvsImage {
    let image = match calibration.filter(|b| !b.is_empty()) {
        Some(block) => NvsImage::new(block.to_vec(), NvsSource::Calibration),
        None => {
            warn!("no NVS in calibration store, trying firmware directory");
            read_firmware_nvs(firmware_paths).unwrap_or_else(|| {
                warn!("no firmware NVS file, using built-in image");
                NvsImage::builtin()
            })
        }
    };
    info!(source = %image.source(), len = image.len(), "NVS image selected");
    image
}
