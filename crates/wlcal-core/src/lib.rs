//! # wlcal-core
//!
//! Boot-time provisioning of a wl1251 radio from vendor calibration storage.
//!
//! The calibration partition carries the device MAC address, an FCC
//! certification marker and the radio's NVS (non-volatile settings) image.
//! This crate decodes those records, resolves the regulatory domain from a
//! mobile country code, assembles the NVS image and pushes both into the
//! running driver over generic netlink.
//!
//! ## Crate structure
//!
//! - [`reader`]: Bounds-checked cursor over calibration block bytes
//! - [`cal`]: Calibration store access and the three named blocks
//! - [`decode`]: MAC address, FCC flag and NVS extraction
//! - [`regdomain`]: Mobile country code → regulatory domain resolution
//! - [`nvs`]: NVS source selection, built-in default and US power patch
//! - [`netlink`]: Generic netlink messages (via `neli`), socket and session
//! - [`provision`]: The end-to-end provisioning pipeline

pub mod cal;
pub mod decode;
pub mod netlink;
pub mod nvs;
pub mod provision;
pub mod reader;
pub mod regdomain;

pub use decode::MacAddress;
pub use nvs::{NvsImage, NvsSource};
pub use regdomain::{RegdomainSource, RegulatoryDomain};
