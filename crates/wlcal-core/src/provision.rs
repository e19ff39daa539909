//! # Provisioning pipeline
//!
//! ```text
//!   calibration store ──▶ MAC ──────────────▶ hardware address
//!                    ├──▶ FCC flag ─┐
//!                    └──▶ NVS ──────┼──▶ assemble + patch ──┐
//!   override / country sources ─────┴──▶ regdomain ─────────┼──▶ netlink
//!                                                            │   push NVS
//!                                                            └──▶ push regdomain
//! ```
//!
//! Every step degrades instead of aborting. Only the caller decides whether
//! a failed hardware-address assignment should fail the process.

use std::fmt;
use std::io;
use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::cal::{CalBlocks, CalibrationStore};
use crate::decode::{fcc_from_block, mac_from_block, nvs_from_block, MacAddress};
use crate::netlink::{GenlSession, NetlinkError, Transport};
use crate::nvs::{self, NvsImage};
use crate::regdomain::{self, RegdomainSource, RegulatoryDomain};

/// Sets the hardware address of a network interface.
pub trait HwAddrSetter {
    fn set_hw_addr(&mut self, ifname: &str, mac: MacAddress) -> io::Result<()>;
}

/// Operator-configured regulatory domain, bypassing country resolution.
pub trait RegdomainOverride {
    fn regdomain(&mut self) -> Option<RegulatoryDomain>;
}

/// A source of the current mobile country code.
pub trait CountryCodeSource {
    fn name(&self) -> &str;

    /// `None` or `Some(0)` means unknown.
    fn country_code(&mut self) -> Option<u32>;
}

/// The two driver-facing operations of a provisioning run.
pub trait RadioControl {
    fn push_nvs(&mut self, ifname: &str, image: &NvsImage) -> Result<(), NetlinkError>;
    fn set_regdomain(&mut self, domain: RegulatoryDomain) -> Result<(), NetlinkError>;
}

impl<T: Transport> RadioControl for GenlSession<T> {
    fn push_nvs(&mut self, ifname: &str, image: &NvsImage) -> Result<(), NetlinkError> {
        GenlSession::<T>::push_nvs(self, ifname, image)
    }

    fn set_regdomain(&mut self, domain: RegulatoryDomain) -> Result<(), NetlinkError> {
        GenlSession::<T>::set_regdomain(self, domain)
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub interface: String,
    pub firmware_paths: Vec<PathBuf>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".into(),
            firmware_paths: nvs::DEFAULT_FIRMWARE_PATHS
                .iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

/// Everything decided before touching the interface or the driver.
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    pub mac: MacAddress,
    pub fcc: bool,
    /// Mobile country code used for resolution, 0 when unknown.
    pub country_code: u32,
    pub domain: RegulatoryDomain,
    pub domain_source: RegdomainSource,
    pub nvs: NvsImage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Skipped(&'static str),
    Failed(String),
}

impl StepStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepStatus::Failed(_))
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Done => write!(f, "done"),
            StepStatus::Skipped(why) => write!(f, "skipped ({why})"),
            StepStatus::Failed(e) => write!(f, "failed ({e})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub plan: ProvisionPlan,
    pub hwaddr: StepStatus,
    pub nvs_push: StepStatus,
    pub regdomain_push: StepStatus,
}

pub struct Provisioner<'a> {
    config: ProvisionConfig,
    store: Option<Box<dyn CalibrationStore + 'a>>,
    hwaddr: Option<Box<dyn HwAddrSetter + 'a>>,
    regdomain_override: Option<Box<dyn RegdomainOverride + 'a>>,
    country_sources: Vec<Box<dyn CountryCodeSource + 'a>>,
}

impl<'a> Provisioner<'a> {
    pub fn new(config: ProvisionConfig) -> Self {
        Self {
            config,
            store: None,
            hwaddr: None,
            regdomain_override: None,
            country_sources: Vec::new(),
        }
    }

    pub fn with_store(mut self, store: impl CalibrationStore + 'a) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_hwaddr_setter(mut self, setter: impl HwAddrSetter + 'a) -> Self {
        self.hwaddr = Some(Box::new(setter));
        self
    }

    pub fn with_regdomain_override(mut self, source: impl RegdomainOverride + 'a) -> Self {
        self.regdomain_override = Some(Box::new(source));
        self
    }

    /// Country sources are consulted in the order they are added.
    pub fn with_country_source(mut self, source: impl CountryCodeSource + 'a) -> Self {
        self.country_sources.push(Box::new(source));
        self
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    /// Decode calibration data, resolve the domain and assemble the NVS.
    ///
    /// The calibration store is released once its blocks are read.
    pub fn plan(&mut self) -> ProvisionPlan {
        let blocks = {
            let mut store = self.store.take();
            CalBlocks::load(store.as_deref_mut().map(|s| s as &mut dyn CalibrationStore))
        };

        let mac = mac_from_block(blocks.npc.as_ref());
        let fcc = fcc_from_block(blocks.ccc.as_ref());
        let (domain, domain_source, country_code) = self.resolve_domain(fcc);
        info!(%domain, source = %domain_source, country_code, fcc, "regulatory domain resolved");

        let mut nvs = nvs::assemble(nvs_from_block(blocks.nvs.as_ref()), &self.config.firmware_paths);
        nvs.apply_regulatory_patch(domain);

        ProvisionPlan {
            mac,
            fcc,
            country_code,
            domain,
            domain_source,
            nvs,
        }
    }

    fn resolve_domain(&mut self, fcc: bool) -> (RegulatoryDomain, RegdomainSource, u32) {
        if let Some(domain) = self.regdomain_override.as_mut().and_then(|o| o.regdomain()) {
            info!(%domain, "operator regulatory domain override");
            return (domain, RegdomainSource::Override, 0);
        }

        let mut country_code = 0;
        for source in &mut self.country_sources {
            match source.country_code() {
                Some(code) if code != 0 => {
                    info!(source = source.name(), country_code = code, "country code found");
                    country_code = code;
                    break;
                }
                _ => info!(source = source.name(), "no country code"),
            }
        }

        let (domain, source) = regdomain::resolve_with_source(country_code, fcc);
        (domain, source, country_code)
    }

    fn assign_hwaddr(&mut self, mac: MacAddress) -> StepStatus {
        if mac.is_zero() {
            warn!("no MAC address in calibration data, keeping current address");
            return StepStatus::Skipped("no MAC address");
        }
        let Some(setter) = self.hwaddr.as_mut() else {
            return StepStatus::Skipped("no hardware address setter");
        };
        match setter.set_hw_addr(&self.config.interface, mac) {
            Ok(()) => {
                info!(interface = %self.config.interface, %mac, "hardware address set");
                StepStatus::Done
            }
            Err(e) => {
                error!(interface = %self.config.interface, %mac, error = %e, "failed to set hardware address");
                StepStatus::Failed(e.to_string())
            }
        }
    }

    /// Run the whole pipeline. `connect` opens the netlink session; if it
    /// fails both pushes are skipped.
    pub fn run<R, F>(&mut self, connect: F) -> ProvisionReport
    where
        R: RadioControl,
        F: FnOnce() -> Result<R, NetlinkError>,
    {
        let plan = self.plan();
        let hwaddr = self.assign_hwaddr(plan.mac);

        let (nvs_push, regdomain_push) = match connect() {
            Ok(mut radio) => {
                let nvs_push = match radio.push_nvs(&self.config.interface, &plan.nvs) {
                    Ok(()) => StepStatus::Done,
                    Err(e) => {
                        error!(interface = %self.config.interface, error = %e, "NVS push failed");
                        StepStatus::Failed(e.to_string())
                    }
                };
                let regdomain_push = match radio.set_regdomain(plan.domain) {
                    Ok(()) => StepStatus::Done,
                    Err(e) => {
                        error!(domain = %plan.domain, error = %e, "regulatory domain push failed");
                        StepStatus::Failed(e.to_string())
                    }
                };
                (nvs_push, regdomain_push)
            }
            Err(e) => {
                error!(error = %e, "netlink unavailable, skipping driver configuration");
                (
                    StepStatus::Skipped("netlink unavailable"),
                    StepStatus::Skipped("netlink unavailable"),
                )
            }
        };

        ProvisionReport {
            plan,
            hwaddr,
            nvs_push,
            regdomain_push,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cal::{MemoryStore, BLOCK_CCC, BLOCK_NPC, BLOCK_NVS};
    use crate::decode::{CCC_HEADER_LEN, FCC_RECORD, NPC_HEADER_LEN, WLAN_ID_TAG};
    use crate::nvs::{NvsSource, DEFAULT_NVS, NVS_IMAGE_LEN};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Calls {
        hwaddr: Vec<(String, MacAddress)>,
        nvs: Vec<(String, Vec<u8>)>,
        regdomain: Vec<RegulatoryDomain>,
    }

    struct FakeHwAddr {
        calls: Rc<RefCell<Calls>>,
        fail: bool,
    }

    impl HwAddrSetter for FakeHwAddr {
        fn set_hw_addr(&mut self, ifname: &str, mac: MacAddress) -> io::Result<()> {
            self.calls.borrow_mut().hwaddr.push((ifname.to_string(), mac));
            if self.fail {
                Err(io::Error::from_raw_os_error(libc::EPERM))
            } else {
                Ok(())
            }
        }
    }

    struct FakeRadio {
        calls: Rc<RefCell<Calls>>,
        nvs_error: Option<i32>,
    }

    impl RadioControl for FakeRadio {
        fn push_nvs(&mut self, ifname: &str, image: &NvsImage) -> Result<(), NetlinkError> {
            if let Some(code) = self.nvs_error {
                return Err(NetlinkError::Kernel { code });
            }
            self.calls
                .borrow_mut()
                .nvs
                .push((ifname.to_string(), image.as_bytes().to_vec()));
            Ok(())
        }

        fn set_regdomain(&mut self, domain: RegulatoryDomain) -> Result<(), NetlinkError> {
            self.calls.borrow_mut().regdomain.push(domain);
            Ok(())
        }
    }

    struct Fixed(Option<u32>);

    impl CountryCodeSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
        fn country_code(&mut self) -> Option<u32> {
            self.0
        }
    }

    struct Override(Option<RegulatoryDomain>);

    impl RegdomainOverride for Override {
        fn regdomain(&mut self) -> Option<RegulatoryDomain> {
            self.0
        }
    }

    fn no_firmware() -> ProvisionConfig {
        ProvisionConfig {
            interface: "wlan0".into(),
            firmware_paths: vec![PathBuf::from("/nonexistent/wl1251-nvs.bin")],
        }
    }

    fn npc_with_mac(stored: [u8; 6]) -> Vec<u8> {
        let mut out = vec![0u8; NPC_HEADER_LEN];
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(WLAN_ID_TAG);
        out.extend_from_slice(&stored);
        out.extend_from_slice(&[0u8; 26]);
        out
    }

    fn ccc_fcc() -> Vec<u8> {
        let mut out = vec![0u8; CCC_HEADER_LEN];
        out.extend_from_slice(&4u32.to_le_bytes());
        out.extend_from_slice(&FCC_RECORD);
        out
    }

    #[test]
    fn degraded_run_uses_builtin_nvs_and_country_table() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut p = Provisioner::new(no_firmware())
            .with_hwaddr_setter(FakeHwAddr {
                calls: calls.clone(),
                fail: false,
            })
            .with_regdomain_override(Override(None))
            .with_country_source(Fixed(Some(234)));

        let report = p.run(|| {
            Ok(FakeRadio {
                calls: calls.clone(),
                nvs_error: None,
            })
        });

        assert_eq!(report.plan.domain.as_str(), "GB");
        assert_eq!(report.plan.domain_source, RegdomainSource::Table);
        assert_eq!(report.plan.nvs.source(), &NvsSource::BuiltIn);
        assert!(!report.plan.nvs.is_patched());
        assert_eq!(report.hwaddr, StepStatus::Skipped("no MAC address"));
        assert_eq!(report.nvs_push, StepStatus::Done);
        assert_eq!(report.regdomain_push, StepStatus::Done);

        let calls = calls.borrow();
        assert!(calls.hwaddr.is_empty());
        assert_eq!(calls.nvs.len(), 1);
        assert_eq!(calls.nvs[0].1, DEFAULT_NVS.to_vec());
        assert_eq!(calls.regdomain, vec![RegulatoryDomain::parse("GB").unwrap()]);
    }

    #[test]
    fn fcc_device_without_country_is_patched_for_us() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let store = MemoryStore::new()
            .with_block(BLOCK_NPC, npc_with_mac([6, 5, 4, 3, 2, 1]))
            .with_block(BLOCK_CCC, ccc_fcc())
            .with_block(BLOCK_NVS, vec![0x11u8; NVS_IMAGE_LEN]);
        let mut p = Provisioner::new(no_firmware())
            .with_store(store)
            .with_hwaddr_setter(FakeHwAddr {
                calls: calls.clone(),
                fail: false,
            })
            .with_country_source(Fixed(None))
            .with_country_source(Fixed(Some(0)));

        let report = p.run(|| {
            Ok(FakeRadio {
                calls: calls.clone(),
                nvs_error: None,
            })
        });

        assert!(report.plan.fcc);
        assert_eq!(report.plan.country_code, 0);
        assert_eq!(report.plan.domain, RegulatoryDomain::US);
        assert_eq!(report.plan.domain_source, RegdomainSource::FccCertified);
        assert_eq!(report.plan.nvs.source(), &NvsSource::Calibration);
        assert!(report.plan.nvs.is_patched());
        assert_eq!(report.hwaddr, StepStatus::Done);

        let calls = calls.borrow();
        assert_eq!(
            calls.hwaddr,
            vec![("wlan0".to_string(), MacAddress([1, 2, 3, 4, 5, 6]))]
        );
        let pushed = &calls.nvs[0].1;
        assert_eq!([pushed[337], pushed[340], pushed[377], pushed[380]], [2, 9, 2, 9]);
    }

    #[test]
    fn override_skips_country_sources() {
        struct Panicking;
        impl CountryCodeSource for Panicking {
            fn name(&self) -> &str {
                "panicking"
            }
            fn country_code(&mut self) -> Option<u32> {
                panic!("country source consulted despite override");
            }
        }

        let mut p = Provisioner::new(no_firmware())
            .with_regdomain_override(Override(RegulatoryDomain::parse("fi")))
            .with_country_source(Panicking);
        let plan = p.plan();
        assert_eq!(plan.domain.as_str(), "FI");
        assert_eq!(plan.domain_source, RegdomainSource::Override);
    }

    #[test]
    fn first_nonzero_country_wins() {
        let mut p = Provisioner::new(no_firmware())
            .with_country_source(Fixed(Some(0)))
            .with_country_source(Fixed(Some(262)))
            .with_country_source(Fixed(Some(310)));
        let plan = p.plan();
        assert_eq!(plan.country_code, 262);
        assert_eq!(plan.domain.as_str(), "DE");
    }

    #[test]
    fn connect_failure_skips_both_pushes() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let mut p = Provisioner::new(no_firmware()).with_hwaddr_setter(FakeHwAddr {
            calls: calls.clone(),
            fail: false,
        });
        let report = p.run(|| -> Result<FakeRadio, NetlinkError> {
            Err(NetlinkError::Io(io::Error::from_raw_os_error(libc::EPROTONOSUPPORT)))
        });
        assert_eq!(report.nvs_push, StepStatus::Skipped("netlink unavailable"));
        assert_eq!(report.regdomain_push, StepStatus::Skipped("netlink unavailable"));
    }

    #[test]
    fn failed_nvs_push_still_sets_regdomain() {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let store = MemoryStore::new().with_block(BLOCK_NPC, npc_with_mac([1, 1, 1, 1, 1, 1]));
        let mut p = Provisioner::new(no_firmware())
            .with_store(store)
            .with_hwaddr_setter(FakeHwAddr {
                calls: calls.clone(),
                fail: true,
            });
        let report = p.run(|| {
            Ok(FakeRadio {
                calls: calls.clone(),
                nvs_error: Some(-libc::ENODEV),
            })
        });
        assert!(report.hwaddr.is_failed());
        assert!(report.nvs_push.is_failed());
        assert_eq!(report.regdomain_push, StepStatus::Done);
        assert_eq!(calls.borrow().regdomain, vec![RegulatoryDomain::EU]);
    }
}
