//! Mobile country code from ModemManager.
//!
//! `mmcli --output-keyvalue` prints one `key : value` pair per line; the
//! operator code's first three digits are the MCC.

use std::process::Command;

use wlcal_core::provision::CountryCodeSource;
use wlcal_core::regdomain::mcc_from_operator_code;

pub const MODEM_OPERATOR_KEY: &str = "modem.3gpp.operator-code";
pub const SIM_OPERATOR_KEY: &str = "sim.properties.operator-code";

/// Value for `key` in `mmcli` key-value output. `--` means unset.
pub fn keyvalue<'a>(output: &'a str, key: &str) -> Option<&'a str> {
    output.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        if k.trim() != key {
            return None;
        }
        let v = v.trim();
        (!v.is_empty() && v != "--").then_some(v)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmcliObject {
    /// Registered network of the first modem.
    Modem,
    /// SIM card of the first modem.
    Sim,
}

impl MmcliObject {
    fn args(self) -> [&'static str; 3] {
        match self {
            MmcliObject::Modem => ["--modem=any", "--output-keyvalue", "--timeout=5"],
            MmcliObject::Sim => ["--sim=any", "--output-keyvalue", "--timeout=5"],
        }
    }

    fn key(self) -> &'static str {
        match self {
            MmcliObject::Modem => MODEM_OPERATOR_KEY,
            MmcliObject::Sim => SIM_OPERATOR_KEY,
        }
    }
}

pub struct MmcliCountry {
    object: MmcliObject,
    program: String,
}

impl MmcliCountry {
    pub fn new(object: MmcliObject) -> Self {
        Self {
            object,
            program: "mmcli".into(),
        }
    }

    fn query(&self) -> Option<String> {
        let output = match Command::new(&self.program).args(self.object.args()).output() {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(program = %self.program, error = %e, "mmcli not available");
                return None;
            }
        };
        if !output.status.success() {
            tracing::debug!(
                program = %self.program,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "mmcli query failed"
            );
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl CountryCodeSource for MmcliCountry {
    fn name(&self) -> &str {
        match self.object {
            MmcliObject::Modem => "modem",
            MmcliObject::Sim => "sim",
        }
    }

    fn country_code(&mut self) -> Option<u32> {
        let output = self.query()?;
        let code = keyvalue(&output, self.object.key())?;
        tracing::debug!(source = self.name(), operator_code = code, "operator code");
        mcc_from_operator_code(code)
    }
}
