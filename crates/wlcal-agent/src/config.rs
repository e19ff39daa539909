use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use wlcal_core::nvs::DEFAULT_FIRMWARE_PATHS;

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_CONFIG_PATH: &str = "/etc/wlcal.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentConfigInput {
    pub version: u32,
    pub interface: Option<String>,
    pub calibration: CalibrationConfigInput,
    pub nvs: NvsConfigInput,
    pub regulatory: RegulatoryConfigInput,
    pub netlink: NetlinkConfigInput,
    pub hwaddr: HwAddrConfigInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalibrationConfigInput {
    pub block_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NvsConfigInput {
    pub firmware_paths: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegulatoryConfigInput {
    pub override_file: Option<PathBuf>,
    pub override_key: Option<String>,
    pub modem_query: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetlinkConfigInput {
    pub ack_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HwAddrConfigInput {
    pub strict: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct RegulatoryConfig {
    pub override_file: PathBuf,
    pub override_key: String,
    pub modem_query: bool,
}

impl Default for RegulatoryConfig {
    fn default() -> Self {
        Self {
            override_file: PathBuf::from("/etc/default/wlan-regdomain"),
            override_key: "REGDOMAIN".into(),
            modem_query: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub version: u32,
    pub interface: String,
    pub block_dir: PathBuf,
    pub firmware_paths: Vec<PathBuf>,
    pub regulatory: RegulatoryConfig,
    /// `None` waits for netlink replies indefinitely.
    pub ack_timeout: Option<Duration>,
    /// Treat a failed hardware-address assignment as fatal.
    pub hwaddr_strict: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            interface: "wlan0".into(),
            block_dir: PathBuf::from("/var/lib/wlcal/blocks"),
            firmware_paths: DEFAULT_FIRMWARE_PATHS.iter().map(PathBuf::from).collect(),
            regulatory: RegulatoryConfig::default(),
            ack_timeout: None,
            hwaddr_strict: false,
        }
    }
}

/// Reject names the kernel would truncate in `ifreq`.
pub fn validate_interface(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Interface name is empty".into());
    }
    if name.len() >= libc::IFNAMSIZ {
        return Err(format!("Interface name {:?} is too long", name));
    }
    Ok(())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl AgentConfigInput {
    pub fn resolve(self) -> Result<AgentConfig, String> {
        let version = if self.version == 0 {
            CONFIG_VERSION
        } else {
            self.version
        };
        if version != CONFIG_VERSION {
            return Err(format!("Unsupported config version {}", version));
        }

        let defaults = AgentConfig::default();

        let interface = non_empty(self.interface).unwrap_or(defaults.interface);
        validate_interface(&interface)?;

        let firmware_paths = match self.nvs.firmware_paths {
            Some(paths) => paths
                .into_iter()
                .filter(|p| !p.as_os_str().is_empty())
                .collect(),
            None => defaults.firmware_paths,
        };

        let override_key = non_empty(self.regulatory.override_key)
            .unwrap_or(defaults.regulatory.override_key);
        if override_key.contains('=') || override_key.contains(char::is_whitespace) {
            return Err(format!("Invalid override key {:?}", override_key));
        }

        let ack_timeout = match self.netlink.ack_timeout_ms {
            Some(0) => return Err("netlink.ack_timeout_ms must be positive".into()),
            other => other.map(Duration::from_millis),
        };

        Ok(AgentConfig {
            version,
            interface,
            block_dir: self.calibration.block_dir.unwrap_or(defaults.block_dir),
            firmware_paths,
            regulatory: RegulatoryConfig {
                override_file: self
                    .regulatory
                    .override_file
                    .unwrap_or(defaults.regulatory.override_file),
                override_key,
                modem_query: self
                    .regulatory
                    .modem_query
                    .unwrap_or(defaults.regulatory.modem_query),
            },
            ack_timeout,
            hwaddr_strict: self.hwaddr.strict.unwrap_or(defaults.hwaddr_strict),
        })
    }
}

impl AgentConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, String> {
        if input.trim().is_empty() {
            return Ok(AgentConfig::default());
        }
        let parsed: AgentConfigInput =
            toml::from_str(input).map_err(|e| format!("Invalid config TOML: {}", e))?;
        parsed.resolve()
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                return Ok(AgentConfig::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading config {}", path.display()))
            }
        };
        Self::from_toml_str(&text)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    /// Like [`AgentConfig::load`], but an unreadable or invalid file is
    /// logged and replaced by the defaults so provisioning still runs.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %format!("{e:#}"), "config rejected, using defaults");
                AgentConfig::default()
            }
        }
    }
}
