//! wl1251 calibration agent
//!
//! One-shot boot task for devices with a TI wl1251 radio.
//!
//! - Reads factory calibration blocks (identity, certification, NVS)
//! - Sets the interface MAC address from the identity block
//! - Resolves the regulatory domain (operator override, modem country, FCC flag)
//! - Pushes the assembled NVS image and the domain to the kernel over generic netlink
//! - In `--dry-run` mode, only logs what it would do

mod config;
mod country;
mod hwaddr;
mod operator;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wlcal_core::cal::CalBlockDir;
use wlcal_core::netlink::{GenlSession, NetlinkSocket};
use wlcal_core::provision::{ProvisionConfig, ProvisionPlan, ProvisionReport, Provisioner};

use crate::config::{AgentConfig, DEFAULT_CONFIG_PATH};

/// wl1251 calibration provisioning.
#[derive(Parser, Debug)]
#[command(name = "wlcal-agent", about = "wl1251 calibration and regulatory provisioning")]
struct Cli {
    /// Configuration file (TOML). Missing means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Wireless interface override.
    #[arg(long)]
    interface: Option<String>,

    /// Calibration block directory override.
    #[arg(long)]
    cal_dir: Option<PathBuf>,

    /// Decode and resolve only; do not touch the interface or the driver.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Debug logging unless RUST_LOG says otherwise.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut cfg = AgentConfig::load_or_default(&cli.config);
    if let Some(interface) = cli.interface {
        override_interface(&mut cfg, interface);
    }
    if let Some(dir) = cli.cal_dir {
        cfg.block_dir = dir;
    }

    tracing::info!(
        config_version = cfg.version,
        interface = %cfg.interface,
        block_dir = %cfg.block_dir.display(),
        dry_run = cli.dry_run,
        "wlcal-agent starting"
    );

    let mut provisioner = Provisioner::new(ProvisionConfig {
        interface: cfg.interface.clone(),
        firmware_paths: cfg.firmware_paths.clone(),
    })
    .with_regdomain_override(operator::OverrideFile::new(
        &cfg.regulatory.override_file,
        &cfg.regulatory.override_key,
    ));

    match CalBlockDir::open(&cfg.block_dir) {
        Ok(store) => provisioner = provisioner.with_store(store),
        Err(e) => tracing::warn!(
            block_dir = %cfg.block_dir.display(),
            error = %e,
            "calibration store unavailable, continuing without calibration data"
        ),
    }
    if cfg.regulatory.modem_query {
        provisioner = provisioner
            .with_country_source(country::MmcliCountry::new(country::MmcliObject::Modem))
            .with_country_source(country::MmcliCountry::new(country::MmcliObject::Sim));
    }

    if cli.dry_run {
        log_plan(&provisioner.plan());
        tracing::info!("dry run, interface and driver left untouched");
        return Ok(ExitCode::SUCCESS);
    }

    let ack_timeout = cfg.ack_timeout;
    let report = provisioner
        .with_hwaddr_setter(hwaddr::IoctlHwAddr)
        .run(|| GenlSession::<NetlinkSocket>::connect(ack_timeout));
    log_report(&report);

    let status = exit_status(&cfg, &report);
    if status != 0 {
        tracing::error!("hardware address assignment failed in strict mode");
    } else {
        tracing::info!("wlcal-agent finished");
    }
    Ok(ExitCode::from(status))
}

/// Apply `--interface`, subject to the same check as the config file.
fn override_interface(cfg: &mut AgentConfig, interface: String) {
    match config::validate_interface(&interface) {
        Ok(()) => cfg.interface = interface,
        Err(e) => tracing::error!(
            error = %e,
            interface = %cfg.interface,
            "ignoring --interface, keeping configured interface"
        ),
    }
}

/// Process status for a finished run. Only a failed hardware-address
/// assignment under `hwaddr.strict` is fatal; netlink failures never are.
fn exit_status(cfg: &AgentConfig, report: &ProvisionReport) -> u8 {
    if cfg.hwaddr_strict && report.hwaddr.is_failed() {
        1
    } else {
        0
    }
}

fn log_plan(plan: &ProvisionPlan) {
    tracing::info!(
        mac = %plan.mac,
        fcc = plan.fcc,
        country_code = plan.country_code,
        domain = %plan.domain,
        domain_source = %plan.domain_source,
        nvs_source = %plan.nvs.source(),
        nvs_len = plan.nvs.len(),
        patched = plan.nvs.is_patched(),
        "provisioning plan"
    );
}

fn log_report(report: &ProvisionReport) {
    log_plan(&report.plan);
    tracing::info!(
        hwaddr = %report.hwaddr,
        nvs_push = %report.nvs_push,
        regdomain_push = %report.regdomain_push,
        "provisioning report"
    );
}
