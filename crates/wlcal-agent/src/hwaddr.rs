//! Interface hardware address assignment via `SIOCSIFHWADDR`.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use wlcal_core::provision::HwAddrSetter;
use wlcal_core::MacAddress;

/// Copy `ifname` into a NUL-terminated `ifr_name`.
fn ifr_name(ifname: &str) -> io::Result<[libc::c_char; libc::IFNAMSIZ]> {
    let bytes = ifname.as_bytes();
    if bytes.is_empty() || bytes.len() >= libc::IFNAMSIZ || bytes.contains(&0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid interface name {ifname:?}"),
        ));
    }
    let mut name = [0 as libc::c_char; libc::IFNAMSIZ];
    for (dst, &src) in name.iter_mut().zip(bytes) {
        *dst = src as libc::c_char;
    }
    Ok(name)
}

fn hwaddr_request(ifname: &str, mac: MacAddress) -> io::Result<libc::ifreq> {
    // SAFETY: all-zero is a valid `ifreq`.
    let mut req: libc::ifreq = unsafe { std::mem::zeroed() };
    req.ifr_name = ifr_name(ifname)?;

    let mut hwaddr: libc::sockaddr = unsafe { std::mem::zeroed() };
    hwaddr.sa_family = libc::ARPHRD_ETHER as libc::sa_family_t;
    for (dst, src) in hwaddr.sa_data.iter_mut().zip(mac.octets()) {
        *dst = src as libc::c_char;
    }
    req.ifr_ifru.ifru_hwaddr = hwaddr;
    Ok(req)
}

/// Sets the address through an `AF_INET` datagram socket opened per call.
#[derive(Debug, Default)]
pub struct IoctlHwAddr;

impl HwAddrSetter for IoctlHwAddr {
    fn set_hw_addr(&mut self, ifname: &str, mac: MacAddress) -> io::Result<()> {
        let mut req = hwaddr_request(ifname, mac)?;

        let raw =
            unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM | libc::SOCK_CLOEXEC, 0) };
        if raw < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let ret = unsafe {
            libc::ioctl(
                fd.as_raw_fd(),
                libc::SIOCSIFHWADDR as _,
                &mut req as *mut libc::ifreq,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        tracing::debug!(interface = %ifname, %mac, "SIOCSIFHWADDR accepted");
        Ok(())
    }
}
