//! `NETLINK_GENERIC` socket.

use std::io;
use std::os::fd::AsRawFd;
use std::time::Duration;

use neli::consts::socket::NlFamily;
use neli::socket::NlSocket;
use tracing::debug;

/// Datagram transport underneath a [`GenlSession`](super::GenlSession).
pub trait Transport {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()>;

    /// Receive one datagram into `buf`, returning its length.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Port id the kernel assigned to this end.
    fn port(&self) -> u32;
}

/// A bound generic netlink socket. Closed on drop.
pub struct NetlinkSocket {
    socket: NlSocket,
    port: u32,
}

impl NetlinkSocket {
    /// Open and bind a socket, letting the kernel pick the port id.
    pub fn connect() -> io::Result<Self> {
        let socket = NlSocket::connect(NlFamily::Generic, None, &[])?;
        let port = socket.pid()?;
        debug!(port, "netlink socket bound");
        Ok(Self { socket, port })
    }

    /// Bound every receive with `SO_RCVTIMEO`; `None` blocks forever.
    pub fn set_recv_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        let timeout = timeout.unwrap_or_default();
        let tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };
        let ret = unsafe {
            libc::setsockopt(
                self.socket.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_RCVTIMEO,
                &tv as *const libc::timeval as *const libc::c_void,
                std::mem::size_of::<libc::timeval>() as libc::socklen_t,
            )
        };
        if ret != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Transport for NetlinkSocket {
    fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
        loop {
            match self.socket.send(datagram, 0) {
                Ok(_) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.socket.recv(&mut *buf, 0) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn port(&self) -> u32 {
        self.port
    }
}
