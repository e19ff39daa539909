//! # Generic netlink session
//!
//! ```text
//!   connect ──▶ Connected ──send──▶ AwaitingAck ──Acked/Finished──▶ Connected
//!                   │                    │
//!                   │                 Errored ──────────────────▶ Connected
//!                 close ──▶ Closed
//! ```
//!
//! A session carries any number of sequential exchanges. A failed exchange
//! returns the session to `Connected` so the next one can still run.

use std::time::Duration;

use tracing::{debug, trace};

use super::socket::{NetlinkSocket, Transport};
use super::message::{parse_datagram, GenlMessage, GenlRequest, NlMessage};
use super::NetlinkError;

/// Receive buffer size, large enough for any reply we expect.
const RECV_BUF_LEN: usize = 32 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    AwaitingAck,
    Closed,
}

/// What one received datagram means for the outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvOutcome {
    /// `NLMSG_ERROR` with code 0.
    Acked,
    /// `NLMSG_ERROR` with a negative errno.
    Errored(i32),
    /// `NLMSG_DONE`.
    Finished,
    /// Data or unrelated traffic; keep receiving.
    MoreExpected,
}

impl RecvOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecvOutcome::MoreExpected)
    }
}

pub struct GenlSession<T: Transport = NetlinkSocket> {
    transport: T,
    seq: u32,
    state: SessionState,
    buf: Vec<u8>,
}

impl GenlSession<NetlinkSocket> {
    /// Open a generic netlink socket. `recv_timeout` bounds every wait for
    /// a reply; `None` waits indefinitely.
    pub fn connect(recv_timeout: Option<Duration>) -> Result<Self, NetlinkError> {
        let socket = NetlinkSocket::connect()?;
        if recv_timeout.is_some() {
            socket.set_recv_timeout(recv_timeout)?;
        }
        Ok(Self::new(socket))
    }
}

impl<T: Transport> GenlSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            seq: 0,
            state: SessionState::Connected,
            buf: vec![0u8; RECV_BUF_LEN],
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Complete and send a request. Returns its sequence number.
    pub fn send(&mut self, request: &GenlRequest) -> Result<u32, NetlinkError> {
        if self.state == SessionState::Closed {
            return Err(NetlinkError::Closed);
        }
        self.seq = self.seq.wrapping_add(1);
        let seq = self.seq;
        let msg = request.finish(seq, self.transport.port())?;
        self.transport.send(&msg)?;
        self.state = SessionState::AwaitingAck;
        trace!(family = request.family(), cmd = request.cmd(), seq, len = msg.len(), "netlink request sent");
        Ok(seq)
    }

    /// Receive one datagram and classify it against request `seq`.
    ///
    /// Family payloads addressed to `seq` are returned alongside the outcome.
    pub fn recv_step(&mut self, seq: u32) -> Result<(RecvOutcome, Vec<GenlMessage>), NetlinkError> {
        let n = match self.transport.recv(&mut self.buf) {
            Ok(n) => n,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                return Err(NetlinkError::Timeout)
            }
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            return Err(NetlinkError::Malformed("empty datagram"));
        }

        let mut data = Vec::new();
        for msg in parse_datagram(&self.buf[..n])? {
            if msg.seq() != seq {
                trace!(expected = seq, got = msg.seq(), "ignoring unrelated netlink message");
                continue;
            }
            let outcome = match msg {
                NlMessage::Error { code: 0, .. } => RecvOutcome::Acked,
                NlMessage::Error { code, .. } => RecvOutcome::Errored(code),
                NlMessage::Done { .. } => RecvOutcome::Finished,
                NlMessage::Control { .. } => continue,
                NlMessage::Genl(m) => {
                    data.push(m);
                    continue;
                }
            };
            return Ok((outcome, data));
        }
        Ok((RecvOutcome::MoreExpected, data))
    }

    /// Send a request and block until it reaches a terminal outcome.
    ///
    /// Returns the family payloads received along the way.
    pub fn transact(&mut self, request: &GenlRequest) -> Result<Vec<GenlMessage>, NetlinkError> {
        let result = self.exchange(request);
        if self.state != SessionState::Closed {
            self.state = SessionState::Connected;
        }
        result
    }

    fn exchange(&mut self, request: &GenlRequest) -> Result<Vec<GenlMessage>, NetlinkError> {
        let seq = self.send(request)?;
        let mut replies = Vec::new();
        loop {
            let (outcome, data) = self.recv_step(seq)?;
            replies.extend(data);
            match outcome {
                RecvOutcome::Acked | RecvOutcome::Finished => {
                    debug!(seq, ?outcome, "netlink request complete");
                    return Ok(replies);
                }
                RecvOutcome::Errored(code) => return Err(NetlinkError::Kernel { code }),
                RecvOutcome::MoreExpected => {}
            }
        }
    }

    /// Release the session. The socket closes when the transport drops.
    pub fn close(mut self) {
        self.state = SessionState::Closed;
    }
}

impl<T: Transport> Drop for GenlSession<T> {
    fn drop(&mut self) {
        debug!(requests = self.seq, "netlink session closed");
    }
}
