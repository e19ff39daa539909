//! Generic netlink plumbing.
//!
//! ```text
//!   GenlSession ──resolve_family──▶ control family (0x10)
//!        │
//!        ├── push_nvs ──────────▶ "wl1251"  (driver private family)
//!        └── set_regdomain ─────▶ "nl80211" (regulatory request)
//!        │
//!   Transport (neli `NlSocket` in production, scripted peer in tests)
//! ```
//!
//! Each request is sent with `NLM_F_ACK` and the session blocks until the
//! kernel acknowledges it, reports an error, or finishes a multipart reply.

pub mod families;
pub mod message;
pub mod session;
pub mod socket;

use std::io;

use thiserror::Error;

pub use families::{NvsPush, NL80211_FAMILY, WL1251_FAMILY};
pub use session::{GenlSession, RecvOutcome, SessionState};
pub use socket::{NetlinkSocket, Transport};

#[derive(Debug, Error)]
pub enum NetlinkError {
    #[error("netlink socket error: {0}")]
    Io(#[from] io::Error),
    #[error("timed out waiting for netlink reply")]
    Timeout,
    #[error("generic netlink family {name:?} not found (errno {code})")]
    FamilyNotFound { name: String, code: i32 },
    #[error("attribute {kind} payload of {len} bytes exceeds netlink limit")]
    AttributeTooLarge { kind: u16, len: usize },
    #[error("message of {0} bytes exceeds netlink limit")]
    MessageTooLarge(usize),
    #[error("kernel rejected request: {}", io::Error::from_raw_os_error(.code.wrapping_neg()))]
    Kernel { code: i32 },
    #[error("cannot encode netlink message: {0}")]
    Encode(String),
    #[error("cannot decode netlink message: {0}")]
    Decode(String),
    #[error("malformed netlink message: {0}")]
    Malformed(&'static str),
    #[error("session is closed")]
    Closed,
}
