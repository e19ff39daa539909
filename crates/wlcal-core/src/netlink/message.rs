//! # Generic netlink messages
//!
//! ```text
//! Nlmsghdr<u16, Genlmsghdr<u8, u16>>
//! +----------+------+-------+-----+------+---------------------------+
//! | len      | type | flags | seq | port | cmd | version | attrs ... |
//! +----------+------+-------+-----+------+---------------------------+
//! ```
//!
//! Requests are kept as plain attribute lists until they are sent, then
//! serialized through neli's `Nlattr`/`Genlmsghdr`/`Nlmsghdr`. Replies are
//! parsed with neli and copied into owned [`GenlMessage`]s so they outlive
//! the receive buffer.

use std::io::Cursor;

use bytes::Bytes;
use neli::consts::nl::{NlmF, NlmFFlags};
use neli::genl::{Genlmsghdr, Nlattr};
use neli::nl::{NlPayload, Nlmsghdr};
use neli::types::{Buffer, GenlBuffer};
use neli::{FromBytes, ToBytes};

use super::NetlinkError;

pub const NLMSG_HDRLEN: usize = 16;
pub const NLMSG_DONE: u16 = 3;
/// Types below this are netlink control messages, not families.
pub const NLMSG_MIN_TYPE: u16 = 0x10;
/// Largest payload an attribute length can describe.
pub const NLA_MAX_PAYLOAD: usize = u16::MAX as usize - 4;

type GenlHeader = Genlmsghdr<u8, u16>;
type NlHeader = Nlmsghdr<u16, GenlHeader>;

/// Round up to the 4-byte netlink alignment.
#[inline]
pub const fn align(len: usize) -> usize {
    (len + 3) & !3
}

/// One attribute, owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub kind: u16,
    pub payload: Bytes,
}

impl Attr {
    pub fn as_u16(&self) -> Option<u16> {
        let b: [u8; 2] = self.payload.get(..2)?.try_into().ok()?;
        Some(u16::from_ne_bytes(b))
    }

    /// String payload with the trailing NUL (if any) removed.
    pub fn as_str(&self) -> Option<&str> {
        let bytes = match self.payload.split_last() {
            Some((&0, rest)) => rest,
            _ => &self.payload[..],
        };
        std::str::from_utf8(bytes).ok()
    }
}

/// A request to a generic netlink family, always sent with `NLM_F_ACK`.
#[derive(Debug, Clone)]
pub struct GenlRequest {
    family: u16,
    cmd: u8,
    version: u8,
    attrs: Vec<Attr>,
}

impl GenlRequest {
    pub fn new(family: u16, cmd: u8, version: u8) -> Self {
        Self {
            family,
            cmd,
            version,
            attrs: Vec::new(),
        }
    }

    pub fn family(&self) -> u16 {
        self.family
    }

    pub fn cmd(&self) -> u8 {
        self.cmd
    }

    pub fn put_attr(&mut self, kind: u16, payload: &[u8]) -> Result<&mut Self, NetlinkError> {
        if payload.len() > NLA_MAX_PAYLOAD {
            return Err(NetlinkError::AttributeTooLarge {
                kind,
                len: payload.len(),
            });
        }
        self.attrs.push(Attr {
            kind,
            payload: Bytes::copy_from_slice(payload),
        });
        Ok(self)
    }

    /// NUL-terminated string attribute.
    pub fn put_str(&mut self, kind: u16, value: &str) -> Result<&mut Self, NetlinkError> {
        let mut payload = Vec::with_capacity(value.len() + 1);
        payload.extend_from_slice(value.as_bytes());
        payload.push(0);
        self.put_attr(kind, &payload)
    }

    /// Serialize with the given sequence number and port id.
    pub fn finish(&self, seq: u32, port: u32) -> Result<Bytes, NetlinkError> {
        let mut attrs = GenlBuffer::new();
        for attr in &self.attrs {
            attrs.push(
                Nlattr::new(false, false, attr.kind, Buffer::from(attr.payload.to_vec()))
                    .map_err(|e| NetlinkError::Encode(e.to_string()))?,
            );
        }
        let genl: GenlHeader = Genlmsghdr::new(self.cmd, self.version, attrs);
        let msg = Nlmsghdr::new(
            None,
            self.family,
            NlmFFlags::new(&[NlmF::Request, NlmF::Ack]),
            Some(seq),
            Some(port),
            NlPayload::Payload(genl),
        );

        let mut buf = Cursor::new(Vec::new());
        msg.to_bytes(&mut buf)
            .map_err(|e| NetlinkError::Encode(e.to_string()))?;
        Ok(Bytes::from(buf.into_inner()))
    }
}

/// A decoded generic netlink message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenlMessage {
    pub family: u16,
    pub seq: u32,
    pub port: u32,
    pub cmd: u8,
    pub version: u8,
    pub attrs: Vec<Attr>,
}

impl GenlMessage {
    fn from_neli(msg: &NlHeader, genl: &GenlHeader) -> Self {
        let attrs = genl
            .get_attr_handle()
            .iter()
            .map(|attr| Attr {
                kind: attr.nla_type.nla_type,
                payload: Bytes::copy_from_slice(attr.nla_payload.as_ref()),
            })
            .collect();
        Self {
            family: msg.nl_type,
            seq: msg.nl_seq,
            port: msg.nl_pid,
            cmd: genl.cmd,
            version: genl.version,
            attrs,
        }
    }

    /// First attribute of type `kind`.
    pub fn attr(&self, kind: u16) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.kind == kind)
    }
}

/// One message out of a received datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NlMessage {
    /// `NLMSG_ERROR`; code 0 is an acknowledgement.
    Error { seq: u32, code: i32 },
    Done { seq: u32 },
    /// `NLMSG_NOOP`, `NLMSG_OVERRUN` and other reserved types.
    Control { seq: u32, kind: u16 },
    Genl(GenlMessage),
}

impl NlMessage {
    pub fn seq(&self) -> u32 {
        match self {
            NlMessage::Error { seq, .. }
            | NlMessage::Done { seq }
            | NlMessage::Control { seq, .. } => *seq,
            NlMessage::Genl(msg) => msg.seq,
        }
    }

    fn from_neli(msg: NlHeader) -> Self {
        let seq = msg.nl_seq;
        if msg.nl_type == NLMSG_DONE {
            return NlMessage::Done { seq };
        }
        match &msg.nl_payload {
            NlPayload::Ack(ack) => NlMessage::Error {
                seq,
                code: ack.error,
            },
            NlPayload::Err(err) => NlMessage::Error {
                seq,
                code: err.error,
            },
            NlPayload::Payload(genl) if msg.nl_type >= NLMSG_MIN_TYPE => {
                NlMessage::Genl(GenlMessage::from_neli(&msg, genl))
            }
            _ => NlMessage::Control {
                seq,
                kind: msg.nl_type,
            },
        }
    }
}

/// Split a datagram into its messages.
///
/// Each message's length is checked against the datagram before neli
/// sees it, so a lying header cannot run past the buffer.
pub fn parse_datagram(datagram: &[u8]) -> Result<Vec<NlMessage>, NetlinkError> {
    let mut out = Vec::new();
    let mut rest = datagram;

    while !rest.is_empty() {
        let len = match rest.get(..4) {
            Some(b) => u32::from_ne_bytes([b[0], b[1], b[2], b[3]]) as usize,
            None => return Err(NetlinkError::Malformed("truncated message header")),
        };
        if len < NLMSG_HDRLEN || len > rest.len() {
            return Err(NetlinkError::Malformed("message length out of range"));
        }
        let msg = NlHeader::from_bytes(&mut Cursor::new(&rest[..len]))
            .map_err(|e| NetlinkError::Decode(e.to_string()))?;
        out.push(NlMessage::from_neli(msg));

        rest = &rest[align(len).min(rest.len())..];
    }
    Ok(out)
}

/// Parse a single generic netlink message, e.g. one we built ourselves.
pub fn parse_genl(buf: &[u8]) -> Result<GenlMessage, NetlinkError> {
    match parse_datagram(buf)?.into_iter().next() {
        Some(NlMessage::Genl(msg)) => Ok(msg),
        _ => Err(NetlinkError::Malformed("not a generic netlink message")),
    }
}
