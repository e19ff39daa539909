//! Requests for the three families this tool talks to: the netlink
//! controller (family lookup), the wl1251 driver (NVS push) and nl80211
//! (regulatory domain).

use bytes::Bytes;
use neli::consts::genl::{CtrlAttr, CtrlCmd};
use tracing::{debug, info};

use super::message::{GenlMessage, GenlRequest};
use super::session::GenlSession;
use super::socket::Transport;
use super::NetlinkError;
use crate::nvs::NvsImage;
use crate::regdomain::RegulatoryDomain;

// ─── Controller ─────────────────────────────────────────────────────────────

pub const GENL_ID_CTRL: u16 = 0x10;
pub const CTRL_VERSION: u8 = 1;

// ─── wl1251 driver family ───────────────────────────────────────────────────

pub const WL1251_FAMILY: &str = "wl1251";
pub const WL1251_CMD_PUSH_NVS: u8 = 5;
pub const WL1251_VERSION: u8 = 1;
pub const WL1251_ATTR_IFNAME: u16 = 0x01;
pub const WL1251_ATTR_NVS_BUFFER: u16 = 0x0A;
pub const WL1251_ATTR_NVS_LEN: u16 = 0x0B;

// ─── nl80211 ────────────────────────────────────────────────────────────────

pub const NL80211_FAMILY: &str = "nl80211";
pub const NL80211_CMD_REQ_SET_REG: u8 = 0x1B;
pub const NL80211_VERSION: u8 = 0;
pub const NL80211_ATTR_REG_ALPHA2: u16 = 0x21;

pub fn get_family_request(name: &str) -> Result<GenlRequest, NetlinkError> {
    let mut req = GenlRequest::new(GENL_ID_CTRL, u8::from(CtrlCmd::Getfamily), CTRL_VERSION);
    req.put_str(u16::from(CtrlAttr::FamilyName), name)?;
    Ok(req)
}

/// Decoded contents of an NVS push request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NvsPush {
    pub ifname: String,
    pub nvs: Bytes,
    pub declared_len: u32,
}

impl NvsPush {
    /// Build the push for `image`. Only the payload after the reserved
    /// prefix is sent; its length attribute is little-endian.
    pub fn request(family: u16, ifname: &str, image: &NvsImage) -> Result<GenlRequest, NetlinkError> {
        let payload = image.payload();
        let declared = u32::try_from(payload.len())
            .map_err(|_| NetlinkError::MessageTooLarge(payload.len()))?;
        let mut req = GenlRequest::new(family, WL1251_CMD_PUSH_NVS, WL1251_VERSION);
        req.put_str(WL1251_ATTR_IFNAME, ifname)?
            .put_attr(WL1251_ATTR_NVS_BUFFER, payload)?
            .put_attr(WL1251_ATTR_NVS_LEN, &declared.to_le_bytes())?;
        Ok(req)
    }

    /// Decode a push request, as the driver would see it.
    pub fn decode(msg: &GenlMessage) -> Result<Self, NetlinkError> {
        if msg.cmd != WL1251_CMD_PUSH_NVS {
            return Err(NetlinkError::Malformed("not an NVS push"));
        }
        let mut ifname = None;
        let mut nvs = None;
        let mut declared_len = None;
        for attr in &msg.attrs {
            match attr.kind {
                WL1251_ATTR_IFNAME => ifname = attr.as_str().map(str::to_string),
                WL1251_ATTR_NVS_BUFFER => nvs = Some(attr.payload.clone()),
                WL1251_ATTR_NVS_LEN => {
                    declared_len = attr
                        .payload
                        .get(..4)
                        .and_then(|b| b.try_into().ok())
                        .map(u32::from_le_bytes)
                }
                _ => {}
            }
        }
        Ok(Self {
            ifname: ifname.ok_or(NetlinkError::Malformed("missing ifname"))?,
            nvs: nvs.ok_or(NetlinkError::Malformed("missing NVS buffer"))?,
            declared_len: declared_len.ok_or(NetlinkError::Malformed("missing NVS length"))?,
        })
    }
}

pub fn set_regdomain_request(family: u16, domain: RegulatoryDomain) -> Result<GenlRequest, NetlinkError> {
    let mut req = GenlRequest::new(family, NL80211_CMD_REQ_SET_REG, NL80211_VERSION);
    req.put_attr(NL80211_ATTR_REG_ALPHA2, domain.as_bytes())?;
    Ok(req)
}

impl<T: Transport> GenlSession<T> {
    /// Look up a family id by name through the controller.
    pub fn resolve_family(&mut self, name: &str) -> Result<u16, NetlinkError> {
        let replies = match self.transact(&get_family_request(name)?) {
            Ok(replies) => replies,
            Err(NetlinkError::Kernel { code }) => {
                return Err(NetlinkError::FamilyNotFound {
                    name: name.to_string(),
                    code,
                })
            }
            Err(e) => return Err(e),
        };
        let family_id = u16::from(CtrlAttr::FamilyId);
        for msg in &replies {
            if let Some(id) = msg.attr(family_id).and_then(|a| a.as_u16()) {
                debug!(family = name, id, "generic netlink family resolved");
                return Ok(id);
            }
        }
        Err(NetlinkError::Malformed("family reply without id"))
    }

    /// Push an NVS image into the wl1251 driver bound to `ifname`.
    pub fn push_nvs(&mut self, ifname: &str, image: &NvsImage) -> Result<(), NetlinkError> {
        let family = self.resolve_family(WL1251_FAMILY)?;
        let request = NvsPush::request(family, ifname, image)?;
        self.transact(&request)?;
        info!(interface = %ifname, len = image.payload().len(), "NVS pushed");
        Ok(())
    }

    /// Ask the regulatory core to switch to `domain`.
    pub fn set_regdomain(&mut self, domain: RegulatoryDomain) -> Result<(), NetlinkError> {
        let family = self.resolve_family(NL80211_FAMILY)?;
        self.transact(&set_regdomain_request(family, domain)?)?;
        info!(%domain, "regulatory domain requested");
        Ok(())
    }
}
