//! The negotiable message authentication algorithms.

use strum::{AsRefStr, EnumString};

use crate::{
    crypto::hmac::HmacSha256,
    packet::trans::KexInit,
    Error, Result,
};

use super::negotiate;

/// SSH hmac algorithms.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Hmac {
    /// HMAC with sha-2-256 digest.
    #[strum(serialize = "hmac-sha2-256")]
    HmacSha256,

    /// No HMAC algorithm.
    #[default]
    None,
}

/// Select the MAC for each direction, requiring our single offering to
/// appear in the client's list.
pub fn negotiate_pair(clientkex: &KexInit, serverkex: &KexInit) -> Result<(Hmac, Hmac)> {
    Ok((
        negotiate(
            &clientkex.mac_algorithms_client_to_server,
            &serverkex.mac_algorithms_client_to_server,
        )
        .ok_or(Error::NoCommonHmac)?
        .parse()
        .map_err(|_| Error::NoCommonHmac)?,
        negotiate(
            &clientkex.mac_algorithms_server_to_client,
            &serverkex.mac_algorithms_server_to_client,
        )
        .ok_or(Error::NoCommonHmac)?
        .parse()
        .map_err(|_| Error::NoCommonHmac)?,
    ))
}

impl Hmac {
    /// Authenticate `buf` under `key`, bound to the record sequence number.
    pub(crate) fn sign(&self, seq: u32, buf: &[u8], key: &[u8]) -> Vec<u8> {
        match self {
            Self::HmacSha256 => HmacSha256::new(key)
                .chain(seq.to_be_bytes())
                .chain(buf)
                .finalize()
                .to_vec(),
            Self::None => Vec::new(),
        }
    }

    /// Recompute the code for `buf` and compare it to `mac` in constant
    /// time.
    pub(crate) fn verify(&self, seq: u32, buf: &[u8], key: &[u8], mac: &[u8]) -> Result<()> {
        match self {
            Self::HmacSha256 => HmacSha256::new(key)
                .chain(seq.to_be_bytes())
                .chain(buf)
                .verify(mac)
                .then_some(())
                .ok_or(Error::Mac),
            Self::None => Ok(()),
        }
    }

    /// The length of the codes this algorithm emits.
    pub(crate) fn size(&self) -> usize {
        match self {
            Self::HmacSha256 => 32,
            Self::None => 0,
        }
    }
}
