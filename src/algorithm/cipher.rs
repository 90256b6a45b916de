//! The negotiable encryption algorithms.

use strum::{AsRefStr, EnumString};

use crate::{
    crypto::aes::Aes128Ctr,
    packet::trans::KexInit,
    Error, Result,
};

use super::negotiate;

/// SSH cipher algorithms.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Cipher {
    /// AES-128 in counter (CTR) mode.
    Aes128Ctr,

    /// No cipher algorithm.
    #[default]
    None,
}

/// Select the cipher for each direction, requiring our single offering to
/// appear in the client's list.
pub fn negotiate_pair(clientkex: &KexInit, serverkex: &KexInit) -> Result<(Cipher, Cipher)> {
    Ok((
        negotiate(
            &clientkex.encryption_algorithms_client_to_server,
            &serverkex.encryption_algorithms_client_to_server,
        )
        .ok_or(Error::NoCommonCipher)?
        .parse()
        .map_err(|_| Error::NoCommonCipher)?,
        negotiate(
            &clientkex.encryption_algorithms_server_to_client,
            &serverkex.encryption_algorithms_server_to_client,
        )
        .ok_or(Error::NoCommonCipher)?
        .parse()
        .map_err(|_| Error::NoCommonCipher)?,
    ))
}

impl Cipher {
    /// Build the streaming state for this cipher, once per direction.
    ///
    /// The state is what enforces keystream continuity: it is created at the
    /// NEWKEYS transition and mutated in place for every record thereafter.
    pub(crate) fn state(&self, key: &[u8], iv: &[u8]) -> Result<Option<Aes128Ctr>> {
        match self {
            Self::Aes128Ctr => {
                let key = key.try_into().map_err(|_| Error::KexError)?;
                let iv = iv.try_into().map_err(|_| Error::KexError)?;

                Ok(Some(Aes128Ctr::new(key, iv)))
            }
            Self::None => Ok(None),
        }
    }

    /// The cipher's block size, which the record layer aligns records to.
    /// The protocol floor of 8 applies when no cipher is active.
    pub(crate) fn block_size(&self) -> usize {
        match self {
            Self::Aes128Ctr => 16,
            Self::None => 8,
        }
    }

    pub(crate) fn key_size(&self) -> usize {
        match self {
            Self::Aes128Ctr => 16,
            Self::None => 0,
        }
    }

    pub(crate) fn iv_size(&self) -> usize {
        match self {
            Self::Aes128Ctr => 16,
            Self::None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_serializes_to_the_wire_name() {
        assert_eq!(Cipher::Aes128Ctr.as_ref(), "aes128-ctr");
        assert_eq!("aes128-ctr".parse(), Ok(Cipher::Aes128Ctr));
    }
}
