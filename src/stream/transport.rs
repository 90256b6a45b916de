//! Per-direction transport state: cipher, MAC and padding.

use rand::Rng;

use crate::{
    algorithm::{Cipher, Hmac},
    crypto::aes::Aes128Ctr,
    Result,
};

use super::Keys;

/// The pair of directional transports of a connection.
#[derive(Default)]
pub struct TransportPair {
    /// Our sending direction.
    pub tx: Transport,

    /// Our receiving direction.
    pub rx: Transport,
}

/// One direction's algorithms, keys and running cipher state.
///
/// The cipher state is created lazily from the derived keys on first use and
/// never replaced afterwards: the AES-CTR counter must run uninterrupted
/// across records for as long as the keys are in service.
#[derive(Default)]
pub struct Transport {
    /// The negotiated cipher.
    pub cipher: Cipher,

    /// The negotiated MAC.
    pub hmac: Hmac,

    /// The derived key material for this direction.
    pub chain: Keys,

    state: Option<Aes128Ctr>,
}

impl Transport {
    /// Assemble a direction from its negotiated algorithms and keys.
    pub fn new(cipher: Cipher, hmac: Hmac, chain: Keys) -> Self {
        Self {
            cipher,
            hmac,
            chain,
            state: None,
        }
    }

    /// The block size records are padded to.
    pub fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    /// The MAC length that trails each record.
    pub fn mac_size(&self) -> usize {
        self.hmac.size()
    }

    /// Encrypt a buffer in place, continuing this direction's keystream.
    pub fn encrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.cipher != Cipher::None {
            if self.state.is_none() {
                self.state = self.cipher.state(&self.chain.key, &self.chain.iv)?;
            }
            if let Some(state) = &mut self.state {
                state.apply_keystream(buf);
            }
        }

        Ok(())
    }

    /// Decrypt a buffer in place; identical to [`Transport::encrypt`] in
    /// counter mode.
    pub fn decrypt(&mut self, buf: &mut [u8]) -> Result<()> {
        self.encrypt(buf)
    }

    /// Authenticate an outgoing record under this direction's keys.
    pub fn seal(&self, seq: u32, buf: &[u8]) -> Vec<u8> {
        self.hmac.sign(seq, buf, &self.chain.hmac)
    }

    /// Verify an incoming record's MAC, in constant time.
    pub fn open(&self, seq: u32, buf: &[u8], mac: &[u8]) -> Result<()> {
        self.hmac.verify(seq, buf, &self.chain.hmac, mac)
    }

    /// The padding length for a payload of `payload` bytes: at least 4, and
    /// making the whole record a multiple of the block size, no shorter
    /// than the 16-byte minimum record.
    pub fn padding(&self, payload: usize) -> u8 {
        const MIN_PAD_SIZE: usize = 4;
        const MIN_PACKET_SIZE: usize = 16;

        let align = self.block_size();

        let size = std::mem::size_of::<u32>() + std::mem::size_of::<u8>() + payload;
        let padding = (align - size % align) % align;

        let padding = if padding < MIN_PAD_SIZE {
            padding + align
        } else {
            padding
        };

        if size + padding < MIN_PACKET_SIZE.max(align) {
            (padding + align) as u8
        } else {
            padding as u8
        }
    }

    /// Frame `payload` into an unencrypted record: length, padding length,
    /// payload, then random padding.
    pub fn pad(&self, payload: &[u8]) -> Vec<u8> {
        let mut rng = rand::thread_rng();

        let padding = usize::from(self.padding(payload.len()));

        let mut record = Vec::with_capacity(5 + payload.len() + padding);
        record.extend_from_slice(&((1 + payload.len() + padding) as u32).to_be_bytes());
        record.push(padding as u8);
        record.extend_from_slice(payload);
        record.resize_with(record.len() + padding, || rng.r#gen());

        record
    }
}
