//! Session-key derivation, from RFC 4253 §7.2.

use crate::{
    algorithm::{Cipher, Hmac},
    crypto::sha256::Sha256,
    packet::arch::Encoder,
};

/// The derived key material for one transport direction.
#[derive(Default)]
pub struct Keys {
    /// Cipher _initialization vector_.
    pub iv: Vec<u8>,

    /// Cipher _key_.
    pub key: Vec<u8>,

    /// Hmac _key_.
    pub hmac: Vec<u8>,
}

impl Keys {
    /// Derive the keys the client writes with: identifiers `A`, `C` and
    /// `E`.
    pub fn as_client(
        secret: &[u8],
        hash: &[u8],
        session_id: &[u8],
        cipher: &Cipher,
        hmac: &Hmac,
    ) -> Self {
        Self {
            iv: Self::derive(secret, hash, b'A', session_id, cipher.iv_size()),
            key: Self::derive(secret, hash, b'C', session_id, cipher.key_size()),
            hmac: Self::derive(secret, hash, b'E', session_id, hmac.size()),
        }
    }

    /// Derive the keys the server writes with: identifiers `B`, `D` and
    /// `F`.
    pub fn as_server(
        secret: &[u8],
        hash: &[u8],
        session_id: &[u8],
        cipher: &Cipher,
        hmac: &Hmac,
    ) -> Self {
        Self {
            iv: Self::derive(secret, hash, b'B', session_id, cipher.iv_size()),
            key: Self::derive(secret, hash, b'D', session_id, cipher.key_size()),
            hmac: Self::derive(secret, hash, b'F', session_id, hmac.size()),
        }
    }

    // K1 = HASH(mpint(K) || H || X || session_id), Kn = HASH(mpint(K) || H
    // || K1 || .. || K(n-1)), concatenated until `size` bytes are covered.
    fn derive(secret: &[u8], hash: &[u8], kind: u8, session_id: &[u8], size: usize) -> Vec<u8> {
        let mut mpint = Encoder::new();
        mpint.mpint(secret);

        let mut key = Sha256::new()
            .chain(mpint.as_bytes())
            .chain(hash)
            .chain([kind])
            .chain(session_id)
            .finalize()
            .to_vec();

        while key.len() < size {
            let next = Sha256::new()
                .chain(mpint.as_bytes())
                .chain(hash)
                .chain(&key)
                .finalize();

            key.extend_from_slice(&next);
        }

        key.truncate(size);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_derives_direction_distinct_keys() {
        let secret = [0x42u8; 32];
        let hash = [0x17u8; 32];

        let client = Keys::as_client(&secret, &hash, &hash, &Cipher::Aes128Ctr, &Hmac::HmacSha256);
        let server = Keys::as_server(&secret, &hash, &hash, &Cipher::Aes128Ctr, &Hmac::HmacSha256);

        assert_eq!(client.iv.len(), 16);
        assert_eq!(client.key.len(), 16);
        assert_eq!(client.hmac.len(), 32);

        assert_ne!(client.iv, server.iv);
        assert_ne!(client.key, server.key);
        assert_ne!(client.hmac, server.hmac);
    }

    #[test]
    fn it_expands_past_one_digest() {
        let key = Keys::derive(&[0x01; 32], &[0x02; 32], b'E', &[0x03; 32], 48);

        assert_eq!(key.len(), 48);
        // The first digest's worth must be a prefix of the expansion.
        assert_eq!(
            key[..32],
            Keys::derive(&[0x01; 32], &[0x02; 32], b'E', &[0x03; 32], 32)[..],
        );
    }
}
