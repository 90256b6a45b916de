//! HMAC-SHA-256, from RFC 2104.

use super::sha256::{self, Sha256, BLOCK_SIZE, DIGEST_SIZE};

/// A keyed HMAC-SHA-256 context.
#[derive(Clone)]
pub struct HmacSha256 {
    inner: Sha256,
    opad: [u8; BLOCK_SIZE],
}

impl HmacSha256 {
    /// Key a fresh context; keys longer than the hash block are hashed first.
    pub fn new(key: &[u8]) -> Self {
        let mut padded = [0u8; BLOCK_SIZE];
        if key.len() > BLOCK_SIZE {
            padded[..DIGEST_SIZE].copy_from_slice(&sha256::sha256(key));
        } else {
            padded[..key.len()].copy_from_slice(key);
        }

        let mut ipad = padded;
        let mut opad = padded;
        for (i, o) in ipad.iter_mut().zip(opad.iter_mut()) {
            *i ^= 0x36;
            *o ^= 0x5c;
        }

        Self {
            inner: Sha256::new().chain(ipad),
            opad,
        }
    }

    /// Absorb `data` into the authenticated message.
    pub fn update(&mut self, data: impl AsRef<[u8]>) {
        self.inner.update(data);
    }

    /// Absorb `data` into the authenticated message, builder-style.
    pub fn chain(mut self, data: impl AsRef<[u8]>) -> Self {
        self.update(data);
        self
    }

    /// Produce the authentication code.
    pub fn finalize(self) -> [u8; DIGEST_SIZE] {
        Sha256::new()
            .chain(self.opad)
            .chain(self.inner.finalize())
            .finalize()
    }

    /// Recompute the code over the absorbed message and compare it against
    /// `code`, in constant time.
    pub fn verify(self, code: &[u8]) -> bool {
        constant_time_eq(&self.finalize(), code)
    }
}

/// Byte-slice equality that does not leak the mismatch position through
/// timing. Only the lengths may be distinguished.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }

    diff == 0
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    // RFC 4231 test cases.
    #[rstest]
    #[case::case_1(
        "0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b",
        "4869205468657265",
        "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
    )]
    #[case::case_2(
        "4a656665",
        "7768617420646f2079612077616e7420666f72206e6f7468696e673f",
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    )]
    #[case::case_3(
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd\
         dddddddddddddddddddddddddddddddddddd",
        "773ea91e36800e46854db8ebd09181a72959098b3ef8c122d9635514ced565fe"
    )]
    #[case::case_6_long_key(
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\
         aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\
         aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "54657374205573696e67204c6172676572205468616e20426c6f636b2d53697a\
         65204b6579202d2048617368204b6579204669727374",
        "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
    )]
    fn it_matches_rfc4231_vectors(#[case] key: &str, #[case] data: &str, #[case] expected: &str) {
        let key = hex::decode(key).expect("valid hex");
        let data = hex::decode(data).expect("valid hex");

        let code = HmacSha256::new(&key).chain(&data).finalize();

        assert_eq!(hex::encode(code), expected);
        assert!(HmacSha256::new(&key).chain(&data).verify(&code));
    }

    #[test]
    fn it_rejects_a_tampered_code() {
        let mut code = HmacSha256::new(b"key").chain(b"message").finalize();
        code[7] ^= 0x01;

        assert!(!HmacSha256::new(b"key").chain(b"message").verify(&code));
        assert!(!HmacSha256::new(b"key").chain(b"message").verify(&code[..16]));
    }
}
