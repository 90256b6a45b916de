//! Ed25519 signing, from RFC 8032.
//!
//! This is the host-key algorithm: the server proves ownership of its
//! `ssh-ed25519` key by signing the exchange hash. Only key generation and
//! signing live here; the server never verifies a signature, so there is no
//! verification path to carry.

use rand::{CryptoRng, RngCore};

use super::{
    field::FieldElement,
    sha512::{sha512, Sha512},
};

/// Size of public keys, in bytes.
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of signatures, in bytes.
pub const SIGNATURE_SIZE: usize = 64;

/// The group order L = 2^252 + 27742317777372353535851937790883648493,
/// as little-endian bytes.
const L: [i64; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde,
    0x14, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x10,
];

// 2 * d, where d = -121665/121666 is the twisted Edwards curve constant.
const D2: FieldElement = FieldElement([
    0xf159, 0x26b2, 0x9b94, 0xebd6, 0xb156, 0x8283, 0x149a, 0x00e0, 0xd130, 0xeef3, 0x80f2,
    0x198e, 0xfce7, 0x56df, 0xd9dc, 0x2406,
]);

// The base point B, affine coordinates.
const BASE_X: FieldElement = FieldElement([
    0xd51a, 0x8f25, 0x2d60, 0xc956, 0xa7b2, 0x9525, 0xc760, 0x692c, 0xdc5c, 0xfdd6, 0xe231,
    0xc0a4, 0x53fe, 0xcd6e, 0x36d3, 0x2169,
]);
const BASE_Y: FieldElement = FieldElement([
    0x6658, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666, 0x6666,
    0x6666, 0x6666, 0x6666, 0x6666, 0x6666,
]);

/// A group element in extended coordinates, with x = X/Z, y = Y/Z and
/// T = XY/Z.
#[derive(Clone, Copy)]
struct Point {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
    t: FieldElement,
}

impl Point {
    const NEUTRAL: Point = Point {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ONE,
        t: FieldElement::ZERO,
    };

    fn base() -> Point {
        Point {
            x: BASE_X,
            y: BASE_Y,
            z: FieldElement::ONE,
            t: BASE_X * BASE_Y,
        }
    }

    /// The unified addition `self += other`; also valid for doubling.
    fn add_assign(&mut self, other: &Point) {
        let a = (self.y - self.x) * (other.y - other.x);
        let b = (self.x + self.y) * (other.x + other.y);
        let c = self.t * other.t * D2;
        let d = self.z * other.z;
        let d = d + d;
        let e = b - a;
        let f = d - c;
        let g = d + c;
        let h = b + a;

        self.x = e * f;
        self.y = h * g;
        self.z = g * f;
        self.t = e * h;
    }

    fn cswap(a: &mut Point, b: &mut Point, swap: i64) {
        FieldElement::cswap(&mut a.x, &mut b.x, swap);
        FieldElement::cswap(&mut a.y, &mut b.y, swap);
        FieldElement::cswap(&mut a.z, &mut b.z, swap);
        FieldElement::cswap(&mut a.t, &mut b.t, swap);
    }

    /// Multiply by a 256-bit scalar with a constant-time double-and-add
    /// ladder.
    fn scalarmult(mut self, scalar: &[u8; 32]) -> Point {
        let mut out = Point::NEUTRAL;

        for i in (0..=255).rev() {
            let bit = i64::from((scalar[i >> 3] >> (i & 7)) & 1);

            Point::cswap(&mut out, &mut self, bit);
            self.add_assign(&out);
            let doubled = out;
            out.add_assign(&doubled);
            Point::cswap(&mut out, &mut self, bit);
        }

        out
    }

    fn scalarmult_base(scalar: &[u8; 32]) -> Point {
        Point::base().scalarmult(scalar)
    }

    /// Compress to the canonical 32-byte encoding: the y-coordinate with the
    /// sign of x folded into the top bit.
    fn compress(&self) -> [u8; 32] {
        let zi = self.z.invert();
        let x = self.x * zi;
        let y = self.y * zi;

        let mut bytes = y.to_bytes();
        bytes[31] ^= x.parity() << 7;

        bytes
    }
}

/// Reduce a 512-bit little-endian value modulo L.
fn reduce(wide: &[u8; 64]) -> [u8; 32] {
    let mut digits = [0i64; 64];
    for (digit, byte) in digits.iter_mut().zip(wide) {
        *digit = i64::from(*byte);
    }

    mod_l(&mut digits)
}

/// The byte-wise Barrett-flavored reduction of NaCl: fold the high digits
/// down against L, then make two correcting passes.
fn mod_l(digits: &mut [i64; 64]) -> [u8; 32] {
    for i in (32..64).rev() {
        let mut carry = 0i64;
        #[allow(clippy::needless_range_loop)]
        for j in (i - 32)..(i - 12) {
            digits[j] += carry - 16 * digits[i] * L[j - (i - 32)];
            carry = (digits[j] + 128) >> 8;
            digits[j] -= carry << 8;
        }
        digits[i - 12] += carry;
        digits[i] = 0;
    }

    let mut carry = 0i64;
    for (j, l) in L.iter().enumerate() {
        digits[j] += carry - (digits[31] >> 4) * l;
        carry = digits[j] >> 8;
        digits[j] &= 255;
    }
    for (j, l) in L.iter().enumerate() {
        digits[j] -= carry * l;
    }

    let mut out = [0u8; 32];
    for i in 0..32 {
        digits[i + 1] += digits[i] >> 8;
        out[i] = (digits[i] & 255) as u8;
    }

    out
}

/// Compute `(ab + c) mod L` over little-endian 32-byte scalars.
fn mul_add(a: &[u8; 32], b: &[u8; 32], c: &[u8; 32]) -> [u8; 32] {
    let mut digits = [0i64; 64];
    for (digit, byte) in digits.iter_mut().zip(c) {
        *digit = i64::from(*byte);
    }
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            digits[i + j] += i64::from(*x) * i64::from(*y);
        }
    }

    mod_l(&mut digits)
}

/// An Ed25519 keypair, held as the 32-byte seed plus the derived public
/// point.
#[derive(Clone)]
pub struct SigningKey {
    seed: [u8; 32],
    public: [u8; PUBLIC_KEY_SIZE],
}

impl SigningKey {
    /// Generate a keypair from the given entropy source.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self, rand::Error> {
        let mut seed = [0u8; 32];
        rng.try_fill_bytes(&mut seed)?;

        Ok(Self::from_seed(seed))
    }

    /// Derive the keypair determined by a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let (scalar, _) = Self::expand(&seed);
        let public = Point::scalarmult_base(&scalar).compress();

        Self { seed, public }
    }

    /// The public key, as the canonical compressed point.
    pub fn public(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public
    }

    /// The SSH algorithm name of this key.
    pub fn algorithm(&self) -> &'static str {
        "ssh-ed25519"
    }

    /// Sign `message`, producing the 64-byte `R || S` signature.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        let (scalar, prefix) = Self::expand(&self.seed);

        let r = reduce(&Sha512::new().chain(prefix).chain(message).finalize());
        let big_r = Point::scalarmult_base(&r).compress();

        let k = reduce(
            &Sha512::new()
                .chain(big_r)
                .chain(self.public)
                .chain(message)
                .finalize(),
        );
        let s = mul_add(&k, &scalar, &r);

        let mut signature = [0u8; SIGNATURE_SIZE];
        signature[..32].copy_from_slice(&big_r);
        signature[32..].copy_from_slice(&s);

        signature
    }

    // SHA-512 the seed into the clamped secret scalar and the nonce prefix.
    fn expand(seed: &[u8; 32]) -> ([u8; 32], [u8; 32]) {
        let digest = sha512(seed);

        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(&digest[..32]);
        scalar[0] &= 248;
        scalar[31] &= 127;
        scalar[31] |= 64;

        let mut prefix = [0u8; 32];
        prefix.copy_from_slice(&digest[32..]);

        (scalar, prefix)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The seed stays out of logs.
        f.debug_struct("SigningKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn arr(hex: &str) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&hex::decode(hex).expect("valid hex"));
        out
    }

    // RFC 8032 §7.1 test vectors 1-3.
    #[rstest]
    #[case::empty(
        "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
        "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a",
        "",
        "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
         5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
    )]
    #[case::one_byte(
        "4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb",
        "3d4017c3e843895a92b70aa74d1b7ebc9c982ccf2ec4968cc0cd55f12af4660c",
        "72",
        "92a009a9f0d4cab8720e820b5f642540a2b27b5416503f8fb3762223ebdb69da\
         085ac1e43e15996e458f3613d0f11d8c387b2eaeb4302aeeb00d291612bb0c00"
    )]
    #[case::two_bytes(
        "c5aa8df43f9f837bedb7442f31dcb7b166d38535076f094b85ce3a2e0b4458f7",
        "fc51cd8e6218a1a38da47ed00230f0580816ed13ba3303ac5deb911548908025",
        "af82",
        "6291d657deec24024827e69c3abe01a30ce548a284743a445e3680d7db5ac3ac\
         18ff9b538d16f290ae67f760984dc6594a7c15e9716ed28dc027beceea1ec40a"
    )]
    fn it_matches_rfc8032_vectors(
        #[case] seed: &str,
        #[case] public: &str,
        #[case] message: &str,
        #[case] signature: &str,
    ) {
        let key = SigningKey::from_seed(arr(seed));
        let message = hex::decode(message).expect("valid hex");

        assert_eq!(hex::encode(key.public()), public);
        assert_eq!(hex::encode(key.sign(&message)), signature);
    }

    #[test]
    fn it_generates_distinct_keys() {
        let a = SigningKey::random(&mut rand::rngs::OsRng).expect("entropy available");
        let b = SigningKey::random(&mut rand::rngs::OsRng).expect("entropy available");

        assert_ne!(a.public(), b.public());
    }
}
