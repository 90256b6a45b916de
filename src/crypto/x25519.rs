//! X25519 scalar multiplication, from RFC 7748.
//!
//! Drives the `curve25519-sha256` key-exchange: the server multiplies its
//! ephemeral scalar by the base point to produce `Q_S`, and by the client's
//! `Q_C` to produce the shared secret `K`.

use super::field::FieldElement;

/// Size of scalars, coordinates and shared secrets, in bytes.
pub const POINT_SIZE: usize = 32;

/// The u-coordinate of the curve's base point.
pub const BASEPOINT: [u8; POINT_SIZE] = {
    let mut point = [0u8; POINT_SIZE];
    point[0] = 9;
    point
};

const A24: FieldElement = {
    // (486662 - 2) / 4, the ladder's curve constant.
    let mut limbs = [0; 16];
    limbs[0] = 0xdb41;
    limbs[1] = 1;
    FieldElement(limbs)
};

/// Clamp a 32-byte scalar in place per RFC 7748 §5: clear the low three
/// bits, clear the top bit, set bit 254.
pub fn clamp(scalar: &mut [u8; POINT_SIZE]) {
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;
}

/// Multiply `point` by the clamping of `scalar` on the Montgomery curve.
///
/// The ladder runs a fixed 255 iterations with a constant-time conditional
/// swap, so the timing is independent of the scalar.
pub fn scalarmult(scalar: &[u8; POINT_SIZE], point: &[u8; POINT_SIZE]) -> [u8; POINT_SIZE] {
    let mut e = *scalar;
    clamp(&mut e);

    let x1 = FieldElement::from_bytes(point);
    let mut x2 = FieldElement::ONE;
    let mut z2 = FieldElement::ZERO;
    let mut x3 = x1;
    let mut z3 = FieldElement::ONE;

    for i in (0..=254).rev() {
        let bit = i64::from((e[i >> 3] >> (i & 7)) & 1);

        FieldElement::cswap(&mut x2, &mut x3, bit);
        FieldElement::cswap(&mut z2, &mut z3, bit);

        // One step of differential addition and doubling.
        let mut t0 = x2 + z2;
        x2 = x2 - z2;
        let mut t2 = x3 + z3;
        x3 = x3 - z3;
        z3 = t0.square();
        let t1 = x2.square();
        x2 = t2 * x2;
        t2 = x3 * t0;
        t0 = x2 + t2;
        x2 = x2 - t2;
        x3 = x2.square();
        t2 = z3 - t1;
        x2 = t2 * A24;
        x2 = x2 + z3;
        z2 = t2 * x2;
        x2 = z3 * t1;
        z3 = x3 * x1;
        x3 = t0.square();

        FieldElement::cswap(&mut x2, &mut x3, bit);
        FieldElement::cswap(&mut z2, &mut z3, bit);
    }

    (x2 * z2.invert()).to_bytes()
}

/// Multiply the base point, deriving the public key for `scalar`.
pub fn scalarmult_base(scalar: &[u8; POINT_SIZE]) -> [u8; POINT_SIZE] {
    scalarmult(scalar, &BASEPOINT)
}

/// Compute the shared secret between our `scalar` and the peer's public
/// `point`.
///
/// Returns [`None`] when the result is all zero, which happens exactly when
/// the peer supplied a small-order point; such a "secret" is attacker-chosen
/// and must abort the key-exchange.
pub fn diffie_hellman(
    scalar: &[u8; POINT_SIZE],
    point: &[u8; POINT_SIZE],
) -> Option<[u8; POINT_SIZE]> {
    let secret = scalarmult(scalar, point);

    let mut acc = 0u8;
    for byte in &secret {
        acc |= byte;
    }

    (acc != 0).then_some(secret)
}
