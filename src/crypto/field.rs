//! Arithmetic in GF(2^255 - 19), the prime field under Curve25519 and
//! edwards25519.
//!
//! Elements are sixteen little-endian limbs of sixteen bits each, kept in
//! `i64` so sums and differences can go unreduced between multiplications.
//! Every operation is branch-free on secret data; the only data-dependent
//! branches below are on public loop counters.

use std::ops::{Add, Mul, Sub};

#[derive(Clone, Copy)]
pub(crate) struct FieldElement(pub(crate) [i64; 16]);

impl FieldElement {
    pub(crate) const ZERO: FieldElement = FieldElement([0; 16]);
    pub(crate) const ONE: FieldElement = {
        let mut limbs = [0; 16];
        limbs[0] = 1;
        FieldElement(limbs)
    };

    /// Decode 32 little-endian bytes; the top bit is masked off as RFC 7748
    /// requires for u-coordinates.
    pub(crate) fn from_bytes(bytes: &[u8; 32]) -> Self {
        let mut limbs = [0i64; 16];
        for (limb, pair) in limbs.iter_mut().zip(bytes.chunks_exact(2)) {
            *limb = i64::from(pair[0]) | (i64::from(pair[1]) << 8);
        }
        limbs[15] &= 0x7fff;

        Self(limbs)
    }

    /// Encode as 32 little-endian bytes, fully reduced below 2^255 - 19.
    pub(crate) fn to_bytes(self) -> [u8; 32] {
        let mut t = self;
        t.carry();
        t.carry();
        t.carry();

        // Freeze: conditionally subtract the prime, twice, keeping the
        // subtraction whenever it does not borrow.
        let mut m = FieldElement::ZERO;
        for _ in 0..2 {
            m.0[0] = t.0[0] - 0xffed;
            for i in 1..15 {
                m.0[i] = t.0[i] - 0xffff - ((m.0[i - 1] >> 16) & 1);
                m.0[i - 1] &= 0xffff;
            }
            m.0[15] = t.0[15] - 0x7fff - ((m.0[14] >> 16) & 1);
            let borrow = (m.0[15] >> 16) & 1;
            m.0[14] &= 0xffff;
            FieldElement::cswap(&mut t, &mut m, 1 - borrow);
        }

        let mut bytes = [0u8; 32];
        for (limb, pair) in t.0.iter().zip(bytes.chunks_exact_mut(2)) {
            pair[0] = (limb & 0xff) as u8;
            pair[1] = (limb >> 8) as u8;
        }

        bytes
    }

    /// Swap `a` and `b` iff `swap` is 1, without branching on it.
    pub(crate) fn cswap(a: &mut FieldElement, b: &mut FieldElement, swap: i64) {
        let mask = !(swap - 1);
        for (x, y) in a.0.iter_mut().zip(b.0.iter_mut()) {
            let t = mask & (*x ^ *y);
            *x ^= t;
            *y ^= t;
        }
    }

    pub(crate) fn square(self) -> Self {
        self * self
    }

    /// Invert through Fermat's little theorem, raising to p - 2; the
    /// exponent is all-ones except bits 2 and 4.
    pub(crate) fn invert(self) -> Self {
        let mut out = self;
        for bit in (0..=253).rev() {
            out = out.square();
            if bit != 2 && bit != 4 {
                out = out * self;
            }
        }

        out
    }

    /// The parity of the canonical encoding, used as the sign of an
    /// x-coordinate in point compression.
    pub(crate) fn parity(self) -> u8 {
        self.to_bytes()[0] & 1
    }

    // Propagate limb carries, folding the top overflow back in at
    // weight 38 = 2 * 19.
    fn carry(&mut self) {
        for i in 0..16 {
            self.0[i] += 1 << 16;
            let c = self.0[i] >> 16;
            self.0[(i + 1) * usize::from(i < 15)] +=
                c - 1 + 37 * (c - 1) * i64::from(i == 15);
            self.0[i] -= c << 16;
        }
    }
}

impl Add for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: FieldElement) -> FieldElement {
        let mut out = self;
        for (limb, rhs) in out.0.iter_mut().zip(rhs.0) {
            *limb += rhs;
        }
        out
    }
}

impl Sub for FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: FieldElement) -> FieldElement {
        let mut out = self;
        for (limb, rhs) in out.0.iter_mut().zip(rhs.0) {
            *limb -= rhs;
        }
        out
    }
}

impl Mul for FieldElement {
    type Output = FieldElement;

    fn mul(self, rhs: FieldElement) -> FieldElement {
        let mut product = [0i64; 31];
        for (i, a) in self.0.iter().enumerate() {
            for (j, b) in rhs.0.iter().enumerate() {
                product[i + j] += a * b;
            }
        }

        // 2^256 = 38 mod p, so the high half folds onto the low half.
        let mut out = FieldElement::ZERO;
        for i in 0..15 {
            product[i] += 38 * product[i + 16];
        }
        out.0.copy_from_slice(&product[..16]);

        out.carry();
        out.carry();

        out
    }
}
