//! AES-128 (FIPS 197) and its counter mode (SP 800-38A).
//!
//! Only the forward cipher is implemented: CTR mode never runs the inverse
//! rounds, it encrypts a big-endian counter and XORs the keystream over the
//! data in both directions.

/// Size of an AES block, in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Size of an AES-128 key, in bytes.
pub const KEY_SIZE: usize = 16;

const ROUNDS: usize = 10;

const SBOX: [u8; 256] = [
    0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
    0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
    0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
    0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
    0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
    0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
    0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
    0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
    0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
    0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
    0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
    0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
    0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
    0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
    0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
    0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
];

const RCON: [u8; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

fn xtime(byte: u8) -> u8 {
    (byte << 1) ^ (0x1b & (byte >> 7).wrapping_neg())
}

/// The AES-128 block cipher, expanded key included.
#[derive(Clone)]
struct Aes128 {
    round_keys: [[u8; BLOCK_SIZE]; ROUNDS + 1],
}

impl Aes128 {
    fn new(key: &[u8; KEY_SIZE]) -> Self {
        let mut round_keys = [[0u8; BLOCK_SIZE]; ROUNDS + 1];
        round_keys[0] = *key;

        for round in 1..=ROUNDS {
            let previous = round_keys[round - 1];
            let mut word = [previous[13], previous[14], previous[15], previous[12]];
            for byte in &mut word {
                *byte = SBOX[usize::from(*byte)];
            }
            word[0] ^= RCON[round - 1];

            let key = &mut round_keys[round];
            for i in 0..4 {
                key[i] = previous[i] ^ word[i];
            }
            for i in 4..BLOCK_SIZE {
                key[i] = previous[i] ^ key[i - 4];
            }
        }

        Self { round_keys }
    }

    /// Forward-cipher a single block in place.
    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        add_round_key(block, &self.round_keys[0]);

        for round in 1..=ROUNDS {
            sub_bytes(block);
            shift_rows(block);
            if round != ROUNDS {
                mix_columns(block);
            }
            add_round_key(block, &self.round_keys[round]);
        }
    }
}

fn add_round_key(block: &mut [u8; BLOCK_SIZE], key: &[u8; BLOCK_SIZE]) {
    for (byte, key) in block.iter_mut().zip(key) {
        *byte ^= key;
    }
}

fn sub_bytes(block: &mut [u8; BLOCK_SIZE]) {
    for byte in block.iter_mut() {
        *byte = SBOX[usize::from(*byte)];
    }
}

// The state is column-major: row `r` of the state lives at indices
// `r`, `r + 4`, `r + 8`, `r + 12`.
fn shift_rows(block: &mut [u8; BLOCK_SIZE]) {
    for row in 1..4 {
        let mut rotated = [0u8; 4];
        for col in 0..4 {
            rotated[col] = block[row + 4 * ((col + row) % 4)];
        }
        for col in 0..4 {
            block[row + 4 * col] = rotated[col];
        }
    }
}

fn mix_columns(block: &mut [u8; BLOCK_SIZE]) {
    for col in block.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
        let all = a0 ^ a1 ^ a2 ^ a3;

        col[0] ^= all ^ xtime(a0 ^ a1);
        col[1] ^= all ^ xtime(a1 ^ a2);
        col[2] ^= all ^ xtime(a2 ^ a3);
        col[3] ^= all ^ xtime(a3 ^ a0);
    }
}

/// A stateful AES-128-CTR keystream bound to one transport direction.
///
/// The counter and the keystream offset carry over between calls, so the
/// concatenation of all buffers ever passed to [`Aes128Ctr::apply_keystream`]
/// is enciphered exactly as a single call would have. There deliberately is
/// no way to rewind or re-key an existing context, since a restarted counter
/// would reuse keystream.
#[derive(Clone)]
pub struct Aes128Ctr {
    aes: Aes128,
    counter: [u8; BLOCK_SIZE],
    keystream: [u8; BLOCK_SIZE],
    used: usize,
}

impl Aes128Ctr {
    /// Create a context from a key and an initial counter block.
    pub fn new(key: &[u8; KEY_SIZE], iv: &[u8; BLOCK_SIZE]) -> Self {
        Self {
            aes: Aes128::new(key),
            counter: *iv,
            keystream: [0; BLOCK_SIZE],
            used: BLOCK_SIZE,
        }
    }

    /// XOR the next `buf.len()` keystream bytes over `buf`.
    ///
    /// Encryption and decryption are the same operation in counter mode.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        for byte in buf {
            if self.used == BLOCK_SIZE {
                self.keystream = self.counter;
                self.aes.encrypt_block(&mut self.keystream);
                self.increment_counter();
                self.used = 0;
            }

            *byte ^= self.keystream[self.used];
            self.used += 1;
        }
    }

    // Big-endian increment over the whole block, per SP 800-38A.
    fn increment_counter(&mut self) {
        for byte in self.counter.iter_mut().rev() {
            let (value, overflow) = byte.overflowing_add(1);
            *byte = value;
            if !overflow {
                break;
            }
        }
    }
}
