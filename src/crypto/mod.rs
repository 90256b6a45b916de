//! The cryptographic primitives, implemented from their standards.
//!
//! Nothing in here is negotiable at run-time: the server speaks exactly one
//! suite (`curve25519-sha256`, `ssh-ed25519`, `aes128-ctr`, `hmac-sha2-256`)
//! and these modules are that suite, self-contained so the binary carries no
//! cryptography dependency.

pub mod aes;
pub mod ed25519;
pub mod hmac;
pub mod sha256;
pub mod sha512;
pub mod x25519;

mod field;
