//! Algorithm negotiation over the `SSH_MSG_KEXINIT` name-lists.
//!
//! This server proposes exactly one algorithm per list, so negotiation
//! reduces to checking that the client's corresponding list carries that
//! name at all; the client's own preference order is irrelevant once the
//! intersection has a single candidate.

use crate::packet::arch::NameList;

mod cipher;
pub use cipher::Cipher;

mod hmac;
pub use hmac::Hmac;

mod kex;
pub use kex::Kex;
pub(crate) use kex::negotiate_kex;

/// Pick our preferred name when the client's list contains it.
fn negotiate<'n>(client: &NameList, server: &'n NameList) -> Option<&'n str> {
    server
        .preferred()
        .filter(|name| client.contains(name))
}
