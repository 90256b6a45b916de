//! Wire representation of the protocol: the RFC 4251 data types and every
//! message this server speaks, grouped the way the RFCs group them.

use crate::{Error, Result};

pub mod arch;
pub mod connect;
pub mod trans;
pub mod userauth;

mod id;
pub use id::Id;

use arch::{Decoder, Encoder};

/// A message of the protocol, convertible to and from a [`Packet`] payload.
pub trait Message: Sized {
    /// The `SSH_MSG_*` code identifying this message on the wire.
    const ID: u8;

    /// Write the fields following the message code.
    fn encode(&self, encoder: &mut Encoder);

    /// Read the fields following the message code.
    fn decode(decoder: &mut Decoder) -> Result<Self>;
}

/// One decoded packet payload: the message code followed by its fields,
/// still in wire form.
#[derive(Debug, Clone)]
pub struct Packet {
    payload: Vec<u8>,
}

impl Packet {
    /// Wrap a raw payload. The payload of a legal packet is never empty.
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// Serialize a [`Message`] into a packet.
    pub fn from<T: Message>(message: &T) -> Self {
        let mut encoder = Encoder::new();
        encoder.u8(T::ID);
        message.encode(&mut encoder);

        Self {
            payload: encoder.into_bytes(),
        }
    }

    /// The message code of this payload.
    pub fn message_id(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Interpret the payload as a `T`, failing with
    /// [`Error::UnexpectedMessage`] when the message code differs.
    pub fn to<T: Message>(&self) -> Result<T> {
        let mut decoder = Decoder::new(&self.payload);
        if decoder.u8()? != T::ID {
            return Err(Error::UnexpectedMessage);
        }

        T::decode(&mut decoder)
    }

    /// The raw payload bytes, message code included.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::{trans::NewKeys, userauth, *};

    #[test]
    fn it_round_trips_a_message() {
        let packet = Packet::from(&userauth::Success);

        assert_eq!(packet.message_id(), Some(userauth::Success::ID));
        assert!(packet.to::<userauth::Success>().is_ok());
    }

    #[test]
    fn it_refuses_the_wrong_message_code() {
        let packet = Packet::from(&NewKeys);

        assert!(matches!(
            packet.to::<userauth::Success>(),
            Err(Error::UnexpectedMessage)
        ));
    }
}
