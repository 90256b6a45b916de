//! Primitives to manipulate binary data to extract and encode records
//! from/to a [`Pipe`] stream.

#[cfg(test)]
use std::io::{Read, Write};

use crate::{
    packet::{Message, Packet},
    Error, Pipe, Result,
};

mod transport;
pub use transport::{Transport, TransportPair};

mod keys;
pub use keys::Keys;

/// The largest record this implementation accepts, from RFC 4253 §6.1.
pub const MAX_PACKET_SIZE: u32 = 35000;

/// A wrapper around a [`Pipe`] to interface with the SSH binary protocol.
pub struct Stream<S> {
    inner: S,

    /// The pair of transports computed from the key exchange.
    transport: TransportPair,

    /// The session identifier derived from the first key exchange.
    session: Option<Vec<u8>>,

    /// Sequence number for the `tx` side.
    txseq: u32,

    /// Sequence number for the `rx` side.
    rxseq: u32,

    /// A push-back buffer for messages read ahead of their consumer.
    buffer: Option<Packet>,
}

impl<S: Pipe> Stream<S> {
    /// Wrap a pipe with cleartext transports and zeroed sequence numbers.
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            transport: TransportPair::default(),
            session: None,
            txseq: 0,
            rxseq: 0,
            buffer: None,
        }
    }

    /// Install the transports derived from a key exchange.
    ///
    /// Sequence numbers are deliberately left alone: they count records
    /// since connection start, not since the last key change.
    pub fn with_transport(&mut self, transport: TransportPair) {
        self.transport = transport;
    }

    /// Record the session identifier on the first exchange, returning the
    /// one that stays in force.
    pub fn with_session(&mut self, session: &[u8]) -> &[u8] {
        self.session.get_or_insert_with(|| session.to_vec())
    }

    /// The session identifier, once a key exchange completed.
    pub fn session_id(&self) -> Option<&[u8]> {
        self.session.as_deref()
    }

    /// The sequence number of the most recently received record.
    pub fn last_rxseq(&self) -> u32 {
        self.rxseq.wrapping_sub(1)
    }

    /// Push a received packet back; the next [`Stream::recv`] returns it.
    pub fn requeue(&mut self, packet: Packet) {
        self.buffer = Some(packet);
    }

    /// Receive and decrypt a record from the peer.
    pub fn recv(&mut self) -> Result<Packet> {
        if let Some(packet) = self.buffer.take() {
            return Ok(packet);
        }

        let transport = &mut self.transport.rx;
        let block_size = transport.block_size();

        let mut record = vec![0u8; block_size];
        self.inner.read_exact(&mut record)?;
        transport.decrypt(&mut record)?;

        let length = u32::from_be_bytes([record[0], record[1], record[2], record[3]]);
        if !(5..=MAX_PACKET_SIZE).contains(&length) || (length as usize + 4) % block_size != 0 {
            return Err(Error::PacketLength(length));
        }

        record.resize(length as usize + 4, 0);
        self.inner.read_exact(&mut record[block_size..])?;
        transport.decrypt(&mut record[block_size..])?;

        if transport.mac_size() > 0 {
            let mut mac = vec![0u8; transport.mac_size()];
            self.inner.read_exact(&mut mac)?;
            transport.open(self.rxseq, &record, &mac)?;
        }

        let padding = u32::from(record[4]);
        if padding < 4 || padding >= length - 1 {
            return Err(Error::Malformed);
        }

        let payload = record[5..(4 + length - padding) as usize].to_vec();
        let packet = Packet::new(payload);

        tracing::trace!(
            "<~- #{}: ^{:#x} ({} bytes)",
            self.rxseq,
            packet.message_id().unwrap_or_default(),
            packet.payload().len(),
        );

        self.rxseq = self.rxseq.wrapping_add(1);

        Ok(packet)
    }

    /// Encrypt and send a packet to the peer.
    pub fn send_packet(&mut self, packet: &Packet) -> Result<()> {
        let transport = &mut self.transport.tx;

        let mut record = transport.pad(packet.payload());
        let mac = transport.seal(self.txseq, &record);
        transport.encrypt(&mut record)?;

        self.inner.write_all(&record)?;
        self.inner.write_all(&mac)?;
        self.inner.flush()?;

        tracing::trace!(
            "-~> #{}: ^{:#x} ({} bytes)",
            self.txseq,
            packet.message_id().unwrap_or_default(),
            packet.payload().len(),
        );

        self.txseq = self.txseq.wrapping_add(1);

        Ok(())
    }

    /// Serialize and send a message to the peer.
    pub fn send<T: Message>(&mut self, message: &T) -> Result<()> {
        self.send_packet(&Packet::from(message))
    }
}
