//! Session and transport handling mechanics.

use crate::{
    algorithm,
    packet::{
        trans::{
            Debug, Disconnect, DisconnectReason, Ignore, KexInit, NewKeys, Unimplemented,
        },
        Id, Message, Packet,
    },
    stream::Stream,
    DisconnectedBy, DisconnectedError, Error, Pipe, Result,
};

pub mod server;
pub use server::Server;

// Every message code this implementation can make sense of; anything else
// is answered with `SSH_MSG_UNIMPLEMENTED`.
const KNOWN_MESSAGES: [u8; 23] = [
    1, 2, 3, 4, 5, 6, 20, 21, 30, 31, 50, 51, 52, 90, 91, 92, 93, 94, 96, 97, 98, 99, 100,
];

/// A server session wrapping a [`Pipe`] to handle the **key exchange** and
/// the **`SSH-TRANS`** messages.
pub struct Session<S> {
    stream: Option<Stream<S>>,
    config: Server,

    peer_id: Id,
}

impl<S: Pipe> Session<S> {
    /// Create a new [`Session`] from a [`Pipe`], exchanging identification
    /// strings: ours is written first, per RFC 4253 §4.2.
    ///
    /// A peer that does not announce SSH 2.0 is sent an
    /// `SSH_MSG_DISCONNECT` before the error is reported.
    pub fn new(mut stream: S, config: Server) -> Result<Self> {
        stream.write_all(config.id.to_string().as_bytes())?;
        stream.write_all(b"\r\n")?;
        stream.flush()?;

        let peer_id = match Id::from_reader(&mut stream) {
            Ok(peer_id) => peer_id,
            Err(err) => {
                if let Some(reason) = err.disconnect_reason() {
                    let _ = Stream::new(stream).send(&Disconnect {
                        reason,
                        description: err.to_string(),
                        language: String::new(),
                    });
                }

                return Err(err);
            }
        };

        tracing::debug!("Session started with peer `{peer_id}`");

        Ok(Self {
            stream: Some(Stream::new(stream)),
            config,
            peer_id,
        })
    }

    /// Receive a [`Packet`] from the stream, running the initial key
    /// exchange beforehand and consuming the transport-transparent
    /// messages along the way.
    pub fn recv(&mut self) -> Result<Packet> {
        loop {
            let stream = self.stream.as_mut().ok_or_else(closed)?;

            if stream.session_id().is_none() {
                self.kex()?;
                continue;
            }

            let packet = stream.recv()?;
            match packet.message_id() {
                Some(Disconnect::ID) => {
                    let message: Disconnect = packet.to()?;
                    drop(self.stream.take());

                    return Err(DisconnectedError {
                        by: DisconnectedBy::Them,
                        reason: message.reason,
                        description: message.description,
                    }
                    .into());
                }
                Some(Ignore::ID) => {
                    tracing::debug!("Received an 'ignore' message");
                }
                Some(Debug::ID) => {
                    let message: Debug = packet.to()?;
                    tracing::debug!("Received a 'debug' message: {}", message.message);
                }
                Some(Unimplemented::ID) => {
                    let message: Unimplemented = packet.to()?;
                    tracing::debug!(
                        "Received a 'unimplemented' message about packet #{}",
                        message.seq
                    );
                }
                Some(KexInit::ID) => {
                    // A re-keying request; this transport keeps its first
                    // keys for its whole short life.
                    return Err(Error::UnexpectedMessage);
                }
                Some(id) if !KNOWN_MESSAGES.contains(&id) => {
                    tracing::debug!("Received an unknown message ^{id:#x}");

                    let seq = stream.last_rxseq();
                    stream.send(&Unimplemented { seq })?;
                }
                _ => return Ok(packet),
            }
        }
    }

    /// Send a [`Message`] to the stream, running the initial key exchange
    /// beforehand.
    pub fn send<T: Message>(&mut self, message: &T) -> Result<()> {
        if self
            .stream
            .as_ref()
            .ok_or_else(closed)?
            .session_id()
            .is_none()
        {
            self.kex()?;
        }

        self.stream.as_mut().ok_or_else(closed)?.send(message)
    }

    /// Push a packet back so the next [`Session::recv`] returns it again.
    pub fn requeue(&mut self, packet: Packet) -> Result<()> {
        self.stream.as_mut().ok_or_else(closed)?.requeue(packet);

        Ok(())
    }

    /// Send an `SSH_MSG_DISCONNECT` to the peer and drop the transport.
    pub fn disconnect(
        &mut self,
        reason: DisconnectReason,
        description: impl Into<String>,
    ) -> Result<DisconnectedError> {
        let description = description.into();

        if let Some(mut stream) = self.stream.take() {
            stream.send(&Disconnect {
                reason,
                description: description.clone(),
                language: String::new(),
            })?;
        }

        Ok(DisconnectedError {
            by: DisconnectedBy::Us,
            reason,
            description,
        })
    }

    /// The session identifier, once the key exchange has run.
    pub fn session_id(&self) -> Option<&[u8]> {
        self.stream.as_ref().and_then(Stream::session_id)
    }

    /// Get the [`Id`] of the connected peer.
    pub fn peer_id(&self) -> &Id {
        &self.peer_id
    }

    fn kex(&mut self) -> Result<()> {
        let stream = self.stream.as_mut().ok_or_else(closed)?;

        tracing::debug!("Starting key-exchange procedure");

        let kexinit = self.config.kexinit();
        let i_s = Packet::from(&kexinit);
        stream.send_packet(&i_s)?;

        let peer_packet = stream.recv()?;
        if peer_packet.message_id() != Some(KexInit::ID) {
            return Err(Error::UnexpectedMessage);
        }
        let peerkexinit: KexInit = peer_packet.to()?;

        let kex = algorithm::negotiate_kex(&peerkexinit, &kexinit)?;

        if peerkexinit.first_kex_packet_follows
            && (peerkexinit.kex_algorithms.preferred()
                != kexinit.kex_algorithms.preferred()
                || peerkexinit.server_host_key_algorithms.preferred()
                    != kexinit.server_host_key_algorithms.preferred())
        {
            // The client guessed our algorithms wrong; its eagerly sent
            // first kex packet must be ignored, per RFC 4253 §7.
            let discarded = stream.recv()?;
            tracing::debug!(
                "Discarded a wrongly guessed first kex packet ^{:#x}",
                discarded.message_id().unwrap_or_default()
            );
        }

        let key = self
            .config
            .keys
            .first()
            .ok_or(Error::NoCommonKey)?;

        let transport = kex.as_server(
            stream,
            &self.peer_id,
            &self.config.id,
            peer_packet.payload(),
            i_s.payload(),
            &peerkexinit,
            &kexinit,
            key,
        )?;

        stream.send(&NewKeys)?;
        let newkeys = stream.recv()?;
        if newkeys.message_id() != Some(NewKeys::ID) {
            return Err(Error::UnexpectedMessage);
        }

        tracing::debug!("Key exchange success, keys are in service from the next record on");

        stream.with_transport(transport);

        Ok(())
    }
}

fn closed() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "the session has already been torn down",
    ))
}
