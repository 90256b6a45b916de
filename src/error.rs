//! Collection of error handling types and aliases.

use thiserror::Error;

use crate::packet::trans::DisconnectReason;

/// The disconnection side for [`DisconnectedError`].
#[derive(Debug, Clone)]
pub enum DisconnectedBy {
    /// The session has been disconnected by _us_.
    Us,

    /// The session has been disconnected by _them_.
    Them,
}

/// The error type describing disconnect.
#[must_use]
#[derive(Debug, Error, Clone)]
#[error("The session has been disconnected by {by:?} for {reason:?}: {description}")]
pub struct DisconnectedError {
    /// Side that sent the disconnect message.
    pub by: DisconnectedBy,

    /// Reason for disconnect.
    pub reason: DisconnectReason,

    /// Description of the disconnect reason.
    pub description: String,
}

/// The error types that can occur when manipulating this crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// I/O Error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The operating system's entropy source failed.
    #[error("The operating system's entropy source failed")]
    Entropy(#[source] rand::Error),

    /// Binary (de)-serialization error.
    #[error("Malformed or truncated binary payload")]
    Malformed,

    /// A packet length outside of the legal bounds.
    #[error("Packet length `{0}` is outside of the legal bounds")]
    PacketLength(u32),

    /// The peer's identification string did not announce SSH 2.0.
    #[error("Peer identification did not announce a compatible SSH version")]
    UnsupportedVersion,

    /// No common kex algorithm found between both sides.
    #[error("Unable to negociate a common kex algorithm")]
    NoCommonKex,

    /// No common key algorithm found between both sides.
    #[error("Unable to negociate a common host key algorithm")]
    NoCommonKey,

    /// No common cipher algorithm found between both sides.
    #[error("Unable to negociate a common encryption algorithm")]
    NoCommonCipher,

    /// No common hmac algorithm found between both sides.
    #[error("Unable to negociate a common HMAC algorithm")]
    NoCommonHmac,

    /// No common compression algorithm found between both sides.
    #[error("Unable to negociate a common compression algorithm")]
    NoCommonCompression,

    /// Protocol error in the key-exchange.
    #[error("Error in the key-exchange algorithm")]
    KexError,

    /// Integrity check failure on a received packet.
    #[error("Message authentication code mismatch on a received packet")]
    Mac,

    /// The requested service is not provided by this server.
    #[error("The requested service is unknown")]
    UnknownService,

    /// The peer tried to open a channel type we do not provide.
    #[error("The requested channel type is unknown")]
    UnknownChannelType,

    /// The message received was unexpected in the current context.
    #[error("Peer sent a message that made no sense in the current context")]
    UnexpectedMessage,

    /// The session has been disconnected.
    #[error(transparent)]
    Disconnected(#[from] DisconnectedError),
}

impl Error {
    /// The `SSH_MSG_DISCONNECT` reason to report to the peer for this error,
    /// if the error warrants one at all.
    ///
    /// [`Error::Io`] means the transport is presumed lost and yields no
    /// reason, as does [`Error::Disconnected`] which has already been
    /// signaled to or by the peer.
    pub fn disconnect_reason(&self) -> Option<DisconnectReason> {
        match self {
            Self::Io(_) | Self::Entropy(_) | Self::Disconnected(_) => None,
            Self::Malformed
            | Self::PacketLength(_)
            | Self::UnknownChannelType
            | Self::UnexpectedMessage => Some(DisconnectReason::ProtocolError),
            Self::UnsupportedVersion => Some(DisconnectReason::ProtocolVersionNotSupported),
            Self::NoCommonKex
            | Self::NoCommonKey
            | Self::NoCommonCipher
            | Self::NoCommonHmac
            | Self::NoCommonCompression
            | Self::KexError => Some(DisconnectReason::KeyExchangeFailed),
            Self::Mac => Some(DisconnectReason::MacError),
            Self::UnknownService => Some(DisconnectReason::ServiceNotAvailable),
        }
    }
}

/// A handy [`std::result::Result`] type alias bounding the [`enum@Error`] struct as `E`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
