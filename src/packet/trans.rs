//! Messages of the **transport** (`SSH-TRANS`) part of the protocol, from
//! RFC 4253 and RFC 5656.

use crate::Result;

use super::{
    arch::{Decoder, Encoder, NameList},
    Message,
};

/// The `SSH_MSG_DISCONNECT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-11.1>.
#[derive(Debug, Clone)]
pub struct Disconnect {
    /// Reason for disconnection.
    pub reason: DisconnectReason,

    /// Description of the reason for disconnection.
    pub description: String,

    /// Language tag.
    pub language: String,
}

impl Message for Disconnect {
    const ID: u8 = 1;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .u32(self.reason.to_u32())
            .string(&self.description)
            .string(&self.language);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            reason: DisconnectReason::from_u32(decoder.u32()?),
            description: decoder.utf8()?,
            language: decoder.utf8()?,
        })
    }
}

/// The `reason` for disconnect in the `SSH_MSG_DISCONNECT` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `SSH_DISCONNECT_HOST_NOT_ALLOWED_TO_CONNECT`.
    HostNotAllowedToConnect,

    /// `SSH_DISCONNECT_PROTOCOL_ERROR`.
    ProtocolError,

    /// `SSH_DISCONNECT_KEY_EXCHANGE_FAILED`.
    KeyExchangeFailed,

    /// `SSH_DISCONNECT_RESERVED`.
    Reserved,

    /// `SSH_DISCONNECT_MAC_ERROR`.
    MacError,

    /// `SSH_DISCONNECT_COMPRESSION_ERROR`.
    CompressionError,

    /// `SSH_DISCONNECT_SERVICE_NOT_AVAILABLE`.
    ServiceNotAvailable,

    /// `SSH_DISCONNECT_PROTOCOL_VERSION_NOT_SUPPORTED`.
    ProtocolVersionNotSupported,

    /// `SSH_DISCONNECT_HOST_KEY_NOT_VERIFIABLE`.
    HostKeyNotVerifiable,

    /// `SSH_DISCONNECT_CONNECTION_LOST`.
    ConnectionLost,

    /// `SSH_DISCONNECT_BY_APPLICATION`.
    ByApplication,

    /// `SSH_DISCONNECT_TOO_MANY_CONNECTIONS`.
    TooManyConnections,

    /// `SSH_DISCONNECT_AUTH_CANCELLED_BY_USER`.
    AuthCancelledByUser,

    /// `SSH_DISCONNECT_NO_MORE_AUTH_METHODS_AVAILABLE`.
    NoMoreAuthMethodsAvailable,

    /// `SSH_DISCONNECT_ILLEGAL_USER_NAME`.
    IllegalUserName,

    /// Any other disconnect reason, may be non-standard.
    Other(u32),
}

impl DisconnectReason {
    /// The wire value of this reason.
    pub fn to_u32(self) -> u32 {
        match self {
            Self::HostNotAllowedToConnect => 1,
            Self::ProtocolError => 2,
            Self::KeyExchangeFailed => 3,
            Self::Reserved => 4,
            Self::MacError => 5,
            Self::CompressionError => 6,
            Self::ServiceNotAvailable => 7,
            Self::ProtocolVersionNotSupported => 8,
            Self::HostKeyNotVerifiable => 9,
            Self::ConnectionLost => 10,
            Self::ByApplication => 11,
            Self::TooManyConnections => 12,
            Self::AuthCancelledByUser => 13,
            Self::NoMoreAuthMethodsAvailable => 14,
            Self::IllegalUserName => 15,
            Self::Other(code) => code,
        }
    }

    /// The reason for a wire value.
    pub fn from_u32(code: u32) -> Self {
        match code {
            1 => Self::HostNotAllowedToConnect,
            2 => Self::ProtocolError,
            3 => Self::KeyExchangeFailed,
            4 => Self::Reserved,
            5 => Self::MacError,
            6 => Self::CompressionError,
            7 => Self::ServiceNotAvailable,
            8 => Self::ProtocolVersionNotSupported,
            9 => Self::HostKeyNotVerifiable,
            10 => Self::ConnectionLost,
            11 => Self::ByApplication,
            12 => Self::TooManyConnections,
            13 => Self::AuthCancelledByUser,
            14 => Self::NoMoreAuthMethodsAvailable,
            15 => Self::IllegalUserName,
            code => Self::Other(code),
        }
    }
}

/// The `SSH_MSG_IGNORE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-11.2>.
#[derive(Debug, Default, Clone)]
pub struct Ignore {
    /// A random blob of data to ignore.
    pub data: Vec<u8>,
}

impl Message for Ignore {
    const ID: u8 = 2;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.string(&self.data);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            data: decoder.string()?.to_vec(),
        })
    }
}

/// The `SSH_MSG_UNIMPLEMENTED` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-11.4>.
#[derive(Debug, Clone)]
pub struct Unimplemented {
    /// Packet sequence number of rejected message.
    pub seq: u32,
}

impl Message for Unimplemented {
    const ID: u8 = 3;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.u32(self.seq);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            seq: decoder.u32()?,
        })
    }
}

/// The `SSH_MSG_DEBUG` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-11.3>.
#[derive(Debug, Default, Clone)]
pub struct Debug {
    /// Whether the debug data should be forcefully displayed.
    pub always_display: bool,

    /// The debug message.
    pub message: String,

    /// Language tag.
    pub language: String,
}

impl Message for Debug {
    const ID: u8 = 4;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .boolean(self.always_display)
            .string(&self.message)
            .string(&self.language);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            always_display: decoder.boolean()?,
            message: decoder.utf8()?,
            language: decoder.utf8()?,
        })
    }
}

/// The `SSH_MSG_SERVICE_REQUEST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-10>.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    /// The service name to request.
    pub service_name: String,
}

impl Message for ServiceRequest {
    const ID: u8 = 5;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.string(&self.service_name);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            service_name: decoder.utf8()?,
        })
    }
}

/// The `SSH_MSG_SERVICE_ACCEPT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-10>.
#[derive(Debug, Clone)]
pub struct ServiceAccept {
    /// Service name accepted to be requested.
    pub service_name: String,
}

impl Message for ServiceAccept {
    const ID: u8 = 6;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.string(&self.service_name);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            service_name: decoder.utf8()?,
        })
    }
}

/// The `SSH_MSG_KEXINIT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-7.1>.
#[derive(Debug, Clone)]
pub struct KexInit {
    /// The kex-init cookie.
    pub cookie: [u8; 16],

    /// Kex algorithms.
    pub kex_algorithms: NameList,

    /// Server host-key algorithms.
    pub server_host_key_algorithms: NameList,

    /// Client -> server encryption algorithms.
    pub encryption_algorithms_client_to_server: NameList,

    /// Server -> client encryption algorithms.
    pub encryption_algorithms_server_to_client: NameList,

    /// Client -> server MAC algorithms.
    pub mac_algorithms_client_to_server: NameList,

    /// Server -> client MAC algorithms.
    pub mac_algorithms_server_to_client: NameList,

    /// Client -> server compression algorithms.
    pub compression_algorithms_client_to_server: NameList,

    /// Server -> client compression algorithms.
    pub compression_algorithms_server_to_client: NameList,

    /// Client -> server languages.
    pub languages_client_to_server: NameList,

    /// Server -> client languages.
    pub languages_server_to_client: NameList,

    /// Whether the first kex packet follows.
    pub first_kex_packet_follows: bool,
}

impl Message for KexInit {
    const ID: u8 = 20;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .raw(self.cookie)
            .name_list(&self.kex_algorithms)
            .name_list(&self.server_host_key_algorithms)
            .name_list(&self.encryption_algorithms_client_to_server)
            .name_list(&self.encryption_algorithms_server_to_client)
            .name_list(&self.mac_algorithms_client_to_server)
            .name_list(&self.mac_algorithms_server_to_client)
            .name_list(&self.compression_algorithms_client_to_server)
            .name_list(&self.compression_algorithms_server_to_client)
            .name_list(&self.languages_client_to_server)
            .name_list(&self.languages_server_to_client)
            .boolean(self.first_kex_packet_follows)
            .u32(0); // reserved
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut cookie = [0u8; 16];
        cookie.copy_from_slice(decoder.raw(16)?);

        let message = Self {
            cookie,
            kex_algorithms: decoder.name_list()?,
            server_host_key_algorithms: decoder.name_list()?,
            encryption_algorithms_client_to_server: decoder.name_list()?,
            encryption_algorithms_server_to_client: decoder.name_list()?,
            mac_algorithms_client_to_server: decoder.name_list()?,
            mac_algorithms_server_to_client: decoder.name_list()?,
            compression_algorithms_client_to_server: decoder.name_list()?,
            compression_algorithms_server_to_client: decoder.name_list()?,
            languages_client_to_server: decoder.name_list()?,
            languages_server_to_client: decoder.name_list()?,
            first_kex_packet_follows: decoder.boolean()?,
        };
        decoder.u32()?; // reserved

        Ok(message)
    }
}

/// The `SSH_MSG_NEWKEYS` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4253#section-7.3>.
#[derive(Debug, Default, Clone)]
pub struct NewKeys;

impl Message for NewKeys {
    const ID: u8 = 21;

    fn encode(&self, _encoder: &mut Encoder) {}

    fn decode(_decoder: &mut Decoder) -> Result<Self> {
        Ok(Self)
    }
}

/// The `SSH_MSG_KEX_ECDH_INIT` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc5656#section-4>.
#[derive(Debug, Clone)]
pub struct KexEcdhInit {
    /// Client's ephemeral public key octet string.
    pub q_c: Vec<u8>,
}

impl Message for KexEcdhInit {
    const ID: u8 = 30;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.string(&self.q_c);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            q_c: decoder.string()?.to_vec(),
        })
    }
}

/// The `SSH_MSG_KEX_ECDH_REPLY` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc5656#section-4>.
#[derive(Debug, Clone)]
pub struct KexEcdhReply {
    /// Server's public host key.
    pub k_s: Vec<u8>,

    /// Server's ephemeral public key octet string.
    pub q_s: Vec<u8>,

    /// Signature of the exchange hash.
    pub signature: Vec<u8>,
}

impl Message for KexEcdhReply {
    const ID: u8 = 31;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .string(&self.k_s)
            .string(&self.q_s)
            .string(&self.signature);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            k_s: decoder.string()?.to_vec(),
            q_s: decoder.string()?.to_vec(),
            signature: decoder.string()?.to_vec(),
        })
    }
}
