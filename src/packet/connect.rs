//! Messages of the **connection** (`SSH-CONNECT`) part of the protocol,
//! from RFC 4254.

use crate::Result;

use super::{
    arch::{Decoder, Encoder},
    Message,
};

/// The `SSH_MSG_CHANNEL_OPEN` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.1>.
#[derive(Debug, Clone)]
pub struct ChannelOpen {
    /// The channel type to open.
    pub channel_type: String,

    /// Sender's channel identifier.
    pub sender_channel: u32,

    /// Initial window size, in bytes.
    pub initial_window_size: u32,

    /// Maximum packet size, in bytes.
    pub maximum_packet_size: u32,

    /// Channel-type specific payload, kept raw.
    pub data: Vec<u8>,
}

impl Message for ChannelOpen {
    const ID: u8 = 90;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .string(&self.channel_type)
            .u32(self.sender_channel)
            .u32(self.initial_window_size)
            .u32(self.maximum_packet_size)
            .raw(&self.data);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            channel_type: decoder.utf8()?,
            sender_channel: decoder.u32()?,
            initial_window_size: decoder.u32()?,
            maximum_packet_size: decoder.u32()?,
            data: decoder.rest().to_vec(),
        })
    }
}

/// The `SSH_MSG_CHANNEL_OPEN_CONFIRMATION` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.1>.
#[derive(Debug, Clone)]
pub struct ChannelOpenConfirmation {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,

    /// Sender's channel identifier.
    pub sender_channel: u32,

    /// Initial window size, in bytes.
    pub initial_window_size: u32,

    /// Maximum packet size, in bytes.
    pub maximum_packet_size: u32,
}

impl Message for ChannelOpenConfirmation {
    const ID: u8 = 91;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .u32(self.recipient_channel)
            .u32(self.sender_channel)
            .u32(self.initial_window_size)
            .u32(self.maximum_packet_size);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
            sender_channel: decoder.u32()?,
            initial_window_size: decoder.u32()?,
            maximum_packet_size: decoder.u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_OPEN_FAILURE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.1>.
#[derive(Debug, Clone)]
pub struct ChannelOpenFailure {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,

    /// Reason the open was rejected.
    pub reason: ChannelOpenFailureReason,

    /// Description of the rejection.
    pub description: String,

    /// Language tag.
    pub language: String,
}

impl Message for ChannelOpenFailure {
    const ID: u8 = 92;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .u32(self.recipient_channel)
            .u32(self.reason.to_u32())
            .string(&self.description)
            .string(&self.language);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
            reason: ChannelOpenFailureReason::from_u32(decoder.u32()?),
            description: decoder.utf8()?,
            language: decoder.utf8()?,
        })
    }
}

/// The `reason` in a [`ChannelOpenFailure`] message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOpenFailureReason {
    /// `SSH_OPEN_ADMINISTRATIVELY_PROHIBITED`.
    AdministrativelyProhibited,

    /// `SSH_OPEN_CONNECT_FAILED`.
    ConnectFailed,

    /// `SSH_OPEN_UNKNOWN_CHANNEL_TYPE`.
    UnknownChannelType,

    /// `SSH_OPEN_RESOURCE_SHORTAGE`.
    ResourceShortage,

    /// Any other rejection reason, may be non-standard.
    Other(u32),
}

impl ChannelOpenFailureReason {
    /// The wire value of this reason.
    pub fn to_u32(self) -> u32 {
        match self {
            Self::AdministrativelyProhibited => 1,
            Self::ConnectFailed => 2,
            Self::UnknownChannelType => 3,
            Self::ResourceShortage => 4,
            Self::Other(code) => code,
        }
    }

    /// The reason for a wire value.
    pub fn from_u32(code: u32) -> Self {
        match code {
            1 => Self::AdministrativelyProhibited,
            2 => Self::ConnectFailed,
            3 => Self::UnknownChannelType,
            4 => Self::ResourceShortage,
            code => Self::Other(code),
        }
    }
}

/// The `SSH_MSG_CHANNEL_WINDOW_ADJUST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.2>.
#[derive(Debug, Clone)]
pub struct ChannelWindowAdjust {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,

    /// Number of bytes added to the window.
    pub bytes_to_add: u32,
}

impl Message for ChannelWindowAdjust {
    const ID: u8 = 93;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.u32(self.recipient_channel).u32(self.bytes_to_add);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
            bytes_to_add: decoder.u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_DATA` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.2>.
#[derive(Debug, Clone)]
pub struct ChannelData {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,

    /// The data itself.
    pub data: Vec<u8>,
}

impl Message for ChannelData {
    const ID: u8 = 94;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.u32(self.recipient_channel).string(&self.data);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
            data: decoder.string()?.to_vec(),
        })
    }
}

/// The `SSH_MSG_CHANNEL_EOF` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.3>.
#[derive(Debug, Clone)]
pub struct ChannelEof {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,
}

impl Message for ChannelEof {
    const ID: u8 = 96;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.u32(self.recipient_channel);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_CLOSE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.3>.
#[derive(Debug, Clone)]
pub struct ChannelClose {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,
}

impl Message for ChannelClose {
    const ID: u8 = 97;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.u32(self.recipient_channel);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_REQUEST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.4>.
#[derive(Debug, Clone)]
pub struct ChannelRequest {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,

    /// The request type.
    pub request_type: String,

    /// Whether the sender wants an explicit reply.
    pub want_reply: bool,

    /// Request-type specific payload, kept raw.
    pub data: Vec<u8>,
}

impl Message for ChannelRequest {
    const ID: u8 = 98;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .u32(self.recipient_channel)
            .string(&self.request_type)
            .boolean(self.want_reply)
            .raw(&self.data);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
            request_type: decoder.utf8()?,
            want_reply: decoder.boolean()?,
            data: decoder.rest().to_vec(),
        })
    }
}

/// The `SSH_MSG_CHANNEL_SUCCESS` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.4>.
#[derive(Debug, Clone)]
pub struct ChannelSuccess {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,
}

impl Message for ChannelSuccess {
    const ID: u8 = 99;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.u32(self.recipient_channel);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
        })
    }
}

/// The `SSH_MSG_CHANNEL_FAILURE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4254#section-5.4>.
#[derive(Debug, Clone)]
pub struct ChannelFailure {
    /// Recipient's channel identifier.
    pub recipient_channel: u32,
}

impl Message for ChannelFailure {
    const ID: u8 = 100;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.u32(self.recipient_channel);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            recipient_channel: decoder.u32()?,
        })
    }
}
