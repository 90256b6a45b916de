//! Messages of the **authentication** (`SSH-USERAUTH`) part of the
//! protocol, from RFC 4252.

use crate::Result;

use super::{
    arch::{Decoder, Encoder, NameList},
    Message,
};

/// The `SSH_MSG_USERAUTH_REQUEST` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-5>.
#[derive(Debug, Clone)]
pub struct Request {
    /// The user name to authenticate as.
    pub username: String,

    /// The service to start after authentication.
    pub service_name: String,

    /// The authentication method and its payload.
    pub method: Method,
}

/// An authentication method inside a [`Request`].
#[derive(Debug, Clone)]
pub enum Method {
    /// The `none` method, probing for viable methods.
    None,

    /// The `password` method.
    Password {
        /// The password to check.
        password: String,

        /// The replacement password of a change request.
        new: Option<String>,
    },

    /// Any method this server does not implement; the payload is dropped.
    Other {
        /// The method name.
        method: String,
    },
}

impl Message for Request {
    const ID: u8 = 50;

    fn encode(&self, encoder: &mut Encoder) {
        encoder.string(&self.username).string(&self.service_name);

        match &self.method {
            Method::None => {
                encoder.string("none");
            }
            Method::Password { password, new } => {
                encoder
                    .string("password")
                    .boolean(new.is_some())
                    .string(password);
                if let Some(new) = new {
                    encoder.string(new);
                }
            }
            Method::Other { method } => {
                encoder.string(method);
            }
        }
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        let username = decoder.utf8()?;
        let service_name = decoder.utf8()?;

        let method = match decoder.string()? {
            b"none" => Method::None,
            b"password" => {
                let change = decoder.boolean()?;
                Method::Password {
                    password: decoder.utf8()?,
                    new: change.then(|| decoder.utf8()).transpose()?,
                }
            }
            method => Method::Other {
                method: String::from_utf8_lossy(method).into_owned(),
            },
        };

        Ok(Self {
            username,
            service_name,
            method,
        })
    }
}

impl Method {
    /// The method name as it appears on the wire.
    pub fn name(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Password { .. } => "password",
            Self::Other { method } => method,
        }
    }
}

/// The `SSH_MSG_USERAUTH_FAILURE` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-5.1>.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Authentication methods that may productively continue the exchange.
    pub continue_with: NameList,

    /// Whether the attempt was a partial success.
    pub partial_success: bool,
}

impl Message for Failure {
    const ID: u8 = 51;

    fn encode(&self, encoder: &mut Encoder) {
        encoder
            .name_list(&self.continue_with)
            .boolean(self.partial_success);
    }

    fn decode(decoder: &mut Decoder) -> Result<Self> {
        Ok(Self {
            continue_with: decoder.name_list()?,
            partial_success: decoder.boolean()?,
        })
    }
}

/// The `SSH_MSG_USERAUTH_SUCCESS` message.
///
/// see <https://datatracker.ietf.org/doc/html/rfc4252#section-5.1>.
#[derive(Debug, Default, Clone)]
pub struct Success;

impl Message for Success {
    const ID: u8 = 52;

    fn encode(&self, _encoder: &mut Encoder) {}

    fn decode(_decoder: &mut Decoder) -> Result<Self> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use crate::packet::Packet;

    use super::*;

    #[test]
    fn it_round_trips_a_password_request() {
        let packet = Packet::from(&Request {
            username: "user".into(),
            service_name: "ssh-connection".into(),
            method: Method::Password {
                password: "password123".into(),
                new: None,
            },
        });

        let decoded: Request = packet.to().expect("decodes");
        assert_eq!(decoded.username, "user");
        assert_eq!(decoded.service_name, "ssh-connection");
        assert!(
            matches!(decoded.method, Method::Password { password, new: None } if password == "password123")
        );
    }

    #[test]
    fn it_keeps_unknown_methods_by_name() {
        let packet = Packet::from(&Request {
            username: "user".into(),
            service_name: "ssh-connection".into(),
            method: Method::Other {
                method: "hostbased".into(),
            },
        });

        let decoded: Request = packet.to().expect("decodes");
        assert_eq!(decoded.method.name(), "hostbased");
    }
}
