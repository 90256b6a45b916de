//! The `ssh-userauth` service: password authentication against a
//! compiled-in credential pair, from RFC 4252.

use crate::{
    packet::{
        arch::NameList,
        trans::{DisconnectReason, ServiceAccept, ServiceRequest},
        userauth,
    },
    session::Session,
    Error, Pipe, Result,
};

const SERVICE_NAME: &str = "ssh-userauth";

/// The service started by a successful authentication.
const CONNECTION_SERVICE: &str = "ssh-connection";

/// The authentication service handler for a session.
#[derive(Debug)]
pub struct Auth {
    username: String,
    password: String,
}

impl Auth {
    /// Create an [`Auth`] accepting exactly one `(username, password)`
    /// pair.
    ///
    /// The comparison is a plain string compare; these credentials are
    /// compiled in and granting access is their whole purpose, so a timing
    /// oracle on them is accepted and documented.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Gate the session behind the service request and the authentication
    /// loop, returning once the peer is authenticated.
    pub fn run(&self, session: &mut Session<impl Pipe>) -> Result<()> {
        let request: ServiceRequest = match session.recv()?.to() {
            Ok(request) => request,
            Err(Error::UnexpectedMessage) => {
                return Err(session
                    .disconnect(
                        DisconnectReason::ProtocolError,
                        "Expected a service request to open the session",
                    )?
                    .into());
            }
            Err(err) => return Err(err),
        };

        if request.service_name != SERVICE_NAME {
            tracing::warn!("Peer requested unknown service `{}`", request.service_name);

            return Err(session
                .disconnect(
                    DisconnectReason::ServiceNotAvailable,
                    "Requested service is unknown",
                )?
                .into());
        }

        session.send(&ServiceAccept {
            service_name: request.service_name,
        })?;

        loop {
            let request: userauth::Request = match session.recv()?.to() {
                Ok(request) => request,
                Err(Error::UnexpectedMessage) => {
                    return Err(session
                        .disconnect(
                            DisconnectReason::ProtocolError,
                            "Unexpected message in the context of the `ssh-userauth` service",
                        )?
                        .into());
                }
                Err(err) => return Err(err),
            };

            tracing::debug!(
                "Attempt using method `{}` for user `{}`",
                request.method.name(),
                request.username,
            );

            match request.method {
                userauth::Method::Password { password, new: None }
                    if request.service_name == CONNECTION_SERVICE
                        && request.username == self.username
                        && password == self.password =>
                {
                    tracing::info!("Authentication success for user `{}`", request.username);
                    session.send(&userauth::Success)?;

                    return Ok(());
                }
                _ => {
                    session.send(&userauth::Failure {
                        continue_with: NameList::from_iter(["password"]),
                        partial_success: false,
                    })?;
                }
            }
        }
    }
}
