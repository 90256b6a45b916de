//! The services running on top of the transport: authentication, then the
//! connection protocol.

use crate::{session::Session, Pipe, Result};

pub mod connect;
pub mod userauth;

pub use userauth::Auth;

/// Drive one authenticated session to completion: the `ssh-userauth`
/// service gates the `ssh-connection` service.
pub fn run(session: &mut Session<impl Pipe>, auth: &Auth) -> Result<()> {
    auth.run(session)?;
    connect::run(session)
}
