//! `nanosshd` — an SSH server that serves one connection at a time,
//! greets, and hangs up.

use std::net::{TcpListener, TcpStream};

use nanossh::{
    crypto::ed25519::SigningKey,
    service::{self, Auth},
    session::{Server, Session},
    Error,
};

/// Where the server listens; embedded deployments change this constant.
const LISTEN_ADDR: &str = "127.0.0.1:2222";

/// The compiled-in credentials.
const USERNAME: &str = "user";
const PASSWORD: &str = "password123";

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    // The host key lives for the process; peers see a fresh fingerprint on
    // every restart.
    let hostkey = SigningKey::random(&mut rand::rngs::OsRng)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let listener = TcpListener::bind(LISTEN_ADDR)?;
    tracing::info!("Listening on `{LISTEN_ADDR}`");

    loop {
        let (stream, addr) = listener.accept()?;
        tracing::info!("Connection from `{addr}`");

        serve(stream, &hostkey);
    }
}

/// Handle one connection to completion, reporting the disconnect reason to
/// the peer when one applies.
fn serve(stream: TcpStream, hostkey: &SigningKey) {
    let server = Server {
        keys: vec![hostkey.clone()],
        ..Default::default()
    };

    let mut session = match Session::new(stream, server) {
        Ok(session) => session,
        Err(err) => {
            tracing::error!("Session setup failed: {err}");
            return;
        }
    };

    let auth = Auth::new(USERNAME, PASSWORD);
    match service::run(&mut session, &auth) {
        Ok(()) => tracing::info!("Session with `{}` ended cleanly", session.peer_id()),
        Err(Error::Disconnected(disconnected)) => {
            tracing::info!("{disconnected}");
        }
        Err(err) => {
            if let Some(reason) = err.disconnect_reason() {
                let _ = session.disconnect(reason, err.to_string());
            }

            tracing::error!("Session with `{}` errored: {err}", session.peer_id());
        }
    }
}
