//! The `ssh-connection` service: a single `session` channel that greets
//! the peer and closes, from RFC 4254.

use crate::{
    packet::{
        connect::{
            ChannelClose, ChannelData, ChannelEof, ChannelFailure, ChannelOpen,
            ChannelOpenConfirmation, ChannelOpenFailure, ChannelOpenFailureReason,
            ChannelRequest, ChannelSuccess,
        },
        trans::DisconnectReason,
        Message,
    },
    session::Session,
    Error, Pipe, Result,
};

/// What a `session` channel writes before closing.
const GREETING: &[u8] = b"Hello World\r\n";

/// Our receive window, in bytes.
const LOCAL_WINDOW: u32 = 32768;

/// The largest data packet we accept, in bytes.
const LOCAL_MAXPACK: u32 = 16384;

/// The one channel this server ever opens, always numbered 0 on our side.
struct Channel {
    local_id: u32,

    remote_id: u32,
    remote_window: u32,
    remote_maxpack: u32,
}

/// Serve the connection service: accept one `session` channel, honor its
/// requests until a shell or exec is started, write the greeting and close.
pub fn run(session: &mut Session<impl Pipe>) -> Result<()> {
    let open: ChannelOpen = match session.recv()?.to() {
        Ok(open) => open,
        Err(Error::UnexpectedMessage) => {
            return Err(session
                .disconnect(
                    DisconnectReason::ProtocolError,
                    "Expected a channel open to start the connection service",
                )?
                .into());
        }
        Err(err) => return Err(err),
    };

    if open.channel_type != "session" {
        tracing::warn!("Peer tried to open a `{}` channel", open.channel_type);

        session.send(&ChannelOpenFailure {
            recipient_channel: open.sender_channel,
            reason: ChannelOpenFailureReason::UnknownChannelType,
            description: "Unknown channel type".into(),
            language: String::new(),
        })?;
        let _ = session.disconnect(
            DisconnectReason::ProtocolError,
            "Only `session` channels are supported",
        )?;

        return Err(Error::UnknownChannelType);
    }

    let mut channel = Channel {
        local_id: 0,
        remote_id: open.sender_channel,
        remote_window: open.initial_window_size,
        remote_maxpack: open.maximum_packet_size,
    };

    session.send(&ChannelOpenConfirmation {
        recipient_channel: channel.remote_id,
        sender_channel: channel.local_id,
        initial_window_size: LOCAL_WINDOW,
        maximum_packet_size: LOCAL_MAXPACK,
    })?;

    tracing::debug!(
        "Opened channel {}:{} (window {}, max packet {})",
        channel.local_id,
        channel.remote_id,
        channel.remote_window,
        channel.remote_maxpack,
    );

    let ready = requests(session, &channel)?;
    if ready {
        write_greeting(session, &mut channel)?;
    }

    close(session, &channel)
}

/// Consume channel requests until a `shell` or `exec` marks the channel
/// data-ready, or a foreign message leaves the loop.
fn requests(session: &mut Session<impl Pipe>, channel: &Channel) -> Result<bool> {
    loop {
        let packet = session.recv()?;
        if packet.message_id() != Some(ChannelRequest::ID) {
            // Not ours to handle; put it back for the close sequence.
            session.requeue(packet)?;

            return Ok(false);
        }

        let request: ChannelRequest = packet.to()?;
        if request.recipient_channel != channel.local_id {
            return Err(session
                .disconnect(
                    DisconnectReason::ProtocolError,
                    "Channel request for an unknown channel",
                )?
                .into());
        }

        tracing::debug!(
            "Channel request `{}` (want_reply: {})",
            request.request_type,
            request.want_reply,
        );

        let (accepted, ready) = match request.request_type.as_str() {
            // Accepted for compatibility; this server allocates no terminal
            // and keeps no environment.
            "pty-req" | "env" => (true, false),
            "shell" | "exec" => (true, true),
            _ => (false, false),
        };

        if request.want_reply {
            if accepted {
                session.send(&ChannelSuccess {
                    recipient_channel: channel.remote_id,
                })?;
            } else {
                session.send(&ChannelFailure {
                    recipient_channel: channel.remote_id,
                })?;
            }
        }

        if ready {
            return Ok(true);
        }
    }
}

/// Write the greeting as a single `SSH_MSG_CHANNEL_DATA`.
fn write_greeting(session: &mut Session<impl Pipe>, channel: &mut Channel) -> Result<()> {
    let length = GREETING.len() as u32;
    if length > channel.remote_window {
        // A compliant sender would wait for a window adjust; at thirteen
        // bytes we send anyway and let the peer cope.
        tracing::warn!(
            "Peer window is only {} bytes, sending {length} anyway",
            channel.remote_window,
        );
    }

    session.send(&ChannelData {
        recipient_channel: channel.remote_id,
        data: GREETING.to_vec(),
    })?;
    channel.remote_window = channel.remote_window.saturating_sub(length);

    Ok(())
}

/// Tear the channel down: EOF, then close, then read the peer's close if
/// it sends one before hanging up.
fn close(session: &mut Session<impl Pipe>, channel: &Channel) -> Result<()> {
    session.send(&ChannelEof {
        recipient_channel: channel.remote_id,
    })?;
    session.send(&ChannelClose {
        recipient_channel: channel.remote_id,
    })?;

    match session.recv() {
        Ok(packet) if packet.message_id() == Some(ChannelClose::ID) => {
            tracing::debug!("Peer closed channel {}:{}", channel.local_id, channel.remote_id);
        }
        // The peer may drop the connection instead of closing the channel.
        Ok(_) | Err(_) => (),
    }

    Ok(())
}
