#![allow(clippy::unwrap_used)]

//! End-to-end exercises of the server over loopback TCP, one scenario per
//! test.

use std::io::Write;
use std::net::TcpStream;

use nanossh::{
    algorithm::{Cipher, Hmac},
    packet::{
        connect::{
            ChannelClose, ChannelData, ChannelEof, ChannelOpen, ChannelOpenConfirmation,
            ChannelOpenFailure, ChannelOpenFailureReason, ChannelRequest, ChannelSuccess,
        },
        trans::{Disconnect, DisconnectReason, Ignore, KexEcdhInit, ServiceRequest},
        Id, Packet,
    },
    stream::{Keys, Stream, Transport},
    Error,
};

mod common;
use common::{Client, PASSWORD, USERNAME};

#[test_log::test]
fn it_greets_and_closes_cleanly() {
    let (addr, handle) = common::server();
    let mut client = Client::connect(addr);

    client.handshake();
    client.request_userauth();
    assert!(client.authenticate(USERNAME, PASSWORD));

    client
        .stream
        .send(&ChannelOpen {
            channel_type: "session".into(),
            sender_channel: 0,
            initial_window_size: 2097152,
            maximum_packet_size: 32768,
            data: Vec::new(),
        })
        .unwrap();

    let confirm: ChannelOpenConfirmation = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(confirm.recipient_channel, 0);
    assert_eq!(confirm.sender_channel, 0);
    assert_eq!(confirm.initial_window_size, 32768);
    assert_eq!(confirm.maximum_packet_size, 16384);

    client
        .stream
        .send(&ChannelRequest {
            recipient_channel: confirm.sender_channel,
            request_type: "shell".into(),
            want_reply: true,
            data: Vec::new(),
        })
        .unwrap();

    let success: ChannelSuccess = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(success.recipient_channel, 0);

    let data: ChannelData = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(data.data, b"Hello World\r\n");

    let eof: ChannelEof = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(eof.recipient_channel, 0);
    let close: ChannelClose = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(close.recipient_channel, 0);

    client
        .stream
        .send(&ChannelClose {
            recipient_channel: confirm.sender_channel,
        })
        .unwrap();

    assert!(handle.join().unwrap().is_ok());
}

#[test_log::test]
fn it_accepts_pty_env_and_exec_requests() {
    let (addr, handle) = common::server();
    let mut client = Client::connect(addr);

    client.handshake();
    client.request_userauth();
    assert!(client.authenticate(USERNAME, PASSWORD));

    client
        .stream
        .send(&ChannelOpen {
            channel_type: "session".into(),
            sender_channel: 7,
            initial_window_size: 4096,
            maximum_packet_size: 4096,
            data: Vec::new(),
        })
        .unwrap();
    let confirm: ChannelOpenConfirmation = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(confirm.recipient_channel, 7);

    // pty-req, accepted without a reply requested.
    client
        .stream
        .send(&ChannelRequest {
            recipient_channel: 0,
            request_type: "pty-req".into(),
            want_reply: false,
            data: Vec::new(),
        })
        .unwrap();

    // env is accepted and ignored.
    let mut env = nanossh::packet::arch::Encoder::new();
    env.string("LANG").string("C.UTF-8");
    client
        .stream
        .send(&ChannelRequest {
            recipient_channel: 0,
            request_type: "env".into(),
            want_reply: false,
            data: env.into_bytes(),
        })
        .unwrap();

    // exec carries a command this server ignores.
    let mut command = nanossh::packet::arch::Encoder::new();
    command.string("uname -a");
    client
        .stream
        .send(&ChannelRequest {
            recipient_channel: 0,
            request_type: "exec".into(),
            want_reply: true,
            data: command.into_bytes(),
        })
        .unwrap();

    let success: ChannelSuccess = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(success.recipient_channel, 7);

    let data: ChannelData = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(data.data, b"Hello World\r\n");

    assert!(client.stream.recv().unwrap().to::<ChannelEof>().is_ok());
    assert!(client.stream.recv().unwrap().to::<ChannelClose>().is_ok());

    client
        .stream
        .send(&ChannelClose {
            recipient_channel: 0,
        })
        .unwrap();

    assert!(handle.join().unwrap().is_ok());
}

#[test_log::test]
fn it_rejects_an_ssh1_peer() {
    let (addr, handle) = common::server();

    let mut tcp = TcpStream::connect(addr).unwrap();
    let _server_id = Id::from_reader(&mut tcp).unwrap();

    tcp.write_all(b"SSH-1.99-foo\r\n").unwrap();

    let disconnect: Disconnect = Stream::new(tcp).recv().unwrap().to().unwrap();
    assert_eq!(
        disconnect.reason,
        DisconnectReason::ProtocolVersionNotSupported
    );

    assert!(matches!(
        handle.join().unwrap(),
        Err(Error::UnsupportedVersion)
    ));
}

#[test_log::test]
fn it_rejects_an_unterminated_version_line() {
    let (addr, handle) = common::server();

    let mut tcp = TcpStream::connect(addr).unwrap();
    let _server_id = Id::from_reader(&mut tcp).unwrap();

    tcp.write_all(&[b'a'; 300]).unwrap();

    let disconnect: Disconnect = Stream::new(tcp).recv().unwrap().to().unwrap();
    assert_eq!(disconnect.reason, DisconnectReason::ProtocolError);

    assert!(matches!(handle.join().unwrap(), Err(Error::Malformed)));
}

#[test_log::test]
fn it_lets_a_wrong_password_retry() {
    let (addr, handle) = common::server();
    let mut client = Client::connect(addr);

    client.handshake();
    client.request_userauth();

    assert!(!client.authenticate(USERNAME, "wrong"));
    assert!(!client.authenticate("mallory", PASSWORD));
    assert!(client.authenticate(USERNAME, PASSWORD));

    client
        .stream
        .send(&ChannelOpen {
            channel_type: "session".into(),
            sender_channel: 0,
            initial_window_size: 2097152,
            maximum_packet_size: 32768,
            data: Vec::new(),
        })
        .unwrap();
    assert!(client
        .stream
        .recv()
        .unwrap()
        .to::<ChannelOpenConfirmation>()
        .is_ok());

    client
        .stream
        .send(&ChannelRequest {
            recipient_channel: 0,
            request_type: "shell".into(),
            want_reply: false,
            data: Vec::new(),
        })
        .unwrap();

    let data: ChannelData = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(data.data, b"Hello World\r\n");

    drop(client);
    let _ = handle.join().unwrap();
}

#[test_log::test]
fn it_refuses_unknown_services() {
    let (addr, handle) = common::server();
    let mut client = Client::connect(addr);

    client.handshake();
    client
        .stream
        .send(&ServiceRequest {
            service_name: "ssh-bogus".into(),
        })
        .unwrap();

    let disconnect: Disconnect = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(disconnect.reason, DisconnectReason::ServiceNotAvailable);

    assert!(matches!(
        handle.join().unwrap(),
        Err(Error::Disconnected(_))
    ));
}

#[test_log::test]
fn it_refuses_unknown_channel_types() {
    let (addr, handle) = common::server();
    let mut client = Client::connect(addr);

    client.handshake();
    client.request_userauth();
    assert!(client.authenticate(USERNAME, PASSWORD));

    client
        .stream
        .send(&ChannelOpen {
            channel_type: "direct-tcpip".into(),
            sender_channel: 4,
            initial_window_size: 2097152,
            maximum_packet_size: 32768,
            data: Vec::new(),
        })
        .unwrap();

    let failure: ChannelOpenFailure = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(failure.recipient_channel, 4);
    assert_eq!(failure.reason, ChannelOpenFailureReason::UnknownChannelType);

    let disconnect: Disconnect = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(disconnect.reason, DisconnectReason::ProtocolError);

    assert!(matches!(
        handle.join().unwrap(),
        Err(Error::UnknownChannelType)
    ));
}

#[test_log::test]
fn it_tears_down_on_a_tampered_record() {
    let (addr, handle) = common::server();
    let mut client = Client::connect(addr);

    client.handshake();
    let (secret, hash) = client.exchange.unwrap();

    // Rebuild the client-to-server transport to forge one record by hand.
    let mut transport = Transport::new(
        Cipher::Aes128Ctr,
        Hmac::HmacSha256,
        Keys::as_client(&secret, &hash, &hash, &Cipher::Aes128Ctr, &Hmac::HmacSha256),
    );

    let payload = Packet::from(&Ignore { data: vec![0; 16] });
    let mut record = transport.pad(payload.payload());
    // The client has sent KEXINIT, KEX_ECDH_INIT and NEWKEYS: this record
    // is sequence number 3.
    let mac = transport.seal(3, &record);
    transport.encrypt(&mut record).unwrap();

    record[20] ^= 0x01;

    client.raw.write_all(&record).unwrap();
    client.raw.write_all(&mac).unwrap();

    // The server detects the mismatch and reports it while its own
    // direction is still intact.
    match client.stream.recv() {
        Ok(packet) => {
            let disconnect: Disconnect = packet.to().unwrap();
            assert_eq!(disconnect.reason, DisconnectReason::MacError);
        }
        Err(_) => (), // an abrupt close is acceptable too
    }

    assert!(matches!(handle.join().unwrap(), Err(Error::Mac)));
}

#[test_log::test]
fn it_aborts_on_a_weak_ecdh_point() {
    let (addr, handle) = common::server();
    let mut client = Client::connect(addr);

    client.exchange_kexinit();
    client
        .stream
        .send(&KexEcdhInit { q_c: vec![0; 32] })
        .unwrap();

    let disconnect: Disconnect = client.stream.recv().unwrap().to().unwrap();
    assert_eq!(disconnect.reason, DisconnectReason::KeyExchangeFailed);

    assert!(matches!(handle.join().unwrap(), Err(Error::KexError)));
}
