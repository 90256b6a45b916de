#![allow(clippy::unwrap_used)]

//! An in-process, raw-protocol SSH client, just capable enough to exercise
//! the server end-to-end over loopback TCP.

use std::{
    net::{SocketAddr, TcpListener, TcpStream},
    thread::{self, JoinHandle},
};

use rand::RngCore;

use nanossh::{
    algorithm::{Cipher, Hmac},
    crypto::{ed25519::SigningKey, x25519},
    packet::{
        arch::NameList,
        trans::{KexEcdhInit, KexEcdhReply, KexInit, NewKeys},
        userauth, Id, Message, Packet,
    },
    service::{self, Auth},
    session::{Server, Session},
    stream::{Keys, Stream, Transport, TransportPair},
    Error,
};

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "password123";

/// Spawn a server handling exactly one connection, returning its address
/// and the handle to its outcome.
pub fn server() -> (SocketAddr, JoinHandle<Result<(), Error>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept()?;

        let server = Server {
            keys: vec![SigningKey::random(&mut rand::rngs::OsRng).unwrap()],
            ..Default::default()
        };

        let mut session = Session::new(stream, server)?;
        let auth = Auth::new(USERNAME, PASSWORD);

        let result = service::run(&mut session, &auth);
        if let Err(err) = &result {
            if let Some(reason) = err.disconnect_reason() {
                let _ = session.disconnect(reason, err.to_string());
            }
        }

        result
    });

    (addr, handle)
}

/// The client's half of a connection, with a spare raw handle on the
/// socket for byte-level meddling.
pub struct Client {
    pub stream: Stream<TcpStream>,
    pub raw: TcpStream,

    id: Id,
    peer_id: Id,

    /// `(K, H)` of the completed key exchange.
    pub exchange: Option<([u8; 32], [u8; 32])>,
}

impl Client {
    /// Connect and exchange identification lines.
    pub fn connect(addr: SocketAddr) -> Self {
        let mut tcp = TcpStream::connect(addr).unwrap();
        let raw = tcp.try_clone().unwrap();

        let id = Id::v2("test_0.1.0", None::<&str>);
        std::io::Write::write_all(&mut tcp, format!("{id}\r\n").as_bytes()).unwrap();

        let peer_id = Id::from_reader(&mut tcp).unwrap();

        Self {
            stream: Stream::new(tcp),
            raw,
            id,
            peer_id,
            exchange: None,
        }
    }

    /// The KEXINIT this client proposes: the server's suite, nothing more.
    fn kexinit() -> KexInit {
        let mut cookie = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut cookie);

        KexInit {
            cookie,
            kex_algorithms: NameList::from_iter(["curve25519-sha256"]),
            server_host_key_algorithms: NameList::from_iter(["ssh-ed25519"]),
            encryption_algorithms_client_to_server: NameList::from_iter(["aes128-ctr"]),
            encryption_algorithms_server_to_client: NameList::from_iter(["aes128-ctr"]),
            mac_algorithms_client_to_server: NameList::from_iter(["hmac-sha2-256"]),
            mac_algorithms_server_to_client: NameList::from_iter(["hmac-sha2-256"]),
            compression_algorithms_client_to_server: NameList::from_iter(["none"]),
            compression_algorithms_server_to_client: NameList::from_iter(["none"]),
            languages_client_to_server: NameList::default(),
            languages_server_to_client: NameList::default(),
            first_kex_packet_follows: false,
        }
    }

    /// Exchange KEXINIT messages, returning both raw payloads.
    pub fn exchange_kexinit(&mut self) -> (Packet, Packet) {
        let i_c = Packet::from(&Self::kexinit());
        self.stream.send_packet(&i_c).unwrap();

        let i_s = self.stream.recv().unwrap();
        assert_eq!(i_s.message_id(), Some(KexInit::ID));

        (i_c, i_s)
    }

    /// Run the whole key exchange with a fresh ephemeral key.
    pub fn handshake(&mut self) {
        let mut scalar = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut scalar);

        let (i_c, i_s) = self.exchange_kexinit();
        self.ecdh(&scalar, &i_c, &i_s);
    }

    /// Drive the ECDH phase with a given ephemeral scalar and install the
    /// derived transports.
    pub fn ecdh(&mut self, scalar: &[u8; 32], i_c: &Packet, i_s: &Packet) {
        let q_c = x25519::scalarmult_base(scalar);
        self.stream.send(&KexEcdhInit { q_c: q_c.to_vec() }).unwrap();

        let reply: KexEcdhReply = self.stream.recv().unwrap().to().unwrap();
        let q_s: [u8; 32] = reply.q_s.as_slice().try_into().unwrap();

        let secret = x25519::diffie_hellman(scalar, &q_s).unwrap();

        let mut exchange = nanossh::packet::arch::Encoder::new();
        exchange
            .string(self.id.to_string())
            .string(self.peer_id.to_string())
            .string(i_c.payload())
            .string(i_s.payload())
            .string(&reply.k_s)
            .string(q_c)
            .string(q_s)
            .mpint(&secret);
        let hash = nanossh::crypto::sha256::sha256(exchange.as_bytes());

        let newkeys = self.stream.recv().unwrap();
        assert_eq!(newkeys.message_id(), Some(NewKeys::ID));
        self.stream.send(&NewKeys).unwrap();

        let session_id = self.stream.with_session(&hash).to_vec();
        self.stream.with_transport(TransportPair {
            tx: Transport::new(
                Cipher::Aes128Ctr,
                Hmac::HmacSha256,
                Keys::as_client(&secret, &hash, &session_id, &Cipher::Aes128Ctr, &Hmac::HmacSha256),
            ),
            rx: Transport::new(
                Cipher::Aes128Ctr,
                Hmac::HmacSha256,
                Keys::as_server(&secret, &hash, &session_id, &Cipher::Aes128Ctr, &Hmac::HmacSha256),
            ),
        });

        self.exchange = Some((secret, hash));
    }

    /// Request the `ssh-userauth` service.
    pub fn request_userauth(&mut self) {
        use nanossh::packet::trans::{ServiceAccept, ServiceRequest};

        self.stream
            .send(&ServiceRequest {
                service_name: "ssh-userauth".into(),
            })
            .unwrap();

        let accept: ServiceAccept = self.stream.recv().unwrap().to().unwrap();
        assert_eq!(accept.service_name, "ssh-userauth");
    }

    /// Attempt a password authentication; true on success.
    pub fn authenticate(&mut self, username: &str, password: &str) -> bool {
        self.stream
            .send(&userauth::Request {
                username: username.into(),
                service_name: "ssh-connection".into(),
                method: userauth::Method::Password {
                    password: password.into(),
                    new: None,
                },
            })
            .unwrap();

        let reply = self.stream.recv().unwrap();
        match reply.message_id() {
            Some(userauth::Success::ID) => true,
            Some(userauth::Failure::ID) => {
                let failure: userauth::Failure = reply.to().unwrap();
                assert!(failure.continue_with.contains("password"));
                assert!(!failure.partial_success);

                false
            }
            other => panic!("unexpected authentication reply: {other:?}"),
        }
    }
}
