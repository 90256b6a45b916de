//! The key-exchange algorithms, and the server side of the exchange itself.

use rand::rngs::OsRng;
use strum::{AsRefStr, EnumString};

use crate::{
    crypto::{ed25519::SigningKey, sha256::sha256, x25519},
    packet::{
        arch::Encoder,
        trans::{KexEcdhInit, KexEcdhReply, KexInit},
        Id,
    },
    stream::{Keys, Stream, Transport, TransportPair},
    Error, Pipe, Result,
};

use super::{cipher, hmac, negotiate};

/// SSH key-exchange algorithms.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Kex {
    /// Curve25519 ECDH with sha-2-256 digest.
    Curve25519Sha256,
}

/// Select the key-exchange algorithm, requiring our single offering to
/// appear in the client's list.
pub(crate) fn negotiate_kex(clientkex: &KexInit, serverkex: &KexInit) -> Result<Kex> {
    negotiate(&clientkex.kex_algorithms, &serverkex.kex_algorithms)
        .ok_or(Error::NoCommonKex)?
        .parse()
        .map_err(|_| Error::NoCommonKex)
}

impl Kex {
    /// Run the server side of the exchange: consume the client's
    /// `SSH_MSG_KEX_ECDH_INIT`, reply with our ephemeral key and the signed
    /// exchange hash, and derive the transports for both directions.
    #[allow(clippy::too_many_arguments)] // The exchange hash binds all of these inputs
    pub(crate) fn as_server(
        &self,
        stream: &mut Stream<impl Pipe>,
        v_c: &Id,
        v_s: &Id,
        i_c: &[u8],
        i_s: &[u8],
        clientkex: &KexInit,
        serverkex: &KexInit,
        key: &SigningKey,
    ) -> Result<TransportPair> {
        if !clientkex
            .server_host_key_algorithms
            .contains(key.algorithm())
        {
            return Err(Error::NoCommonKey);
        }
        if !clientkex
            .compression_algorithms_client_to_server
            .contains("none")
            || !clientkex
                .compression_algorithms_server_to_client
                .contains("none")
        {
            return Err(Error::NoCommonCompression);
        }

        let (client_hmac, server_hmac) = hmac::negotiate_pair(clientkex, serverkex)?;
        let (client_cipher, server_cipher) = cipher::negotiate_pair(clientkex, serverkex)?;

        match self {
            Self::Curve25519Sha256 => {
                let ecdh: KexEcdhInit = stream.recv()?.to()?;
                let q_c: [u8; 32] = ecdh.q_c.as_slice().try_into().map_err(|_| Error::KexError)?;

                let mut ephemeral = [0u8; 32];
                rand::RngCore::try_fill_bytes(&mut OsRng, &mut ephemeral)
                    .map_err(Error::Entropy)?;
                let q_s = x25519::scalarmult_base(&ephemeral);

                let secret = x25519::diffie_hellman(&ephemeral, &q_c).ok_or(Error::KexError)?;

                let mut blob = Encoder::new();
                blob.string(key.algorithm()).string(key.public());
                let k_s = blob.into_bytes();

                let mut exchange = Encoder::new();
                exchange
                    .string(v_c.to_string())
                    .string(v_s.to_string())
                    .string(i_c)
                    .string(i_s)
                    .string(&k_s)
                    .string(q_c)
                    .string(q_s)
                    .mpint(&secret);
                let hash = sha256(exchange.as_bytes());

                let mut signature = Encoder::new();
                signature
                    .string(key.algorithm())
                    .string(key.sign(&hash));

                stream.send(&KexEcdhReply {
                    k_s,
                    q_s: q_s.to_vec(),
                    signature: signature.into_bytes(),
                })?;

                let session_id = stream.with_session(&hash).to_vec();

                Ok(TransportPair {
                    rx: Transport::new(
                        client_cipher.clone(),
                        client_hmac.clone(),
                        Keys::as_client(&secret, &hash, &session_id, &client_cipher, &client_hmac),
                    ),
                    tx: Transport::new(
                        server_cipher.clone(),
                        server_hmac.clone(),
                        Keys::as_server(&secret, &hash, &session_id, &server_cipher, &server_hmac),
                    ),
                })
            }
        }
    }
}
