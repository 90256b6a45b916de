//! Binary encodings from RFC 4251 §5: `byte`, `boolean`, `uint32`,
//! `string`, `mpint` and `name-list`.

use crate::{Error, Result};

/// A serializer for the RFC 4251 data types, writing into a growable buffer.
#[derive(Debug, Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single byte.
    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    /// Append a big-endian `uint32`.
    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Append a `boolean`, as a 0 or 1 byte.
    pub fn boolean(&mut self, value: bool) -> &mut Self {
        self.u8(u8::from(value))
    }

    /// Append raw bytes with no framing.
    pub fn raw(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        self.buf.extend_from_slice(bytes.as_ref());
        self
    }

    /// Append a length-prefixed `string`.
    pub fn string(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        let bytes = bytes.as_ref();
        self.u32(bytes.len() as u32).raw(bytes)
    }

    /// Append an `mpint` holding the non-negative integer whose big-endian
    /// magnitude is `bytes`.
    ///
    /// Leading zero octets are stripped to the minimum encoding, and a
    /// single zero octet is prepended when the top bit of the remaining
    /// first octet is set, keeping the two's-complement value positive.
    pub fn mpint(&mut self, bytes: &[u8]) -> &mut Self {
        let magnitude = &bytes[bytes.iter().take_while(|byte| **byte == 0).count()..];

        match magnitude.first() {
            Some(first) if first & 0x80 != 0 => {
                self.u32(magnitude.len() as u32 + 1).u8(0).raw(magnitude)
            }
            Some(_) => self.string(magnitude),
            None => self.u32(0),
        }
    }

    /// Append a `name-list`: a `string` of comma-separated names.
    pub fn name_list(&mut self, names: &NameList) -> &mut Self {
        self.string(names.to_string())
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the encoder into its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// A deserializer for the RFC 4251 data types, borrowing from a payload.
///
/// Every accessor fails with [`Error::Malformed`] on truncated input rather
/// than reading out of bounds.
#[derive(Debug)]
pub struct Decoder<'b> {
    buf: &'b [u8],
}

impl<'b> Decoder<'b> {
    /// Wrap a buffer for decoding.
    pub fn new(buf: &'b [u8]) -> Self {
        Self { buf }
    }

    /// Read a single byte.
    pub fn u8(&mut self) -> Result<u8> {
        let (byte, rest) = self.buf.split_first().ok_or(Error::Malformed)?;
        self.buf = rest;

        Ok(*byte)
    }

    /// Read a big-endian `uint32`.
    pub fn u32(&mut self) -> Result<u32> {
        let raw = self.raw(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// Read a `boolean`; any non-zero byte is true, per RFC 4251.
    pub fn boolean(&mut self) -> Result<bool> {
        Ok(self.u8()? != 0)
    }

    /// Read exactly `len` raw bytes.
    pub fn raw(&mut self, len: usize) -> Result<&'b [u8]> {
        if self.buf.len() < len {
            return Err(Error::Malformed);
        }

        let (bytes, rest) = self.buf.split_at(len);
        self.buf = rest;

        Ok(bytes)
    }

    /// Read a length-prefixed `string`.
    pub fn string(&mut self) -> Result<&'b [u8]> {
        let len = self.u32()?;
        self.raw(len as usize)
    }

    /// Read a length-prefixed `string` required to be UTF-8 text.
    pub fn utf8(&mut self) -> Result<String> {
        String::from_utf8(self.string()?.to_vec()).map_err(|_| Error::Malformed)
    }

    /// Read a `name-list`.
    pub fn name_list(&mut self) -> Result<NameList> {
        NameList::parse(self.string()?)
    }

    /// Take everything not yet consumed.
    pub fn rest(&mut self) -> &'b [u8] {
        std::mem::take(&mut self.buf)
    }

    /// Whether the whole buffer has been consumed.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// A list of algorithm or method names, ordered by preference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameList(Vec<String>);

impl NameList {
    /// Parse the contents of a `name-list` string: comma-separated,
    /// printable US-ASCII, no empty names unless the list itself is empty.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        if !bytes.is_ascii() {
            return Err(Error::Malformed);
        }

        let names = bytes
            .split(|byte| *byte == b',')
            .map(|name| {
                if name.is_empty() {
                    Err(Error::Malformed)
                } else {
                    Ok(String::from_utf8_lossy(name).into_owned())
                }
            })
            .collect::<Result<_>>()?;

        Ok(Self(names))
    }

    /// The first, most-preferred name.
    pub fn preferred(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Whether `name` appears anywhere in the list.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|candidate| candidate == name)
    }

    /// Whether the list has no names at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: AsRef<str>> FromIterator<T> for NameList {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(|name| name.as_ref().into()).collect())
    }
}

impl std::fmt::Display for NameList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::zero(&[], "00000000")]
    #[case::stripped(&[0x00, 0x00], "00000000")]
    #[case::small(&[0x09], "0000000109")]
    #[case::high_bit(&[0x80], "000000020080")]
    #[case::rfc_example(&[0x09, 0xa3, 0x78, 0xf9, 0xb2, 0xe3, 0x32, 0xa7], "0000000809a378f9b2e332a7")]
    #[case::leading_zero_then_high_bit(&[0x00, 0xff], "0000000200ff")]
    fn it_encodes_mpints_minimally(#[case] magnitude: &[u8], #[case] expected: &str) {
        let mut encoder = Encoder::new();
        encoder.mpint(magnitude);

        assert_eq!(hex::encode(encoder.as_bytes()), expected);
    }

    #[test]
    fn it_round_trips_every_type() {
        let names = NameList::from_iter(["curve25519-sha256", "ssh-ed25519"]);

        let mut encoder = Encoder::new();
        encoder
            .u8(0x2a)
            .u32(0xdead_beef)
            .boolean(true)
            .string(b"a string")
            .name_list(&names);

        let bytes = encoder.into_bytes();
        let mut decoder = Decoder::new(&bytes);

        assert_eq!(decoder.u8().ok(), Some(0x2a));
        assert_eq!(decoder.u32().ok(), Some(0xdead_beef));
        assert_eq!(decoder.boolean().ok(), Some(true));
        assert_eq!(decoder.string().ok(), Some(b"a string".as_slice()));
        assert_eq!(decoder.name_list().ok(), Some(names));
        assert!(decoder.is_empty());
    }

    #[test]
    fn it_rejects_truncated_strings() {
        let mut encoder = Encoder::new();
        encoder.u32(10).raw(b"short");

        let bytes = encoder.into_bytes();
        assert!(matches!(
            Decoder::new(&bytes).string(),
            Err(Error::Malformed)
        ));
    }

    #[rstest]
    #[case::empty(b"".as_slice(), Some(0))]
    #[case::single(b"none".as_slice(), Some(1))]
    #[case::several(b"aes128-ctr,aes256-ctr".as_slice(), Some(2))]
    #[case::trailing_comma(b"aes128-ctr,".as_slice(), None)]
    #[case::non_ascii(&[0xc3, 0xa9], None)]
    fn it_parses_name_lists(#[case] bytes: &[u8], #[case] count: Option<usize>) {
        assert_eq!(NameList::parse(bytes).ok().map(|list| list.0.len()), count);
    }
}
