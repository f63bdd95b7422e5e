//! The packet format shared by LCP and the network control protocols.
//!
//! See [RFC 1661 § 5].
//!
//! [RFC 1661 § 5]: https://tools.ietf.org/html/rfc1661#section-5
use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};

enum_with_unknown! {
    /// The packet code.
    pub enum Code(u8) {
        ConfigureRequest = 1,
        ConfigureAck = 2,
        ConfigureNak = 3,
        ConfigureReject = 4,
        TerminateRequest = 5,
        TerminateAck = 6,
        CodeReject = 7,
        ProtocolReject = 8,
        EchoRequest = 9,
        EchoReply = 10,
        DiscardRequest = 11,
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Code::ConfigureRequest => write!(f, "Configure-Request"),
            Code::ConfigureAck => write!(f, "Configure-Ack"),
            Code::ConfigureNak => write!(f, "Configure-Nak"),
            Code::ConfigureReject => write!(f, "Configure-Reject"),
            Code::TerminateRequest => write!(f, "Terminate-Request"),
            Code::TerminateAck => write!(f, "Terminate-Ack"),
            Code::CodeReject => write!(f, "Code-Reject"),
            Code::ProtocolReject => write!(f, "Protocol-Reject"),
            Code::EchoRequest => write!(f, "Echo-Request"),
            Code::EchoReply => write!(f, "Echo-Reply"),
            Code::DiscardRequest => write!(f, "Discard-Request"),
            Code::Unknown(code) => write!(f, "code {}", code),
        }
    }
}

byte_wrapper! {
    /// A byte sequence representing a control protocol packet.
    #[derive(Debug, PartialEq, Eq)]
    pub struct control([u8]);
}

mod field {
    use crate::wire::field::{Field, Rest};

    pub(crate) const CODE:       usize = 0;
    pub(crate) const IDENTIFIER: usize = 1;
    pub(crate) const LENGTH:     Field = 2..4;
    pub(crate) const DATA:       Rest  = 4..;
}

/// Length of the packet header.
pub const HEADER_LEN: usize = field::DATA.start;

impl control {
    /// Imbue a raw octet buffer with control packet structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Imbue a mutable octet buffer with control packet structure.
    pub fn new_unchecked_mut(data: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(data)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        let packet = Self::new_unchecked(data);
        packet.check_len()?;
        Ok(packet)
    }

    /// Unwrap the packet as a raw byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Ensure that no accessor method will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the buffer is shorter than the header or the length
    /// field, `Err(Error::Malformed)` if the length field is shorter than the header. Octets
    /// beyond the length field are padding and ignored.
    pub fn check_len(&self) -> Result<()> {
        let len = self.0.len();
        if len < HEADER_LEN {
            return Err(Error::Truncated);
        }

        let claimed = usize::from(self.length());
        if claimed < HEADER_LEN {
            Err(Error::Malformed)
        } else if claimed > len {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the code field.
    pub fn code(&self) -> Code {
        Code::from(self.0[field::CODE])
    }

    /// Return the identifier field.
    pub fn identifier(&self) -> u8 {
        self.0[field::IDENTIFIER]
    }

    /// Return the length field.
    pub fn length(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::LENGTH])
    }

    /// The packet without padding.
    pub fn packet(&self) -> &[u8] {
        &self.0[..usize::from(self.length())]
    }

    /// The data following the header, up to the length field.
    pub fn data(&self) -> &[u8] {
        &self.packet()[field::DATA]
    }

    /// Iterate over the data as configuration options.
    pub fn options(&self) -> Options {
        Options { data: self.data() }
    }

    /// Set the code field.
    pub fn set_code(&mut self, code: Code) {
        self.0[field::CODE] = code.into();
    }

    /// Set the identifier field.
    pub fn set_identifier(&mut self, identifier: u8) {
        self.0[field::IDENTIFIER] = identifier;
    }

    /// Set the length field.
    pub fn set_length(&mut self, length: u16) {
        NetworkEndian::write_u16(&mut self.0[field::LENGTH], length);
    }

    /// Mutable access to everything following the header.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.0[field::DATA]
    }
}

/// A single configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOption<'a> {
    /// The raw type octet.
    pub kind: u8,
    /// The option data, without type and length.
    pub data: &'a [u8],
    /// The complete option as received.
    pub raw: &'a [u8],
}

/// Iterator over the options of a configure packet.
///
/// Yields an error and then stops if an option length is inconsistent with the packet.
#[derive(Debug, Clone)]
pub struct Options<'a> {
    data: &'a [u8],
}

impl<'a> Options<'a> {
    /// Iterate the options in an arbitrary byte sequence.
    pub fn new(data: &'a [u8]) -> Self {
        Options { data }
    }

    /// Check that the whole list is well-formed.
    pub fn validate(&self) -> Result<()> {
        self.clone().try_for_each(|option| option.map(|_| ()))
    }
}

impl<'a> Iterator for Options<'a> {
    type Item = Result<ConfigOption<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let data = self.data;
        let (kind, len) = match data {
            [] => return None,
            [kind, len, ..] => (*kind, usize::from(*len)),
            [_] => {
                self.data = &[];
                return Some(Err(Error::Truncated));
            },
        };

        if len < 2 {
            self.data = &[];
            return Some(Err(Error::Malformed));
        }

        if len > data.len() {
            self.data = &[];
            return Some(Err(Error::Truncated));
        }

        let (raw, rest) = data.split_at(len);
        self.data = rest;
        Some(Ok(ConfigOption {
            kind,
            data: &raw[2..],
            raw,
        }))
    }
}

/// Emit a configuration option in type-length-value form.
pub fn emit_option(buffer: &mut Vec<u8>, kind: u8, data: &[u8]) {
    buffer.push(kind);
    buffer.push((data.len() + 2) as u8);
    buffer.extend_from_slice(data);
}

/// A control packet under construction.
///
/// Data is appended after the header, `finish` patches the length field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builder {
    buffer: Vec<u8>,
}

impl Builder {
    /// Start a packet with the given code and identifier.
    pub fn new(code: Code, identifier: u8) -> Self {
        let mut buffer = vec![0; HEADER_LEN];
        let packet = control::new_unchecked_mut(&mut buffer);
        packet.set_code(code);
        packet.set_identifier(identifier);
        Builder { buffer }
    }

    /// The code of the packet.
    pub fn code(&self) -> Code {
        control::new_unchecked(&self.buffer).code()
    }

    /// Change the code, keeping identifier and data.
    pub fn set_code(&mut self, code: Code) {
        control::new_unchecked_mut(&mut self.buffer).set_code(code);
    }

    /// Drop all data appended so far.
    pub fn clear_data(&mut self) {
        self.buffer.truncate(HEADER_LEN);
    }

    /// Append raw data.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Write the length field and return the packet.
    pub fn finish(mut self) -> Vec<u8> {
        let len = self.buffer.len() as u16;
        control::new_unchecked_mut(&mut self.buffer).set_length(len);
        self.buffer
    }
}
