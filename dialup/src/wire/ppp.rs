use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};

enum_with_unknown! {
    /// PPP protocol number.
    pub enum Protocol(u16) {
        Ipv4 = 0x0021,
        Ipcp = 0x8021,
        Lcp  = 0xc021,
    }
}

impl Protocol {
    /// Whether the protocol number fits the single octet field.
    pub fn is_compressible(self) -> bool {
        u16::from(self) < 0x100
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Protocol::Ipv4 => write!(f, "IPv4"),
            Protocol::Ipcp => write!(f, "IPCP"),
            Protocol::Lcp  => write!(f, "LCP"),
            Protocol::Unknown(id) => write!(f, "0x{:04x}", id),
        }
    }
}

byte_wrapper! {
    /// A byte sequence representing a PPP frame, the protocol field and the information.
    #[derive(Debug, PartialEq, Eq)]
    pub struct ppp([u8]);
}

impl ppp {
    /// Imbue a raw octet buffer with PPP frame structure.
    pub fn new_unchecked(data: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(data)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(data: &[u8]) -> Result<&Self> {
        let frame = Self::new_unchecked(data);
        frame.check_len()?;
        Ok(frame)
    }

    /// Unwrap the frame as a raw byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Ensure that no accessor method will panic if called.
    ///
    /// Returns `Err(Error::Truncated)` if the protocol field is incomplete and
    /// `Err(Error::Malformed)` if the protocol number is not odd, as required for its least
    /// significant octet.
    pub fn check_len(&self) -> Result<()> {
        match self.0 {
            [] => Err(Error::Truncated),
            [first, ..] if first & 1 == 1 => Ok(()),
            [_] => Err(Error::Truncated),
            [_, second, ..] if second & 1 == 1 => Ok(()),
            _ => Err(Error::Malformed),
        }
    }

    /// Whether the protocol field was sent in its compressed single octet form.
    pub fn is_compressed(&self) -> bool {
        self.0[0] & 1 == 1
    }

    /// The length of the protocol field.
    pub fn header_len(&self) -> usize {
        if self.is_compressed() { 1 } else { 2 }
    }

    /// Return the protocol field.
    pub fn protocol(&self) -> Protocol {
        if self.is_compressed() {
            Protocol::from(u16::from(self.0[0]))
        } else {
            Protocol::from(NetworkEndian::read_u16(&self.0[..2]))
        }
    }

    /// Return the information field.
    pub fn payload(&self) -> &[u8] {
        &self.0[self.header_len()..]
    }
}

/// The header of a PPP frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repr {
    /// The protocol of the information field.
    pub protocol: Protocol,
    /// Send the protocol field compressed, if possible.
    pub compressed: bool,
}

impl Repr {
    /// Parse the header of a checked frame.
    pub fn parse(frame: &ppp) -> Result<Repr> {
        frame.check_len()?;
        Ok(Repr {
            protocol: frame.protocol(),
            compressed: frame.is_compressed(),
        })
    }

    /// Length of the protocol field to emit.
    pub fn header_len(&self) -> usize {
        if self.compressed && self.protocol.is_compressible() { 1 } else { 2 }
    }

    /// Emit the protocol field into a buffer of at least `header_len` octets.
    pub fn emit(&self, buffer: &mut [u8]) {
        let number = u16::from(self.protocol);
        if self.header_len() == 1 {
            buffer[0] = number as u8;
        } else {
            NetworkEndian::write_u16(&mut buffer[..2], number);
        }
    }
}
