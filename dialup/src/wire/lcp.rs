//! Configuration options of the link control protocol.
use byteorder::{ByteOrder, NetworkEndian};

use super::control::{emit_option, ConfigOption};
use super::{Error, Result};

/// The maximum receive unit every implementation must accept.
pub const DEFAULT_MRU: u16 = 1500;

enum_with_unknown! {
    /// The type of an LCP configuration option.
    pub enum OptionType(u8) {
        Mru = 1,
        Accm = 2,
        AuthenticationProtocol = 3,
        QualityProtocol = 4,
        MagicNumber = 5,
        ProtocolCompression = 7,
        AddressControlCompression = 8,
    }
}

/// A parsed LCP option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionRepr {
    /// Maximum receive unit.
    Mru(u16),
    /// Async control character map.
    Accm(u32),
    /// Loopback detection magic number.
    MagicNumber(u32),
    /// Protocol field compression.
    ProtocolCompression,
    /// Address and control field compression.
    AddressControlCompression,
    /// An option with no value representation here.
    Other(OptionType),
}

impl OptionRepr {
    /// Parse an option, checking its length against the type.
    pub fn parse(option: &ConfigOption) -> Result<OptionRepr> {
        let data = option.data;
        let kind = OptionType::from(option.kind);
        match (kind, data.len()) {
            (OptionType::Mru, 2) => Ok(OptionRepr::Mru(NetworkEndian::read_u16(data))),
            (OptionType::Accm, 4) => Ok(OptionRepr::Accm(NetworkEndian::read_u32(data))),
            (OptionType::MagicNumber, 4) => Ok(OptionRepr::MagicNumber(NetworkEndian::read_u32(data))),
            (OptionType::ProtocolCompression, 0) => Ok(OptionRepr::ProtocolCompression),
            (OptionType::AddressControlCompression, 0) => Ok(OptionRepr::AddressControlCompression),
            (OptionType::Mru, _)
            | (OptionType::Accm, _)
            | (OptionType::MagicNumber, _)
            | (OptionType::ProtocolCompression, _)
            | (OptionType::AddressControlCompression, _) => Err(Error::Malformed),
            (other, _) => Ok(OptionRepr::Other(other)),
        }
    }

    /// The option type.
    pub fn kind(&self) -> OptionType {
        match self {
            OptionRepr::Mru(_) => OptionType::Mru,
            OptionRepr::Accm(_) => OptionType::Accm,
            OptionRepr::MagicNumber(_) => OptionType::MagicNumber,
            OptionRepr::ProtocolCompression => OptionType::ProtocolCompression,
            OptionRepr::AddressControlCompression => OptionType::AddressControlCompression,
            OptionRepr::Other(kind) => *kind,
        }
    }

    /// Append the option to a packet.
    ///
    /// Options without value representation are emitted without data.
    pub fn emit(&self, buffer: &mut Vec<u8>) {
        let kind: u8 = self.kind().into();
        match *self {
            OptionRepr::Mru(mru) => emit_option(buffer, kind, &mru.to_be_bytes()),
            OptionRepr::Accm(accm) => emit_option(buffer, kind, &accm.to_be_bytes()),
            OptionRepr::MagicNumber(magic) => emit_option(buffer, kind, &magic.to_be_bytes()),
            _ => emit_option(buffer, kind, &[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::control::Options;

    #[test]
    fn parse_options() {
        let data = [
            0x01, 0x04, 0x05, 0x78,
            0x02, 0x06, 0x00, 0x0a, 0x00, 0x00,
            0x03, 0x04, 0xc0, 0x23,
            0x07, 0x02,
        ];
        let options: Vec<_> = Options::new(&data)
            .map(|option| OptionRepr::parse(&option.unwrap()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(options, vec![
            OptionRepr::Mru(1400),
            OptionRepr::Accm(0x000a_0000),
            OptionRepr::Other(OptionType::AuthenticationProtocol),
            OptionRepr::ProtocolCompression,
        ]);
    }

    #[test]
    fn wrong_length() {
        let data = [0x05, 0x05, 0x00, 0x00, 0x01];
        let option = Options::new(&data).next().unwrap().unwrap();
        assert_eq!(OptionRepr::parse(&option), Err(Error::Malformed));
    }

    #[test]
    fn emit() {
        let mut buffer = Vec::new();
        OptionRepr::Mru(1500).emit(&mut buffer);
        OptionRepr::MagicNumber(0xdead_beef).emit(&mut buffer);
        OptionRepr::AddressControlCompression.emit(&mut buffer);
        assert_eq!(buffer, [
            0x01, 0x04, 0x05, 0xdc,
            0x05, 0x06, 0xde, 0xad, 0xbe, 0xef,
            0x08, 0x02,
        ].to_vec());
    }
}
