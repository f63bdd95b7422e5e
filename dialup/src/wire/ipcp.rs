//! Configuration options of the IP control protocol, RFC 1332 and RFC 1877.
use super::control::{emit_option, ConfigOption};
use super::ipv4::Address;
use super::{Error, Result};

enum_with_unknown! {
    /// The type of an IPCP configuration option.
    pub enum OptionType(u8) {
        IpAddresses = 1,
        IpCompressionProtocol = 2,
        IpAddress = 3,
        PrimaryDns = 129,
        PrimaryNbns = 130,
        SecondaryDns = 131,
        SecondaryNbns = 132,
    }
}

/// The options whose value is a single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressOption {
    /// The address of the sender.
    IpAddress,
    /// Primary name server.
    PrimaryDns,
    /// Primary NetBIOS name server.
    PrimaryNbns,
    /// Secondary name server.
    SecondaryDns,
    /// Secondary NetBIOS name server.
    SecondaryNbns,
}

impl AddressOption {
    /// All address options, in the order they are requested.
    pub const ALL: [AddressOption; 5] = [
        AddressOption::IpAddress,
        AddressOption::PrimaryDns,
        AddressOption::PrimaryNbns,
        AddressOption::SecondaryDns,
        AddressOption::SecondaryNbns,
    ];

    /// Position in `ALL`, usable as an index into per-option tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map an option type to an address option.
    pub fn from_type(kind: OptionType) -> Option<Self> {
        match kind {
            OptionType::IpAddress => Some(AddressOption::IpAddress),
            OptionType::PrimaryDns => Some(AddressOption::PrimaryDns),
            OptionType::PrimaryNbns => Some(AddressOption::PrimaryNbns),
            OptionType::SecondaryDns => Some(AddressOption::SecondaryDns),
            OptionType::SecondaryNbns => Some(AddressOption::SecondaryNbns),
            _ => None,
        }
    }

    /// The option type on the wire.
    pub fn option_type(self) -> OptionType {
        match self {
            AddressOption::IpAddress => OptionType::IpAddress,
            AddressOption::PrimaryDns => OptionType::PrimaryDns,
            AddressOption::PrimaryNbns => OptionType::PrimaryNbns,
            AddressOption::SecondaryDns => OptionType::SecondaryDns,
            AddressOption::SecondaryNbns => OptionType::SecondaryNbns,
        }
    }
}

/// A parsed IPCP option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionRepr {
    /// One of the address options.
    Address(AddressOption, Address),
    /// An option with no value representation here.
    Other(OptionType),
}

impl OptionRepr {
    /// Parse an option, checking its length against the type.
    pub fn parse(option: &ConfigOption) -> Result<OptionRepr> {
        let kind = OptionType::from(option.kind);
        match AddressOption::from_type(kind) {
            Some(which) if option.data.len() == 4 => {
                Ok(OptionRepr::Address(which, Address::from_bytes(option.data)))
            },
            Some(_) => Err(Error::Malformed),
            None => Ok(OptionRepr::Other(kind)),
        }
    }

    /// Append the option to a packet.
    ///
    /// Options without value representation are emitted without data.
    pub fn emit(&self, buffer: &mut Vec<u8>) {
        match *self {
            OptionRepr::Address(which, address) => {
                emit_option(buffer, which.option_type().into(), address.as_bytes())
            },
            OptionRepr::Other(kind) => emit_option(buffer, kind.into(), &[]),
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
            0x03, 0x06, 0x00, 0x00, 0x00, 0x00,
            0x81, 0x06, 0x0a, 0x00, 0x00, 0x01,
            0x02, 0x06, 0x00, 0x2d, 0x0f, 0x01,
        ];
        let options: Vec<_> = Options::new(&data)
            .map(|option| OptionRepr::parse(&option.unwrap()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(options, vec![
            OptionRepr::Address(AddressOption::IpAddress, Address::UNSPECIFIED),
            OptionRepr::Address(AddressOption::PrimaryDns, Address::new(10, 0, 0, 1)),
            OptionRepr::Other(OptionType::IpCompressionProtocol),
        ]);
    }

    #[test]
    fn wrong_length() {
        let data = [0x03, 0x04, 0x0a, 0x00];
        let option = Options::new(&data).next().unwrap().unwrap();
        assert_eq!(OptionRepr::parse(&option), Err(Error::Malformed));
    }

    #[test]
    fn indices() {
        for (i, which) in AddressOption::ALL.iter().enumerate() {
            assert_eq!(which.index(), i);
            assert_eq!(AddressOption::from_type(which.option_type()), Some(*which));
        }
    }
}
