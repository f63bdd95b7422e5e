//! The IP control protocol.
//!
//! Negotiates the addresses of the point-to-point IPv4 network: our own address, the address
//! assigned to the peer and the name servers the peer may ask for. Values we have configured are
//! insisted on, values we have not configured are taken from the peer.
use crate::wire::{IpcpAddressOption, Ipv4Address};

mod endpoint;

pub use endpoint::Endpoint;

/// The addresses offered to the peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// Our address, requested in our own Configure-Request.
    pub local: Ipv4Address,
    /// The address assigned to the peer.
    pub remote: Option<Ipv4Address>,
    /// Name servers, offered when the peer asks for them.
    pub primary_dns: Option<Ipv4Address>,
    #[allow(missing_docs)]
    pub secondary_dns: Option<Ipv4Address>,
    /// NetBIOS name servers.
    pub primary_nbns: Option<Ipv4Address>,
    #[allow(missing_docs)]
    pub secondary_nbns: Option<Ipv4Address>,
}

impl Config {
    /// Assign `remote` to the peer, with no name servers.
    pub fn new(local: Ipv4Address, remote: Ipv4Address) -> Self {
        Config {
            local,
            remote: Some(remote),
            primary_dns: None,
            secondary_dns: None,
            primary_nbns: None,
            secondary_nbns: None,
        }
    }

    /// The configured value for an option of the peer's request.
    pub fn configured(&self, which: IpcpAddressOption) -> Option<Ipv4Address> {
        match which {
            IpcpAddressOption::IpAddress => self.remote,
            IpcpAddressOption::PrimaryDns => self.primary_dns,
            IpcpAddressOption::PrimaryNbns => self.primary_nbns,
            IpcpAddressOption::SecondaryDns => self.secondary_dns,
            IpcpAddressOption::SecondaryNbns => self.secondary_nbns,
        }
    }
}

/// A change of the network layer reported by IPCP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Both sides acknowledged a configuration.
    Opened,
    /// The peer started a new negotiation on an open network layer.
    Restarted,
    /// The peer terminated the network layer.
    Closed,
}
