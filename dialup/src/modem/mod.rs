//! The modems of the bank.
//!
//! A [`Connection`] stacks all layers for one client: the Hayes interpreter sees every byte
//! first and, once a call is connected, passes the data stream through the HDLC decoder to the
//! PPP link. Replies of any layer leave through the [`Transport`], datagrams of the client
//! through the [`Network`].
//!
//! The [`Registry`] finds the connection that owns a destination address.
//!
//! [`Connection`]: struct.Connection.html
//! [`Registry`]: struct.Registry.html
//! [`Transport`]: ../nic/trait.Transport.html
//! [`Network`]: ../nic/trait.Network.html
use crate::layer::{hayes, ipcp, lcp};
use crate::wire::{Ipv4Address, DEFAULT_MRU};

mod connection;
mod registry;

pub use connection::Connection;
pub use registry::Registry;

/// The configuration shared by all modems of a bank.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// The receive unit requested from peers.
    pub mru: u16,
    /// Peers requesting a smaller receive unit are refused.
    pub min_mru: u16,
    /// The LCP magic number.
    pub magic: u32,
    /// Name servers offered to the peers.
    pub dns: [Option<Ipv4Address>; 2],
    /// NetBIOS name servers offered to the peers.
    pub nbns: [Option<Ipv4Address>; 2],
    /// The reply to `ATI`.
    pub identification: String,
    /// What completes an escape sequence.
    pub guard: hayes::Guard,
}

impl Config {
    /// Default sizes and no name servers.
    pub fn new(magic: u32) -> Self {
        Config {
            mru: DEFAULT_MRU,
            min_mru: lcp::Config::MIN_MRU,
            magic,
            dns: [None; 2],
            nbns: [None; 2],
            identification: hayes::IDENTIFICATION.to_string(),
            guard: hayes::Guard::default(),
        }
    }

    /// The LCP configuration of a connection.
    pub fn lcp(&self) -> lcp::Config {
        lcp::Config {
            mru: self.mru,
            min_mru: self.min_mru,
            magic: self.magic,
        }
    }

    /// The IPCP configuration of a connection from `local` to `remote`.
    pub fn ipcp(&self, local: Ipv4Address, remote: Ipv4Address) -> ipcp::Config {
        ipcp::Config {
            primary_dns: self.dns[0],
            secondary_dns: self.dns[1],
            primary_nbns: self.nbns[0],
            secondary_nbns: self.nbns[1],
            ..ipcp::Config::new(local, remote)
        }
    }
}
