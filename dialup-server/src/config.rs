use std::net::SocketAddr;

use structopt::StructOpt;

use dialup::layer::hayes::Guard;
use dialup::modem;
use dialup::wire::{Ipv4Address, Ipv4Cidr};

#[derive(Clone, Debug, StructOpt)]
#[structopt(name = "dialup-server", about = "A modem bank answering dial-up PPP calls over TCP")]
pub struct Config {
    /// Address and port to accept calls on.
    #[structopt(long = "listen", default_value = "0.0.0.0:5555")]
    pub listen: SocketAddr,

    /// Subnet of the addresses handed to the callers.
    #[structopt(long = "subnet", default_value = "10.0.0.0/24")]
    pub subnet: Ipv4Cidr,

    /// Our own address, the first host of the subnet by default.
    #[structopt(long = "gateway")]
    pub gateway: Option<Ipv4Address>,

    /// Name servers offered to the callers, at most two.
    #[structopt(long = "dns")]
    pub dns: Vec<Ipv4Address>,

    /// NetBIOS name servers offered to the callers, at most two.
    #[structopt(long = "nbns")]
    pub nbns: Vec<Ipv4Address>,

    /// The receive unit requested from the callers.
    #[structopt(long = "mru", default_value = "1500")]
    pub mru: u16,

    /// A TUN device for traffic to other destinations than the callers.
    #[structopt(long = "tun")]
    pub tun: Option<String>,
}

impl Config {
    pub fn from_args() -> Self {
        StructOpt::from_args()
    }

    /// Check the combination of arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.dns.len() > 2 {
            return Err(format!("at most two name servers, got {}", self.dns.len()));
        }
        if self.nbns.len() > 2 {
            return Err(format!("at most two NetBIOS name servers, got {}", self.nbns.len()));
        }
        if self.mru < dialup::layer::lcp::Config::MIN_MRU {
            return Err(format!("mru {} below {}", self.mru, dialup::layer::lcp::Config::MIN_MRU));
        }
        Ok(())
    }

    pub fn gateway(&self) -> Ipv4Address {
        self.gateway.unwrap_or_else(|| {
            let network = self.subnet.network().to_network_integer();
            Ipv4Address::from_network_integer(network.wrapping_add(1))
        })
    }

    /// The configuration of one modem.
    ///
    /// Reads time out after the guard time, so only an idle line completes an escape sequence.
    pub fn modem(&self, magic: u32) -> modem::Config {
        modem::Config {
            mru: self.mru,
            guard: Guard::Idle,
            dns: [self.dns.get(0).copied(), self.dns.get(1).copied()],
            nbns: [self.nbns.get(0).copied(), self.nbns.get(1).copied()],
            ..modem::Config::new(magic)
        }
    }
}
