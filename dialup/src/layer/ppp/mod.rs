//! The PPP link.
//!
//! An [`Endpoint`] owns the link state and the control protocol engines of one connection. It
//! receives decoded frames, gates them by link state, and dispatches them by protocol number to
//! a fixed set of handlers: LCP, IPCP and IPv4. Only LCP is registered as active when the link
//! comes up. IPCP is activated when LCP has opened the link, IPv4 when IPCP has opened the
//! network layer.
//!
//! ```text
//! Dead --up--> Establish --LCP opened--> Authenticate --> Network
//!  ^               ^                                         |
//!  |               +----------- Configure-Request -----------+
//!  +------- down / Terminate-Ack ----- Terminate <--close----+
//! ```
//!
//! Output goes through the [`Io`] trait: PPP frames, protocol field included, together with the
//! framing to encode them with, and received IPv4 datagrams.
//!
//! [`Endpoint`]: struct.Endpoint.html
//! [`Io`]: trait.Io.html
use crate::layer::hdlc::Framing;
use crate::layer::lcp;
use crate::wire::{PppProtocol, DEFAULT_ACCM};

mod endpoint;

pub use endpoint::Endpoint;

/// The phase of the link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    /// No carrier, or the link was torn down.
    Dead,
    /// LCP is negotiating.
    Establish,
    /// The peer would authenticate. There is no authentication protocol, this is passed at once.
    Authenticate,
    /// Network protocols may be negotiated and used.
    Network,
    /// We asked the peer to terminate the link.
    Terminate,
}

/// The protocols a link dispatches to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handler {
    /// The link control protocol.
    Lcp,
    /// The IP control protocol.
    Ipcp,
    /// IPv4 datagrams.
    Ipv4,
}

impl Handler {
    /// The handler for a protocol number, if there is one.
    pub fn for_protocol(protocol: PppProtocol) -> Option<Handler> {
        match protocol {
            PppProtocol::Lcp => Some(Handler::Lcp),
            PppProtocol::Ipcp => Some(Handler::Ipcp),
            PppProtocol::Ipv4 => Some(Handler::Ipv4),
            PppProtocol::Unknown(_) => None,
        }
    }

    /// The protocol number dispatched to this handler.
    pub fn protocol(self) -> PppProtocol {
        match self {
            Handler::Lcp => PppProtocol::Lcp,
            Handler::Ipcp => PppProtocol::Ipcp,
            Handler::Ipv4 => PppProtocol::Ipv4,
        }
    }
}

/// The negotiated parameters of a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    /// Largest information field the peer accepts.
    pub mru: u16,
    /// Our magic number, zero if the peer refused the option.
    pub magic: u32,
    /// Control characters the peer needs escaped.
    pub accm: u32,
    /// Protocol fields may be compressed.
    pub pfc: bool,
    /// Address and control fields may be omitted.
    pub acfc: bool,
}

impl Link {
    /// The parameters before negotiation.
    pub fn new(config: &lcp::Config) -> Self {
        Link {
            mru: config.mru,
            magic: config.magic,
            accm: DEFAULT_ACCM,
            pfc: false,
            acfc: false,
        }
    }

    /// The framing for frames of a protocol.
    ///
    /// LCP frames are always sent with the default framing.
    pub fn framing(&self, protocol: PppProtocol) -> Framing {
        match protocol {
            PppProtocol::Lcp => Framing::DEFAULT,
            _ => Framing {
                accm: self.accm,
                acfc: self.acfc,
            },
        }
    }

    /// Whether to compress the protocol field of a protocol.
    pub fn compress(&self, protocol: PppProtocol) -> bool {
        self.pfc && protocol != PppProtocol::Lcp
    }
}

/// The lower and upper layer of a link.
pub trait Io {
    /// Send a PPP frame, protocol field included, with the given framing.
    fn transmit(&mut self, frame: &[u8], framing: Framing);

    /// Pass a received IPv4 datagram to the network.
    fn deliver(&mut self, datagram: &[u8]);
}

#[cfg(test)]
mod tests;
