//! The link control protocol.
//!
//! Negotiates the parameters of the link with the peer: the maximum receive unit, the async
//! control character map, the magic number for loopback detection and the compression of the
//! protocol, address and control fields. Also answers echo requests and terminates the link.
//!
//! The [`Endpoint`] is driven by the PPP link and reports state changes as an [`Event`].
//!
//! [`Endpoint`]: struct.Endpoint.html
//! [`Event`]: enum.Event.html
use crate::wire::{PppProtocol, DEFAULT_MRU};

mod endpoint;

pub use endpoint::Endpoint;

/// Local configuration of LCP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// The receive unit we request.
    pub mru: u16,
    /// Peers requesting a smaller receive unit are refused.
    pub min_mru: u16,
    /// Our magic number.
    pub magic: u32,
}

impl Config {
    /// The smallest receive unit accepted by default.
    pub const MIN_MRU: u16 = 128;

    /// Default sizes with the given magic number.
    pub fn new(magic: u32) -> Self {
        Config {
            mru: DEFAULT_MRU,
            min_mru: Self::MIN_MRU,
            magic,
        }
    }
}

/// A change of the link reported by LCP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Both sides acknowledged a configuration.
    Opened,
    /// The peer started a new negotiation on an open link.
    Restarted,
    /// The link was terminated.
    Closed,
    /// The peer does not support a protocol.
    ProtocolRejected(PppProtocol),
}
