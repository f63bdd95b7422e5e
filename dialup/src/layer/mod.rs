//! The process logic of protocol layers.
//!
//! ## Layering
//!
//! Each protocol is split into two parts: the packet logic contained in `wire` and the processing
//! part in this module. An endpoint represents the local state of a protocol on one connection
//! and processes the packets of that layer, handing its payload to the layer above or answering
//! the peer on its own.
//!
//! From the client towards the network the layers are:
//!
//! * [`hayes`]: the command interpreter of the modem, deciding whether bytes are commands or data.
//! * [`hdlc`]: frames in the data stream, with octet stuffing and check sequence.
//! * [`ppp`]: the link, dispatching frames by protocol number and gating them by link state.
//! * [`lcp`] and [`ipcp`]: the negotiation of link and network parameters.
//! * [`ip`]: the addresses handed to the peers.
//!
//! ## Sending
//!
//! Endpoints never own their lower layer. Each operation receives the output it should write to,
//! through a small trait such as [`ppp::Io`] or [`hayes::Line`], or as a closure for the control
//! protocols. This keeps every layer testable on its own with in-memory collaborators.
//!
//! [`hayes`]: hayes/index.html
//! [`hdlc`]: hdlc/index.html
//! [`ppp`]: ppp/index.html
//! [`lcp`]: lcp/index.html
//! [`ipcp`]: ipcp/index.html
//! [`ip`]: ip/index.html
//! [`ppp::Io`]: ppp/trait.Io.html
//! [`hayes::Line`]: hayes/trait.Line.html

pub mod hayes;
pub mod hdlc;
pub mod ip;
pub mod ipcp;
pub mod lcp;
pub(crate) mod negotiation;
pub mod ppp;

/// The result type of layer operations.
pub type Result<T> = core::result::Result<T, Error>;

/// The error type of layer operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The operation was not permitted.
    ///
    /// Returned when an endpoint is not in a state that allows the operation, such as sending a
    /// datagram before the network layer was negotiated.
    Illegal,

    /// Not enough space for the requested packet.
    ///
    /// The packet is larger than the unit the peer is willing to receive, or a configuration
    /// requests a size the implementation can not provide.
    BadSize,

    /// Unable to find a route towards the destination address.
    Unreachable,

    /// The action could not be completed because there were not enough resources.
    ///
    /// The main difference towards `Illegal` is that it would have been legal with more
    /// resources, for example when the address pool has no free address left.
    Exhausted,
}

/// Can convert from a wire error.
///
/// This indicates some layer tried to operate on a packet but failed.
impl From<crate::wire::Error> for Error {
    fn from(_: crate::wire::Error) -> Self {
        Error::Illegal
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::Illegal => write!(f, "operation not permitted"),
            Error::BadSize => write!(f, "packet size not supported"),
            Error::Unreachable => write!(f, "destination unreachable"),
            Error::Exhausted => write!(f, "resources exhausted"),
        }
    }
}

impl std::error::Error for Error {}
