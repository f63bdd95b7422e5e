//! HDLC-like framing of the PPP data stream.
//!
//! The [`Decoder`] assembles frames from the octet stream of a call, one octet at a time, and
//! validates them. The [`Encoder`] performs the reverse, producing the complete octet sequence of
//! a frame including its flags.
//!
//! Both sides are parameterized by the [`Framing`] negotiated by LCP. All LCP packets are framed
//! with the defaults, escaping every control character and sending address and control fields.
//!
//! [`Decoder`]: struct.Decoder.html
//! [`Encoder`]: struct.Encoder.html
//! [`Framing`]: struct.Framing.html
mod decoder;
mod encoder;

pub use decoder::{Decoder, Statistics};
pub use encoder::Encoder;

use crate::wire::DEFAULT_ACCM;

/// Framing parameters for transmission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Framing {
    /// Control characters to escape.
    pub accm: u32,
    /// Omit address and control fields.
    pub acfc: bool,
}

impl Framing {
    /// The framing before and outside of negotiation.
    pub const DEFAULT: Framing = Framing {
        accm: DEFAULT_ACCM,
        acfc: false,
    };
}

impl Default for Framing {
    fn default() -> Self {
        Framing::DEFAULT
    }
}

#[cfg(test)]
mod tests;
