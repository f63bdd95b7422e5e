//! HDLC-like framing of RFC 1662 in asynchronous mode.

use super::{fcs, Error, Result};

/// Delimits frames on the line.
pub const FLAG: u8 = 0x7e;

/// Marks the next octet as escaped.
pub const ESCAPE: u8 = 0x7d;

/// The bit flipped in escaped octets.
pub const TRANSPARENCY: u8 = 0x20;

/// The all-stations address.
pub const ADDRESS: u8 = 0xff;

/// Unnumbered information, the only control field value in use.
pub const CONTROL: u8 = 0x03;

/// Octets added around the PPP frame: two flags, address, control, two check sequence octets.
pub const OVERHEAD: usize = 6;

/// The escape map before any negotiation, all control characters are escaped.
pub const DEFAULT_ACCM: u32 = 0xffff_ffff;

/// Determine if an octet must be transmitted escaped.
///
/// Flag and escape always are, control characters below `0x20` if their bit in the async control
/// character map is set.
pub fn needs_escape(byte: u8, accm: u32) -> bool {
    match byte {
        FLAG | ESCAPE => true,
        0x00..=0x1f => accm & (1 << byte) != 0,
        _ => false,
    }
}

byte_wrapper! {
    /// The unescaped content of a frame between two flags.
    ///
    /// Consists of the optional address and control fields, the PPP frame and the trailing frame
    /// check sequence.
    #[derive(Debug, PartialEq, Eq)]
    pub struct hdlc([u8]);
}

mod field {
    pub(crate) const ADDRESS: usize = 0;
    pub(crate) const CONTROL: usize = 1;
    pub(crate) const HEADER_LEN: usize = 2;
}

impl hdlc {
    /// Imbue a raw octet buffer with frame structure.
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
    /// Returns `Err(Error::Truncated)` if there is no room for a check sequence and at least one
    /// octet of content.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() <= fcs::LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Validate the frame check sequence.
    pub fn check_fcs(&self) -> Result<()> {
        if fcs::check(&self.0) {
            Ok(())
        } else {
            Err(Error::WrongChecksum)
        }
    }

    /// The content covered by the check sequence.
    pub fn content(&self) -> &[u8] {
        &self.0[..self.0.len() - fcs::LEN]
    }

    /// Query if the frame starts with the all-stations address and unnumbered information.
    pub fn has_address_control(&self) -> bool {
        let content = self.content();
        content.len() >= field::HEADER_LEN
            && content[field::ADDRESS] == ADDRESS
            && content[field::CONTROL] == CONTROL
    }
}

/// Header information of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repr {
    /// Whether address and control fields are omitted.
    pub compressed: bool,
}

impl Repr {
    /// Parse a frame, validating its check sequence and header.
    ///
    /// Frames that omit address and control are only accepted when `acfc` allows it, those which
    /// carry both fields are always accepted. Returns the representation and the PPP frame.
    pub fn parse(frame: &hdlc, acfc: bool) -> Result<(Repr, &[u8])> {
        frame.check_len()?;
        frame.check_fcs()?;

        let content = frame.content();
        if frame.has_address_control() {
            Ok((Repr { compressed: false }, &content[field::HEADER_LEN..]))
        } else if acfc {
            Ok((Repr { compressed: true }, content))
        } else {
            Err(Error::Malformed)
        }
    }

    /// The length of the header emitted by this representation.
    pub fn header_len(&self) -> usize {
        if self.compressed { 0 } else { field::HEADER_LEN }
    }

    /// Emit the header into a buffer of at least `header_len` octets.
    pub fn emit(&self, buffer: &mut [u8]) {
        if !self.compressed {
            buffer[field::ADDRESS] = ADDRESS;
            buffer[field::CONTROL] = CONTROL;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_fcs(data: &[u8]) -> Vec<u8> {
        let mut frame = data.to_vec();
        frame.extend_from_slice(&fcs::fcs16(data).to_le_bytes());
        frame
    }

    #[test]
    fn escape_set() {
        assert!(needs_escape(FLAG, 0));
        assert!(needs_escape(ESCAPE, 0));
        assert!(needs_escape(0x11, DEFAULT_ACCM));
        assert!(!needs_escape(0x11, 0));
        assert!(needs_escape(0x11, 1 << 0x11));
        assert!(!needs_escape(0x20, DEFAULT_ACCM));
        assert!(!needs_escape(0xff, DEFAULT_ACCM));
    }

    #[test]
    fn parse_full_header() {
        let frame = with_fcs(&[0xff, 0x03, 0xc0, 0x21, 0x01]);
        let (repr, payload) = Repr::parse(hdlc::new_unchecked(&frame), false).unwrap();
        assert_eq!(repr, Repr { compressed: false });
        assert_eq!(payload, &[0xc0, 0x21, 0x01]);

        // Compression allowed does not mean required.
        let (repr, _) = Repr::parse(hdlc::new_unchecked(&frame), true).unwrap();
        assert!(!repr.compressed);
    }

    #[test]
    fn parse_compressed() {
        let frame = with_fcs(&[0x21, 0x45, 0x00]);
        assert_eq!(Repr::parse(hdlc::new_unchecked(&frame), false), Err(Error::Malformed));
        let (repr, payload) = Repr::parse(hdlc::new_unchecked(&frame), true).unwrap();
        assert!(repr.compressed);
        assert_eq!(payload, &[0x21, 0x45, 0x00]);
    }

    #[test]
    fn parse_bad() {
        assert_eq!(hdlc::new_checked(&[0x12, 0x34]).err(), Some(Error::Truncated));

        let mut frame = with_fcs(&[0xff, 0x03, 0xc0, 0x21]);
        frame[2] = 0x80;
        assert_eq!(Repr::parse(hdlc::new_unchecked(&frame), true), Err(Error::WrongChecksum));
    }
}
