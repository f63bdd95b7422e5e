use super::Framing;
use crate::wire::{fcs, needs_escape, HdlcRepr};
use crate::wire::{HDLC_ESCAPE, HDLC_FLAG, HDLC_TRANSPARENCY};

/// Serializes PPP frames for the line.
///
/// Reuses one buffer for all frames, the encoded frame is valid until the next call.
#[derive(Debug, Default)]
pub struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    /// Create an encoder with an empty buffer.
    pub fn new() -> Self {
        Encoder::default()
    }

    /// Encode a PPP frame, protocol field included.
    ///
    /// Prepends address and control unless compressed, appends the frame check sequence, escapes
    /// and delimits the result with flags.
    pub fn encode(&mut self, frame: &[u8], framing: Framing) -> &[u8] {
        let repr = HdlcRepr { compressed: framing.acfc };
        let mut header = [0; 2];
        repr.emit(&mut header);
        let header = &header[..repr.header_len()];

        let check = !fcs::update(fcs::update(fcs::INIT, header), frame);

        self.buffer.clear();
        self.buffer.push(HDLC_FLAG);
        for &byte in header.iter().chain(frame).chain(check.to_le_bytes().iter()) {
            if needs_escape(byte, framing.accm) {
                self.buffer.push(HDLC_ESCAPE);
                self.buffer.push(byte ^ HDLC_TRANSPARENCY);
            } else {
                self.buffer.push(byte);
            }
        }
        self.buffer.push(HDLC_FLAG);

        &self.buffer
    }
}
