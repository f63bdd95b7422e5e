use core::mem;

use crate::wire::{fcs, hdlc_frame, HdlcRepr, DEFAULT_MRU};
use crate::wire::{HDLC_ESCAPE, HDLC_FLAG, HDLC_OVERHEAD, HDLC_TRANSPARENCY};

/// Assembles and validates frames from the octet stream of a call.
#[derive(Debug)]
pub struct Decoder {
    buffer: Vec<u8>,
    capacity: usize,
    state: State,
    escape: bool,
    acfc: bool,
    /// The buffer still holds the last emitted frame.
    emitted: bool,
    stats: Statistics,
}

/// Counters of the decoded frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Statistics {
    /// Frames passed to the upper layer.
    pub frames: u64,
    /// Frames dropped for a wrong check sequence.
    pub checksum: u64,
    /// Frames dropped for exceeding the buffer.
    pub oversize: u64,
    /// Frames dropped for being too short or missing address and control.
    pub malformed: u64,
    /// Frames aborted by the sender.
    pub aborted: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum State {
    /// No flag seen yet, octets are line noise.
    Hunt,
    /// Collecting the octets of a frame.
    Frame,
    /// The frame exceeded the buffer, discard until the next flag.
    Rejected,
}

impl Decoder {
    /// A decoder accepting frames up to the default MRU.
    pub fn new() -> Self {
        Decoder::with_capacity(usize::from(DEFAULT_MRU) + HDLC_OVERHEAD)
    }

    /// A decoder whose buffer holds `capacity` unescaped octets between two flags.
    pub fn with_capacity(capacity: usize) -> Self {
        Decoder {
            buffer: Vec::with_capacity(capacity),
            capacity,
            state: State::Hunt,
            escape: false,
            acfc: false,
            emitted: false,
            stats: Statistics::default(),
        }
    }

    /// Accept frames that omit address and control fields.
    pub fn set_acfc(&mut self, acfc: bool) {
        self.acfc = acfc;
    }

    /// The counters of decoded and dropped frames.
    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Forget any partial frame and wait for the next flag.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = State::Hunt;
        self.escape = false;
        self.acfc = false;
        self.emitted = false;
    }

    /// Process one octet from the line.
    ///
    /// Returns the PPP frame, protocol field and information, when a flag closes a valid frame.
    /// The frame is borrowed from the internal buffer and only valid until the next call.
    pub fn receive_byte(&mut self, byte: u8) -> Option<&[u8]> {
        if mem::replace(&mut self.emitted, false) {
            self.buffer.clear();
        }

        if byte == HDLC_FLAG {
            let escaped = mem::replace(&mut self.escape, false);
            return match mem::replace(&mut self.state, State::Frame) {
                State::Hunt => None,
                State::Rejected => {
                    net_debug!("hdlc: dropped oversized frame");
                    self.stats.oversize += 1;
                    self.buffer.clear();
                    None
                },
                State::Frame if escaped => {
                    net_debug!("hdlc: frame aborted by peer");
                    self.stats.aborted += 1;
                    self.buffer.clear();
                    None
                },
                State::Frame if self.buffer.is_empty() => None,
                State::Frame => self.emit(),
            };
        }

        match self.state {
            State::Hunt | State::Rejected => return None,
            State::Frame => (),
        }

        if byte == HDLC_ESCAPE && !self.escape {
            self.escape = true;
            return None;
        }

        let byte = if mem::replace(&mut self.escape, false) {
            byte ^ HDLC_TRANSPARENCY
        } else {
            byte
        };

        if self.buffer.len() >= self.capacity {
            self.state = State::Rejected;
            self.buffer.clear();
        } else {
            self.buffer.push(byte);
        }

        None
    }

    fn emit(&mut self) -> Option<&[u8]> {
        self.emitted = true;

        let frame = hdlc_frame::new_unchecked(&self.buffer);
        match HdlcRepr::parse(frame, self.acfc).map(|(repr, _)| repr.header_len()) {
            Ok(start) => {
                self.stats.frames += 1;
                let end = self.buffer.len() - fcs::LEN;
                net_trace!("hdlc: received frame of {} octets", end - start);
                Some(&self.buffer[start..end])
            },
            Err(crate::wire::Error::WrongChecksum) => {
                net_debug!("hdlc: dropped frame with bad check sequence");
                self.stats.checksum += 1;
                None
            },
            Err(err) => {
                net_debug!("hdlc: dropped frame, {}", err);
                self.stats.malformed += 1;
                None
            },
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}
