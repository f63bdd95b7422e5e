//! The Hayes AT command interpreter.
//!
//! The modem starts in command mode. Bytes are echoed, a line starting with `AT` is collected up
//! to the carriage return and executed. Dialing or answering a call switches to data mode, where
//! every byte is passed on to the line unchanged. Three escape characters (`+++` by default)
//! followed by a pause return to command mode while the call stays connected.
//!
//! The pause is not measured here. With the default [`Guard::Receive`], a call that ends with the
//! third escape character is followed by a pause: the escape is taken on the next call to
//! [`Endpoint::receive`] or [`Endpoint::idle`]. With [`Guard::Idle`] only [`Endpoint::idle`]
//! takes it, for callers that know when the line really was quiet. Any other byte after an escape
//! character passes the held characters on as data, and so does [`Endpoint::idle`] after an
//! incomplete sequence.
//!
//! [`Guard::Receive`]: enum.Guard.html#variant.Receive
//! [`Guard::Idle`]: enum.Guard.html#variant.Idle
//! [`Endpoint::receive`]: struct.Endpoint.html#method.receive
//! [`Endpoint::idle`]: struct.Endpoint.html#method.idle
use core::fmt;

mod command;
mod endpoint;

pub use command::{Command, Parser};
pub use endpoint::Endpoint;

/// Number of S-registers.
pub const REGISTERS: usize = 13;

/// Register values after reset.
pub const DEFAULT_REGISTERS: [u8; REGISTERS] = [0, 0, b'+', b'\r', b'\n', 0x08, 2, 50, 2, 6, 14, 95, 50];

/// Longest command line, without the `AT` prefix.
pub const COMMAND_LEN: usize = 64;

/// Register of the escape character.
pub const S_ESCAPE: usize = 2;
/// Register of the line terminator.
pub const S_CARRIAGE_RETURN: usize = 3;
/// Register of the line feed sent with verbose responses.
pub const S_LINE_FEED: usize = 4;
/// Register of the backspace character.
pub const S_BACKSPACE: usize = 5;
/// Register of the escape guard time, in fiftieths of a second.
pub const S_GUARD_TIME: usize = 12;

/// Identification sent by default in reply to `ATI`.
pub const IDENTIFICATION: &str = "dialup modem bank";

/// The mode of the interpreter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    /// Waiting for the `A` of a command line.
    Command,
    /// Got the `A`, waiting for the `T`.
    CommandA,
    /// Collecting a command line.
    CommandAt,
    /// Passing bytes through.
    Data,
    /// One escape character held back.
    DataPlus1,
    /// Two escape characters held back.
    DataPlus2,
    /// Three escape characters held back, waiting for the pause.
    DataPlus3,
}

/// What counts as the pause that completes an escape sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Guard {
    /// The end of a call to `receive`.
    Receive,
    /// Only a call to `idle`.
    Idle,
}

impl Default for Guard {
    fn default() -> Self {
        Guard::Receive
    }
}

impl State {
    /// Whether bytes are passed to the line in this state.
    pub fn is_data(self) -> bool {
        match self {
            State::Data | State::DataPlus1 | State::DataPlus2 | State::DataPlus3 => true,
            _ => false,
        }
    }
}

enum_with_unknown! {
    /// A result code reported at the end of a command line.
    pub enum ResultCode(u8) {
        /// The command line was executed.
        Ok = 0,
        /// A call was connected, data mode follows.
        Connect = 1,
        /// An incoming call.
        Ring = 2,
        /// The call ended.
        NoCarrier = 3,
        /// The command line was malformed or a command failed.
        Error = 4,
        /// No line is attached.
        NoDialtone = 6,
        /// The other end refused the call.
        Busy = 7,
        /// The other end did not pick up.
        NoAnswer = 8,
    }
}

impl ResultCode {
    /// The text sent in verbose mode.
    pub fn text(self) -> &'static str {
        match self {
            ResultCode::Ok => "OK",
            ResultCode::Connect => "CONNECT",
            ResultCode::Ring => "RING",
            ResultCode::NoCarrier => "NO CARRIER",
            ResultCode::Error => "ERROR",
            ResultCode::NoDialtone => "NO DIALTONE",
            ResultCode::Busy => "BUSY",
            ResultCode::NoAnswer => "NO ANSWER",
            ResultCode::Unknown(_) => "<undefined>",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// The telephone line and the data path behind the modem.
pub trait Line {
    /// Send bytes back to the terminal.
    fn transmit(&mut self, bytes: &[u8]);

    /// Pass bytes received in data mode.
    fn data(&mut self, bytes: &[u8]);

    /// Place or answer a call. Returns `false` if the other end is busy.
    fn dial(&mut self) -> bool {
        true
    }

    /// The call is connected and data mode entered.
    fn online(&mut self) {}

    /// The call was hung up from the command line.
    fn hangup(&mut self) {}
}
