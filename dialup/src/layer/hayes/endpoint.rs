use core::{iter, mem};
use std::time::Duration;

use super::{Command, Guard, Line, Parser, ResultCode, State};
use super::{COMMAND_LEN, DEFAULT_REGISTERS, IDENTIFICATION, REGISTERS};
use super::{S_BACKSPACE, S_CARRIAGE_RETURN, S_ESCAPE, S_GUARD_TIME, S_LINE_FEED};
use crate::layer::{Error, Result};

/// The command interpreter of one modem.
#[derive(Debug, Clone)]
pub struct Endpoint {
    state: State,
    /// The command line after `AT`.
    buffer: Vec<u8>,
    /// The command line did not fit into the buffer.
    overflow: bool,
    echo: bool,
    quiet: bool,
    verbose: bool,
    result_set: u8,
    registers: [u8; REGISTERS],
    connected: bool,
    guard: Guard,
    identification: String,
}

/// What to do once a command line executed without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Nothing,
    Dial,
    Online,
}

impl Endpoint {
    /// A modem in command mode with default settings.
    pub fn new() -> Self {
        Endpoint::with_identification(IDENTIFICATION)
    }

    /// A modem answering `ATI` with the given text.
    pub fn with_identification(identification: impl Into<String>) -> Self {
        Endpoint {
            state: State::Command,
            buffer: Vec::with_capacity(COMMAND_LEN),
            overflow: false,
            echo: true,
            quiet: false,
            verbose: true,
            result_set: 4,
            registers: DEFAULT_REGISTERS,
            connected: false,
            guard: Guard::default(),
            identification: identification.into(),
        }
    }

    /// The current mode.
    pub fn state(&self) -> State {
        self.state
    }

    /// Whether received command bytes are echoed.
    pub fn echo(&self) -> bool {
        self.echo
    }

    /// Whether result codes are suppressed.
    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Whether result codes are sent as text.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// The result code set selected with `X`.
    pub fn result_set(&self) -> u8 {
        self.result_set
    }

    /// The value of an S-register.
    pub fn register(&self, index: usize) -> Option<u8> {
        self.registers.get(index).copied()
    }

    /// Whether a call is connected, in data or in command mode.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// What completes an escape sequence.
    pub fn guard(&self) -> Guard {
        self.guard
    }

    /// Choose what completes an escape sequence.
    ///
    /// Kept across `ATZ`, this is a property of the line and not of the modem settings.
    pub fn set_guard(&mut self, guard: Guard) {
        self.guard = guard;
    }

    /// The pause that must follow an escape sequence.
    pub fn guard_time(&self) -> Duration {
        Duration::from_millis(u64::from(self.registers[S_GUARD_TIME]) * 20)
    }

    /// Process bytes from the terminal.
    ///
    /// With `Guard::Receive` an escape sequence completed by the previous call is taken first.
    pub fn receive<L: Line + ?Sized>(&mut self, bytes: &[u8], line: &mut L) {
        if self.guard == Guard::Receive {
            self.take_escape(line);
        }

        let mut data = Vec::new();
        for &byte in bytes {
            if self.state.is_data() {
                self.data_byte(byte, &mut data);
            } else {
                self.command_byte(byte, line);
            }
        }

        if !data.is_empty() {
            line.data(&data);
        }
    }

    /// Nothing was received for the guard time.
    ///
    /// Takes a completed escape sequence, an incomplete one is passed on as data.
    pub fn idle<L: Line + ?Sized>(&mut self, line: &mut L) {
        self.take_escape(line);

        let held = match self.state {
            State::DataPlus1 => 1,
            State::DataPlus2 => 2,
            _ => return,
        };

        let escape = self.registers[S_ESCAPE];
        let data: Vec<u8> = iter::repeat(escape).take(held).collect();
        self.state = State::Data;
        line.data(&data);
    }

    /// The call was lost, return to command mode.
    pub fn no_carrier<L: Line + ?Sized>(&mut self, line: &mut L) {
        if !self.connected && !self.state.is_data() {
            return;
        }

        net_info!("hayes: no carrier");
        self.connected = false;
        self.state = State::Command;
        self.result(ResultCode::NoCarrier, line);
    }

    fn take_escape<L: Line + ?Sized>(&mut self, line: &mut L) {
        if self.state == State::DataPlus3 {
            net_debug!("hayes: escaped to command mode");
            self.state = State::Command;
            self.result(ResultCode::Ok, line);
        }
    }

    fn data_byte(&mut self, byte: u8, data: &mut Vec<u8>) {
        let escape = self.registers[S_ESCAPE];
        // Values above 127 disable the escape sequence.
        if escape > 127 {
            data.push(byte);
            return;
        }

        let held = match self.state {
            State::DataPlus1 => 1,
            State::DataPlus2 => 2,
            State::DataPlus3 => 3,
            _ => 0,
        };

        if byte == escape && held < 3 {
            self.state = match held {
                0 => State::DataPlus1,
                1 => State::DataPlus2,
                _ => State::DataPlus3,
            };
            return;
        }

        // The run of escape characters was broken, they are data after all.
        data.extend(iter::repeat(escape).take(held));
        if byte == escape {
            self.state = State::DataPlus1;
        } else {
            self.state = State::Data;
            data.push(byte);
        }
    }

    fn command_byte<L: Line + ?Sized>(&mut self, byte: u8, line: &mut L) {
        match self.state {
            State::Command => {
                if byte.eq_ignore_ascii_case(&b'A') {
                    self.state = State::CommandA;
                }
            },
            State::CommandA => {
                if byte.eq_ignore_ascii_case(&b'T') {
                    self.state = State::CommandAt;
                    self.buffer.clear();
                    self.overflow = false;
                } else if !byte.eq_ignore_ascii_case(&b'A') {
                    self.state = State::Command;
                }
            },
            _ => {
                if byte == self.registers[S_CARRIAGE_RETURN] {
                    if self.echo {
                        line.transmit(&[byte]);
                    }
                    self.execute(line);
                    return;
                }

                if byte == self.registers[S_BACKSPACE] {
                    if self.buffer.pop().is_some() && self.echo {
                        line.transmit(b"\x08 \x08");
                    }
                    return;
                }

                if byte == b' ' || byte.is_ascii_graphic() {
                    if self.buffer.len() < COMMAND_LEN {
                        self.buffer.push(byte);
                    } else {
                        self.overflow = true;
                    }
                }
            },
        }

        if self.echo {
            line.transmit(&[byte]);
        }
    }

    fn execute<L: Line + ?Sized>(&mut self, line: &mut L) {
        self.state = State::Command;
        if self.overflow {
            net_debug!("hayes: command line too long");
            self.result(ResultCode::Error, line);
            return;
        }

        let buffer = mem::replace(&mut self.buffer, Vec::new());
        let mut pending = Pending::Nothing;
        let mut failed = false;
        for command in Parser::new(&buffer) {
            let outcome = command
                .map_err(Error::from)
                .and_then(|command| self.apply(command, &mut pending, line));
            if let Err(err) = outcome {
                net_debug!("hayes: command line {:?} failed, {}", String::from_utf8_lossy(&buffer), err);
                failed = true;
                break;
            }
        }
        self.buffer = buffer;
        self.buffer.clear();

        if failed {
            self.result(ResultCode::Error, line);
            return;
        }

        match pending {
            Pending::Nothing => self.result(ResultCode::Ok, line),
            Pending::Dial => self.connect(line),
            Pending::Online if self.connected => {
                self.result(ResultCode::Connect, line);
                self.state = State::Data;
            },
            Pending::Online => self.result(ResultCode::Error, line),
        }
    }

    fn apply<L: Line + ?Sized>(&mut self, command: Command, pending: &mut Pending, line: &mut L) -> Result<()> {
        match command {
            Command::Answer | Command::Dial(_) => {
                if self.connected {
                    return Err(Error::Illegal);
                }
                *pending = Pending::Dial;
            },
            Command::Echo(value) => self.echo = flag(value)?,
            Command::Quiet(value) => self.quiet = flag(value)?,
            Command::Verbose(value) => self.verbose = flag(value)?,
            Command::Hook(0) => self.hangup(line),
            Command::Hook(1) => (),
            Command::Identify(_) => self.information(self.identification.as_bytes(), line),
            Command::Loudness(0..=3) | Command::Monitor(0..=2) => (),
            Command::Online(0) | Command::Online(1) => *pending = Pending::Online,
            Command::ReadRegister(index) => {
                let value = self.registers.get(index as usize).ok_or(Error::Illegal)?;
                let text = format!("{:03}", value);
                self.information(text.as_bytes(), line);
            },
            Command::WriteRegister(index, value) => {
                let register = self.registers.get_mut(index as usize).ok_or(Error::Illegal)?;
                *register = value_u8(value)?;
            },
            Command::ResultSet(value @ 0..=4) => self.result_set = value as u8,
            Command::Reset(0) | Command::Reset(1) => self.reset(line),
            _ => return Err(Error::Illegal),
        }
        Ok(())
    }

    fn connect<L: Line + ?Sized>(&mut self, line: &mut L) {
        if !line.dial() {
            net_info!("hayes: line busy");
            self.result(ResultCode::Busy, line);
            return;
        }

        net_info!("hayes: connected");
        self.connected = true;
        self.result(ResultCode::Connect, line);
        self.state = State::Data;
        line.online();
    }

    fn hangup<L: Line + ?Sized>(&mut self, line: &mut L) {
        if self.connected {
            net_info!("hayes: hanging up");
            self.connected = false;
            line.hangup();
        }
    }

    fn reset<L: Line + ?Sized>(&mut self, line: &mut L) {
        self.hangup(line);
        self.echo = true;
        self.quiet = false;
        self.verbose = true;
        self.result_set = 4;
        self.registers = DEFAULT_REGISTERS;
    }

    fn result<L: Line + ?Sized>(&self, code: ResultCode, line: &mut L) {
        if self.quiet {
            return;
        }

        let cr = self.registers[S_CARRIAGE_RETURN];
        let lf = self.registers[S_LINE_FEED];
        let mut response = Vec::new();
        if self.verbose {
            response.extend_from_slice(&[cr, lf]);
            response.extend_from_slice(code.text().as_bytes());
            response.extend_from_slice(&[cr, lf]);
        } else {
            response.extend_from_slice(u8::from(code).to_string().as_bytes());
            response.push(cr);
        }
        line.transmit(&response);
    }

    fn information<L: Line + ?Sized>(&self, text: &[u8], line: &mut L) {
        let cr = self.registers[S_CARRIAGE_RETURN];
        let lf = self.registers[S_LINE_FEED];
        let mut response = Vec::new();
        if self.verbose {
            response.extend_from_slice(&[cr, lf]);
        }
        response.extend_from_slice(text);
        response.extend_from_slice(&[cr, lf]);
        line.transmit(&response);
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::new()
    }
}

fn flag(value: u32) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Error::Illegal),
    }
}

fn value_u8(value: u32) -> Result<u8> {
    if value > u32::from(u8::max_value()) {
        Err(Error::Illegal)
    } else {
        Ok(value as u8)
    }
}
