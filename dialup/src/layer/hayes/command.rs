use crate::wire::{Error, Result};

/// One command of a command line.
///
/// Numeric parameters are not range checked, an omitted parameter reads as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// `A`: answer a call.
    Answer,
    /// `D`: dial the number, modifiers included.
    Dial(&'a [u8]),
    /// `E`: command echo.
    Echo(u32),
    /// `H`: hook control.
    Hook(u32),
    /// `I`: identification.
    Identify(u32),
    /// `L`: speaker loudness.
    Loudness(u32),
    /// `M`: speaker mode.
    Monitor(u32),
    /// `O`: return to data mode.
    Online(u32),
    /// `Q`: suppress result codes.
    Quiet(u32),
    /// `Sn?` or `Sn`: read a register.
    ReadRegister(u32),
    /// `Sn=v`: write a register.
    WriteRegister(u32, u32),
    /// `V`: verbose result codes.
    Verbose(u32),
    /// `X`: extended result codes.
    ResultSet(u32),
    /// `Z`: reset.
    Reset(u32),
}

/// Splits a command line, without `AT`, into commands.
///
/// Spaces between commands are ignored. Stops after the first error.
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    line: &'a [u8],
    failed: bool,
}

impl<'a> Parser<'a> {
    /// Parse a command line.
    pub fn new(line: &'a [u8]) -> Self {
        Parser { line, failed: false }
    }

    fn skip_spaces(&mut self) {
        while let [b' ', rest @ ..] = self.line {
            self.line = rest;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.line.first().copied()
    }

    fn number(&mut self) -> u32 {
        let mut value = 0u32;
        while let Some(digit) = self.peek().filter(u8::is_ascii_digit) {
            value = value.saturating_mul(10).saturating_add(u32::from(digit - b'0'));
            self.line = &self.line[1..];
        }
        value
    }

    fn dial(&mut self) -> Result<Command<'a>> {
        let len = self.line.iter()
            .position(|&byte| !is_dial_character(byte))
            .unwrap_or(self.line.len());
        let (number, rest) = self.line.split_at(len);
        self.line = rest;

        match self.peek() {
            None => Ok(Command::Dial(number)),
            Some(b';') => {
                self.line = &self.line[1..];
                Ok(Command::Dial(number))
            },
            Some(_) => Err(Error::Malformed),
        }
    }

    fn register(&mut self) -> Command<'a> {
        let register = self.number();
        self.skip_spaces();
        match self.peek() {
            Some(b'=') => {
                self.line = &self.line[1..];
                self.skip_spaces();
                Command::WriteRegister(register, self.number())
            },
            Some(b'?') => {
                self.line = &self.line[1..];
                Command::ReadRegister(register)
            },
            _ => Command::ReadRegister(register),
        }
    }

    fn command(&mut self, letter: u8) -> Result<Command<'a>> {
        let command = match letter.to_ascii_uppercase() {
            b'A' => Command::Answer,
            b'D' => return self.dial(),
            b'S' => self.register(),
            b'E' => Command::Echo(self.number()),
            b'H' => Command::Hook(self.number()),
            b'I' => Command::Identify(self.number()),
            b'L' => Command::Loudness(self.number()),
            b'M' => Command::Monitor(self.number()),
            b'O' => Command::Online(self.number()),
            b'Q' => Command::Quiet(self.number()),
            b'V' => Command::Verbose(self.number()),
            b'X' => Command::ResultSet(self.number()),
            b'Z' => Command::Reset(self.number()),
            other if other.is_ascii_alphabetic() => return Err(Error::Unrecognized),
            _ => return Err(Error::Malformed),
        };
        Ok(command)
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Command<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.skip_spaces();
        let (&letter, rest) = self.line.split_first()?;
        self.line = rest;

        let command = self.command(letter);
        self.failed = command.is_err();
        Some(command)
    }
}

fn is_dial_character(byte: u8) -> bool {
    match byte {
        b'0'..=b'9' | b'*' | b'#' | b'+' | b',' | b'!' | b'@' | b' ' => true,
        b'A'..=b'D' | b'a'..=b'd' => true,
        b'T' | b't' | b'P' | b'p' | b'W' | b'w' => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &[u8]) -> Vec<Result<Command>> {
        Parser::new(line).collect()
    }

    #[test]
    fn basic_commands() {
        assert_eq!(parse(b"E0V1Q0"), vec![
            Ok(Command::Echo(0)),
            Ok(Command::Verbose(1)),
            Ok(Command::Quiet(0)),
        ]);
        assert_eq!(parse(b"e q v"), vec![
            Ok(Command::Echo(0)),
            Ok(Command::Quiet(0)),
            Ok(Command::Verbose(0)),
        ]);
        assert!(parse(b"").is_empty());
    }

    #[test]
    fn registers() {
        assert_eq!(parse(b"S0=2S7?S12 S3 = 13"), vec![
            Ok(Command::WriteRegister(0, 2)),
            Ok(Command::ReadRegister(7)),
            Ok(Command::ReadRegister(12)),
            Ok(Command::WriteRegister(3, 13)),
        ]);
        assert_eq!(parse(b"S99999999999=1"), vec![Ok(Command::WriteRegister(u32::max_value(), 1))]);
    }

    #[test]
    fn dial_string() {
        assert_eq!(parse(b"DT555-1234"), vec![Err(Error::Malformed)]);
        assert_eq!(parse(b"DT 555 1234;E1"), vec![
            Ok(Command::Dial(b"T 555 1234")),
            Ok(Command::Echo(1)),
        ]);
        assert_eq!(parse(b"dp*99#"), vec![Ok(Command::Dial(b"p*99#"))]);
    }

    #[test]
    fn stops_at_error() {
        assert_eq!(parse(b"E1&FV1"), vec![Ok(Command::Echo(1)), Err(Error::Malformed)]);
        assert_eq!(parse(b"E1GV1"), vec![Ok(Command::Echo(1)), Err(Error::Unrecognized)]);
    }
}
