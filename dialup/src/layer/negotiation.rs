//! The option negotiation shared by LCP and IPCP.
use std::time::{Duration, Instant};

use crate::wire::{ConfigOption, ControlBuilder, ControlCode};

/// The time to wait for an answer before a request is sent again.
pub(crate) const RESTART_TIMER: Duration = Duration::from_secs(3);

/// Retransmissions of a Configure-Request before giving up.
pub(crate) const MAX_CONFIGURE: u8 = 10;

/// Retransmissions of a Terminate-Request before giving up.
pub(crate) const MAX_TERMINATE: u8 = 2;

/// Progress of one negotiation round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct Negotiation {
    /// Identifier of the last packet we originated.
    pub identifier: u8,
    /// Identifier of our outstanding Configure-Request.
    pub request: Option<u8>,
    /// We acknowledged the configuration of the peer.
    pub ack_sent: bool,
    /// The peer acknowledged our configuration.
    pub ack_received: bool,
    /// Start of the restart timer, set by the first tick after a packet was sent.
    pub timer: Option<Instant>,
    /// Expirations of the restart timer since the last new request.
    pub restarts: u8,
}

impl Negotiation {
    /// Start over, keeping the identifier sequence.
    pub fn restart(&mut self) {
        *self = Negotiation {
            identifier: self.identifier,
            ..Negotiation::default()
        };
    }

    /// The identifier for the next packet we originate.
    pub fn next_identifier(&mut self) -> u8 {
        self.identifier = self.identifier.wrapping_add(1);
        self.identifier
    }

    pub fn is_opened(&self) -> bool {
        self.ack_sent && self.ack_received
    }

    /// A new Configure-Request was sent, rearm the restart timer.
    pub fn requested(&mut self, identifier: u8) {
        self.request = Some(identifier);
        self.timer = None;
        self.restarts = 0;
    }

    /// Advance the restart timer.
    ///
    /// Returns `true` when the timer expired, the unanswered packet is due again. Each expiration
    /// is counted in `restarts`.
    pub fn expired(&mut self, now: Instant) -> bool {
        match self.timer {
            None => {
                self.timer = Some(now);
                false
            },
            Some(started) if now.saturating_duration_since(started) < RESTART_TIMER => false,
            Some(_) => {
                self.timer = Some(now);
                self.restarts = self.restarts.saturating_add(1);
                true
            },
        }
    }

    /// Whether a reply to our request carries the matching identifier.
    pub fn answers_request(&self, identifier: u8) -> bool {
        self.request == Some(identifier)
    }
}

/// The reply to a Configure-Request under construction.
///
/// Starts out as Configure-Ack and escalates to Configure-Nak and Configure-Reject. Options of a
/// lower disposition than the current code are dropped from the reply since a reply never mixes
/// dispositions.
#[derive(Debug)]
pub(crate) struct Response {
    builder: ControlBuilder,
}

impl Response {
    pub fn new(identifier: u8) -> Self {
        Response {
            builder: ControlBuilder::new(ControlCode::ConfigureAck, identifier),
        }
    }

    pub fn code(&self) -> ControlCode {
        self.builder.code()
    }

    /// Acknowledge an option unchanged.
    pub fn ack(&mut self, option: &ConfigOption) {
        if self.code() == ControlCode::ConfigureAck {
            self.builder.extend(option.raw);
        }
    }

    /// Suggest another value for an option, given in its encoded form.
    pub fn nak(&mut self, suggestion: &[u8]) {
        match self.code() {
            ControlCode::ConfigureAck => {
                self.builder.clear_data();
                self.builder.set_code(ControlCode::ConfigureNak);
                self.builder.extend(suggestion);
            },
            ControlCode::ConfigureNak => self.builder.extend(suggestion),
            _ => (),
        }
    }

    /// Refuse an option.
    pub fn reject(&mut self, option: &ConfigOption) {
        if self.code() != ControlCode::ConfigureReject {
            self.builder.clear_data();
            self.builder.set_code(ControlCode::ConfigureReject);
        }
        self.builder.extend(option.raw);
    }

    pub fn finish(self) -> Vec<u8> {
        self.builder.finish()
    }
}
