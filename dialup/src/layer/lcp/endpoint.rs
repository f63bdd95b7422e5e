use std::time::Instant;

use byteorder::{ByteOrder, NetworkEndian};

use super::{Config, Event};
use crate::layer::negotiation::{Negotiation, Response, MAX_CONFIGURE, MAX_TERMINATE};
use crate::layer::ppp::{Link, State};
use crate::wire::{control_packet, ConfigOptions, ControlBuilder, ControlCode};
use crate::wire::{LcpOption, LcpOptionType, PppProtocol, DEFAULT_MRU};
use crate::wire::control::HEADER_LEN;

/// The LCP state of one link.
#[derive(Debug)]
pub struct Endpoint {
    config: Config,
    negotiation: Negotiation,
    request: Request,
    /// Options of our outstanding Configure-Request.
    requested: Vec<u8>,
}

/// The options we still ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Request {
    mru: Option<u16>,
    magic: Option<u32>,
}

/// Options of a Configure-Request, applied when we acknowledge it.
#[derive(Clone, Copy, Debug, Default)]
struct Accepted {
    mru: Option<u16>,
    accm: Option<u32>,
    pfc: bool,
    acfc: bool,
}

impl Endpoint {
    /// Create the endpoint of a link that is not yet up.
    pub fn new(config: Config) -> Self {
        Endpoint {
            config,
            negotiation: Negotiation::default(),
            request: Request::from_config(&config),
            requested: Vec::new(),
        }
    }

    /// The local configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether both sides acknowledged a configuration.
    pub fn is_opened(&self) -> bool {
        self.negotiation.is_opened()
    }

    /// Whether we acknowledged a configuration of the peer.
    pub fn ack_sent(&self) -> bool {
        self.negotiation.ack_sent
    }

    /// Whether the peer acknowledged our configuration.
    pub fn ack_received(&self) -> bool {
        self.negotiation.ack_received
    }

    /// Start negotiation, resetting the link parameters.
    pub fn up(&mut self, link: &mut Link, send: &mut dyn FnMut(&[u8])) {
        self.negotiation.restart();
        self.request = Request::from_config(&self.config);
        *link = Link::new(&self.config);
        self.send_request(send);
    }

    /// Forget the negotiation, the link is gone.
    pub fn down(&mut self) {
        self.negotiation.restart();
        self.requested.clear();
    }

    /// Ask the peer to terminate the link.
    pub fn close(&mut self, send: &mut dyn FnMut(&[u8])) {
        self.negotiation.restart();
        let identifier = self.negotiation.next_identifier();
        send(&ControlBuilder::new(ControlCode::TerminateRequest, identifier).finish());
    }

    /// Run the restart timer.
    ///
    /// Sends an unanswered Configure-Request again while establishing the link, and the
    /// Terminate-Request while terminating. Reports `Event::Closed` when the peer did not answer
    /// after the last retransmission.
    pub fn timeout(&mut self, state: State, now: Instant, send: &mut dyn FnMut(&[u8])) -> Option<Event> {
        let limit = match state {
            State::Terminate => MAX_TERMINATE,
            State::Establish if !self.negotiation.ack_received && self.negotiation.request.is_some() => {
                MAX_CONFIGURE
            },
            _ => return None,
        };

        if !self.negotiation.expired(now) {
            return None;
        }

        if self.negotiation.restarts > limit {
            net_warn!("lcp: no answer from peer in {:?}, giving up", state);
            self.negotiation.restart();
            return Some(Event::Closed);
        }

        if state == State::Terminate {
            let identifier = self.negotiation.next_identifier();
            net_debug!("lcp: sending Terminate-Request id {} again", identifier);
            send(&ControlBuilder::new(ControlCode::TerminateRequest, identifier).finish());
        } else {
            self.retransmit(send);
        }
        None
    }

    /// Tell the peer that a protocol is not supported.
    ///
    /// The rejected information is truncated to fit the receive unit of the peer.
    pub fn reject_protocol(
        &mut self,
        protocol: PppProtocol,
        information: &[u8],
        link: &Link,
        send: &mut dyn FnMut(&[u8]),
    ) {
        let identifier = self.negotiation.next_identifier();
        let mut reject = ControlBuilder::new(ControlCode::ProtocolReject, identifier);
        reject.extend(&u16::from(protocol).to_be_bytes());
        let room = usize::from(link.mru).saturating_sub(HEADER_LEN + 2);
        reject.extend(&information[..information.len().min(room)]);
        net_debug!("lcp: rejecting protocol {}", protocol);
        send(&reject.finish());
    }

    /// Process a received LCP packet.
    pub fn receive(
        &mut self,
        state: State,
        link: &mut Link,
        packet: &control_packet,
        send: &mut dyn FnMut(&[u8]),
    ) -> Option<Event> {
        net_trace!("lcp: received {} id {}", packet.code(), packet.identifier());
        match packet.code() {
            ControlCode::ConfigureRequest if state == State::Terminate => None,
            ControlCode::ConfigureRequest => self.configure_request(link, packet, send),
            ControlCode::ConfigureAck => self.configure_ack(packet),
            ControlCode::ConfigureNak => self.configure_nak(link, packet, send),
            ControlCode::ConfigureReject => self.configure_reject(link, packet, send),
            ControlCode::TerminateRequest => {
                let ack = ControlBuilder::new(ControlCode::TerminateAck, packet.identifier());
                send(&ack.finish());
                self.negotiation.restart();
                net_info!("lcp: link terminated by peer");
                Some(Event::Closed)
            },
            ControlCode::TerminateAck if state == State::Terminate => Some(Event::Closed),
            ControlCode::TerminateAck => None,
            ControlCode::CodeReject => self.code_reject(packet),
            ControlCode::ProtocolReject => self.protocol_reject(state, packet),
            ControlCode::EchoRequest => {
                self.echo_request(state, link, packet, send);
                None
            },
            ControlCode::EchoReply | ControlCode::DiscardRequest => None,
            ControlCode::Unknown(_) => {
                self.reject_code(link, packet, send);
                None
            },
        }
    }

    fn configure_request(
        &mut self,
        link: &mut Link,
        packet: &control_packet,
        send: &mut dyn FnMut(&[u8]),
    ) -> Option<Event> {
        if let Err(err) = packet.options().validate() {
            net_debug!("lcp: dropped Configure-Request, {}", err);
            return None;
        }

        let restarted = self.negotiation.is_opened();
        if restarted {
            net_info!("lcp: peer restarted negotiation");
            self.negotiation.restart();
            *link = Link { magic: link.magic, ..Link::new(&self.config) };
            self.send_request(send);
        }

        let mut response = Response::new(packet.identifier());
        let mut accepted = Accepted::default();
        for option in packet.options().filter_map(Result::ok) {
            match LcpOption::parse(&option) {
                Ok(LcpOption::Mru(mru)) if mru < self.config.min_mru => {
                    net_debug!("lcp: rejecting mru {}", mru);
                    response.reject(&option);
                },
                Ok(LcpOption::Mru(mru)) => {
                    accepted.mru = Some(mru);
                    response.ack(&option);
                },
                Ok(LcpOption::Accm(accm)) => {
                    accepted.accm = Some(accm);
                    response.ack(&option);
                },
                Ok(LcpOption::MagicNumber(magic)) if magic == 0 || magic == link.magic => {
                    net_debug!("lcp: peer magic number {:08x} refused", magic);
                    let mut suggestion = Vec::new();
                    LcpOption::MagicNumber(!link.magic).emit(&mut suggestion);
                    response.nak(&suggestion);
                },
                Ok(LcpOption::MagicNumber(_)) => response.ack(&option),
                Ok(LcpOption::ProtocolCompression) => {
                    accepted.pfc = true;
                    response.ack(&option);
                },
                Ok(LcpOption::AddressControlCompression) => {
                    accepted.acfc = true;
                    response.ack(&option);
                },
                Ok(LcpOption::Other(kind)) => {
                    net_debug!("lcp: rejecting option {:?}", kind);
                    response.reject(&option);
                },
                Err(err) => {
                    net_debug!("lcp: rejecting option {}, {}", option.kind, err);
                    response.reject(&option);
                },
            }
        }

        let code = response.code();
        net_debug!("lcp: answering Configure-Request id {} with {}", packet.identifier(), code);
        send(&response.finish());

        self.negotiation.ack_sent = code == ControlCode::ConfigureAck;
        if self.negotiation.ack_sent {
            if let Some(mru) = accepted.mru {
                link.mru = link.mru.min(mru);
            }
            if let Some(accm) = accepted.accm {
                link.accm = accm;
            }
            link.pfc = accepted.pfc;
            link.acfc = accepted.acfc;
        }

        if restarted {
            Some(Event::Restarted)
        } else {
            self.check_opened()
        }
    }

    fn configure_ack(&mut self, packet: &control_packet) -> Option<Event> {
        if !self.negotiation.answers_request(packet.identifier()) || packet.data() != &self.requested[..] {
            net_debug!("lcp: dropped Configure-Ack id {} not matching our request", packet.identifier());
            return None;
        }

        if self.negotiation.ack_received {
            return None;
        }

        self.negotiation.ack_received = true;
        self.check_opened()
    }

    fn configure_nak(
        &mut self,
        link: &mut Link,
        packet: &control_packet,
        send: &mut dyn FnMut(&[u8]),
    ) -> Option<Event> {
        if !self.negotiation.answers_request(packet.identifier()) {
            return None;
        }

        for option in packet.options().filter_map(Result::ok) {
            match LcpOption::parse(&option) {
                Ok(LcpOption::Mru(mru)) if self.config.min_mru <= mru && mru <= DEFAULT_MRU => {
                    net_debug!("lcp: peer suggests mru {}", mru);
                    self.request.mru = Some(mru);
                },
                Ok(LcpOption::MagicNumber(magic)) if magic != 0 => {
                    net_debug!("lcp: peer suggests magic number {:08x}", magic);
                    self.request.magic = Some(magic);
                    link.magic = magic;
                },
                _ => (),
            }
        }

        self.negotiation.ack_received = false;
        self.send_request(send);
        None
    }

    fn configure_reject(
        &mut self,
        link: &mut Link,
        packet: &control_packet,
        send: &mut dyn FnMut(&[u8]),
    ) -> Option<Event> {
        if !self.negotiation.answers_request(packet.identifier()) {
            return None;
        }

        for option in ConfigOptions::new(packet.data()).filter_map(Result::ok) {
            match LcpOptionType::from(option.kind) {
                LcpOptionType::Mru => self.request.mru = None,
                LcpOptionType::MagicNumber => {
                    self.request.magic = None;
                    link.magic = 0;
                },
                _ => (),
            }
        }

        net_debug!("lcp: peer rejected options, now requesting {:?}", self.request);
        self.negotiation.ack_received = false;
        self.send_request(send);
        None
    }

    fn code_reject(&mut self, packet: &control_packet) -> Option<Event> {
        let rejected = ControlCode::from(*packet.data().first()?);
        match rejected {
            ControlCode::EchoRequest
            | ControlCode::EchoReply
            | ControlCode::DiscardRequest
            | ControlCode::Unknown(_) => {
                net_debug!("lcp: peer does not support {}", rejected);
                None
            },
            _ => {
                net_warn!("lcp: peer rejected {}, closing link", rejected);
                self.negotiation.restart();
                Some(Event::Closed)
            },
        }
    }

    fn protocol_reject(&mut self, state: State, packet: &control_packet) -> Option<Event> {
        let data = packet.data();
        if state != State::Network || data.len() < 2 {
            return None;
        }

        let protocol = PppProtocol::from(NetworkEndian::read_u16(&data[..2]));
        net_debug!("lcp: peer rejected protocol {}", protocol);
        Some(Event::ProtocolRejected(protocol))
    }

    fn echo_request(
        &mut self,
        state: State,
        link: &Link,
        packet: &control_packet,
        send: &mut dyn FnMut(&[u8]),
    ) {
        match state {
            State::Authenticate | State::Network => (),
            _ => return,
        }

        if packet.data().len() < 4 {
            net_debug!("lcp: dropped Echo-Request without magic number");
            return;
        }

        let mut reply = packet.packet().to_vec();
        let reply_packet = control_packet::new_unchecked_mut(&mut reply);
        reply_packet.set_code(ControlCode::EchoReply);
        NetworkEndian::write_u32(&mut reply_packet.data_mut()[..4], link.magic);
        send(&reply);
    }

    fn reject_code(&mut self, link: &Link, packet: &control_packet, send: &mut dyn FnMut(&[u8])) {
        let identifier = self.negotiation.next_identifier();
        let mut reject = ControlBuilder::new(ControlCode::CodeReject, identifier);
        let rejected = packet.packet();
        let room = usize::from(link.mru).saturating_sub(HEADER_LEN);
        reject.extend(&rejected[..rejected.len().min(room)]);
        net_debug!("lcp: rejecting {}", packet.code());
        send(&reject.finish());
    }

    fn send_request(&mut self, send: &mut dyn FnMut(&[u8])) {
        let identifier = self.negotiation.next_identifier();
        let mut request = ControlBuilder::new(ControlCode::ConfigureRequest, identifier);

        self.requested.clear();
        if let Some(mru) = self.request.mru {
            LcpOption::Mru(mru).emit(&mut self.requested);
        }
        if let Some(magic) = self.request.magic {
            LcpOption::MagicNumber(magic).emit(&mut self.requested);
        }
        request.extend(&self.requested);

        self.negotiation.requested(identifier);
        net_debug!("lcp: sending Configure-Request id {}", identifier);
        send(&request.finish());
    }

    /// Send the outstanding Configure-Request again, unchanged.
    fn retransmit(&mut self, send: &mut dyn FnMut(&[u8])) {
        let identifier = match self.negotiation.request {
            Some(identifier) => identifier,
            None => return,
        };

        let mut request = ControlBuilder::new(ControlCode::ConfigureRequest, identifier);
        request.extend(&self.requested);
        net_debug!("lcp: sending Configure-Request id {} again", identifier);
        send(&request.finish());
    }

    fn check_opened(&self) -> Option<Event> {
        if self.negotiation.is_opened() {
            net_info!("lcp: link opened");
            Some(Event::Opened)
        } else {
            None
        }
    }
}

impl Request {
    fn from_config(config: &Config) -> Self {
        Request {
            mru: Some(config.mru),
            magic: Some(config.magic),
        }
    }
}
