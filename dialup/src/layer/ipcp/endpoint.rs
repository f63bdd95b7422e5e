use std::time::Instant;

use super::{Config, Event};
use crate::layer::negotiation::{Negotiation, Response, MAX_CONFIGURE};
use crate::layer::ppp::Link;
use crate::wire::control::HEADER_LEN;
use crate::wire::{control_packet, ConfigOptions, ControlBuilder, ControlCode};
use crate::wire::{IpcpAddressOption, IpcpOption, IpcpOptionType, Ipv4Address};

/// The IPCP state of one link.
#[derive(Debug)]
pub struct Endpoint {
    config: Config,
    negotiation: Negotiation,
    /// The value currently held for each address option, indexed by `IpcpAddressOption::index`.
    held: [Option<Ipv4Address>; 5],
    /// Whether we still ask for our own address.
    request_address: bool,
    requested: Vec<u8>,
}

impl Endpoint {
    /// Create the endpoint of a network layer that is not yet up.
    pub fn new(config: Config) -> Self {
        Endpoint {
            config,
            negotiation: Negotiation::default(),
            held: Self::configured(&config),
            request_address: true,
            requested: Vec::new(),
        }
    }

    /// The local configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The address of the peer, once known.
    pub fn remote(&self) -> Option<Ipv4Address> {
        self.value(IpcpAddressOption::IpAddress)
    }

    /// The value held for an address option of the peer.
    pub fn value(&self, which: IpcpAddressOption) -> Option<Ipv4Address> {
        self.held[which.index()]
    }

    /// Whether both sides acknowledged a configuration.
    pub fn is_opened(&self) -> bool {
        self.negotiation.is_opened()
    }

    /// Start negotiation from the configuration.
    pub fn up(&mut self, send: &mut dyn FnMut(&[u8])) {
        self.negotiation.restart();
        self.held = Self::configured(&self.config);
        self.request_address = true;
        self.send_request(send);
    }

    /// Forget the negotiation, the link is no longer in the network phase.
    pub fn down(&mut self) {
        self.negotiation.restart();
        self.requested.clear();
    }

    /// Run the restart timer.
    ///
    /// Sends an unanswered Configure-Request again. Reports `Event::Closed` when the peer did not
    /// answer after the last retransmission.
    pub fn timeout(&mut self, now: Instant, send: &mut dyn FnMut(&[u8])) -> Option<Event> {
        let identifier = match self.negotiation.request {
            Some(identifier) if !self.negotiation.ack_received => identifier,
            _ => return None,
        };

        if !self.negotiation.expired(now) {
            return None;
        }

        if self.negotiation.restarts > MAX_CONFIGURE {
            net_warn!("ipcp: no answer from peer, giving up");
            self.negotiation.restart();
            return Some(Event::Closed);
        }

        let mut request = ControlBuilder::new(ControlCode::ConfigureRequest, identifier);
        request.extend(&self.requested);
        net_debug!("ipcp: sending Configure-Request id {} again", identifier);
        send(&request.finish());
        None
    }

    /// Process a received IPCP packet.
    pub fn receive(
        &mut self,
        link: &Link,
        packet: &control_packet,
        send: &mut dyn FnMut(&[u8]),
    ) -> Option<Event> {
        net_trace!("ipcp: received {} id {}", packet.code(), packet.identifier());
        match packet.code() {
            ControlCode::ConfigureRequest => self.configure_request(packet, send),
            ControlCode::ConfigureAck => {
                if !self.negotiation.answers_request(packet.identifier())
                    || packet.data() != &self.requested[..]
                {
                    net_debug!("ipcp: dropped Configure-Ack id {}", packet.identifier());
                    return None;
                }
                if self.negotiation.ack_received {
                    return None;
                }
                self.negotiation.ack_received = true;
                self.check_opened()
            },
            ControlCode::ConfigureNak => {
                if self.negotiation.answers_request(packet.identifier()) {
                    // Our own address is not up for discussion.
                    net_debug!("ipcp: peer suggested other values, insisting on {}", self.config.local);
                    self.negotiation.ack_received = false;
                    self.send_request(send);
                }
                None
            },
            ControlCode::ConfigureReject => {
                if self.negotiation.answers_request(packet.identifier()) {
                    let rejected = ConfigOptions::new(packet.data())
                        .filter_map(Result::ok)
                        .any(|option| IpcpOptionType::from(option.kind) == IpcpOptionType::IpAddress);
                    if rejected {
                        net_debug!("ipcp: peer rejected our address");
                        self.request_address = false;
                    }
                    self.negotiation.ack_received = false;
                    self.send_request(send);
                }
                None
            },
            ControlCode::TerminateRequest => {
                send(&ControlBuilder::new(ControlCode::TerminateAck, packet.identifier()).finish());
                self.negotiation.restart();
                net_info!("ipcp: network layer terminated by peer");
                Some(Event::Closed)
            },
            ControlCode::TerminateAck => None,
            ControlCode::CodeReject => {
                net_debug!("ipcp: peer sent Code-Reject");
                None
            },
            _ => {
                self.reject_code(link, packet, send);
                None
            },
        }
    }

    fn configure_request(&mut self, packet: &control_packet, send: &mut dyn FnMut(&[u8])) -> Option<Event> {
        if let Err(err) = packet.options().validate() {
            net_debug!("ipcp: dropped Configure-Request, {}", err);
            return None;
        }

        let restarted = self.negotiation.is_opened();
        if restarted {
            net_info!("ipcp: peer restarted negotiation");
            self.negotiation.restart();
            self.send_request(send);
        }

        let mut response = Response::new(packet.identifier());
        let mut adopted = [None; 5];
        for option in packet.options().filter_map(Result::ok) {
            let (which, value) = match IpcpOption::parse(&option) {
                Ok(IpcpOption::Address(which, value)) => (which, value),
                Ok(IpcpOption::Other(kind)) => {
                    net_debug!("ipcp: rejecting option {:?}", kind);
                    response.reject(&option);
                    continue;
                },
                Err(err) => {
                    net_debug!("ipcp: rejecting option {}, {}", option.kind, err);
                    response.reject(&option);
                    continue;
                },
            };

            let configured = self.config.configured(which);
            if value.is_unspecified() {
                match configured {
                    Some(configured) => Self::suggest(&mut response, which, configured),
                    None => response.reject(&option),
                }
            } else if Some(value) == self.held[which.index()] {
                response.ack(&option);
            } else if let Some(configured) = configured {
                Self::suggest(&mut response, which, configured);
            } else {
                adopted[which.index()] = Some(value);
                response.ack(&option);
            }
        }

        let code = response.code();
        net_debug!("ipcp: answering Configure-Request id {} with {}", packet.identifier(), code);
        send(&response.finish());

        self.negotiation.ack_sent = code == ControlCode::ConfigureAck;
        if self.negotiation.ack_sent {
            for (held, adopted) in self.held.iter_mut().zip(adopted.iter()) {
                if adopted.is_some() {
                    *held = *adopted;
                }
            }
        }

        if restarted {
            Some(Event::Restarted)
        } else {
            self.check_opened()
        }
    }

    fn suggest(response: &mut Response, which: IpcpAddressOption, value: Ipv4Address) {
        let mut suggestion = Vec::new();
        IpcpOption::Address(which, value).emit(&mut suggestion);
        response.nak(&suggestion);
    }

    fn reject_code(&mut self, link: &Link, packet: &control_packet, send: &mut dyn FnMut(&[u8])) {
        let identifier = self.negotiation.next_identifier();
        let mut reject = ControlBuilder::new(ControlCode::CodeReject, identifier);
        let rejected = packet.packet();
        let room = usize::from(link.mru).saturating_sub(HEADER_LEN);
        reject.extend(&rejected[..rejected.len().min(room)]);
        net_debug!("ipcp: rejecting {}", packet.code());
        send(&reject.finish());
    }

    fn send_request(&mut self, send: &mut dyn FnMut(&[u8])) {
        let identifier = self.negotiation.next_identifier();
        let mut request = ControlBuilder::new(ControlCode::ConfigureRequest, identifier);

        self.requested.clear();
        if self.request_address {
            IpcpOption::Address(IpcpAddressOption::IpAddress, self.config.local).emit(&mut self.requested);
        }
        request.extend(&self.requested);

        self.negotiation.requested(identifier);
        net_debug!("ipcp: sending Configure-Request id {}", identifier);
        send(&request.finish());
    }

    fn check_opened(&self) -> Option<Event> {
        if self.negotiation.is_opened() {
            net_info!("ipcp: network opened, peer is {:?}", self.remote());
            Some(Event::Opened)
        } else {
            None
        }
    }

    fn configured(config: &Config) -> [Option<Ipv4Address>; 5] {
        let mut held = [None; 5];
        for &which in IpcpAddressOption::ALL.iter() {
            held[which.index()] = config.configured(which);
        }
        held
    }
}
