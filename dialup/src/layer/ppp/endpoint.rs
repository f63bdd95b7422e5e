use std::time::Instant;

use super::{Handler, Io, Link, State};
use crate::layer::hdlc::Framing;
use crate::layer::{ipcp, lcp, Error, Result};
use crate::wire::{control_packet, ipv4_packet, ppp_frame, PppProtocol, PppRepr};

/// The PPP state of one connection.
#[derive(Debug)]
pub struct Endpoint {
    state: State,
    link: Link,
    lcp: lcp::Endpoint,
    ipcp: ipcp::Endpoint,
    /// Activation of each handler, indexed by `Handler as usize`.
    active: [bool; 3],
}

impl Endpoint {
    /// Create a dead link.
    pub fn new(lcp_config: lcp::Config, ipcp_config: ipcp::Config) -> Self {
        Endpoint {
            state: State::Dead,
            link: Link::new(&lcp_config),
            lcp: lcp::Endpoint::new(lcp_config),
            ipcp: ipcp::Endpoint::new(ipcp_config),
            active: [false; 3],
        }
    }

    /// The phase of the link.
    pub fn state(&self) -> State {
        self.state
    }

    /// The negotiated link parameters.
    pub fn link(&self) -> &Link {
        &self.link
    }

    /// The LCP state.
    pub fn lcp(&self) -> &lcp::Endpoint {
        &self.lcp
    }

    /// The IPCP state.
    pub fn ipcp(&self) -> &ipcp::Endpoint {
        &self.ipcp
    }

    /// Whether frames of a handler are currently dispatched.
    pub fn is_active(&self, handler: Handler) -> bool {
        self.active[handler as usize]
    }

    /// Bring the link up and start LCP negotiation.
    ///
    /// Does nothing unless the link is dead.
    pub fn up<I: Io + ?Sized>(&mut self, io: &mut I) {
        if self.state != State::Dead {
            return;
        }

        net_debug!("ppp: Dead -> Establish");
        self.state = State::Establish;
        self.active = [false; 3];
        self.set_active(Handler::Lcp, true);
        let mut send = |packet: &[u8]| transmit(io, PppProtocol::Lcp, false, Framing::DEFAULT, packet);
        self.lcp.up(&mut self.link, &mut send);
    }

    /// Take the link down without telling the peer.
    pub fn down(&mut self) {
        if self.state != State::Dead {
            net_info!("ppp: {:?} -> Dead", self.state);
        }
        self.state = State::Dead;
        self.active = [false; 3];
        self.lcp.down();
        self.ipcp.down();
    }

    /// Ask the peer to terminate the link.
    ///
    /// The link is dead once the peer acknowledged.
    pub fn close<I: Io + ?Sized>(&mut self, io: &mut I) {
        match self.state {
            State::Dead | State::Terminate => return,
            _ => (),
        }

        net_info!("ppp: {:?} -> Terminate", self.state);
        self.state = State::Terminate;
        self.network_down();
        let mut send = |packet: &[u8]| transmit(io, PppProtocol::Lcp, false, Framing::DEFAULT, packet);
        self.lcp.close(&mut send);
    }

    /// Run the restart timers of the control protocols.
    ///
    /// Call this regularly, the time between two calls bounds the precision of the timers. An
    /// unanswered LCP request is sent again until the peer answers or the retransmissions are
    /// exhausted, which takes the link down. When IPCP gives up the link is closed.
    pub fn timeout<I: Io + ?Sized>(&mut self, now: Instant, io: &mut I) {
        match self.state {
            State::Establish | State::Terminate => {
                let state = self.state;
                let event = {
                    let mut send = |packet: &[u8]| transmit(io, PppProtocol::Lcp, false, Framing::DEFAULT, packet);
                    self.lcp.timeout(state, now, &mut send)
                };
                if let Some(lcp::Event::Closed) = event {
                    self.down();
                }
            },
            State::Network if self.is_active(Handler::Ipcp) => {
                let compress = self.link.compress(PppProtocol::Ipcp);
                let framing = self.link.framing(PppProtocol::Ipcp);
                let event = {
                    let mut send = |packet: &[u8]| transmit(io, PppProtocol::Ipcp, compress, framing, packet);
                    self.ipcp.timeout(now, &mut send)
                };
                if let Some(ipcp::Event::Closed) = event {
                    net_info!("ppp: network layer failed to open");
                    self.close(io);
                }
            },
            _ => (),
        }
    }

    /// Process a frame decoded by the HDLC layer, protocol field first.
    pub fn receive<I: Io + ?Sized>(&mut self, frame: &[u8], io: &mut I) {
        if self.state == State::Dead {
            self.up(io);
        }

        let frame = match ppp_frame::new_checked(frame) {
            Ok(frame) => frame,
            Err(err) => {
                net_debug!("ppp: dropped frame, {}", err);
                return;
            },
        };

        if frame.is_compressed() && !self.link.pfc {
            net_debug!("ppp: dropped frame with compressed protocol field");
            return;
        }

        let protocol = frame.protocol();
        net_trace!("ppp: received {} ({} octets)", protocol, frame.payload().len());
        if protocol != PppProtocol::Lcp && self.state != State::Network {
            net_trace!("ppp: dropped {} in {:?}", protocol, self.state);
            return;
        }

        let handler = match Handler::for_protocol(protocol) {
            Some(handler) => handler,
            None => {
                let mut send = |packet: &[u8]| transmit(io, PppProtocol::Lcp, false, Framing::DEFAULT, packet);
                self.lcp.reject_protocol(protocol, frame.payload(), &self.link, &mut send);
                return;
            },
        };

        if !self.is_active(handler) {
            net_trace!("ppp: dropped {}, handler inactive", protocol);
            return;
        }

        match handler {
            Handler::Lcp => self.receive_lcp(frame.payload(), io),
            Handler::Ipcp => self.receive_ipcp(frame.payload(), io),
            Handler::Ipv4 => match ipv4_packet::new_checked(frame.payload()) {
                Ok(_) => io.deliver(frame.payload()),
                Err(err) => {
                    net_debug!("ppp: dropped datagram, {}", err);
                },
            },
        }
    }

    /// Send the information field of a protocol to the peer.
    ///
    /// Fails with `Error::Illegal` on a dead link and with `Error::BadSize` if the information
    /// exceeds the receive unit of the peer.
    pub fn send<I: Io + ?Sized>(&mut self, protocol: PppProtocol, info: &[u8], io: &mut I) -> Result<()> {
        if self.state == State::Dead {
            return Err(Error::Illegal);
        }

        if info.len() > usize::from(self.link.mru) {
            return Err(Error::BadSize);
        }

        transmit(io, protocol, self.link.compress(protocol), self.link.framing(protocol), info);
        Ok(())
    }

    /// Send an IPv4 datagram to the peer.
    ///
    /// Fails with `Error::Illegal` until IPCP opened the network layer.
    pub fn send_datagram<I: Io + ?Sized>(&mut self, datagram: &[u8], io: &mut I) -> Result<()> {
        if !self.is_active(Handler::Ipv4) {
            return Err(Error::Illegal);
        }

        self.send(PppProtocol::Ipv4, datagram, io)
    }

    fn receive_lcp<I: Io + ?Sized>(&mut self, payload: &[u8], io: &mut I) {
        let packet = match control_packet::new_checked(payload) {
            Ok(packet) => packet,
            Err(err) => {
                net_debug!("ppp: dropped LCP packet, {}", err);
                return;
            },
        };

        let event = {
            let mut send = |packet: &[u8]| transmit(io, PppProtocol::Lcp, false, Framing::DEFAULT, packet);
            self.lcp.receive(self.state, &mut self.link, packet, &mut send)
        };

        match event {
            Some(lcp::Event::Opened) => self.network(io),
            Some(lcp::Event::Restarted) => {
                net_info!("ppp: {:?} -> Establish", self.state);
                self.state = State::Establish;
                self.network_down();
            },
            Some(lcp::Event::Closed) => self.down(),
            Some(lcp::Event::ProtocolRejected(protocol)) => match Handler::for_protocol(protocol) {
                Some(Handler::Lcp) | None => (),
                Some(handler) => {
                    net_info!("ppp: peer rejected {}, handler deactivated", protocol);
                    self.set_active(handler, false);
                },
            },
            None => (),
        }
    }

    fn receive_ipcp<I: Io + ?Sized>(&mut self, payload: &[u8], io: &mut I) {
        let packet = match control_packet::new_checked(payload) {
            Ok(packet) => packet,
            Err(err) => {
                net_debug!("ppp: dropped IPCP packet, {}", err);
                return;
            },
        };

        let compress = self.link.compress(PppProtocol::Ipcp);
        let framing = self.link.framing(PppProtocol::Ipcp);
        let event = {
            let mut send = |packet: &[u8]| transmit(io, PppProtocol::Ipcp, compress, framing, packet);
            self.ipcp.receive(&self.link, packet, &mut send)
        };

        match event {
            Some(ipcp::Event::Opened) => self.set_active(Handler::Ipv4, true),
            Some(ipcp::Event::Restarted) | Some(ipcp::Event::Closed) => {
                self.set_active(Handler::Ipv4, false)
            },
            None => (),
        }
    }

    /// LCP opened: pass authentication and start the network protocols.
    fn network<I: Io + ?Sized>(&mut self, io: &mut I) {
        net_debug!("ppp: {:?} -> Authenticate", self.state);
        self.state = State::Authenticate;
        net_info!("ppp: Authenticate -> Network, mru {}", self.link.mru);
        self.state = State::Network;

        self.set_active(Handler::Ipcp, true);
        let compress = self.link.compress(PppProtocol::Ipcp);
        let framing = self.link.framing(PppProtocol::Ipcp);
        let mut send = |packet: &[u8]| transmit(io, PppProtocol::Ipcp, compress, framing, packet);
        self.ipcp.up(&mut send);
    }

    fn network_down(&mut self) {
        self.ipcp.down();
        self.set_active(Handler::Ipcp, false);
        self.set_active(Handler::Ipv4, false);
    }

    fn set_active(&mut self, handler: Handler, active: bool) {
        self.active[handler as usize] = active;
    }
}

fn transmit<I: Io + ?Sized>(io: &mut I, protocol: PppProtocol, compressed: bool, framing: Framing, info: &[u8]) {
    let repr = PppRepr { protocol, compressed };
    let mut frame = vec![0; repr.header_len() + info.len()];
    repr.emit(&mut frame);
    frame[repr.header_len()..].copy_from_slice(info);
    net_trace!("ppp: sending {} ({} octets)", protocol, info.len());
    io.transmit(&frame, framing);
}
