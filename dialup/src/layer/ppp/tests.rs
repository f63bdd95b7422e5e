use std::time::Instant;

use super::*;
use crate::layer::negotiation::{MAX_CONFIGURE, MAX_TERMINATE, RESTART_TIMER};
use crate::layer::{ipcp, Error};
use crate::wire::{control_packet, ppp_frame, ControlBuilder, ControlCode, Ipv4Address};

const GATEWAY: Ipv4Address = Ipv4Address([10, 0, 0, 1]);
const REMOTE: Ipv4Address = Ipv4Address([10, 0, 0, 2]);

#[derive(Default)]
struct TestIo {
    frames: Vec<(Vec<u8>, Framing)>,
    delivered: Vec<Vec<u8>>,
}

impl Io for TestIo {
    fn transmit(&mut self, frame: &[u8], framing: Framing) {
        self.frames.push((frame.to_vec(), framing));
    }

    fn deliver(&mut self, datagram: &[u8]) {
        self.delivered.push(datagram.to_vec());
    }
}

impl TestIo {
    /// Control packets sent for a protocol.
    fn packets(&self, protocol: PppProtocol) -> Vec<Vec<u8>> {
        self.frames.iter()
            .map(|(frame, _)| ppp_frame::new_checked(frame).unwrap())
            .filter(|frame| frame.protocol() == protocol)
            .map(|frame| frame.payload().to_vec())
            .collect()
    }

    /// The last packet with a code sent for a protocol.
    fn last(&self, protocol: PppProtocol, code: ControlCode) -> Vec<u8> {
        self.packets(protocol).into_iter()
            .rev()
            .find(|packet| control_packet::new_checked(packet).unwrap().code() == code)
            .unwrap()
    }
}

fn endpoint() -> Endpoint {
    Endpoint::new(lcp::Config::new(0x1234_5678), ipcp::Config::new(GATEWAY, REMOTE))
}

fn frame(protocol: u16, code: ControlCode, identifier: u8, data: &[u8]) -> Vec<u8> {
    let mut builder = ControlBuilder::new(code, identifier);
    builder.extend(data);
    let mut frame = protocol.to_be_bytes().to_vec();
    frame.extend_from_slice(&builder.finish());
    frame
}

fn lcp_frame(code: ControlCode, identifier: u8, data: &[u8]) -> Vec<u8> {
    frame(0xc021, code, identifier, data)
}

fn ipcp_frame(code: ControlCode, identifier: u8, data: &[u8]) -> Vec<u8> {
    frame(0x8021, code, identifier, data)
}

/// Acknowledge our last request of a protocol.
fn ack_request(ppp: &mut Endpoint, io: &mut TestIo, protocol: PppProtocol) {
    let request = io.last(protocol, ControlCode::ConfigureRequest);
    let request = control_packet::new_checked(&request).unwrap();
    let ack = frame(protocol.into(), ControlCode::ConfigureAck, request.identifier(), request.data());
    ppp.receive(&ack, io);
}

/// Negotiate LCP with a peer asking for compression.
fn establish(ppp: &mut Endpoint, io: &mut TestIo) {
    ppp.up(io);
    ack_request(ppp, io, PppProtocol::Lcp);
    ppp.receive(&lcp_frame(ControlCode::ConfigureRequest, 1, &[0x07, 0x02, 0x08, 0x02]), io);
    assert_eq!(ppp.state(), State::Network);
}

/// Negotiate LCP and IPCP.
fn open(ppp: &mut Endpoint, io: &mut TestIo) {
    establish(ppp, io);
    ack_request(ppp, io, PppProtocol::Ipcp);
    ppp.receive(&ipcp_frame(ControlCode::ConfigureRequest, 1, &[0x03, 0x06, 10, 0, 0, 2]), io);
    assert!(ppp.is_active(Handler::Ipv4));
}

fn datagram() -> Vec<u8> {
    let mut datagram = vec![0x45, 0x00, 0x00, 0x1c, 0, 0, 0, 0, 0x40, 0x11, 0, 0];
    datagram.extend_from_slice(&REMOTE.0);
    datagram.extend_from_slice(&[8, 8, 8, 8]);
    datagram.extend_from_slice(&[0; 8]);
    datagram
}

#[test]
fn first_frame_brings_link_up() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    assert_eq!(ppp.state(), State::Dead);

    ppp.receive(&lcp_frame(ControlCode::ConfigureRequest, 1, &[]), &mut io);
    assert_eq!(ppp.state(), State::Establish);
    assert!(ppp.is_active(Handler::Lcp));

    let codes: Vec<_> = io.packets(PppProtocol::Lcp).iter()
        .map(|packet| control_packet::new_checked(packet).unwrap().code())
        .collect();
    assert_eq!(codes, vec![ControlCode::ConfigureRequest, ControlCode::ConfigureAck]);
    assert!(io.frames.iter().all(|(_, framing)| *framing == Framing::DEFAULT));
}

#[test]
fn network_after_both_acks() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    ppp.up(&mut io);

    ack_request(&mut ppp, &mut io, PppProtocol::Lcp);
    assert_eq!(ppp.state(), State::Establish);
    assert!(!ppp.is_active(Handler::Ipcp));

    ppp.receive(&lcp_frame(ControlCode::ConfigureRequest, 1, &[0x01, 0x04, 0x05, 0x78, 0x07, 0x02, 0x08, 0x02]), &mut io);
    assert_eq!(ppp.state(), State::Network);
    assert!(ppp.is_active(Handler::Ipcp));
    assert!(!ppp.is_active(Handler::Ipv4));
    assert_eq!(ppp.link().mru, 1400);
    assert!(ppp.link().pfc);
    assert!(ppp.link().acfc);

    // IPCP starts with the negotiated framing.
    let (frame, framing) = io.frames.last().unwrap();
    assert_eq!(&frame[..3], &[0x80, 0x21, u8::from(ControlCode::ConfigureRequest)]);
    assert_eq!(*framing, Framing { accm: DEFAULT_ACCM, acfc: true });
}

#[test]
fn network_protocols_gated() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    ppp.up(&mut io);
    io.frames.clear();

    ppp.receive(&ipcp_frame(ControlCode::ConfigureRequest, 1, &[]), &mut io);
    let mut ip = vec![0x00, 0x21];
    ip.extend_from_slice(&datagram());
    ppp.receive(&ip, &mut io);
    // Not even a Protocol-Reject before the network phase.
    ppp.receive(&[0x80, 0x57, 0x01, 0x01, 0x00, 0x04], &mut io);

    assert!(io.frames.is_empty());
    assert!(io.delivered.is_empty());
}

#[test]
fn datagrams_after_ipcp() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    establish(&mut ppp, &mut io);

    let mut ip = vec![0x00, 0x21];
    ip.extend_from_slice(&datagram());
    ppp.receive(&ip, &mut io);
    assert!(io.delivered.is_empty());
    assert_eq!(ppp.send_datagram(&datagram(), &mut io), Err(Error::Illegal));

    ack_request(&mut ppp, &mut io, PppProtocol::Ipcp);
    ppp.receive(&ipcp_frame(ControlCode::ConfigureRequest, 1, &[0x03, 0x06, 10, 0, 0, 2]), &mut io);
    assert!(ppp.ipcp().is_opened());
    assert!(ppp.is_active(Handler::Ipv4));

    // The peer may now compress the protocol field.
    let mut compressed = vec![0x21];
    compressed.extend_from_slice(&datagram());
    ppp.receive(&ip, &mut io);
    ppp.receive(&compressed, &mut io);
    assert_eq!(io.delivered, vec![datagram(), datagram()]);

    // Truncated datagrams are not delivered.
    ppp.receive(&ip[..10], &mut io);
    assert_eq!(io.delivered.len(), 2);

    ppp.send_datagram(&datagram(), &mut io).unwrap();
    let (frame, framing) = io.frames.last().unwrap();
    assert_eq!(frame[0], 0x21);
    assert_eq!(&frame[1..], &datagram()[..]);
    assert!(framing.acfc);
}

#[test]
fn compressed_protocol_needs_pfc() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    ppp.up(&mut io);
    ack_request(&mut ppp, &mut io, PppProtocol::Lcp);
    // The peer does not ask for compression.
    ppp.receive(&lcp_frame(ControlCode::ConfigureRequest, 1, &[]), &mut io);
    assert_eq!(ppp.state(), State::Network);
    io.frames.clear();

    // Compressed protocol fields are dropped rather than rejected.
    ppp.receive(&[0x21, 0x45], &mut io);
    ppp.receive(&[0x57, 0x00], &mut io);
    assert!(io.frames.is_empty());
    assert!(io.delivered.is_empty());
}

#[test]
fn unknown_protocol_rejected() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    establish(&mut ppp, &mut io);
    io.frames.clear();

    ppp.receive(&[0x80, 0x57, 0x01, 0x01, 0x00, 0x04], &mut io);
    let reject = io.last(PppProtocol::Lcp, ControlCode::ProtocolReject);
    let reject = control_packet::new_checked(&reject).unwrap();
    assert_eq!(reject.data(), &[0x80, 0x57, 0x01, 0x01, 0x00, 0x04]);
    assert_eq!(ppp.state(), State::Network);
}

#[test]
fn protocol_reject_deactivates() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    open(&mut ppp, &mut io);

    ppp.receive(&lcp_frame(ControlCode::ProtocolReject, 9, &[0x00, 0x21, 0x45]), &mut io);
    assert!(!ppp.is_active(Handler::Ipv4));
    assert!(ppp.is_active(Handler::Ipcp));
    assert_eq!(ppp.state(), State::Network);
}

#[test]
fn send_bounded_by_mru() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    assert_eq!(ppp.send(PppProtocol::Ipv4, &[0; 4], &mut io), Err(Error::Illegal));

    ppp.up(&mut io);
    ack_request(&mut ppp, &mut io, PppProtocol::Lcp);
    ppp.receive(&lcp_frame(ControlCode::ConfigureRequest, 1, &[0x01, 0x04, 0x02, 0x00]), &mut io);
    assert_eq!(ppp.link().mru, 512);

    assert_eq!(ppp.send(PppProtocol::Ipv4, &[0; 513], &mut io), Err(Error::BadSize));
    assert_eq!(ppp.send(PppProtocol::Ipv4, &[0; 512], &mut io), Ok(()));
}

#[test]
fn renegotiation_drops_network() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    open(&mut ppp, &mut io);

    ppp.receive(&lcp_frame(ControlCode::ConfigureRequest, 2, &[]), &mut io);
    assert_eq!(ppp.state(), State::Establish);
    assert!(!ppp.is_active(Handler::Ipcp));
    assert!(!ppp.is_active(Handler::Ipv4));
    assert!(!ppp.link().pfc);

    // Opens again once our new request is acknowledged.
    ack_request(&mut ppp, &mut io, PppProtocol::Lcp);
    assert_eq!(ppp.state(), State::Network);
    assert!(ppp.is_active(Handler::Ipcp));
}

#[test]
fn local_close() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    open(&mut ppp, &mut io);

    ppp.close(&mut io);
    assert_eq!(ppp.state(), State::Terminate);
    assert!(!ppp.is_active(Handler::Ipv4));
    let request = io.last(PppProtocol::Lcp, ControlCode::TerminateRequest);
    let identifier = control_packet::new_checked(&request).unwrap().identifier();

    // Network traffic is dropped while terminating.
    ppp.receive(&ipcp_frame(ControlCode::ConfigureRequest, 5, &[]), &mut io);
    assert_eq!(ppp.state(), State::Terminate);

    ppp.receive(&lcp_frame(ControlCode::TerminateAck, identifier, &[]), &mut io);
    assert_eq!(ppp.state(), State::Dead);
}

#[test]
fn peer_terminates() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    open(&mut ppp, &mut io);

    ppp.receive(&lcp_frame(ControlCode::TerminateRequest, 7, &[]), &mut io);
    assert_eq!(ppp.state(), State::Dead);
    assert!(!ppp.is_active(Handler::Lcp));
    let ack = io.last(PppProtocol::Lcp, ControlCode::TerminateAck);
    assert_eq!(control_packet::new_checked(&ack).unwrap().identifier(), 7);
}

#[test]
fn negotiated_accm() {
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    ppp.up(&mut io);
    ack_request(&mut ppp, &mut io, PppProtocol::Lcp);
    ppp.receive(&lcp_frame(ControlCode::ConfigureRequest, 1, &[0x02, 0x06, 0x00, 0x0a, 0x00, 0x00]), &mut io);
    assert_eq!(ppp.state(), State::Network);
    assert_eq!(ppp.link().accm, 0x000a_0000);

    // IPCP goes out with the map of the peer, LCP with the default one.
    ppp.receive(&lcp_frame(ControlCode::EchoRequest, 4, &[0, 0, 0, 0]), &mut io);
    let ipcp: Vec<_> = io.frames.iter()
        .filter(|(frame, _)| ppp_frame::new_checked(frame).unwrap().protocol() == PppProtocol::Ipcp)
        .collect();
    assert_eq!(ipcp.len(), 1);
    assert_eq!(ipcp[0].1, Framing { accm: 0x000a_0000, acfc: false });

    let lcp: Vec<_> = io.frames.iter()
        .filter(|(frame, _)| ppp_frame::new_checked(frame).unwrap().protocol() == PppProtocol::Lcp)
        .collect();
    assert_eq!(lcp.len(), 3);
    assert!(lcp.iter().all(|(_, framing)| *framing == Framing::DEFAULT));

    ack_request(&mut ppp, &mut io, PppProtocol::Ipcp);
    ppp.receive(&ipcp_frame(ControlCode::ConfigureRequest, 1, &[0x03, 0x06, 10, 0, 0, 2]), &mut io);
    io.frames.clear();
    ppp.send_datagram(&datagram(), &mut io).unwrap();
    assert_eq!(io.frames[0].1.accm, 0x000a_0000);
}

#[test]
fn lost_lcp_request_resent() {
    let start = Instant::now();
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    ppp.up(&mut io);
    let lost = io.last(PppProtocol::Lcp, ControlCode::ConfigureRequest);
    io.frames.clear();

    ppp.timeout(start, &mut io);
    assert!(io.frames.is_empty());
    ppp.timeout(start + RESTART_TIMER, &mut io);
    assert_eq!(io.packets(PppProtocol::Lcp), vec![lost]);

    ack_request(&mut ppp, &mut io, PppProtocol::Lcp);
    ppp.receive(&lcp_frame(ControlCode::ConfigureRequest, 1, &[]), &mut io);
    assert_eq!(ppp.state(), State::Network);
}

#[test]
fn silent_peer_takes_link_down() {
    let start = Instant::now();
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    ppp.up(&mut io);
    io.frames.clear();

    ppp.timeout(start, &mut io);
    for round in 1..=u32::from(MAX_CONFIGURE) {
        ppp.timeout(start + RESTART_TIMER * round, &mut io);
    }
    assert_eq!(io.packets(PppProtocol::Lcp).len(), usize::from(MAX_CONFIGURE));
    assert_eq!(ppp.state(), State::Establish);

    ppp.timeout(start + RESTART_TIMER * (u32::from(MAX_CONFIGURE) + 1), &mut io);
    assert_eq!(ppp.state(), State::Dead);
    assert!(!ppp.is_active(Handler::Lcp));
}

#[test]
fn silent_ipcp_closes_link() {
    let start = Instant::now();
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    establish(&mut ppp, &mut io);
    let request = io.last(PppProtocol::Ipcp, ControlCode::ConfigureRequest);
    io.frames.clear();

    ppp.timeout(start, &mut io);
    ppp.timeout(start + RESTART_TIMER, &mut io);
    assert_eq!(io.packets(PppProtocol::Ipcp), vec![request]);

    for round in 2..=u32::from(MAX_CONFIGURE) + 1 {
        ppp.timeout(start + RESTART_TIMER * round, &mut io);
    }
    assert_eq!(ppp.state(), State::Terminate);
    assert!(!ppp.is_active(Handler::Ipcp));
    assert_eq!(io.packets(PppProtocol::Lcp).len(), 1);
    io.last(PppProtocol::Lcp, ControlCode::TerminateRequest);
}

#[test]
fn unanswered_close() {
    let start = Instant::now();
    let mut ppp = endpoint();
    let mut io = TestIo::default();
    open(&mut ppp, &mut io);
    ppp.close(&mut io);
    io.frames.clear();

    ppp.timeout(start, &mut io);
    for round in 1..=u32::from(MAX_TERMINATE) {
        ppp.timeout(start + RESTART_TIMER * round, &mut io);
    }
    assert_eq!(io.packets(PppProtocol::Lcp).len(), usize::from(MAX_TERMINATE));
    assert_eq!(ppp.state(), State::Terminate);

    ppp.timeout(start + RESTART_TIMER * (u32::from(MAX_TERMINATE) + 1), &mut io);
    assert_eq!(ppp.state(), State::Dead);
}
