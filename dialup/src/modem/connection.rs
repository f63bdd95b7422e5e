use std::sync::Arc;
use std::time::{Duration, Instant};

use super::Config;
use crate::layer::hdlc::{Decoder, Encoder, Framing, Statistics};
use crate::layer::ip::{Lease, Pool};
use crate::layer::{hayes, ppp, Error, Result};
use crate::nic::{Discard, Network, Transport};
use crate::wire::{Ipv4Address, DEFAULT_MRU, HDLC_OVERHEAD};

/// One modem of the bank and the call it carries.
///
/// Owns the address leased to the client for its whole lifetime, the address is returned to the
/// pool when the connection is dropped.
#[derive(Debug)]
pub struct Connection {
    hayes: hayes::Endpoint,
    decoder: Decoder,
    encoder: Encoder,
    ppp: ppp::Endpoint,
    lease: Lease,
}

/// The PPP link below the command interpreter.
struct Line<'a, T: ?Sized, N: ?Sized> {
    decoder: &'a mut Decoder,
    ppp: &'a mut ppp::Endpoint,
    io: Io<'a, T, N>,
}

/// The output of the PPP link.
struct Io<'a, T: ?Sized, N: ?Sized> {
    encoder: &'a mut Encoder,
    transport: &'a mut T,
    network: &'a mut N,
}

impl Connection {
    /// Lease an address and create a modem in command mode.
    ///
    /// Fails with `Error::Exhausted` if the pool has no free address.
    pub fn new(config: &Config, pool: &Arc<Pool>) -> Result<Self> {
        let lease = pool.lease()?;
        let lcp = config.lcp();
        let ipcp = config.ipcp(pool.gateway(), lease.address());
        let capacity = usize::from(lcp.mru.max(DEFAULT_MRU)) + HDLC_OVERHEAD;
        let mut hayes = hayes::Endpoint::with_identification(config.identification.clone());
        hayes.set_guard(config.guard);
        net_info!("modem {}: new connection", lease.address());

        Ok(Connection {
            hayes,
            decoder: Decoder::with_capacity(capacity),
            encoder: Encoder::new(),
            ppp: ppp::Endpoint::new(lcp, ipcp),
            lease,
        })
    }

    /// The address assigned to the client.
    pub fn address(&self) -> Ipv4Address {
        self.lease.address()
    }

    /// The command interpreter.
    pub fn hayes(&self) -> &hayes::Endpoint {
        &self.hayes
    }

    /// The PPP link.
    pub fn ppp(&self) -> &ppp::Endpoint {
        &self.ppp
    }

    /// Counters of the frames received on the current call.
    pub fn statistics(&self) -> Statistics {
        self.decoder.statistics()
    }

    /// How long the client must pause after an escape sequence.
    pub fn guard_time(&self) -> Duration {
        self.hayes.guard_time()
    }

    /// Whether datagrams can be exchanged with the client.
    pub fn is_network(&self) -> bool {
        self.ppp.state() == ppp::State::Network && self.ppp.is_active(ppp::Handler::Ipv4)
    }

    /// Process bytes received from the client.
    pub fn receive<T, N>(&mut self, bytes: &[u8], transport: &mut T, network: &mut N)
    where
        T: Transport + ?Sized,
        N: Network + ?Sized,
    {
        {
            let Connection { hayes, decoder, encoder, ppp, .. } = self;
            let mut line = Line {
                decoder,
                ppp,
                io: Io { encoder, transport: &mut *transport, network: &mut *network },
            };
            hayes.receive(bytes, &mut line);
        }
        self.check_carrier(transport, network);
    }

    /// Nothing was received from the client for the guard time.
    ///
    /// Completes a pending escape sequence and runs the restart timers of the link, unanswered
    /// requests are sent again. Call this regularly while the client is quiet.
    pub fn idle<T, N>(&mut self, now: Instant, transport: &mut T, network: &mut N)
    where
        T: Transport + ?Sized,
        N: Network + ?Sized,
    {
        {
            let Connection { hayes, decoder, encoder, ppp, .. } = self;
            let mut line = Line {
                decoder,
                ppp,
                io: Io { encoder, transport: &mut *transport, network: &mut *network },
            };
            hayes.idle(&mut line);
            // Frames are not sent to a terminal in command mode.
            if hayes.state().is_data() {
                line.ppp.timeout(now, &mut line.io);
            }
        }
        self.check_carrier(transport, network);
    }

    /// Send a datagram from the network to the client.
    ///
    /// Fails with `Error::Illegal` while the modem is in command mode or the network layer is
    /// not open, and with `Error::BadSize` if the datagram exceeds the receive unit of the peer.
    pub fn send_datagram<T>(&mut self, datagram: &[u8], transport: &mut T) -> Result<()>
    where
        T: Transport + ?Sized,
    {
        if !self.hayes.state().is_data() {
            return Err(Error::Illegal);
        }

        let mut io = Io { encoder: &mut self.encoder, transport, network: &mut Discard };
        self.ppp.send_datagram(datagram, &mut io)
    }

    /// Terminate the link and hang up the call.
    ///
    /// The client receives a Terminate-Request and then `NO CARRIER`.
    pub fn hangup<T, N>(&mut self, transport: &mut T, network: &mut N)
    where
        T: Transport + ?Sized,
        N: Network + ?Sized,
    {
        let Connection { hayes, decoder, encoder, ppp, .. } = self;
        let mut line = Line {
            decoder,
            ppp,
            io: Io { encoder, transport, network },
        };
        line.ppp.close(&mut line.io);
        hayes::Line::hangup(&mut line);
        hayes.no_carrier(&mut line);
    }

    /// Report a link terminated by the peer to the client.
    fn check_carrier<T, N>(&mut self, transport: &mut T, network: &mut N)
    where
        T: Transport + ?Sized,
        N: Network + ?Sized,
    {
        if !self.hayes.is_connected() || self.ppp.state() != ppp::State::Dead {
            return;
        }

        net_info!("modem {}: link terminated", self.lease.address());
        let Connection { hayes, decoder, encoder, ppp, .. } = self;
        let mut line = Line {
            decoder,
            ppp,
            io: Io { encoder, transport, network },
        };
        hayes::Line::hangup(&mut line);
        hayes.no_carrier(&mut line);
    }
}

impl<T, N> hayes::Line for Line<'_, T, N>
where
    T: Transport + ?Sized,
    N: Network + ?Sized,
{
    fn transmit(&mut self, bytes: &[u8]) {
        self.io.transport.transmit(bytes)
    }

    fn data(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            // The peer terminated the link, the rest belongs to no call.
            if self.ppp.state() == ppp::State::Dead {
                net_debug!("modem: dropped data after link termination");
                return;
            }

            if let Some(frame) = self.decoder.receive_byte(byte) {
                self.ppp.receive(frame, &mut self.io);
                self.decoder.set_acfc(self.ppp.link().acfc);
            }
        }
    }

    fn online(&mut self) {
        self.decoder.reset();
        self.ppp.up(&mut self.io);
    }

    fn hangup(&mut self) {
        self.ppp.down();
        self.decoder.reset();
    }
}

impl<T, N> ppp::Io for Io<'_, T, N>
where
    T: Transport + ?Sized,
    N: Network + ?Sized,
{
    fn transmit(&mut self, frame: &[u8], framing: Framing) {
        let bytes = self.encoder.encode(frame, framing);
        self.transport.transmit(bytes);
    }

    fn deliver(&mut self, datagram: &[u8]) {
        self.network.deliver(datagram);
    }
}
