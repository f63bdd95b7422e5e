//! The collaborators of a connection.
//!
//! A [`Connection`] does not perform any I/O itself. Bytes for the client are written to a
//! [`Transport`], usually the socket of the call, and datagrams received from the client are
//! handed to a [`Network`], for example a router or a TUN device. Both are passed to every
//! operation that may produce output.
//!
//! The in-memory implementations on `Vec` collect everything written to them.
//!
//! [`Connection`]: ../modem/struct.Connection.html
//! [`Transport`]: trait.Transport.html
//! [`Network`]: trait.Network.html

/// The byte stream towards the client.
pub trait Transport {
    /// Write bytes to the client.
    ///
    /// Writing never fails from the point of view of the connection. A transport that was closed
    /// should discard the bytes, the loss of carrier is reported separately.
    fn transmit(&mut self, bytes: &[u8]);
}

/// The network behind the modem bank.
pub trait Network {
    /// Pass a datagram received from the client.
    fn deliver(&mut self, datagram: &[u8]);
}

impl<T: Transport + ?Sized> Transport for &'_ mut T {
    fn transmit(&mut self, bytes: &[u8]) {
        (**self).transmit(bytes)
    }
}

impl<N: Network + ?Sized> Network for &'_ mut N {
    fn deliver(&mut self, datagram: &[u8]) {
        (**self).deliver(datagram)
    }
}

/// Appends all bytes.
impl Transport for Vec<u8> {
    fn transmit(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes)
    }
}

/// Keeps every datagram.
impl Network for Vec<Vec<u8>> {
    fn deliver(&mut self, datagram: &[u8]) {
        self.push(datagram.to_vec())
    }
}

/// A network discarding all datagrams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Discard;

impl Network for Discard {
    fn deliver(&mut self, datagram: &[u8]) {
        net_trace!("nic: discarded datagram ({} octets)", datagram.len());
    }
}
