use std::collections::HashMap;

use crate::layer::{Error, Result};
use crate::managed::{Key, SlotMap};
use crate::wire::{ipv4_packet, Ipv4Address};

/// The connections of a modem bank by the address leased to them.
///
/// Keys stay valid until their connection is removed. A key of a removed connection does not
/// find the connection that reused its slot.
#[derive(Debug)]
pub struct Registry<C> {
    connections: SlotMap<(Ipv4Address, C)>,
    by_address: HashMap<Ipv4Address, Key>,
}

impl<C> Registry<C> {
    /// Create a registry for at most `capacity` connections.
    pub fn with_capacity(capacity: usize) -> Self {
        Registry {
            connections: SlotMap::with_capacity(capacity),
            by_address: HashMap::new(),
        }
    }

    /// The number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Query whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Register a connection owning `address`.
    ///
    /// Fails with `Error::Exhausted` if the registry is full and with `Error::Illegal` if another
    /// connection owns the address.
    pub fn insert(&mut self, address: Ipv4Address, connection: C) -> Result<Key> {
        if self.find_by_address(address).is_some() {
            return Err(Error::Illegal);
        }

        let key = self.connections.insert((address, connection)).ok_or(Error::Exhausted)?;
        self.by_address.insert(address, key);
        net_debug!("registry: {} registered", address);
        Ok(key)
    }

    /// Remove a connection, returning it if it was registered.
    pub fn remove(&mut self, key: Key) -> Option<C> {
        let (address, connection) = self.connections.remove(key)?;
        self.by_address.remove(&address);
        net_debug!("registry: {} removed", address);
        Some(connection)
    }

    /// The connection of a key.
    pub fn get(&self, key: Key) -> Option<&C> {
        self.connections.get(key).map(|(_, connection)| connection)
    }

    /// The connection of a key, mutably.
    pub fn get_mut(&mut self, key: Key) -> Option<&mut C> {
        self.connections.get_mut(key).map(|(_, connection)| connection)
    }

    /// Find the connection owning an address.
    pub fn find_by_address(&self, address: Ipv4Address) -> Option<Key> {
        self.by_address.get(&address).cloned()
    }

    /// Find the connection a datagram is destined to.
    ///
    /// Fails with `Error::Illegal` if the datagram is not IPv4 and with `Error::Unreachable` if
    /// no connection owns the destination address.
    pub fn route(&self, datagram: &[u8]) -> Result<Key> {
        let packet = ipv4_packet::new_checked(datagram)?;
        let destination = packet.dst_addr();
        match self.find_by_address(destination) {
            Some(key) => Ok(key),
            None => {
                net_trace!("registry: no route to {}", destination);
                Err(Error::Unreachable)
            },
        }
    }

    /// Iterate over all connections and their addresses.
    pub fn iter(&self) -> impl Iterator<Item=(Key, Ipv4Address, &C)> + '_ {
        self.connections.iter().map(|(key, (address, connection))| (key, *address, connection))
    }
}
