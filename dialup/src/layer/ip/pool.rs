use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::layer::{Error, Result};
use crate::wire::{Ipv4Address, Ipv4Cidr};

/// Smallest accepted prefix length, bounding the bitmap to 2^24 bits.
const MIN_PREFIX: u8 = 8;

/// Largest accepted prefix length, leaving at least one host besides the gateway.
const MAX_PREFIX: u8 = 30;

/// A bitmap allocator over the addresses of a subnet.
///
/// Network, broadcast and gateway address are marked allocated on construction and are never
/// handed out. Allocation always returns the lowest free address.
pub struct Pool {
    cidr: Ipv4Cidr,
    gateway: Ipv4Address,
    bitmap: Mutex<Bitmap>,
}

/// An address allocated from a shared pool.
///
/// The address is returned to the pool when the lease is dropped.
pub struct Lease {
    pool: Arc<Pool>,
    address: Ipv4Address,
}

struct Bitmap {
    words: Vec<u64>,
    allocated: usize,
}

impl Pool {
    /// Create a pool for a subnet, reserving the gateway address.
    ///
    /// Fails with `Error::BadSize` if the prefix is not between /8 and /30, and with
    /// `Error::Illegal` if the gateway is not a host of the subnet.
    pub fn new(cidr: Ipv4Cidr, gateway: Ipv4Address) -> Result<Self> {
        if cidr.prefix_len() < MIN_PREFIX || cidr.prefix_len() > MAX_PREFIX {
            return Err(Error::BadSize);
        }

        let cidr = Ipv4Cidr::new(cidr.network(), cidr.prefix_len());
        if !cidr.contains(gateway) || gateway == cidr.network() || gateway == cidr.broadcast() {
            return Err(Error::Illegal);
        }

        let mut bitmap = Bitmap::new(cidr.size() as usize);
        let network = cidr.network().to_network_integer();
        for &reserved in [cidr.network(), cidr.broadcast(), gateway].iter() {
            bitmap.set((reserved.to_network_integer() - network) as usize);
        }

        Ok(Pool {
            cidr,
            gateway,
            bitmap: Mutex::new(bitmap),
        })
    }

    /// The subnet of the pool.
    pub fn cidr(&self) -> Ipv4Cidr {
        self.cidr
    }

    /// The reserved gateway address.
    pub fn gateway(&self) -> Ipv4Address {
        self.gateway
    }

    /// Allocate the lowest free address.
    ///
    /// Returns `None` if all addresses are in use.
    pub fn allocate(&self) -> Option<Ipv4Address> {
        let mut bitmap = self.lock();
        let index = bitmap.first_free()?;
        bitmap.set(index);
        let address = self.address(index);
        net_debug!("pool {}: allocated {}", self.cidr, address);
        Some(address)
    }

    /// Return an address to the pool.
    ///
    /// Addresses outside the subnet, reserved addresses and addresses that are not allocated are
    /// ignored with a warning.
    pub fn free(&self, address: Ipv4Address) {
        let index = match self.index(address) {
            Some(index) => index,
            None => {
                net_warn!("pool {}: free of foreign address {}", self.cidr, address);
                return;
            },
        };

        if self.is_reserved(address) {
            net_warn!("pool {}: free of reserved address {}", self.cidr, address);
            return;
        }

        let mut bitmap = self.lock();
        if !bitmap.clear(index) {
            net_warn!("pool {}: free of unallocated address {}", self.cidr, address);
            return;
        }

        net_debug!("pool {}: freed {}", self.cidr, address);
    }

    /// Allocate an address that is freed when the lease is dropped.
    ///
    /// Fails with `Error::Exhausted` if all addresses are in use.
    pub fn lease(self: &Arc<Self>) -> Result<Lease> {
        let address = self.allocate().ok_or(Error::Exhausted)?;
        Ok(Lease {
            pool: Arc::clone(self),
            address,
        })
    }

    /// Query whether an address is currently allocated or reserved.
    pub fn is_allocated(&self, address: Ipv4Address) -> bool {
        match self.index(address) {
            Some(index) => self.lock().get(index),
            None => false,
        }
    }

    /// The number of addresses that can still be allocated.
    pub fn available(&self) -> usize {
        let bitmap = self.lock();
        self.cidr.size() as usize - bitmap.allocated
    }

    fn is_reserved(&self, address: Ipv4Address) -> bool {
        address == self.cidr.network()
            || address == self.cidr.broadcast()
            || address == self.gateway
    }

    fn index(&self, address: Ipv4Address) -> Option<usize> {
        if !self.cidr.contains(address) {
            return None;
        }

        let offset = address.to_network_integer() - self.cidr.network().to_network_integer();
        Some(offset as usize)
    }

    fn address(&self, index: usize) -> Ipv4Address {
        Ipv4Address::from_network_integer(self.cidr.network().to_network_integer() + index as u32)
    }

    fn lock(&self) -> MutexGuard<Bitmap> {
        // Every update leaves the bitmap consistent, a poisoned lock is still usable.
        self.bitmap.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Bitmap {
    fn new(size: usize) -> Self {
        let mut words = vec![0; (size + 63) / 64];
        // Bits past the end of the subnet are never free.
        let tail = size % 64;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last = !0 << tail;
            }
        }

        Bitmap { words, allocated: 0 }
    }

    fn get(&self, index: usize) -> bool {
        self.words[index / 64] & (1 << (index % 64)) != 0
    }

    fn set(&mut self, index: usize) {
        if !self.get(index) {
            self.words[index / 64] |= 1 << (index % 64);
            self.allocated += 1;
        }
    }

    /// Clear a bit, returning whether it was set.
    fn clear(&mut self, index: usize) -> bool {
        let was_set = self.get(index);
        if was_set {
            self.words[index / 64] &= !(1 << (index % 64));
            self.allocated -= 1;
        }
        was_set
    }

    fn first_free(&self) -> Option<usize> {
        self.words.iter()
            .enumerate()
            .find(|&(_, &word)| word != !0)
            .map(|(i, word)| i * 64 + word.trailing_ones() as usize)
    }
}

impl Lease {
    /// The leased address.
    pub fn address(&self) -> Ipv4Address {
        self.address
    }

    /// The pool the address was allocated from.
    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.pool.free(self.address);
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let available = self.available();
        write!(f, "{} via {} ({} of {} available)",
            self.cidr, self.gateway, available, self.cidr.size() - 3)
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Pool")
            .field("cidr", &self.cidr)
            .field("gateway", &self.gateway)
            .field("available", &self.available())
            .finish()
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Lease")
            .field("address", &self.address)
            .finish()
    }
}
