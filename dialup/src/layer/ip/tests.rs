use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use super::*;
use crate::layer::Error;
use crate::wire::{Ipv4Address, Ipv4Cidr};

fn small_pool() -> Pool {
    let cidr = Ipv4Cidr::new(Ipv4Address::new(10, 0, 0, 0), 29);
    Pool::new(cidr, Ipv4Address::new(10, 0, 0, 1)).unwrap()
}

#[test]
fn reserved_never_allocated() {
    let pool = small_pool();
    assert_eq!(pool.available(), 5);

    let mut allocated = Vec::new();
    while let Some(address) = pool.allocate() {
        allocated.push(address);
    }

    assert_eq!(allocated, vec![
        Ipv4Address::new(10, 0, 0, 2),
        Ipv4Address::new(10, 0, 0, 3),
        Ipv4Address::new(10, 0, 0, 4),
        Ipv4Address::new(10, 0, 0, 5),
        Ipv4Address::new(10, 0, 0, 6),
    ]);
    assert_eq!(pool.available(), 0);
}

#[test]
fn gateway_in_the_middle() {
    let cidr = Ipv4Cidr::new(Ipv4Address::new(192, 168, 1, 0), 30);
    let pool = Pool::new(cidr, Ipv4Address::new(192, 168, 1, 2)).unwrap();
    assert_eq!(pool.allocate(), Some(Ipv4Address::new(192, 168, 1, 1)));
    assert_eq!(pool.allocate(), None);
}

#[test]
fn free_restores() {
    let pool = small_pool();
    let first = pool.allocate().unwrap();
    let second = pool.allocate().unwrap();
    assert_ne!(first, second);

    let available = pool.available();
    let address = pool.allocate().unwrap();
    assert!(pool.is_allocated(address));
    pool.free(address);
    assert!(!pool.is_allocated(address));
    assert_eq!(pool.available(), available);

    // Lowest free address first.
    pool.free(first);
    assert_eq!(pool.allocate(), Some(first));
}

#[test]
fn bad_free_ignored() {
    let pool = small_pool();
    let available = pool.available();

    pool.free(Ipv4Address::new(10, 0, 1, 2));
    pool.free(Ipv4Address::new(10, 0, 0, 4));
    pool.free(Ipv4Address::new(10, 0, 0, 1));
    pool.free(Ipv4Address::new(10, 0, 0, 7));

    assert_eq!(pool.available(), available);
    assert!(pool.is_allocated(Ipv4Address::new(10, 0, 0, 1)));
    assert!(pool.is_allocated(Ipv4Address::new(10, 0, 0, 7)));
}

#[test]
fn bad_configuration() {
    let tiny = Ipv4Cidr::new(Ipv4Address::new(10, 0, 0, 0), 31);
    assert_eq!(Pool::new(tiny, Ipv4Address::new(10, 0, 0, 1)).err(), Some(Error::BadSize));

    let cidr = Ipv4Cidr::new(Ipv4Address::new(10, 0, 0, 0), 24);
    assert_eq!(Pool::new(cidr, Ipv4Address::new(10, 0, 1, 1)).err(), Some(Error::Illegal));
    assert_eq!(Pool::new(cidr, Ipv4Address::new(10, 0, 0, 255)).err(), Some(Error::Illegal));
}

#[test]
fn lease_released_once() {
    let pool = Arc::new(small_pool());
    let lease = pool.lease().unwrap();
    let address = lease.address();
    assert!(pool.is_allocated(address));

    drop(lease);
    assert!(!pool.is_allocated(address));

    let again = pool.lease().unwrap();
    assert_eq!(again.address(), address);
    let others: Vec<_> = (0..4).map(|_| pool.lease().unwrap()).collect();
    assert_eq!(pool.lease().err(), Some(Error::Exhausted));

    drop(others);
    assert_eq!(pool.available(), 4);
    assert!(pool.is_allocated(address));
}

#[test]
fn concurrent_allocation() {
    let cidr = Ipv4Cidr::new(Ipv4Address::new(10, 1, 0, 0), 22);
    let pool = Arc::new(Pool::new(cidr, Ipv4Address::new(10, 1, 0, 1)).unwrap());

    let workers: Vec<_> = (0..8).map(|_| {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            let mut addresses = Vec::new();
            while let Some(address) = pool.allocate() {
                addresses.push(address);
            }
            addresses
        })
    }).collect();

    let mut seen = HashSet::new();
    for worker in workers {
        for address in worker.join().unwrap() {
            assert!(seen.insert(address), "{} allocated twice", address);
        }
    }

    assert_eq!(seen.len(), 1024 - 3);
}

#[test]
fn display() {
    let pool = small_pool();
    pool.allocate();
    assert_eq!(pool.to_string(), "10.0.0.0/29 via 10.0.0.1 (4 of 5 available)");
}
