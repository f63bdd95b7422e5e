//! The IPv4 addresses handed to the peers.
//!
//! Every connection leases one address of a configured subnet for as long as it exists. The
//! [`Pool`] is the only state shared between connections, it is internally synchronized and
//! usually held in an `Arc` so that each [`Lease`] can return its address when dropped.
//!
//! [`Pool`]: struct.Pool.html
//! [`Lease`]: struct.Lease.html
mod pool;

pub use pool::{Lease, Pool};

#[cfg(test)]
mod tests;
