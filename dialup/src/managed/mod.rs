//! Containers with explicit, upfront resource management.
//!
//! The connection registry must hand out identifiers that stay valid while the connection exists
//! and are detectably stale afterwards, even if its storage is reused. The [`SlotMap`] provides
//! this on top of storage whose capacity is fixed at construction.
//!
//! [`SlotMap`]: struct.SlotMap.html
mod slotmap;

pub use self::slotmap::{Key, SlotMap};
