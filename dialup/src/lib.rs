//! The protocol core of a dial-up modem bank.
//!
//! ## Table of contents
//!
//! 1. [Design](#design)
//! 2. [The wire module](wire/index.html)
//! 3. [The layers](layer/index.html)
//!    1. [Hayes command interpreter](layer/hayes/index.html)
//!    1. [HDLC-like framing](layer/hdlc/index.html)
//!    1. [The PPP link](layer/ppp/index.html)
//!    1. [LCP](layer/lcp/index.html) and [IPCP](layer/ipcp/index.html)
//!    1. [Address pool](layer/ip/index.html)
//! 4. [Connections](modem/index.html)
//!
//! ## Design
//!
//! Every client is modelled as a telephone line to a modem. Bytes arriving from the client first
//! pass a Hayes command interpreter. Once a call has been dialed or answered, the interpreter
//! hands the byte stream to an HDLC-like frame decoder and the decoded frames to a PPP link.
//! The link negotiates its parameters with LCP, then the network layer with IPCP, and finally
//! passes IPv4 datagrams upwards.
//!
//! All processing is synchronous. A [`Connection`] is driven by calling its methods with received
//! bytes or datagrams and it answers through two collaborator traits from the [`nic`] module: one
//! writing raw bytes to the client and one delivering datagrams to the network. Nothing in this
//! crate blocks or spawns threads, the only state shared between connections is the address
//! pool.
//!
//! [`Connection`]: modem/struct.Connection.html
//! [`nic`]: nic/index.html
#![warn(missing_docs)]
#![warn(unreachable_pub)]

#[macro_use] mod macros;
pub mod layer;
pub mod managed;
pub mod modem;
pub mod nic;
pub mod wire;
