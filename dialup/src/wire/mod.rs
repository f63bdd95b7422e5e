/*! Low-level packet access and construction.

The `wire` module deals with the packet *representation* of every protocol on the line.

 * The lowercase byte wrappers, e.g. [`ppp_frame`] or [`control_packet`], extract fields from
   sequences of octets. Their `check_len` method validates the buffer once so that no accessor
   will panic afterwards.
 * The `Repr` family provides a compact, high-level representation of header data that can be
   parsed from and emitted into octets, e.g. [`PppRepr`] or [`LcpOption`].

Nothing here keeps state. Escaping of octets on the line and the negotiation of options is the
job of the [`layer`] module.

[`ppp_frame`]: struct.ppp_frame.html
[`control_packet`]: struct.control_packet.html
[`PppRepr`]: struct.PppRepr.html
[`LcpOption`]: enum.LcpOption.html
[`layer`]: ../layer/index.html
*/
#![allow(missing_docs)]

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
    pub(crate) type Rest  = ::core::ops::RangeFrom<usize>;
}

mod error;
pub mod fcs;
pub mod control;
mod hdlc;
mod ipcp;
mod ipv4;
mod lcp;
mod ppp;

pub use self::error::{
    Error,
    Result};

pub use self::hdlc::{
    hdlc as hdlc_frame,
    Repr as HdlcRepr,
    needs_escape,
    DEFAULT_ACCM,
    ESCAPE as HDLC_ESCAPE,
    FLAG as HDLC_FLAG,
    OVERHEAD as HDLC_OVERHEAD,
    TRANSPARENCY as HDLC_TRANSPARENCY};

pub use self::ppp::{
    ppp as ppp_frame,
    Protocol as PppProtocol,
    Repr as PppRepr};

pub use self::control::{
    control as control_packet,
    Builder as ControlBuilder,
    Code as ControlCode,
    ConfigOption,
    Options as ConfigOptions};

pub use self::lcp::{
    OptionRepr as LcpOption,
    OptionType as LcpOptionType,
    DEFAULT_MRU};

pub use self::ipcp::{
    AddressOption as IpcpAddressOption,
    OptionRepr as IpcpOption,
    OptionType as IpcpOptionType};

pub use self::ipv4::{
    ipv4 as ipv4_packet,
    Address as Ipv4Address,
    Cidr as Ipv4Cidr,
    ParseCidrError};
