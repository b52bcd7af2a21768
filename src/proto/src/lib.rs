//! Minimal wire-framing contract the world-tick core depends on.
//!
//! The real protocol codec (packet identifiers, compression, encryption,
//! NBT) is a separate, out-of-scope collaborator. This crate supplies
//! just enough of a framed, var-int-prefixed transport and typed-field
//! scanner for the core to be exercised end-to-end in tests, and for a
//! real codec to be dropped in later without changing the core's
//! contract.

pub mod io;
pub mod packet;
pub mod codec;

pub use io::{Error, Position};
pub use packet::Packet;
