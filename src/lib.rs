//! # bitradix
//!
//! A radix tree that branches on the bits of a fixed-width unsigned integer
//! key, for longest-prefix lookup tables such as IP forwarding tables.
//!
//! Entries are prefixes: a key plus the number of its leading bits that are
//! significant. Lookups return the longest stored prefix covering the query.
//!
//! The tree follows Morrison's PATRICIA: "PATRICIA -- practical algorithm to
//! retrieve information coded in alphanumeric", Journal of the ACM, 15(4),
//! 1968.
//!
//! ## Example
//!
//! ```rust
//! use bitradix::{Prefix, Radix32};
//!
//! let mut routes: Radix32<u32> = Radix32::new();
//! routes.insert_prefix("10.0.0.0/8".parse()?, 10)?;
//! routes.insert_prefix("10.20.0.0/14".parse()?, 20)?;
//! routes.insert_prefix("10.21.0.0/16".parse()?, 21)?;
//!
//! let addr: Prefix<u32> = "10.20.1.2".parse()?;
//! let hit = routes.find_prefix(addr)?.unwrap();
//! assert_eq!(hit.value(), Some(&20));
//! assert_eq!(hit.bits(), 14);
//!
//! let removed = routes.remove(0x0A14_0000, 14)?.unwrap();
//! assert_eq!(removed.into_value(), 20);
//! assert_eq!(routes.find_prefix(addr)?.unwrap().value(), Some(&10));
//! # Ok::<(), bitradix::Error>(())
//! ```
//!
//! ## Features
//!
//! - `tracing`: log node allocation, entry push-down and pruning through the
//!   `tracing` crate.

#![deny(unsafe_code)]

mod tracing_helpers;

pub mod cidr;
pub mod key;
pub mod walk;

mod error;
mod node;
mod tree;

pub use cidr::Prefix;
pub use error::{Error, Result};
pub use key::Key;
pub use node::{Entry, NodeRef};
pub use tree::{Radix, Radix32, Radix64};
pub use walk::{Bfs, Branch, Visit};

#[cfg(test)]
mod proptests;
