//! Textual `address/length` prefixes turned into tree keys.
//!
//! IPv4 prefixes map onto 32-bit keys. IPv6 prefixes map onto 64-bit keys
//! built from the upper half of the address, so they are limited to /64.

use crate::error::{Error, Result};
use crate::key::Key;
use crate::node::NodeRef;
use crate::tree::Radix;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// A key together with its number of significant leading bits.
///
/// The key is masked to `bits` on construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix<K> {
    key: K,
    bits: u32,
}

impl<K: Key> Prefix<K> {
    pub fn new(key: K, bits: u32) -> Result<Self> {
        if bits > K::BITS {
            return Err(Error::PrefixTooLong { bits, max: K::BITS });
        }
        Ok(Self {
            key: key.mask(bits),
            bits,
        })
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }
}

/// Split `"addr/len"` into its address part and optional length.
fn split(s: &str) -> Result<(&str, Option<u32>)> {
    match s.trim().split_once('/') {
        None => Ok((s.trim(), None)),
        Some((addr, len)) => {
            let bits = len
                .parse::<u32>()
                .map_err(|_| Error::InvalidCidr(s.to_string()))?;
            Ok((addr, Some(bits)))
        }
    }
}

impl FromStr for Prefix<u32> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, bits) = split(s)?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| Error::InvalidAddress(addr.to_string()))?;
        Prefix::new(u32::from(addr), bits.unwrap_or(u32::BITS))
    }
}

impl FromStr for Prefix<u64> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, bits) = split(s)?;
        let addr: Ipv6Addr = addr
            .parse()
            .map_err(|_| Error::InvalidAddress(addr.to_string()))?;
        let upper = (u128::from(addr) >> 64) as u64;
        Prefix::new(upper, bits.unwrap_or(u64::BITS))
    }
}

impl From<Ipv4Addr> for Prefix<u32> {
    fn from(addr: Ipv4Addr) -> Self {
        Self {
            key: u32::from(addr),
            bits: u32::BITS,
        }
    }
}

impl fmt::Display for Prefix<u32> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", Ipv4Addr::from(self.key), self.bits)
    }
}

impl fmt::Display for Prefix<u64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = Ipv6Addr::from(u128::from(self.key) << 64);
        write!(f, "{addr}/{}", self.bits)
    }
}

impl<K: Key, V> Radix<K, V> {
    /// [`insert`](Radix::insert) taking a parsed prefix.
    pub fn insert_prefix(&mut self, prefix: Prefix<K>, value: V) -> Result<NodeRef<'_, K, V>> {
        self.insert(prefix.key, prefix.bits, value)
    }

    /// [`find`](Radix::find) taking a parsed prefix.
    pub fn find_prefix(&self, prefix: Prefix<K>) -> Result<Option<NodeRef<'_, K, V>>> {
        self.find(prefix.key, prefix.bits)
    }
}
