//! A small, correct longest-prefix-match map.
//!
//! spec.md §9 treats the IP prefix-trie data structure itself as an
//! external concern ("this core does not itself... [build] the IP
//! prefix-trie data structure"); what matters to `BNCT`/`ConnTable` is the
//! *interface* (exact-key get/insert/remove, longest-prefix-match lookup),
//! not a particular trie implementation. This module supplies that
//! interface with a `BTreeMap` keyed by `(mask, masked address)`, doing an
//! O(mask bits) longest-match scan rather than a compressed radix trie —
//! simple and obviously correct, which is what the "arena+index or a
//! simpler substitute" allowance in spec.md §9 calls for.

use nht_common::{Afi, Prefix};
use std::collections::BTreeMap;
use std::net::IpAddr;

fn key_bits(prefix: &Prefix) -> u128 {
    match prefix.apply_mask().address {
        IpAddr::V4(addr) => u32::from(addr) as u128,
        IpAddr::V6(addr) => u128::from(addr),
    }
}

fn afi_of(addr: IpAddr) -> Afi {
    match addr {
        IpAddr::V4(_) => Afi::Ipv4,
        IpAddr::V6(_) => Afi::Ipv6,
    }
}

fn max_mask(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// A longest-prefix-match map from [`Prefix`] to `V`. Keys carry the address
/// family alongside the mask and masked bits so `iter()` can rebuild an
/// `IpAddr` without guessing the family from the bit pattern — an IPv4
/// address and an IPv6 address with the same low 32 bits are otherwise
/// indistinguishable (e.g. `::0.0.0.1` vs. `0.0.0.1`).
#[derive(Debug, Clone)]
pub struct LpmTrie<V> {
    entries: BTreeMap<(Afi, u8, u128), V>,
}

impl<V> Default for LpmTrie<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> LpmTrie<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-key lookup: returns the entry installed for exactly this
    /// prefix, ignoring any shorter covering prefix.
    pub fn get(&self, prefix: &Prefix) -> Option<&V> {
        self.entries.get(&(afi_of(prefix.address), prefix.mask, key_bits(prefix)))
    }

    pub fn get_mut(&mut self, prefix: &Prefix) -> Option<&mut V> {
        self.entries.get_mut(&(afi_of(prefix.address), prefix.mask, key_bits(prefix)))
    }

    /// Exact-key insert, replacing any previous value and returning it.
    pub fn insert(&mut self, prefix: Prefix, value: V) -> Option<V> {
        self.entries
            .insert((afi_of(prefix.address), prefix.mask, key_bits(&prefix)), value)
    }

    /// Exact-key removal.
    pub fn remove(&mut self, prefix: &Prefix) -> Option<V> {
        self.entries.remove(&(afi_of(prefix.address), prefix.mask, key_bits(prefix)))
    }

    /// Longest-prefix-match lookup for a host address: the entry with the
    /// longest mask whose prefix covers `address`.
    pub fn lookup(&self, address: IpAddr) -> Option<(Prefix, &V)> {
        let afi = afi_of(address);
        for mask in (0..=max_mask(address)).rev() {
            let masked = Prefix { address, mask }.apply_mask();
            if let Some(value) = self.entries.get(&(afi, mask, key_bits(&masked))) {
                return Some((masked, value));
            }
        }
        None
    }

    /// True iff some entry covers `address` (used by `ConnTable::onlink`).
    pub fn contains_covering(&self, address: IpAddr) -> bool {
        self.lookup(address).is_some()
    }

    /// Iterates all entries in prefix-sorted order (mask then address),
    /// matching spec.md §5's "RIB trie enumeration follows prefix order"
    /// guarantee for the tries that back this module.
    pub fn iter(&self) -> impl Iterator<Item = (Prefix, &V)> {
        self.entries.iter().map(|(&(afi, mask, bits), value)| {
            let address = match afi {
                Afi::Ipv4 => IpAddr::from(std::net::Ipv4Addr::from(bits as u32)),
                Afi::Ipv6 => IpAddr::from(std::net::Ipv6Addr::from(bits)),
            };
            (Prefix { address, mask }, value)
        })
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        let mut trie = LpmTrie::new();
        trie.insert("10.0.0.0/8".parse().unwrap(), "wide");
        trie.insert("10.1.0.0/16".parse().unwrap(), "narrow");

        let (matched, value) = trie.lookup("10.1.2.3".parse().unwrap()).unwrap();
        assert_eq!(matched, "10.1.0.0/16".parse().unwrap());
        assert_eq!(*value, "narrow");
    }

    #[test]
    fn exact_get_ignores_covering_entries() {
        let mut trie = LpmTrie::new();
        trie.insert("10.0.0.0/8".parse().unwrap(), 1);
        assert!(trie.get(&"10.1.0.0/16".parse().unwrap()).is_none());
        assert_eq!(trie.get(&"10.0.0.0/8".parse().unwrap()), Some(&1));
    }

    #[test]
    fn remove_drops_entry() {
        let mut trie = LpmTrie::new();
        let p: Prefix = "192.0.2.0/24".parse().unwrap();
        trie.insert(p, 7);
        assert_eq!(trie.remove(&p), Some(7));
        assert!(trie.lookup("192.0.2.1".parse().unwrap()).is_none());
    }

    #[test]
    fn ipv6_lookup() {
        let mut trie = LpmTrie::new();
        trie.insert("2001:db8::/32".parse().unwrap(), "v6");
        let (_, value) = trie.lookup("2001:db8::1".parse().unwrap()).unwrap();
        assert_eq!(*value, "v6");
    }

    #[test]
    fn iter_distinguishes_v4_from_v6_with_same_low_bits() {
        let mut trie = LpmTrie::new();
        let v4: Prefix = "0.0.0.1/32".parse().unwrap();
        let v6: Prefix = "::0.0.0.1/32".parse().unwrap();
        trie.insert(v4, "v4");
        trie.insert(v6, "v6");

        let entries: Vec<_> = trie.iter().collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|(p, v)| *p == v4 && **v == "v4"));
        assert!(entries.iter().any(|(p, v)| *p == v6 && **v == "v6"));
    }
}
