//! The caches that sit between the BGP RIB and the routing-daemon lookup
//! client: the connected-prefix table, the double-buffered nexthop cache,
//! and the recursive-gate desync verifier.

pub mod bnct;
pub mod conn_table;
pub mod rgate;
pub mod trie;

pub use bnct::{Bnct, NexthopCacheEntry};
pub use conn_table::{ConnTable, ConnectedRef};
pub use rgate::{batch_capacity, build_batches, DesyncSet};
pub use trie::LpmTrie;
