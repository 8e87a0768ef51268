//! Recursive-gate desync verification (spec.md §4.6): translates the
//! previous generation's cache into batched `{gate, rgate}` queries and
//! collects the prefixes the daemon reports as now resolving through a
//! different recursive gate. The actual request/response exchange is an
//! IO concern that belongs to `nht-zclient`; this module only knows how to
//! build the batches and fold the responses into a [`DesyncSet`].
//!
//! Note on "prefix": `Bnct` is keyed by nexthop address (spec.md §4.4), so
//! the prefixes this module batches and later reports as desynced are
//! nexthop host prefixes, not BGP destination prefixes — see DESIGN.md for
//! why this reading of spec.md §4.5/§4.6 was chosen.

use crate::bnct::Bnct;
use crate::trie::LpmTrie;
use nht_common::Prefix;
use nht_wire::header::HEADER_SIZE as WIRE_HEADER_SIZE;
use nht_wire::message::{
    RGateRecord, RGateVerifyQuery, VerifyDesyncRecord, MAX_MESSAGE_LEN, RGATE_RECORD_SIZE,
};
use std::net::IpAddr;

/// Per-message fixed overhead besides the header: `more_follows(1) +
/// count(2)`.
const QUERY_BODY_OVERHEAD: usize = 3;

/// `K` in spec.md §4.2: how many `{gate, rgate}` records fit in one
/// maximally sized message.
pub fn batch_capacity() -> usize {
    (MAX_MESSAGE_LEN - WIRE_HEADER_SIZE - QUERY_BODY_OVERHEAD) / RGATE_RECORD_SIZE
}

/// Builds the batched rgate-verify queries for every still-valid,
/// IPv4-gated entry in the previous generation of `bnct`. The last batch
/// always carries `more_follows = false`, even if it is empty — spec.md
/// §4.6's "the last batch must carry more_follows = 0 even if empty".
pub fn build_batches(bnct: &Bnct) -> Vec<RGateVerifyQuery> {
    let capacity = batch_capacity();
    let records: Vec<RGateRecord> = bnct
        .previous_valid_entries()
        .filter_map(|(prefix, entry)| {
            let gate = match prefix.address {
                IpAddr::V4(addr) => addr,
                IpAddr::V6(_) => return None,
            };
            entry.first_ipv4_gate().map(|rgate| RGateRecord { gate, rgate })
        })
        .collect();

    let mut batches: Vec<RGateVerifyQuery> = records
        .chunks(capacity.max(1))
        .map(|chunk| RGateVerifyQuery {
            more_follows: true,
            records: chunk.to_vec(),
        })
        .collect();

    match batches.last_mut() {
        Some(last) => last.more_follows = false,
        None => batches.push(RGateVerifyQuery {
            more_follows: false,
            records: vec![],
        }),
    }
    batches
}

/// The set of nexthop prefixes the daemon reported as desynced for the
/// current IPv4 scan. Duplicates are tolerated: inserting an
/// already-present prefix is a no-op (spec.md §4.6, §9).
#[derive(Debug, Default)]
pub struct DesyncSet {
    trie: LpmTrie<()>,
}

impl DesyncSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: VerifyDesyncRecord) {
        let prefix = Prefix {
            address: IpAddr::V4(record.prefix),
            mask: record.prefixlen,
        };
        if self.trie.get(&prefix).is_some() {
            log::warn!("duplicate desync record for {prefix}, ignoring");
            return;
        }
        self.trie.insert(prefix, ());
    }

    pub fn contains(&self, nexthop: IpAddr) -> bool {
        self.trie.get(&Prefix::host(nexthop)).is_some()
    }

    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}
