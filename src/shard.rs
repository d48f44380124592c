//! Prefix-sharding planner.
//!
//! Groups entries into per-prefix shards keyed by [`word_prefix`], with
//! variants duplicating their owning entry into every prefix bucket the
//! variant itself falls under (so a cross-prefix variant lookup still
//! resolves locally within its own shard).
//!
//! Grounded in `examples/original_source/dictgen/dictgen.go`'s `Prefixed`.

use std::collections::BTreeMap;

use crate::dictfile::{DictFile, Entry};
use crate::prefix::word_prefix;

/// Maps a shard key (e.g. `"ap"`) to the entries that belong in it.
///
/// A `BTreeMap` keeps shard keys in sorted order, matching the sorted
/// iteration order the pipeline driver writes dicthtml files in.
pub type ShardPlan = BTreeMap<String, DictFile>;

/// Buckets `entries` by [`word_prefix`] of the headword, then additionally
/// copies each entry into the shard(s) its variants prefix to (deduplicated
/// against the headword's own shard).
pub fn plan(entries: &[Entry]) -> ShardPlan {
    let mut plan: ShardPlan = ShardPlan::new();

    for e in entries {
        let mut prefixes: Vec<String> = vec![word_prefix(&e.headword)];
        for v in &e.variants {
            let vp = word_prefix(v);
            if !prefixes.contains(&vp) {
                prefixes.push(vp);
            }
        }

        for p in prefixes {
            plan.entry(p).or_default().push(e.clone());
        }
    }

    plan
}
