//! Identifier allocation

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use studyhub_types::{Id, IdSet};

/// Highest seed handed out so far, so seeds keep increasing even when
/// the clock does not advance between calls.
static LAST_SEED: AtomicU64 = AtomicU64::new(0);

fn next_seed() -> Id {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_SEED.load(Ordering::Relaxed);
    loop {
        let seed = now.max(last + 1);
        match LAST_SEED.compare_exchange_weak(last, seed, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return seed,
            Err(actual) => last = actual,
        }
    }
}

/// Allocate an id not present in `ids` and register it there.
///
/// Seeds from the current timestamp and probes upward until a free value
/// is found, so repeated calls against the same set never collide.
pub fn new_id(ids: &mut IdSet) -> Id {
    let mut candidate = next_seed();
    while ids.contains(candidate) {
        candidate += 1;
    }
    ids.insert(candidate);
    candidate
}

/// Same as [`new_id`] for callers holding a plain list of ids
pub fn new_id_from_list(ids: &[Id]) -> (Id, IdSet) {
    let mut set: IdSet = ids.iter().copied().collect();
    let id = new_id(&mut set);
    (id, set)
}
