use crate::codec::Codec;
use crate::commands::{none_found, CmdResult};
use crate::error::Result;
use crate::model::Record;
use crate::store::{StorageBackend, Store};
use std::cmp::Ordering;

/// All records, in insertion order.
pub fn run<R, B, C>(store: &Store<R, B, C>) -> Result<CmdResult<R>>
where
    R: Record,
    B: StorageBackend,
    C: Codec<R>,
{
    Ok(finish(store.list().to_vec()))
}

/// Records matching `predicate`, ordered by `compare` (ties keep insertion order).
pub fn run_with<R, B, C, P, O>(store: &Store<R, B, C>, predicate: P, compare: O) -> Result<CmdResult<R>>
where
    R: Record,
    B: StorageBackend,
    C: Codec<R>,
    P: Fn(&R) -> bool,
    O: FnMut(&R, &R) -> Ordering,
{
    let listed = store
        .list_sorted_by(compare)
        .into_iter()
        .filter(|r| predicate(*r))
        .cloned()
        .collect();
    Ok(finish(listed))
}

fn finish<R: Record>(listed: Vec<R>) -> CmdResult<R> {
    let mut result = CmdResult::default();
    if listed.is_empty() {
        result.add_message(none_found::<R>());
    }
    result.with_listed(listed)
}
