use crate::codec::Codec;
use crate::commands::{none_found, CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Record;
use crate::store::{StorageBackend, Store};

/// Count records per group, largest group first (ties alphabetical).
pub fn tally<R, B, C, G>(store: &Store<R, B, C>, group: G) -> Vec<(String, usize)>
where
    R: Record,
    B: StorageBackend,
    C: Codec<R>,
    G: Fn(&R) -> String,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in store.list() {
        let name = group(record);
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Per-group counts as info lines, followed by the total.
pub fn run<R, B, C, G>(store: &Store<R, B, C>, heading: &str, group: G) -> Result<CmdResult<R>>
where
    R: Record,
    B: StorageBackend,
    C: Codec<R>,
    G: Fn(&R) -> String,
{
    let mut result = CmdResult::default();
    if store.is_empty() {
        result.add_message(none_found::<R>());
        return Ok(result);
    }

    result.add_message(CmdMessage::info(heading.to_string()));
    for (name, count) in tally(store, group) {
        result.add_message(CmdMessage::info(format!("  {:<16} {}", name, count)));
    }
    result.add_message(CmdMessage::info(format!(
        "  {:<16} {}",
        "total",
        store.len()
    )));
    Ok(result)
}
