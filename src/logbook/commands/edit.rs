use crate::codec::Codec;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Record;
use crate::schema::{FieldValues, Form};
use crate::store::{StorageBackend, Store};

/// Overwrite a record's fields with `values`. Fields absent from `values` keep
/// their current value.
pub fn run<R, B, C>(store: &mut Store<R, B, C>, key: &R::Key, values: &FieldValues) -> Result<CmdResult<R>>
where
    R: Form,
    B: StorageBackend,
    C: Codec<R>,
{
    apply(store, key, |record| record.apply_values(values))
}

/// Apply an arbitrary change to one record.
pub fn apply<R, B, C, F>(store: &mut Store<R, B, C>, key: &R::Key, mutator: F) -> Result<CmdResult<R>>
where
    R: Record,
    B: StorageBackend,
    C: Codec<R>,
    F: FnOnce(&mut R) -> Result<()>,
{
    let mut updated = None;
    store.update(key, |record| {
        mutator(record)?;
        updated = Some(record.clone());
        Ok(())
    })?;

    let mut result = CmdResult::default();
    if let Some(record) = updated {
        result.add_message(CmdMessage::success(format!(
            "Updated {} in {}.",
            record.key(),
            R::COLLECTION
        )));
        result.affected.push(record);
    }
    Ok(result)
}
