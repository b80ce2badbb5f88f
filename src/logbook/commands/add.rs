use crate::codec::Codec;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Record;
use crate::store::{StorageBackend, Store};

pub fn run<R, B, C>(store: &mut Store<R, B, C>, record: R) -> Result<CmdResult<R>>
where
    R: Record,
    B: StorageBackend,
    C: Codec<R>,
{
    let key = store.insert(record.clone())?;
    Ok(CmdResult::default()
        .with_affected(vec![record])
        .with_message(CmdMessage::success(format!(
            "Added {} to {}.",
            key,
            R::COLLECTION
        ))))
}
