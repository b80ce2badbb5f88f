use crate::codec::Codec;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::Record;
use crate::store::{StorageBackend, Store};

pub fn run<R, B, C>(store: &Store<R, B, C>, key: &R::Key) -> Result<CmdResult<R>>
where
    R: Record,
    B: StorageBackend,
    C: Codec<R>,
{
    let record = store.find(key)?.clone();
    Ok(CmdResult::default().with_listed(vec![record]))
}
