use crate::codec::Codec;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Record;
use crate::store::{StorageBackend, Store};

pub fn run<R, B, C>(store: &mut Store<R, B, C>, key: &R::Key) -> Result<CmdResult<R>>
where
    R: Record,
    B: StorageBackend,
    C: Codec<R>,
{
    let removed = store.delete(key)?;
    Ok(CmdResult::default()
        .with_message(CmdMessage::success(format!(
            "Deleted {} from {}.",
            key,
            R::COLLECTION
        )))
        .with_affected(vec![removed]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::list;
    use crate::error::LogbookError;
    use crate::test_utils::{mem_store_with, Note};

    #[test]
    fn deletes_middle_record_keeping_order() {
        let mut store = mem_store_with(&[Note::new(1, "a"), Note::new(2, "b"), Note::new(3, "c")]);

        let result = run(&mut store, &2).unwrap();
        assert_eq!(result.affected, vec![Note::new(2, "b")]);

        let remaining = list::run(&store).unwrap().listed;
        assert_eq!(remaining, vec![Note::new(1, "a"), Note::new(3, "c")]);
    }

    #[test]
    fn deleting_twice_is_not_found() {
        let mut store = mem_store_with(&[Note::new(1, "a")]);
        run(&mut store, &1).unwrap();
        assert!(matches!(run(&mut store, &1), Err(LogbookError::NotFound { .. })));
    }
}
