//! Menu handlers shared by every collection.
//!
//! Each function has the [`Handler`](super::table::Handler) shape over a bare
//! [`Store`], so a domain can register `workflows::add::<Book, B>` directly.
//! They gather input through the [`Console`], call into
//! [`commands`](crate::commands), and print the result.

use crate::commands::{self, CmdResult};
use crate::error::{LogbookError, Result};
use crate::interact::console::Console;
use crate::interact::render;
use crate::interact::table::Outcome;
use crate::schema::Form;
use crate::store::{StorageBackend, Store};

pub fn add<R: Form, B: StorageBackend>(
    store: &mut Store<R, B>,
    console: &mut Console<'_>,
    _args: &str,
) -> Result<Outcome> {
    let next_seq = store.next_seq()?;
    let values = console.fill_form::<R>(None)?;
    let record = R::from_values(&values, next_seq)?;
    let result = commands::add::run(store, record)?;
    show(console, &result)
}

pub fn list<R: Form, B: StorageBackend>(
    store: &mut Store<R, B>,
    console: &mut Console<'_>,
    _args: &str,
) -> Result<Outcome> {
    let result = commands::list::run(store)?;
    show(console, &result)
}

pub fn view<R: Form, B: StorageBackend>(
    store: &mut Store<R, B>,
    console: &mut Console<'_>,
    args: &str,
) -> Result<Outcome> {
    if report_empty(store, console)? {
        return Ok(Outcome::unchanged());
    }
    let key = console.ask_key::<R>(args)?;
    let result = commands::view::run(store, &key)?;
    for record in &result.listed {
        console.print(render::record_detail(record))?;
    }
    console.say(&result.messages)?;
    Ok(Outcome::unchanged())
}

/// Prompt for every editable field, showing the current value; blank keeps it.
pub fn edit<R: Form, B: StorageBackend>(
    store: &mut Store<R, B>,
    console: &mut Console<'_>,
    args: &str,
) -> Result<Outcome> {
    if report_empty(store, console)? {
        return Ok(Outcome::unchanged());
    }
    let key = console.ask_key::<R>(args)?;
    let current = store.find(&key)?.clone();
    let values = console.fill_form(Some(&current))?;
    let result = commands::edit::run(store, &key, &values)?;
    show(console, &result)
}

pub fn delete<R: Form, B: StorageBackend>(
    store: &mut Store<R, B>,
    console: &mut Console<'_>,
    args: &str,
) -> Result<Outcome> {
    if report_empty(store, console)? {
        return Ok(Outcome::unchanged());
    }
    let key = console.ask_key::<R>(args)?;
    let result = commands::delete::run(store, &key)?;
    show(console, &result)
}

/// Search for the inline argument, or prompt for a term when there is none.
pub fn search<R: Form, B: StorageBackend>(
    store: &mut Store<R, B>,
    console: &mut Console<'_>,
    args: &str,
) -> Result<Outcome> {
    if report_empty(store, console)? {
        return Ok(Outcome::unchanged());
    }
    let term = if args.trim().is_empty() {
        console
            .read_line("Search for: ")?
            .ok_or(LogbookError::Cancelled)?
    } else {
        args.to_string()
    };
    let result = commands::search::run(store, &term)?;
    show(console, &result)
}

/// Say "No <collection> found." and return true when there is no record to
/// pick, so handlers skip their prompts.
pub fn report_empty<R: Form, B: StorageBackend>(
    store: &Store<R, B>,
    console: &mut Console<'_>,
) -> Result<bool> {
    if !store.is_empty() {
        return Ok(false);
    }
    console.say(&[commands::none_found::<R>()])?;
    Ok(true)
}

/// Print listed records as a table, then messages.
pub fn show<R: Form>(console: &mut Console<'_>, result: &CmdResult<R>) -> Result<Outcome> {
    if !result.listed.is_empty() {
        console.print(render::record_list(&result.listed))?;
    }
    console.say(&result.messages)?;
    Ok(Outcome::from_result(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interact::table::Handler;
    use crate::store::mem_backend::MemBackend;
    use crate::test_utils::{mem_store, mem_store_with, Note};

    fn run_with(
        handler: fn(&mut Store<Note, MemBackend>, &mut Console<'_>, &str) -> Result<Outcome>,
        store: &mut Store<Note, MemBackend>,
        input: &str,
        args: &str,
    ) -> (Result<Outcome>, String) {
        let mut out = Vec::new();
        let outcome = {
            let mut console = Console::new(input.as_bytes(), &mut out);
            handler(store, &mut console, args)
        };
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn add_assigns_next_id() {
        let mut store = mem_store_with(&[Note::new(4, "existing")]);
        let (outcome, out) = run_with(add, &mut store, "Fresh\n\n\n", "");

        assert!(outcome.unwrap().mutated);
        assert_eq!(store.find(&5).unwrap().title, "Fresh");
        assert!(out.contains("Added 5 to notes."));
    }

    #[test]
    fn add_with_bad_input_changes_nothing() {
        let mut store = mem_store();
        let (outcome, _) = run_with(add, &mut store, "cancel\n", "");
        assert!(matches!(outcome, Err(LogbookError::Cancelled)));
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn list_on_empty_store_says_so() {
        let mut store = mem_store();
        let (outcome, out) = run_with(list, &mut store, "", "");
        assert!(!outcome.unwrap().mutated);
        assert!(out.contains("No notes found."));
    }

    #[test]
    fn view_prints_detail() {
        let mut store = mem_store_with(&[Note::new(2, "Second").with_body("details")]);
        let (outcome, out) = run_with(view, &mut store, "", "2");
        assert!(!outcome.unwrap().mutated);
        assert!(out.contains("details"));
    }

    #[test]
    fn view_missing_is_not_found() {
        let mut store = mem_store_with(&[Note::new(1, "only")]);
        let (outcome, _) = run_with(view, &mut store, "", "9");
        assert!(matches!(outcome, Err(LogbookError::NotFound { .. })));
    }

    #[test]
    fn pickers_on_empty_store_say_none_found_without_prompting() {
        let handlers: [Handler<Store<Note, MemBackend>>; 4] = [view, edit, delete, search];
        for handler in handlers {
            let mut store = mem_store();
            let (outcome, out) = run_with(handler, &mut store, "3\n", "");

            assert!(!outcome.unwrap().mutated);
            assert!(out.contains("No notes found."));
            assert!(!out.contains("Id (number)"));
            assert!(!out.contains("Search for"));
        }
    }

    #[test]
    fn add_without_ids_left_fails_before_prompting() {
        let mut store = mem_store_with(&[Note::new(crate::store::MAX_SEQ, "last")]);
        let (outcome, out) = run_with(add, &mut store, "Title\n\n\n", "");

        assert!(matches!(outcome, Err(LogbookError::Validation { .. })));
        assert!(!out.contains("Title"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn edit_keeps_blank_fields() {
        let mut store = mem_store_with(&[Note::new(1, "Title").with_body("old")]);
        let (outcome, _) = run_with(edit, &mut store, "\nnew\n\n", "1");

        assert!(outcome.unwrap().mutated);
        let note = store.find(&1).unwrap();
        assert_eq!(note.title, "Title");
        assert_eq!(note.body, "new");
    }

    #[test]
    fn delete_prompts_for_key() {
        let mut store = mem_store_with(&[Note::new(1, "a"), Note::new(2, "b")]);
        let (outcome, out) = run_with(delete, &mut store, "2\n", "");

        assert!(outcome.unwrap().mutated);
        assert_eq!(store.len(), 1);
        assert!(out.contains("Deleted 2 from notes."));
    }

    #[test]
    fn search_prompts_without_args() {
        let mut store = mem_store_with(&[Note::new(1, "apple"), Note::new(2, "pear")]);
        let (outcome, out) = run_with(search, &mut store, "PEAR\n", "");
        assert!(!outcome.unwrap().mutated);
        assert!(out.contains("pear"));
        assert!(!out.contains("apple"));
    }
}
