//! Reading list keyed by title and author, on a numbered menu.

use crate::commands::{self, CmdMessage};
use crate::error::{LogbookError, Result};
use crate::interact::console::Console;
use crate::interact::table::{CommandTable, Outcome};
use crate::interact::workflows;
use crate::model::{NaturalKey, Record};
use crate::schema::{FieldKind, FieldSpec, FieldValue, FieldValues, Form};
use crate::store::{StorageBackend, Store};
use serde::{Deserialize, Serialize};

const GENRES: &[&str] = &["fiction", "non-fiction", "science", "history", "poetry", "other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Genre {
    #[default]
    Fiction,
    NonFiction,
    Science,
    History,
    Poetry,
    Other,
}

impl Genre {
    const ALL: [Genre; 6] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Science,
        Genre::History,
        Genre::Poetry,
        Genre::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Fiction => "fiction",
            Genre::NonFiction => "non-fiction",
            Genre::Science => "science",
            Genre::History => "history",
            Genre::Poetry => "poetry",
            Genre::Other => "other",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default)]
    pub genre: Genre,
    #[serde(default)]
    pub read: bool,
}

impl Book {
    pub fn new(title: &str, author: &str) -> Self {
        Self {
            title: title.to_string(),
            author: author.to_string(),
            year: None,
            genre: Genre::default(),
            read: false,
        }
    }

    pub fn with_year(mut self, year: i64) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_genre(mut self, genre: Genre) -> Self {
        self.genre = genre;
        self
    }

    pub fn finished(mut self) -> Self {
        self.read = true;
        self
    }
}

const BOOK_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "Title", FieldKind::Text).identity(),
    FieldSpec::new("author", "Author", FieldKind::Text).identity(),
    FieldSpec::new("year", "Year", FieldKind::Integer),
    FieldSpec::new("genre", "Genre", FieldKind::Choice(GENRES)).required(),
    FieldSpec::new("read", "Read", FieldKind::Bool),
];

impl Record for Book {
    type Key = NaturalKey;
    const COLLECTION: &'static str = "books";

    fn key(&self) -> NaturalKey {
        NaturalKey::new([&self.title, &self.author])
    }
}

fn year(values: &FieldValues) -> Result<Option<i64>> {
    match values.opt_integer("year")? {
        Some(y) if !(1..=9999).contains(&y) => Err(LogbookError::validation(
            "Year",
            format!("{} is not a plausible year", y),
        )),
        other => Ok(other),
    }
}

fn genre(values: &FieldValues) -> Result<Option<Genre>> {
    values
        .opt_choice("genre")?
        .map(|tag| {
            Genre::from_tag(tag)
                .ok_or_else(|| LogbookError::validation("Genre", format!("unknown genre '{}'", tag)))
        })
        .transpose()
}

impl Form for Book {
    fn fields() -> &'static [FieldSpec] {
        BOOK_FIELDS
    }

    fn to_values(&self) -> FieldValues {
        let mut values = FieldValues::new()
            .with("title", FieldValue::Text(self.title.clone()))
            .with("author", FieldValue::Text(self.author.clone()));
        if let Some(year) = self.year {
            values.set("year", FieldValue::Integer(year));
        }
        values
            .with("genre", FieldValue::Choice(self.genre.as_str().to_string()))
            .with("read", FieldValue::Bool(self.read))
    }

    fn from_values(values: &FieldValues, _next_seq: u64) -> Result<Self> {
        Ok(Self {
            title: values.text("title")?,
            author: values.text("author")?,
            year: year(values)?,
            genre: genre(values)?.unwrap_or_default(),
            read: values.bool_or("read", false)?,
        })
    }

    fn apply_values(&mut self, values: &FieldValues) -> Result<()> {
        if values.get("title").is_some() {
            self.title = values.text("title")?;
        }
        if values.get("author").is_some() {
            self.author = values.text("author")?;
        }
        if let Some(y) = year(values)? {
            self.year = Some(y);
        } else if values.is_cleared("year") {
            self.year = None;
        }
        if let Some(g) = genre(values)? {
            self.genre = g;
        }
        self.read = if values.is_cleared("read") {
            false
        } else {
            values.bool_or("read", self.read)?
        };
        Ok(())
    }

    fn key_from_values(values: &FieldValues) -> Result<NaturalKey> {
        Ok(NaturalKey::new([values.text("title")?, values.text("author")?]))
    }

    fn summary(&self) -> String {
        let mut line = format!("{} by {}", self.title, self.author);
        if let Some(year) = self.year {
            line.push_str(&format!(" ({})", year));
        }
        line.push_str(&format!(" [{}]", self.genre.as_str()));
        if self.read {
            line.push_str(" ✓");
        }
        line
    }
}

pub fn samples() -> Vec<Book> {
    vec![
        Book::new("Dune", "Frank Herbert")
            .with_year(1965)
            .finished(),
        Book::new("A Brief History of Time", "Stephen Hawking")
            .with_year(1988)
            .with_genre(Genre::Science),
        Book::new("The Odyssey", "Homer").with_genre(Genre::Poetry),
    ]
}

pub fn table<B: StorageBackend>() -> CommandTable<Store<Book, B>> {
    CommandTable::numeric("Books")
        .command(&["add"], "Add a book", workflows::add::<Book, B>)
        .command(&["list"], "List books by author", list::<B>)
        .command(&["view"], "View a book", workflows::view::<Book, B>)
        .command(&["edit"], "Edit a book", workflows::edit::<Book, B>)
        .command(&["toggle"], "Mark a book read or unread", toggle_read::<B>)
        .command(&["delete"], "Delete a book", workflows::delete::<Book, B>)
        .command(&["search"], "Search books", workflows::search::<Book, B>)
        .command(&["stats"], "Books per genre", stats::<B>)
        .exit(&["exit"], "Exit")
}

fn list<B: StorageBackend>(
    store: &mut Store<Book, B>,
    console: &mut Console<'_>,
    _args: &str,
) -> Result<Outcome> {
    let result = commands::list::run_with(
        store,
        |_| true,
        |a, b| {
            a.author
                .to_lowercase()
                .cmp(&b.author.to_lowercase())
                .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        },
    )?;
    workflows::show(console, &result)
}

fn toggle_read<B: StorageBackend>(
    store: &mut Store<Book, B>,
    console: &mut Console<'_>,
    args: &str,
) -> Result<Outcome> {
    if workflows::report_empty(store, console)? {
        return Ok(Outcome::unchanged());
    }
    let key = console.ask_key::<Book>(args)?;
    let result = commands::edit::apply(store, &key, |book| {
        book.read = !book.read;
        Ok(())
    })?;
    if let Some(book) = result.affected.first() {
        let state = if book.read { "read" } else { "unread" };
        console.say(&[CmdMessage::success(format!(
            "Marked {} as {}.",
            book.key(),
            state
        ))])?;
    }
    Ok(Outcome::from_result(&result))
}

fn stats<B: StorageBackend>(
    store: &mut Store<Book, B>,
    console: &mut Console<'_>,
    _args: &str,
) -> Result<Outcome> {
    let mut result = commands::stats::run(store, "Books per genre", |b| b.genre.as_str().to_string())?;
    if !store.is_empty() {
        let read = store.query(|b| b.read).count();
        result.add_message(CmdMessage::info(format!(
            "  {:<16} {}",
            "read so far",
            read
        )));
    }
    console.say(&result.messages)?;
    Ok(Outcome::unchanged())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;

    fn store() -> Store<Book, MemBackend> {
        let mut store = Store::new(MemBackend::new());
        for book in samples() {
            store.insert(book).unwrap();
        }
        store
    }

    fn run(
        handler: fn(&mut Store<Book, MemBackend>, &mut Console<'_>, &str) -> Result<Outcome>,
        store: &mut Store<Book, MemBackend>,
        input: &str,
    ) -> (Result<Outcome>, String) {
        let mut out = Vec::new();
        let outcome = {
            let mut console = Console::new(input.as_bytes(), &mut out);
            handler(store, &mut console, "")
        };
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn natural_key_ignores_case_and_spacing() {
        let mut store = store();
        let err = store.insert(Book::new(" dune", "FRANK HERBERT ")).unwrap_err();
        assert!(matches!(err, LogbookError::DuplicateIdentity { .. }));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn add_parses_genre_by_number() {
        let mut store = store();
        let (outcome, _) = run(
            workflows::add::<Book, MemBackend>,
            &mut store,
            "Cosmos\nCarl Sagan\n1980\n3\ny\n",
        );

        assert!(outcome.unwrap().mutated);
        let key = NaturalKey::new(["cosmos", "carl sagan"]);
        let book = store.find(&key).unwrap();
        assert_eq!(book.genre, Genre::Science);
        assert_eq!(book.year, Some(1980));
        assert!(book.read);
    }

    #[test]
    fn implausible_year_aborts_add() {
        let mut store = store();
        let (outcome, _) = run(
            workflows::add::<Book, MemBackend>,
            &mut store,
            "Cosmos\nCarl Sagan\n-5\nscience\n\n",
        );
        assert!(matches!(outcome, Err(LogbookError::Validation { ref field, .. }) if field == "Year"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn renaming_onto_another_book_is_rejected() {
        let mut store = store();
        let (outcome, _) = run(
            workflows::edit::<Book, MemBackend>,
            &mut store,
            "The Odyssey\nHomer\nDune\nFrank Herbert\n\n\n\n",
        );
        assert!(matches!(outcome, Err(LogbookError::DuplicateIdentity { .. })));
        assert!(store.contains(&NaturalKey::new(["The Odyssey", "Homer"])));
    }

    #[test]
    fn edit_can_clear_year_and_read() {
        let mut store = store();
        let (outcome, out) = run(
            workflows::edit::<Book, MemBackend>,
            &mut store,
            "Dune\nFrank Herbert\n\n\n-\n\n-\n",
        );

        assert!(outcome.unwrap().mutated);
        assert!(out.contains("Year [1965, - clears]: "));
        let book = store.find(&NaturalKey::new(["Dune", "Frank Herbert"])).unwrap();
        assert_eq!(book.year, None);
        assert!(!book.read);
        assert_eq!(book.genre, Genre::Fiction);
    }

    #[test]
    fn list_orders_by_author() {
        let mut store = store();
        let (_, out) = run(list::<MemBackend>, &mut store, "");
        let frank = out.find("Frank Herbert").unwrap();
        let homer = out.find("Homer").unwrap();
        let stephen = out.find("Stephen Hawking").unwrap();
        assert!(frank < homer && homer < stephen);
    }

    #[test]
    fn toggle_flips_read_flag() {
        let mut store = store();
        let (outcome, out) = run(toggle_read::<MemBackend>, &mut store, "dune\nfrank herbert\n");

        assert!(outcome.unwrap().mutated);
        assert!(out.contains("as unread"));
        assert!(!store.find(&NaturalKey::new(["Dune", "Frank Herbert"])).unwrap().read);
    }

    #[test]
    fn stats_counts_genres_and_read_books() {
        let mut store = store();
        let (_, out) = run(stats::<MemBackend>, &mut store, "");
        assert!(out.contains("science"));
        assert!(out.contains("read so far"));
    }

    #[test]
    fn menu_is_numbered() {
        let table = table::<MemBackend>();
        assert!(table.menu().contains("9."));
        assert!(table.resolve("toggle").is_none());
        assert!(table.resolve("5").is_some());
    }
}
