use crate::codec::Codec;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LogbookError, Result};
use crate::schema::Form;
use crate::store::{StorageBackend, Store};

/// Case-insensitive search over every field's displayed value.
///
/// Records whose identity fields equal the term rank first, then records with
/// the term in an identity field, then anything else that contains it. Within
/// a rank, insertion order is kept.
pub fn run<R, B, C>(store: &Store<R, B, C>, term: &str) -> Result<CmdResult<R>>
where
    R: Form,
    B: StorageBackend,
    C: Codec<R>,
{
    let term = term.trim();
    if term.is_empty() {
        return Err(LogbookError::validation("search term", "cannot be empty"));
    }
    let needle = term.to_lowercase();
    let identity: Vec<&str> = R::identity_fields().iter().map(|f| f.name).collect();

    let mut matches: Vec<(u8, R)> = store
        .query(|_| true)
        .filter_map(|record| {
            let values = record.to_values();
            let mut best: Option<u8> = None;
            for (name, value) in values.iter() {
                let text = value.to_string().to_lowercase();
                let is_identity = identity.contains(name);
                let score = if is_identity && text == needle {
                    1
                } else if is_identity && text.contains(&needle) {
                    2
                } else if text.contains(&needle) {
                    3
                } else {
                    continue;
                };
                best = Some(best.map_or(score, |b| b.min(score)));
            }
            best.map(|score| (score, record.clone()))
        })
        .collect();

    matches.sort_by_key(|(score, _)| *score);

    let mut result = CmdResult::default();
    if matches.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "No {} match \"{}\".",
            R::COLLECTION,
            term
        )));
    }
    Ok(result.with_listed(matches.into_iter().map(|(_, r)| r).collect()))
}
