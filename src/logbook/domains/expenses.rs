//! Spending log with money amounts and dates, on a numbered menu.

use crate::commands::{self, CmdMessage};
use crate::error::{LogbookError, Result};
use crate::interact::console::Console;
use crate::interact::table::{CommandTable, Outcome};
use crate::interact::workflows;
use crate::model::{Money, Record};
use crate::schema::{FieldKind, FieldSpec, FieldValue, FieldValues, Form, DATE_FORMAT};
use crate::store::{StorageBackend, Store};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const CATEGORIES: &[&str] = &[
    "food",
    "transport",
    "housing",
    "utilities",
    "entertainment",
    "health",
    "other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Housing,
    Utilities,
    Entertainment,
    Health,
    #[default]
    Other,
}

impl Category {
    const ALL: [Category; 7] = [
        Category::Food,
        Category::Transport,
        Category::Housing,
        Category::Utilities,
        Category::Entertainment,
        Category::Health,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Other => "other",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub date: NaiveDate,
    pub amount: Money,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub note: String,
}

const EXPENSE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "Id", FieldKind::Integer)
        .identity()
        .generated(),
    FieldSpec::new("date", "Date", FieldKind::Date).required(),
    FieldSpec::new("amount", "Amount", FieldKind::Decimal).required(),
    FieldSpec::new("category", "Category", FieldKind::Choice(CATEGORIES)).required(),
    FieldSpec::new("note", "Note", FieldKind::Text),
];

impl Record for Expense {
    type Key = u64;
    const COLLECTION: &'static str = "expenses";

    fn key(&self) -> u64 {
        self.id
    }

    fn sequence(&self) -> Option<u64> {
        Some(self.id)
    }
}

fn amount(values: &FieldValues) -> Result<Money> {
    let amount = values.decimal("amount")?;
    if !amount.is_positive() {
        return Err(LogbookError::validation(
            "Amount",
            format!("{} must be greater than zero", amount),
        ));
    }
    Ok(amount)
}

fn category(values: &FieldValues) -> Result<Option<Category>> {
    values
        .opt_choice("category")?
        .map(|tag| {
            Category::from_tag(tag).ok_or_else(|| {
                LogbookError::validation("Category", format!("unknown category '{}'", tag))
            })
        })
        .transpose()
}

impl Form for Expense {
    fn fields() -> &'static [FieldSpec] {
        EXPENSE_FIELDS
    }

    fn to_values(&self) -> FieldValues {
        FieldValues::new()
            .with("id", FieldValue::id(self.id))
            .with("date", FieldValue::Date(self.date))
            .with("amount", FieldValue::Decimal(self.amount))
            .with("category", FieldValue::Choice(self.category.as_str().to_string()))
            .with("note", FieldValue::Text(self.note.clone()))
    }

    fn from_values(values: &FieldValues, next_seq: u64) -> Result<Self> {
        Ok(Self {
            id: next_seq,
            date: values.date("date")?,
            amount: amount(values)?,
            category: category(values)?.unwrap_or_default(),
            note: values.opt_text("note")?,
        })
    }

    fn apply_values(&mut self, values: &FieldValues) -> Result<()> {
        if let Some(date) = values.opt_date("date")? {
            self.date = date;
        }
        if values.get("amount").is_some() {
            self.amount = amount(values)?;
        }
        if let Some(c) = category(values)? {
            self.category = c;
        }
        if values.get("note").is_some() || values.is_cleared("note") {
            self.note = values.opt_text("note")?;
        }
        Ok(())
    }

    fn key_from_values(values: &FieldValues) -> Result<u64> {
        super::sequence_key(values, "id")
    }

    fn summary(&self) -> String {
        format!(
            "{}  {:>10}  {:<13} {}",
            self.date.format(DATE_FORMAT),
            self.amount.to_string(),
            self.category.as_str(),
            self.note
        )
    }
}

pub fn samples() -> Vec<Expense> {
    let sample = |id: u64, (y, m, d): (i32, u32, u32), cents: i64, category, note: &str| {
        NaiveDate::from_ymd_opt(y, m, d).map(|date| Expense {
            id,
            date,
            amount: Money::from_cents(cents),
            category,
            note: note.to_string(),
        })
    };
    [
        sample(1, (2024, 3, 1), 120_000, Category::Housing, "March rent"),
        sample(2, (2024, 3, 4), 6_245, Category::Food, "Groceries"),
        sample(3, (2024, 3, 9), 2_750, Category::Transport, "Bus pass"),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Total spent per category, largest first.
pub fn totals<B: StorageBackend>(store: &Store<Expense, B>) -> Vec<(Category, Money)> {
    let mut totals: Vec<(Category, Money)> = Category::ALL
        .into_iter()
        .map(|c| (c, store.query(move |e| e.category == c).map(|e| e.amount).sum()))
        .filter(|(_, total): &(Category, Money)| total.is_positive())
        .collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

pub fn table<B: StorageBackend>() -> CommandTable<Store<Expense, B>> {
    CommandTable::numeric("Expenses")
        .command(&["add"], "Add an expense", workflows::add::<Expense, B>)
        .command(&["list"], "List expenses by date (optionally: YYYY-MM)", list::<B>)
        .command(&["view"], "View an expense", workflows::view::<Expense, B>)
        .command(&["edit"], "Edit an expense", workflows::edit::<Expense, B>)
        .command(&["delete"], "Delete an expense", workflows::delete::<Expense, B>)
        .command(&["search"], "Search expenses", workflows::search::<Expense, B>)
        .command(&["totals"], "Totals by category", summary::<B>)
        .exit(&["exit"], "Exit")
}

/// Expenses oldest first. A `YYYY-MM` argument limits the list to one month.
fn list<B: StorageBackend>(
    store: &mut Store<Expense, B>,
    console: &mut Console<'_>,
    args: &str,
) -> Result<Outcome> {
    let month = args.trim();
    let month_start = if month.is_empty() {
        None
    } else {
        let start = NaiveDate::parse_from_str(&format!("{}-01", month), DATE_FORMAT)
            .map_err(|_| LogbookError::validation("month", format!("'{}' is not YYYY-MM", month)))?;
        Some(start)
    };

    let result = commands::list::run_with(
        store,
        |e| month_start.map_or(true, |start| same_month(e.date, start)),
        |a, b| a.date.cmp(&b.date),
    )?;
    workflows::show(console, &result)?;

    if !result.listed.is_empty() {
        let total: Money = result.listed.iter().map(|e| e.amount).sum();
        console.say(&[CmdMessage::info(format!("Total: {}", total))])?;
    }
    Ok(Outcome::unchanged())
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn summary<B: StorageBackend>(
    store: &mut Store<Expense, B>,
    console: &mut Console<'_>,
    _args: &str,
) -> Result<Outcome> {
    let totals = totals(store);
    if totals.is_empty() {
        console.say(&[commands::none_found::<Expense>()])?;
        return Ok(Outcome::unchanged());
    }

    let mut messages = vec![CmdMessage::info("Totals by category")];
    for (category, total) in &totals {
        messages.push(CmdMessage::info(format!(
            "  {:<16} {:>10}",
            category.as_str(),
            total.to_string()
        )));
    }
    let grand: Money = totals.iter().map(|(_, t)| *t).sum();
    messages.push(CmdMessage::info(format!(
        "  {:<16} {:>10}",
        "total",
        grand.to_string()
    )));
    console.say(&messages)?;
    Ok(Outcome::unchanged())
}
