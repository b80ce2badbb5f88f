//! To-do list on a keyword menu: `add`, `list open`, `done 3`, `rm 3` ...

use crate::commands::{self, CmdMessage};
use crate::error::{LogbookError, Result};
use crate::interact::console::Console;
use crate::interact::table::{CommandTable, Outcome};
use crate::interact::workflows;
use crate::model::Record;
use crate::schema::{FieldKind, FieldSpec, FieldValue, FieldValues, Form, DATE_FORMAT};
use crate::store::{StorageBackend, Store};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const PRIORITIES: &[&str] = &["low", "medium", "high"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        [Priority::Low, Priority::Medium, Priority::High]
            .into_iter()
            .find(|p| p.as_str() == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: u64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            priority: Priority::default(),
            done: false,
            due: None,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

const TASK_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("id", "Id", FieldKind::Integer)
        .identity()
        .generated(),
    FieldSpec::new("title", "Title", FieldKind::Text).required(),
    FieldSpec::new("priority", "Priority", FieldKind::Choice(PRIORITIES)),
    FieldSpec::new("due", "Due", FieldKind::Date),
    FieldSpec::new("tags", "Tags", FieldKind::List),
    // changed with the `done` command, not the form
    FieldSpec::new("done", "Done", FieldKind::Bool).generated(),
];

impl Record for Task {
    type Key = u64;
    const COLLECTION: &'static str = "tasks";

    fn key(&self) -> u64 {
        self.id
    }

    fn sequence(&self) -> Option<u64> {
        Some(self.id)
    }
}

fn priority(values: &FieldValues) -> Result<Option<Priority>> {
    values
        .opt_choice("priority")?
        .map(|tag| {
            Priority::from_tag(tag).ok_or_else(|| {
                LogbookError::validation("Priority", format!("unknown priority '{}'", tag))
            })
        })
        .transpose()
}

impl Form for Task {
    fn fields() -> &'static [FieldSpec] {
        TASK_FIELDS
    }

    fn to_values(&self) -> FieldValues {
        let mut values = FieldValues::new()
            .with("id", FieldValue::id(self.id))
            .with("title", FieldValue::Text(self.title.clone()))
            .with("priority", FieldValue::Choice(self.priority.as_str().to_string()));
        if let Some(due) = self.due {
            values.set("due", FieldValue::Date(due));
        }
        values
            .with("tags", FieldValue::List(self.tags.clone()))
            .with("done", FieldValue::Bool(self.done))
    }

    fn from_values(values: &FieldValues, next_seq: u64) -> Result<Self> {
        Ok(Self {
            id: next_seq,
            title: values.text("title")?,
            priority: priority(values)?.unwrap_or_default(),
            done: values.bool_or("done", false)?,
            due: values.opt_date("due")?,
            tags: values.list("tags")?,
            created_at: Utc::now(),
        })
    }

    fn apply_values(&mut self, values: &FieldValues) -> Result<()> {
        if values.get("title").is_some() {
            self.title = values.text("title")?;
        }
        if let Some(p) = priority(values)? {
            self.priority = p;
        } else if values.is_cleared("priority") {
            self.priority = Priority::default();
        }
        if let Some(due) = values.opt_date("due")? {
            self.due = Some(due);
        } else if values.is_cleared("due") {
            self.due = None;
        }
        if values.get("tags").is_some() || values.is_cleared("tags") {
            self.tags = values.list("tags")?;
        }
        self.done = values.bool_or("done", self.done)?;
        Ok(())
    }

    fn key_from_values(values: &FieldValues) -> Result<u64> {
        super::sequence_key(values, "id")
    }

    fn summary(&self) -> String {
        let mark = if self.done { "[x]" } else { "[ ]" };
        let mut line = format!("{} {}", mark, self.title);
        if self.priority != Priority::Medium {
            line.push_str(&format!(" !{}", self.priority.as_str()));
        }
        if let Some(due) = self.due {
            line.push_str(&format!(" (due {})", due.format(DATE_FORMAT)));
        }
        if !self.tags.is_empty() {
            line.push_str(&format!(" #{}", self.tags.join(" #")));
        }
        line
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

pub fn samples() -> Vec<Task> {
    let mut first = Task::new(1, "Try the task list");
    first.tags = vec!["logbook".to_string()];
    let mut second = Task::new(2, "Mark a task as done with: done 2");
    second.priority = Priority::High;
    vec![first, second]
}

pub fn table<B: StorageBackend>() -> CommandTable<Store<Task, B>> {
    CommandTable::keyword("Tasks")
        .command(&["add", "a"], "Add a task", workflows::add::<Task, B>)
        .command(&["list", "ls"], "List tasks [open|done]", list::<B>)
        .command(&["view", "show"], "View a task <id>", workflows::view::<Task, B>)
        .command(&["edit"], "Edit a task <id>", workflows::edit::<Task, B>)
        .command(&["done"], "Mark a task done <id>", done::<B>)
        .command(&["delete", "rm"], "Delete a task <id>", workflows::delete::<Task, B>)
        .command(&["search", "find"], "Search tasks <text>", workflows::search::<Task, B>)
        .command(&["stats"], "Open and done counts", stats::<B>)
        .exit(&["exit", "quit", "q"], "Exit")
}

/// Open tasks first, then by priority (high to low), then due date.
fn list<B: StorageBackend>(
    store: &mut Store<Task, B>,
    console: &mut Console<'_>,
    args: &str,
) -> Result<Outcome> {
    let filter = args.trim().to_lowercase();
    let wanted: Option<bool> = match filter.as_str() {
        "" | "all" => None,
        "open" => Some(false),
        "done" => Some(true),
        other => {
            return Err(LogbookError::validation(
                "filter",
                format!("'{}' is not one of: open, done, all", other),
            ))
        }
    };

    let result = commands::list::run_with(
        store,
        |t| wanted.map_or(true, |done| t.done == done),
        |a, b| {
            a.done
                .cmp(&b.done)
                .then_with(|| b.priority.cmp(&a.priority))
                .then_with(|| match (a.due, b.due) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
        },
    )?;
    workflows::show(console, &result)
}

fn done<B: StorageBackend>(
    store: &mut Store<Task, B>,
    console: &mut Console<'_>,
    args: &str,
) -> Result<Outcome> {
    if workflows::report_empty(store, console)? {
        return Ok(Outcome::unchanged());
    }
    let key = console.ask_key::<Task>(args)?;
    if store.find(&key)?.done {
        console.say(&[CmdMessage::info(format!("Task {} is already done.", key))])?;
        return Ok(Outcome::unchanged());
    }

    let result = commands::edit::apply(store, &key, |task| {
        task.done = true;
        Ok(())
    })?;
    console.say(&[CmdMessage::success(format!("Task {} done.", key))])?;
    Ok(Outcome::from_result(&result))
}

fn stats<B: StorageBackend>(
    store: &mut Store<Task, B>,
    console: &mut Console<'_>,
    _args: &str,
) -> Result<Outcome> {
    let result = commands::stats::run(store, "Tasks by status", |t| {
        let status = if t.done { "done" } else { "open" };
        status.to_string()
    })?;
    console.say(&result.messages)?;
    Ok(Outcome::unchanged())
}
