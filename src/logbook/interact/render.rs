//! Text rendering for records and messages.
//!
//! Everything here returns strings; the console decides where they go.

use crate::commands::{CmdMessage, MessageLevel};
use crate::schema::Form;
use chrono::{DateTime, Utc};
use colored::Colorize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const KEY_WIDTH: usize = 6;

pub fn message(message: &CmdMessage) -> String {
    match message.level {
        MessageLevel::Info => message.content.dimmed().to_string(),
        MessageLevel::Success => message.content.green().to_string(),
        MessageLevel::Warning => message.content.yellow().to_string(),
        MessageLevel::Error => message.content.red().to_string(),
    }
}

/// One line per record: key, summary, and age when the record has a timestamp.
pub fn record_list<R: Form>(records: &[R]) -> String {
    let mut lines = Vec::with_capacity(records.len());

    for record in records {
        let key = format!("{}. ", record.key());
        let key = format!("{:>width$}", key, width = KEY_WIDTH);
        let age = record.timestamp().map(format_time_ago);

        let fixed = 2 + key.width() + age.as_ref().map_or(0, |_| TIME_WIDTH);
        let available = LINE_WIDTH.saturating_sub(fixed);
        let summary = truncate_to_width(&record.summary(), available);

        let mut line = format!("  {}{}", key.yellow(), summary);
        if let Some(age) = age {
            let padding = available.saturating_sub(summary.width());
            line.push_str(&" ".repeat(padding));
            line.push_str(&age.dimmed().to_string());
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Every field of a record, one per line, labels aligned.
pub fn record_detail<R: Form>(record: &R) -> String {
    let values = record.to_values();
    let label_width = R::fields()
        .iter()
        .map(|f| f.label.width())
        .max()
        .unwrap_or(0);

    let mut out = vec![format!("{}", record.key().to_string().yellow().bold())];
    out.push("-".repeat(32));
    for spec in R::fields() {
        let value = values
            .get(spec.name)
            .map(|v| v.to_string())
            .unwrap_or_default();
        let value = if value.is_empty() {
            "-".dimmed().to_string()
        } else {
            value
        };
        out.push(format!(
            "{:<width$}  {}",
            format!("{}:", spec.label),
            value,
            width = label_width + 1
        ));
    }
    out.join("\n")
}

pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    let flat: String = s.chars().map(|c| if c == '\n' { ' ' } else { c }).collect();
    if flat.width() <= max_width {
        return flat;
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in flat.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

pub fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
