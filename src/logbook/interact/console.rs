use crate::commands::CmdMessage;
use crate::error::{LogbookError, Result};
use crate::interact::render;
use crate::schema::{FieldSpec, FieldValue, FieldValues, Form};
use std::io::{self, BufRead, Write};

pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Typed at any field prompt to abandon the command in progress.
pub const CANCEL_WORD: &str = "cancel";

/// Typed at an optional field that has a value to remove that value.
pub const CLEAR_WORD: &str = "-";

/// Line-oriented terminal: one input stream, one output stream.
///
/// Reading a line is the only blocking point of a session.
pub struct Console<'a> {
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
    max_attempts: usize,
}

impl Console<'static> {
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<'a> Console<'a> {
    pub fn new(input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Show `prompt` and read one line. Returns None at end of input.
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn print(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", text.as_ref())?;
        Ok(())
    }

    pub fn say(&mut self, messages: &[CmdMessage]) -> Result<()> {
        for message in messages {
            self.print(render::message(message))?;
        }
        Ok(())
    }

    /// Yes/no question, defaulting to no. End of input counts as no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{} [y/N]: ", question))?;
        Ok(matches!(
            answer.as_deref().map(|a| a.trim().to_lowercase()),
            Some(ref a) if a == "y" || a == "yes"
        ))
    }

    /// Prompt for a single field until it parses, up to the attempt limit.
    ///
    /// Blank input keeps `current` when there is one, is rejected for required
    /// fields, and yields None for optional ones. On an optional field with a
    /// current value, [`CLEAR_WORD`] also yields None.
    pub fn ask(&mut self, spec: &FieldSpec, current: Option<&FieldValue>) -> Result<Option<FieldValue>> {
        let prompt = field_prompt(spec, current);

        for _ in 0..self.max_attempts {
            let Some(line) = self.read_line(&prompt)? else {
                return Err(LogbookError::Cancelled);
            };
            let raw = line.trim();
            if raw.eq_ignore_ascii_case(CANCEL_WORD) {
                return Err(LogbookError::Cancelled);
            }

            if raw == CLEAR_WORD && current.is_some() && !spec.required {
                return Ok(None);
            }

            if raw.is_empty() {
                if let Some(current) = current {
                    return Ok(Some(current.clone()));
                }
                if !spec.required {
                    return Ok(None);
                }
                self.say(&[CmdMessage::error(format!("{} is required.", spec.label))])?;
                continue;
            }

            match spec.parse(raw) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => self.say(&[CmdMessage::error(e.to_string())])?,
            }
        }

        Err(LogbookError::validation(
            spec.label,
            format!("no valid value after {} attempts", self.max_attempts),
        ))
    }

    /// Prompt for every editable field of `R`, prefilled from `current` if given.
    ///
    /// An optional field that had a value and came back empty is marked cleared.
    pub fn fill_form<R: Form>(&mut self, current: Option<&R>) -> Result<FieldValues> {
        let existing = current.map(|r| r.to_values());
        let mut values = FieldValues::new();

        for spec in R::editable_fields() {
            let current = existing.as_ref().and_then(|v| v.get(spec.name));
            match self.ask(spec, current)? {
                Some(value) => values.set(spec.name, value),
                None if current.is_some() => values.clear(spec.name),
                None => {}
            }
        }
        Ok(values)
    }

    /// Resolve the key of an existing record.
    ///
    /// For single-field identities, inline `args` (e.g. `view 3`) are used
    /// directly; otherwise each identity field is prompted for.
    pub fn ask_key<R: Form>(&mut self, args: &str) -> Result<R::Key> {
        let identity = R::identity_fields();
        let mut values = FieldValues::new();

        if let ([spec], false) = (identity.as_slice(), args.trim().is_empty()) {
            values.set(spec.name, spec.parse(args)?);
            return R::key_from_values(&values);
        }

        for spec in identity {
            if let Some(value) = self.ask(spec, None)? {
                values.set(spec.name, value);
            }
        }
        R::key_from_values(&values)
    }
}

fn field_prompt(spec: &FieldSpec, current: Option<&FieldValue>) -> String {
    let hint = spec.hint();
    let mut prompt = spec.label.to_string();
    if !hint.is_empty() {
        prompt.push_str(&format!(" ({})", hint));
    }
    if let Some(current) = current {
        let shown = current.to_string();
        if spec.required || shown.is_empty() {
            prompt.push_str(&format!(" [{}]", shown));
        } else {
            prompt.push_str(&format!(" [{}, {} clears]", shown, CLEAR_WORD));
        }
    }
    prompt.push_str(": ");
    prompt
}
