use crate::commands::CmdResult;
use crate::error::Result;
use crate::interact::console::Console;
use crate::model::Record;
use colored::Colorize;

/// How commands are addressed in a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// `1`, `2`, ... assigned in registration order.
    Numeric,
    /// `add`, `list`, `exit`, with aliases. Case-insensitive.
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// What a handler did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub flow: Flow,
    /// The handler changed a collection, so it is a save point.
    pub mutated: bool,
}

impl Outcome {
    pub fn unchanged() -> Self {
        Self {
            flow: Flow::Continue,
            mutated: false,
        }
    }

    pub fn changed() -> Self {
        Self {
            flow: Flow::Continue,
            mutated: true,
        }
    }

    pub fn from_result<R: Record>(result: &CmdResult<R>) -> Self {
        if result.mutated() {
            Self::changed()
        } else {
            Self::unchanged()
        }
    }
}

/// A command handler: the loop context, the console, and any text typed after
/// the command word.
pub type Handler<Ctx> = fn(&mut Ctx, &mut Console<'_>, &str) -> Result<Outcome>;

pub enum Action<Ctx> {
    Run(Handler<Ctx>),
    Help,
    Exit,
}

impl<Ctx> Clone for Action<Ctx> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Ctx> Copy for Action<Ctx> {}

struct Binding<Ctx> {
    keys: Vec<String>,
    label: &'static str,
    action: Action<Ctx>,
}

/// The registered commands of one menu, and how input maps onto them.
pub struct CommandTable<Ctx> {
    title: String,
    discipline: Discipline,
    bindings: Vec<Binding<Ctx>>,
}

impl<Ctx> CommandTable<Ctx> {
    pub fn numeric(title: impl Into<String>) -> Self {
        Self::new(title, Discipline::Numeric)
    }

    pub fn keyword(title: impl Into<String>) -> Self {
        Self::new(title, Discipline::Keyword)
    }

    fn new(title: impl Into<String>, discipline: Discipline) -> Self {
        Self {
            title: title.into(),
            discipline,
            bindings: Vec::new(),
        }
    }

    /// Register a command. Numeric menus ignore `words` and number it instead.
    pub fn command(self, words: &[&str], label: &'static str, handler: Handler<Ctx>) -> Self {
        self.bind(words, label, Action::Run(handler))
    }

    /// Register the command that ends the session.
    pub fn exit(self, words: &[&str], label: &'static str) -> Self {
        self.bind(words, label, Action::Exit)
    }

    fn bind(mut self, words: &[&str], label: &'static str, action: Action<Ctx>) -> Self {
        let keys = match self.discipline {
            Discipline::Numeric => vec![(self.bindings.len() + 1).to_string()],
            Discipline::Keyword => words.iter().map(|w| w.to_lowercase()).collect(),
        };
        self.bindings.push(Binding {
            keys,
            label,
            action,
        });
        self
    }

    /// Map a trimmed input line to an action and its trailing arguments.
    ///
    /// `help` and `?` always show the menu unless bound to something else.
    pub fn resolve<'i>(&self, input: &'i str) -> Option<(Action<Ctx>, &'i str)> {
        let input = input.trim();
        let (word, args) = match input.split_once(char::is_whitespace) {
            Some((word, args)) => (word, args.trim()),
            None => (input, ""),
        };
        let word = word.to_lowercase();

        if let Some(binding) = self.bindings.iter().find(|b| b.keys.contains(&word)) {
            return Some((binding.action, args));
        }
        if word == "help" || word == "?" {
            return Some((Action::Help, args));
        }
        None
    }

    pub fn menu(&self) -> String {
        let mut lines = vec![format!("{}", self.title.bold())];
        for binding in &self.bindings {
            let keys = match self.discipline {
                Discipline::Numeric => format!("{}.", binding.keys[0]),
                Discipline::Keyword => binding.keys.join("|"),
            };
            lines.push(format!("  {:<14} {}", keys, binding.label));
        }
        if self.discipline == Discipline::Keyword {
            lines.push(format!("  {:<14} {}", "help", "Show this menu"));
        }
        lines.join("\n")
    }

    pub fn prompt(&self) -> &'static str {
        match self.discipline {
            Discipline::Numeric => "Choose an option: ",
            Discipline::Keyword => "> ",
        }
    }
}
