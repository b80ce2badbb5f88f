//! # Session
//!
//! A [`Session`] is the process-level context of one interactive run: where
//! the data lives, which policies apply, and whether the loop is still going.
//! There is no global state; everything the loop needs is passed in.
//!
//! ```text
//! Session::open ─► open_store (load / seed / corrupt recovery)
//!               ─► run (read ─► resolve ─► handle ─► save point) until exit or EOF
//!               ─► final save
//! ```

use crate::codec::Codec;
use crate::commands::CmdMessage;
use crate::config::{CorruptFilePolicy, LogbookConfig, SavePolicy, WriteFailurePolicy};
use crate::error::{LogbookError, Result};
use crate::interact::console::Console;
use crate::interact::table::{Action, CommandTable, Flow};
use crate::schema::Form;
use crate::store::fs_backend::FsBackend;
use crate::store::{LoadOutcome, StorageBackend, Store};
use chrono::Local;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Something the loop can write back to disk at a save point.
pub trait Persist {
    fn is_dirty(&self) -> bool;
    fn save_all(&mut self) -> Result<()>;
}

impl<R, B, C> Persist for Store<R, B, C>
where
    R: crate::model::Record,
    B: StorageBackend,
    C: Codec<R>,
{
    fn is_dirty(&self) -> bool {
        Store::is_dirty(self)
    }

    fn save_all(&mut self) -> Result<()> {
        self.save()
    }
}

pub struct Session {
    data_dir: PathBuf,
    config: LogbookConfig,
    state: LoopState,
}

impl Session {
    /// Start a session rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>, config: LogbookConfig) -> Result<Self> {
        let data_dir = data_dir.into();
        FsBackend::new(data_dir.clone()).ensure_dir()?;
        info!(data_dir = %data_dir.display(), "session opened");
        Ok(Self {
            data_dir,
            config,
            state: LoopState::Terminated,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Load the collection for `R` from the data directory.
    pub fn open_store<R, F>(&self, console: &mut Console<'_>, seed: F) -> Result<Store<R, FsBackend>>
    where
        R: Form,
        F: FnOnce() -> Vec<R>,
    {
        self.open_store_with(FsBackend::new(self.data_dir.clone()), console, seed)
    }

    /// Load the collection for `R` from `backend`, applying the corrupt-file
    /// policy if it cannot be decoded.
    pub fn open_store_with<R, B, F>(
        &self,
        backend: B,
        console: &mut Console<'_>,
        seed: F,
    ) -> Result<Store<R, B>>
    where
        R: Form,
        B: StorageBackend,
        F: FnOnce() -> Vec<R>,
    {
        let mut store = Store::new(backend);
        let seeding = self.config.seed_samples;

        match store.load_or_seed(|| if seeding { seed() } else { Vec::new() }) {
            Ok(LoadOutcome::Loaded(count)) => {
                info!(
                    collection = R::COLLECTION,
                    count,
                    path = %store.location().display(),
                    "collection loaded"
                );
                Ok(store)
            }
            Ok(LoadOutcome::Seeded(count)) => {
                info!(collection = R::COLLECTION, count, "new collection");
                if count > 0 {
                    console.say(&[CmdMessage::info(format!(
                        "Started a new {} collection with {} sample records.",
                        R::COLLECTION,
                        count
                    ))])?;
                }
                Ok(store)
            }
            Err(e) if e.is_corrupt_file() => {
                warn!(collection = R::COLLECTION, "cannot decode: {}", e);
                self.recover_corrupt(store, console, e)
            }
            Err(e) => Err(e),
        }
    }

    fn recover_corrupt<R, B>(
        &self,
        mut store: Store<R, B>,
        console: &mut Console<'_>,
        error: LogbookError,
    ) -> Result<Store<R, B>>
    where
        R: Form,
        B: StorageBackend,
    {
        let fresh = match self.config.on_corrupt_file {
            CorruptFilePolicy::Abort => false,
            CorruptFilePolicy::StartFresh => true,
            CorruptFilePolicy::Ask => {
                console.say(&[CmdMessage::error(error.to_string())])?;
                console.confirm(&format!(
                    "Start with an empty {} collection? The damaged file is kept aside",
                    R::COLLECTION
                ))?
            }
        };
        if !fresh {
            return Err(error);
        }

        let suffix = format!("corrupt-{}", Local::now().format("%Y%m%d%H%M%S"));
        if let Some(moved) = store.start_fresh(&suffix)? {
            warn!(collection = R::COLLECTION, moved = %moved.display(), "started fresh");
            console.say(&[CmdMessage::warning(format!(
                "Moved the damaged file to {}.",
                moved.display()
            ))])?;
        }
        Ok(store)
    }

    /// Drive `table` against `ctx` until the exit command or end of input, then
    /// make the final save.
    ///
    /// Recoverable errors are printed and the loop continues. A save that fails
    /// at exit is always returned as an error.
    pub fn run<Ctx: Persist>(
        &mut self,
        table: &CommandTable<Ctx>,
        ctx: &mut Ctx,
        console: &mut Console<'_>,
    ) -> Result<()> {
        self.state = LoopState::Running;
        console.print(table.menu())?;

        while self.state == LoopState::Running {
            let Some(line) = console.read_line(table.prompt())? else {
                debug!("end of input");
                self.state = LoopState::Terminated;
                break;
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            match table.resolve(input) {
                None => console.say(&[CmdMessage::error(format!(
                    "Unknown command '{}'. Type help to see the menu.",
                    input
                ))])?,
                Some((Action::Help, _)) => console.print(table.menu())?,
                Some((Action::Exit, _)) => self.state = LoopState::Terminated,
                Some((Action::Run(handler), args)) => match handler(ctx, console, args) {
                    Ok(outcome) => {
                        if outcome.mutated && self.config.save_policy == SavePolicy::EveryMutation {
                            if let Err(e) = self.persist(ctx, console) {
                                self.state = LoopState::Terminated;
                                return Err(e);
                            }
                        }
                        if outcome.flow == Flow::Exit {
                            self.state = LoopState::Terminated;
                        }
                    }
                    Err(LogbookError::Cancelled) => console.say(&[CmdMessage::info("Cancelled.")])?,
                    Err(e) if e.is_recoverable() => {
                        debug!("command failed: {}", e);
                        console.say(&[CmdMessage::error(e.to_string())])?;
                    }
                    Err(e) => {
                        self.state = LoopState::Terminated;
                        return Err(e);
                    }
                },
            }
        }

        self.finish(ctx)
    }

    /// Mid-session save point.
    fn persist<Ctx: Persist>(&self, ctx: &mut Ctx, console: &mut Console<'_>) -> Result<()> {
        if !ctx.is_dirty() {
            return Ok(());
        }
        let error = match ctx.save_all() {
            Ok(()) => return Ok(()),
            Err(e) if !e.is_write_failure() => return Err(e),
            Err(e) => e,
        };
        warn!("save failed: {}", error);

        let error = match self.config.on_write_failure {
            WriteFailurePolicy::Abort => return Err(error),
            WriteFailurePolicy::Warn => error,
            WriteFailurePolicy::RetryOnce => match ctx.save_all() {
                Ok(()) => {
                    info!("save succeeded on retry");
                    return Ok(());
                }
                Err(e) => e,
            },
        };

        console.say(&[CmdMessage::warning(format!(
            "{}. Changes are kept in memory and will be saved again later.",
            error
        ))])?;
        Ok(())
    }

    fn finish<Ctx: Persist>(&mut self, ctx: &mut Ctx) -> Result<()> {
        self.state = LoopState::Terminated;
        if ctx.is_dirty() {
            if let Err(e) = ctx.save_all() {
                if self.config.on_write_failure != WriteFailurePolicy::RetryOnce
                    || !e.is_write_failure()
                {
                    return Err(e);
                }
                warn!("final save failed, retrying: {}", e);
                ctx.save_all()?;
            }
        }
        info!("session ended");
        Ok(())
    }
}
