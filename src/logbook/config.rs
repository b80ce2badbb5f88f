use crate::error::{LogbookError, Result};
use crate::interact::console::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILENAME: &str = "config.json";
pub const DATA_DIR_ENV: &str = "LOGBOOK_DATA_DIR";
pub const SAVE_POLICY_ENV: &str = "LOGBOOK_SAVE_POLICY";

/// Declares a kebab-case policy enum with `Display` and `FromStr` that match
/// its serde form.
macro_rules! policy {
    (
        $(#[$meta:meta])*
        $name:ident { $default:ident => $default_str:literal $(, $variant:ident => $str:literal)* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            #[default]
            $default,
            $($variant,)*
        }

        impl $name {
            pub const NAMES: &'static [&'static str] = &[$default_str $(, $str)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::$default => $default_str,
                    $($name::$variant => $str,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = LogbookError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim().to_lowercase().as_str() {
                    $default_str => Ok($name::$default),
                    $($str => Ok($name::$variant),)*
                    other => Err(LogbookError::Config(format!(
                        "'{}' is not one of: {}",
                        other,
                        Self::NAMES.join(", ")
                    ))),
                }
            }
        }
    };
}

policy! {
    /// When collections are written back to disk.
    SavePolicy {
        EveryMutation => "every-mutation",
        OnExit => "on-exit",
    }
}

policy! {
    /// What to do when saving a collection fails mid-session.
    WriteFailurePolicy {
        RetryOnce => "retry-once",
        Warn => "warn",
        Abort => "abort",
    }
}

policy! {
    /// What to do when a collection file cannot be decoded at startup.
    CorruptFilePolicy {
        Ask => "ask",
        StartFresh => "start-fresh",
        Abort => "abort",
    }
}

/// Configuration for logbook, stored as `config.json` in the config directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogbookConfig {
    /// Where collection files live. Unset means the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub save_policy: SavePolicy,

    #[serde(default)]
    pub on_write_failure: WriteFailurePolicy,

    #[serde(default)]
    pub on_corrupt_file: CorruptFilePolicy,

    /// Tries per field before a prompt gives up
    #[serde(default = "default_max_attempts")]
    pub max_field_attempts: usize,

    /// Fill a collection with sample records the first time it is opened
    #[serde(default = "default_seed_samples")]
    pub seed_samples: bool,
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

fn default_seed_samples() -> bool {
    true
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            save_policy: SavePolicy::default(),
            on_write_failure: WriteFailurePolicy::default(),
            on_corrupt_file: CorruptFilePolicy::default(),
            max_field_attempts: default_max_attempts(),
            seed_samples: default_seed_samples(),
        }
    }
}

impl LogbookConfig {
    pub const KEYS: &'static [&'static str] = &[
        "data_dir",
        "save_policy",
        "on_write_failure",
        "on_corrupt_file",
        "max_field_attempts",
        "seed_samples",
    ];

    /// Load config from `path`, or return defaults if there is no file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| LogbookError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut content = serde_json::to_string_pretty(self)?;
        content.push('\n');
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "data_dir" => self
                .data_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "save_policy" => self.save_policy.to_string(),
            "on_write_failure" => self.on_write_failure.to_string(),
            "on_corrupt_file" => self.on_corrupt_file.to_string(),
            "max_field_attempts" => self.max_field_attempts.to_string(),
            "seed_samples" => self.seed_samples.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a key from its text form. An empty `data_dir` unsets it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "data_dir" => {
                self.data_dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            "save_policy" => self.save_policy = value.parse()?,
            "on_write_failure" => self.on_write_failure = value.parse()?,
            "on_corrupt_file" => self.on_corrupt_file = value.parse()?,
            "max_field_attempts" => {
                self.max_field_attempts = match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(LogbookError::Config(format!(
                            "max_field_attempts must be a positive number, got '{}'",
                            value
                        )))
                    }
                }
            }
            "seed_samples" => {
                self.seed_samples = match value.to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => {
                        return Err(LogbookError::Config(format!(
                            "seed_samples must be true or false, got '{}'",
                            value
                        )))
                    }
                }
            }
            other => {
                return Err(LogbookError::Config(format!(
                    "Unknown config key: {} (known keys: {})",
                    other,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Every key with its current value, in a stable order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        Self::KEYS
            .iter()
            .map(|key| (*key, self.get(key).unwrap_or_default()))
            .collect()
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in the binary.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(policy) = lookup(SAVE_POLICY_ENV) {
            self.save_policy = policy.parse().map_err(|e| {
                LogbookError::Config(format!("{}: {}", SAVE_POLICY_ENV, e))
            })?;
        }
        Ok(())
    }
}
