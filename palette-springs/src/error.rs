use std::fmt;
use std::io;

use crate::palette::PALETTE_LEN;

#[derive(Debug)]
pub enum Error {
    /// A palette listing held fewer than [`PALETTE_LEN`] colors.
    MissingColors { found: usize },
    /// A palette listing held more than [`PALETTE_LEN`] colors.
    ExtraColors { found: usize },
    Io(io::Error),
    /// The configuration file is not valid TOML for [`crate::config::EngineConfig`].
    Config(toml::de::Error),
    /// The configuration decoded but holds values the engine cannot use.
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;
        match self {
            MissingColors { found } => {
                write!(f, "missing colors: expected {PALETTE_LEN}, found {found}")
            }
            ExtraColors { found } => {
                write!(f, "too many colors: expected {PALETTE_LEN}, found {found}")
            }
            Io(err) => write!(f, "i/o error: {err}"),
            Config(err) => write!(f, "malformed config: {err}"),
            InvalidConfig(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err)
    }
}
