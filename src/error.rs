//! Errors surfaced to the host
//!
//! Only setup can fail. Pool exhaustion and spawn crowding are normal play and
//! never show up here.

use std::fmt;

#[derive(Debug)]
pub enum RoundError {
    /// No input source was supplied; the round cannot begin
    InputUnavailable,
    /// Settings that would break the round's invariants
    InvalidSettings(String),
    /// Settings JSON could not be parsed
    SettingsParse(serde_json::Error),
    /// Settings file could not be read
    Io(std::io::Error),
}

impl fmt::Display for RoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundError::InputUnavailable => write!(f, "input source is not available"),
            RoundError::InvalidSettings(reason) => write!(f, "invalid settings: {reason}"),
            RoundError::SettingsParse(e) => write!(f, "failed to parse settings: {e}"),
            RoundError::Io(e) => write!(f, "failed to read settings: {e}"),
        }
    }
}

impl std::error::Error for RoundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoundError::SettingsParse(e) => Some(e),
            RoundError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RoundError {
    fn from(e: serde_json::Error) -> Self {
        RoundError::SettingsParse(e)
    }
}

impl From<std::io::Error> for RoundError {
    fn from(e: std::io::Error) -> Self {
        RoundError::Io(e)
    }
}
