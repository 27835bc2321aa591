use std::fmt;

use crate::types::Temperature;

#[derive(Debug)]
pub enum Error {
    Http(reqwest::Error),
    Json(serde_json::Error),
    Login { code: i32 },
    NotAuthenticated,
    NoThermostats,
    CommandRejected,
    UnknownThermostat(String),
    SetpointOutOfRange(Temperature),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {e}"),
            Error::Json(e) => write!(f, "malformed response: {e}"),
            Error::Login { code } => write!(f, "login rejected, vendor error code {code}"),
            Error::NotAuthenticated => write!(f, "no active session"),
            Error::NoThermostats => write!(f, "account snapshot contained no thermostats"),
            Error::CommandRejected => write!(f, "thermostat update rejected by server"),
            Error::UnknownThermostat(serial) => write!(f, "unknown thermostat: {serial}"),
            Error::SetpointOutOfRange(t) => write!(f, "setpoint {t} outside allowed range"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
