mod client;
mod error;
mod protocol;
mod store;
mod types;
mod view;

pub use client::{RefreshOutcome, Uwg4Client, Uwg4ClientBuilder, MAX_SETPOINT, MIN_SETPOINT};
pub use error::{Error, Result};
pub use types::*;
pub use view::ThermostatView;
