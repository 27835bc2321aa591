use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::Temperature;

/// Value of the "Application" field the vendor expects from third-party
/// integrations.
pub const APPLICATION_ID: u8 = 2;

/// How far ahead of "now" a comfort override expires.
pub const COMFORT_DURATION_MIN: i64 = 90;

const END_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:00 +00:00";

/// Placeholder the vendor requires in the vacation begin/end fields when
/// vacation scheduling is disabled. No timezone suffix on these two.
const VACATION_EPOCH: &str = "01/01/1970 00:00:00";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthResponse {
    pub session_id: String,
    pub error_code: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateResponse {
    pub success: bool,
}

pub fn authenticate_body(email: &str, password: &str) -> Value {
    json!({
        "Application": APPLICATION_ID,
        "Confirm": "",
        "Email": email,
        "Password": password
    })
}

/// Schedule-follow payload. The thermostat picks its own setpoints, so no
/// temperature is sent.
pub fn auto_body() -> Value {
    json!({
        "RegulationMode": 1
    })
}

/// Temporary override lasting `hold_minutes` from `now`.
pub fn comfort_body(target: Temperature, now: DateTime<Utc>, hold_minutes: i64) -> Value {
    let end = now + Duration::minutes(hold_minutes);
    json!({
        "RegulationMode": 2,
        "ComfortTemperature": target,
        "ComfortEndTime": end.format(END_TIME_FORMAT).to_string()
    })
}

/// Permanent hold at the given target.
pub fn manual_body(target: Temperature) -> Value {
    json!({
        "RegulationMode": 3,
        "ManualTemperature": target
    })
}

/// Vacation-style hold. Scheduling stays disabled; the epoch placeholders
/// satisfy the vendor's field validation.
pub fn vacation_body(target: Temperature) -> Value {
    json!({
        "RegulationMode": 4,
        "VacationEnabled": false,
        "VacationTemperature": target,
        "VacationBeginDay": VACATION_EPOCH,
        "VacationEndDay": VACATION_EPOCH
    })
}
