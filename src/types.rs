use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Temperature stored as integer hundredths of a degree Celsius.
/// This is the exact encoding the vendor uses on the wire (2150 = 21.5°C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Temperature(i32);

impl Temperature {
    pub const fn from_centidegrees(hundredths: i32) -> Self {
        Self(hundredths)
    }

    /// Construct from fractional degrees Celsius, rounded to the nearest
    /// hundredth (the finest resolution the vendor accepts).
    pub fn from_celsius(c: f64) -> Self {
        Self((c * 100.0).round() as i32)
    }

    pub const fn centidegrees(&self) -> i32 {
        self.0
    }

    pub fn celsius(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Display-only conversion; the wire always speaks hundredths of °C.
    pub fn fahrenheit(&self) -> f64 {
        self.celsius() * (9.0 / 5.0) + 32.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.celsius())
    }
}

impl Serialize for Temperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Temperature)
    }
}

/// The thermostat's control strategy, deciding which stored setpoint is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulationMode {
    Auto,
    Comfort,
    Manual,
    Vacation,
}

impl RegulationMode {
    pub fn as_code(&self) -> u8 {
        match self {
            RegulationMode::Auto => 1,
            RegulationMode::Comfort => 2,
            RegulationMode::Manual => 3,
            RegulationMode::Vacation => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RegulationMode::Auto),
            2 => Some(RegulationMode::Comfort),
            3 => Some(RegulationMode::Manual),
            4 => Some(RegulationMode::Vacation),
            _ => None,
        }
    }
}

impl Serialize for RegulationMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_code())
    }
}

impl<'de> Deserialize<'de> for RegulationMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        RegulationMode::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown regulation mode code {code}")))
    }
}

/// Host-facing operating mode. The vendor has no real "off"; a thermostat
/// reads as Off only while unreachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacMode {
    Off,
    Heat,
    Auto,
}

/// What the device is doing right now, derived from the online/heating flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacAction {
    Offline,
    Idle,
    Heating,
}

/// One thermostat record as it appears in the account snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Thermostat {
    pub serial_number: String,
    pub room: String,
    pub online: bool,
    pub heating: bool,
    pub regulation_mode: RegulationMode,
    pub temperature: Temperature,
    pub set_point_temp: Temperature,
    pub comfort_temperature: Temperature,
    pub manual_temperature: Temperature,
    pub vacation_temperature: Temperature,
}

impl Thermostat {
    /// The setpoint selected by the active regulation mode.
    pub fn effective_setpoint(&self) -> Temperature {
        match self.regulation_mode {
            RegulationMode::Auto => self.set_point_temp,
            RegulationMode::Comfort => self.comfort_temperature,
            RegulationMode::Manual => self.manual_temperature,
            RegulationMode::Vacation => self.vacation_temperature,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    pub group_name: String,
    #[serde(default)]
    pub thermostats: Vec<Thermostat>,
}

/// Point-in-time capture of every group and device on the account.
/// Wholly replaced by the next successful fetch, never patched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl Snapshot {
    pub fn thermostats(&self) -> impl Iterator<Item = &Thermostat> {
        self.groups.iter().flat_map(|g| g.thermostats.iter())
    }

    pub fn has_thermostats(&self) -> bool {
        self.thermostats().next().is_some()
    }
}
