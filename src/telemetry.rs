// Device status snapshot and the per-poll Sample derived from it.
//
// The device serves `GET /api/status` as a flat JSON object. The firmware
// emits its boolean outputs as 0/1 integers, so flags accept either form.
// Every numeric channel that feeds the charts is required; a missing or
// non-numeric value fails the whole decode.

use core::fmt;

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::error::PollError;

// ── System mode ─────────────────────────────────────────────────────

/// Fault-handling mode reported by the device firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMode {
    Normal,
    Degraded,
    Safe,
    Unknown(i64),
}

impl From<i64> for SystemMode {
    fn from(v: i64) -> Self {
        match v {
            0 => SystemMode::Normal,
            1 => SystemMode::Degraded,
            2 => SystemMode::Safe,
            other => SystemMode::Unknown(other),
        }
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemMode::Normal => write!(f, "NORMAL"),
            SystemMode::Degraded => write!(f, "DEGRADED"),
            SystemMode::Safe => write!(f, "SAFE"),
            SystemMode::Unknown(v) => write!(f, "{}", v),
        }
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_on(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(v) => v != 0,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusWire {
    air_temp: f32,
    air_hum: f32,
    forecast3_temp: f32,
    forecast3_hum: f32,
    pump_on: Flag,
    light: Option<Flag>,
    mode: i64,
    soil: [f32; 3],

    forecast_temp: Option<f32>,
    forecast_hum: Option<f32>,
    forecast_light: Option<f32>,
    rain_soon: Option<Flag>,
    // Despite the name the firmware divides by 1000 before publishing.
    next_irrigation_ms: Option<u64>,
}

// ── DeviceStatus ────────────────────────────────────────────────────

/// Most recent status reported by the device. Replaced wholesale every poll.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    pub air_temp: f32,
    pub air_hum: f32,
    pub forecast3_temp: f32,
    pub forecast3_hum: f32,
    pub pump_on: bool,
    pub light: bool,
    pub mode: SystemMode,
    pub soil: [f32; 3],

    pub forecast_temp: Option<f32>,
    pub forecast_hum: Option<f32>,
    pub forecast_light: Option<f32>,
    pub rain_soon: Option<bool>,
    /// Device-clock seconds at which the next scheduled irrigation starts.
    pub next_irrigation_secs: Option<u64>,
}

impl DeviceStatus {
    /// Decode a `/api/status` body.
    pub fn decode(body: &str) -> Result<Self, PollError> {
        let wire: StatusWire = serde_json::from_str(body)?;
        Ok(wire.into())
    }
}

impl From<StatusWire> for DeviceStatus {
    fn from(w: StatusWire) -> Self {
        Self {
            air_temp: w.air_temp,
            air_hum: w.air_hum,
            forecast3_temp: w.forecast3_temp,
            forecast3_hum: w.forecast3_hum,
            pump_on: w.pump_on.is_on(),
            light: w.light.map(Flag::is_on).unwrap_or(false),
            mode: SystemMode::from(w.mode),
            soil: w.soil,
            forecast_temp: w.forecast_temp,
            forecast_hum: w.forecast_hum,
            forecast_light: w.forecast_light,
            rain_soon: w.rain_soon.map(Flag::is_on),
            next_irrigation_secs: w.next_irrigation_ms,
        }
    }
}

// ── Sample ──────────────────────────────────────────────────────────

/// One timestamped reading of the five charted channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub air_temp: f32,
    pub air_humidity: f32,
    pub soil: [f32; 3],
}

impl Sample {
    pub fn from_status(status: &DeviceStatus, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            air_temp: status.air_temp,
            air_humidity: status.air_hum,
            soil: status.soil,
        }
    }
}
