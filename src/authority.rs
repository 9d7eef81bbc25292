//! Control authority: who decides the pump and light state.
//!
//! In [`ControlMode::Auto`] the device's own controller drives the outputs and
//! the manual fields are inert (they keep whatever the operator last typed, but
//! their durations are never submitted). In [`ControlMode::Manual`] the
//! operator's fields are authoritative.

use core::fmt;
use core::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Auto,
    Manual,
}

impl ControlMode {
    pub const fn is_manual(self) -> bool {
        matches!(self, ControlMode::Manual)
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMode::Auto => write!(f, "AUTO"),
            ControlMode::Manual => write!(f, "MANUAL"),
        }
    }
}

impl FromStr for ControlMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ControlMode::Auto),
            "manual" => Ok(ControlMode::Manual),
            _ => Err(()),
        }
    }
}

/// Operator-entered fields. Only effective while the mode is manual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualOverrides {
    pub pump_requested: bool,
    pub light_requested: bool,
    pub pump_duration_minutes: u32,
    pub light_duration_minutes: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlAuthority {
    mode: ControlMode,
    overrides: ManualOverrides,
}

impl ControlAuthority {
    pub fn new(mode: ControlMode) -> Self {
        Self {
            mode,
            overrides: ManualOverrides::default(),
        }
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Switch mode. Always legal; setting the current mode again changes nothing.
    /// Returns the mode now in force so the caller can notify the renderer.
    pub fn set_mode(&mut self, mode: ControlMode) -> ControlMode {
        self.mode = mode;
        self.mode
    }

    pub fn overrides(&self) -> &ManualOverrides {
        &self.overrides
    }

    /// Fields stay editable in auto mode; they just are not effective there.
    pub fn overrides_mut(&mut self) -> &mut ManualOverrides {
        &mut self.overrides
    }

    /// `(pump, light)` durations that a submission carries right now.
    pub fn effective_durations(&self) -> (u32, u32) {
        if self.mode.is_manual() {
            (
                self.overrides.pump_duration_minutes,
                self.overrides.light_duration_minutes,
            )
        } else {
            (0, 0)
        }
    }
}

/// Read a duration field the way a browser number input is read with
/// `parseInt(..) || 0`: leading digits count, the rest is ignored, anything
/// without leading digits is 0. Negative input clamps to 0.
pub fn parse_duration_field(text: &str) -> u32 {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(u32::MAX)
}
