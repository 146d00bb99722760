//! Polar operating modes.

use std::fmt;
use std::str::FromStr;

use crate::error::PoemError;

/// How the operating point of a polar is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlType {
    /// Speed through water is imposed.
    Velocity,
    /// Propulsive power is imposed.
    Power,
    /// Sails only, nothing imposed.
    None,
}

/// Operating mode of a Polar. Fixes its canonical dimensions and mandatory tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PolarMode {
    /// Motor Power Prediction Program.
    MPPP,
    /// Hybrid Power Prediction Program (motor and wind).
    HPPP,
    /// Motor Velocity Prediction Program.
    MVPP,
    /// Hybrid Velocity Prediction Program (motor and wind).
    HVPP,
    /// Velocity Prediction Program, wind propulsion only.
    VPP,
}

impl PolarMode {
    /// Every mode, in declaration order.
    pub const ALL: [PolarMode; 5] = [
        PolarMode::MPPP,
        PolarMode::HPPP,
        PolarMode::MVPP,
        PolarMode::HVPP,
        PolarMode::VPP,
    ];

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            PolarMode::MPPP => "MPPP",
            PolarMode::HPPP => "HPPP",
            PolarMode::MVPP => "MVPP",
            PolarMode::HVPP => "HVPP",
            PolarMode::VPP => "VPP",
        }
    }

    /// Control type implied by the mode.
    pub fn control_type(self) -> ControlType {
        match self {
            PolarMode::MPPP | PolarMode::HPPP => ControlType::Velocity,
            PolarMode::MVPP | PolarMode::HVPP => ControlType::Power,
            PolarMode::VPP => ControlType::None,
        }
    }

    /// True if the string parses as a mode, legacy names included.
    pub fn is_mode(s: &str) -> bool {
        s.parse::<PolarMode>().is_ok()
    }
}

impl fmt::Display for PolarMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolarMode {
    type Err = PoemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MPPP" | "PPP" => Ok(PolarMode::MPPP),
            "HPPP" => Ok(PolarMode::HPPP),
            "MVPP" | "VPP-PB" => Ok(PolarMode::MVPP),
            "HVPP" | "HVPP-PB" => Ok(PolarMode::HVPP),
            "VPP" => Ok(PolarMode::VPP),
            _ => Err(PoemError::UnknownMode(s.to_string())),
        }
    }
}
