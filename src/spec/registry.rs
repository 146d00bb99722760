//! Versioned rule sets.
//!
//! The registry is append-only: a new version gets a new entry and older
//! entries keep evaluating files that declare them.

use std::fmt;

use tracing::warn;

use super::rules;
use super::structure::{GroupStructure, Structure};
use crate::node::PolarMode;

/// Version written into new containers and used to check in-memory trees.
pub const CURRENT_VERSION: u32 = 1;

/// A polar group found in a container, with its mode when it could be resolved.
#[derive(Debug, Clone, Copy)]
pub struct PolarEntry<'a> {
    /// The group holding the polar.
    pub group: &'a GroupStructure,
    /// Its mode.
    pub mode: Option<PolarMode>,
}

/// One structural rule.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Identifier, `R1`, `R2`, ...
    pub id: &'static str,
    /// One-line description.
    pub description: &'static str,
    pub(super) check: fn(&Specification, &Structure) -> Vec<String>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

/// A numbered rule set together with the mode tables it checks against.
pub struct Specification {
    /// Version number.
    pub version: u32,
    /// Rules, evaluated in order.
    pub rules: &'static [Rule],
    pub(super) canonical_dimensions: fn(PolarMode) -> &'static [&'static str],
    pub(super) mandatory_tables: fn(PolarMode) -> &'static [&'static str],
    pub(super) locate_polars: for<'a> fn(&'a Structure) -> Vec<PolarEntry<'a>>,
}

impl fmt::Debug for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("version", &self.version)
            .field("rules", &self.rules)
            .finish()
    }
}

impl Specification {
    /// Dimension names of a polar of this mode, in canonical order.
    pub fn canonical_dimensions(&self, mode: PolarMode) -> &'static [&'static str] {
        (self.canonical_dimensions)(mode)
    }

    /// Tables a polar of this mode must hold.
    pub fn mandatory_tables(&self, mode: PolarMode) -> &'static [&'static str] {
        (self.mandatory_tables)(mode)
    }

    /// Polar groups of a container, as this version lays them out.
    pub fn polars<'a>(&self, structure: &'a Structure) -> Vec<PolarEntry<'a>> {
        (self.locate_polars)(structure)
    }

    /// Rule by identifier.
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }
}

const V1_VELOCITY_DIMS: &[&str] = &["STW_Coord", "TWS_Coord", "TWA_Coord", "WA_Coord", "Hs_Coord"];
const V1_POWER_DIMS: &[&str] = &["Power_Coord", "TWS_Coord", "TWA_Coord", "WA_Coord", "Hs_Coord"];
const V1_VPP_DIMS: &[&str] = &["TWS_Coord", "TWA_Coord", "WA_Coord", "Hs_Coord"];
const V1_PPP_TABLES: &[&str] = &["TOTAL_POWER", "LEEWAY", "SOLVER_STATUS"];
const V1_VPP_TABLES: &[&str] = &["STW", "LEEWAY", "SOLVER_STATUS"];

const V0_DIMS: &[&str] = &["STW_kt", "TWS_kt", "TWA_deg", "WA_deg", "Hs_m"];
const V0_TABLES: &[&str] = &["BrakePower", "LEEWAY"];

fn v1_dimensions(mode: PolarMode) -> &'static [&'static str] {
    match mode {
        PolarMode::MPPP | PolarMode::HPPP => V1_VELOCITY_DIMS,
        PolarMode::MVPP | PolarMode::HVPP => V1_POWER_DIMS,
        PolarMode::VPP => V1_VPP_DIMS,
    }
}

fn v1_tables(mode: PolarMode) -> &'static [&'static str] {
    match mode {
        PolarMode::MPPP | PolarMode::HPPP => V1_PPP_TABLES,
        PolarMode::MVPP | PolarMode::HVPP | PolarMode::VPP => V1_VPP_TABLES,
    }
}

fn v0_dimensions(_: PolarMode) -> &'static [&'static str] {
    V0_DIMS
}

fn v0_tables(_: PolarMode) -> &'static [&'static str] {
    V0_TABLES
}

/// Mode of a legacy single-polar file from its `vessel_type` attribute.
pub(crate) fn legacy_mode(vessel_type: Option<&str>) -> PolarMode {
    match vessel_type.map(str::trim) {
        Some("HYBRID") => PolarMode::HPPP,
        Some("MOTOR") => PolarMode::MPPP,
        Some(other) => {
            warn!("Unknown vessel_type {}, reading polar as MPPP", other);
            PolarMode::MPPP
        }
        None => {
            warn!("No vessel_type attribute, reading polar as MPPP");
            PolarMode::MPPP
        }
    }
}

static V0_RULES: [Rule; 5] = [
    Rule {
        id: "R1",
        description: "canonical coordinate variables are present",
        check: rules::canonical_coordinates,
    },
    Rule {
        id: "R2",
        description: "mandatory variables are present",
        check: rules::mandatory_tables,
    },
    Rule {
        id: "R3",
        description: "coordinates are non-negative and strictly increasing",
        check: rules::coordinates_increasing,
    },
    Rule {
        id: "R4",
        description: "angular coordinates lie within [0, 180]",
        check: rules::angles_bounded,
    },
    Rule {
        id: "R5",
        description: "coordinates and tables carry unit and description",
        check: rules::units_described,
    },
];

static V1_RULES: [Rule; 7] = [
    Rule {
        id: "R1",
        description: "root declares file type, format version and vessel name",
        check: rules::root_declaration,
    },
    Rule {
        id: "R2",
        description: "each polar uses the canonical dimension set of its mode",
        check: rules::dimension_names,
    },
    Rule {
        id: "R3",
        description: "coordinates are non-negative and strictly increasing",
        check: rules::coordinates_increasing,
    },
    Rule {
        id: "R4",
        description: "angular coordinates lie within [0, 180]",
        check: rules::angles_bounded,
    },
    Rule {
        id: "R5",
        description: "mandatory tables of each mode are present",
        check: rules::mandatory_tables,
    },
    Rule {
        id: "R6",
        description: "dimensions are declared in canonical order",
        check: rules::dimension_order,
    },
    Rule {
        id: "R7",
        description: "coordinates and tables carry unit and description",
        check: rules::units_described,
    },
];

static SPECIFICATIONS: [Specification; 2] = [
    Specification {
        version: 0,
        rules: &V0_RULES,
        canonical_dimensions: v0_dimensions,
        mandatory_tables: v0_tables,
        locate_polars: rules::root_polar,
    },
    Specification {
        version: 1,
        rules: &V1_RULES,
        canonical_dimensions: v1_dimensions,
        mandatory_tables: v1_tables,
        locate_polars: rules::polars_by_tag,
    },
];

/// Rule set of a version, if registered.
pub fn specification(version: u32) -> Option<&'static Specification> {
    SPECIFICATIONS.iter().find(|s| s.version == version)
}

/// Rule set of [`CURRENT_VERSION`].
pub fn current() -> &'static Specification {
    // CURRENT_VERSION is always the last registered entry
    &SPECIFICATIONS[SPECIFICATIONS.len() - 1]
}

/// Versions with a registered rule set, oldest first.
pub fn versions() -> impl Iterator<Item = u32> {
    SPECIFICATIONS.iter().map(|s| s.version)
}

/// Tables a polar of `mode` must hold under the current version.
pub fn mandatory_polar_tables(mode: PolarMode) -> &'static [&'static str] {
    current().mandatory_tables(mode)
}
