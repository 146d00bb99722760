//! Outcome of a compliance check.

use serde::Serialize;

use crate::error::{PoemError, Result};

/// One broken rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Rule identifier (`R1`, `R2`, ...).
    pub rule: &'static str,
    /// What was found.
    pub message: String,
}

/// Every violation found for one specification version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecReport {
    /// Version the structure was checked against.
    pub version: u32,
    /// Violations in rule order.
    pub violations: Vec<Violation>,
}

impl SpecReport {
    /// True when no rule is broken.
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    /// Identifiers of broken rules, each listed once.
    pub fn violated_rules(&self) -> Vec<&'static str> {
        let mut rules: Vec<&'static str> = Vec::new();
        for v in &self.violations {
            if !rules.contains(&v.rule) {
                rules.push(v.rule);
            }
        }
        rules
    }

    /// `Ok` when compliant, `SpecViolation` otherwise.
    pub fn into_result(self) -> Result<()> {
        if self.is_compliant() {
            Ok(())
        } else {
            Err(PoemError::SpecViolation {
                version: self.version,
                violations: self.violations,
            })
        }
    }
}
