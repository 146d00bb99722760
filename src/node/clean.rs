//! Pruning of non mandatory tables.

use regex::Regex;
use tracing::{debug, info};

use super::PolarNode;
use crate::error::{PoemError, Result};

/// Compiled glob-style keep patterns (`*` any run, `?` any single character).
#[derive(Debug, Clone, Default)]
pub struct KeepPatterns {
    patterns: Vec<Regex>,
}

impl KeepPatterns {
    /// Compile a list of glob patterns.
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self> {
        let patterns = globs
            .iter()
            .map(|g| glob_to_regex(g.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// True if any pattern matches the whole name.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(name))
    }
}

fn glob_to_regex(glob: &str) -> Result<Regex> {
    let mut pattern = String::with_capacity(glob.len() + 2);
    pattern.push('^');
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern)
        .map_err(|e| PoemError::InvalidPattern(format!("{}: {}", glob, e)))
}

impl PolarNode {
    /// Remove, in every polar of the subtree, tables that are neither mandatory
    /// for the polar mode nor matched by `keep`. Returns the number of removed tables.
    ///
    /// Mandatory tables are those of the specification version the polar follows.
    pub fn clean(&mut self, keep: &KeepPatterns) -> usize {
        match self {
            PolarNode::Polar(polar) => {
                let mandatory = polar.mandatory_tables();
                let doomed: Vec<String> = polar
                    .table_names()
                    .into_iter()
                    .filter(|name| !mandatory.iter().any(|m| m == name) && !keep.matches(name))
                    .map(str::to_string)
                    .collect();
                for name in &doomed {
                    debug!("Removing table {} from polar {}", name, polar.name());
                    // Names come from the polar itself
                    let _ = polar.remove_table(name);
                }
                if !doomed.is_empty() {
                    info!("Removed {} tables from polar {}", doomed.len(), polar.name());
                }
                doomed.len()
            }
            PolarNode::Table(_) => 0,
            _ => self
                .children_mut()
                .iter_mut()
                .map(|child| child.clean(keep))
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_matching() {
        let keep = KeepPatterns::new(&["BRAKE_*", "Vs?", "a.b"]).unwrap();
        assert!(keep.matches("BRAKE_POWER"));
        assert!(keep.matches("Vs1"));
        assert!(!keep.matches("Vs12"));
        assert!(keep.matches("a.b"));
        assert!(!keep.matches("axb"));
        assert!(!keep.matches("XBRAKE_POWER"));
    }

    #[test]
    fn test_empty_keep_matches_nothing() {
        assert!(!KeepPatterns::default().matches("LEEWAY"));
    }
}
