//! Leaf-name exclusion rules

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::collections::HashSet;

/// Names and patterns of leaf resources that are never reported as unmanaged.
///
/// A leaf is excluded when it matches any pattern or equals any exact name.
/// Patterns are unanchored: `v_am` excludes `stg_v_am_daily`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRule {
    patterns: Vec<String>,
    names: Vec<String>,
}

impl ExclusionRule {
    /// Create an empty rule that excludes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regex pattern. Empty patterns are ignored.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.add_pattern(pattern);
        self
    }

    /// Add exact names. Empty names are ignored.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.add_name(name);
        }
        self
    }

    /// Add a regex pattern. Empty patterns are ignored.
    pub fn add_pattern(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !pattern.is_empty() {
            self.patterns.push(pattern);
        }
    }

    /// Add an exact name. Empty and duplicate names are ignored.
    pub fn add_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() && !self.names.contains(&name) {
            self.names.push(name);
        }
    }

    /// Parse a comma-separated name list, trimming whitespace around each entry.
    pub fn parse_name_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect()
    }

    /// Regex patterns in the order they were added
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Exact names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// True when the rule cannot exclude anything
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.names.is_empty()
    }

    /// Compile every pattern once.
    ///
    /// Fails on the first invalid pattern rather than silently matching nothing.
    pub fn compile(&self) -> CoreResult<ExclusionMatcher> {
        let patterns = self
            .patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| CoreError::InvalidExclusionPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(ExclusionMatcher {
            patterns,
            names: self.names.iter().cloned().collect(),
        })
    }
}

/// Compiled [`ExclusionRule`]
#[derive(Debug, Clone, Default)]
pub struct ExclusionMatcher {
    patterns: Vec<Regex>,
    names: HashSet<String>,
}

impl ExclusionMatcher {
    /// Whether a leaf name is excluded
    pub fn is_excluded(&self, name: &str) -> bool {
        self.names.contains(name) || self.patterns.iter().any(|re| re.is_match(name))
    }
}

#[cfg(test)]
#[path = "exclusion_test.rs"]
mod tests;
