// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Score explanations: a tree of values and the reasons behind them.

use std::fmt;

use serde::Serialize;

/// How one document got its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub matched: bool,
    pub value: f32,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<Explanation>,
}

impl Explanation {
    pub fn matched(value: f32, description: impl Into<String>, details: Vec<Explanation>) -> Self {
        Self {
            matched: true,
            value,
            description: description.into(),
            details,
        }
    }

    pub fn no_match(description: impl Into<String>, details: Vec<Explanation>) -> Self {
        Self {
            matched: false,
            value: 0.0,
            description: description.into(),
            details,
        }
    }

    pub fn is_match(&self) -> bool {
        self.matched
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} = {}", "", self.value, self.description, indent = depth * 2)?;
        for detail in &self.details {
            detail.write_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Explanation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
