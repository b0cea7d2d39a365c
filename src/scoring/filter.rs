//! Group selection over a processed scorecard.

use crate::scoring::types::{GroupAggregate, Summary};
use std::fmt;
use std::str::FromStr;

/// Performance band of a percentage.
///
/// | Band    | Percentage      |
/// |---------|-----------------|
/// | zero    | == 0            |
/// | low     | (0, 30]         |
/// | medium  | (30, 70]        |
/// | high    | (70, 100)       |
/// | perfect | == 100          |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Zero,
    Low,
    Medium,
    High,
    Perfect,
}

impl Performance {
    /// Returns `None` for negative percentages and anything above 100.
    pub fn classify(percentage: f64) -> Option<Self> {
        match percentage {
            p if p == 0.0 => Some(Performance::Zero),
            p if p > 0.0 && p <= 30.0 => Some(Performance::Low),
            p if p > 30.0 && p <= 70.0 => Some(Performance::Medium),
            p if p > 70.0 && p < 100.0 => Some(Performance::High),
            p if p == 100.0 => Some(Performance::Perfect),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Performance::Zero => "zero",
            Performance::Low => "low",
            Performance::Medium => "medium",
            Performance::High => "high",
            Performance::Perfect => "perfect",
        }
    }
}

impl fmt::Display for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Performance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(Performance::Zero),
            "low" => Ok(Performance::Low),
            "medium" => Ok(Performance::Medium),
            "high" => Ok(Performance::High),
            "perfect" => Ok(Performance::Perfect),
            other => Err(anyhow::anyhow!(
                "unknown performance band '{}' (expected zero, low, medium, high or perfect)",
                other
            )),
        }
    }
}

/// Criteria for selecting groups. Unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct GroupFilter {
    /// Some detail has this status (case-insensitive).
    pub status: Option<String>,
    /// Some detail belongs to exactly this department.
    pub department: Option<String>,
    /// The group's percentage falls in this band.
    pub performance: Option<Performance>,
}

impl GroupFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.department.is_none() && self.performance.is_none()
    }

    pub fn matches(&self, group: &GroupAggregate) -> bool {
        if let Some(status) = &self.status {
            let status = status.to_lowercase();
            let found = group.details().any(|d| {
                d.status
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase() == status)
            });
            if !found {
                return false;
            }
        }

        if let Some(department) = &self.department {
            let found = group
                .details()
                .any(|d| d.department.as_deref() == Some(department.as_str()));
            if !found {
                return false;
            }
        }

        if let Some(band) = self.performance {
            if Performance::classify(group.percentage) != Some(band) {
                return false;
            }
        }

        true
    }

    /// Matching groups, in document order.
    pub fn apply<'a>(&self, summary: &'a Summary) -> Vec<&'a GroupAggregate> {
        summary.groups.iter().filter(|g| self.matches(g)).collect()
    }
}
