//! Data types produced by the aggregation pass.
//!
//! Serialized field names match the document the dashboard reads
//! (`total_atingida`, `total_maxima`, and the Portuguese detail keys).

use crate::record::Record;
use crate::scoring::rank::Rank;
use serde::{Deserialize, Serialize};

/// One contributing record as kept under its indicator. Scores are the
/// values originally supplied, never rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detail {
    #[serde(rename = "Grupo")]
    pub group: Option<String>,
    #[serde(rename = "Sub-Grupo")]
    pub sub_group: Option<String>,
    #[serde(rename = "Departamento")]
    pub department: Option<String>,
    #[serde(rename = "Sub-Categoria")]
    pub sub_category: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Pontuação Atingida")]
    pub achieved: f64,
    #[serde(rename = "Pontuação Máxima")]
    pub maximum: f64,
}

impl Detail {
    /// Rebuilds the record this detail came from.
    pub fn to_record(&self, indicator: Option<&str>) -> Record {
        Record {
            group: self.group.clone(),
            indicator: indicator.map(str::to_string),
            sub_group: self.sub_group.clone(),
            department: self.department.clone(),
            sub_category: self.sub_category.clone(),
            status: self.status.clone(),
            achieved: self.achieved,
            maximum: self.maximum,
        }
    }
}

/// Totals for one indicator within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorAggregate {
    pub name: Option<String>,
    #[serde(rename = "total_atingida")]
    pub total_achieved: f64,
    #[serde(rename = "total_maxima")]
    pub total_maximum: f64,
    pub percentage: f64,
    pub details: Vec<Detail>,
}

/// Totals for one group; indicators are in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAggregate {
    pub name: Option<String>,
    #[serde(rename = "total_atingida")]
    pub total_achieved: f64,
    #[serde(rename = "total_maxima")]
    pub total_maximum: f64,
    pub percentage: f64,
    pub indicators: Vec<IndicatorAggregate>,
}

impl GroupAggregate {
    pub fn indicator(&self, name: Option<&str>) -> Option<&IndicatorAggregate> {
        self.indicators.iter().find(|i| i.name.as_deref() == name)
    }

    /// All details across the group's indicators.
    pub fn details(&self) -> impl Iterator<Item = &Detail> {
        self.indicators.iter().flat_map(|i| i.details.iter())
    }

    /// A group is active when at least one of its details has status `Ativo`.
    pub fn is_active(&self) -> bool {
        self.details().any(|d| {
            d.status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("ativo"))
        })
    }
}

/// Root of the processed scorecard document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "overall_score")]
    pub overall_achieved: f64,
    #[serde(rename = "overall_max_score")]
    pub overall_maximum: f64,
    pub overall_percentage: f64,
    pub overall_rank: Rank,
    pub groups: Vec<GroupAggregate>,
}

impl Summary {
    pub fn group(&self, name: Option<&str>) -> Option<&GroupAggregate> {
        self.groups.iter().find(|g| g.name.as_deref() == name)
    }

    /// Flattens every detail back into the record shape, in group, indicator,
    /// detail order.
    pub fn records(&self) -> Vec<Record> {
        self.groups
            .iter()
            .flat_map(|g| g.indicators.iter())
            .flat_map(|i| i.details.iter().map(|d| d.to_record(i.name.as_deref())))
            .collect()
    }

    /// Sorted, de-duplicated department names found in any detail.
    pub fn departments(&self) -> Vec<String> {
        let mut departments: Vec<String> = self
            .groups
            .iter()
            .flat_map(|g| g.details())
            .filter_map(|d| d.department.clone())
            .filter(|d| !d.is_empty())
            .collect();
        departments.sort();
        departments.dedup();
        departments
    }
}
