use crate::record::Record;
use crate::scoring::rank::rank;
use crate::scoring::types::{Detail, GroupAggregate, IndicatorAggregate, Summary};
use crate::scoring::utility::{percentage, round2};
use std::collections::HashMap;
use tracing::debug;

#[derive(Default)]
struct IndicatorTotals {
    name: Option<String>,
    achieved: f64,
    maximum: f64,
    details: Vec<Detail>,
}

#[derive(Default)]
struct GroupTotals {
    name: Option<String>,
    achieved: f64,
    maximum: f64,
    indicators: Vec<IndicatorTotals>,
    index: HashMap<Option<String>, usize>,
}

impl GroupTotals {
    fn indicator_mut(&mut self, name: &Option<String>) -> &mut IndicatorTotals {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.indicators.push(IndicatorTotals {
                    name: name.clone(),
                    ..Default::default()
                });
                self.index.insert(name.clone(), self.indicators.len() - 1);
                self.indicators.len() - 1
            }
        };
        &mut self.indicators[idx]
    }

    fn finish(self) -> GroupAggregate {
        GroupAggregate {
            name: self.name,
            total_achieved: round2(self.achieved),
            total_maximum: round2(self.maximum),
            percentage: percentage(self.achieved, self.maximum),
            indicators: self
                .indicators
                .into_iter()
                .map(|i| IndicatorAggregate {
                    name: i.name,
                    total_achieved: round2(i.achieved),
                    total_maximum: round2(i.maximum),
                    percentage: percentage(i.achieved, i.maximum),
                    details: i.details,
                })
                .collect(),
        }
    }
}

/// Folds scored records into a [`Summary`].
///
/// Groups and indicators keep the order in which they are first seen. A
/// missing group or indicator name is its own key. Sums and percentages are
/// rounded to 2 decimal places; the overall rank is computed from the
/// unrounded achieved total.
pub fn aggregate<I>(records: I) -> Summary
where
    I: IntoIterator<Item = Record>,
{
    let mut overall_achieved = 0.0;
    let mut overall_maximum = 0.0;
    let mut record_count = 0usize;

    let mut groups: Vec<GroupTotals> = Vec::new();
    let mut index: HashMap<Option<String>, usize> = HashMap::new();

    for record in records {
        record_count += 1;
        let Record {
            group,
            indicator,
            sub_group,
            department,
            sub_category,
            status,
            achieved,
            maximum,
        } = record;

        overall_achieved += achieved;
        overall_maximum += maximum;

        let idx = match index.get(&group) {
            Some(&idx) => idx,
            None => {
                debug!(group = ?group, "New group");
                groups.push(GroupTotals {
                    name: group.clone(),
                    ..Default::default()
                });
                index.insert(group.clone(), groups.len() - 1);
                groups.len() - 1
            }
        };

        let totals = &mut groups[idx];
        totals.achieved += achieved;
        totals.maximum += maximum;

        let ind = totals.indicator_mut(&indicator);
        ind.achieved += achieved;
        ind.maximum += maximum;
        ind.details.push(Detail {
            group,
            sub_group,
            department,
            sub_category,
            status,
            achieved,
            maximum,
        });
    }

    let overall_rank = rank(overall_achieved);

    debug!(
        records = record_count,
        groups = groups.len(),
        overall_achieved,
        overall_maximum,
        rank = %overall_rank,
        "Aggregation finished"
    );

    Summary {
        overall_achieved: round2(overall_achieved),
        overall_maximum: round2(overall_maximum),
        overall_percentage: percentage(overall_achieved, overall_maximum),
        overall_rank,
        groups: groups.into_iter().map(GroupTotals::finish).collect(),
    }
}
