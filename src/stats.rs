use crate::table::{TradeTable, Variable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Grouping key used in stats: one measure for one counterpart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey {
    pub counterpart: String,
    pub variable: Variable,
}

/// Summary statistics for a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub key: GroupKey,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute grouped statistics by (counterpart, variable), for either table
/// form. Empty wide cells are skipped.
pub fn grouped_summary(table: &TradeTable) -> Vec<Summary> {
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    match table {
        TradeTable::Long(rows) => {
            for r in rows {
                for variable in Variable::ALL {
                    let key = GroupKey {
                        counterpart: r.counterpart.clone(),
                        variable,
                    };
                    groups.entry(key).or_default().push(variable.of(r));
                }
            }
        }
        TradeTable::Wide(w) => {
            for row in &w.rows {
                for (col, value) in w.columns.iter().zip(&row.values) {
                    let key = GroupKey {
                        counterpart: col.counterpart.clone(),
                        variable: col.variable,
                    };
                    let vals = groups.entry(key).or_default();
                    if let Some(v) = value {
                        vals.push(*v);
                    }
                }
            }
        }
    }

    let mut out = Vec::new();
    for (key, mut vals) in groups {
        vals.sort_by(|a, b| a.total_cmp(b));
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        out.push(Summary {
            key,
            count,
            min,
            max,
            mean,
            median,
        });
    }
    out
}
