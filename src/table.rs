//! Trade tables in long and wide form.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// The four trade measures carried by every observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Variable {
    #[serde(rename = "Exports")]
    Exports,
    #[serde(rename = "Imports")]
    Imports,
    #[serde(rename = "Trade Balance")]
    TradeBalance,
    #[serde(rename = "Twoway Trade")]
    TwowayTrade,
}

impl Variable {
    /// Column order used by both table forms.
    pub const ALL: [Variable; 4] = [
        Variable::Exports,
        Variable::Imports,
        Variable::TradeBalance,
        Variable::TwowayTrade,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Variable::Exports => "Exports",
            Variable::Imports => "Imports",
            Variable::TradeBalance => "Trade Balance",
            Variable::TwowayTrade => "Twoway Trade",
        }
    }

    /// Read this measure from a long-form row.
    pub fn of(self, row: &TradeRow) -> f64 {
        match self {
            Variable::Exports => row.exports,
            Variable::Imports => row.imports,
            Variable::TradeBalance => row.trade_balance,
            Variable::TwowayTrade => row.twoway_trade,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Variable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Variable::ALL
            .into_iter()
            .find(|v| v.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::invalid(format!(
                    "unknown variable {:?}; only 'Exports', 'Imports', 'Trade Balance' and 'Twoway Trade' are allowed",
                    s
                ))
            })
    }
}

/// One parsed period of trade between a country and one counterpart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeObservation {
    pub period: NaiveDate,
    pub exports: f64,
    pub imports: f64,
    pub trade_balance: f64,
    /// Always `exports + imports`.
    pub twoway_trade: f64,
}

impl TradeObservation {
    pub fn new(period: NaiveDate, exports: f64, imports: f64, trade_balance: f64) -> Self {
        Self {
            period,
            exports,
            imports,
            trade_balance,
            twoway_trade: exports + imports,
        }
    }
}

/// Long-form row (one period of one counterpart).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    #[serde(rename = "Period")]
    pub period: String,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Counterpart")]
    pub counterpart: String,
    #[serde(rename = "Exports")]
    pub exports: f64,
    #[serde(rename = "Imports")]
    pub imports: f64,
    #[serde(rename = "Trade Balance")]
    pub trade_balance: f64,
    #[serde(rename = "Twoway Trade")]
    pub twoway_trade: f64,
}

impl TradeRow {
    pub const COLUMNS: [&'static str; 7] = [
        "Period",
        "Country",
        "Counterpart",
        "Exports",
        "Imports",
        "Trade Balance",
        "Twoway Trade",
    ];
}

/// Data column of a wide table: one measure for one counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WideColumn {
    pub variable: Variable,
    pub counterpart: String,
}

impl WideColumn {
    /// Flat header label, e.g. `Exports (CN)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.variable.label(), self.counterpart)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRow {
    pub period: String,
    /// Parallel to [`WideTable::columns`]; `None` where a counterpart has
    /// no observation for this period.
    pub values: Vec<Option<f64>>,
}

/// Wide form: one row per period, data columns keyed by
/// (variable, counterpart), the home country as the leading column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideTable {
    pub country: String,
    pub columns: Vec<WideColumn>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    /// Pivot long rows. Periods are sorted; columns run over
    /// [`Variable::ALL`] then over the sorted counterparts.
    ///
    /// Two rows for the same (period, counterpart) cannot share a cell and
    /// fail with [`Error::Remote`].
    pub fn pivot(country: &str, rows: &[TradeRow]) -> Result<Self> {
        let periods: BTreeSet<&str> = rows.iter().map(|r| r.period.as_str()).collect();
        let counterparts: BTreeSet<&str> = rows.iter().map(|r| r.counterpart.as_str()).collect();

        let columns: Vec<WideColumn> = Variable::ALL
            .into_iter()
            .flat_map(|variable| {
                counterparts.iter().map(move |cp| WideColumn {
                    variable,
                    counterpart: cp.to_string(),
                })
            })
            .collect();

        let mut by_key: HashMap<(&str, &str), &TradeRow> = HashMap::with_capacity(rows.len());
        for r in rows {
            let key = (r.period.as_str(), r.counterpart.as_str());
            if by_key.insert(key, r).is_some() {
                return Err(Error::remote(format!(
                    "duplicate period {} for counterpart {}",
                    r.period, r.counterpart
                )));
            }
        }

        let wide_rows = periods
            .into_iter()
            .map(|period| WideRow {
                period: period.to_string(),
                values: columns
                    .iter()
                    .map(|c| {
                        by_key
                            .get(&(period, c.counterpart.as_str()))
                            .map(|r| c.variable.of(r))
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            country: country.to_string(),
            columns,
            rows: wide_rows,
        })
    }

    /// `Period`, `Country`, then one label per data column.
    pub fn header(&self) -> Vec<String> {
        let mut out = vec!["Period".to_string(), "Country".to_string()];
        out.extend(self.columns.iter().map(WideColumn::label));
        out
    }

    pub fn get(&self, period: &str, variable: Variable, counterpart: &str) -> Option<f64> {
        let col = self
            .columns
            .iter()
            .position(|c| c.variable == variable && c.counterpart == counterpart)?;
        let row = self.rows.iter().find(|r| r.period == period)?;
        row.values.get(col).copied().flatten()
    }

    /// Counterparts in column order, without repeats.
    pub fn counterparts(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for c in &self.columns {
            if !out.contains(&c.counterpart) {
                out.push(c.counterpart.clone());
            }
        }
        out
    }
}

/// Result of a DOTS retrieval.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TradeTable {
    /// One row per period per counterpart. Single-counterpart queries always
    /// come back in this form, whichever form was requested.
    Long(Vec<TradeRow>),
    /// One row per period; see [`WideTable`].
    Wide(WideTable),
}

impl TradeTable {
    pub fn len(&self) -> usize {
        match self {
            TradeTable::Long(rows) => rows.len(),
            TradeTable::Wide(w) => w.rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_long(&self) -> Option<&[TradeRow]> {
        match self {
            TradeTable::Long(rows) => Some(rows),
            TradeTable::Wide(_) => None,
        }
    }

    pub fn as_wide(&self) -> Option<&WideTable> {
        match self {
            TradeTable::Long(_) => None,
            TradeTable::Wide(w) => Some(w),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        match self {
            TradeTable::Long(_) => TradeRow::COLUMNS.iter().map(|c| c.to_string()).collect(),
            TradeTable::Wide(w) => w.header(),
        }
    }

    /// Distinct counterparts, in order of first appearance.
    pub fn counterparts(&self) -> Vec<String> {
        match self {
            TradeTable::Long(rows) => {
                let mut out: Vec<String> = Vec::new();
                for r in rows {
                    if !out.contains(&r.counterpart) {
                        out.push(r.counterpart.clone());
                    }
                }
                out
            }
            TradeTable::Wide(w) => w.counterparts(),
        }
    }
}
