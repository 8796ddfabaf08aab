//! Direction of Trade Statistics (DOTS) retrieval.
//!
//! [`DotsQuery`] carries the caller's parameters; [`DotsQuery::resolve`]
//! validates them in full (no I/O) and normalizes the date range.
//! [`Client::dots`] then issues one request per counterpart, sequentially,
//! and assembles a [`TradeTable`].

use crate::api::{Client, enc};
use crate::error::{Error, Result};
use crate::sdmx::{self, CompactEnvelope, Obs, Series};
use crate::table::{TradeObservation, TradeRow, TradeTable, WideTable};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Database id of the Direction of Trade Statistics.
pub const DOTS_DATABASE_ID: &str = "DOT";
pub const TRADE_BALANCE_SERIES: &str = "TBG_USD";
pub const EXPORTS_SERIES: &str = "TXG_FOB_USD";
pub const IMPORTS_SERIES: &str = "TMG_CIF_USD";

const MIN_YEAR: f64 = 1800.0;
const MAX_YEAR: f64 = 2200.0;

/// Sampling interval of the requested series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    #[serde(rename = "A")]
    Annual,
    #[serde(rename = "M")]
    Monthly,
}

impl Frequency {
    pub fn code(self) -> &'static str {
        match self {
            Frequency::Annual => "A",
            Frequency::Monthly => "M",
        }
    }

    /// `YYYY` for annual data, `YYYY-MM` for monthly data.
    pub fn format_period(self, period: NaiveDate) -> String {
        match self {
            Frequency::Annual => period.format("%Y").to_string(),
            Frequency::Monthly => period.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(Frequency::Annual),
            "M" => Ok(Frequency::Monthly),
            _ => Err(Error::invalid("frequency must be M or A")),
        }
    }
}

/// Shape of a multi-counterpart result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Form {
    #[default]
    Wide,
    Long,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Form::Wide => "wide",
            Form::Long => "long",
        })
    }
}

impl FromStr for Form {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "wide" => Ok(Form::Wide),
            "long" => Ok(Form::Long),
            _ => Err(Error::invalid("form must be long or wide")),
        }
    }
}

/// One counterpart code, or a list of at least two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Counterparts {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for Counterparts {
    fn from(s: &str) -> Self {
        Counterparts::One(s.to_string())
    }
}

impl From<String> for Counterparts {
    fn from(s: String) -> Self {
        Counterparts::One(s)
    }
}

impl From<Vec<String>> for Counterparts {
    fn from(v: Vec<String>) -> Self {
        Counterparts::Many(v)
    }
}

impl From<Vec<&str>> for Counterparts {
    fn from(v: Vec<&str>) -> Self {
        Counterparts::Many(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Counterparts {
    fn from(v: [&str; N]) -> Self {
        Counterparts::Many(v.into_iter().map(str::to_string).collect())
    }
}

/// Start or end of the requested range.
///
/// `Year(2000)` is a whole year. `Fractional(2000.07)` carries a month in
/// its decimals (July 2000) and is passed through as written for monthly
/// queries; annual queries widen it to whole years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodBound {
    Year(i32),
    Fractional(f64),
}

impl PeriodBound {
    pub fn as_f64(self) -> f64 {
        match self {
            PeriodBound::Year(y) => y as f64,
            PeriodBound::Fractional(v) => v,
        }
    }

    fn annual_start(self) -> i32 {
        match self {
            PeriodBound::Year(y) => y,
            PeriodBound::Fractional(v) => v.trunc() as i32,
        }
    }

    fn annual_end(self) -> i32 {
        match self {
            PeriodBound::Year(y) => y,
            PeriodBound::Fractional(v) => v.trunc() as i32 + 1,
        }
    }
}

impl fmt::Display for PeriodBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodBound::Year(y) => write!(f, "{}", y),
            PeriodBound::Fractional(v) => write!(f, "{}", v),
        }
    }
}

impl From<i32> for PeriodBound {
    fn from(y: i32) -> Self {
        PeriodBound::Year(y)
    }
}

impl From<f64> for PeriodBound {
    fn from(v: f64) -> Self {
        PeriodBound::Fractional(v)
    }
}

impl FromStr for PeriodBound {
    type Err = Error;

    /// `"2000"` parses as a year, anything with a decimal point as
    /// fractional.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = if s.contains('.') {
            s.parse::<f64>().ok().map(PeriodBound::Fractional)
        } else {
            s.parse::<i32>().ok().map(PeriodBound::Year)
        };
        parsed.ok_or_else(|| Error::invalid(format!("{:?} is not a number", s)))
    }
}

/// Parameters of a DOTS retrieval.
///
/// ```no_run
/// # use imf_dots::{Client, DotsQuery, Form, Frequency};
/// let client = Client::default();
/// // Developing Asia vs. Japan and Korea, monthly, May 2000 to September 2020.
/// let q = DotsQuery::new("XS25", ["JP", "KR"], 2000.05, 2020.09)
///     .freq(Frequency::Monthly)
///     .form(Form::Long);
/// let table = client.dots(&q)?;
/// # Ok::<(), imf_dots::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotsQuery {
    pub country: String,
    pub counterparts: Counterparts,
    pub start: PeriodBound,
    pub end: PeriodBound,
    #[serde(default)]
    pub freq: Frequency,
    #[serde(default)]
    pub form: Form,
}

impl DotsQuery {
    pub fn new(
        country: impl Into<String>,
        counterparts: impl Into<Counterparts>,
        start: impl Into<PeriodBound>,
        end: impl Into<PeriodBound>,
    ) -> Self {
        Self {
            country: country.into(),
            counterparts: counterparts.into(),
            start: start.into(),
            end: end.into(),
            freq: Frequency::default(),
            form: Form::default(),
        }
    }

    pub fn freq(mut self, freq: Frequency) -> Self {
        self.freq = freq;
        self
    }

    pub fn form(mut self, form: Form) -> Self {
        self.form = form;
        self
    }

    /// Validate every parameter and normalize the date range.
    ///
    /// Checks run in a fixed order and stop at the first failure: country,
    /// counterparts, range bounds, end-after-start. Frequency and form are
    /// already constrained by their types.
    pub fn resolve(&self) -> Result<ResolvedQuery> {
        let country = self.country.trim();
        if country.is_empty() {
            return Err(Error::invalid("country must not be empty"));
        }

        let (counterparts, multiple) = match &self.counterparts {
            Counterparts::Many(list) => {
                if list.len() < 2 {
                    return Err(Error::invalid(
                        "counterparts must be a single code or a list of length 2 or more",
                    ));
                }
                if list.iter().any(|c| c.trim() == country) {
                    return Err(Error::invalid("country must not be in counterparts"));
                }
                let mut seen: Vec<&str> = Vec::with_capacity(list.len());
                for c in list {
                    let c = c.trim();
                    if c.is_empty() {
                        return Err(Error::invalid("counterparts must not contain empty codes"));
                    }
                    if seen.contains(&c) {
                        return Err(Error::invalid(format!("counterpart {} is listed twice", c)));
                    }
                    seen.push(c);
                }
                (seen.into_iter().map(str::to_string).collect(), true)
            }
            Counterparts::One(c) => {
                let c = c.trim();
                if c.is_empty() {
                    return Err(Error::invalid("counterpart must not be empty"));
                }
                if c == country {
                    return Err(Error::invalid("country and counterpart must not be the same"));
                }
                (vec![c.to_string()], false)
            }
        };

        let (start, end) = (self.start.as_f64(), self.end.as_f64());
        if !(start > MIN_YEAR && start < MAX_YEAR) {
            return Err(Error::invalid("start must be a reasonable date (1800-2200)"));
        }
        if !(end > MIN_YEAR && end < MAX_YEAR) {
            return Err(Error::invalid("end must be a reasonable date (1800-2200)"));
        }
        if end < start {
            return Err(Error::invalid("end must be after start"));
        }

        let (start_period, end_period) = match self.freq {
            Frequency::Annual => (
                self.start.annual_start().to_string(),
                self.end.annual_end().to_string(),
            ),
            Frequency::Monthly => (self.start.to_string(), self.end.to_string()),
        };

        Ok(ResolvedQuery {
            country: country.to_string(),
            counterparts,
            multiple,
            freq: self.freq,
            form: self.form,
            start_period,
            end_period,
        })
    }
}

/// A validated query with its normalized `startPeriod`/`endPeriod`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub country: String,
    pub counterparts: Vec<String>,
    /// The caller passed a list (wide form pivots only then).
    pub multiple: bool,
    pub freq: Frequency,
    pub form: Form,
    pub start_period: String,
    pub end_period: String,
}

impl ResolvedQuery {
    /// Request path (relative to the base URL) for one counterpart.
    pub fn path_for(&self, counterpart: &str) -> String {
        format!(
            "CompactData/{}/{}.{}.{}+{}+{}.{}?startPeriod={}&endPeriod={}",
            DOTS_DATABASE_ID,
            self.freq.code(),
            enc(&self.country),
            TRADE_BALANCE_SERIES,
            EXPORTS_SERIES,
            IMPORTS_SERIES,
            enc(counterpart),
            self.start_period,
            self.end_period
        )
    }
}

impl Client {
    /// Fetch trade between `query.country` and each counterpart.
    ///
    /// Validation completes before any request is sent. Counterparts are
    /// fetched one after the other; the first failure aborts the whole
    /// retrieval.
    ///
    /// ### Example
    /// ```no_run
    /// # use imf_dots::{Client, DotsQuery};
    /// let client = Client::default();
    /// // Greece vs. the U.S., Australia and Germany, annual, wide form.
    /// let table = client.dots(&DotsQuery::new("GR", ["US", "AU", "DE"], 1998, 2018))?;
    /// # Ok::<(), imf_dots::Error>(())
    /// ```
    pub fn dots(&self, query: &DotsQuery) -> Result<TradeTable> {
        let q = query.resolve()?;

        let mut rows: Vec<(String, TradeObservation)> = Vec::new();
        for counterpart in &q.counterparts {
            let observations = self.retrieve_counterpart(&q, counterpart)?;
            info!(
                "{} vs {}: {} observations",
                q.country,
                counterpart,
                observations.len()
            );
            rows.extend(observations.into_iter().map(|o| (counterpart.clone(), o)));
        }

        // Period strings are formatted once, over the concatenated batches.
        let long: Vec<TradeRow> = rows
            .into_iter()
            .map(|(counterpart, o)| TradeRow {
                period: q.freq.format_period(o.period),
                country: q.country.clone(),
                counterpart,
                exports: o.exports,
                imports: o.imports,
                trade_balance: o.trade_balance,
                twoway_trade: o.twoway_trade,
            })
            .collect();

        if q.multiple && q.form == Form::Wide {
            Ok(TradeTable::Wide(WideTable::pivot(&q.country, &long)?))
        } else {
            Ok(TradeTable::Long(long))
        }
    }

    fn retrieve_counterpart(
        &self,
        q: &ResolvedQuery,
        counterpart: &str,
    ) -> Result<Vec<TradeObservation>> {
        let v = self.get(&q.path_for(counterpart))?;
        parse_compact_data(v)
    }
}

/// Turn a CompactData document into observations.
pub fn parse_compact_data(value: serde_json::Value) -> Result<Vec<TradeObservation>> {
    let env: CompactEnvelope = sdmx::decode(value, "CompactData").map_err(|_| series_not_found())?;
    let series = env
        .compact_data
        .data_set
        .series
        .ok_or_else(series_not_found)?
        .into_vec();

    let [balance, exports, imports] = pick_series(series)?;
    if exports.len() != imports.len() || exports.len() != balance.len() {
        return Err(Error::invalid(
            "data not available; try a different time period or frequency",
        ));
    }

    exports
        .iter()
        .zip(imports.iter())
        .zip(balance.iter())
        .map(|((x, m), b)| {
            Ok(TradeObservation::new(
                parse_period(&x.time_period)?,
                obs_value(x)?,
                obs_value(m)?,
                obs_value(b)?,
            ))
        })
        .collect()
}

fn series_not_found() -> Error {
    Error::remote("one or more series not found; please try again")
}

/// Returns `[trade balance, exports, imports]` observation lists.
///
/// Series are matched on `@INDICATOR` when every series carries one;
/// otherwise they are taken by position in that same order.
fn pick_series(series: Vec<Series>) -> Result<[Vec<Obs>; 3]> {
    let wanted = [TRADE_BALANCE_SERIES, EXPORTS_SERIES, IMPORTS_SERIES];
    let keyed = !series.is_empty() && series.iter().all(|s| s.indicator.is_some());

    let mut picked: Vec<Vec<Obs>> = Vec::with_capacity(3);
    for (pos, id) in wanted.iter().enumerate() {
        let found = if keyed {
            series.iter().find(|s| s.indicator.as_deref() == Some(*id))
        } else {
            series.get(pos)
        };
        let obs = found
            .and_then(|s| s.obs.clone())
            .ok_or_else(series_not_found)?;
        picked.push(obs.into_vec());
    }

    picked.try_into().map_err(|_| series_not_found())
}

fn obs_value(o: &Obs) -> Result<f64> {
    o.value
        .ok_or_else(|| Error::remote(format!("missing value for period {}", o.time_period)))
}

/// Parse `YYYY` or `YYYY-MM` (as sent by the service) into the first day of
/// that period.
pub fn parse_period(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let parsed = match s.len() {
        4 => s
            .parse::<i32>()
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
        7 => NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
    };
    parsed.ok_or_else(|| Error::remote(format!("unrecognised period {:?}", s)))
}
