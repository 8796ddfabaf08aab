//! Tidy row types returned by the catalog lookups.
//!
//! Field renames carry the public column names, so CSV/JSON output matches
//! the column contract exactly. Each type exposes its header as `COLUMNS`.

use serde::{Deserialize, Serialize};

/// One country or country aggregate known to the DOTS database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCode {
    #[serde(rename = "Country Code")]
    pub code: String,
    #[serde(rename = "Country")]
    pub name: String,
}

impl CountryCode {
    pub const COLUMNS: [&'static str; 2] = ["Country Code", "Country"];
}

/// One database (dataflow) exposed by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCode {
    #[serde(rename = "Database ID")]
    pub id: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl DatabaseCode {
    pub const COLUMNS: [&'static str; 2] = ["Database ID", "Description"];
}

/// A single (title, text) annotation describing a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    #[serde(rename = "Variable")]
    pub variable: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl DatabaseInfo {
    pub const COLUMNS: [&'static str; 2] = ["Variable", "Value"];
}

/// A queryable dimension of a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDimension {
    #[serde(rename = "Database ID")]
    pub database_id: String,
    #[serde(rename = "Concept")]
    pub concept: String,
    #[serde(rename = "Scheme")]
    pub scheme: String,
    /// Code list reference; pass it to `indicator_dimensions`.
    #[serde(rename = "Indicator ID")]
    pub indicator_id: String,
}

impl DatabaseDimension {
    pub const COLUMNS: [&'static str; 4] = ["Database ID", "Concept", "Scheme", "Indicator ID"];
}

/// A granular series under one indicator code list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    #[serde(rename = "Indicator ID")]
    pub indicator_id: String,
    #[serde(rename = "Series ID")]
    pub series_id: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl IndicatorSeries {
    pub const COLUMNS: [&'static str; 3] = ["Indicator ID", "Series ID", "Description"];
}
