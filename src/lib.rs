//! imf_dots
//!
//! A Rust client for the IMF Direction of Trade Statistics (DOTS), served
//! through the IMF SDMX-JSON data service. Pairs with the `imf` CLI.
//!
//! ### Features
//! - Browse the reference catalog: country codes, databases, database
//!   metadata, dimensions and indicator code lists (cached per client)
//! - Retrieve exports, imports, trade balance and two-way trade between a
//!   country and one or more counterparts, annually or monthly
//! - Long or wide result tables, saved as CSV or JSON
//! - Summary statistics per counterpart and measure
//! - SVG/PNG charts with one panel per counterpart
//!
//! ### Example
//! ```no_run
//! use imf_dots::{Client, DotsQuery, Form};
//!
//! let client = Client::default();
//! let greece = client.country_search("greece", false)?;
//! println!("{:?}", greece);
//!
//! let query = DotsQuery::new("GR", ["US", "AU", "DE"], 1998, 2018).form(Form::Long);
//! let table = client.dots(&query)?;
//! imf_dots::storage::save_csv(&table, "gr_trade.csv")?;
//! imf_dots::viz::dots_plot(&table, &imf_dots::viz::DEFAULT_SUBSET, "gr_trade.svg", 1000, 900)?;
//! let stats = imf_dots::stats::grouped_summary(&table);
//! println!("{:#?}", stats);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod dots;
pub mod error;
pub mod models;
pub mod sdmx;
pub mod stats;
pub mod storage;
pub mod table;
pub mod viz;

pub use api::{Client, HttpTransport, Transport};
pub use config::ClientConfig;
pub use dots::{Counterparts, DotsQuery, Form, Frequency, PeriodBound};
pub use error::{Error, Result};
pub use models::{CountryCode, DatabaseCode, DatabaseDimension, DatabaseInfo, IndicatorSeries};
pub use stats::{GroupKey, Summary};
pub use table::{TradeRow, TradeTable, Variable, WideTable};
