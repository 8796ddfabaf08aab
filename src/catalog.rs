//! Reference catalog: country and database code lists, keyword search, and
//! per-database metadata.
//!
//! The two code lists are fetched lazily on first use and kept for the
//! lifetime of the [`Client`]; `refresh_*` replaces them. Database info,
//! dimensions and indicator series are fetched fresh on every call.

use crate::api::{Client, enc};
use crate::error::{Error, Result};
use crate::models::{CountryCode, DatabaseCode, DatabaseDimension, DatabaseInfo, IndicatorSeries};
use crate::sdmx::{self, StructureEnvelope};
use log::{debug, info};
use regex::Regex;
use std::sync::{LazyLock, Mutex, PoisonError};

/// Database whose structure carries the country code list.
pub const COUNTRY_DATABASE_ID: &str = "DOT";
/// Area code list inside the DOT structure.
const COUNTRY_CODELIST_ID: &str = "CL_AREA_DOT";
/// Where the area code list sits when the response carries no list ids.
const COUNTRY_CODELIST_INDEX: usize = 2;
/// Prefix the dataflow listing puts in front of every database id.
const DATAFLOW_ID_PREFIX: &str = "DS-";

/// Lazily populated table, filled at most once until refreshed.
///
/// The lock is held across the fetch, so concurrent callers never issue a
/// second request for the same table.
#[derive(Debug)]
pub(crate) struct TableCache<T> {
    slot: Mutex<Option<Vec<T>>>,
}

impl<T> Default for TableCache<T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<T: Clone> TableCache<T> {
    pub(crate) fn get_or_fetch(&self, fetch: impl FnOnce() -> Result<Vec<T>>) -> Result<Vec<T>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(rows) = slot.as_ref() {
            debug!("cache hit ({} rows)", rows.len());
            return Ok(rows.clone());
        }
        let rows = fetch()?;
        *slot = Some(rows.clone());
        Ok(rows)
    }

    /// Fetch unconditionally and replace the cached table on success.
    /// A failed fetch keeps the previous table.
    pub(crate) fn refresh(&self, fetch: impl FnOnce() -> Result<Vec<T>>) -> Result<Vec<T>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let rows = fetch()?;
        *slot = Some(rows.clone());
        Ok(rows)
    }
}

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<.*?>|&([a-z0-9]+|#[0-9]{1,6}|#x[0-9a-f]{1,6});").expect("valid markup pattern")
});

/// Remove HTML tags and named/numeric character entities from free text.
///
/// Not an HTML parser: entities are dropped rather than decoded.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

/// Row filter shared by the country and database searches.
enum Matcher {
    Substring(String),
    Pattern(Regex),
}

impl Matcher {
    fn new(keyword: &str, regex: bool) -> Result<Self> {
        if regex {
            Regex::new(keyword)
                .map(Matcher::Pattern)
                .map_err(|e| Error::invalid(format!("invalid search pattern {:?}: {}", keyword, e)))
        } else {
            Ok(Matcher::Substring(keyword.to_lowercase()))
        }
    }

    fn is_match(&self, haystack: &str) -> bool {
        match self {
            Matcher::Substring(k) => haystack.to_lowercase().contains(k.as_str()),
            Matcher::Pattern(re) => re.is_match(haystack),
        }
    }
}

impl Client {
    /// All countries and aggregates available in DOTS, cached after the
    /// first call.
    pub fn country_codes(&self) -> Result<Vec<CountryCode>> {
        self.countries.get_or_fetch(|| self.fetch_country_codes())
    }

    /// Re-fetch the country list, replacing the cached copy.
    pub fn refresh_country_codes(&self) -> Result<Vec<CountryCode>> {
        self.countries.refresh(|| self.fetch_country_codes())
    }

    /// Search country names.
    ///
    /// By default `keyword` is a case-insensitive substring. With
    /// `regex = true` it is a case-sensitive regular expression searched
    /// anywhere in the name (use `^`/`$` to anchor).
    ///
    /// ```no_run
    /// # use imf_dots::Client;
    /// let client = Client::default();
    /// let hits = client.country_search("^B.*a$", true)?;
    /// # Ok::<(), imf_dots::Error>(())
    /// ```
    pub fn country_search(&self, keyword: &str, regex: bool) -> Result<Vec<CountryCode>> {
        let matcher = Matcher::new(keyword, regex)?;
        Ok(self
            .country_codes()?
            .into_iter()
            .filter(|c| matcher.is_match(&c.name))
            .collect())
    }

    /// All databases the service exposes, sorted by id and cached after the
    /// first call.
    pub fn database_codes(&self) -> Result<Vec<DatabaseCode>> {
        self.databases.get_or_fetch(|| self.fetch_database_codes())
    }

    /// Re-fetch the database list, replacing the cached copy.
    pub fn refresh_database_codes(&self) -> Result<Vec<DatabaseCode>> {
        self.databases.refresh(|| self.fetch_database_codes())
    }

    /// Search database descriptions; same matching rules as
    /// [`Client::country_search`].
    pub fn database_search(&self, keyword: &str, regex: bool) -> Result<Vec<DatabaseCode>> {
        let matcher = Matcher::new(keyword, regex)?;
        Ok(self
            .database_codes()?
            .into_iter()
            .filter(|d| matcher.is_match(&d.description))
            .collect())
    }

    /// High-level information (update time, name, methodology, ...) on one
    /// database. The id must appear in [`Client::database_codes`].
    pub fn database_info(&self, database_id: &str) -> Result<Vec<DatabaseInfo>> {
        self.ensure_known_database(database_id)?;
        let key_family = self.fetch_key_family(database_id)?;
        let annotations = key_family
            .annotations
            .ok_or_else(|| Error::remote(format!("no annotations for database {}", database_id)))?;

        let info: Vec<DatabaseInfo> = annotations
            .annotation
            .into_vec()
            .into_iter()
            .map(|a| DatabaseInfo {
                variable: a.title.text().to_string(),
                value: strip_markup(a.text.text()),
            })
            .collect();
        info!("database {}: {} annotations", database_id, info.len());
        Ok(info)
    }

    /// Dimensions (frequency, area, indicator, ...) that can be queried in a
    /// database. The id must appear in [`Client::database_codes`].
    pub fn database_dimensions(&self, database_id: &str) -> Result<Vec<DatabaseDimension>> {
        self.ensure_known_database(database_id)?;
        let key_family = self.fetch_key_family(database_id)?;
        let components = key_family
            .components
            .ok_or_else(|| Error::remote(format!("no components for database {}", database_id)))?;

        Ok(components
            .dimension
            .into_vec()
            .into_iter()
            .map(|d| DatabaseDimension {
                database_id: database_id.to_string(),
                concept: d.concept_ref,
                scheme: d.concept_scheme_ref,
                indicator_id: d.codelist,
            })
            .collect())
    }

    /// Series ids and descriptions under one indicator code list, e.g.
    /// `CL_INDICATOR_FSI`. The id is trimmed, then sent without checking it
    /// against any cached list; returned rows carry the same trimmed id.
    pub fn indicator_dimensions(&self, indicator_id: &str) -> Result<Vec<IndicatorSeries>> {
        let indicator_id = indicator_id.trim();
        let v = self.get(&format!("CodeList/{}", enc(indicator_id)))?;
        let env: StructureEnvelope = sdmx::decode(v, "CodeList")?;
        let code_list = env
            .structure
            .code_lists
            .and_then(|cl| cl.code_list.into_vec().into_iter().next())
            .and_then(|cl| cl.code)
            .ok_or_else(|| Error::remote(format!("no code list found for indicator {}", indicator_id)))?;

        Ok(code_list
            .into_vec()
            .into_iter()
            .map(|c| IndicatorSeries {
                indicator_id: indicator_id.to_string(),
                series_id: c.value,
                description: c.description.text().to_string(),
            })
            .collect())
    }

    fn ensure_known_database(&self, database_id: &str) -> Result<()> {
        if self.database_codes()?.iter().any(|d| d.id == database_id) {
            Ok(())
        } else {
            Err(Error::invalid(format!(
                "unknown database id {:?}; see database_codes()",
                database_id
            )))
        }
    }

    fn fetch_key_family(&self, database_id: &str) -> Result<sdmx::KeyFamily> {
        let v = self.get(&format!("DataStructure/{}", enc(database_id)))?;
        let env: StructureEnvelope = sdmx::decode(v, "DataStructure")?;
        env.structure
            .key_families
            .and_then(|kf| kf.key_family.into_vec().into_iter().next())
            .ok_or_else(|| Error::remote(format!("no key family for database {}", database_id)))
    }

    fn fetch_country_codes(&self) -> Result<Vec<CountryCode>> {
        let v = self.get(&format!("DataStructure/{}", COUNTRY_DATABASE_ID))?;
        let env: StructureEnvelope = sdmx::decode(v, "DataStructure")?;
        let codes = env
            .structure
            .code_lists
            .and_then(|cl| pick_country_list(cl.code_list.into_vec()))
            .and_then(|cl| cl.code)
            .ok_or_else(|| Error::remote("country code list missing from DOT structure"))?;

        let rows: Vec<CountryCode> = codes
            .into_vec()
            .into_iter()
            .map(|c| CountryCode {
                code: c.value,
                name: c.description.text().to_string(),
            })
            .collect();
        info!("fetched {} country codes", rows.len());
        Ok(rows)
    }

    fn fetch_database_codes(&self) -> Result<Vec<DatabaseCode>> {
        let v = self.get("Dataflow")?;
        let env: StructureEnvelope = sdmx::decode(v, "Dataflow")?;
        let flows = env
            .structure
            .dataflows
            .ok_or_else(|| Error::remote("dataflow listing missing from response"))?;

        let mut rows: Vec<DatabaseCode> = flows
            .dataflow
            .into_vec()
            .into_iter()
            .map(|d| DatabaseCode {
                id: d
                    .id
                    .strip_prefix(DATAFLOW_ID_PREFIX)
                    .map(str::to_string)
                    .unwrap_or_else(|| d.id.clone()),
                description: d.name.text().to_string(),
            })
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        info!("fetched {} database codes", rows.len());
        Ok(rows)
    }
}

/// The list whose `@id` is [`COUNTRY_CODELIST_ID`], else the one at
/// [`COUNTRY_CODELIST_INDEX`].
fn pick_country_list(mut lists: Vec<sdmx::CodeList>) -> Option<sdmx::CodeList> {
    let pos = lists
        .iter()
        .position(|cl| cl.id.as_deref() == Some(COUNTRY_CODELIST_ID))
        .unwrap_or(COUNTRY_CODELIST_INDEX);
    (pos < lists.len()).then(|| lists.swap_remove(pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markup_removes_tags_and_entities() {
        let raw = "<p>Latest&nbsp;update: <b>2021</b> &amp; more&#160;&#xa0;</p>";
        assert_eq!(strip_markup(raw), "Latestupdate: 2021  more");
    }

    #[test]
    fn strip_markup_leaves_plain_text() {
        assert_eq!(strip_markup("04/26/2021 & 5 < 6"), "04/26/2021 & 5 < 6");
    }

    #[test]
    fn substring_matcher_ignores_case() {
        let m = Matcher::new("GERMANY", false).unwrap();
        assert!(m.is_match("Germany"));
        assert!(!m.is_match("France"));
    }

    #[test]
    fn bad_pattern_is_invalid_input() {
        let err = Matcher::new("([", true).err().unwrap();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn cache_fetches_once_until_refresh() {
        let cache: TableCache<u32> = TableCache::default();
        let mut calls = 0;
        let rows = cache
            .get_or_fetch(|| {
                calls += 1;
                Ok(vec![1, 2])
            })
            .unwrap();
        assert_eq!(rows, vec![1, 2]);
        let again = cache
            .get_or_fetch(|| {
                calls += 1;
                Ok(vec![9])
            })
            .unwrap();
        assert_eq!(again, vec![1, 2]);
        assert_eq!(calls, 1);

        let fresh = cache.refresh(|| Ok(vec![3])).unwrap();
        assert_eq!(fresh, vec![3]);
        assert_eq!(cache.get_or_fetch(|| Ok(vec![])).unwrap(), vec![3]);
    }

    #[test]
    fn failed_refresh_keeps_previous_table() {
        let cache: TableCache<u32> = TableCache::default();
        cache.get_or_fetch(|| Ok(vec![1])).unwrap();
        assert!(cache.refresh(|| Err(Error::remote("down"))).is_err());
        assert_eq!(cache.get_or_fetch(|| Ok(vec![])).unwrap(), vec![1]);
    }
}
