//! Domain models for the restaurant dashboard.
//!
//! - [`RestaurantRecord`] - one row of the restaurant dataset
//! - [`CountryLookup`] - country code to country name
//! - [`EnrichedTable`] - restaurants left-joined with country names
//! - [`JoinSummary`] - how well the join matched

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// Column Contract
// =============================================================================

pub const COL_COUNTRY_CODE: &str = "Country Code";
pub const COL_COUNTRY: &str = "Country";
pub const COL_CITY: &str = "City";
pub const COL_CUISINES: &str = "Cuisines";
pub const COL_COST_FOR_TWO: &str = "Average Cost for two";
pub const COL_ONLINE_DELIVERY: &str = "Has Online delivery";
pub const COL_RATING_TEXT: &str = "Rating text";
pub const COL_LATITUDE: &str = "Latitude";
pub const COL_LONGITUDE: &str = "Longitude";
pub const COL_RESTAURANT_NAME: &str = "Restaurant Name";
pub const COL_CURRENCY: &str = "Currency";

/// Value written into every row's currency during preparation.
pub const CURRENCY: &str = "Rupees";

/// Country name the India-only views filter on.
pub const INDIA: &str = "India";

// =============================================================================
// Restaurant Record
// =============================================================================

/// One restaurant row.
///
/// Only the foreign key is mandatory; every other cell may be empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestaurantRecord {
    pub name: Option<String>,
    pub country_code: i64,
    pub city: Option<String>,
    /// Comma separated, e.g. `"North Indian, Chinese"`.
    pub cuisines: Option<String>,
    pub average_cost_for_two: Option<f64>,
    pub currency: Option<String>,
    /// `"Yes"` / `"No"` in the source data.
    pub has_online_delivery: Option<String>,
    pub rating_text: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// =============================================================================
// Country Lookup
// =============================================================================

/// Country code to country name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryLookup {
    names: HashMap<i64, String>,
}

impl CountryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping unless the code is already present.
    ///
    /// Returns `false` when the code was a duplicate; the first name is kept
    /// so the join never multiplies restaurant rows.
    pub fn insert(&mut self, code: i64, name: impl Into<String>) -> bool {
        if self.names.contains_key(&code) {
            return false;
        }
        self.names.insert(code, name.into());
        true
    }

    pub fn get(&self, code: i64) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(i64, String)> for CountryLookup {
    fn from_iter<I: IntoIterator<Item = (i64, String)>>(iter: I) -> Self {
        let mut lookup = CountryLookup::new();
        for (code, name) in iter {
            lookup.insert(code, name);
        }
        lookup
    }
}

// =============================================================================
// Enriched Table
// =============================================================================

/// A restaurant with its joined country name.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub restaurant: RestaurantRecord,
    /// `None` when the country code had no lookup entry.
    pub country: Option<String>,
}

impl EnrichedRow {
    pub fn is_in(&self, country: &str) -> bool {
        self.country.as_deref() == Some(country)
    }
}

/// Restaurants left-joined with country names.
///
/// Built once by [`crate::prepare::prepare`] and read-only afterwards.
/// Rows keep the restaurant source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedTable {
    rows: Vec<EnrichedRow>,
}

impl EnrichedTable {
    pub(crate) fn from_rows(rows: Vec<EnrichedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[EnrichedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn summary(&self) -> JoinSummary {
        let matched_rows = self.rows.iter().filter(|r| r.country.is_some()).count();
        let unmatched_codes: BTreeSet<i64> = self
            .rows
            .iter()
            .filter(|r| r.country.is_none())
            .map(|r| r.restaurant.country_code)
            .collect();

        JoinSummary {
            total_rows: self.rows.len(),
            matched_rows,
            unmatched_codes: unmatched_codes.into_iter().collect(),
        }
    }
}

/// Outcome of the country join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSummary {
    pub total_rows: usize,
    pub matched_rows: usize,
    /// Distinct codes without a country, ascending.
    pub unmatched_codes: Vec<i64>,
}
