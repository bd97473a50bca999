//! Data preparation: load both sources and build the [`EnrichedTable`].
//!
//! ```text
//! restaurants.csv ──┐
//!                   ├── left join on "Country Code" ──▶ EnrichedTable (+ Currency = "Rupees")
//! countries.csv  ───┘
//! ```
//!
//! Loading runs once at startup. Any failure is a [`LoadError`] and the
//! process cannot serve views without the table.

use csv::StringRecord;
use std::path::{Path, PathBuf};

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{LoadError, LoadResult};
use crate::models::{
    CountryLookup, EnrichedRow, EnrichedTable, RestaurantRecord, COL_CITY, COL_COST_FOR_TWO,
    COL_COUNTRY, COL_COUNTRY_CODE, COL_CUISINES, COL_CURRENCY, COL_LATITUDE, COL_LONGITUDE,
    COL_ONLINE_DELIVERY, COL_RATING_TEXT, COL_RESTAURANT_NAME, CURRENCY,
};
use crate::parser::{cell_f64, cell_i64, cell_string, parse_bytes_auto, parse_file_auto, RawTable};

/// Columns the restaurant source must carry.
pub const RESTAURANT_COLUMNS: [&str; 8] = [
    COL_COUNTRY_CODE,
    COL_CITY,
    COL_CUISINES,
    COL_COST_FOR_TWO,
    COL_ONLINE_DELIVERY,
    COL_RATING_TEXT,
    COL_LATITUDE,
    COL_LONGITUDE,
];

/// Columns the country lookup must carry.
pub const COUNTRY_COLUMNS: [&str; 2] = [COL_COUNTRY_CODE, COL_COUNTRY];

/// Where the two sources live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSources {
    pub restaurants: PathBuf,
    pub countries: PathBuf,
}

/// Parsed restaurant source plus how it was read.
#[derive(Debug, Clone)]
pub struct LoadedRestaurants {
    pub records: Vec<RestaurantRecord>,
    pub encoding: String,
    pub delimiter: char,
}

/// Left-join restaurants against the country lookup.
///
/// Every restaurant row is kept in order; unmatched codes get no country.
/// The currency is overwritten with [`CURRENCY`].
pub fn prepare(restaurants: Vec<RestaurantRecord>, countries: &CountryLookup) -> EnrichedTable {
    let rows = restaurants
        .into_iter()
        .map(|mut restaurant| {
            let country = countries.get(restaurant.country_code).map(String::from);
            restaurant.currency = Some(CURRENCY.to_string());
            EnrichedRow { restaurant, country }
        })
        .collect();

    EnrichedTable::from_rows(rows)
}

/// Load both files and join them.
pub fn load_table(sources: &DataSources) -> LoadResult<EnrichedTable> {
    log_info(format!("📖 Reading restaurants: {}", sources.restaurants.display()));
    let restaurants = load_restaurants_file(&sources.restaurants)?;
    log_success(format!(
        "Read {} restaurants (encoding {}, delimiter '{}')",
        restaurants.records.len(),
        restaurants.encoding,
        format_delimiter(restaurants.delimiter)
    ));

    log_info(format!("📖 Reading countries: {}", sources.countries.display()));
    let countries = load_countries_file(&sources.countries)?;
    log_success(format!("Read {} country codes", countries.len()));

    let table = prepare(restaurants.records, &countries);
    let summary = table.summary();
    log_success(format!(
        "Joined {} rows, {} with a country",
        summary.total_rows, summary.matched_rows
    ));
    if !summary.unmatched_codes.is_empty() {
        log_warning(format!(
            "No country for codes: {}",
            summary
                .unmatched_codes
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    Ok(table)
}

pub fn load_restaurants_file(path: &Path) -> LoadResult<LoadedRestaurants> {
    restaurants_from_raw(&parse_file_auto(path)?)
}

pub fn load_restaurants_bytes(bytes: &[u8]) -> LoadResult<LoadedRestaurants> {
    restaurants_from_raw(&parse_bytes_auto(bytes, "restaurants")?)
}

pub fn load_countries_file(path: &Path) -> LoadResult<CountryLookup> {
    countries_from_raw(&parse_file_auto(path)?)
}

pub fn load_countries_bytes(bytes: &[u8]) -> LoadResult<CountryLookup> {
    countries_from_raw(&parse_bytes_auto(bytes, "countries")?)
}

fn restaurants_from_raw(raw: &RawTable) -> LoadResult<LoadedRestaurants> {
    raw.require(&RESTAURANT_COLUMNS)?;
    let columns = RestaurantColumns::locate(raw)?;

    let records = raw
        .records
        .iter()
        .map(|record| columns.read(raw, record))
        .collect::<LoadResult<Vec<_>>>()?;

    Ok(LoadedRestaurants {
        records,
        encoding: raw.encoding.clone(),
        delimiter: raw.delimiter,
    })
}

fn countries_from_raw(raw: &RawTable) -> LoadResult<CountryLookup> {
    raw.require(&COUNTRY_COLUMNS)?;
    let code_idx = raw.column(COL_COUNTRY_CODE)?;
    let name_idx = raw.column(COL_COUNTRY)?;

    let mut lookup = CountryLookup::new();
    for record in &raw.records {
        let code = cell_i64(raw, record, code_idx)?;
        let Some(name) = cell_string(record, Some(name_idx)) else {
            continue;
        };
        if !lookup.insert(code, name) {
            log_warning(format!("Duplicate country code {} ignored", code));
        }
    }

    if lookup.is_empty() && raw.records.is_empty() {
        return Err(LoadError::EmptySource(raw.source_name.clone()));
    }

    Ok(lookup)
}

/// Header positions, resolved once per file.
struct RestaurantColumns {
    country_code: usize,
    city: usize,
    cuisines: usize,
    cost: usize,
    delivery: usize,
    rating: usize,
    latitude: usize,
    longitude: usize,
    name: Option<usize>,
    currency: Option<usize>,
}

impl RestaurantColumns {
    fn locate(raw: &RawTable) -> LoadResult<Self> {
        Ok(Self {
            country_code: raw.column(COL_COUNTRY_CODE)?,
            city: raw.column(COL_CITY)?,
            cuisines: raw.column(COL_CUISINES)?,
            cost: raw.column(COL_COST_FOR_TWO)?,
            delivery: raw.column(COL_ONLINE_DELIVERY)?,
            rating: raw.column(COL_RATING_TEXT)?,
            latitude: raw.column(COL_LATITUDE)?,
            longitude: raw.column(COL_LONGITUDE)?,
            name: raw.optional_column(COL_RESTAURANT_NAME),
            currency: raw.optional_column(COL_CURRENCY),
        })
    }

    fn read(&self, raw: &RawTable, record: &StringRecord) -> LoadResult<RestaurantRecord> {
        Ok(RestaurantRecord {
            name: cell_string(record, self.name),
            country_code: cell_i64(raw, record, self.country_code)?,
            city: cell_string(record, Some(self.city)),
            cuisines: cell_string(record, Some(self.cuisines)),
            average_cost_for_two: cell_f64(raw, record, self.cost)?,
            currency: cell_string(record, self.currency),
            has_online_delivery: cell_string(record, Some(self.delivery)),
            rating_text: cell_string(record, Some(self.rating)),
            latitude: cell_f64(raw, record, self.latitude)?,
            longitude: cell_f64(raw, record, self.longitude)?,
        })
    }
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const RESTAURANTS: &str = "\
Restaurant Name,Country Code,City,Cuisines,Average Cost for two,Currency,Has Online delivery,Rating text,Latitude,Longitude
Spice Route,1,New Delhi,\"North Indian, Chinese\",800,Indian Rupees(Rs.),Yes,Very Good,28.6,77.2
Harbour Grill,14,Sydney,Seafood,70,Dollar($),No,Good,-33.8,151.2
";

    const COUNTRIES: &str = "Country Code,Country\n1,India\n14,Australia\n";

    #[test]
    fn test_load_and_join() {
        let restaurants = load_restaurants_bytes(RESTAURANTS.as_bytes()).unwrap();
        let countries = load_countries_bytes(COUNTRIES.as_bytes()).unwrap();
        let table = prepare(restaurants.records, &countries);

        assert_eq!(table.len(), 2);
        let first = &table.rows()[0];
        assert_eq!(first.country.as_deref(), Some("India"));
        assert_eq!(first.restaurant.name.as_deref(), Some("Spice Route"));
        assert_eq!(first.restaurant.cuisines.as_deref(), Some("North Indian, Chinese"));
        assert_eq!(first.restaurant.average_cost_for_two, Some(800.0));
        assert_eq!(first.restaurant.latitude, Some(28.6));
    }

    #[test]
    fn test_currency_is_constant_after_join() {
        let restaurants = load_restaurants_bytes(RESTAURANTS.as_bytes()).unwrap();
        let table = prepare(restaurants.records, &CountryLookup::new());
        assert!(table
            .rows()
            .iter()
            .all(|r| r.restaurant.currency.as_deref() == Some(CURRENCY)));
    }

    #[test]
    fn test_unmatched_code_keeps_row() {
        let restaurant = RestaurantRecord {
            country_code: 1,
            city: Some("Agra".into()),
            ..Default::default()
        };
        let lookup: CountryLookup = vec![(216, "United States".to_string())].into_iter().collect();
        let table = prepare(vec![restaurant], &lookup);

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].country, None);
        assert_eq!(table.summary().unmatched_codes, vec![1]);
    }

    #[test]
    fn test_missing_cells_are_none() {
        let csv = "Country Code,City,Cuisines,Average Cost for two,Has Online delivery,Rating text,Latitude,Longitude\n1,Agra,,,No,Not rated,,\n";
        let loaded = load_restaurants_bytes(csv.as_bytes()).unwrap();
        let record = &loaded.records[0];
        assert_eq!(record.cuisines, None);
        assert_eq!(record.average_cost_for_two, None);
        assert_eq!(record.latitude, None);
        assert_eq!(record.name, None);
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "Country Code,City\n1,Agra\n";
        let err = load_restaurants_bytes(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing required column 'Cuisines'"));
    }

    #[test]
    fn test_bad_country_code() {
        let err = load_countries_bytes(b"Country Code,Country\nabc,India\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_load_table_from_files() {
        let mut restaurants = NamedTempFile::new().unwrap();
        write!(restaurants, "{}", RESTAURANTS).unwrap();
        let mut countries = NamedTempFile::new().unwrap();
        write!(countries, "{}", COUNTRIES).unwrap();

        let table = load_table(&DataSources {
            restaurants: restaurants.path().to_path_buf(),
            countries: countries.path().to_path_buf(),
        })
        .unwrap();

        assert_eq!(table.summary().matched_rows, 2);
    }

    #[test]
    fn test_unreadable_source() {
        let err = load_countries_file(Path::new("/nonexistent/countries.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
