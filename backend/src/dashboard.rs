//! The loaded dashboard: one enriched table, many view renders.
//!
//! ```rust,ignore
//! use restodash::{Dashboard, DataSources, ViewId};
//!
//! let dashboard = Dashboard::load(&DataSources {
//!     restaurants: "data/zomato.csv".into(),
//!     countries: "data/country_codes.csv".into(),
//! })?;
//! let result = dashboard.render(ViewId::TopCitiesByCount);
//! println!("{} rows", result.len());
//! ```

use std::sync::Arc;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::LoadResult;
use crate::models::EnrichedTable;
use crate::prepare::{load_table, DataSources};
use crate::views::{aggregate, AggregationResult, ViewId};

/// Shared, read-only handle to the enriched table.
///
/// Cloning is cheap; every clone reads the same table.
#[derive(Debug, Clone)]
pub struct Dashboard {
    table: Arc<EnrichedTable>,
}

impl Dashboard {
    /// Load and join both sources.
    pub fn load(sources: &DataSources) -> LoadResult<Self> {
        Ok(Self::from_table(load_table(sources)?))
    }

    pub fn from_table(table: EnrichedTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &EnrichedTable {
        &self.table
    }

    /// Run one view and log the outcome.
    pub fn render(&self, view: ViewId) -> AggregationResult {
        log_info(format!("📊 {}", view.label()));
        let result = aggregate(&self.table, view);

        match result.empty_warning() {
            Some(warning) => log_warning(warning.to_string()),
            None => log_success(format!("{} rows", result.len())),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountryLookup, RestaurantRecord};
    use crate::prepare::prepare;

    fn dashboard() -> Dashboard {
        let records = vec![RestaurantRecord {
            country_code: 1,
            city: Some("Agra".into()),
            average_cost_for_two: Some(300.0),
            ..Default::default()
        }];
        let lookup: CountryLookup = vec![(1, "India".to_string())].into_iter().collect();
        Dashboard::from_table(prepare(records, &lookup))
    }

    #[test]
    fn test_render_matches_aggregate() {
        let dashboard = dashboard();
        for view in ViewId::ALL {
            assert_eq!(dashboard.render(view), aggregate(dashboard.table(), view));
        }
    }

    #[test]
    fn test_clones_share_the_table() {
        let a = dashboard();
        let b = a.clone();
        assert!(std::ptr::eq(a.table(), b.table()));
    }
}
