//! The ten dashboard views.
//!
//! A [`ViewId`] selects one recipe; [`aggregate`] runs it against the
//! enriched table and returns an [`AggregationResult`]: a small ordered
//! table plus the [`RenderHints`] a charting or mapping front end needs.
//!
//! ```text
//! &EnrichedTable ─┬─▶ filter ─▶ group ─▶ aggregate ─▶ sort ─▶ top-N ─▶ AggregationResult
//!        ViewId ──┘
//! ```
//!
//! Every recipe is a pure function of the table: no caching, no shared
//! mutable state, identical input gives an identical result.

pub mod frame;
mod recipes;

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{EmptyResultWarning, ViewParseError};
use crate::models::EnrichedTable;

// =============================================================================
// View Identifiers
// =============================================================================

/// One entry of the view selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum ViewId {
    TopCitiesByCount,
    OnlineDeliveryCount,
    CostlyCuisinesInIndia,
    CommonCuisinePerCity,
    CuisineAverageCost,
    RatingsInTopCities,
    DeliveryVsDineIn,
    /// Same computation as [`ViewId::IndiaDineInExpenditure`]: both sum the
    /// cost for two per Indian city with no delivery filter. The two labels
    /// suggest different metrics but the results are identical.
    IndiaOnlineDeliverySpending,
    IndiaDineInExpenditure,
    CityAverageCost,
}

impl ViewId {
    pub const ALL: [ViewId; 10] = [
        ViewId::TopCitiesByCount,
        ViewId::OnlineDeliveryCount,
        ViewId::CostlyCuisinesInIndia,
        ViewId::CommonCuisinePerCity,
        ViewId::CuisineAverageCost,
        ViewId::RatingsInTopCities,
        ViewId::DeliveryVsDineIn,
        ViewId::IndiaOnlineDeliverySpending,
        ViewId::IndiaDineInExpenditure,
        ViewId::CityAverageCost,
    ];

    /// 1-based position in the selector.
    pub fn number(self) -> u8 {
        match self {
            ViewId::TopCitiesByCount => 1,
            ViewId::OnlineDeliveryCount => 2,
            ViewId::CostlyCuisinesInIndia => 3,
            ViewId::CommonCuisinePerCity => 4,
            ViewId::CuisineAverageCost => 5,
            ViewId::RatingsInTopCities => 6,
            ViewId::DeliveryVsDineIn => 7,
            ViewId::IndiaOnlineDeliverySpending => 8,
            ViewId::IndiaDineInExpenditure => 9,
            ViewId::CityAverageCost => 10,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        ViewId::ALL.into_iter().find(|v| v.number() == n)
    }

    /// Exact selector label.
    pub fn label(self) -> &'static str {
        match self {
            ViewId::TopCitiesByCount => "1. Top 5 Cities by Count of Restaurants",
            ViewId::OnlineDeliveryCount => "2. Count of Restaurants Offering Online Delivery",
            ViewId::CostlyCuisinesInIndia => "3. Top 10 Costly Cuisines in India",
            ViewId::CommonCuisinePerCity => "4. The most common cuisine in each city",
            ViewId::CuisineAverageCost => "5. Top 10 Average Cost for Two for Each Cuisine",
            ViewId::RatingsInTopCities => "6. Rating Count in Top 5 Cities",
            ViewId::DeliveryVsDineIn => "7. Online Delivery vs. Dine-In",
            ViewId::IndiaOnlineDeliverySpending => {
                "8. Top 10 Cities by Online Delivery Spending in India"
            }
            ViewId::IndiaDineInExpenditure => "9. Total Dine-in Expenditure by City in India",
            ViewId::CityAverageCost => "10. Top 10 Cities by Average Cost for Two",
        }
    }
}

impl From<ViewId> for u8 {
    fn from(view: ViewId) -> Self {
        view.number()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts `"1"`..`"10"` or an exact label.
impl FromStr for ViewId {
    type Err = ViewParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.parse::<u8>()
            .ok()
            .and_then(ViewId::from_number)
            .or_else(|| ViewId::ALL.into_iter().find(|v| v.label() == s))
            .ok_or_else(|| ViewParseError(s.to_string()))
    }
}

// =============================================================================
// Results
// =============================================================================

/// The single metric column of a result row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    /// Number of rows.
    Count(u64),
    /// Sum or mean of a numeric column; `None` for a mean over no values.
    Amount(Option<f64>),
}

impl Metric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Metric::Count(n) => Some(*n as f64),
            Metric::Amount(v) => *v,
        }
    }

    /// Larger first, missing amounts last.
    pub fn cmp_desc(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Metric::Count(a), Metric::Count(b)) => b.cmp(a),
            _ => frame::cmp_amount_desc(self.as_f64(), other.as_f64()),
        }
    }
}

/// One output row: grouping key(s) then the metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub keys: Vec<Option<String>>,
    pub value: Metric,
}

impl ResultRow {
    pub fn new(keys: Vec<Option<&str>>, value: Metric) -> Self {
        Self {
            keys: keys.into_iter().map(|k| k.map(String::from)).collect(),
            value,
        }
    }

    pub fn key(&self, i: usize) -> Option<&str> {
        self.keys.get(i).and_then(|k| k.as_deref())
    }
}

/// Output of one recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    pub view: ViewId,
    /// Key column names followed by the metric column name.
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
    pub hints: RenderHints,
}

impl AggregationResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn empty_warning(&self) -> Option<EmptyResultWarning> {
        self.is_empty().then_some(EmptyResultWarning { view: self.view })
    }

    /// Rows as JSON objects keyed by column name.
    pub fn records(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::new();
                for (name, key) in self.columns.iter().zip(&row.keys) {
                    obj.insert(name.clone(), serde_json::json!(key));
                }
                if let Some(metric) = self.columns.get(row.keys.len()) {
                    obj.insert(metric.clone(), serde_json::json!(row.value));
                }
                serde_json::Value::Object(obj)
            })
            .collect()
    }
}

// =============================================================================
// Render Hints
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Map,
}

/// A map pin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPoint {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// What the drawing collaborator needs besides the rows.
///
/// For pie charts `x_field` names the slices and `y_field` sizes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderHints {
    pub chart: ChartKind,
    pub title: String,
    pub x_field: String,
    pub y_field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_field: Option<String>,
    /// Number format for `text_field` labels, e.g. `.2s` (SI, two significant digits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_center: Option<[f64; 2]>,
    /// Initial map zoom level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<u8>,
    /// Group nearby markers into clusters.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cluster: bool,
}

impl RenderHints {
    fn new(chart: ChartKind, title: &str, x_field: &str, y_field: &str) -> Self {
        Self {
            chart,
            title: title.to_string(),
            x_field: x_field.to_string(),
            y_field: y_field.to_string(),
            color_field: None,
            facet_field: None,
            text_field: None,
            text_format: None,
            text_position: None,
            y_label: None,
            category_order: None,
            markers: Vec::new(),
            map_center: None,
            zoom: None,
            cluster: false,
        }
    }

    pub fn bar(title: &str, x_field: &str, y_field: &str) -> Self {
        Self::new(ChartKind::Bar, title, x_field, y_field)
    }

    pub fn pie(title: &str, names_field: &str, values_field: &str) -> Self {
        Self::new(ChartKind::Pie, title, names_field, values_field)
    }

    pub fn map(title: &str, markers: Vec<MarkerPoint>, center: Option<[f64; 2]>) -> Self {
        let mut hints = Self::new(ChartKind::Map, title, "Longitude", "Latitude");
        hints.markers = markers;
        hints.map_center = center;
        hints
    }

    pub fn with_color(mut self, field: &str) -> Self {
        self.color_field = Some(field.to_string());
        self
    }

    pub fn with_facet(mut self, field: &str) -> Self {
        self.facet_field = Some(field.to_string());
        self
    }

    pub fn with_text(mut self, field: &str) -> Self {
        self.text_field = Some(field.to_string());
        self
    }

    pub fn with_text_format(mut self, format: &str, position: &str) -> Self {
        self.text_format = Some(format.to_string());
        self.text_position = Some(position.to_string());
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = Some(zoom);
        self
    }

    pub fn with_clustered_markers(mut self) -> Self {
        self.cluster = true;
        self
    }

    pub fn with_y_label(mut self, label: &str) -> Self {
        self.y_label = Some(label.to_string());
        self
    }

    pub fn with_category_order(mut self, order: &[&str]) -> Self {
        self.category_order = Some(order.iter().map(|s| s.to_string()).collect());
        self
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Run the recipe for `view` against `table`.
pub fn aggregate(table: &EnrichedTable, view: ViewId) -> AggregationResult {
    match view {
        ViewId::TopCitiesByCount => recipes::top_cities_by_count(table),
        ViewId::OnlineDeliveryCount => recipes::online_delivery_count(table),
        ViewId::CostlyCuisinesInIndia => recipes::costly_cuisines_in_india(table),
        ViewId::CommonCuisinePerCity => recipes::common_cuisine_per_city(table),
        ViewId::CuisineAverageCost => recipes::cuisine_average_cost(table),
        ViewId::RatingsInTopCities => recipes::ratings_in_top_cities(table),
        ViewId::DeliveryVsDineIn => recipes::delivery_vs_dine_in(table),
        ViewId::IndiaOnlineDeliverySpending => recipes::india_online_delivery_spending(table),
        ViewId::IndiaDineInExpenditure => recipes::india_dine_in_expenditure(table),
        ViewId::CityAverageCost => recipes::city_average_cost(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_number_and_label() {
        assert_eq!("1".parse::<ViewId>().unwrap(), ViewId::TopCitiesByCount);
        assert_eq!(" 10 ".parse::<ViewId>().unwrap(), ViewId::CityAverageCost);
        assert_eq!(
            "7. Online Delivery vs. Dine-In".parse::<ViewId>().unwrap(),
            ViewId::DeliveryVsDineIn
        );
        assert!("0".parse::<ViewId>().is_err());
        assert!("11".parse::<ViewId>().is_err());
        assert!("Online Delivery".parse::<ViewId>().is_err());
    }

    #[test]
    fn test_numbers_and_labels_line_up() {
        for (i, view) in ViewId::ALL.iter().enumerate() {
            assert_eq!(view.number() as usize, i + 1);
            assert!(view.label().starts_with(&format!("{}. ", i + 1)));
        }
    }

    #[test]
    fn test_metric_order() {
        let mut metrics = vec![
            Metric::Amount(Some(2.0)),
            Metric::Amount(None),
            Metric::Amount(Some(9.0)),
        ];
        metrics.sort_by(Metric::cmp_desc);
        assert_eq!(
            metrics,
            vec![
                Metric::Amount(Some(9.0)),
                Metric::Amount(Some(2.0)),
                Metric::Amount(None)
            ]
        );
        assert_eq!(Metric::Count(3).cmp_desc(&Metric::Count(5)), Ordering::Greater);
    }

    #[test]
    fn test_records_keyed_by_column() {
        let result = AggregationResult {
            view: ViewId::TopCitiesByCount,
            columns: vec!["City".into(), "Count".into()],
            rows: vec![ResultRow::new(vec![Some("Delhi")], Metric::Count(4))],
            hints: RenderHints::bar("t", "City", "Count"),
        };
        assert_eq!(
            result.records(),
            vec![serde_json::json!({ "City": "Delhi", "Count": 4 })]
        );
        assert_eq!(result.empty_warning(), None);
    }

    #[test]
    fn test_view_serializes_as_number() {
        let json = serde_json::to_value(ViewId::IndiaDineInExpenditure).unwrap();
        assert_eq!(json, serde_json::json!(9));
    }

    #[test]
    fn test_map_hints_serialize_zoom_and_cluster() {
        let map = RenderHints::map("m", Vec::new(), Some([1.0, 2.0]))
            .with_zoom(10)
            .with_clustered_markers();
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["zoom"], 10);
        assert_eq!(json["cluster"], true);
        assert_eq!(json["mapCenter"], serde_json::json!([1.0, 2.0]));

        let bar = serde_json::to_value(RenderHints::bar("b", "x", "y")).unwrap();
        assert!(bar.get("cluster").is_none());
        assert!(bar.get("zoom").is_none());
        assert!(bar.get("textFormat").is_none());
    }
}
