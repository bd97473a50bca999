//! One function per view.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::frame::{cmp_nulls_last, explode, group_by, value_counts, Accumulator, GroupOrder};
use super::{AggregationResult, MarkerPoint, Metric, RenderHints, ResultRow, ViewId};
use crate::models::{
    EnrichedRow, EnrichedTable, COL_CITY, COL_COST_FOR_TWO, COL_CUISINES, COL_ONLINE_DELIVERY,
    COL_RATING_TEXT, INDIA,
};

const COL_COUNT: &str = "Count";
const COL_CUISINE: &str = "Cuisine";

/// Display order of the rating categories.
pub const RATING_ORDER: [&str; 5] = ["Excellent", "Very Good", "Good", "Average", "Not rated"];

/// Separator inside the cuisines cell.
const CUISINE_SEPARATOR: &str = ", ";

/// Label used on map markers for rows without a city.
const MISSING_CITY: &str = "(missing city)";

const MAP_ZOOM: u8 = 10;

fn result(
    view: ViewId,
    columns: &[&str],
    rows: Vec<ResultRow>,
    hints: RenderHints,
) -> AggregationResult {
    AggregationResult {
        view,
        columns: columns.iter().map(|c| c.to_string()).collect(),
        rows,
        hints,
    }
}

fn sort_desc_top(mut rows: Vec<ResultRow>, n: usize) -> Vec<ResultRow> {
    rows.sort_by(|a, b| a.value.cmp_desc(&b.value));
    rows.truncate(n);
    rows
}

fn count_rows<'a>(counts: Vec<(Option<&'a str>, u64)>) -> Vec<ResultRow> {
    counts
        .into_iter()
        .map(|(key, n)| ResultRow::new(vec![key], Metric::Count(n)))
        .collect()
}

fn india_rows(table: &EnrichedTable) -> impl Iterator<Item = &EnrichedRow> {
    table.rows().iter().filter(|r| r.is_in(INDIA))
}

fn cost_by<'a, I, F>(rows: I, key: F) -> Vec<(Option<&'a str>, Accumulator)>
where
    I: Iterator<Item = &'a EnrichedRow>,
    F: Fn(&'a EnrichedRow) -> Option<&'a str>,
{
    group_by(
        rows.map(|r| (key(r), r.restaurant.average_cost_for_two)),
        GroupOrder::KeyAscending,
    )
}

fn city(row: &EnrichedRow) -> Option<&str> {
    row.restaurant.city.as_deref()
}

fn cuisines(row: &EnrichedRow) -> Option<&str> {
    row.restaurant.cuisines.as_deref()
}

// =============================================================================
// Counts
// =============================================================================

/// 1: restaurants per city, top 5.
pub fn top_cities_by_count(table: &EnrichedTable) -> AggregationResult {
    let mut rows = count_rows(value_counts(table.rows().iter().map(city)));
    rows.truncate(5);

    result(
        ViewId::TopCitiesByCount,
        &[COL_CITY, COL_COUNT],
        rows,
        RenderHints::bar("Top 5 Cities by Count of Restaurants", COL_CITY, COL_COUNT)
            .with_color(COL_CITY),
    )
}

fn delivery_counts(table: &EnrichedTable) -> Vec<ResultRow> {
    count_rows(value_counts(
        table
            .rows()
            .iter()
            .map(|r| r.restaurant.has_online_delivery.as_deref()),
    ))
}

/// 2: restaurants per online-delivery flag.
pub fn online_delivery_count(table: &EnrichedTable) -> AggregationResult {
    result(
        ViewId::OnlineDeliveryCount,
        &[COL_ONLINE_DELIVERY, COL_COUNT],
        delivery_counts(table),
        RenderHints::bar(
            "Count of Restaurants Offering Online Delivery",
            COL_ONLINE_DELIVERY,
            COL_COUNT,
        )
        .with_color(COL_ONLINE_DELIVERY),
    )
}

/// 7: the view 2 counts as proportions.
pub fn delivery_vs_dine_in(table: &EnrichedTable) -> AggregationResult {
    result(
        ViewId::DeliveryVsDineIn,
        &[COL_ONLINE_DELIVERY, COL_COUNT],
        delivery_counts(table),
        RenderHints::pie("Online Delivery vs. Dine-In", COL_ONLINE_DELIVERY, COL_COUNT),
    )
}

/// 6: rating counts within the five busiest cities.
///
/// Rows follow the rating display order, then city.
pub fn ratings_in_top_cities(table: &EnrichedTable) -> AggregationResult {
    let top: HashSet<Option<&str>> = value_counts(table.rows().iter().map(city))
        .into_iter()
        .take(5)
        .map(|(key, _)| key)
        .collect();

    let mut groups = group_by(
        table
            .rows()
            .iter()
            .filter(|r| top.contains(&city(*r)))
            .map(|r| ((city(r), r.restaurant.rating_text.as_deref()), None)),
        GroupOrder::KeyAscending,
    );
    groups.sort_by(|((city_a, rating_a), _), ((city_b, rating_b), _)| {
        cmp_rating(*rating_a, *rating_b).then_with(|| cmp_nulls_last(*city_a, *city_b))
    });

    let rows = groups
        .into_iter()
        .map(|((city, rating), acc)| ResultRow::new(vec![city, rating], Metric::Count(acc.rows)))
        .collect();

    result(
        ViewId::RatingsInTopCities,
        &[COL_CITY, COL_RATING_TEXT, COL_COUNT],
        rows,
        RenderHints::bar("Rating Count in Top 5 Cities", COL_CITY, COL_COUNT)
            .with_color(COL_RATING_TEXT)
            .with_facet(COL_RATING_TEXT)
            .with_category_order(&RATING_ORDER),
    )
}

/// Known ratings in display order, then other text ascending, then missing.
fn cmp_rating(a: Option<&str>, b: Option<&str>) -> Ordering {
    rating_rank(a)
        .cmp(&rating_rank(b))
        .then_with(|| cmp_nulls_last(a, b))
}

fn rating_rank(rating: Option<&str>) -> usize {
    match rating {
        Some(text) => RATING_ORDER
            .iter()
            .position(|r| *r == text)
            .unwrap_or(RATING_ORDER.len()),
        None => RATING_ORDER.len() + 1,
    }
}

// =============================================================================
// Cost aggregations
// =============================================================================

/// 3: mean cost per raw cuisines string among Indian restaurants, top 10.
pub fn costly_cuisines_in_india(table: &EnrichedTable) -> AggregationResult {
    let groups = cost_by(india_rows(table).filter(|r| cuisines(r).is_some()), cuisines);
    let rows = groups
        .into_iter()
        .map(|(key, acc)| ResultRow::new(vec![key], Metric::Amount(acc.mean())))
        .collect();

    result(
        ViewId::CostlyCuisinesInIndia,
        &[COL_CUISINES, COL_COST_FOR_TWO],
        sort_desc_top(rows, 10),
        RenderHints::bar("Top 10 Costly Cuisines in India", COL_CUISINES, COL_COST_FOR_TWO)
            .with_color(COL_CUISINES)
            .with_text(COL_COST_FOR_TWO)
            .with_text_format(".2s", "outside")
            .with_y_label("Average Cost"),
    )
}

/// 5: mean cost per raw cuisines string, top 10.
pub fn cuisine_average_cost(table: &EnrichedTable) -> AggregationResult {
    let with_cuisines = table.rows().iter().filter(|r| cuisines(r).is_some());
    let rows = cost_by(with_cuisines, cuisines)
        .into_iter()
        .map(|(key, acc)| ResultRow::new(vec![key], Metric::Amount(acc.mean())))
        .collect();

    result(
        ViewId::CuisineAverageCost,
        &[COL_CUISINES, COL_COST_FOR_TWO],
        sort_desc_top(rows, 10),
        RenderHints::bar("Top 10 Costliest Cuisines", COL_CUISINES, COL_COST_FOR_TWO)
            .with_color(COL_CUISINES),
    )
}

fn india_city_totals(table: &EnrichedTable) -> Vec<ResultRow> {
    let rows = cost_by(india_rows(table), city)
        .into_iter()
        .map(|(key, acc)| ResultRow::new(vec![key], Metric::Amount(Some(acc.sum))))
        .collect();
    sort_desc_top(rows, 10)
}

/// 8: total cost for two per Indian city, top 10.
pub fn india_online_delivery_spending(table: &EnrichedTable) -> AggregationResult {
    result(
        ViewId::IndiaOnlineDeliverySpending,
        &[COL_CITY, COL_COST_FOR_TWO],
        india_city_totals(table),
        RenderHints::bar(
            "Top 10 Cities by Online Delivery Spending in India",
            COL_CITY,
            COL_COST_FOR_TWO,
        )
        .with_color(COL_COST_FOR_TWO),
    )
}

/// 9: same totals as view 8 under a dine-in title.
pub fn india_dine_in_expenditure(table: &EnrichedTable) -> AggregationResult {
    result(
        ViewId::IndiaDineInExpenditure,
        &[COL_CITY, COL_COST_FOR_TWO],
        india_city_totals(table),
        RenderHints::bar(
            "Total Dine-in Expenditure by City in India",
            COL_CITY,
            COL_COST_FOR_TWO,
        )
        .with_color(COL_CITY),
    )
}

/// 10: mean cost for two per city, top 10.
pub fn city_average_cost(table: &EnrichedTable) -> AggregationResult {
    let rows = cost_by(table.rows().iter(), city)
        .into_iter()
        .map(|(key, acc)| ResultRow::new(vec![key], Metric::Amount(acc.mean())))
        .collect();

    result(
        ViewId::CityAverageCost,
        &[COL_CITY, COL_COST_FOR_TWO],
        sort_desc_top(rows, 10),
        RenderHints::bar("Top 10 Cities by Average Cost for Two", COL_CITY, COL_COST_FOR_TWO)
            .with_y_label("Average Cost for Two"),
    )
}

// =============================================================================
// Map
// =============================================================================

/// 4: most common single cuisine per city, pinned at the city centroid.
///
/// Rows are in city order. Ties on count go to the alphabetically first
/// cuisine.
pub fn common_cuisine_per_city(table: &EnrichedTable) -> AggregationResult {
    let rows: Vec<&EnrichedRow> = table.rows().iter().filter(|r| cuisines(r).is_some()).collect();

    let cells = rows
        .iter()
        .enumerate()
        .filter_map(|(i, &r)| cuisines(r).map(|c| (i, c)));
    let pairs = explode(cells, CUISINE_SEPARATOR)
        .map(|(i, cuisine)| ((city(rows[i]), Some(cuisine)), None));
    let counts = group_by(pairs, GroupOrder::KeyAscending);

    // counts are sorted by (city, cuisine): keep the first maximum per city
    let mut top: Vec<(Option<&str>, &str, u64)> = Vec::new();
    for ((city, cuisine), acc) in counts {
        let cuisine = cuisine.unwrap_or_default();
        match top.last_mut() {
            Some(last) if last.0 == city => {
                if acc.rows > last.2 {
                    *last = (city, cuisine, acc.rows);
                }
            }
            _ => top.push((city, cuisine, acc.rows)),
        }
    }

    let latitudes = centroid_axis(&rows, |r| r.restaurant.latitude);
    let longitudes = centroid_axis(&rows, |r| r.restaurant.longitude);

    let markers = top
        .iter()
        .filter_map(|(city, cuisine, count)| {
            let latitude = latitudes.get(city).and_then(Accumulator::mean)?;
            let longitude = longitudes.get(city).and_then(Accumulator::mean)?;
            Some(MarkerPoint {
                label: format!(
                    "{}: {} ({} restaurants)",
                    city.unwrap_or(MISSING_CITY),
                    cuisine,
                    count
                ),
                latitude,
                longitude,
            })
        })
        .collect();

    let center = map_center(&rows);

    let result_rows = top
        .into_iter()
        .map(|(city, cuisine, count)| ResultRow::new(vec![city, Some(cuisine)], Metric::Count(count)))
        .collect();

    result(
        ViewId::CommonCuisinePerCity,
        &[COL_CITY, COL_CUISINE, COL_COUNT],
        result_rows,
        RenderHints::map("The most common cuisine in each city", markers, center)
            .with_zoom(MAP_ZOOM)
            .with_clustered_markers(),
    )
}

fn centroid_axis<'a, F>(rows: &[&'a EnrichedRow], axis: F) -> HashMap<Option<&'a str>, Accumulator>
where
    F: Fn(&EnrichedRow) -> Option<f64>,
{
    group_by(
        rows.iter().map(|&r| (city(r), axis(r))),
        GroupOrder::FirstSeen,
    )
    .into_iter()
    .collect()
}

fn map_center(rows: &[&EnrichedRow]) -> Option<[f64; 2]> {
    let mut latitude = Accumulator::default();
    let mut longitude = Accumulator::default();
    for row in rows {
        latitude.push(row.restaurant.latitude);
        longitude.push(row.restaurant.longitude);
    }
    Some([latitude.mean()?, longitude.mean()?])
}
