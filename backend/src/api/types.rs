//! REST API types for chart and map front ends.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::views::{AggregationResult, RenderHints, ViewId};

/// Selector entry: number plus exact label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSummary {
    pub id: u8,
    pub label: String,
}

impl From<ViewId> for ViewSummary {
    fn from(view: ViewId) -> Self {
        Self {
            id: view.number(),
            label: view.label().to_string(),
        }
    }
}

/// The full selector, in order.
pub fn view_list() -> Vec<ViewSummary> {
    ViewId::ALL.into_iter().map(ViewSummary::from).collect()
}

/// Response for one rendered view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    /// Unique request identifier
    pub request_id: String,

    /// RFC 3339 render time
    pub generated_at: String,

    /// "ready" or "empty"
    pub status: String,

    pub view: ViewSummary,

    /// Key columns followed by the metric column
    pub columns: Vec<String>,

    /// One JSON object per row, keyed by column name
    pub rows: Vec<Value>,

    pub hints: RenderHints,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<AggregationResult> for ViewResponse {
    fn from(result: AggregationResult) -> Self {
        let warning = result.empty_warning().map(|w| w.to_string());
        let rows = result.records();

        ViewResponse {
            request_id: Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            status: if warning.is_some() { "empty" } else { "ready" }.to_string(),
            view: ViewSummary::from(result.view),
            columns: result.columns,
            rows,
            hints: result.hints,
            warning,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "requestId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "rows": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{Metric, ResultRow};

    fn result(rows: Vec<ResultRow>) -> AggregationResult {
        AggregationResult {
            view: ViewId::CityAverageCost,
            columns: vec!["City".into(), "Average Cost for two".into()],
            rows,
            hints: RenderHints::bar("Top 10 Cities by Average Cost for Two", "City", "Average Cost for two"),
        }
    }

    #[test]
    fn test_ready_response_shape() {
        let response = ViewResponse::from(result(vec![ResultRow::new(
            vec![Some("Agra")],
            Metric::Amount(Some(450.0)),
        )]));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "ready");
        assert_eq!(json["view"]["id"], 10);
        assert_eq!(json["rows"][0]["City"], "Agra");
        assert_eq!(json["rows"][0]["Average Cost for two"], 450.0);
        assert_eq!(json["hints"]["chart"], "bar");
        assert_eq!(json["hints"]["xField"], "City");
        assert!(json.get("warning").is_none());
        assert!(json["hints"].get("markers").is_none());
    }

    #[test]
    fn test_empty_response_carries_warning() {
        let response = ViewResponse::from(result(Vec::new()));
        assert_eq!(response.status, "empty");
        assert_eq!(response.warning.as_deref(), Some("View 10 produced no rows"));
    }

    #[test]
    fn test_view_list_order() {
        let list = view_list();
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].label, "1. Top 5 Cities by Count of Restaurants");
        assert_eq!(list[9].id, 10);
    }

    #[test]
    fn test_error_response() {
        let err = error_response("Unknown view '42'");
        assert_eq!(err["status"], "error");
        assert_eq!(err["error"], "Unknown view '42'");
    }
}
