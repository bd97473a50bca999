//! HTTP Server for the restodash API.
//!
//! The enriched table is loaded before the server starts and shared
//! read-only between handlers.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | GET    | `/api/views`      | The ten selectable views             |
//! | GET    | `/api/views/{id}` | Rows and render hints for one view   |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, view_list, ViewResponse, ViewSummary};
use crate::dashboard::Dashboard;
use crate::error::{ServerError, ServerResult};
use crate::prepare::DataSources;
use crate::views::ViewId;

/// Build the application router
pub fn router(dashboard: Dashboard) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/views", get(list_views))
        .route("/api/views/{id}", get(show_view))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(dashboard)
}

/// Load both sources, then serve them. A load failure surfaces as
/// [`ServerError::Load`] before any socket is bound.
pub async fn serve(sources: &DataSources, port: u16) -> ServerResult<()> {
    let dashboard = Dashboard::load(sources)?;
    start_server(dashboard, port).await
}

/// Start the HTTP server
pub async fn start_server(dashboard: Dashboard, port: u16) -> ServerResult<()> {
    let rows = dashboard.table().len();
    let app = router(dashboard);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 restodash server running on http://localhost:{}", port);
    println!("   {} restaurants loaded", rows);
    println!("   GET /api/views      - List views");
    println!("   GET /api/views/{{id}} - Render one view");
    println!("   GET /api/logs       - SSE log stream");
    println!("   GET /health         - Health check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(())
}

/// Health check endpoint
async fn health(State(dashboard): State<Dashboard>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "restodash",
        "version": env!("CARGO_PKG_VERSION"),
        "restaurants": dashboard.table().len(),
        "endpoints": {
            "views": "GET /api/views",
            "view": "GET /api/views/{id}",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn list_views() -> Json<Vec<ViewSummary>> {
    Json(view_list())
}

/// Render one view. `id` is the view number or its exact label.
async fn show_view(
    State(dashboard): State<Dashboard>,
    Path(id): Path<String>,
) -> Result<Json<ViewResponse>, (StatusCode, Json<Value>)> {
    let view: ViewId = id.parse().map_err(|e| {
        let err = ServerError::from(e);
        log_error(err.to_string());
        (StatusCode::BAD_REQUEST, Json(error_response(&err.to_string())))
    })?;

    Ok(Json(ViewResponse::from(dashboard.render(view))))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::models::{CountryLookup, RestaurantRecord};
    use crate::prepare::prepare;

    fn dashboard() -> Dashboard {
        let record = |city: &str, cost: f64| RestaurantRecord {
            country_code: 1,
            city: Some(city.to_string()),
            average_cost_for_two: Some(cost),
            ..Default::default()
        };
        let lookup: CountryLookup = vec![(1, "India".to_string())].into_iter().collect();
        Dashboard::from_table(prepare(
            vec![record("A", 100.0), record("A", 200.0), record("B", 50.0)],
            &lookup,
        ))
    }

    #[tokio::test]
    async fn test_show_view_by_number() {
        let Json(response) = show_view(State(dashboard()), Path("8".to_string()))
            .await
            .unwrap();
        assert_eq!(response.view.id, 8);
        assert_eq!(response.status, "ready");
        assert_eq!(response.rows[0], json!({ "City": "A", "Average Cost for two": 300.0 }));
        assert_eq!(response.rows[1], json!({ "City": "B", "Average Cost for two": 50.0 }));
    }

    #[tokio::test]
    async fn test_unknown_view_is_bad_request() {
        let (status, Json(body)) = show_view(State(dashboard()), Path("42".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_health_reports_row_count() {
        let Json(body) = health(State(dashboard())).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["restaurants"], 3);
    }

    #[tokio::test]
    async fn test_serve_reports_load_failure() {
        let sources = DataSources {
            restaurants: "/nonexistent/zomato.csv".into(),
            countries: "/nonexistent/country_codes.csv".into(),
        };
        let err = serve(&sources, 0).await.unwrap_err();
        assert!(matches!(err, ServerError::Load(LoadError::Io { .. })));
    }

    #[tokio::test]
    async fn test_list_views() {
        let Json(views) = list_views().await;
        assert_eq!(views.len(), 10);
    }
}
