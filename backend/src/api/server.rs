//! HTTP Server for the license query API.
//!
//! # API Endpoints
//!
//! | Method | Path                    | Description                                   |
//! |--------|-------------------------|-----------------------------------------------|
//! | GET    | `/shiplist`             | Vessel licenses, filtered                     |
//! | GET    | `/shiplist/expiring`    | Vessel licenses with `daysRemaining`          |
//! | GET    | `/companies/{file_no}`  | Vessel licenses of one file number            |
//! | GET    | `/concessions`          | Distinct concessions                          |
//! | GET    | `/concessions/{name}`   | Vessel licenses whose concession contains name|
//! | GET    | `/licenselist`          | Land licenses, filtered, list or grouped      |
//! | GET    | `/licenselist/expiring` | Land licenses with `daysRemaining`            |
//! | GET    | `/regions`              | Distinct regions                              |
//! | GET    | `/regions/{name}`       | Land licenses whose region contains name      |
//! | GET    | `/health`               | Health check                                  |
//! | GET    | `/logs`                 | SSE stream of query logs                      |

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, Method},
    response::{
        sse::{Event, KeepAlive},
        Json, Sse,
    },
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::Value;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_success, LOG_BROADCASTER};
use super::types::HealthResponse;
use crate::config::{listen_addr, AppConfig};
use crate::error::{ServerError, ServerResult};
use crate::models::Row;
use crate::query::{LandFilters, VesselFilters};
use crate::transform::{LicenseListing, QueryService};

/// Shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    service: Arc<QueryService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            service: Arc::new(QueryService::new(config)),
        }
    }
}

/// All routes, with permissive CORS for read-only GETs.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/logs", get(sse_logs))
        .route("/shiplist", get(shiplist))
        .route("/shiplist/expiring", get(shiplist_expiring))
        .route("/companies/{file_no}", get(company))
        .route("/concessions", get(concessions))
        .route("/concessions/{name}", get(concession))
        .route("/licenselist", get(licenselist))
        .route("/licenselist/expiring", get(licenselist_expiring))
        .route("/regions", get(regions))
        .route("/regions/{name}", get(region))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = listen_addr(port);
    log_info(format!("shiplist:    {}", config.sources.shiplist.display()));
    log_info(format!("licenselist: {}", config.sources.licenselist.display()));
    log_info(format!(
        "group licenses: {}, validate output: {}",
        config.output.group_licenses, config.output.validate
    ));

    let app = router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log_success(format!("JKPTG API running on http://localhost:{}", port));

    axum::serve(listener, app).await?;

    Ok(())
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> ServerResult<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let output = state.service.output();
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "jkptg".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        group_licenses: output.group_licenses,
        validate_output: output.validate,
    })
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// =============================================================================
// Vessel licenses
// =============================================================================

async fn shiplist(
    State(state): State<AppState>,
    query: Result<Query<VesselFilters>, QueryRejection>,
) -> ServerResult<Json<Vec<Row>>> {
    let filters = query_params(query)?;
    Ok(Json(state.service.ships(&filters).await?))
}

async fn shiplist_expiring(State(state): State<AppState>) -> ServerResult<Json<Vec<Row>>> {
    Ok(Json(state.service.ships_expiring().await?))
}

async fn company(
    State(state): State<AppState>,
    Path(file_no): Path<String>,
) -> ServerResult<Json<Vec<Row>>> {
    Ok(Json(state.service.ships_by_file_no(&file_no).await?))
}

async fn concessions(State(state): State<AppState>) -> ServerResult<Json<Vec<Value>>> {
    Ok(Json(state.service.concessions().await?))
}

async fn concession(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ServerResult<Json<Vec<Row>>> {
    Ok(Json(state.service.ships_by_concession(&name).await?))
}

// =============================================================================
// Land licenses
// =============================================================================

async fn licenselist(
    State(state): State<AppState>,
    query: Result<Query<LandFilters>, QueryRejection>,
) -> ServerResult<Json<LicenseListing>> {
    let filters = query_params(query)?;
    Ok(Json(state.service.licenses(&filters).await?))
}

async fn licenselist_expiring(State(state): State<AppState>) -> ServerResult<Json<LicenseListing>> {
    Ok(Json(state.service.licenses_expiring().await?))
}

async fn regions(State(state): State<AppState>) -> ServerResult<Json<Vec<Value>>> {
    Ok(Json(state.service.regions().await?))
}

async fn region(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ServerResult<Json<LicenseListing>> {
    Ok(Json(state.service.licenses_by_region(&name).await?))
}
