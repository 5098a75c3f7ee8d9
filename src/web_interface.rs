use crate::{
    aggregation::AggregationEngine,
    store::PointStore,
    util::{config::get_config, ApiError},
};
use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[derive(Clone, FromRef)]
struct AppState {
    engine: AggregationEngine,
}

#[derive(Debug, Default, Deserialize)]
struct MeasurementParams {
    field: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl MeasurementParams {
    fn field(&self) -> &str {
        self.field.as_deref().unwrap_or_default()
    }

    // empty parameters are treated as absent
    fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref().filter(|s| !s.is_empty())
    }

    fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref().filter(|s| !s.is_empty())
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn measurements(
    engine: State<AggregationEngine>,
    Query(params): Query<MeasurementParams>,
) -> Result<impl IntoResponse, ApiError> {
    let field = params.field();
    let days = engine
        .daily_averages(field, params.start_date(), params.end_date())
        .await?;

    let result: Vec<Value> = days
        .into_iter()
        .map(|day| {
            let mut entry = Map::new();
            entry.insert("timestamp".into(), format_timestamp(day.timestamp).into());
            entry.insert(field.to_string(), day.value.into());
            entry.insert("date".into(), day.date.into());
            Value::Object(entry)
        })
        .collect();

    Ok(Json(result))
}

async fn measurement_metrics(
    engine: State<AggregationEngine>,
    Query(params): Query<MeasurementParams>,
) -> Result<impl IntoResponse, ApiError> {
    let metrics = engine
        .channel_metrics(params.field(), params.start_date(), params.end_date())
        .await?;

    Ok(Json(metrics))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

pub fn router(engine: AggregationEngine) -> Router {
    Router::new()
        .route("/api/measurements", get(measurements))
        .route("/api/measurements/metrics", get(measurement_metrics))
        .fallback(not_found)
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine })
}

pub async fn start_server(store: PointStore, http_addr: String) -> anyhow::Result<()> {
    let query_timeout = Duration::from_secs(get_config().get_int("query_timeout_secs")?.try_into()?);
    let engine = AggregationEngine::new(store).with_deadline(query_timeout);

    info!("Starting web server @ {}", http_addr);

    let app = router(engine);

    let listener = TcpListener::bind(&http_addr).await?;
    info!("Listening on {}", &http_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dto::Point, util::memory_store};
    use axum::response::Response;
    use chrono::TimeZone;

    async fn engine() -> AggregationEngine {
        let store = memory_store().await;
        let at = |day, hour| {
            Utc.with_ymd_and_hms(2020, 1, day, hour, 0, 0)
                .unwrap()
                .timestamp_nanos_opt()
                .unwrap()
        };
        let points = [(at(1, 0), 10.0), (at(1, 12), 20.0), (at(2, 0), 30.0)].map(
            |(timestamp, value)| Point {
                timestamp,
                channel_1: Some(value),
                channel_2: None,
                channel_3: None,
            },
        );
        store.insert_batch_if_absent(&points).await.unwrap();
        AggregationEngine::new(store)
    }

    fn params(field: &str, start_date: Option<&str>, end_date: Option<&str>) -> Query<MeasurementParams> {
        Query(MeasurementParams {
            field: Some(field.to_string()),
            start_date: start_date.map(str::to_string),
            end_date: end_date.map(str::to_string),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn timestamps_render_as_utc_millis() {
        let timestamp = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(timestamp), "2020-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn measurements_are_keyed_by_field() {
        let response = measurements(State(engine().await), params("field1", None, None))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([
                {"timestamp": "2020-01-01T00:00:00.000Z", "field1": 15.0, "date": "2020-01-01"},
                {"timestamp": "2020-01-02T00:00:00.000Z", "field1": 30.0, "date": "2020-01-02"},
            ])
        );
    }

    #[tokio::test]
    async fn empty_dates_are_ignored() {
        let response = measurements(State(engine().await), params("field1", Some(""), Some("")))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn metrics_use_api_names() {
        let response = measurement_metrics(
            State(engine().await),
            params("field1", Some("2020-01-01"), Some("2020-01-01T12:00")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["avg"], 15.0);
        assert_eq!(body["min"], 10.0);
        assert_eq!(body["max"], 20.0);
        assert!((body["stdDev"].as_f64().unwrap() - 50f64.sqrt()).abs() < 1e-9);
    }

    #[tokio::test]
    async fn validation_errors_are_client_errors() {
        let engine = engine().await;

        let response = measurements(State(engine.clone()), params("field7", None, None))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "Invalid field \"field7\""}));

        let response = measurement_metrics(State(engine.clone()), Query(MeasurementParams::default()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = measurement_metrics(State(engine), params("field1", Some("someday"), None))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failures_are_server_errors() {
        let store = memory_store().await;
        store.close().await;

        let response = measurement_metrics(
            State(AggregationEngine::new(store)),
            params("field1", None, None),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "Server error"}));
    }
}
