//! JSON endpoints for stops, arrivals and location search.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};
use transit::{
    Arrival, ArrivalQuery, Coordinate, DEFAULT_STOP_LIMIT, DEFAULT_WINDOW_MS, Error,
    GeocodingProvider, Place, TransitProvider, TransitStop, find_nearest_stops, invalid_input,
    query_arrivals,
};

const SUGGESTION_LIMIT: usize = 5;

pub struct AppState<T, G> {
    transit: Arc<T>,
    geocoder: Arc<G>,
}

impl<T, G> Clone for AppState<T, G> {
    fn clone(&self) -> Self {
        Self { transit: Arc::clone(&self.transit), geocoder: Arc::clone(&self.geocoder) }
    }
}

/// Build the service router over the given providers.
pub fn router<T, G>(transit: Arc<T>, geocoder: Arc<G>) -> Router
where
    T: TransitProvider + 'static,
    G: GeocodingProvider + 'static,
{
    Router::new()
        .route("/api/stops", get(stops::<T, G>))
        .route("/api/arrivals", get(arrivals::<T, G>))
        .route("/api/location", get(location::<T, G>))
        .route("/api/location/reverse", get(reverse::<T, G>))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(AppState { transit, geocoder })
}

/// A failed request, rendered as `{"<list>": [], "error": ".."}` with the
/// status of the underlying [`Error`].
#[derive(Debug)]
pub struct HttpError {
    list: Option<&'static str>,
    error: Error,
}

impl HttpError {
    const fn new(list: &'static str, error: Error) -> Self {
        Self { list: Some(list), error }
    }

    const fn bare(error: Error) -> Self {
        Self { list: None, error }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.error.code();
        if status.is_server_error() {
            error!(
                monotonic_counter.request_errors = 1,
                status = status.as_u16(),
                error = %self.error,
                "request failed"
            );
        } else {
            warn!(
                monotonic_counter.request_errors = 1,
                status = status.as_u16(),
                error = %self.error,
                "request rejected"
            );
        }

        let mut body = Map::new();
        if let Some(list) = self.list {
            body.insert(list.to_string(), Value::Array(Vec::new()));
        }
        body.insert("error".to_string(), Value::String(self.error.description()));

        (status, Json(Value::Object(body))).into_response()
    }
}

type HttpResult<T> = Result<Json<T>, HttpError>;

#[derive(Debug, Deserialize)]
struct CoordinateParams {
    lat: Option<String>,
    lng: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Serialize)]
struct StopsReply {
    stops: Vec<TransitStop>,
}

async fn stops<T, G>(
    State(state): State<AppState<T, G>>, Query(params): Query<CoordinateParams>,
) -> HttpResult<StopsReply>
where
    T: TransitProvider,
{
    let fail = |error| HttpError::new("stops", error);

    let origin = coordinate(&params).map_err(fail)?;
    let limit = parse_limit(params.limit.as_deref()).map_err(fail)?.unwrap_or(DEFAULT_STOP_LIMIT);
    let stops = find_nearest_stops(state.transit.as_ref(), origin, limit).await.map_err(fail)?;

    Ok(Json(StopsReply { stops }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalsParams {
    stop_id: Option<String>,
    limit: Option<String>,
    filter_next_hour: Option<String>,
}

#[derive(Debug, Serialize)]
struct ArrivalsReply {
    arrivals: Vec<Arrival>,
}

async fn arrivals<T, G>(
    State(state): State<AppState<T, G>>, Query(params): Query<ArrivalsParams>,
) -> HttpResult<ArrivalsReply>
where
    T: TransitProvider,
{
    let fail = |error| HttpError::new("arrivals", error);

    let Some(stop_id) = params.stop_id else {
        return Err(fail(invalid_input!("stopId parameter is required")));
    };

    let mut query = ArrivalQuery::new(stop_id, Utc::now().timestamp_millis());
    if let Some(limit) = parse_limit(params.limit.as_deref()).map_err(fail)? {
        query = query.limit(limit);
    }
    if params.filter_next_hour.as_deref() == Some("true") {
        query = query.window_ms(DEFAULT_WINDOW_MS);
    }

    let arrivals = query_arrivals(state.transit.as_ref(), &query).await.map_err(fail)?;

    Ok(Json(ArrivalsReply { arrivals }))
}

#[derive(Debug, Deserialize)]
struct LocationParams {
    q: Option<String>,
}

/// Geocoding candidate in Mapbox feature shape.
#[derive(Debug, Serialize)]
struct Suggestion {
    place_name: String,

    /// `[lng, lat]`
    center: [f64; 2],
}

impl From<Place> for Suggestion {
    fn from(place: Place) -> Self {
        Self { place_name: place.label, center: [place.coordinate.lng(), place.coordinate.lat()] }
    }
}

#[derive(Debug, Serialize)]
struct LocationReply {
    suggestions: Vec<Suggestion>,
}

async fn location<T, G>(
    State(state): State<AppState<T, G>>, Query(params): Query<LocationParams>,
) -> HttpResult<LocationReply>
where
    G: GeocodingProvider,
{
    let fail = |error| HttpError::new("suggestions", error);

    let Some(query) = params.q else {
        return Err(fail(invalid_input!("query parameter \"q\" is required")));
    };
    let places =
        geocoding::geocode(state.geocoder.as_ref(), &query, SUGGESTION_LIMIT).await.map_err(fail)?;

    Ok(Json(LocationReply { suggestions: places.into_iter().map(Suggestion::from).collect() }))
}

#[derive(Debug, Serialize)]
struct ReverseReply {
    place_name: String,
}

async fn reverse<T, G>(
    State(state): State<AppState<T, G>>, Query(params): Query<CoordinateParams>,
) -> HttpResult<ReverseReply>
where
    G: GeocodingProvider,
{
    let at = coordinate(&params).map_err(HttpError::bare)?;
    let place_name =
        geocoding::describe_location(state.geocoder.as_ref(), at).await.map_err(HttpError::bare)?;

    Ok(Json(ReverseReply { place_name }))
}

fn coordinate(params: &CoordinateParams) -> transit::Result<Coordinate> {
    let (Some(lat), Some(lng)) = (present(params.lat.as_deref()), present(params.lng.as_deref()))
    else {
        return Err(invalid_input!("latitude and longitude parameters are required"));
    };
    let (Ok(lat), Ok(lng)) = (lat.parse::<f64>(), lng.parse::<f64>()) else {
        return Err(invalid_input!("invalid latitude or longitude values"));
    };

    Coordinate::new(lat, lng)
}

/// Trimmed query value; blank counts as absent.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_limit(value: Option<&str>) -> transit::Result<Option<usize>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    match value.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(Some(limit)),
        _ => Err(invalid_input!("limit must be a positive integer, got {value}")),
    }
}
