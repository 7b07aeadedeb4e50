use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use mixmaster_domain::{AlcoholicStatus, CanonicalRecord, FilterSpec, Selection, SourceKind};
use mixmaster_service::{Error as ServiceError, SearchRequest, SearchResponse};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/catalog/search", get(search))
		.route("/v1/catalog/random", get(random))
		.route("/v1/catalog/{source}/{id}", get(record))
		.route("/v1/favorites", get(favorites))
		.route("/v1/favorites/{id}/toggle", post(toggle_favorite))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/invalidate_cache", post(invalidate_cache)).with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
	pub search: Option<String>,
	pub alcoholic: Option<String>,
	pub category: Option<String>,
	pub favorites_only: Option<bool>,
}
impl SearchParams {
	fn into_request(self) -> Result<SearchRequest, ApiError> {
		let alcoholic_type = match non_blank(self.alcoholic) {
			Some(raw) => raw.parse::<Selection<AlcoholicStatus>>().map_err(|err| {
				json_error(
					StatusCode::BAD_REQUEST,
					"invalid_request",
					format!("Invalid alcoholic filter: {err}."),
					Some(vec!["alcoholic".to_string()]),
				)
			})?,
			None => Selection::All,
		};
		let category = match non_blank(self.category) {
			Some(raw) if raw.eq_ignore_ascii_case("all") => Selection::All,
			Some(raw) => Selection::Only(raw),
			None => Selection::All,
		};
		let filter = FilterSpec {
			alcoholic_type,
			category,
			favorites_only: self.favorites_only.unwrap_or(false),
		};

		Ok(SearchRequest { term: self.search.unwrap_or_default(), filter })
	}
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
	pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
	pub id: String,
	pub favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
	pub dropped: usize,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
	let request = params.into_request()?;

	Ok(Json(state.service.search(request).await))
}

async fn random(State(state): State<AppState>) -> Result<Json<CanonicalRecord>, ApiError> {
	let record = state.service.random().await.ok_or_else(|| {
		json_error(
			StatusCode::SERVICE_UNAVAILABLE,
			"source_unavailable",
			"No random record is available.",
			None,
		)
	})?;

	Ok(Json(record))
}

async fn record(
	State(state): State<AppState>,
	Path((source, id)): Path<(String, String)>,
) -> Result<Json<CanonicalRecord>, ApiError> {
	let kind: SourceKind = source.parse().map_err(|_| {
		json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"source must be one of remote or local.",
			Some(vec!["source".to_string()]),
		)
	})?;
	let record = state.service.record(kind, &id).await?.ok_or_else(|| {
		json_error(StatusCode::NOT_FOUND, "not_found", format!("No {kind} record {id}."), None)
	})?;

	Ok(Json(record))
}

async fn favorites(State(state): State<AppState>) -> Json<FavoritesResponse> {
	let ids = state.service.favorites_snapshot().iter().map(str::to_string).collect();

	Json(FavoritesResponse { ids })
}

async fn toggle_favorite(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
	let id = id.trim().to_string();

	if id.is_empty() {
		return Err(json_error(
			StatusCode::BAD_REQUEST,
			"invalid_request",
			"id is required.",
			Some(vec!["id".to_string()]),
		));
	}

	let service = state.service.clone();
	let key = id.clone();
	// The medium is synchronous and may touch the disk.
	let favorite = tokio::task::spawn_blocking(move || service.toggle_favorite(&key))
		.await
		.map_err(|err| {
			tracing::error!(error = %err, "Favorite toggle task failed.");

			json_error(
				StatusCode::INTERNAL_SERVER_ERROR,
				"internal_error",
				"Internal error.",
				None,
			)
		})?;

	Ok(Json(ToggleResponse { id, favorite }))
}

async fn invalidate_cache(State(state): State<AppState>) -> Json<InvalidateResponse> {
	let dropped = state.service.cache.len();

	state.service.invalidate();

	Json(InvalidateResponse { dropped })
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	pub fn status(&self) -> StatusCode {
		self.status
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::Source { message } => {
				tracing::warn!(error = %message, "Catalog source request failed.");

				json_error(StatusCode::BAD_GATEWAY, "source_unavailable", message, None)
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Favorites storage failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal_error",
					"Internal error.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError { status, error_code: code.to_string(), message: message.into(), fields }
}
