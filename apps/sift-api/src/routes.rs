use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use sift_service::{Candidate, EnrichedRecord, Error as ServiceError, RecordIds, SearchQuery};

#[derive(Debug, Deserialize)]
pub struct FetchByIdsRequest {
	pub collection: String,
	pub ids: RecordIds,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse<T> {
	pub results: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
	pub summary: String,
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/search-docs", post(search_docs))
		.route("/search-docs/summary", post(search_docs_summary))
		.route("/search_company_knowledge", post(search_company_knowledge))
		.route("/fetch_data_by_ids", post(fetch_data_by_ids))
		.route("/knowledge_summary", post(knowledge_summary))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_docs(
	State(state): State<AppState>,
	payload: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<ResultsResponse<Candidate>>, ApiError> {
	let Json(query) = payload?;
	let results = state.service.search_logic(&query).await?;

	Ok(Json(ResultsResponse { results }))
}

async fn search_docs_summary(
	State(state): State<AppState>,
	payload: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
	let Json(query) = payload?;
	let summary = state.service.search_summary(&query).await?;

	Ok(Json(SummaryResponse { summary }))
}

async fn search_company_knowledge(
	State(state): State<AppState>,
	payload: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<ResultsResponse<Candidate>>, ApiError> {
	let Json(query) = payload?;
	let results = state.service.search_target_table(&query.query_text, None).await?;

	Ok(Json(ResultsResponse { results }))
}

async fn fetch_data_by_ids(
	State(state): State<AppState>,
	payload: Result<Json<FetchByIdsRequest>, JsonRejection>,
) -> Result<Json<ResultsResponse<EnrichedRecord>>, ApiError> {
	let Json(request) = payload?;
	let results = state.service.fetch_data_by_ids(&request.collection, request.ids).await;

	Ok(Json(ResultsResponse { results }))
}

async fn knowledge_summary(
	State(state): State<AppState>,
	payload: Result<Json<SearchQuery>, JsonRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
	let Json(query) = payload?;
	let summary = state.service.knowledge_summary(&query.query_text).await?;

	Ok(Json(SummaryResponse { summary }))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	detail: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	detail: String,
}
impl ApiError {
	fn new(status: StatusCode, detail: impl Into<String>) -> Self {
		Self { status, detail: detail.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				Self::new(StatusCode::UNPROCESSABLE_ENTITY, message),
			err => {
				tracing::error!(error = %err, "Request failed.");

				Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
			},
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(ErrorBody { detail: self.detail })).into_response()
	}
}
