//! Request handlers
//!
//! Every protected handler runs the same stages in a fixed order:
//! authenticate, then rate-limit, then handle. A stage either lets the request
//! proceed or ends it with an [`ApiError`] response.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use sales_data_store::{PageQuery, ID_COLUMN};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::ApiState;

/// Status written into success envelopes
pub const SUCCESS_STATUS: &str = "SUCCESS_RETRIEVING_DATA";

/// Message written into success envelopes
pub const SUCCESS_MESSAGE: &str = "Successfully retrieved the requested data";

/// Largest page a caller may request
pub const MAX_LIMIT: u32 = 1000;

/// Page size when the request names none
pub const DEFAULT_LIMIT: u32 = 5;

const DAY_START_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Body of `POST /<version>/get_data`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataRequest {
    /// Table to read, defaults to the configured destination table
    pub source_table: Option<String>,

    /// Page size, at most [`MAX_LIMIT`]
    pub limit: Option<u32>,

    /// Inclusive lower bound on `created_at`, defaults to today at midnight UTC
    pub start_date: Option<String>,

    /// Inclusive upper bound on `created_at`, defaults to tomorrow at midnight UTC
    pub end_date: Option<String>,

    /// Last id already seen
    pub cursor: Option<i64>,
}

/// Successful `get_data` response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataResponse {
    /// Rows of the page, in `(id, created_at)` order
    pub data: Vec<Map<String, JsonValue>>,

    /// Id of the last row in the page, null for an empty page
    pub next_cursor: Option<i64>,

    /// Outcome code
    pub status: &'static str,

    /// Outcome description
    pub message: &'static str,
}

/// Response of `GET /<version>/users/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    /// Authenticated username
    pub username: String,
}

/// Rate-limit key of the caller: its IP address, or `unknown` without connection info
fn caller_key(connect_info: Option<&ConnectInfo<SocketAddr>>) -> String {
    connect_info.map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string())
}

/// Authenticate, then rate-limit
fn admit(
    state: &ApiState,
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Result<String, ApiError> {
    let username = authenticate(headers, &state.config.admin)?;
    state.limiter.check(&caller_key(connect_info))?;
    Ok(username)
}

fn default_bounds() -> (String, String) {
    let today = Utc::now().date_naive().and_time(NaiveTime::default());
    let tomorrow = today + Duration::days(1);
    (
        today.format(DAY_START_FORMAT).to_string(),
        tomorrow.format(DAY_START_FORMAT).to_string(),
    )
}

fn parse_request(body: &Bytes) -> Result<DataRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DataRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

/// Build the page query a request asks for
pub fn page_query(request: &DataRequest) -> Result<PageQuery, ApiError> {
    let limit = request.limit.unwrap_or(DEFAULT_LIMIT);
    if limit > MAX_LIMIT {
        return Err(ApiError::InvalidRequest(format!(
            "limit {limit} exceeds the maximum of {MAX_LIMIT}"
        )));
    }

    let (start, end) = default_bounds();
    Ok(PageQuery {
        start: request.start_date.clone().unwrap_or(start),
        end: request.end_date.clone().unwrap_or(end),
        cursor: request.cursor.unwrap_or(0),
        limit,
    })
}

/// `POST /<version>/get_data`
pub async fn get_data(
    State(state): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DataResponse>, ApiError> {
    admit(&state, &headers, connect_info.as_ref())?;

    let request = parse_request(&body)?;
    let table = request
        .source_table
        .clone()
        .unwrap_or_else(|| state.config.default_table.clone());
    let page = page_query(&request)?;
    tracing::info!(
        %table,
        start = %page.start,
        end = %page.end,
        cursor = page.cursor,
        limit = page.limit,
        "querying records"
    );

    let data = state.store.query_page(&table, &page).await?;
    if data.is_empty() {
        tracing::warn!(%table, "no records returned");
    }
    let next_cursor = data.last().and_then(|row| row.get(ID_COLUMN)).and_then(JsonValue::as_i64);

    Ok(Json(DataResponse {
        data,
        next_cursor,
        status: SUCCESS_STATUS,
        message: SUCCESS_MESSAGE,
    }))
}

/// `GET /<version>/users/me`
pub async fn users_me(
    State(state): State<ApiState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let username = admit(&state, &headers, connect_info.as_ref())?;
    Ok(Json(UserResponse { username }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_means_defaults() {
        assert_eq!(parse_request(&Bytes::new()).unwrap(), DataRequest::default());
        assert_eq!(parse_request(&Bytes::from_static(b" \n")).unwrap(), DataRequest::default());
        assert!(parse_request(&Bytes::from_static(b"{\"limit\":")).is_err());
    }

    #[test]
    fn test_page_query_defaults_and_limit() {
        let page = page_query(&DataRequest::default()).unwrap();
        assert_eq!(page.limit, DEFAULT_LIMIT);
        assert_eq!(page.cursor, 0);
        assert!(page.start.ends_with(" 00:00:00"));
        assert!(page.start < page.end);

        let too_large = DataRequest {
            limit: Some(MAX_LIMIT + 1),
            ..DataRequest::default()
        };
        assert!(matches!(page_query(&too_large), Err(ApiError::InvalidRequest(_))));
    }
}
