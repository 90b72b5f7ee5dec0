//! JSend envelopes and the extractors every handler shares.
//!
//! Successes render as `{"status":"success","data":...}`. Client errors
//! (4xx) render as `{"status":"fail","data":{"message":...}}` and server
//! errors (5xx) as `{"status":"error","message":...}`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::service::{Page, ServiceError};

/// Header carrying the authenticated caller, set by the fronting auth proxy
pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JSendStatus {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Serialize)]
pub struct JSend<T: Serialize> {
    pub status: JSendStatus,
    pub data: T,
}

impl<T: Serialize> JSend<T> {
    pub fn success(data: T) -> Json<JSend<T>> {
        Json(JSend {
            status: JSendStatus::Success,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct PageData<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

pub type JSendPaginated<T> = JSend<PageData<T>>;

impl<T: Serialize> JSend<PageData<T>> {
    /// Wrap a service page, echoing the requested window
    pub fn page(page: Page<T>, limit: u32, offset: u32) -> Json<JSendPaginated<T>> {
        JSend::success(PageData {
            items: page.items,
            pagination: Pagination {
                limit,
                offset,
                total: page.total,
            },
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error. 4xx codes render as JSend `fail`, 5xx as JSend `error`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, e.to_string()),
            ServiceError::Validation(message) => Self::bad_request(message),
            ServiceError::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            ServiceError::Internal(source) => {
                tracing::error!(error = %source, "Request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = if self.status.is_server_error() {
            json!({ "status": JSendStatus::Error, "message": self.message })
        } else {
            json!({ "status": JSendStatus::Fail, "data": { "message": self.message } })
        };
        (self.status, Json(body)).into_response()
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// JSON body extractor that rejects with a JSend `fail`.
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            let message = match rejection {
                JsonRejection::JsonDataError(err) => {
                    format!("Invalid request body: {}", err.body_text())
                }
                JsonRejection::JsonSyntaxError(_) => "Malformed JSON in request body".to_string(),
                JsonRejection::MissingJsonContentType(_) => {
                    "Expected Content-Type: application/json".to_string()
                }
                _ => "Unreadable request body".to_string(),
            };
            ApiError::bad_request(message)
        })?;
        Ok(AppJson(value))
    }
}

/// Query string extractor (serde_qs) that rejects with a JSend `fail`.
pub struct AppQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ApiError> {
        serde_qs::from_str(parts.uri.query().unwrap_or_default())
            .map(AppQuery)
            .map_err(|e| {
                let detail = e
                    .to_string()
                    .replace("u32", "non-negative integer")
                    .replace("usize", "non-negative integer");
                ApiError::bad_request(format!("Invalid query parameter: {detail}"))
            })
    }
}

/// The caller's user id, taken from the [`USER_HEADER`] header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, ApiError> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Missing X-User-Id header"))?;
        value
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .map(UserId)
            .ok_or_else(|| ApiError::unauthorized("X-User-Id must be a UUID"))
    }
}
