//! Custom extractors
//!
//! Rejections are rendered as `{ "error", "status" }` like every other error.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

type Rejection = (StatusCode, Json<serde_json::Value>);

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(json!({
            "error": message.into(),
            "status": status.as_u16(),
        })),
    )
}

/// Raw CSV request body; an empty body is rejected with 422
pub struct CsvBody(pub Bytes);

#[axum::async_trait]
impl<S> FromRequest<S> for CsvBody
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Bytes::from_request(req, state).await {
            Ok(bytes) if bytes.is_empty() => Err(reject(
                StatusCode::UNPROCESSABLE_ENTITY,
                "No data: request body is empty, expected CSV text",
            )),
            Ok(bytes) => Ok(Self(bytes)),
            Err(rejection) => Err(reject(
                rejection.status(),
                format!("Failed to read upload: {}", rejection.body_text()),
            )),
        }
    }
}

/// Query string extractor with JSON error messages
pub struct QueryExtractor<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for QueryExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(reject(
                StatusCode::BAD_REQUEST,
                format!("Invalid query string: {}", rejection.body_text()),
            )),
        }
    }
}
