//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledgerscan_sdk::SdkError;
use serde_json::json;
use thiserror::Error;

/// Server error type
#[derive(Debug, Error)]
pub enum ServerError {
    /// Input that parses but cannot be used (no data, bad CSV)
    #[error("Unprocessable input: {0}")]
    Unprocessable(String),

    /// The requested stage is already in flight
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A collaborator is not configured
    #[error("Service unavailable: {0}")]
    NotConfigured(String),

    /// An upstream call (scorer, store) failed
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            ServerError::Unprocessable(msg)
            | ServerError::Conflict(msg)
            | ServerError::NotConfigured(msg)
            | ServerError::Upstream(msg)
            | ServerError::InternalError(msg) => msg,
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<SdkError> for ServerError {
    fn from(err: SdkError) -> Self {
        let message = err.to_string();
        match err {
            SdkError::NoData(_) | SdkError::Input(_) => ServerError::Unprocessable(message),
            SdkError::Busy(_) => ServerError::Conflict(message),
            SdkError::NotConfigured(_) => ServerError::NotConfigured(message),
            SdkError::Scorer { .. } | SdkError::Persistence { .. } => {
                ServerError::Upstream(message)
            }
            SdkError::Computation(_) => ServerError::InternalError(message),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_error_status_mapping() {
        let cases = [
            (SdkError::NoData("empty".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (SdkError::Input("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (SdkError::Busy("analyze"), StatusCode::CONFLICT),
            (SdkError::NotConfigured("key".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                SdkError::Scorer {
                    provider: "gemini".into(),
                    message: "quota".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                SdkError::Persistence {
                    store: "rest".into(),
                    message: "401".into(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (SdkError::Computation("count".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (sdk_err, expected) in cases {
            let server_err: ServerError = sdk_err.into();
            assert_eq!(server_err.status(), expected, "{server_err}");
        }
    }

    #[test]
    fn test_sdk_message_is_kept() {
        let server_err: ServerError = SdkError::Busy("persist").into();
        assert!(server_err.to_string().contains("persist"));
    }

    #[test]
    fn test_into_response_status() {
        let response = ServerError::Conflict("busy".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let server_err: ServerError = anyhow::anyhow!("something went wrong").into();
        assert!(server_err.to_string().contains("Internal error"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServerError>();
    }
}
