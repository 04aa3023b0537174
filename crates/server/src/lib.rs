use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod entries;
mod report;
mod server;
mod session;
mod validate;

pub mod types {
    pub mod entry {
        pub use api_types::entry::{
            EntryDelete, EntryList, EntryNew, EntrySearch, EntryUpdate, EntryView,
        };
    }

    pub mod report {
        pub use api_types::report::{MonthView, MonthlyReport, MonthlyReportRequest, YearInput};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::Timeout(_) | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::MalformedFilterShape(_)
        | EngineError::MissingFilterValue(_)
        | EngineError::InvalidTypeCombination(_)
        | EngineError::InvalidFilterType(_)
        | EngineError::InvalidFilterOp(_)
        | EngineError::UnparseableTimestamp(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidYear(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Timeout(after) => {
            tracing::error!("store timed out after {after:?}");
            "internal server error".to_string()
        }
        other => {
            tracing::warn!("request failed: {other}");
            other.to_string()
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use http_body_util::BodyExt;
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_unauthorized_maps_to_401() {
        let res = ServerError::from(EngineError::Unauthorized).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn filter_errors_map_to_400() {
        for err in [
            EngineError::MalformedFilterShape("x".to_string()),
            EngineError::MissingFilterValue(0),
            EngineError::InvalidTypeCombination("x".to_string()),
            EngineError::InvalidFilterType(9),
            EngineError::InvalidFilterOp(9),
            EngineError::UnparseableTimestamp("x".to_string()),
            EngineError::InvalidId("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failures_hide_details() {
        for err in [
            EngineError::Database(DbErr::Custom("disk I/O error at /var/db".to_string())),
            EngineError::Timeout(Duration::from_secs(10)),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = res.into_body().collect().await.unwrap().to_bytes();
            let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body, serde_json::json!({"error": "internal server error"}));
        }
    }
}
