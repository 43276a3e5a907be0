use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run, run_with_listener, spawn_with_listener};

mod approvals;
mod categories;
mod companies;
mod convert;
mod expenses;
mod server;
mod users;
mod workflows;

pub mod types {
    pub use api_types::{Currency, Decision, ExpenseStatus, Role};

    pub mod company {
        pub use api_types::company::{CompanyCreated, CompanyNew};
    }

    pub mod user {
        pub use api_types::user::{UserListResponse, UserNew, UserUpdate, UserView};
    }

    pub mod category {
        pub use api_types::category::{CategoryListResponse, CategoryNew, CategoryView};
    }

    pub mod workflow {
        pub use api_types::workflow::{
            StepApprover, WorkflowListResponse, WorkflowNew, WorkflowStepView, WorkflowView,
        };
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseCreated, ExpenseListResponse, ExpenseNew, ExpenseView};
    }

    pub mod approval {
        pub use api_types::approval::{
            DecisionNew, DecisionRecordView, DecisionResult, HistoryResponse, PendingApprovalView,
            PendingListResponse,
        };
    }
}

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
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidInput(_)
        | EngineError::InvalidWorkflow(_)
        | EngineError::UnknownCurrency(_)
        | EngineError::CyclicHierarchy(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "temporarily unavailable, retry the request".to_string()
        }
        other => other.to_string(),
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
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflicts_map_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidInput("x".to_string()),
            EngineError::InvalidWorkflow("x".to_string()),
            EngineError::UnknownCurrency("x".to_string()),
            EngineError::CyclicHierarchy("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn database_errors_hide_details() {
        let err = EngineError::Database(DbErr::Custom("disk I/O error".to_string()));
        assert_eq!(status_for_engine_error(&err), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!message_for_engine_error(err).contains("disk"));
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
