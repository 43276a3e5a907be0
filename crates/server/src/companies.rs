use api_types::company::{CompanyCreated, CompanyNew};
use axum::{Json, extract::State, http::StatusCode};
use engine::NewCompanyCmd;

use crate::{ServerError, convert::currency_in, server::ServerState};

/// Onboarding; the only endpoint reachable without an actor.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CompanyNew>,
) -> Result<(StatusCode, Json<CompanyCreated>), ServerError> {
    let cmd = NewCompanyCmd {
        name: payload.name,
        currency: currency_in(payload.currency),
        admin_name: payload.admin_name,
        admin_email: payload.admin_email,
    };
    let (company, admin) = state.engine.new_company(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(CompanyCreated {
            company_id: company.id,
            admin_id: admin.id,
        }),
    ))
}
