//! Expense submission and lookup endpoints.

use api_types::expense::{ExpenseCreated, ExpenseListResponse, ExpenseNew, ExpenseView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Money, SubmitExpenseCmd, User};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{currency_in, currency_out, status_out},
    server::ServerState,
};

pub(crate) fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        submitter_id: expense.submitter_id,
        amount_minor: expense.amount.minor(),
        currency: currency_out(expense.amount.currency()),
        converted_amount_minor: expense.converted.minor(),
        base_currency: currency_out(expense.converted.currency()),
        category_id: expense.category_id,
        description: expense.description,
        expense_date: expense.expense_date,
        status: status_out(expense.status),
        created_at: expense.created_at,
    }
}

pub async fn submit(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let currency = currency_in(payload.currency);
    let amount = Money::parse(&payload.amount, currency)?;
    let cmd = SubmitExpenseCmd::new(
        user.id,
        amount.minor(),
        currency,
        payload.category_id,
        payload.expense_date,
    )
    .description(payload.description);

    let expense = state.engine.submit_expense(cmd).await?;
    Ok((
        StatusCode::CREATED,
        Json(ExpenseCreated {
            expense_id: expense.id,
            status: status_out(expense.status),
        }),
    ))
}

pub async fn mine(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let expenses = state
        .engine
        .my_expenses(user.id)
        .await?
        .into_iter()
        .map(map_expense)
        .collect();
    Ok(Json(ExpenseListResponse { expenses }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(user.id, expense_id).await?;
    Ok(Json(map_expense(expense)))
}
