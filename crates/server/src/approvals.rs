//! Approver queue, decisions and decision history.

use api_types::approval::{
    DecisionNew, DecisionRecordView, DecisionResult, HistoryResponse, PendingApprovalView,
    PendingListResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{DecisionCmd, User};
use uuid::Uuid;

use crate::{
    ServerError,
    convert::{decision_in, decision_out, status_out},
    expenses::map_expense,
    server::ServerState,
};

pub async fn pending(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<PendingListResponse>, ServerError> {
    let approvals = state
        .engine
        .list_pending_approvals(user.id)
        .await?
        .into_iter()
        .map(|pending| PendingApprovalView {
            expense: map_expense(pending.expense),
            submitter_name: pending.submitter_name,
            sequence: pending.sequence,
        })
        .collect();
    Ok(Json(PendingListResponse { approvals }))
}

pub async fn decide(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<DecisionNew>,
) -> Result<Json<DecisionResult>, ServerError> {
    let mut cmd = DecisionCmd::new(expense_id, user.id, decision_in(payload.decision));
    if let Some(comment) = payload.comment {
        cmd = cmd.comment(comment);
    }

    let status = state.engine.decide(cmd).await?;
    Ok(Json(DecisionResult {
        expense_id,
        status: status_out(status),
    }))
}

pub async fn history(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let history = state
        .engine
        .approval_history(user.id, expense_id)
        .await?
        .into_iter()
        .map(|record| DecisionRecordView {
            approver_id: record.approver_id,
            approver_name: record.approver_name,
            sequence: record.sequence,
            decision: decision_out(record.decision),
            comment: record.comment,
            decided_at: record.decided_at,
        })
        .collect();
    Ok(Json(HistoryResponse { history }))
}
