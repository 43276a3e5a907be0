//! Decisions, the approver queue and the decision history.
//!
//! `decide` is the only path that changes an expense after submission. It
//! opens with a write on the expense row, so SQLite hands out its write lock
//! before any read and concurrent deciders queue on the busy timeout. It then
//! locks the row for update, writes the entry with a compare-and-set on
//! `decision = 'pending'` and re-derives the expense status before commit,
//! so concurrent decisions on one entry have a single winner and the stored
//! status always matches the chain.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ChainEntry, Decision, DecisionCmd, EngineError, Expense, ExpenseStatus, ResultEngine,
    StatusAudit, approval_chain, expenses, resolve_status, util::normalize_optional_text,
};

use super::{Engine, with_tx};

/// An expense waiting on the approver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingApproval {
    pub expense: Expense,
    pub submitter_name: String,
    pub sequence: u32,
}

/// One line of an expense's approval history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub approver_id: Uuid,
    pub approver_name: String,
    pub sequence: u32,
    pub decision: Decision,
    pub comment: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Decided entries by decision time, then pending entries by sequence.
fn history_order(entries: &mut [ChainEntry]) {
    entries.sort_by(|a, b| {
        let key = |e: &ChainEntry| (e.decided_at.is_none(), e.decided_at, e.sequence);
        key(a).cmp(&key(b)).then_with(|| a.approver_id.cmp(&b.approver_id))
    });
}

impl Engine {
    /// Re-derives the expense status from its chain and stores it when it
    /// differs from `stored`. Returns the derived status.
    pub(super) async fn apply_resolution(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        stored: ExpenseStatus,
    ) -> ResultEngine<ExpenseStatus> {
        let entries = self.entries_for(db, expense_id).await?;
        let derived = resolve_status(entries.iter().map(|e| e.decision));
        if derived != stored {
            expenses::ActiveModel {
                id: ActiveValue::Set(expense_id.to_string()),
                status: ActiveValue::Set(derived.as_str().to_string()),
                ..Default::default()
            }
            .update(db)
            .await?;
            tracing::debug!(
                %expense_id,
                from = stored.as_str(),
                to = derived.as_str(),
                "expense status resolved"
            );
        }
        Ok(derived)
    }

    /// No-op write on the expense row. On SQLite a deferred transaction that
    /// reads before writing fails with `SQLITE_BUSY` when another writer got
    /// there first; writing first makes later callers wait for the commit.
    async fn claim_expense(&self, db: &DatabaseTransaction, expense_id: Uuid) -> ResultEngine<()> {
        expenses::Entity::update_many()
            .col_expr(
                expenses::Column::Status,
                Expr::col(expenses::Column::Status).into(),
            )
            .filter(expenses::Column::Id.eq(expense_id.to_string()))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Records one approver's decision and returns the resulting expense
    /// status.
    ///
    /// Fails without writing anything when the expense is not visible to the
    /// approver or the approver holds no entry ([`EngineError::KeyNotFound`]),
    /// and when the entry was already decided, the expense is no longer
    /// pending or an earlier tier has not approved yet
    /// ([`EngineError::Conflict`]).
    pub async fn decide(&self, cmd: DecisionCmd) -> ResultEngine<ExpenseStatus> {
        if cmd.decision.is_pending() {
            return Err(EngineError::InvalidInput(
                "decision must be approved or rejected".to_string(),
            ));
        }
        let comment = normalize_optional_text(cmd.comment.as_deref());

        with_tx!(self, |db_tx| {
            // must stay the first statement of the transaction
            self.claim_expense(&db_tx, cmd.expense_id).await?;
            let approver = self.require_user(&db_tx, cmd.approver_id).await?;

            let expense: Expense = expenses::Entity::find_by_id(cmd.expense_id.to_string())
                .lock_exclusive()
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?
                .try_into()?;
            if expense.company_id != approver.company_id {
                return Err(EngineError::KeyNotFound("expense not exists".to_string()));
            }

            let entry: ChainEntry = approval_chain::Entity::find()
                .filter(approval_chain::Column::ExpenseId.eq(cmd.expense_id.to_string()))
                .filter(approval_chain::Column::ApproverId.eq(cmd.approver_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("approval entry not exists".to_string()))?
                .try_into()?;

            if !entry.decision.is_pending() {
                tracing::warn!(expense_id = %expense.id, approver_id = %approver.id, "decision already recorded");
                return Err(EngineError::Conflict("decision already recorded".to_string()));
            }
            if expense.status != ExpenseStatus::Pending {
                return Err(EngineError::Conflict(format!(
                    "expense is already {}",
                    expense.status.as_str()
                )));
            }
            if self
                .blocking_entries(&db_tx, expense.id, entry.sequence)
                .await?
                > 0
            {
                return Err(EngineError::Conflict(
                    "earlier approvals are still pending".to_string(),
                ));
            }

            let written = approval_chain::Entity::update_many()
                .col_expr(
                    approval_chain::Column::Decision,
                    Expr::value(cmd.decision.as_str()),
                )
                .col_expr(approval_chain::Column::Comment, Expr::value(comment))
                .col_expr(
                    approval_chain::Column::DecidedAt,
                    Expr::value(Some(cmd.decided_at)),
                )
                .filter(approval_chain::Column::Id.eq(entry.id.to_string()))
                .filter(approval_chain::Column::Decision.eq(Decision::Pending.as_str()))
                .exec(&db_tx)
                .await?;
            if written.rows_affected == 0 {
                tracing::warn!(expense_id = %expense.id, approver_id = %approver.id, "lost decision race");
                return Err(EngineError::Conflict("decision already recorded".to_string()));
            }

            let status = self
                .apply_resolution(&db_tx, expense.id, expense.status)
                .await?;
            tracing::debug!(
                expense_id = %expense.id,
                approver_id = %approver.id,
                decision = cmd.decision.as_str(),
                status = status.as_str(),
                "decision recorded"
            );
            Ok(status)
        })
    }

    /// Expenses the approver can act on now, oldest first.
    pub async fn list_pending_approvals(
        &self,
        approver_id: Uuid,
    ) -> ResultEngine<Vec<PendingApproval>> {
        with_tx!(self, |db_tx| {
            let approver = self.require_user(&db_tx, approver_id).await?;
            let directory = self.company_directory(&db_tx, approver.company_id).await?;
            Ok(self
                .pending_for(&db_tx, approver.id)
                .await?
                .into_iter()
                .map(|(expense, entry)| PendingApproval {
                    submitter_name: directory
                        .get(expense.submitter_id)
                        .map(|u| u.name.clone())
                        .unwrap_or_default(),
                    sequence: entry.sequence,
                    expense,
                })
                .collect())
        })
    }

    /// Decision history of an expense.
    pub async fn approval_history(
        &self,
        user_id: Uuid,
        expense_id: Uuid,
    ) -> ResultEngine<Vec<DecisionRecord>> {
        with_tx!(self, |db_tx| {
            let actor = self.require_user(&db_tx, user_id).await?;
            let (expense, mut entries) = self
                .require_expense_visible(&db_tx, expense_id, &actor)
                .await?;
            let directory = self.company_directory(&db_tx, expense.company_id).await?;
            history_order(&mut entries);
            Ok(entries
                .into_iter()
                .map(|entry| DecisionRecord {
                    approver_name: directory
                        .get(entry.approver_id)
                        .map(|u| u.name.clone())
                        .unwrap_or_default(),
                    approver_id: entry.approver_id,
                    sequence: entry.sequence,
                    decision: entry.decision,
                    comment: entry.comment,
                    decided_at: entry.decided_at,
                })
                .collect())
        })
    }

    /// Compares the stored status with the one derived from the chain.
    /// Read-only.
    pub async fn status_audit(&self, expense_id: Uuid) -> ResultEngine<StatusAudit> {
        with_tx!(self, |db_tx| {
            let expense: Expense = expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?
                .try_into()?;
            let entries = self.entries_for(&db_tx, expense_id).await?;
            Ok(StatusAudit {
                expense_id,
                stored: expense.status,
                derived: resolve_status(entries.iter().map(|e| e.decision)),
            })
        })
    }
}
