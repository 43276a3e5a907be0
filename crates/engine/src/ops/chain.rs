use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    ChainEntry, ChainSlot, Decision, Expense, ExpenseStatus, ResultEngine, approval_chain,
    expenses,
};

use super::Engine;

impl Engine {
    /// Writes one pending entry per slot. Must run in the transaction that
    /// inserts the expense.
    pub(super) async fn create_chain(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        slots: &[ChainSlot],
    ) -> ResultEngine<Vec<ChainEntry>> {
        let entries: Vec<ChainEntry> = slots
            .iter()
            .map(|slot| ChainEntry::new(expense_id, *slot))
            .collect();
        if entries.is_empty() {
            return Ok(entries);
        }
        approval_chain::Entity::insert_many(entries.iter().map(approval_chain::ActiveModel::from))
            .exec(db)
            .await?;
        Ok(entries)
    }

    /// Chain of an expense ordered by sequence.
    pub(super) async fn entries_for(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
    ) -> ResultEngine<Vec<ChainEntry>> {
        approval_chain::Entity::find()
            .filter(approval_chain::Column::ExpenseId.eq(expense_id.to_string()))
            .order_by_asc(approval_chain::Column::Sequence)
            .order_by_asc(approval_chain::Column::ApproverId)
            .all(db)
            .await?
            .into_iter()
            .map(ChainEntry::try_from)
            .collect()
    }

    /// Number of entries before `sequence` that are not approved yet.
    pub(super) async fn blocking_entries(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        sequence: u32,
    ) -> ResultEngine<u64> {
        approval_chain::Entity::find()
            .filter(approval_chain::Column::ExpenseId.eq(expense_id.to_string()))
            .filter(approval_chain::Column::Sequence.lt(sequence as i32))
            .filter(approval_chain::Column::Decision.ne(Decision::Approved.as_str()))
            .count(db)
            .await
            .map_err(Into::into)
    }

    /// Pending entries of `approver_id` that can be acted on now: the expense
    /// is still pending and every earlier tier has approved.
    pub(super) async fn pending_for(
        &self,
        db: &DatabaseTransaction,
        approver_id: Uuid,
    ) -> ResultEngine<Vec<(Expense, ChainEntry)>> {
        let rows = approval_chain::Entity::find()
            .filter(approval_chain::Column::ApproverId.eq(approver_id.to_string()))
            .filter(approval_chain::Column::Decision.eq(Decision::Pending.as_str()))
            .find_also_related(expenses::Entity)
            .filter(expenses::Column::Status.eq(ExpenseStatus::Pending.as_str()))
            .order_by_asc(expenses::Column::CreatedAt)
            .all(db)
            .await?;

        let mut actionable = Vec::with_capacity(rows.len());
        for (entry, expense) in rows {
            let Some(expense) = expense else {
                continue;
            };
            let entry = ChainEntry::try_from(entry)?;
            if self
                .blocking_entries(db, entry.expense_id, entry.sequence)
                .await?
                > 0
            {
                continue;
            }
            actionable.push((Expense::try_from(expense)?, entry));
        }
        Ok(actionable)
    }
}
