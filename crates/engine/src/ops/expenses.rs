use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Expense, ExpenseStatus, Money, ResultEngine, SubmitExpenseCmd, expenses, normalize,
    select_approvers, util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Submits an expense and builds its approval chain.
    ///
    /// The amount is converted into the company base currency, the chain is
    /// selected from the company's workflows and both the expense and its
    /// chain are written in one transaction together with the initial
    /// status. An empty chain leaves the expense approved.
    pub async fn submit_expense(&self, cmd: SubmitExpenseCmd) -> ResultEngine<Expense> {
        let description = normalize_required_text(&cmd.description, "description")?;
        let amount = Money::new(cmd.amount_minor, cmd.currency);

        with_tx!(self, |db_tx| {
            let submitter = self.require_user(&db_tx, cmd.submitter_id).await?;
            let company = self.require_company(&db_tx, submitter.company_id).await?;
            self.require_category(&db_tx, company.id, cmd.category_id)
                .await?;

            let converted = normalize(amount, company.currency, self.rates())?;
            let workflows = self.company_workflows(&db_tx, company.id).await?;
            let directory = self.company_directory(&db_tx, company.id).await?;
            let slots = select_approvers(&submitter, converted.minor(), &workflows, &directory)?;

            let mut expense = Expense {
                id: Uuid::new_v4(),
                submitter_id: submitter.id,
                company_id: company.id,
                amount,
                converted,
                category_id: cmd.category_id,
                description,
                expense_date: cmd.expense_date,
                status: ExpenseStatus::Pending,
                created_at: cmd.submitted_at,
            };
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            self.create_chain(&db_tx, expense.id, &slots).await?;
            expense.status = self
                .apply_resolution(&db_tx, expense.id, expense.status)
                .await?;

            tracing::debug!(
                expense_id = %expense.id,
                submitter_id = %submitter.id,
                amount = %expense.amount,
                converted = %expense.converted,
                approvers = slots.len(),
                status = expense.status.as_str(),
                "expense submitted"
            );
            Ok(expense)
        })
    }

    /// Reads one expense; visible to its submitter, its approvers and the
    /// company admins.
    pub async fn expense(&self, user_id: Uuid, expense_id: Uuid) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let actor = self.require_user(&db_tx, user_id).await?;
            let (expense, _) = self
                .require_expense_visible(&db_tx, expense_id, &actor)
                .await?;
            Ok(expense)
        })
    }

    /// Expenses submitted by the user, newest first.
    pub async fn my_expenses(&self, user_id: Uuid) -> ResultEngine<Vec<Expense>> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            expenses::Entity::find()
                .filter(expenses::Column::SubmitterId.eq(user.id.to_string()))
                .order_by_desc(expenses::Column::CreatedAt)
                .order_by_desc(expenses::Column::Id)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expense::try_from)
                .collect()
        })
    }
}
