use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    ChainEntry, Company, Directory, EngineError, Expense, ResultEngine, User, companies, expenses,
    users,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<User> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?
            .try_into()
    }

    pub(super) async fn require_admin(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<User> {
        let user = self.require_user(db, user_id).await?;
        if !user.is_admin() {
            return Err(EngineError::Forbidden("admin access required".to_string()));
        }
        Ok(user)
    }

    pub(super) async fn require_company(
        &self,
        db: &DatabaseTransaction,
        company_id: Uuid,
    ) -> ResultEngine<Company> {
        companies::Entity::find_by_id(company_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("company not exists".to_string()))?
            .try_into()
    }

    /// Every user of `company_id`.
    pub(super) async fn company_directory(
        &self,
        db: &DatabaseTransaction,
        company_id: Uuid,
    ) -> ResultEngine<Directory> {
        let users = users::Entity::find()
            .filter(users::Column::CompanyId.eq(company_id.to_string()))
            .all(db)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Directory::new(users))
    }

    /// Loads an expense of the actor's company. Expenses of other companies
    /// are reported as missing.
    pub(super) async fn require_company_expense(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        actor: &User,
    ) -> ResultEngine<Expense> {
        let expense: Expense = expenses::Entity::find_by_id(expense_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?
            .try_into()?;
        if expense.company_id != actor.company_id {
            return Err(EngineError::KeyNotFound("expense not exists".to_string()));
        }
        Ok(expense)
    }

    /// Loads an expense together with its chain when `actor` may read it:
    /// the submitter, any approver in the chain, or an admin of the company.
    pub(super) async fn require_expense_visible(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        actor: &User,
    ) -> ResultEngine<(Expense, Vec<ChainEntry>)> {
        let expense = self.require_company_expense(db, expense_id, actor).await?;
        let entries = self.entries_for(db, expense_id).await?;
        let allowed = actor.is_admin()
            || expense.submitter_id == actor.id
            || entries.iter().any(|e| e.approver_id == actor.id);
        if !allowed {
            return Err(EngineError::Forbidden(
                "not involved in this expense".to_string(),
            ));
        }
        Ok((expense, entries))
    }
}
