use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, NewUserCmd, ResultEngine, UpdateUserCmd, User, users,
    util::{normalize_email, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    pub(super) async fn ensure_email_free(
        &self,
        db: &DatabaseTransaction,
        email: &str,
    ) -> ResultEngine<()> {
        let taken = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(EngineError::ExistingKey(email.to_string()));
        }
        Ok(())
    }

    /// Checks that `manager_id` can manage `user`: same company, not the
    /// user itself, and not someone who already reports to `user`.
    async fn check_manager(
        &self,
        db: &DatabaseTransaction,
        user: &User,
        manager_id: Uuid,
    ) -> ResultEngine<()> {
        if manager_id == user.id {
            return Err(EngineError::InvalidInput(
                "a user cannot manage themselves".to_string(),
            ));
        }
        let directory = self.company_directory(db, user.company_id).await?;
        let mut current = directory
            .get(manager_id)
            .ok_or_else(|| EngineError::KeyNotFound("manager not exists".to_string()))?;
        let mut steps = 0usize;
        loop {
            if current.id == user.id || steps > directory.len() {
                return Err(EngineError::CyclicHierarchy(format!(
                    "{} already reports to {}",
                    manager_id, user.id
                )));
            }
            match current.manager_id.and_then(|id| directory.get(id)) {
                Some(next) => current = next,
                None => return Ok(()),
            }
            steps += 1;
        }
    }

    /// Creates a user in the admin's company.
    pub async fn new_user(&self, admin_id: Uuid, cmd: NewUserCmd) -> ResultEngine<User> {
        let name = normalize_required_text(&cmd.name, "name")?;
        let email = normalize_email(&cmd.email)?;

        with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, admin_id).await?;
            self.ensure_email_free(&db_tx, &email).await?;

            let user = User {
                id: Uuid::new_v4(),
                company_id: admin.company_id,
                name,
                email,
                role: cmd.role,
                manager_id: cmd.manager_id,
                is_manager_approver: cmd.is_manager_approver,
            };
            if let Some(manager_id) = user.manager_id {
                self.check_manager(&db_tx, &user, manager_id).await?;
            }
            users::ActiveModel::from(&user).insert(&db_tx).await?;

            tracing::debug!(user_id = %user.id, role = user.role.as_str(), "user created");
            Ok(user)
        })
    }

    /// Changes role, manager or approver flag of a user of the admin's
    /// company.
    pub async fn update_user(
        &self,
        admin_id: Uuid,
        user_id: Uuid,
        cmd: UpdateUserCmd,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, admin_id).await?;
            let mut user = self.require_user(&db_tx, user_id).await?;
            if user.company_id != admin.company_id {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }

            if let Some(role) = cmd.role {
                user.role = role;
            }
            if let Some(manager_id) = cmd.manager_id {
                if let Some(id) = manager_id {
                    self.check_manager(&db_tx, &user, id).await?;
                }
                user.manager_id = manager_id;
            }
            if let Some(flag) = cmd.is_manager_approver {
                user.is_manager_approver = flag;
            }

            users::ActiveModel::from(&user).update(&db_tx).await?;
            tracing::debug!(user_id = %user.id, "user updated");
            Ok(user)
        })
    }

    /// Looks a user up by id.
    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        with_tx!(self, |db_tx| self.require_user(&db_tx, user_id).await)
    }

    /// Users of the admin's company, by name.
    pub async fn users(&self, admin_id: Uuid) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, admin_id).await?;
            users::Entity::find()
                .filter(users::Column::CompanyId.eq(admin.company_id.to_string()))
                .order_by_asc(users::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(User::try_from)
                .collect()
        })
    }
}
