use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, Company, NewCompanyCmd, ResultEngine, Role, User,
    categories::{self, DEFAULT_CATEGORIES},
    companies,
    util::{normalize_email, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Registers a company with its first admin and the default categories.
    ///
    /// The admin approves their own reports' expenses as direct manager, so
    /// the account starts with `is_manager_approver` set.
    pub async fn new_company(&self, cmd: NewCompanyCmd) -> ResultEngine<(Company, User)> {
        let name = normalize_required_text(&cmd.name, "company name")?;
        let admin_name = normalize_required_text(&cmd.admin_name, "admin name")?;
        let admin_email = normalize_email(&cmd.admin_email)?;

        with_tx!(self, |db_tx| {
            self.ensure_email_free(&db_tx, &admin_email).await?;

            let company = Company {
                id: Uuid::new_v4(),
                name,
                currency: cmd.currency,
                created_at: Utc::now(),
            };
            companies::ActiveModel::from(&company).insert(&db_tx).await?;

            let admin = User {
                id: Uuid::new_v4(),
                company_id: company.id,
                name: admin_name,
                email: admin_email,
                role: Role::Admin,
                manager_id: None,
                is_manager_approver: true,
            };
            crate::users::ActiveModel::from(&admin).insert(&db_tx).await?;

            let seeded = DEFAULT_CATEGORIES.iter().map(|(name, description)| {
                categories::ActiveModel::from(&Category {
                    id: Uuid::new_v4(),
                    company_id: company.id,
                    name: (*name).to_string(),
                    description: Some((*description).to_string()),
                })
            });
            categories::Entity::insert_many(seeded).exec(&db_tx).await?;

            tracing::info!(company_id = %company.id, admin_id = %admin.id, "company registered");
            Ok((company, admin))
        })
    }

    /// The company the user belongs to.
    pub async fn company(&self, user_id: Uuid) -> ResultEngine<Company> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            self.require_company(&db_tx, user.company_id).await
        })
    }
}
