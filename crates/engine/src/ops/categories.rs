use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine,
    categories::{self, normalize_name},
    util::{normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

impl Engine {
    pub(super) async fn require_category(
        &self,
        db: &DatabaseTransaction,
        company_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        categories::Entity::find_by_id(category_id.to_string())
            .filter(categories::Column::CompanyId.eq(company_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?
            .try_into()
    }

    /// Adds a category to the admin's company. Names are unique per company,
    /// ignoring case.
    pub async fn new_category(
        &self,
        admin_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<Category> {
        let name = normalize_required_text(name, "category name")?;
        let description = normalize_optional_text(description);

        with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, admin_id).await?;
            let exists = categories::Entity::find()
                .filter(categories::Column::CompanyId.eq(admin.company_id.to_string()))
                .filter(categories::Column::NameNorm.eq(normalize_name(&name)))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let category = Category {
                id: Uuid::new_v4(),
                company_id: admin.company_id,
                name,
                description,
            };
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(category)
        })
    }

    /// Categories of the user's company, by name.
    pub async fn categories(&self, user_id: Uuid) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            categories::Entity::find()
                .filter(categories::Column::CompanyId.eq(user.company_id.to_string()))
                .order_by_asc(categories::Column::NameNorm)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Category::try_from)
                .collect()
        })
    }
}
