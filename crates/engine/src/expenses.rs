//! Expense primitives.
//!
//! An `Expense` is created once by submission. Its amounts are fixed at that
//! point; `status` is the only column written afterwards, and only by the
//! status resolver.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl TryFrom<&str> for ExpenseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidInput(format!(
                "invalid expense status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub submitter_id: Uuid,
    pub company_id: Uuid,
    /// Amount as submitted.
    pub amount: Money,
    /// `amount` converted into the company base currency at submission.
    pub converted: Money,
    pub category_id: Uuid,
    pub description: String,
    pub expense_date: NaiveDate,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub submitter_id: String,
    pub company_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub converted_amount_minor: i64,
    pub base_currency: String,
    pub category_id: String,
    pub description: String,
    pub expense_date: Date,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Company,
    #[sea_orm(has_many = "super::approval_chain::Entity")]
    ChainEntries,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::approval_chain::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChainEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            submitter_id: ActiveValue::Set(expense.submitter_id.to_string()),
            company_id: ActiveValue::Set(expense.company_id.to_string()),
            amount_minor: ActiveValue::Set(expense.amount.minor()),
            currency: ActiveValue::Set(expense.amount.currency().code().to_string()),
            converted_amount_minor: ActiveValue::Set(expense.converted.minor()),
            base_currency: ActiveValue::Set(expense.converted.currency().code().to_string()),
            category_id: ActiveValue::Set(expense.category_id.to_string()),
            description: ActiveValue::Set(expense.description.clone()),
            expense_date: ActiveValue::Set(expense.expense_date),
            status: ActiveValue::Set(expense.status.as_str().to_string()),
            created_at: ActiveValue::Set(expense.created_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            submitter_id: parse_uuid(&model.submitter_id, "user")?,
            company_id: parse_uuid(&model.company_id, "company")?,
            amount: Money::new(
                model.amount_minor,
                Currency::try_from(model.currency.as_str())?,
            ),
            converted: Money::new(
                model.converted_amount_minor,
                Currency::try_from(model.base_currency.as_str())?,
            ),
            category_id: parse_uuid(&model.category_id, "category")?,
            description: model.description,
            expense_date: model.expense_date,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}
