//! Approval chain entries.
//!
//! One row per required approver of an expense. Rows are written together
//! with the expense and never added or removed later; the decision triple
//! (`decision`, `comment`, `decided_at`) is filled exactly once.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

impl TryFrom<&str> for Decision {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidInput(format!("invalid decision: {other}"))),
        }
    }
}

/// A required approver and the tier it belongs to, as produced by the
/// workflow selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChainSlot {
    pub approver_id: Uuid,
    /// 1-based; entries sharing a position form one parallel tier.
    pub sequence: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEntry {
    pub id: Uuid,
    pub expense_id: Uuid,
    pub approver_id: Uuid,
    pub sequence: u32,
    pub decision: Decision,
    pub comment: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl ChainEntry {
    pub fn new(expense_id: Uuid, slot: ChainSlot) -> Self {
        Self {
            id: Uuid::new_v4(),
            expense_id,
            approver_id: slot.approver_id,
            sequence: slot.sequence,
            decision: Decision::Pending,
            comment: None,
            decided_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "approval_chain_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub approver_id: String,
    pub sequence: i32,
    pub decision: String,
    pub comment: Option<String>,
    pub decided_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Expense,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ChainEntry> for ActiveModel {
    fn from(entry: &ChainEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            expense_id: ActiveValue::Set(entry.expense_id.to_string()),
            approver_id: ActiveValue::Set(entry.approver_id.to_string()),
            sequence: ActiveValue::Set(entry.sequence as i32),
            decision: ActiveValue::Set(entry.decision.as_str().to_string()),
            comment: ActiveValue::Set(entry.comment.clone()),
            decided_at: ActiveValue::Set(entry.decided_at),
        }
    }
}

impl TryFrom<Model> for ChainEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let sequence = u32::try_from(model.sequence)
            .map_err(|_| EngineError::InvalidInput("invalid chain sequence".to_string()))?;
        Ok(Self {
            id: parse_uuid(&model.id, "chain entry")?,
            expense_id: parse_uuid(&model.expense_id, "expense")?,
            approver_id: parse_uuid(&model.approver_id, "approver")?,
            sequence,
            decision: Decision::try_from(model.decision.as_str())?,
            comment: model.comment,
            decided_at: model.decided_at,
        })
    }
}
