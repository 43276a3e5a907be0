//! Per-company approval workflows.
//!
//! A workflow applies to expenses whose base-currency amount falls inside
//! `[min_amount_minor, max_amount_minor]` (either bound may be open) and lists
//! the approver tiers, in order, that such an expense must pass.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Role, util::parse_uuid};

/// Deepest management line an escalation step may walk.
pub const MAX_ESCALATION_DEPTH: u8 = 8;

/// Who approves at one workflow step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepApprover {
    /// The submitter's direct manager.
    DirectManager,
    /// Every user of the company holding `role`, except the submitter.
    Role { role: Role },
    /// The submitter's management line, `depth` levels up, one tier per level.
    Escalation { depth: u8 },
}

impl StepApprover {
    pub(crate) fn kind_str(self) -> &'static str {
        match self {
            Self::DirectManager => "direct_manager",
            Self::Role { .. } => "role",
            Self::Escalation { .. } => "escalation",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub sequence: u32,
    pub approver: StepApprover,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub min_amount_minor: Option<i64>,
    pub max_amount_minor: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Sorted by `sequence`.
    pub steps: Vec<WorkflowStep>,
}

impl Workflow {
    /// Bounds are inclusive.
    pub fn applies_to(&self, amount_minor: i64) -> bool {
        self.min_amount_minor.is_none_or(|min| amount_minor >= min)
            && self.max_amount_minor.is_none_or(|max| amount_minor <= max)
    }
}

/// Checks everything a workflow definition must satisfy before it is stored.
pub(crate) fn validate_definition(
    name: &str,
    min_amount_minor: Option<i64>,
    max_amount_minor: Option<i64>,
    steps: &[WorkflowStep],
) -> Result<(), EngineError> {
    if name.trim().is_empty() {
        return Err(EngineError::InvalidWorkflow(
            "workflow name must not be empty".to_string(),
        ));
    }
    if min_amount_minor.is_some_and(|min| min < 0) || max_amount_minor.is_some_and(|max| max < 0)
    {
        return Err(EngineError::InvalidWorkflow(
            "amount bounds must be >= 0".to_string(),
        ));
    }
    if let (Some(min), Some(max)) = (min_amount_minor, max_amount_minor)
        && min > max
    {
        return Err(EngineError::InvalidWorkflow(
            "min_amount must be <= max_amount".to_string(),
        ));
    }
    if steps.is_empty() {
        return Err(EngineError::InvalidWorkflow(
            "workflow needs at least one step".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for step in steps {
        if step.sequence == 0 {
            return Err(EngineError::InvalidWorkflow(
                "step sequence starts at 1".to_string(),
            ));
        }
        if !seen.insert(step.sequence) {
            return Err(EngineError::InvalidWorkflow(format!(
                "duplicate step sequence {}",
                step.sequence
            )));
        }
        if let StepApprover::Escalation { depth } = step.approver
            && (depth == 0 || depth > MAX_ESCALATION_DEPTH)
        {
            return Err(EngineError::InvalidWorkflow(format!(
                "escalation depth must be between 1 and {MAX_ESCALATION_DEPTH}"
            )));
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "workflows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub min_amount_minor: Option<i64>,
    pub max_amount_minor: Option<i64>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::workflow_steps::Entity")]
    Steps,
}

impl Related<super::workflow_steps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Steps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Workflow> for ActiveModel {
    fn from(workflow: &Workflow) -> Self {
        Self {
            id: ActiveValue::Set(workflow.id.to_string()),
            company_id: ActiveValue::Set(workflow.company_id.to_string()),
            name: ActiveValue::Set(workflow.name.clone()),
            min_amount_minor: ActiveValue::Set(workflow.min_amount_minor),
            max_amount_minor: ActiveValue::Set(workflow.max_amount_minor),
            created_at: ActiveValue::Set(workflow.created_at),
        }
    }
}

impl Workflow {
    pub(crate) fn from_models(
        model: Model,
        steps: Vec<super::workflow_steps::Model>,
    ) -> Result<Self, EngineError> {
        let mut steps = steps
            .into_iter()
            .map(WorkflowStep::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        steps.sort_by_key(|s| s.sequence);
        Ok(Self {
            id: parse_uuid(&model.id, "workflow")?,
            company_id: parse_uuid(&model.company_id, "company")?,
            name: model.name,
            min_amount_minor: model.min_amount_minor,
            max_amount_minor: model.max_amount_minor,
            created_at: model.created_at,
            steps,
        })
    }
}
