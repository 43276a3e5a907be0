//! Rows of a workflow's ordered step list.

use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, Role, StepApprover, WorkflowStep};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "workflow_steps")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub workflow_id: String,
    pub sequence: i32,
    pub approver_kind: String,
    pub approver_role: Option<String>,
    pub escalation_depth: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workflows::Entity",
        from = "Column::WorkflowId",
        to = "super::workflows::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Workflow,
}

impl Related<super::workflows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workflow.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn active_model(workflow_id: Uuid, step: &WorkflowStep) -> ActiveModel {
    let (role, depth) = match step.approver {
        StepApprover::DirectManager => (None, None),
        StepApprover::Role { role } => (Some(role.as_str().to_string()), None),
        StepApprover::Escalation { depth } => (None, Some(i32::from(depth))),
    };
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        workflow_id: ActiveValue::Set(workflow_id.to_string()),
        sequence: ActiveValue::Set(step.sequence as i32),
        approver_kind: ActiveValue::Set(step.approver.kind_str().to_string()),
        approver_role: ActiveValue::Set(role),
        escalation_depth: ActiveValue::Set(depth),
    }
}

impl TryFrom<Model> for WorkflowStep {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let invalid = || EngineError::InvalidWorkflow(format!("invalid step {}", model.id));
        let approver = match model.approver_kind.as_str() {
            "direct_manager" => StepApprover::DirectManager,
            "role" => StepApprover::Role {
                role: Role::try_from(model.approver_role.as_deref().ok_or_else(invalid)?)?,
            },
            "escalation" => StepApprover::Escalation {
                depth: model
                    .escalation_depth
                    .and_then(|d| u8::try_from(d).ok())
                    .ok_or_else(invalid)?,
            },
            _ => return Err(invalid()),
        };
        Ok(Self {
            sequence: u32::try_from(model.sequence).map_err(|_| invalid())?,
            approver,
        })
    }
}
