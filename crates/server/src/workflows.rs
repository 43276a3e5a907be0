use api_types::workflow::{
    StepApprover, WorkflowListResponse, WorkflowNew, WorkflowStepView, WorkflowView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{NewWorkflowCmd, User, WorkflowStep};

use crate::{
    ServerError,
    convert::{role_in, role_out},
    server::ServerState,
};

fn step_in(step: WorkflowStepView) -> WorkflowStep {
    let approver = match step.approver {
        StepApprover::DirectManager => engine::StepApprover::DirectManager,
        StepApprover::Role { role } => engine::StepApprover::Role {
            role: role_in(role),
        },
        StepApprover::Escalation { depth } => engine::StepApprover::Escalation { depth },
    };
    WorkflowStep {
        sequence: step.sequence,
        approver,
    }
}

fn step_out(step: WorkflowStep) -> WorkflowStepView {
    let approver = match step.approver {
        engine::StepApprover::DirectManager => StepApprover::DirectManager,
        engine::StepApprover::Role { role } => StepApprover::Role {
            role: role_out(role),
        },
        engine::StepApprover::Escalation { depth } => StepApprover::Escalation { depth },
    };
    WorkflowStepView {
        sequence: step.sequence,
        approver,
    }
}

fn map_workflow(workflow: engine::Workflow) -> WorkflowView {
    WorkflowView {
        id: workflow.id,
        name: workflow.name,
        min_amount_minor: workflow.min_amount_minor,
        max_amount_minor: workflow.max_amount_minor,
        created_at: workflow.created_at,
        steps: workflow.steps.into_iter().map(step_out).collect(),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<WorkflowListResponse>, ServerError> {
    let workflows = state
        .engine
        .workflows(user.id)
        .await?
        .into_iter()
        .map(map_workflow)
        .collect();
    Ok(Json(WorkflowListResponse { workflows }))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<WorkflowNew>,
) -> Result<(StatusCode, Json<WorkflowView>), ServerError> {
    let cmd = NewWorkflowCmd {
        name: payload.name,
        min_amount_minor: payload.min_amount_minor,
        max_amount_minor: payload.max_amount_minor,
        steps: payload.steps.into_iter().map(step_in).collect(),
    };
    let workflow = state.engine.new_workflow(user.id, cmd).await?;
    Ok((StatusCode::CREATED, Json(map_workflow(workflow))))
}
