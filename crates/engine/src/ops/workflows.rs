use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    NewWorkflowCmd, ResultEngine, Workflow, workflow_steps,
    workflows::{self, validate_definition},
};

use super::{Engine, with_tx};

impl Engine {
    /// All workflows of a company with their steps, oldest first.
    pub(super) async fn company_workflows(
        &self,
        db: &DatabaseTransaction,
        company_id: Uuid,
    ) -> ResultEngine<Vec<Workflow>> {
        workflows::Entity::find()
            .filter(workflows::Column::CompanyId.eq(company_id.to_string()))
            .order_by_asc(workflows::Column::CreatedAt)
            .find_with_related(workflow_steps::Entity)
            .all(db)
            .await?
            .into_iter()
            .map(|(model, steps)| Workflow::from_models(model, steps))
            .collect()
    }

    /// Defines a workflow for the admin's company.
    pub async fn new_workflow(&self, admin_id: Uuid, cmd: NewWorkflowCmd) -> ResultEngine<Workflow> {
        validate_definition(
            &cmd.name,
            cmd.min_amount_minor,
            cmd.max_amount_minor,
            &cmd.steps,
        )?;
        let mut steps = cmd.steps;
        steps.sort_by_key(|s| s.sequence);

        with_tx!(self, |db_tx| {
            let admin = self.require_admin(&db_tx, admin_id).await?;
            let workflow = Workflow {
                id: Uuid::new_v4(),
                company_id: admin.company_id,
                name: cmd.name.trim().to_string(),
                min_amount_minor: cmd.min_amount_minor,
                max_amount_minor: cmd.max_amount_minor,
                created_at: Utc::now(),
                steps,
            };
            workflows::ActiveModel::from(&workflow)
                .insert(&db_tx)
                .await?;
            workflow_steps::Entity::insert_many(
                workflow
                    .steps
                    .iter()
                    .map(|step| workflow_steps::active_model(workflow.id, step)),
            )
            .exec(&db_tx)
            .await?;

            tracing::debug!(
                workflow_id = %workflow.id,
                steps = workflow.steps.len(),
                "workflow created"
            );
            Ok(workflow)
        })
    }

    /// Workflows of the user's company, oldest first.
    pub async fn workflows(&self, user_id: Uuid) -> ResultEngine<Vec<Workflow>> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            self.company_workflows(&db_tx, user.company_id).await
        })
    }
}
