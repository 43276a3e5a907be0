//! Approval workflows and their ordered steps.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Workflows {
    Table,
    Id,
    CompanyId,
    Name,
    MinAmountMinor,
    MaxAmountMinor,
    CreatedAt,
}

#[derive(Iden)]
enum WorkflowSteps {
    Table,
    Id,
    WorkflowId,
    Sequence,
    ApproverKind,
    ApproverRole,
    EscalationDepth,
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Workflows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Workflows::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Workflows::CompanyId).string().not_null())
                    .col(ColumnDef::new(Workflows::Name).string().not_null())
                    .col(ColumnDef::new(Workflows::MinAmountMinor).big_integer())
                    .col(ColumnDef::new(Workflows::MaxAmountMinor).big_integer())
                    .col(ColumnDef::new(Workflows::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-workflows-company_id")
                            .from(Workflows::Table, Workflows::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-workflows-company_id")
                    .table(Workflows::Table)
                    .col(Workflows::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkflowSteps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkflowSteps::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WorkflowSteps::WorkflowId).string().not_null())
                    .col(ColumnDef::new(WorkflowSteps::Sequence).integer().not_null())
                    .col(
                        ColumnDef::new(WorkflowSteps::ApproverKind)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(WorkflowSteps::ApproverRole).string())
                    .col(ColumnDef::new(WorkflowSteps::EscalationDepth).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-workflow_steps-workflow_id")
                            .from(WorkflowSteps::Table, WorkflowSteps::WorkflowId)
                            .to(Workflows::Table, Workflows::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-workflow_steps-workflow_id-sequence-unique")
                    .table(WorkflowSteps::Table)
                    .col(WorkflowSteps::WorkflowId)
                    .col(WorkflowSteps::Sequence)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkflowSteps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workflows::Table).to_owned())
            .await?;
        Ok(())
    }
}
