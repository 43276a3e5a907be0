//! Initial schema.
//!
//! - `companies`: tenants, each with a base currency
//! - `users`: company members with role and manager link
//! - `categories`: per-company expense categories
//! - `expenses`: submitted expenses with original and converted amount
//! - `approval_chain_entries`: one row per required approver of an expense

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Companies {
    Table,
    Id,
    Name,
    Currency,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    CompanyId,
    Name,
    Email,
    Role,
    ManagerId,
    IsManagerApprover,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    CompanyId,
    Name,
    NameNorm,
    Description,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    SubmitterId,
    CompanyId,
    AmountMinor,
    Currency,
    ConvertedAmountMinor,
    BaseCurrency,
    CategoryId,
    Description,
    ExpenseDate,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum ApprovalChainEntries {
    Table,
    Id,
    ExpenseId,
    ApproverId,
    Sequence,
    Decision,
    Comment,
    DecidedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Companies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Companies::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Companies::Name).string().not_null())
                    .col(
                        ColumnDef::new(Companies::Currency)
                            .string()
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Companies::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Manager links are lookup-only, so `manager_id` carries no foreign key.
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::CompanyId).string().not_null())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::ManagerId).string())
                    .col(
                        ColumnDef::new(Users::IsManagerApprover)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-company_id")
                            .from(Users::Table, Users::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-company_id")
                    .table(Users::Table)
                    .col(Users::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::CompanyId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::Description).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-company_id")
                            .from(Categories::Table, Categories::CompanyId)
                            .to(Companies::Table, Companies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-company_id-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::CompanyId)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::SubmitterId).string().not_null())
                    .col(ColumnDef::new(Expenses::CompanyId).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Currency).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::ConvertedAmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::BaseCurrency).string().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                    .col(
                        ColumnDef::new(Expenses::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-company_id")
                            .from(Expenses::Table, Expenses::CompanyId)
                            .to(Companies::Table, Companies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-submitter_id")
                            .from(Expenses::Table, Expenses::SubmitterId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-submitter_id-created_at")
                    .table(Expenses::Table)
                    .col(Expenses::SubmitterId)
                    .col(Expenses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApprovalChainEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApprovalChainEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ApprovalChainEntries::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApprovalChainEntries::ApproverId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApprovalChainEntries::Sequence)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApprovalChainEntries::Decision)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ApprovalChainEntries::Comment).string())
                    .col(ColumnDef::new(ApprovalChainEntries::DecidedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-approval_chain_entries-expense_id")
                            .from(ApprovalChainEntries::Table, ApprovalChainEntries::ExpenseId)
                            .to(Expenses::Table, Expenses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-approval_chain_entries-approver_id")
                            .from(ApprovalChainEntries::Table, ApprovalChainEntries::ApproverId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-approval_chain_entries-expense_id-approver_id-unique")
                    .table(ApprovalChainEntries::Table)
                    .col(ApprovalChainEntries::ExpenseId)
                    .col(ApprovalChainEntries::ApproverId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-approval_chain_entries-approver_id-decision")
                    .table(ApprovalChainEntries::Table)
                    .col(ApprovalChainEntries::ApproverId)
                    .col(ApprovalChainEntries::Decision)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApprovalChainEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies::Table).to_owned())
            .await?;
        Ok(())
    }
}
