use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Inr,
    Cad,
    Aud,
    Jpy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
}

pub mod company {
    use super::*;

    /// Onboarding request: creates the company and its first admin.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CompanyNew {
        pub name: String,
        /// Base currency every expense is converted into.
        pub currency: Currency,
        pub admin_name: String,
        pub admin_email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CompanyCreated {
        pub company_id: Uuid,
        pub admin_id: Uuid,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        pub role: Role,
        pub manager_id: Option<Uuid>,
        #[serde(default)]
        pub is_manager_approver: bool,
    }

    /// Partial update; absent fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub role: Option<Role>,
        pub manager_id: Option<Uuid>,
        /// Removes the manager link. Cannot be combined with `manager_id`.
        #[serde(default)]
        pub clear_manager: bool,
        pub is_manager_approver: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub company_id: Uuid,
        pub name: String,
        pub email: String,
        pub role: Role,
        pub manager_id: Option<Uuid>,
        pub is_manager_approver: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserListResponse {
        pub users: Vec<UserView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod workflow {
    use super::*;

    /// Who approves at one step.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum StepApprover {
        DirectManager,
        Role { role: Role },
        /// Management line of the submitter, `depth` levels up (1..=8).
        Escalation { depth: u8 },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkflowStepView {
        pub sequence: u32,
        pub approver: StepApprover,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkflowNew {
        pub name: String,
        /// Inclusive lower bound, base currency minor units.
        pub min_amount_minor: Option<i64>,
        /// Inclusive upper bound, base currency minor units.
        pub max_amount_minor: Option<i64>,
        pub steps: Vec<WorkflowStepView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkflowView {
        pub id: Uuid,
        pub name: String,
        pub min_amount_minor: Option<i64>,
        pub max_amount_minor: Option<i64>,
        pub created_at: DateTime<Utc>,
        pub steps: Vec<WorkflowStepView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WorkflowListResponse {
        pub workflows: Vec<WorkflowView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        /// Major units as text, e.g. `"12.50"` (`,` is accepted as separator).
        pub amount: String,
        pub currency: Currency,
        pub category_id: Uuid,
        pub description: String,
        pub expense_date: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreated {
        pub expense_id: Uuid,
        pub status: ExpenseStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub submitter_id: Uuid,
        pub amount_minor: i64,
        pub currency: Currency,
        /// Amount in the company base currency, fixed at submission.
        pub converted_amount_minor: i64,
        pub base_currency: Currency,
        pub category_id: Uuid,
        pub description: String,
        pub expense_date: NaiveDate,
        pub status: ExpenseStatus,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod approval {
    use super::*;
    use crate::expense::ExpenseView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DecisionNew {
        /// `approved` or `rejected`.
        pub decision: Decision,
        pub comment: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DecisionResult {
        pub expense_id: Uuid,
        pub status: ExpenseStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingApprovalView {
        pub expense: ExpenseView,
        pub submitter_name: String,
        pub sequence: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingListResponse {
        pub approvals: Vec<PendingApprovalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DecisionRecordView {
        pub approver_id: Uuid,
        pub approver_name: String,
        pub sequence: u32,
        pub decision: Decision,
        pub comment: Option<String>,
        pub decided_at: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub history: Vec<DecisionRecordView>,
    }
}
