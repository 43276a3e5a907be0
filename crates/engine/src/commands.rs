//! Command structs for engine operations.
//!
//! These types group parameters for write operations (submission, decision,
//! user and workflow administration), keeping call sites readable and
//! avoiding long argument lists.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Currency, Decision, Role, WorkflowStep};

/// Submit an expense for approval.
#[derive(Clone, Debug)]
pub struct SubmitExpenseCmd {
    pub submitter_id: Uuid,
    /// Amount in `currency` minor units.
    pub amount_minor: i64,
    pub currency: Currency,
    pub category_id: Uuid,
    pub description: String,
    pub expense_date: NaiveDate,
    pub submitted_at: DateTime<Utc>,
}

impl SubmitExpenseCmd {
    #[must_use]
    pub fn new(
        submitter_id: Uuid,
        amount_minor: i64,
        currency: Currency,
        category_id: Uuid,
        expense_date: NaiveDate,
    ) -> Self {
        Self {
            submitter_id,
            amount_minor,
            currency,
            category_id,
            description: String::new(),
            expense_date,
            submitted_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn submitted_at(mut self, submitted_at: DateTime<Utc>) -> Self {
        self.submitted_at = submitted_at;
        self
    }
}

/// Record one approver's decision on an expense.
#[derive(Clone, Debug)]
pub struct DecisionCmd {
    pub expense_id: Uuid,
    pub approver_id: Uuid,
    /// `Approved` or `Rejected`.
    pub decision: Decision,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

impl DecisionCmd {
    #[must_use]
    pub fn approve(expense_id: Uuid, approver_id: Uuid) -> Self {
        Self::new(expense_id, approver_id, Decision::Approved)
    }

    #[must_use]
    pub fn reject(expense_id: Uuid, approver_id: Uuid) -> Self {
        Self::new(expense_id, approver_id, Decision::Rejected)
    }

    #[must_use]
    pub fn new(expense_id: Uuid, approver_id: Uuid, decision: Decision) -> Self {
        Self {
            expense_id,
            approver_id,
            decision,
            comment: None,
            decided_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[must_use]
    pub fn decided_at(mut self, decided_at: DateTime<Utc>) -> Self {
        self.decided_at = decided_at;
        self
    }
}

/// Register a company together with its first administrator.
#[derive(Clone, Debug)]
pub struct NewCompanyCmd {
    pub name: String,
    pub currency: Currency,
    pub admin_name: String,
    pub admin_email: String,
}

/// Create a user inside the acting admin's company.
#[derive(Clone, Debug)]
pub struct NewUserCmd {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub manager_id: Option<Uuid>,
    pub is_manager_approver: bool,
}

impl NewUserCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            role,
            manager_id: None,
            is_manager_approver: false,
        }
    }

    #[must_use]
    pub fn manager(mut self, manager_id: Uuid) -> Self {
        self.manager_id = Some(manager_id);
        self
    }

    #[must_use]
    pub fn manager_approves(mut self) -> Self {
        self.is_manager_approver = true;
        self
    }
}

/// Patch a user's routing attributes. `None` keeps the current value;
/// `manager_id: Some(None)` clears the manager.
#[derive(Clone, Debug, Default)]
pub struct UpdateUserCmd {
    pub role: Option<Role>,
    pub manager_id: Option<Option<Uuid>>,
    pub is_manager_approver: Option<bool>,
}

/// Define an approval workflow for the acting admin's company.
#[derive(Clone, Debug)]
pub struct NewWorkflowCmd {
    pub name: String,
    pub min_amount_minor: Option<i64>,
    pub max_amount_minor: Option<i64>,
    pub steps: Vec<WorkflowStep>,
}
