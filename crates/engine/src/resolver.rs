//! Expense status derivation.
//!
//! The status of an expense is a pure function of its chain decisions:
//! - any `rejected` entry makes the expense `rejected`, whatever else is
//!   still pending;
//! - otherwise, all entries `approved` (vacuously true for an empty chain)
//!   makes it `approved`;
//! - otherwise it stays `pending`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Decision, ExpenseStatus};

pub fn resolve_status<I>(decisions: I) -> ExpenseStatus
where
    I: IntoIterator<Item = Decision>,
{
    let mut all_approved = true;
    for decision in decisions {
        match decision {
            Decision::Rejected => return ExpenseStatus::Rejected,
            Decision::Pending => all_approved = false,
            Decision::Approved => {}
        }
    }
    if all_approved {
        ExpenseStatus::Approved
    } else {
        ExpenseStatus::Pending
    }
}

/// Stored status next to the status derived from the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAudit {
    pub expense_id: Uuid,
    pub stored: ExpenseStatus,
    pub derived: ExpenseStatus,
}

impl StatusAudit {
    pub fn is_consistent(&self) -> bool {
        self.stored == self.derived
    }
}
