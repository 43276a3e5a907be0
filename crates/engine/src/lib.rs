//! Expense approval engine.
//!
//! The crate is split in two layers:
//! - pure building blocks that never touch storage: [`normalize`] converts an
//!   amount into the company base currency, [`select_approvers`] computes the
//!   approval chain and [`resolve_status`] derives an expense status from the
//!   chain decisions;
//! - [`Engine`], which runs submissions, decisions and administration inside
//!   database transactions on top of those blocks.

pub use approval_chain::{ChainEntry, ChainSlot, Decision};
pub use categories::Category;
pub use commands::{
    DecisionCmd, NewCompanyCmd, NewUserCmd, NewWorkflowCmd, SubmitExpenseCmd, UpdateUserCmd,
};
pub use companies::Company;
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, ExpenseStatus};
pub use money::Money;
pub use ops::{DecisionRecord, Engine, EngineBuilder, PendingApproval};
pub use rates::{RateProvider, StaticRates, normalize};
pub use resolver::{StatusAudit, resolve_status};
pub use selector::{Directory, matching_workflow, select_approvers};
pub use users::{Role, User};
pub use workflows::{MAX_ESCALATION_DEPTH, StepApprover, Workflow, WorkflowStep};

mod approval_chain;
mod categories;
mod commands;
mod companies;
mod currency;
mod error;
mod expenses;
mod money;
mod ops;
mod rates;
mod resolver;
mod selector;
mod users;
mod util;
mod workflow_steps;
mod workflows;

type ResultEngine<T> = Result<T, EngineError>;
