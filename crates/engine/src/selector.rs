//! Approval chain selection.
//!
//! [`select_approvers`] is a pure function of the submitter, the expense
//! amount in base currency, the company's workflows and the company's user
//! directory. Given the same inputs it always yields the same chain.
//!
//! Chain layout:
//! 1. the submitter's direct manager, when `is_manager_approver` is set;
//! 2. the steps of the most specific workflow whose bounds contain the
//!    amount, in step order.
//!
//! Each tier gets the next sequence position. An approver appears at most
//! once in a chain and the submitter never approves their own expense.

use std::{
    cmp::Reverse,
    collections::{HashMap, HashSet},
};

use uuid::Uuid;

use crate::{
    ChainSlot, EngineError, ResultEngine, Role, StepApprover, User, Workflow, WorkflowStep,
};

/// Snapshot of one company's users, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct Directory {
    users: HashMap<Uuid, User>,
}

impl Directory {
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// The manager of `user`, if one is configured.
    ///
    /// A reference that does not resolve to a user of the same company is an
    /// error rather than "no manager", so routing never silently drops a
    /// required approver.
    pub fn manager_of(&self, user: &User) -> ResultEngine<Option<&User>> {
        let Some(manager_id) = user.manager_id else {
            return Ok(None);
        };
        match self.users.get(&manager_id) {
            Some(manager) if manager.company_id == user.company_id => Ok(Some(manager)),
            _ => Err(EngineError::KeyNotFound("manager not exists".to_string())),
        }
    }

    fn with_role(&self, role: Role) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .users
            .values()
            .filter(|u| u.role == role)
            .map(|u| u.id)
            .collect();
        ids.sort();
        ids
    }
}

/// Picks the workflow governing `amount_minor`: highest lower bound first,
/// then tightest upper bound, then the oldest definition.
pub fn matching_workflow(workflows: &[Workflow], amount_minor: i64) -> Option<&Workflow> {
    workflows
        .iter()
        .filter(|wf| wf.applies_to(amount_minor))
        .max_by_key(|wf| {
            (
                wf.min_amount_minor.unwrap_or(i64::MIN),
                Reverse(wf.max_amount_minor.unwrap_or(i64::MAX)),
                Reverse(wf.created_at),
                Reverse(wf.id),
            )
        })
}

struct ChainBuilder {
    slots: Vec<ChainSlot>,
    seen: HashSet<Uuid>,
    position: u32,
}

impl ChainBuilder {
    fn new(submitter: Uuid) -> Self {
        Self {
            slots: Vec::new(),
            seen: HashSet::from([submitter]),
            position: 0,
        }
    }

    /// Appends a tier; approvers already in the chain are dropped and a tier
    /// left empty consumes no position.
    fn push_tier(&mut self, approvers: &[Uuid]) {
        let fresh: Vec<Uuid> = approvers
            .iter()
            .copied()
            .filter(|id| self.seen.insert(*id))
            .collect();
        if fresh.is_empty() {
            return;
        }
        self.position += 1;
        let sequence = self.position;
        self.slots.extend(
            fresh
                .into_iter()
                .map(|approver_id| ChainSlot {
                    approver_id,
                    sequence,
                }),
        );
    }
}

/// Walks `depth` levels up the management line of `submitter`.
fn management_line(submitter: &User, depth: u8, directory: &Directory) -> ResultEngine<Vec<Uuid>> {
    let mut line = Vec::with_capacity(depth as usize);
    let mut visited = HashSet::from([submitter.id]);
    let mut current = submitter;
    for _ in 0..depth {
        let Some(manager) = directory.manager_of(current)? else {
            break;
        };
        if !visited.insert(manager.id) {
            return Err(EngineError::CyclicHierarchy(format!(
                "user {} reports back into the line of {}",
                current.id, submitter.id
            )));
        }
        line.push(manager.id);
        current = manager;
    }
    Ok(line)
}

fn step_tiers(
    step: &WorkflowStep,
    submitter: &User,
    directory: &Directory,
) -> ResultEngine<Vec<Vec<Uuid>>> {
    Ok(match step.approver {
        StepApprover::DirectManager => directory
            .manager_of(submitter)?
            .map(|m| vec![vec![m.id]])
            .unwrap_or_default(),
        StepApprover::Role { role } => {
            let ids: Vec<Uuid> = directory
                .with_role(role)
                .into_iter()
                .filter(|id| *id != submitter.id)
                .collect();
            if ids.is_empty() { vec![] } else { vec![ids] }
        }
        StepApprover::Escalation { depth } => management_line(submitter, depth, directory)?
            .into_iter()
            .map(|id| vec![id])
            .collect(),
    })
}

/// Computes the ordered approval chain for an expense of `amount_minor`
/// (company base currency) submitted by `submitter`.
///
/// An empty result means no approval is required.
pub fn select_approvers(
    submitter: &User,
    amount_minor: i64,
    workflows: &[Workflow],
    directory: &Directory,
) -> ResultEngine<Vec<ChainSlot>> {
    let mut chain = ChainBuilder::new(submitter.id);

    if submitter.is_manager_approver
        && let Some(manager) = directory.manager_of(submitter)?
    {
        chain.push_tier(&[manager.id]);
    }

    if let Some(workflow) = matching_workflow(workflows, amount_minor) {
        for step in &workflow.steps {
            let tiers = step_tiers(step, submitter, directory)?;
            if tiers.is_empty() {
                return Err(EngineError::InvalidWorkflow(format!(
                    "step {} of workflow '{}' has no eligible approver",
                    step.sequence, workflow.name
                )));
            }
            for tier in &tiers {
                chain.push_tier(tier);
            }
        }
    }

    Ok(chain.slots)
}
