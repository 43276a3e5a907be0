//! Mapping between wire types and engine types.

use api_types::{Currency, Decision, ExpenseStatus, Role};

pub(crate) fn currency_in(currency: Currency) -> engine::Currency {
    match currency {
        Currency::Usd => engine::Currency::Usd,
        Currency::Eur => engine::Currency::Eur,
        Currency::Gbp => engine::Currency::Gbp,
        Currency::Inr => engine::Currency::Inr,
        Currency::Cad => engine::Currency::Cad,
        Currency::Aud => engine::Currency::Aud,
        Currency::Jpy => engine::Currency::Jpy,
    }
}

pub(crate) fn currency_out(currency: engine::Currency) -> Currency {
    match currency {
        engine::Currency::Usd => Currency::Usd,
        engine::Currency::Eur => Currency::Eur,
        engine::Currency::Gbp => Currency::Gbp,
        engine::Currency::Inr => Currency::Inr,
        engine::Currency::Cad => Currency::Cad,
        engine::Currency::Aud => Currency::Aud,
        engine::Currency::Jpy => Currency::Jpy,
    }
}

pub(crate) fn role_in(role: Role) -> engine::Role {
    match role {
        Role::Admin => engine::Role::Admin,
        Role::Manager => engine::Role::Manager,
        Role::Employee => engine::Role::Employee,
    }
}

pub(crate) fn role_out(role: engine::Role) -> Role {
    match role {
        engine::Role::Admin => Role::Admin,
        engine::Role::Manager => Role::Manager,
        engine::Role::Employee => Role::Employee,
    }
}

pub(crate) fn status_out(status: engine::ExpenseStatus) -> ExpenseStatus {
    match status {
        engine::ExpenseStatus::Pending => ExpenseStatus::Pending,
        engine::ExpenseStatus::Approved => ExpenseStatus::Approved,
        engine::ExpenseStatus::Rejected => ExpenseStatus::Rejected,
    }
}

pub(crate) fn decision_in(decision: Decision) -> engine::Decision {
    match decision {
        Decision::Pending => engine::Decision::Pending,
        Decision::Approved => engine::Decision::Approved,
        Decision::Rejected => engine::Decision::Rejected,
    }
}

pub(crate) fn decision_out(decision: engine::Decision) -> Decision {
    match decision {
        engine::Decision::Pending => Decision::Pending,
        engine::Decision::Approved => Decision::Approved,
        engine::Decision::Rejected => Decision::Rejected,
    }
}
