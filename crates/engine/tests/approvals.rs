use std::{path::PathBuf, sync::Arc};

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Currency, Decision, DecisionCmd, Engine, EngineError, ExpenseStatus, NewCompanyCmd, NewUserCmd,
    NewWorkflowCmd, RateProvider, Role, StaticRates, StepApprover, SubmitExpenseCmd, UpdateUserCmd, User,
    WorkflowStep,
};
use migration::MigratorTrait;

async fn migrated_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = migrated_db().await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// File-backed database behind a pool of several connections, so
/// transactions of concurrent callers really overlap.
async fn pooled_engine(name: &str) -> (Arc<Engine>, PathBuf) {
    let path = std::env::temp_dir().join(format!("expenses-{name}-{}.db", Uuid::new_v4()));
    let mut options = ConnectOptions::new(format!("sqlite:{}?mode=rwc", path.display()));
    options.max_connections(8).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    (Arc::new(engine), path)
}

fn remove_db(path: PathBuf) {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}

/// Acme (USD): admin Ada <- director Dan <- manager Max <- employee Eve.
/// Eve has `is_manager_approver` set; Ned reports to Max without it.
struct Org {
    admin: User,
    director: User,
    manager: User,
    employee: User,
    ungated: User,
    category_id: Uuid,
}

async fn org(engine: &Engine) -> Org {
    let (_, admin) = engine
        .new_company(NewCompanyCmd {
            name: "Acme".to_string(),
            currency: Currency::Usd,
            admin_name: "Ada".to_string(),
            admin_email: "ada@acme.io".to_string(),
        })
        .await
        .unwrap();
    let director = engine
        .new_user(
            admin.id,
            NewUserCmd::new("Dan", "dan@acme.io", Role::Manager).manager(admin.id),
        )
        .await
        .unwrap();
    let manager = engine
        .new_user(
            admin.id,
            NewUserCmd::new("Max", "max@acme.io", Role::Manager).manager(director.id),
        )
        .await
        .unwrap();
    let employee = engine
        .new_user(
            admin.id,
            NewUserCmd::new("Eve", "eve@acme.io", Role::Employee)
                .manager(manager.id)
                .manager_approves(),
        )
        .await
        .unwrap();
    let ungated = engine
        .new_user(
            admin.id,
            NewUserCmd::new("Ned", "ned@acme.io", Role::Employee).manager(manager.id),
        )
        .await
        .unwrap();
    let category_id = engine.categories(admin.id).await.unwrap()[0].id;
    Org {
        admin,
        director,
        manager,
        employee,
        ungated,
        category_id,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()
}

fn submission(org: &Org, submitter: &User, amount_minor: i64, currency: Currency) -> SubmitExpenseCmd {
    SubmitExpenseCmd::new(submitter.id, amount_minor, currency, org.category_id, date())
        .description("Client dinner")
}

async fn workflow(engine: &Engine, org: &Org, steps: &[StepApprover]) {
    engine
        .new_workflow(
            org.admin.id,
            NewWorkflowCmd {
                name: "Default".to_string(),
                min_amount_minor: None,
                max_amount_minor: None,
                steps: steps
                    .iter()
                    .enumerate()
                    .map(|(i, approver)| WorkflowStep {
                        sequence: i as u32 + 1,
                        approver: *approver,
                    })
                    .collect(),
            },
        )
        .await
        .unwrap();
}

async fn approver_ids(engine: &Engine, actor: Uuid, expense_id: Uuid) -> Vec<Uuid> {
    engine
        .approval_history(actor, expense_id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.approver_id)
        .collect()
}

async fn assert_consistent(engine: &Engine, expense_id: Uuid) {
    let audit = engine.status_audit(expense_id).await.unwrap();
    assert!(audit.is_consistent(), "status drifted: {audit:?}");
}

#[tokio::test]
async fn new_company_seeds_admin_and_categories() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    assert!(org.admin.is_admin());
    assert!(org.admin.is_manager_approver);
    let names: Vec<String> = engine
        .categories(org.employee.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(
        names,
        vec!["Meals", "Office Supplies", "Software", "Training", "Travel"]
    );
    assert_eq!(
        engine.company(org.employee.id).await.unwrap().currency,
        Currency::Usd
    );
}

#[tokio::test]
async fn empty_chain_is_approved_at_submission() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    let expense = engine
        .submit_expense(submission(&org, &org.ungated, 25_00, Currency::Usd))
        .await
        .unwrap();

    assert_eq!(expense.status, ExpenseStatus::Approved);
    assert!(
        engine
            .approval_history(org.ungated.id, expense.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        engine
            .list_pending_approvals(org.manager.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_consistent(&engine, expense.id).await;
}

#[tokio::test]
async fn submission_converts_into_base_currency() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    let expense = engine
        .submit_expense(submission(&org, &org.employee, 100_00, Currency::Eur))
        .await
        .unwrap();

    assert_eq!(expense.amount.minor(), 100_00);
    assert_eq!(expense.amount.currency(), Currency::Eur);
    assert_eq!(expense.converted.minor(), 117_65);
    assert_eq!(expense.converted.currency(), Currency::Usd);
    assert_eq!(expense.status, ExpenseStatus::Pending);

    let stored = engine.expense(org.employee.id, expense.id).await.unwrap();
    assert_eq!(stored.converted, expense.converted);
    assert_eq!(stored.expense_date, date());
    assert_eq!(stored.description, "Client dinner");
}

#[tokio::test]
async fn missing_rate_fails_without_storing() {
    let db = migrated_db().await;
    let engine = Engine::builder()
        .database(db)
        .rates(StaticRates::empty().with_rate(Currency::Usd, Decimal::ONE))
        .build()
        .await
        .unwrap();
    let org = org(&engine).await;

    let err = engine
        .submit_expense(submission(&org, &org.employee, 100_00, Currency::Eur))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::UnknownCurrency(_)));
    assert_eq!(engine.rates().rate_for(Currency::Eur), None);
    assert!(engine.my_expenses(org.employee.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn submission_validates_input() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    let zero = engine
        .submit_expense(submission(&org, &org.employee, 0, Currency::Usd))
        .await
        .unwrap_err();
    assert!(matches!(zero, EngineError::InvalidAmount(_)));

    let blank = engine
        .submit_expense(submission(&org, &org.employee, 10_00, Currency::Usd).description("  "))
        .await
        .unwrap_err();
    assert_eq!(
        blank,
        EngineError::InvalidInput("description must not be empty".to_string())
    );

    let mut cmd = submission(&org, &org.employee, 10_00, Currency::Usd);
    cmd.category_id = Uuid::new_v4();
    assert_eq!(
        engine.submit_expense(cmd).await.unwrap_err(),
        EngineError::KeyNotFound("category not exists".to_string())
    );

    assert!(engine.my_expenses(org.employee.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn two_tier_chain_approves_in_order() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;
    workflow(
        &engine,
        &org,
        &[
            StepApprover::DirectManager,
            StepApprover::Role { role: Role::Admin },
        ],
    )
    .await;

    let expense = engine
        .submit_expense(submission(&org, &org.employee, 80_00, Currency::Usd))
        .await
        .unwrap();
    assert_eq!(expense.status, ExpenseStatus::Pending);

    // The manager gate and the direct-manager step collapse into one entry.
    let history = engine
        .approval_history(org.employee.id, expense.id)
        .await
        .unwrap();
    let chain: Vec<(Uuid, u32)> = history.iter().map(|r| (r.approver_id, r.sequence)).collect();
    assert_eq!(chain, vec![(org.manager.id, 1), (org.admin.id, 2)]);

    assert!(
        engine
            .list_pending_approvals(org.admin.id)
            .await
            .unwrap()
            .is_empty()
    );
    let queue = engine.list_pending_approvals(org.manager.id).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].expense.id, expense.id);
    assert_eq!(queue[0].submitter_name, "Eve");

    let status = engine
        .decide(DecisionCmd::approve(expense.id, org.manager.id).comment("ok"))
        .await
        .unwrap();
    assert_eq!(status, ExpenseStatus::Pending);
    assert_consistent(&engine, expense.id).await;
    assert!(
        engine
            .list_pending_approvals(org.manager.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        engine.list_pending_approvals(org.admin.id).await.unwrap().len(),
        1
    );

    let status = engine
        .decide(DecisionCmd::approve(expense.id, org.admin.id))
        .await
        .unwrap();
    assert_eq!(status, ExpenseStatus::Approved);
    assert_consistent(&engine, expense.id).await;
    assert_eq!(
        engine.expense(org.admin.id, expense.id).await.unwrap().status,
        ExpenseStatus::Approved
    );
}

#[tokio::test]
async fn rejection_short_circuits_remaining_tiers() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;
    workflow(&engine, &org, &[StepApprover::Escalation { depth: 3 }]).await;

    let expense = engine
        .submit_expense(submission(&org, &org.ungated, 500_00, Currency::Usd))
        .await
        .unwrap();
    assert_eq!(
        approver_ids(&engine, org.ungated.id, expense.id).await,
        vec![org.manager.id, org.director.id, org.admin.id]
    );

    engine
        .decide(DecisionCmd::approve(expense.id, org.manager.id))
        .await
        .unwrap();
    let status = engine
        .decide(DecisionCmd::reject(expense.id, org.director.id).comment("over budget"))
        .await
        .unwrap();
    assert_eq!(status, ExpenseStatus::Rejected);
    assert_consistent(&engine, expense.id).await;

    assert!(
        engine
            .list_pending_approvals(org.admin.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        engine
            .decide(DecisionCmd::approve(expense.id, org.admin.id))
            .await
            .unwrap_err(),
        EngineError::Conflict("expense is already rejected".to_string())
    );
    assert_consistent(&engine, expense.id).await;
}

#[tokio::test]
async fn an_entry_is_decided_once() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;
    workflow(&engine, &org, &[StepApprover::Role { role: Role::Admin }]).await;

    let expense = engine
        .submit_expense(submission(&org, &org.employee, 10_00, Currency::Usd))
        .await
        .unwrap();
    engine
        .decide(DecisionCmd::approve(expense.id, org.manager.id))
        .await
        .unwrap();

    let err = engine
        .decide(DecisionCmd::reject(expense.id, org.manager.id))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("decision already recorded".to_string())
    );

    let history = engine
        .approval_history(org.employee.id, expense.id)
        .await
        .unwrap();
    assert_eq!(history[0].decision, Decision::Approved);
    assert_eq!(history[0].comment, None);
    assert_consistent(&engine, expense.id).await;
}

#[tokio::test]
async fn later_tiers_wait_for_earlier_ones() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;
    workflow(&engine, &org, &[StepApprover::Role { role: Role::Admin }]).await;

    let expense = engine
        .submit_expense(submission(&org, &org.employee, 10_00, Currency::Usd))
        .await
        .unwrap();

    let err = engine
        .decide(DecisionCmd::approve(expense.id, org.admin.id))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("earlier approvals are still pending".to_string())
    );
    let history = engine
        .approval_history(org.admin.id, expense.id)
        .await
        .unwrap();
    assert!(history.iter().all(|r| r.decision == Decision::Pending));
}

#[tokio::test]
async fn decisions_outside_the_chain_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    let expense = engine
        .submit_expense(submission(&org, &org.employee, 10_00, Currency::Usd))
        .await
        .unwrap();

    assert_eq!(
        engine
            .decide(DecisionCmd::approve(expense.id, org.director.id))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("approval entry not exists".to_string())
    );
    assert_eq!(
        engine
            .decide(DecisionCmd::approve(Uuid::new_v4(), org.manager.id))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("expense not exists".to_string())
    );

    let (_, stranger) = engine
        .new_company(NewCompanyCmd {
            name: "Globex".to_string(),
            currency: Currency::Eur,
            admin_name: "Hank".to_string(),
            admin_email: "hank@globex.io".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(
        engine
            .decide(DecisionCmd::approve(expense.id, stranger.id))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("expense not exists".to_string())
    );
    assert!(matches!(
        engine.approval_history(stranger.id, expense.id).await,
        Err(EngineError::KeyNotFound(_))
    ));

    assert!(matches!(
        engine
            .decide(DecisionCmd::new(expense.id, org.manager.id, Decision::Pending))
            .await,
        Err(EngineError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn history_lists_decisions_then_pending_entries() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;
    workflow(&engine, &org, &[StepApprover::Escalation { depth: 3 }]).await;

    let expense = engine
        .submit_expense(submission(&org, &org.ungated, 10_00, Currency::Usd))
        .await
        .unwrap();
    let decided_at = Utc::now() - Duration::hours(1);
    engine
        .decide(
            DecisionCmd::approve(expense.id, org.manager.id)
                .comment("fine")
                .decided_at(decided_at),
        )
        .await
        .unwrap();

    let history = engine
        .approval_history(org.admin.id, expense.id)
        .await
        .unwrap();
    let rows: Vec<(&str, Decision)> = history
        .iter()
        .map(|r| (r.approver_name.as_str(), r.decision))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Max", Decision::Approved),
            ("Dan", Decision::Pending),
            ("Ada", Decision::Pending)
        ]
    );
    assert_eq!(history[0].comment.as_deref(), Some("fine"));
    assert_eq!(
        history[0].decided_at.map(|d| d.timestamp()),
        Some(decided_at.timestamp())
    );

    // Eve is neither submitter, approver nor admin.
    assert!(matches!(
        engine.approval_history(org.employee.id, expense.id).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn failed_chain_insert_rolls_back_the_expense() {
    let (engine, db) = engine_with_db().await;
    let org = org(&engine).await;
    db.execute_unprepared(
        "CREATE TRIGGER fail_chain BEFORE INSERT ON approval_chain_entries \
         BEGIN SELECT RAISE(ABORT, 'simulated fault'); END;",
    )
    .await
    .unwrap();

    let err = engine
        .submit_expense(submission(&org, &org.employee, 10_00, Currency::Usd))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Database(_)));
    assert!(err.is_retryable());
    assert!(engine.my_expenses(org.employee.id).await.unwrap().is_empty());

    // Chains that need no rows are unaffected by the fault.
    let approved = engine
        .submit_expense(submission(&org, &org.ungated, 10_00, Currency::Usd))
        .await
        .unwrap();
    assert_eq!(approved.status, ExpenseStatus::Approved);
}

#[tokio::test]
async fn concurrent_decisions_have_one_winner() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    let expense = engine
        .submit_expense(submission(&org, &org.employee, 10_00, Currency::Usd))
        .await
        .unwrap();

    let (approve, reject) = tokio::join!(
        engine.decide(DecisionCmd::approve(expense.id, org.manager.id)),
        engine.decide(DecisionCmd::reject(expense.id, org.manager.id)),
    );

    let outcomes = [&approve, &reject];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(EngineError::Conflict(_))))
    );

    let winner = approve.or(reject).unwrap();
    let stored = engine.expense(org.employee.id, expense.id).await.unwrap();
    assert_eq!(stored.status, winner);
    assert_consistent(&engine, expense.id).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_decisions_on_one_entry_over_a_pool_have_one_winner() {
    let (engine, path) = pooled_engine("one-entry").await;
    let org = org(&engine).await;

    for _ in 0..10 {
        let expense = engine
            .submit_expense(submission(&org, &org.employee, 10_00, Currency::Usd))
            .await
            .unwrap();

        let approve = tokio::spawn({
            let engine = engine.clone();
            let cmd = DecisionCmd::approve(expense.id, org.manager.id);
            async move { engine.decide(cmd).await }
        });
        let reject = tokio::spawn({
            let engine = engine.clone();
            let cmd = DecisionCmd::reject(expense.id, org.manager.id);
            async move { engine.decide(cmd).await }
        });
        let approve = approve.await.unwrap();
        let reject = reject.await.unwrap();

        let outcomes = [&approve, &reject];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .any(|r| matches!(r, Err(EngineError::Conflict(_)))),
            "loser must see a conflict: {outcomes:?}"
        );

        let winner = approve.or(reject).unwrap();
        let stored = engine.expense(org.employee.id, expense.id).await.unwrap();
        assert_eq!(stored.status, winner);
        assert_consistent(&engine, expense.id).await;
    }

    remove_db(path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_tier_decisions_over_a_pool_both_land() {
    let (engine, path) = pooled_engine("one-tier").await;
    let org = org(&engine).await;
    // Dan and Max share the first tier of Ned's expenses.
    workflow(&engine, &org, &[StepApprover::Role { role: Role::Manager }]).await;

    for _ in 0..10 {
        let expense = engine
            .submit_expense(submission(&org, &org.ungated, 10_00, Currency::Usd))
            .await
            .unwrap();

        let tasks = [org.director.id, org.manager.id].map(|approver| {
            let engine = engine.clone();
            let cmd = DecisionCmd::approve(expense.id, approver);
            tokio::spawn(async move { engine.decide(cmd).await })
        });
        let mut statuses = Vec::new();
        for task in tasks {
            statuses.push(task.await.unwrap().unwrap());
        }
        statuses.sort_by_key(|s| s.as_str());
        assert_eq!(statuses, vec![ExpenseStatus::Approved, ExpenseStatus::Pending]);

        let stored = engine.expense(org.ungated.id, expense.id).await.unwrap();
        assert_eq!(stored.status, ExpenseStatus::Approved);
        assert_consistent(&engine, expense.id).await;
    }

    remove_db(path);
}

#[tokio::test]
async fn unstaffed_workflow_step_fails_closed() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;
    workflow(&engine, &org, &[StepApprover::Role { role: Role::Employee }]).await;

    let staffed = engine
        .submit_expense(submission(&org, &org.admin, 10_00, Currency::Usd))
        .await
        .unwrap();
    assert_eq!(staffed.status, ExpenseStatus::Pending);

    // Once Eve is promoted, Ned is the only employee left and cannot approve
    // his own expense.
    engine
        .update_user(
            org.admin.id,
            org.employee.id,
            UpdateUserCmd {
                role: Some(Role::Manager),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = engine
        .submit_expense(submission(&org, &org.ungated, 10_00, Currency::Usd))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidWorkflow(_)));
    assert!(engine.my_expenses(org.ungated.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn user_administration_keeps_the_hierarchy_sound() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    assert!(matches!(
        engine
            .new_user(
                org.manager.id,
                NewUserCmd::new("Zed", "zed@acme.io", Role::Employee)
            )
            .await,
        Err(EngineError::Forbidden(_))
    ));
    assert_eq!(
        engine
            .new_user(
                org.admin.id,
                NewUserCmd::new("Eve", "EVE@acme.io", Role::Employee)
            )
            .await
            .unwrap_err(),
        EngineError::ExistingKey("eve@acme.io".to_string())
    );

    let cycle = engine
        .update_user(
            org.admin.id,
            org.admin.id,
            UpdateUserCmd {
                manager_id: Some(Some(org.employee.id)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(cycle, Err(EngineError::CyclicHierarchy(_))));

    let itself = engine
        .update_user(
            org.admin.id,
            org.manager.id,
            UpdateUserCmd {
                manager_id: Some(Some(org.manager.id)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(itself, Err(EngineError::InvalidInput(_))));

    let updated = engine
        .update_user(
            org.admin.id,
            org.employee.id,
            UpdateUserCmd {
                manager_id: Some(None),
                is_manager_approver: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.manager_id, None);
    assert!(!updated.is_manager_approver);
    assert_eq!(engine.user(org.employee.id).await.unwrap(), updated);
}

#[tokio::test]
async fn category_names_are_unique_per_company() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    assert_eq!(
        engine
            .new_category(org.admin.id, " travel ", None)
            .await
            .unwrap_err(),
        EngineError::ExistingKey("travel".to_string())
    );
    let created = engine
        .new_category(org.admin.id, "Hardware", Some("Laptops and screens"))
        .await
        .unwrap();
    assert_eq!(created.description.as_deref(), Some("Laptops and screens"));
    assert!(matches!(
        engine.new_category(org.employee.id, "Books", None).await,
        Err(EngineError::Forbidden(_))
    ));
}

#[tokio::test]
async fn most_specific_workflow_routes_large_expenses() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;
    workflow(&engine, &org, &[StepApprover::DirectManager]).await;
    engine
        .new_workflow(
            org.admin.id,
            NewWorkflowCmd {
                name: "Large".to_string(),
                min_amount_minor: Some(1_000_00),
                max_amount_minor: None,
                steps: vec![
                    WorkflowStep {
                        sequence: 1,
                        approver: StepApprover::DirectManager,
                    },
                    WorkflowStep {
                        sequence: 2,
                        approver: StepApprover::Role { role: Role::Admin },
                    },
                ],
            },
        )
        .await
        .unwrap();
    assert_eq!(engine.workflows(org.employee.id).await.unwrap().len(), 2);

    let small = engine
        .submit_expense(submission(&org, &org.ungated, 999_99, Currency::Usd))
        .await
        .unwrap();
    let large = engine
        .submit_expense(submission(&org, &org.ungated, 1_000_00, Currency::Usd))
        .await
        .unwrap();

    assert_eq!(
        approver_ids(&engine, org.admin.id, small.id).await,
        vec![org.manager.id]
    );
    assert_eq!(
        approver_ids(&engine, org.admin.id, large.id).await,
        vec![org.manager.id, org.admin.id]
    );

    let mine = engine.my_expenses(org.ungated.id).await.unwrap();
    assert_eq!(mine.len(), 2);
}

#[tokio::test]
async fn invalid_workflow_definitions_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let org = org(&engine).await;

    let err = engine
        .new_workflow(
            org.admin.id,
            NewWorkflowCmd {
                name: "Broken".to_string(),
                min_amount_minor: Some(10),
                max_amount_minor: Some(5),
                steps: vec![WorkflowStep {
                    sequence: 1,
                    approver: StepApprover::DirectManager,
                }],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidWorkflow(_)));
    assert!(engine.workflows(org.admin.id).await.unwrap().is_empty());
}
