use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn test_app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::app(engine)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-actor-id", actor);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

struct Seeded {
    admin: String,
    manager: String,
    employee: String,
    category: String,
}

async fn seed(app: &Router) -> Seeded {
    let (status, created) = call(
        app,
        "POST",
        "/companies",
        None,
        Some(json!({
            "name": "Acme",
            "currency": "USD",
            "admin_name": "Ada",
            "admin_email": "ada@acme.io"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let admin = created["admin_id"].as_str().unwrap().to_string();

    let (status, manager) = call(
        app,
        "POST",
        "/users",
        Some(&admin),
        Some(json!({
            "name": "Max",
            "email": "max@acme.io",
            "role": "manager",
            "manager_id": admin
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let manager = manager["id"].as_str().unwrap().to_string();

    let (status, employee) = call(
        app,
        "POST",
        "/users",
        Some(&admin),
        Some(json!({
            "name": "Eve",
            "email": "eve@acme.io",
            "role": "employee",
            "manager_id": manager,
            "is_manager_approver": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let employee = employee["id"].as_str().unwrap().to_string();

    let (_, categories) = call(app, "GET", "/categories", Some(&employee), None).await;
    let category = categories["categories"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    Seeded {
        admin,
        manager,
        employee,
        category,
    }
}

fn expense_body(seeded: &Seeded, amount: &str, currency: &str) -> Value {
    json!({
        "amount": amount,
        "currency": currency,
        "category_id": seeded.category,
        "description": "Taxi to airport",
        "expense_date": "2026-09-01"
    })
}

#[tokio::test]
async fn requests_without_a_known_actor_are_unauthorized() {
    let app = test_app().await;

    let (status, _) = call(&app, "GET", "/expenses/mine", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let unknown = uuid::Uuid::new_v4().to_string();
    let (status, _) = call(&app, "GET", "/expenses/mine", Some(&unknown), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn submit_decide_and_read_history() {
    let app = test_app().await;
    let seeded = seed(&app).await;

    let (status, created) = call(
        &app,
        "POST",
        "/expenses",
        Some(&seeded.employee),
        Some(expense_body(&seeded, "100.00", "EUR")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    let expense_id = created["expense_id"].as_str().unwrap().to_string();

    let (status, expense) = call(
        &app,
        "GET",
        &format!("/expenses/{expense_id}"),
        Some(&seeded.employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(expense["converted_amount_minor"], 11765);
    assert_eq!(expense["base_currency"], "USD");

    let (_, queue) = call(
        &app,
        "GET",
        "/approvals/pending",
        Some(&seeded.manager),
        None,
    )
    .await;
    assert_eq!(queue["approvals"].as_array().unwrap().len(), 1);
    assert_eq!(queue["approvals"][0]["submitter_name"], "Eve");

    let decision_uri = format!("/approvals/{expense_id}/decision");
    let (status, result) = call(
        &app,
        "POST",
        &decision_uri,
        Some(&seeded.manager),
        Some(json!({ "decision": "approved", "comment": "ok" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["status"], "approved");

    let (status, body) = call(
        &app,
        "POST",
        &decision_uri,
        Some(&seeded.manager),
        Some(json!({ "decision": "rejected" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already"));

    let (status, history) = call(
        &app,
        "GET",
        &format!("/approvals/{expense_id}/history"),
        Some(&seeded.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["history"][0]["decision"], "approved");
    assert_eq!(history["history"][0]["comment"], "ok");
}

#[tokio::test]
async fn engine_errors_map_to_status_codes() {
    let app = test_app().await;
    let seeded = seed(&app).await;

    let (status, _) = call(
        &app,
        "POST",
        "/expenses",
        Some(&seeded.employee),
        Some(expense_body(&seeded, "0", "USD")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "POST",
        "/expenses",
        Some(&seeded.employee),
        Some(expense_body(&seeded, "12.5", "JPY")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "GET",
        &format!("/expenses/{}", uuid::Uuid::new_v4()),
        Some(&seeded.employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "POST",
        "/categories",
        Some(&seeded.employee),
        Some(json!({ "name": "Books" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        "POST",
        "/workflows",
        Some(&seeded.admin),
        Some(json!({
            "name": "Broken",
            "min_amount_minor": 500,
            "max_amount_minor": 100,
            "steps": [{ "sequence": 1, "approver": { "kind": "direct_manager" } }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/users/{}", seeded.admin),
        Some(&seeded.admin),
        Some(json!({ "manager_id": seeded.employee })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = call(
        &app,
        "PATCH",
        &format!("/users/{}", seeded.employee),
        Some(&seeded.admin),
        Some(json!({ "manager_id": seeded.manager, "clear_manager": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn workflows_route_through_configured_steps() {
    let app = test_app().await;
    let seeded = seed(&app).await;

    let (status, workflow) = call(
        &app,
        "POST",
        "/workflows",
        Some(&seeded.admin),
        Some(json!({
            "name": "Everything",
            "min_amount_minor": null,
            "max_amount_minor": null,
            "steps": [
                { "sequence": 1, "approver": { "kind": "direct_manager" } },
                { "sequence": 2, "approver": { "kind": "role", "role": "admin" } }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(workflow["steps"][1]["approver"]["kind"], "role");

    let (_, created) = call(
        &app,
        "POST",
        "/expenses",
        Some(&seeded.employee),
        Some(expense_body(&seeded, "42", "USD")),
    )
    .await;
    let expense_id = created["expense_id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        "POST",
        &format!("/approvals/{expense_id}/decision"),
        Some(&seeded.admin),
        Some(json!({ "decision": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, mine) = call(&app, "GET", "/expenses/mine", Some(&seeded.employee), None).await;
    assert_eq!(mine["expenses"][0]["status"], "pending");
    assert_eq!(mine["expenses"][0]["amount_minor"], 4200);

    let (_, users) = call(&app, "GET", "/users", Some(&seeded.admin), None).await;
    assert_eq!(users["users"].as_array().unwrap().len(), 3);
}
