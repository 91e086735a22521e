// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use budgetdash::app_store::CollectionKey;
use budgetdash::models::{
    CategoryUpdate, EntryType, NewCategory, NewTransaction, TransactionQuery,
};
use budgetdash::notifications::NotificationKind;
use budgetdash::transport::TransportError;
use chrono::NaiveDate;
use common::{Reply, category_json, created, goal_json, ok, signed_in, tx_json};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn new_tx() -> NewTransaction {
    NewTransaction {
        amount: Decimal::from(50),
        description: "Groceries".into(),
        notes: None,
        category_id: "c1".into(),
        date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        kind: EntryType::Expense,
        currency: None,
    }
}

#[tokio::test]
async fn create_after_load_appends_server_entry_with_one_notification() {
    let h = signed_in("tok");
    h.transport.push(Reply::Json(
        200,
        json!({
            "success": true,
            "data": [
                tx_json("t1", 10.0, "expense", "c1", "2025-01-01"),
                tx_json("t2", 20.0, "income", "c2", "2025-01-02"),
                tx_json("t3", 30.0, "expense", "c1", "2025-01-03")
            ],
            "pagination": {"page": 1, "limit": 20, "total": 3, "pages": 1}
        }),
    ));
    h.svc
        .data
        .load_transactions(&TransactionQuery::default())
        .await
        .unwrap();
    assert_eq!(h.svc.data.state().transactions.len(), 3);
    assert_eq!(h.svc.data.state().pagination.as_ref().map(|p| p.total), Some(3));
    assert!(h.svc.notifications.is_empty());

    h.transport
        .push(created(tx_json("t4", 50.0, "expense", "c1", "2025-02-01")));
    let tx = h.svc.data.create_transaction(&new_tx()).await.unwrap();

    let state = h.svc.data.state();
    assert_eq!(state.transactions.len(), 4);
    assert_eq!(state.transactions[3], tx);
    assert_eq!(tx.id, "t4");
    assert_eq!(tx.amount, Decimal::from(50));
    assert!(state.last_updated.transactions.is_some());

    let notes = h.svc.notifications.snapshot();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Success);
    assert_eq!(notes[0].message, "Transaction added successfully");

    let body = common::body_of(&h.transport.requests()[1]);
    assert_eq!(body["type"], "expense");
    assert_eq!(body["categoryId"], "c1");
    assert_eq!(body["date"], "2025-02-01");
}

#[tokio::test]
async fn rejected_mutation_leaves_collection_untouched() {
    let h = signed_in("tok");
    h.transport.push(ok(json!([category_json("c1", "Food", "expense")])));
    h.svc.data.load_categories(None).await.unwrap();
    let before = h.svc.data.state();

    h.transport.push(Reply::Json(
        400,
        json!({
            "success": false,
            "message": "Validation failed",
            "error": {"type": "ValidationError", "details": [{"field": "name", "message": "Name taken"}]}
        }),
    ));
    let failure = h
        .svc
        .data
        .create_category(&NewCategory {
            name: "Food".into(),
            kind: EntryType::Expense,
            color: "#000".into(),
            icon: "tag".into(),
        })
        .await
        .unwrap_err();

    let after = h.svc.data.state();
    assert!(Arc::ptr_eq(&before.categories, &after.categories));
    assert!(Arc::ptr_eq(&before.transactions, &after.transactions));
    assert!(Arc::ptr_eq(&before.goals, &after.goals));
    assert_eq!(after.error.as_deref(), Some("Validation failed"));
    assert_eq!(failure.status, 400);
    assert_eq!(failure.issues[0].message, "Name taken");

    let notes = h.svc.notifications.snapshot();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Error);
}

#[tokio::test]
async fn failed_load_keeps_stale_data_visible() {
    let h = signed_in("tok");
    h.transport.push(ok(json!([goal_json("g1", 10.0, 100.0, None)])));
    h.svc.data.load_goals(None).await.unwrap();
    let before = h.svc.data.state();

    h.transport
        .push(Reply::Fail(TransportError::new("connection reset")));
    let failure = h.svc.data.load_goals(None).await.unwrap_err();

    let after = h.svc.data.state();
    assert!(Arc::ptr_eq(&before.goals, &after.goals));
    assert_eq!(after.goals[0].id, "g1");
    assert!(!after.loading.goals);
    assert_eq!(after.last_updated.goals, before.last_updated.goals);
    assert_eq!(after.error.as_deref(), Some(failure.message.as_str()));
    assert_eq!(failure.status, 0);
    assert_eq!(h.svc.notifications.len(), 1);
}

#[tokio::test]
async fn update_of_unknown_id_appends_and_known_id_replaces() {
    let h = signed_in("tok");
    h.transport.push(ok(json!([
        category_json("c1", "Food", "expense"),
        category_json("c2", "Rent", "expense")
    ])));
    h.svc.data.load_categories(None).await.unwrap();

    h.transport.push(ok(category_json("c2", "Housing", "expense")));
    h.transport.push(ok(category_json("c9", "Gifts", "expense")));
    let rename = CategoryUpdate {
        name: Some("Housing".into()),
        ..Default::default()
    };
    h.svc.data.update_category("c2", &rename).await.unwrap();
    h.svc.data.update_category("c9", &rename).await.unwrap();

    let names: Vec<String> = h
        .svc
        .data
        .state()
        .categories
        .iter()
        .map(|c| c.name.clone())
        .collect();
    assert_eq!(names, vec!["Food", "Housing", "Gifts"]);
    assert_eq!(
        common::body_of(&h.transport.requests()[1]),
        json!({"name": "Housing"})
    );
}

#[tokio::test]
async fn delete_removes_locally_only_after_acknowledgement() {
    let h = signed_in("tok");
    h.transport.push(ok(json!([
        tx_json("t1", 10.0, "expense", "c1", "2025-01-01"),
        tx_json("t2", 20.0, "expense", "c1", "2025-01-02")
    ])));
    h.svc
        .data
        .load_transactions(&TransactionQuery::default())
        .await
        .unwrap();

    h.transport.push(Reply::Json(404, json!({"message": "Transaction not found"})));
    assert!(h.svc.data.delete_transaction("t1").await.is_err());
    assert_eq!(h.svc.data.state().transactions.len(), 2);

    h.transport
        .push(Reply::Json(200, json!({"success": true, "message": "Deleted"})));
    h.svc.data.delete_transaction("t1").await.unwrap();
    let state = h.svc.data.state();
    assert_eq!(state.transactions.len(), 1);
    assert_eq!(state.transactions[0].id, "t2");
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn slow_stale_load_cannot_overwrite_newer_result() {
    let h = signed_in("tok");
    h.transport.push_delayed(
        "/categories",
        Duration::from_millis(500),
        ok(json!([category_json("old", "Old", "expense")])),
    );
    h.transport.push_delayed(
        "/categories",
        Duration::from_millis(50),
        ok(json!([category_json("new", "New", "expense")])),
    );

    let (first, second) = tokio::join!(
        h.svc.data.load_categories(None),
        h.svc.data.load_categories(Some(EntryType::Expense))
    );
    first.unwrap();
    second.unwrap();

    let state = h.svc.data.state();
    assert_eq!(state.categories.len(), 1);
    assert_eq!(state.categories[0].id, "new");
    assert!(!state.loading.categories);
}

#[tokio::test(start_paused = true)]
async fn stale_load_failure_is_silent() {
    let h = signed_in("tok");
    h.transport.push_delayed(
        "/goals",
        Duration::from_millis(500),
        Reply::Json(500, json!({"message": "slow failure"})),
    );
    h.transport.push_delayed(
        "/goals",
        Duration::from_millis(50),
        ok(json!([goal_json("g1", 0.0, 10.0, None)])),
    );

    let (first, second) = tokio::join!(
        h.svc.data.load_goals(None),
        h.svc.data.load_goals(None)
    );
    assert!(first.is_err());
    second.unwrap();

    let state = h.svc.data.state();
    assert_eq!(state.goals.len(), 1);
    assert!(state.error.is_none());
    assert!(h.svc.notifications.is_empty());
}

#[tokio::test]
async fn contribution_must_be_positive_and_reconciles_goal() {
    let h = signed_in("tok");
    h.transport.push(ok(json!([goal_json("g1", 100.0, 1000.0, None)])));
    h.svc.data.load_goals(None).await.unwrap();

    let rejected = h
        .svc
        .data
        .contribute_to_goal("g1", Decimal::ZERO)
        .await
        .unwrap_err();
    assert_eq!(rejected.issues[0].field, "amount");
    assert_eq!(h.transport.requests().len(), 1);

    h.transport.push(ok(goal_json("g1", 150.0, 1000.0, None)));
    let goal = h
        .svc
        .data
        .contribute_to_goal("g1", Decimal::from(50))
        .await
        .unwrap();
    assert_eq!(goal.current_amount, Decimal::from(150));
    assert_eq!(h.svc.data.state().goals[0].current_amount, Decimal::from(150));
}

#[tokio::test]
async fn dashboard_needs_both_overview_and_stats() {
    let h = signed_in("tok");
    h.transport
        .push_for("/dashboard/overview", ok(json!({"totalIncome": 1200, "totalExpenses": 800})));
    h.transport
        .push_for("/dashboard/stats", ok(json!({"transactionCount": 14})));
    h.svc.data.load_dashboard(Some("month")).await.unwrap();
    let snapshot = h.svc.data.state().dashboard.clone().unwrap();
    assert_eq!(snapshot.overview["totalIncome"], 1200);
    assert_eq!(snapshot.stats["transactionCount"], 14);
    let overview_req = h
        .transport
        .requests()
        .into_iter()
        .find(|r| r.url.path().ends_with("/overview"))
        .unwrap();
    assert_eq!(overview_req.url.query(), Some("period=month"));

    h.transport
        .push_for("/dashboard/overview", ok(json!({"totalIncome": 1})));
    h.transport
        .push_for("/dashboard/stats", Reply::Json(500, json!({"message": "stats down"})));
    let failure = h.svc.data.load_dashboard(None).await.unwrap_err();
    assert_eq!(failure.message, "stats down");
    let kept = h.svc.data.state().dashboard.clone().unwrap();
    assert!(Arc::ptr_eq(&snapshot, &kept));
}

#[tokio::test]
async fn refresh_all_reloads_every_collection() {
    let h = signed_in("tok");
    h.transport
        .push_for("/categories", ok(json!([category_json("c1", "Food", "expense")])));
    h.transport.push_for(
        "/transactions",
        ok(json!([tx_json("t1", 5.0, "expense", "c1", "2025-01-01")])),
    );
    h.transport
        .push_for("/goals", ok(json!([goal_json("g1", 1.0, 2.0, None)])));
    h.transport.push_for("/dashboard/overview", ok(json!({})));
    h.transport.push_for("/dashboard/stats", ok(json!({})));

    h.svc.data.refresh_all().await.unwrap();

    let state = h.svc.data.state();
    for key in CollectionKey::ALL {
        assert!(state.last_updated.get(key).is_some(), "{} not refreshed", key);
        assert!(!state.loading.get(key));
    }
    assert_eq!(h.transport.remaining(), 0);
}
